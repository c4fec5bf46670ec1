// Sentra Analytics - Anomaly and trend analysis
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Analytics orchestration over the window store.
//!
//! The engine is read-only against the store and stateless across calls:
//! every invocation reads its window, recomputes stats, and re-fits the
//! statistical detector. Invocations for different (equipment, metric)
//! pairs may run fully in parallel.

use crate::alert::{AlertCandidate, AlertError, AlertId, AlertSink};
use crate::anomaly::{AnomalyDetector, Detection};
use crate::config::AnalyticsConfig;
use crate::trend::{TrendAnalyzer, TrendResult};
use chrono::{DateTime, Duration, Utc};
use sentra::config::RetryConfig;
use sentra::equipment::Equipment;
use sentra::error::StoreError;
use sentra::jobs::{JobId, JobRunner};
use sentra::store::{range_with_retry, WindowStore};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Analytics-level failure.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// The window store failed after the retry budget.
    #[error("Store unavailable after {attempts} attempt(s): {source}")]
    Store { attempts: u32, source: StoreError },

    /// The alert sink refused a candidate.
    #[error(transparent)]
    Alert(#[from] AlertError),

    /// The job runner refused a submission.
    #[error(transparent)]
    Job(#[from] sentra::error::JobError),
}

/// Result of a combined scan over one (equipment, metric) pair.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Anomaly findings from the detection pass.
    pub detection: Detection,
    /// Trend result, when enough history existed.
    pub trend: Option<TrendResult>,
    /// Ids of the alert candidates emitted.
    pub alerts: Vec<AlertId>,
}

/// Read-only analytics engine over a window store.
pub struct AnalyticsEngine<S> {
    store: Arc<S>,
    detector: AnomalyDetector,
    trend: TrendAnalyzer,
    config: AnalyticsConfig,
    retry: RetryConfig,
}

impl<S: WindowStore> AnalyticsEngine<S> {
    pub fn new(store: Arc<S>, config: AnalyticsConfig) -> Self {
        Self {
            detector: AnomalyDetector::new(&config),
            trend: TrendAnalyzer::new(config.trend.clone()),
            store,
            config,
            retry: RetryConfig::default(),
        }
    }

    /// Builder: replace the store-read retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Run anomaly detection over `[t0, t1]` for one pair.
    ///
    /// An expired `deadline` yields a partial result flagged
    /// `truncated`, never an unbounded block.
    pub fn detect(
        &self,
        equipment: &Equipment,
        metric_name: &str,
        t0: DateTime<Utc>,
        t1: DateTime<Utc>,
        deadline: Option<Instant>,
    ) -> Result<Detection, AnalyticsError> {
        let window = self.read_window(&equipment.equipment_id, metric_name, t0, t1)?;
        Ok(self.detector.detect(equipment, metric_name, &window, deadline))
    }

    /// Fit a trend over the configured rolling window ending at `now`.
    ///
    /// `Ok(None)` means insufficient history, not failure.
    pub fn analyze_trend(
        &self,
        equipment_id: &str,
        metric_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<TrendResult>, AnalyticsError> {
        let t0 = now - Duration::hours(self.config.trend.window_hours);
        let window = self.read_window(equipment_id, metric_name, t0, now)?;
        Ok(self.trend.analyze(&window))
    }

    /// Run both engines over one pair and emit alert candidates.
    pub fn scan(
        &self,
        equipment: &Equipment,
        metric_name: &str,
        now: DateTime<Utc>,
        deadline: Option<Instant>,
        sink: &dyn AlertSink,
    ) -> Result<ScanSummary, AnalyticsError> {
        let t0 = now - Duration::hours(self.config.trend.window_hours);
        let window = self.read_window(&equipment.equipment_id, metric_name, t0, now)?;

        let detection = self.detector.detect(equipment, metric_name, &window, deadline);
        let trend = self.trend.analyze(&window);

        let mut alerts = Vec::new();
        for finding in &detection.findings {
            let id = sink.emit(AlertCandidate::from_finding(finding.clone()))?;
            alerts.push(id);
        }
        if let Some(result) = &trend {
            if let Some(candidate) = AlertCandidate::from_trend(
                equipment.equipment_id.clone(),
                metric_name,
                result.clone(),
            ) {
                alerts.push(sink.emit(candidate)?);
            }
        }

        log::info!(
            "scan {}/{}: {} finding(s), {} alert(s){}",
            equipment.equipment_id,
            metric_name,
            detection.findings.len(),
            alerts.len(),
            if detection.truncated { " (truncated)" } else { "" }
        );

        Ok(ScanSummary {
            detection,
            trend,
            alerts,
        })
    }

    /// Enqueue one background sweep job per pair. Fire-and-forget; the
    /// runner owns execution.
    pub fn schedule_sweep(
        &self,
        runner: &dyn JobRunner,
        pairs: &[(String, String)],
    ) -> Result<Vec<JobId>, AnalyticsError> {
        let mut jobs = Vec::with_capacity(pairs.len());
        for (equipment_id, metric_name) in pairs {
            let id = runner.submit(
                "anomaly_sweep",
                json!({
                    "equipment_id": equipment_id,
                    "metric_name": metric_name,
                }),
            )?;
            jobs.push(id);
        }
        Ok(jobs)
    }

    /// The engine's configuration.
    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    fn read_window(
        &self,
        equipment_id: &str,
        metric_name: &str,
        t0: DateTime<Utc>,
        t1: DateTime<Utc>,
    ) -> Result<Vec<sentra::reading::Reading>, AnalyticsError> {
        range_with_retry(
            self.store.as_ref(),
            equipment_id,
            metric_name,
            t0,
            t1,
            &self.retry,
        )
        .map_err(|(attempts, source)| AnalyticsError::Store { attempts, source })
    }
}
