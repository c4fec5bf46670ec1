// Sentra - Industrial safety telemetry pipeline
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Asynchronous job submission.
//!
//! Background work (anomaly sweeps, report generation, retention cleanup)
//! runs on an external job runner. The pipeline only needs fire-and-forget
//! submission; there is no result polling.

use crate::error::JobError;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Opaque handle to a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Fire-and-forget job submission.
pub trait JobRunner {
    fn submit(
        &self,
        task_name: &str,
        args: serde_json::Value,
    ) -> std::result::Result<JobId, JobError>;
}

/// A submitted job, as seen by the recording runner.
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub id: JobId,
    pub task_name: String,
    pub args: serde_json::Value,
}

/// In-process runner that records submissions. Backs tests and local
/// runs without a real queue.
#[derive(Debug, Default)]
pub struct RecordingJobRunner {
    jobs: Mutex<Vec<SubmittedJob>>,
}

impl RecordingJobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything submitted so far.
    pub fn submitted(&self) -> Vec<SubmittedJob> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl JobRunner for RecordingJobRunner {
    fn submit(
        &self,
        task_name: &str,
        args: serde_json::Value,
    ) -> std::result::Result<JobId, JobError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        let id = JobId(format!("job-{}", jobs.len() + 1));
        log::debug!("submitted job `{}` as {}", task_name, id.as_str());
        jobs.push(SubmittedJob {
            id: id.clone(),
            task_name: task_name.to_string(),
            args,
        });
        Ok(id)
    }
}
