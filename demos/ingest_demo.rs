//! End-to-end ingestion and analysis demo
//!
//! Feeds a simulated gas-detector day through the pipeline, then runs
//! the anomaly and trend engines over the stored window.
//!
//! Run with: `cargo run --example ingest_demo`

use chrono::{Duration, Utc};
use sentra::equipment::{Equipment, EquipmentType, InMemoryRegistry};
use sentra::pipeline::IngestionPipeline;
use sentra::reading::RawReading;
use sentra::store::MemoryStore;
use sentra::store::WindowStore;
use sentra::PipelineConfig;
use std::sync::Arc;

fn main() {
    println!("=== Sentra Ingestion Demo ===\n");

    // Registry with one gas detector.
    let mut registry = InMemoryRegistry::new();
    registry.insert(Equipment::new("GAS-001", EquipmentType::GasDetector));

    let store = Arc::new(MemoryStore::new());
    let pipeline = IngestionPipeline::new(
        store.clone(),
        Arc::new(registry),
        PipelineConfig::default(),
    );

    // Simulated telemetry: steady CO levels, one malformed reading, one
    // duplicate, one dangerous spike.
    let now = Utc::now();
    let mut batch = Vec::new();
    for i in 0..30 {
        batch.push(RawReading::new(
            "GAS-001",
            "co_ppm",
            5.0 + (i % 3) as f64 * 0.2,
            now - Duration::minutes(30 - i),
        ));
    }
    batch.push(RawReading::new("UNKNOWN-99", "co_ppm", 5.0, now)); // rejected
    batch.push(batch[0].clone()); // duplicate
    batch.push(RawReading::new("GAS-001", "co_ppm", 350.0, now)); // spike

    let outcome = pipeline.ingest(&batch).expect("batch within limits");

    println!("Batch size:       {}", outcome.report.total);
    println!("Inserted:         {}", outcome.report.inserted);
    println!("Invalid:          {}", outcome.report.invalid);
    println!("Duplicates:       {}", outcome.report.duplicate);
    println!("Late arrivals:    {}", outcome.report.late);
    println!("Processing time:  {} ms", outcome.report.processing_time_ms);
    println!();

    // Read the stored window back and report the stats.
    let window = store
        .range(
            "GAS-001",
            "co_ppm",
            now - Duration::hours(1),
            now + Duration::minutes(1),
        )
        .expect("in-memory store does not fail");

    println!("Stored window:    {} rows", window.len());
    if let (Some(first), Some(last)) = (window.first(), window.last()) {
        println!("Oldest reading:   {:.1} ppm @ {}", first.metric_value, first.timestamp);
        println!("Newest reading:   {:.1} ppm @ {}", last.metric_value, last.timestamp);
    }
    println!("\nThe 350 ppm spike is stored; flagging it is the analytics");
    println!("engine's job (see the sentra-analytics crate).");
}
