//! Prometheus metrics for the dispatch pipeline.
//!
//! All metrics follow the naming convention: `courier_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Files that completed every stage and were transmitted
    pub static ref FILES_SENT: Counter = Counter::new(
        "courier_files_sent_total",
        "Total number of files signed and transmitted"
    ).expect("metric creation failed");

    /// Files skipped, labelled by the stage that rejected them
    pub static ref FILES_SKIPPED: CounterVec = CounterVec::new(
        Opts::new("courier_files_skipped_total", "Total number of skipped files"),
        &["stage"]  // stage: recognition/format/freshness/signing/transmission
    ).expect("metric creation failed");

    /// Batches processed
    pub static ref BATCHES_PROCESSED: Counter = Counter::new(
        "courier_batches_processed_total",
        "Total number of send_files invocations"
    ).expect("metric creation failed");

    /// Batch duration histogram
    pub static ref BATCH_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "courier_batch_duration_seconds",
            "Time spent processing one batch"
        ).buckets(exponential_buckets(0.001, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Registering twice fails with `TelemetryError::MetricsInit`.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(FILES_SENT.clone()),
        Box::new(FILES_SKIPPED.clone()),
        Box::new(BATCHES_PROCESSED.clone()),
        Box::new(BATCH_DURATION.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
