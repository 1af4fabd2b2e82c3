// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! In-memory sinks for asserting on group telemetry.

use std::{io, sync::Arc};

use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::data::{AggregatedMetrics, MetricData, ResourceMetrics};
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, SdkMeterProvider};
use parking_lot::Mutex;

/// Attributes of every data point, whatever the metric's number type.
macro_rules! point_attributes {
    ($data:expr) => {
        match $data {
            MetricData::Sum(sum) => sum.data_points().flat_map(|p| p.attributes().cloned()).collect(),
            MetricData::Histogram(hist) => hist.data_points().flat_map(|p| p.attributes().cloned()).collect(),
            MetricData::Gauge(gauge) => gauge.data_points().flat_map(|p| p.attributes().cloned()).collect(),
            MetricData::ExponentialHistogram(hist) => hist.data_points().flat_map(|p| p.attributes().cloned()).collect(),
        }
    };
}

/// A meter provider whose exports land in memory.
#[derive(Debug)]
pub(crate) struct MetricTester {
    exporter: InMemoryMetricExporter,
    provider: SdkMeterProvider,
}

/// One exported metric: its name and the attributes of every data point.
type ExportedMetric = (String, Vec<KeyValue>);

impl MetricTester {
    pub fn new() -> Self {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder().with_periodic_exporter(exporter.clone()).build();
        Self { exporter, provider }
    }

    pub fn meter_provider(&self) -> &SdkMeterProvider {
        &self.provider
    }

    fn export(&self) -> Vec<ExportedMetric> {
        self.provider.force_flush().expect("meter provider should flush");
        let batches: Vec<ResourceMetrics> = self.exporter.get_finished_metrics().expect("exporter should hold metrics");

        let mut exported = Vec::new();
        for batch in &batches {
            for scope in batch.scope_metrics() {
                for metric in scope.metrics() {
                    let attributes = match metric.data() {
                        AggregatedMetrics::F64(data) => point_attributes!(data),
                        AggregatedMetrics::U64(data) => point_attributes!(data),
                        AggregatedMetrics::I64(data) => point_attributes!(data),
                    };
                    exported.push((metric.name().to_string(), attributes));
                }
            }
        }
        exported
    }

    pub fn metric_names(&self) -> Vec<String> {
        self.export().into_iter().map(|(name, _)| name).collect()
    }

    pub fn assert_attributes_contain(&self, expected: &[KeyValue]) {
        let seen: Vec<KeyValue> = self.export().into_iter().flat_map(|(_, attrs)| attrs).collect();
        for kv in expected {
            assert!(seen.contains(kv), "missing metric attribute {kv:?}; exported: {seen:?}");
        }
    }
}

/// Collects formatted `tracing` output.
///
/// Install with `tracing::subscriber::set_default(capture.subscriber())`; the guard scopes the
/// capture to the current thread.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogCapture {
    lines: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.lines.lock()).into_owned()
    }

    pub fn assert_contains(&self, needle: &str) {
        let output = self.output();
        assert!(output.contains(needle), "expected '{needle}' in captured logs:\n{output}");
    }

    pub fn subscriber(&self) -> impl tracing::Subscriber {
        use tracing_subscriber::layer::SubscriberExt;

        let lines = Arc::clone(&self.lines);
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(move || SharedWriter(Arc::clone(&lines)));
        tracing_subscriber::registry().with(layer)
    }
}

struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
