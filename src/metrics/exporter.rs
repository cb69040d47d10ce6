use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::HierarchyMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for cache metrics snapshots.
///
/// This exporter writes in the Prometheus text exposition format so it can be
/// scraped by Prometheus or forwarded to an OpenTelemetry collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send + Sync> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    fn write_counter(&self, name: &str, value: u64) {
        let mut writer = self
            .writer
            .lock()
            .expect("metrics exporter writer poisoned");
        let _ = writeln!(writer, "# TYPE {} counter", name);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_gauge(&self, name: &str, value: u64) {
        let mut writer = self
            .writer
            .lock()
            .expect("metrics exporter writer poisoned");
        let _ = writeln!(writer, "# TYPE {} gauge", name);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send + Sync> MetricsExporter<HierarchyMetricsSnapshot>
    for PrometheusTextExporter<W>
{
    fn export(&self, snapshot: &HierarchyMetricsSnapshot) {
        self.write_counter(&self.metric_name("inserts_new_total"), snapshot.inserts_new);
        self.write_counter(
            &self.metric_name("inserts_replaced_total"),
            snapshot.inserts_replaced,
        );
        self.write_counter(
            &self.metric_name("current_level_sweeps_total"),
            snapshot.current_level_sweeps,
        );
        self.write_counter(
            &self.metric_name("exhaustive_sweeps_total"),
            snapshot.exhaustive_sweeps,
        );
        self.write_counter(
            &self.metric_name("evicted_entries_total"),
            snapshot.evicted_entries,
        );
        self.write_counter(
            &self.metric_name("contexts_closed_total"),
            snapshot.contexts_closed,
        );
        self.write_counter(
            &self.metric_name("close_failures_total"),
            snapshot.close_failures,
        );
        self.write_counter(&self.metric_name("clears_total"), snapshot.clears);
        self.write_counter(&self.metric_name("get_hits_total"), snapshot.get_hits);
        self.write_counter(&self.metric_name("get_misses_total"), snapshot.get_misses);
        self.write_gauge(&self.metric_name("cache_len"), snapshot.cache_len as u64);
        self.write_gauge(
            &self.metric_name("parent_contexts"),
            snapshot.parent_contexts as u64,
        );
    }
}
