//! Fleet-wide summary of a metrics snapshot
//!
//! Averages are taken over the nodes that reported a numeric value for the
//! field; nodes with a non-numeric CPU value are never classified.

use crate::api::NodeMetric;

/// CPU usage above which a node counts as high load
pub const DEFAULT_HIGH_CPU_THRESHOLD: f64 = 80.0;

/// CPU usage below which a node counts as underutilized
pub const DEFAULT_LOW_CPU_THRESHOLD: f64 = 40.0;

/// Thresholds used to classify nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadThresholds {
    pub high_cpu: f64,
    pub low_cpu: f64,
}

impl Default for LoadThresholds {
    fn default() -> Self {
        Self {
            high_cpu: DEFAULT_HIGH_CPU_THRESHOLD,
            low_cpu: DEFAULT_LOW_CPU_THRESHOLD,
        }
    }
}

/// Aggregate view of one refresh cycle
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FleetSummary {
    pub node_count: usize,
    pub average_cpu: f64,
    pub average_memory: f64,
    pub average_task_load: f64,
    /// Node ids with CPU strictly above the high threshold, in input order
    pub high_load_nodes: Vec<String>,
    /// Node ids with CPU strictly below the low threshold, in input order
    pub underutilized_nodes: Vec<String>,
}

impl FleetSummary {
    pub fn from_metrics(metrics: &[NodeMetric], thresholds: LoadThresholds) -> Self {
        let mut high_load_nodes = Vec::new();
        let mut underutilized_nodes = Vec::new();

        for metric in metrics {
            match metric.cpu() {
                Some(cpu) if cpu > thresholds.high_cpu => high_load_nodes.push(metric.node_id_text()),
                Some(cpu) if cpu < thresholds.low_cpu => {
                    underutilized_nodes.push(metric.node_id_text())
                }
                _ => {}
            }
        }

        Self {
            node_count: metrics.len(),
            average_cpu: average(metrics.iter().filter_map(NodeMetric::cpu)),
            average_memory: average(metrics.iter().filter_map(NodeMetric::memory)),
            average_task_load: average(metrics.iter().filter_map(NodeMetric::load)),
            high_load_nodes,
            underutilized_nodes,
        }
    }

    /// One-line description for the summary area
    pub fn headline(&self) -> String {
        format!(
            "{} nodes | avg CPU {:.1}% | avg memory {:.1} MB | avg task load {:.1} | {} high load | {} underutilized",
            self.node_count,
            self.average_cpu,
            self.average_memory,
            self.average_task_load,
            self.high_load_nodes.len(),
            self.underutilized_nodes.len(),
        )
    }
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
