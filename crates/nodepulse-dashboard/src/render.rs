//! Display model and the surfaces it is drawn on
//!
//! The controller never touches the DOM directly. It turns metrics into
//! [`NodeBlock`]s and hands them to a [`MetricsSurface`]; the browser
//! adapters live in `web`.

use crate::api::{display_field, NodeMetric};
use crate::summary::FleetSummary;

/// CSS class of a rendered node block
pub const NODE_BLOCK_CLASS: &str = "node-metric";

/// One rendered node: a heading and its detail lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeBlock {
    pub heading: String,
    pub lines: Vec<String>,
}

impl NodeBlock {
    /// Build the block for a single metric
    pub fn from_metric(metric: &NodeMetric) -> Self {
        Self {
            heading: format!("Node ID: {}", display_field(metric.node_id.as_ref())),
            lines: vec![
                format!("CPU Usage: {}%", display_field(metric.cpu_usage.as_ref())),
                format!("Memory Usage: {} MB", display_field(metric.memory_usage.as_ref())),
                format!("Task Load: {}", display_field(metric.task_load.as_ref())),
            ],
        }
    }
}

/// Map metrics to blocks, preserving input order
pub fn render_blocks(metrics: &[NodeMetric]) -> Vec<NodeBlock> {
    metrics.iter().map(NodeBlock::from_metric).collect()
}

/// Where rendered metrics are shown
pub trait MetricsSurface {
    /// Replace everything currently shown with `blocks`
    fn replace(&self, blocks: &[NodeBlock]);

    /// Show the fleet summary; surfaces without a summary area ignore it
    fn show_summary(&self, _summary: &FleetSummary) {}
}

/// The control that triggers optimization
pub trait TriggerControl {
    fn set_enabled(&self, enabled: bool);
}

/// Blocking user notification
pub trait Notifier {
    fn notify(&self, message: &str);
}
