//! REST API client for the performance service
//!
//! Provides the wire types, the [`PerformanceApi`] seam used by the
//! controller, and a gloo-net backed client for the browser.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Path of the metrics endpoint, relative to the configured API URL
pub const PERFORMANCE_PATH: &str = "/api/performance";

/// Path of the optimize endpoint, relative to the configured API URL
pub const OPTIMIZE_PATH: &str = "/api/optimize";

/// Remote operations the dashboard depends on
///
/// Implementations perform exactly one request per call: no retry,
/// no timeout, no backoff.
#[async_trait(?Send)]
pub trait PerformanceApi {
    /// `GET /api/performance`
    async fn performance(&self) -> ApiResult<Vec<NodeMetric>>;

    /// `POST /api/optimize` with an empty body
    async fn optimize(&self) -> ApiResult<OptimizationResult>;
}

// ============================================================================
// API Response Types
// ============================================================================

/// Metrics reported by a single node
///
/// Fields are kept as raw JSON so the dashboard shows whatever the server
/// sent. A field the server omitted is `None` and renders as `undefined`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeMetric {
    /// `nodeId`
    pub node_id: Option<Value>,
    /// `cpuUsage`, percentage 0-100 (not validated)
    pub cpu_usage: Option<Value>,
    /// `memoryUsage`, megabytes
    pub memory_usage: Option<Value>,
    /// `taskLoad`
    pub task_load: Option<Value>,
}

impl NodeMetric {
    /// Interpret one entry of the metrics array
    ///
    /// Any object is accepted; an entry that is not an object becomes a
    /// metric with every field absent.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self {
                node_id: fields.get("nodeId").cloned(),
                cpu_usage: fields.get("cpuUsage").cloned(),
                memory_usage: fields.get("memoryUsage").cloned(),
                task_load: fields.get("taskLoad").cloned(),
            },
            _ => Self::default(),
        }
    }

    /// Node identifier as displayed
    pub fn node_id_text(&self) -> String {
        display_field(self.node_id.as_ref())
    }

    /// CPU usage, if the server sent a number
    pub fn cpu(&self) -> Option<f64> {
        self.cpu_usage.as_ref().and_then(Value::as_f64)
    }

    /// Memory usage in MB, if the server sent a number
    pub fn memory(&self) -> Option<f64> {
        self.memory_usage.as_ref().and_then(Value::as_f64)
    }

    /// Task load, if the server sent a number
    pub fn load(&self) -> Option<f64> {
        self.task_load.as_ref().and_then(Value::as_f64)
    }
}

/// Decode the body of `GET /api/performance`
///
/// Only the outer array is required; each entry goes through
/// [`NodeMetric::from_value`] so a malformed entry never drops the batch.
pub fn decode_metrics(body: Value) -> ApiResult<Vec<NodeMetric>> {
    match body {
        Value::Array(entries) => Ok(entries.into_iter().map(NodeMetric::from_value).collect()),
        other => Err(ApiError::Decode(format!(
            "expected an array of node metrics, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Result of an optimize request
///
/// `message` is kept raw like the metric fields; it is shown, never checked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct OptimizationResult {
    #[serde(default, deserialize_with = "present")]
    pub message: Option<Value>,
}

/// Keep an explicit `null` as `Some(Value::Null)`; only absence is `None`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl OptimizationResult {
    /// Message as displayed to the user
    pub fn message_text(&self) -> String {
        display_field(self.message.as_ref())
    }
}

/// Largest integer an f64 represents exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Render a raw JSON field the way it is shown to the user
///
/// Strings are shown without quotes, absent fields as `undefined`, and
/// integral floats without a trailing `.0`.
pub fn display_field(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
                (f as i64).to_string()
            }
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

// ============================================================================
// Browser client
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use client::ApiClient;

#[cfg(target_arch = "wasm32")]
mod client {
    use async_trait::async_trait;
    use gloo_net::http::Request;
    use tracing::debug;

    use serde_json::Value;

    use super::{
        decode_metrics, NodeMetric, OptimizationResult, PerformanceApi, OPTIMIZE_PATH,
        PERFORMANCE_PATH,
    };
    use crate::config::DashboardConfig;
    use crate::error::{ApiError, ApiResult};

    /// API client for the performance service
    pub struct ApiClient {
        base_url: String,
    }

    impl ApiClient {
        /// Create a new API client with the given base URL
        ///
        /// An empty base URL issues same-origin relative requests.
        pub fn new(base_url: impl Into<String>) -> Self {
            let base_url: String = base_url.into();
            Self {
                base_url: base_url.trim_end_matches('/').to_string(),
            }
        }

        /// Create an API client from dashboard configuration
        pub fn from_config(config: &DashboardConfig) -> Self {
            Self::new(config.api_url())
        }

        fn url(&self, path: &str) -> String {
            format!("{}{}", self.base_url, path)
        }
    }

    #[async_trait(?Send)]
    impl PerformanceApi for ApiClient {
        async fn performance(&self) -> ApiResult<Vec<NodeMetric>> {
            let url = self.url(PERFORMANCE_PATH);
            debug!(%url, "fetching performance metrics");
            let resp = Request::get(&url).send().await?;

            if resp.ok() {
                let body: Value = resp.json().await?;
                decode_metrics(body)
            } else {
                Err(ApiError::Http(resp.status()))
            }
        }

        async fn optimize(&self) -> ApiResult<OptimizationResult> {
            let url = self.url(OPTIMIZE_PATH);
            debug!(%url, "requesting network optimization");
            let resp = Request::post(&url).send().await?;

            if resp.ok() {
                Ok(resp.json().await?)
            } else {
                Err(ApiError::Http(resp.status()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_metrics_array() {
        let body = r#"[
            {"nodeId": "node-1", "cpuUsage": 75.5, "memoryUsage": 512, "taskLoad": 3},
            {"nodeId": 7, "cpuUsage": 12, "memoryUsage": 1024.25, "taskLoad": 0}
        ]"#;
        let metrics = decode_metrics(serde_json::from_str(body).unwrap()).unwrap();

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].node_id_text(), "node-1");
        assert_eq!(metrics[0].cpu(), Some(75.5));
        assert_eq!(metrics[1].node_id_text(), "7");
        assert_eq!(metrics[1].memory(), Some(1024.25));
        assert_eq!(metrics[1].load(), Some(0.0));
    }

    #[test]
    fn test_missing_fields_are_tolerated() {
        let metrics = decode_metrics(serde_json::json!([{"nodeId": "a"}])).unwrap();

        assert_eq!(metrics[0].node_id_text(), "a");
        assert!(metrics[0].cpu_usage.is_none());
        assert_eq!(display_field(metrics[0].cpu_usage.as_ref()), "undefined");
    }

    #[test]
    fn test_non_object_entries_keep_their_slot() {
        let metrics =
            decode_metrics(serde_json::json!([{"nodeId": "a", "cpuUsage": 1}, 5, null, "x"]))
                .unwrap();

        assert_eq!(metrics.len(), 4);
        assert_eq!(metrics[0].node_id_text(), "a");
        assert_eq!(metrics[0].cpu(), Some(1.0));
        for metric in &metrics[1..] {
            assert_eq!(*metric, NodeMetric::default());
        }
    }

    #[test]
    fn test_body_must_be_an_array() {
        let err = decode_metrics(serde_json::json!({"nodes": []})).unwrap_err();
        assert_eq!(
            err,
            ApiError::Decode("expected an array of node metrics, got an object".into())
        );
    }

    #[test]
    fn test_display_field() {
        assert_eq!(display_field(None), "undefined");
        assert_eq!(display_field(Some(&Value::Null)), "null");
        assert_eq!(display_field(Some(&Value::from("x"))), "x");
        assert_eq!(display_field(Some(&Value::from(42))), "42");
        assert_eq!(display_field(Some(&Value::from(12.5))), "12.5");
    }

    #[test]
    fn test_integral_floats_display_as_integers() {
        let value: Value = serde_json::from_str("2048.0").unwrap();
        assert_eq!(display_field(Some(&value)), "2048");
        assert_eq!(display_field(Some(&Value::from(-3.0))), "-3");
        assert_eq!(display_field(Some(&Value::from(0.5))), "0.5");
        assert_eq!(display_field(Some(&Value::from(1e300))), "1e300");
    }

    #[test]
    fn test_non_numeric_field_has_no_number() {
        let metric = NodeMetric {
            cpu_usage: Some(Value::from("high")),
            ..Default::default()
        };
        assert_eq!(metric.cpu(), None);
    }

    #[test]
    fn test_decode_optimization_result() {
        let result: OptimizationResult =
            serde_json::from_str(r#"{"message": "moved 3 tasks"}"#).unwrap();
        assert_eq!(result.message_text(), "moved 3 tasks");
    }

    #[test]
    fn test_optimization_message_is_not_validated() {
        for (body, shown) in [
            (r#"{}"#, "undefined"),
            (r#"{"message": 42}"#, "42"),
            (r#"{"message": null}"#, "null"),
        ] {
            let result: OptimizationResult = serde_json::from_str(body).unwrap();
            assert_eq!(result.message_text(), shown);
        }
    }
}
