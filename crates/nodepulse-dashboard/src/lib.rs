//! nodepulse Dashboard - WebAssembly node performance dashboard
//!
//! Polls the performance service for per-node metrics, renders them into
//! the host page, and lets the operator trigger a network optimization.
//!
//! ## Features
//!
//! - **Periodic Refresh**: one fetch on load, then one per interval (60s default)
//! - **Stale-but-visible**: a failed refresh keeps the last rendered metrics
//! - **Fleet Summary**: averages plus high-load and underutilized nodes
//! - **Single-flight Optimize**: the button is disabled while a request runs
//!
//! ## Configuration
//!
//! The serving host can inject settings via meta tags:
//!
//! ```html
//! <meta name="nodepulse:api-url" content="http://monitor.local:8080">
//! <meta name="nodepulse:refresh-secs" content="30">
//! <meta name="nodepulse:log-level" content="debug">
//! ```
//!
//! Or via JavaScript:
//!
//! ```javascript
//! window.__NODEPULSE_CONFIG__ = {
//!     api_url: "http://monitor.local:8080",
//!     refresh_secs: 30
//! };
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Browser                           │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │          nodepulse-dashboard (WASM)                │  │
//! │  │  ┌──────────┐   ┌───────────┐   ┌──────────────┐   │  │
//! │  │  │ web      │ → │ Dashboard │ → │ ApiClient    │   │  │
//! │  │  │ (DOM)    │ ← │ controller│   │ (gloo-net)   │   │  │
//! │  │  └──────────┘   └───────────┘   └──────┬───────┘   │  │
//! │  └────────────────────────────────────────┼───────────┘  │
//! └───────────────────────────────────────────┼──────────────┘
//!                                             │ HTTP
//!                        GET /api/performance │ POST /api/optimize
//! ```
//!
//! The controller only sees the [`PerformanceApi`], [`MetricsSurface`],
//! [`TriggerControl`], [`Notifier`] and [`Ticker`] traits, so it runs and is
//! tested off the browser.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod render;
pub mod schedule;
pub mod summary;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use api::{NodeMetric, OptimizationResult, PerformanceApi};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, OptimizeOutcome, RefreshOutcome, RefreshStats};
pub use error::{ApiError, ApiResult, ConfigError};
pub use render::{MetricsSurface, NodeBlock, Notifier, TriggerControl};
pub use schedule::{RefreshHandle, Ticker};
pub use summary::{FleetSummary, LoadThresholds};

/// Mount the dashboard on the host page
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    web::start();
}
