//! Dashboard controller
//!
//! Fetches node metrics, renders them, and triggers the remote optimize
//! action. All collaborators are injected, so the controller never reaches
//! for the global document.
//!
//! Failure policy: nothing propagates. A failed refresh is logged and the
//! previous display is left as it was; a failed optimize is logged and the
//! user gets a fixed failure notification.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;
use tracing::{debug, error, info};

use crate::api::{NodeMetric, PerformanceApi};
use crate::render::{render_blocks, MetricsSurface, Notifier, TriggerControl};
use crate::schedule::{periodic, RefreshHandle, Ticker};
use crate::summary::{FleetSummary, LoadThresholds};

/// Prefix of the notification shown after a successful optimize call
pub const OPTIMIZE_SUCCESS_PREFIX: &str = "Optimization completed: ";

/// Notification shown after any failed optimize call
pub const OPTIMIZE_FAILURE_MESSAGE: &str = "Optimization failed. Check logs for details.";

/// What a refresh cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Metrics were fetched and this many blocks rendered
    Rendered(usize),
    /// Fetch failed; the previous display was kept
    Skipped,
}

/// What a click on the optimize control did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizeOutcome {
    /// Carries the server message as it was shown to the user
    Completed(String),
    Failed,
    /// Another optimize request was still in flight; nothing was sent
    AlreadyRunning,
}

/// Refresh counters since the controller was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshStats {
    pub succeeded: u64,
    pub failed: u64,
}

/// The dashboard controller
pub struct Dashboard {
    api: Rc<dyn PerformanceApi>,
    surface: Rc<dyn MetricsSurface>,
    trigger: Rc<dyn TriggerControl>,
    notifier: Rc<dyn Notifier>,
    thresholds: LoadThresholds,
    optimize_in_flight: Cell<bool>,
    stats: Cell<RefreshStats>,
}

impl Dashboard {
    pub fn new(
        api: Rc<dyn PerformanceApi>,
        surface: Rc<dyn MetricsSurface>,
        trigger: Rc<dyn TriggerControl>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            surface,
            trigger,
            notifier,
            thresholds: LoadThresholds::default(),
            optimize_in_flight: Cell::new(false),
            stats: Cell::new(RefreshStats::default()),
        }
    }

    /// Override the summary classification thresholds
    pub fn with_thresholds(mut self, thresholds: LoadThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn stats(&self) -> RefreshStats {
        self.stats.get()
    }

    pub fn is_optimizing(&self) -> bool {
        self.optimize_in_flight.get()
    }

    /// Fetch the current metrics; `None` on any failure
    pub async fn fetch_metrics(&self) -> Option<Vec<NodeMetric>> {
        match self.api.performance().await {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                error!(error = %e, "Error fetching performance data");
                None
            }
        }
    }

    /// Replace the display with one block per metric, in input order
    pub fn render(&self, metrics: &[NodeMetric]) {
        self.surface.replace(&render_blocks(metrics));
        self.surface
            .show_summary(&FleetSummary::from_metrics(metrics, self.thresholds));
    }

    /// One refresh cycle: fetch, then render if the fetch succeeded
    pub async fn refresh(&self) -> RefreshOutcome {
        let mut stats = self.stats.get();
        let outcome = match self.fetch_metrics().await {
            Some(metrics) => {
                self.render(&metrics);
                stats.succeeded += 1;
                RefreshOutcome::Rendered(metrics.len())
            }
            None => {
                stats.failed += 1;
                RefreshOutcome::Skipped
            }
        };
        self.stats.set(stats);
        debug!(?outcome, "refresh cycle finished");
        outcome
    }

    /// Ask the server to optimize the network
    ///
    /// At most one request is in flight: the trigger control is disabled
    /// until the call resolves and clicks in between are ignored.
    pub async fn trigger_optimization(&self) -> OptimizeOutcome {
        let Some(_guard) = InFlightGuard::acquire(self) else {
            debug!("optimization already in flight, ignoring trigger");
            return OptimizeOutcome::AlreadyRunning;
        };

        match self.api.optimize().await {
            Ok(result) => {
                let message = result.message_text();
                info!(result = %message, "optimization completed");
                self.notifier
                    .notify(&format!("{OPTIMIZE_SUCCESS_PREFIX}{message}"));
                OptimizeOutcome::Completed(message)
            }
            Err(e) => {
                error!(error = %e, status = ?e.status(), "Error during optimization");
                self.notifier.notify(OPTIMIZE_FAILURE_MESSAGE);
                OptimizeOutcome::Failed
            }
        }
    }

    /// Build the refresh task: one refresh now, then one per `interval`
    ///
    /// The caller spawns the returned future and keeps the handle; dropping
    /// or stopping the handle ends the task.
    pub fn start(
        self: &Rc<Self>,
        ticker: &dyn Ticker,
        interval: Duration,
    ) -> (LocalBoxFuture<'static, ()>, RefreshHandle) {
        info!(interval_secs = interval.as_secs(), "starting dashboard refresh");
        let dashboard = Rc::clone(self);
        periodic(ticker, interval, move || {
            let dashboard = Rc::clone(&dashboard);
            async move {
                dashboard.refresh().await;
            }
        })
    }
}

/// Marks an optimize request as in flight for its lifetime
struct InFlightGuard<'a> {
    dashboard: &'a Dashboard,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(dashboard: &'a Dashboard) -> Option<Self> {
        if dashboard.optimize_in_flight.replace(true) {
            return None;
        }
        dashboard.trigger.set_enabled(false);
        Some(Self { dashboard })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.dashboard.optimize_in_flight.set(false);
        self.dashboard.trigger.set_enabled(true);
    }
}
