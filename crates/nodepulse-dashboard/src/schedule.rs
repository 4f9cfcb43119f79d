//! Periodic task scheduling
//!
//! The clock is injected through [`Ticker`] so the refresh cadence can be
//! driven by a virtual clock in tests and by `gloo-timers` in the browser.

use std::future::Future;
use std::time::Duration;

use futures::future::{AbortHandle, LocalBoxFuture};
use futures::stream::LocalBoxStream;
use futures::{FutureExt, StreamExt};

/// Source of periodic ticks
pub trait Ticker {
    /// A stream yielding once per `period`; the first tick arrives one full
    /// period after the call.
    fn ticks(&self, period: Duration) -> LocalBoxStream<'static, ()>;
}

/// Start/stop handle for a running periodic task
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct RefreshHandle {
    abort: AbortHandle,
}

impl RefreshHandle {
    /// Stop the task; an in-progress run is cancelled at its next await
    pub fn stop(&self) {
        self.abort.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.abort.is_aborted()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Build a task that runs `task` once immediately and then on every tick
///
/// Runs never overlap: a tick that arrives while `task` is still running is
/// handled after it completes. Ticks are counted from the call to
/// `periodic`, not from the end of the first run, so a slow first run does
/// not shift the cadence. The returned future must be spawned by the caller.
pub fn periodic<F, Fut>(
    ticker: &dyn Ticker,
    period: Duration,
    mut task: F,
) -> (LocalBoxFuture<'static, ()>, RefreshHandle)
where
    F: FnMut() -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    let mut ticks = ticker.ticks(period);
    let run = async move {
        task().await;
        while ticks.next().await.is_some() {
            task().await;
        }
    };

    let (run, abort) = futures::future::abortable(run);
    (run.map(|_| ()).boxed_local(), RefreshHandle { abort })
}

#[cfg(target_arch = "wasm32")]
pub use browser::IntervalTicker;

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::time::Duration;

    use futures::stream::LocalBoxStream;
    use futures::StreamExt;
    use gloo_timers::future::IntervalStream;

    use super::Ticker;

    /// `setInterval`-backed ticker
    #[derive(Debug, Default, Clone, Copy)]
    pub struct IntervalTicker;

    impl Ticker for IntervalTicker {
        fn ticks(&self, period: Duration) -> LocalBoxStream<'static, ()> {
            let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
            IntervalStream::new(millis).boxed_local()
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    use futures::stream::LocalBoxStream;
    use futures::StreamExt;
    use tokio::time::{interval_at, Instant};

    use super::Ticker;

    /// Ticker on the tokio clock, so `start_paused` tests run on virtual time
    pub(crate) struct TokioTicker;

    impl Ticker for TokioTicker {
        fn ticks(&self, period: Duration) -> LocalBoxStream<'static, ()> {
            let interval = interval_at(Instant::now() + period, period);
            futures::stream::unfold(interval, |mut interval| async move {
                interval.tick().await;
                Some(((), interval))
            })
            .boxed_local()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use tokio::task::LocalSet;
    use tokio::time::{sleep, Instant};

    use super::testing::TokioTicker;
    use super::*;

    fn counting(period: Duration) -> (Rc<Cell<u32>>, LocalBoxFuture<'static, ()>, RefreshHandle) {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let (task, handle) = periodic(&TokioTicker, period, move || {
            let counter = counter.clone();
            async move { counter.set(counter.get() + 1) }
        });
        (runs, task, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_each_period() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let (runs, task, _handle) = counting(Duration::from_secs(10));
                tokio::task::spawn_local(task);

                sleep(Duration::from_secs(1)).await;
                assert_eq!(runs.get(), 1);

                sleep(Duration::from_secs(30)).await;
                assert_eq!(runs.get(), 4);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cadence_is_anchored_at_start() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let origin = Instant::now();
                let starts = Rc::new(RefCell::new(Vec::new()));
                let recorded = starts.clone();
                let (task, _handle) = periodic(&TokioTicker, Duration::from_secs(10), move || {
                    let recorded = recorded.clone();
                    async move {
                        recorded.borrow_mut().push(origin.elapsed().as_secs());
                        sleep(Duration::from_secs(4)).await;
                    }
                });
                tokio::task::spawn_local(task);

                sleep(Duration::from_secs(25)).await;
                assert_eq!(*starts.borrow(), vec![0, 10, 20]);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_task() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let (runs, task, handle) = counting(Duration::from_secs(10));
                let join = tokio::task::spawn_local(task);

                sleep(Duration::from_secs(15)).await;
                assert_eq!(runs.get(), 2);

                handle.stop();
                assert!(handle.is_stopped());
                join.await.unwrap();

                sleep(Duration::from_secs(60)).await;
                assert_eq!(runs.get(), 2);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_task() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let (runs, task, handle) = counting(Duration::from_secs(10));
                let join = tokio::task::spawn_local(task);

                sleep(Duration::from_secs(5)).await;
                drop(handle);
                join.await.unwrap();

                sleep(Duration::from_secs(60)).await;
                assert_eq!(runs.get(), 1);
            })
            .await;
    }
}
