//! Execution contexts for background work and UI-affine delivery

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// A unit of work submitted to a scheduling lane.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Host-provided scheduling capability.
///
/// The loader submits exactly one background task per request and, on
/// success, exactly one UI task. Background tasks may run concurrently and
/// unordered; UI tasks must run strictly serially, on whatever thread the
/// host considers UI-affine. The core assumes no particular runtime.
pub trait Scheduler: Send + Sync {
    /// Run a blocking unit of work off the UI thread.
    fn run_background(&self, task: Task);
    /// Run a unit of work on the UI lane. Submission order is preserved.
    fn run_on_ui(&self, task: Task);
}

/// Tokio-backed [`Scheduler`]: background work goes to the blocking thread
/// pool, UI work is funneled through a channel into a [`UiLane`] the host
/// pumps from its main loop.
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
    ui_tx: mpsc::UnboundedSender<Task>,
}

impl TokioScheduler {
    /// Create a scheduler on the current runtime, paired with the lane that
    /// must be driven (`UiLane::run().await`) for deliveries to happen.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new() -> (Arc<Self>, UiLane) {
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let scheduler = Arc::new(Self {
            handle: tokio::runtime::Handle::current(),
            ui_tx,
        });
        (scheduler, UiLane { rx: ui_rx })
    }
}

impl Scheduler for TokioScheduler {
    fn run_background(&self, task: Task) {
        self.handle.spawn_blocking(task);
    }

    fn run_on_ui(&self, task: Task) {
        if self.ui_tx.send(task).is_err() {
            warn!("UI lane is gone, dropping delivery");
        }
    }
}

/// Single consumer of UI tasks. Executes tasks one at a time in submission
/// order, so everything submitted via [`Scheduler::run_on_ui`] is serialized.
pub struct UiLane {
    rx: mpsc::UnboundedReceiver<Task>,
}

impl UiLane {
    /// Drain tasks until every sender is dropped.
    pub async fn run(mut self) {
        while let Some(task) = self.rx.recv().await {
            task();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(flavor = "multi_thread")]
    async fn test_ui_lane_preserves_submission_order() {
        let (scheduler, lane) = TokioScheduler::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        for i in 0..10 {
            let order = Arc::clone(&order);
            scheduler.run_on_ui(Box::new(move || order.lock().unwrap().push(i)));
        }

        drop(scheduler);
        lane.run().await;

        assert_eq!(*order.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_background_tasks_run() {
        let (scheduler, lane) = TokioScheduler::new();
        let ran = Arc::new(AtomicUsize::new(0));

        for _ in 0..4 {
            let ran = Arc::clone(&ran);
            let ui = Arc::clone(&scheduler);
            scheduler.run_background(Box::new(move || {
                ran.fetch_add(1, Ordering::SeqCst);
                ui.run_on_ui(Box::new(|| {}));
            }));
        }

        drop(scheduler);
        lane.run().await;

        assert_eq!(ran.load(Ordering::SeqCst), 4);
    }
}
