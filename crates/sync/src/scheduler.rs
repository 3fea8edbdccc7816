//! Fixed-period sync scheduler
//!
//! One background tokio task per started scheduler. The first tick fires one
//! period after `start`; a slow tick delays the next one rather than
//! bursting. Tick failures are logged and never stop the loop.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{error, info};
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::error::{SyncError, SyncResult};
use crate::service::BalanceSync;

type TaskFuture = Pin<Box<dyn Future<Output = SyncResult<()>> + Send>>;
type Task = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

/// Start/stop handle around a periodic sync task
///
/// `stop` may be called from inside the task itself: it only signals the
/// loop, and the running invocation finishes normally.
pub struct SyncScheduler {
    period: Duration,
    task: Task,
    /// Present while a loop is running
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
}

impl SyncScheduler {
    pub fn new<F, Fut>(period: Duration, task: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SyncResult<()>> + Send + 'static,
    {
        Self {
            period,
            task: Arc::new(move || Box::pin(task()) as TaskFuture),
            stop_tx: Mutex::new(None),
        }
    }

    /// Scheduler running `sync.sync_once()` every `period`
    pub fn for_sync(period: Duration, sync: Arc<BalanceSync>) -> Self {
        Self::new(period, move || {
            let sync = Arc::clone(&sync);
            async move { sync.sync_once().await.map(|_| ()) }
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Spawn the ticking loop
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> SyncResult<()> {
        let mut stop_tx = self.stop_tx.lock().unwrap_or_else(PoisonError::into_inner);
        if stop_tx.is_some() {
            return Err(SyncError::AlreadyStarted);
        }

        let (tx, rx) = watch::channel(false);
        tokio::spawn(run_loop(self.period, Arc::clone(&self.task), rx));
        *stop_tx = Some(tx);

        info!("[TICKER] Started with period {:?}", self.period);
        Ok(())
    }

    /// Signal the loop to exit; no-op when not running
    pub fn stop(&self) {
        let stopped = self
            .stop_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(tx) = stopped {
            // The loop may already be gone; dropping the sender ends it too
            let _ = tx.send(true);
            info!("[TICKER] Stopped");
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop(period: Duration, task: Task, mut stop_rx: watch::Receiver<bool>) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = stop_rx.changed() => break,

            _ = ticker.tick() => {
                // Each tick runs in its own task so a panic cannot take the loop down
                match tokio::spawn(task()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error!("[TICKER] Sync failed: {}", e),
                    Err(e) => error!("[TICKER] Sync task aborted: {}", e),
                }
            }
        }
    }
}
