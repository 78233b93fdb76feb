use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use lm_core::ports::{TimerId, TimerPort};
use tokio::sync::{mpsc, Mutex};
use tokio::time::sleep;
use tracing::debug;

/// Tokio-backed single-shot timers; expirations are sent on a channel.
pub struct Timer {
    timers: Arc<Mutex<HashMap<TimerId, tokio::task::AbortHandle>>>,
    expired_tx: mpsc::UnboundedSender<TimerId>,
}

impl Timer {
    pub fn new(expired_tx: mpsc::UnboundedSender<TimerId>) -> Self {
        Self {
            timers: Arc::new(Mutex::new(HashMap::new())),
            expired_tx,
        }
    }

    /// Timer plus the receiving end of its expirations.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimerId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

#[async_trait::async_trait]
impl TimerPort for Timer {
    async fn start(&mut self, timer_id: TimerId, ttl: Duration) -> anyhow::Result<()> {
        let timers = Arc::clone(&self.timers);
        let expired_tx = self.expired_tx.clone();

        let mut timers_guard = self.timers.lock().await;
        if let Some(existing) = timers_guard.remove(&timer_id) {
            existing.abort();
        }

        let handle = tokio::spawn(async move {
            sleep(ttl).await;
            let mut timers_guard = timers.lock().await;
            timers_guard.remove(&timer_id);
            drop(timers_guard);
            if expired_tx.send(timer_id).is_err() {
                debug!(timer_id = %timer_id, "timer expired with no receiver");
            }
        });

        timers_guard.insert(timer_id, handle.abort_handle());
        debug!(timer_id = %timer_id, ttl_ms = ttl.as_millis() as u64, "timer started");
        Ok(())
    }

    async fn stop(&mut self, timer_id: TimerId) -> anyhow::Result<()> {
        let mut timers_guard = self.timers.lock().await;
        if let Some(handle) = timers_guard.remove(&timer_id) {
            handle.abort();
            debug!(timer_id = %timer_id, "timer stopped");
        }
        Ok(())
    }
}
