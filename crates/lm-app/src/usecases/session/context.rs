use std::sync::Arc;

use lm_core::SessionSnapshot;
use tokio::sync::{watch, Mutex};

/// Shared session context containing the snapshot, dispatch lock and the
/// subscriber channel.
///
/// ## Lock Ordering
/// When acquiring both locks, acquire `dispatch_lock` first, then `snapshot`.
/// - `dispatch_lock`: serializes transition + action execution + state update.
/// - `snapshot`: used for reads and for the final write of a dispatch.
#[derive(Clone)]
pub(crate) struct SessionContext {
    snapshot: Arc<Mutex<SessionSnapshot>>,
    dispatch_lock: Arc<Mutex<()>>,
    notifier: watch::Sender<SessionSnapshot>,
}

impl SessionContext {
    pub(crate) fn new(initial: SessionSnapshot) -> Self {
        let (notifier, _) = watch::channel(initial.clone());
        Self {
            snapshot: Arc::new(Mutex::new(initial)),
            dispatch_lock: Arc::new(Mutex::new(())),
            notifier,
        }
    }

    /// Lightweight read; does NOT acquire `dispatch_lock`.
    pub(crate) async fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.lock().await.clone()
    }

    pub(crate) async fn acquire_dispatch_lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.dispatch_lock.lock().await
    }

    /// Stores the snapshot and wakes subscribers.
    ///
    /// This should only be called after acquiring `dispatch_lock`.
    pub(crate) async fn set_snapshot(&self, snapshot: SessionSnapshot) {
        let mut guard = self.snapshot.lock().await;
        *guard = snapshot.clone();
        self.notifier.send_replace(snapshot);
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.notifier.subscribe()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(SessionSnapshot::default())
    }
}
