//! Readiness change sinks.

use async_trait::async_trait;
use lm_core::ports::ReadinessEventPort;
use lm_core::ReadinessState;
use tracing::{info, warn};

/// Logs every readiness change. Errors are logged at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReadinessEmitter;

#[async_trait]
impl ReadinessEventPort for TracingReadinessEmitter {
    async fn emit_readiness_changed(&self, state: ReadinessState) {
        match state.error() {
            Some(error) => warn!(
                kind = ?error.kind,
                cause = error.cause.as_deref().unwrap_or(""),
                "session readiness: {}",
                error
            ),
            None => info!(state = ?state, "session readiness changed"),
        }
    }
}
