//! Dependency assembly.
//!
//! The only place that depends on `lm-infra` and `lm-app` together. No
//! decisions are made here, only construction.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use lm_app::{
    AccountCommands, AccountQueries, LeaseCommands, LeaseQueries, QueryCache,
    SessionReadinessController, SessionReadinessDeps, SessionSettings,
};
use lm_core::ports::TimerPort;
use lm_core::AppConfig;
use lm_infra::{LoopbackConnectionFactory, StaticIdentityProvider, Timer, TracingReadinessEmitter};

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("session wiring requires a running tokio runtime: {0}")]
    RuntimeUnavailable(#[from] tokio::runtime::TryCurrentError),
}

/// Assembled session plus the use cases gated on it.
#[derive(Clone)]
pub struct SessionRuntime {
    pub session: SessionReadinessController,
    pub lease_queries: LeaseQueries,
    pub lease_commands: LeaseCommands,
    pub account_queries: AccountQueries,
    pub account_commands: AccountCommands,
}

/// Wires the controller against the loopback backend. Must run inside a
/// tokio runtime since it spawns the timer expiry listener.
pub fn wire_session(config: &AppConfig) -> WiringResult<SessionRuntime> {
    tokio::runtime::Handle::try_current()?;

    let (timer, expirations) = Timer::channel();
    let timer: Arc<Mutex<dyn TimerPort>> = Arc::new(Mutex::new(timer));

    let session = SessionReadinessController::from_deps(SessionReadinessDeps {
        identity_provider: Arc::new(StaticIdentityProvider::new(config.principal.clone())),
        connection_factory: Arc::new(LoopbackConnectionFactory::new(config.admin_token.clone())),
        timer,
        event_port: Arc::new(TracingReadinessEmitter),
        cache: QueryCache::new(),
        settings: SessionSettings::from_config(config),
    });
    session.spawn_timeout_listener(expirations);

    info!(
        init_timeout_ms = config.init_timeout_ms,
        connect_retry_limit = config.connect_retry_limit,
        "session readiness controller wired"
    );

    Ok(SessionRuntime {
        lease_queries: LeaseQueries::new(session.clone()),
        lease_commands: LeaseCommands::new(session.clone()),
        account_queries: AccountQueries::new(session.clone()),
        account_commands: AccountCommands::new(session.clone()),
        session,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wiring_outside_runtime_fails() {
        let result = wire_session(&AppConfig::default());
        assert!(matches!(result, Err(WiringError::RuntimeUnavailable(_))));
    }

    #[tokio::test]
    async fn wired_session_starts_unauthenticated() {
        let runtime = wire_session(&AppConfig::default()).unwrap();
        assert_eq!(
            runtime.session.state().await,
            lm_core::ReadinessState::Unauthenticated
        );
    }
}
