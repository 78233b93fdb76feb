//! Identity provider backed by a fixed principal.

use anyhow::bail;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use lm_core::ports::IdentityProviderPort;
use lm_core::{Identity, LoginStatus};

#[derive(Debug, Default)]
struct ProviderState {
    identity: Option<Identity>,
    status: LoginStatus,
}

/// Logs in as a configured principal. Used by the headless driver and tests.
#[derive(Debug)]
pub struct StaticIdentityProvider {
    principal: String,
    state: RwLock<ProviderState>,
}

impl StaticIdentityProvider {
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            state: RwLock::new(ProviderState::default()),
        }
    }

    /// Provider that starts out already logged in.
    pub fn logged_in(principal: impl Into<String>) -> Self {
        let principal = principal.into();
        let identity = Identity::new(principal.clone());
        Self {
            principal,
            state: RwLock::new(ProviderState {
                identity: Some(identity),
                status: LoginStatus::LoggedIn,
            }),
        }
    }
}

#[async_trait]
impl IdentityProviderPort for StaticIdentityProvider {
    async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity.clone()
    }

    async fn login(&self) -> anyhow::Result<()> {
        let mut state = self.state.write().await;
        if state.identity.is_some() {
            return Ok(());
        }
        state.status = LoginStatus::LoggingIn;

        if self.principal.trim().is_empty() {
            state.status = LoginStatus::Idle;
            bail!("no principal configured for login");
        }

        let identity = Identity::new(self.principal.clone());
        info!(principal = %identity.short_principal(), "logged in");
        state.identity = Some(identity);
        state.status = LoginStatus::LoggedIn;
        Ok(())
    }

    async fn logout(&self) {
        let mut state = self.state.write().await;
        state.identity = None;
        state.status = LoginStatus::Idle;
    }

    async fn login_status(&self) -> LoginStatus {
        self.state.read().await.status
    }
}
