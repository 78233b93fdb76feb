use async_trait::async_trait;

use crate::identity::{Identity, LoginStatus};

#[async_trait]
pub trait IdentityProviderPort: Send + Sync {
    /// Current identity, `None` when signed out.
    async fn identity(&self) -> Option<Identity>;

    /// Runs the provider's login flow. Resolves once an identity is available.
    async fn login(&self) -> anyhow::Result<()>;

    async fn logout(&self);

    async fn login_status(&self) -> LoginStatus;
}
