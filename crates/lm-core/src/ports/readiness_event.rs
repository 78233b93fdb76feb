use crate::readiness::ReadinessState;

#[async_trait::async_trait]
pub trait ReadinessEventPort: Send + Sync {
    /// Called whenever the derived readiness state changes.
    async fn emit_readiness_changed(&self, state: ReadinessState);
}
