//! Backend connection ("actor") ports.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::account::{UserProfile, UserRole};
use crate::identity::Identity;
use crate::lease::{LeaseListing, LeaseRequest, RequestDecision};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend transport failed: {0}")]
    Transport(String),

    #[error("backend rejected the call: {0}")]
    Rejected(String),

    #[error("caller is not authorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Capability object bound to one identity (or anonymous).
#[async_trait]
pub trait BackendConnection: Send + Sync {
    /// Access-control bootstrap. Used as the session health-check probe.
    async fn initialize_access_control_with_secret(&self, secret: &str)
        -> Result<(), BackendError>;

    async fn get_active_listings(&self) -> Result<Vec<LeaseListing>, BackendError>;
    async fn get_owner_listings(&self) -> Result<Vec<LeaseListing>, BackendError>;
    async fn create_lease_listing(
        &self,
        id: &str,
        location: &str,
        area: u64,
        capacity: u64,
    ) -> Result<String, BackendError>;
    async fn update_lease_listing(
        &self,
        id: &str,
        location: &str,
        area: u64,
        capacity: u64,
    ) -> Result<(), BackendError>;
    async fn archive_lease_listing(&self, id: &str) -> Result<(), BackendError>;

    async fn submit_lease_request(&self, listing_id: &str, info: &str)
        -> Result<String, BackendError>;
    async fn get_tenant_requests(&self) -> Result<Vec<LeaseRequest>, BackendError>;
    async fn get_requests_for_owner(&self) -> Result<Vec<LeaseRequest>, BackendError>;
    async fn get_requests_for_listing(
        &self,
        listing_id: &str,
    ) -> Result<Vec<LeaseRequest>, BackendError>;
    async fn update_request_status(
        &self,
        request_id: &str,
        decision: RequestDecision,
    ) -> Result<(), BackendError>;

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, BackendError>;
    async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<(), BackendError>;
    async fn get_user_profile(&self, principal: &str)
        -> Result<Option<UserProfile>, BackendError>;
    async fn get_caller_user_role(&self) -> Result<UserRole, BackendError>;
    async fn is_caller_admin(&self) -> Result<bool, BackendError>;
    async fn assign_caller_user_role(
        &self,
        principal: &str,
        role: UserRole,
    ) -> Result<(), BackendError>;
}

#[async_trait]
pub trait ConnectionFactoryPort: Send + Sync {
    /// Builds a connection for `identity`, anonymous when `None`.
    async fn create_connection(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Arc<dyn BackendConnection>, BackendError>;
}
