//! Caller profile and role use cases.

use std::sync::Arc;

use tracing::info;

use lm_core::ports::BackendConnection;
use lm_core::{UserProfile, UserRole};

use crate::query_cache::{
    QueryCache, QueryKey, CALLER_IS_ADMIN, CALLER_ROLE, CURRENT_USER_PROFILE, USER_PROFILE,
};
use crate::usecases::{QueryError, SessionReadinessController};

#[derive(Clone)]
pub struct AccountQueries {
    session: SessionReadinessController,
    cache: QueryCache,
}

impl AccountQueries {
    pub fn new(session: SessionReadinessController) -> Self {
        let cache = session.cache().clone();
        Self { session, cache }
    }

    async fn connection(&self) -> Result<Arc<dyn BackendConnection>, QueryError> {
        self.session.connection().await.ok_or(QueryError::NotReady)
    }

    pub async fn caller_profile(&self) -> Result<Option<UserProfile>, QueryError> {
        let connection = self.connection().await?;
        self.cache
            .fetch(QueryKey::new(CURRENT_USER_PROFILE), || async move {
                connection
                    .get_caller_user_profile()
                    .await
                    .map_err(QueryError::from)
            })
            .await
    }

    /// A signed-in caller without a stored profile must create one first.
    pub async fn needs_profile_setup(&self) -> Result<bool, QueryError> {
        Ok(self.caller_profile().await?.is_none())
    }

    pub async fn user_profile(&self, principal: &str) -> Result<Option<UserProfile>, QueryError> {
        let connection = self.connection().await?;
        let principal = principal.to_string();
        self.cache
            .fetch(QueryKey::with(USER_PROFILE, principal.clone()), || async move {
                connection
                    .get_user_profile(&principal)
                    .await
                    .map_err(QueryError::from)
            })
            .await
    }

    pub async fn caller_role(&self) -> Result<UserRole, QueryError> {
        let connection = self.connection().await?;
        self.cache
            .fetch(QueryKey::new(CALLER_ROLE), || async move {
                connection
                    .get_caller_user_role()
                    .await
                    .map_err(QueryError::from)
            })
            .await
    }

    pub async fn is_caller_admin(&self) -> Result<bool, QueryError> {
        let connection = self.connection().await?;
        self.cache
            .fetch(QueryKey::new(CALLER_IS_ADMIN), || async move {
                connection.is_caller_admin().await.map_err(QueryError::from)
            })
            .await
    }
}

#[derive(Clone)]
pub struct AccountCommands {
    session: SessionReadinessController,
    cache: QueryCache,
}

impl AccountCommands {
    pub fn new(session: SessionReadinessController) -> Self {
        let cache = session.cache().clone();
        Self { session, cache }
    }

    async fn connection(&self) -> Result<Arc<dyn BackendConnection>, QueryError> {
        self.session.connection().await.ok_or(QueryError::NotReady)
    }

    pub async fn save_caller_profile(&self, profile: UserProfile) -> Result<(), QueryError> {
        let connection = self.connection().await?;
        connection.save_caller_user_profile(profile).await?;
        info!("caller profile saved");
        self.cache.invalidate(CURRENT_USER_PROFILE);
        self.cache.invalidate(USER_PROFILE);
        Ok(())
    }

    pub async fn assign_role(&self, principal: &str, role: UserRole) -> Result<(), QueryError> {
        let connection = self.connection().await?;
        connection.assign_caller_user_role(principal, role).await?;
        info!(principal = %principal, ?role, "user role assigned");
        self.cache.invalidate(CALLER_ROLE);
        self.cache.invalidate(CALLER_IS_ADMIN);
        Ok(())
    }
}
