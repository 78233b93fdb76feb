use std::sync::Arc;

use lm_core::ports::BackendConnection;
use lm_core::{LeaseListing, LeaseRequest};

use crate::query_cache::{
    QueryCache, QueryKey, ACTIVE_LISTINGS, LISTING_REQUESTS, OWNER_LISTINGS, OWNER_REQUESTS,
    TENANT_REQUESTS,
};
use crate::usecases::{QueryError, SessionReadinessController};

/// Readiness-gated lease reads.
#[derive(Clone)]
pub struct LeaseQueries {
    session: SessionReadinessController,
    cache: QueryCache,
}

impl LeaseQueries {
    pub fn new(session: SessionReadinessController) -> Self {
        let cache = session.cache().clone();
        Self { session, cache }
    }

    async fn connection(&self) -> Result<Arc<dyn BackendConnection>, QueryError> {
        self.session.connection().await.ok_or(QueryError::NotReady)
    }

    /// Listings open to every visitor.
    pub async fn active_listings(&self) -> Result<Vec<LeaseListing>, QueryError> {
        let connection = self.connection().await?;
        self.cache
            .fetch(QueryKey::new(ACTIVE_LISTINGS), || async move {
                connection.get_active_listings().await.map_err(QueryError::from)
            })
            .await
    }

    /// Listings owned by the caller.
    pub async fn owner_listings(&self) -> Result<Vec<LeaseListing>, QueryError> {
        let connection = self.connection().await?;
        self.cache
            .fetch(QueryKey::new(OWNER_LISTINGS), || async move {
                connection.get_owner_listings().await.map_err(QueryError::from)
            })
            .await
    }

    /// Looks a listing up by its lease code among the active listings.
    pub async fn listing(&self, id: &str) -> Result<Option<LeaseListing>, QueryError> {
        let listings = self.active_listings().await?;
        Ok(listings.into_iter().find(|listing| listing.id == id))
    }

    pub async fn tenant_requests(&self) -> Result<Vec<LeaseRequest>, QueryError> {
        let connection = self.connection().await?;
        self.cache
            .fetch(QueryKey::new(TENANT_REQUESTS), || async move {
                connection.get_tenant_requests().await.map_err(QueryError::from)
            })
            .await
    }

    pub async fn owner_requests(&self) -> Result<Vec<LeaseRequest>, QueryError> {
        let connection = self.connection().await?;
        self.cache
            .fetch(QueryKey::new(OWNER_REQUESTS), || async move {
                connection.get_requests_for_owner().await.map_err(QueryError::from)
            })
            .await
    }

    pub async fn requests_for_listing(
        &self,
        listing_id: &str,
    ) -> Result<Vec<LeaseRequest>, QueryError> {
        let connection = self.connection().await?;
        let listing_id = listing_id.to_string();
        self.cache
            .fetch(
                QueryKey::with(LISTING_REQUESTS, listing_id.clone()),
                || async move {
                    connection
                        .get_requests_for_listing(&listing_id)
                        .await
                        .map_err(QueryError::from)
                },
            )
            .await
    }

    /// Pending requests across the caller's listings.
    pub async fn pending_owner_requests(&self) -> Result<Vec<LeaseRequest>, QueryError> {
        let requests = self.owner_requests().await?;
        Ok(requests.into_iter().filter(LeaseRequest::is_pending).collect())
    }
}
