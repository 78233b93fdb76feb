use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use lm_core::ports::BackendConnection;
use lm_core::RequestDecision;

use crate::query_cache::{
    QueryCache, ACTIVE_LISTINGS, LISTING_REQUESTS, OWNER_LISTINGS, OWNER_REQUESTS,
    TENANT_REQUESTS,
};
use crate::usecases::{QueryError, SessionReadinessController};

/// Listing fields edited by owners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    pub id: String,
    pub location: String,
    pub area: u64,
    pub capacity: u64,
}

/// Readiness-gated lease writes.
#[derive(Clone)]
pub struct LeaseCommands {
    session: SessionReadinessController,
    cache: QueryCache,
}

impl LeaseCommands {
    pub fn new(session: SessionReadinessController) -> Self {
        let cache = session.cache().clone();
        Self { session, cache }
    }

    async fn connection(&self) -> Result<Arc<dyn BackendConnection>, QueryError> {
        self.session.connection().await.ok_or(QueryError::NotReady)
    }

    fn invalidate_listings(&self) {
        self.cache.invalidate(OWNER_LISTINGS);
        self.cache.invalidate(ACTIVE_LISTINGS);
    }

    pub async fn create_listing(&self, draft: &ListingDraft) -> Result<String, QueryError> {
        let connection = self.connection().await?;
        let span = info_span!("usecase.lease.create_listing", listing_id = %draft.id);
        let id = async {
            connection
                .create_lease_listing(&draft.id, &draft.location, draft.area, draft.capacity)
                .await
        }
        .instrument(span)
        .await?;
        info!(listing_id = %id, "lease listing created");
        self.invalidate_listings();
        Ok(id)
    }

    pub async fn update_listing(&self, draft: &ListingDraft) -> Result<(), QueryError> {
        let connection = self.connection().await?;
        connection
            .update_lease_listing(&draft.id, &draft.location, draft.area, draft.capacity)
            .await?;
        info!(listing_id = %draft.id, "lease listing updated");
        self.invalidate_listings();
        Ok(())
    }

    pub async fn archive_listing(&self, id: &str) -> Result<(), QueryError> {
        let connection = self.connection().await?;
        connection.archive_lease_listing(id).await?;
        info!(listing_id = %id, "lease listing archived");
        self.invalidate_listings();
        Ok(())
    }

    pub async fn submit_request(&self, listing_id: &str, info: &str) -> Result<String, QueryError> {
        let connection = self.connection().await?;
        let request_id = connection.submit_lease_request(listing_id, info).await?;
        info!(listing_id = %listing_id, request_id = %request_id, "lease request submitted");
        self.cache.invalidate(TENANT_REQUESTS);
        Ok(request_id)
    }

    pub async fn decide_request(
        &self,
        request_id: &str,
        decision: RequestDecision,
    ) -> Result<(), QueryError> {
        let connection = self.connection().await?;
        connection.update_request_status(request_id, decision).await?;
        info!(request_id = %request_id, ?decision, "lease request decided");
        self.cache.invalidate(OWNER_REQUESTS);
        self.cache.invalidate(TENANT_REQUESTS);
        self.cache.invalidate(LISTING_REQUESTS);
        Ok(())
    }
}
