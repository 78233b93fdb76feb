//! In-process backend used for local runs.
//!
//! All connections created by one factory share a single ledger, so a
//! listing created by one identity is visible to every other.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use lm_core::ports::{BackendConnection, BackendError, ConnectionFactoryPort};
use lm_core::{
    Identity, LeaseListing, LeaseRequest, LeaseStatus, RequestDecision, RequestStatus,
    UserProfile, UserRole,
};

/// Principal used for connections created without an identity.
pub const ANONYMOUS_PRINCIPAL: &str = "2vxsx-fae";

#[derive(Default)]
struct Ledger {
    listings: BTreeMap<String, LeaseListing>,
    requests: BTreeMap<String, LeaseRequest>,
    profiles: HashMap<String, UserProfile>,
    roles: HashMap<String, UserRole>,
}

impl Ledger {
    fn role_of(&self, principal: &str) -> UserRole {
        self.roles.get(principal).copied().unwrap_or(UserRole::Guest)
    }

    fn owned_listing(&self, id: &str, caller: &str) -> Result<&LeaseListing, BackendError> {
        let listing = self
            .listings
            .get(id)
            .ok_or_else(|| BackendError::NotFound(format!("listing {id}")))?;
        if listing.owner != caller {
            return Err(BackendError::Unauthorized(format!(
                "listing {id} belongs to another owner"
            )));
        }
        Ok(listing)
    }
}

#[derive(Clone)]
pub struct LoopbackConnectionFactory {
    ledger: Arc<Mutex<Ledger>>,
    admin_token: String,
}

impl LoopbackConnectionFactory {
    /// `admin_token` grants the admin role to the first caller presenting it.
    pub fn new(admin_token: impl Into<String>) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(Ledger::default())),
            admin_token: admin_token.into(),
        }
    }

    pub fn connect_as(&self, identity: Option<&Identity>) -> LoopbackConnection {
        LoopbackConnection {
            ledger: Arc::clone(&self.ledger),
            admin_token: self.admin_token.clone(),
            caller: identity
                .map(|i| i.principal_text().to_string())
                .unwrap_or_else(|| ANONYMOUS_PRINCIPAL.to_string()),
        }
    }
}

#[async_trait]
impl ConnectionFactoryPort for LoopbackConnectionFactory {
    async fn create_connection(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Arc<dyn BackendConnection>, BackendError> {
        let connection = self.connect_as(identity);
        debug!(caller = %connection.caller, "loopback connection created");
        Ok(Arc::new(connection))
    }
}

pub struct LoopbackConnection {
    ledger: Arc<Mutex<Ledger>>,
    admin_token: String,
    caller: String,
}

impl LoopbackConnection {
    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_anonymous(&self) -> bool {
        self.caller == ANONYMOUS_PRINCIPAL
    }

    fn require_user(&self, ledger: &Ledger) -> Result<(), BackendError> {
        match ledger.role_of(&self.caller) {
            UserRole::Admin | UserRole::User => Ok(()),
            UserRole::Guest => Err(BackendError::Unauthorized(
                "only registered users can do this".to_string(),
            )),
        }
    }
}

#[async_trait]
impl BackendConnection for LoopbackConnection {
    async fn initialize_access_control_with_secret(
        &self,
        secret: &str,
    ) -> Result<(), BackendError> {
        if self.is_anonymous() {
            return Ok(());
        }
        let mut ledger = self.ledger();
        let has_admin = ledger.roles.values().any(|role| *role == UserRole::Admin);
        let grant_admin = !has_admin && !self.admin_token.is_empty() && secret == self.admin_token;
        let role = ledger
            .roles
            .entry(self.caller.clone())
            .or_insert(UserRole::User);
        if grant_admin {
            *role = UserRole::Admin;
        }
        Ok(())
    }

    async fn get_active_listings(&self) -> Result<Vec<LeaseListing>, BackendError> {
        Ok(self
            .ledger()
            .listings
            .values()
            .filter(|listing| listing.status == LeaseStatus::Available)
            .cloned()
            .collect())
    }

    async fn get_owner_listings(&self) -> Result<Vec<LeaseListing>, BackendError> {
        Ok(self
            .ledger()
            .listings
            .values()
            .filter(|listing| listing.owner == self.caller)
            .cloned()
            .collect())
    }

    async fn create_lease_listing(
        &self,
        id: &str,
        location: &str,
        area: u64,
        capacity: u64,
    ) -> Result<String, BackendError> {
        let mut ledger = self.ledger();
        self.require_user(&ledger)?;

        let id = if id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            id.to_string()
        };
        if ledger.listings.contains_key(&id) {
            return Err(BackendError::Rejected(format!("listing {id} already exists")));
        }

        ledger.listings.insert(
            id.clone(),
            LeaseListing {
                id: id.clone(),
                status: LeaseStatus::Available,
                owner: self.caller.clone(),
                area,
                capacity,
                location: location.to_string(),
            },
        );
        Ok(id)
    }

    async fn update_lease_listing(
        &self,
        id: &str,
        location: &str,
        area: u64,
        capacity: u64,
    ) -> Result<(), BackendError> {
        let mut ledger = self.ledger();
        ledger.owned_listing(id, &self.caller)?;
        if let Some(listing) = ledger.listings.get_mut(id) {
            listing.location = location.to_string();
            listing.area = area;
            listing.capacity = capacity;
        }
        Ok(())
    }

    async fn archive_lease_listing(&self, id: &str) -> Result<(), BackendError> {
        let mut ledger = self.ledger();
        ledger.owned_listing(id, &self.caller)?;
        if let Some(listing) = ledger.listings.get_mut(id) {
            listing.status = LeaseStatus::Archived;
        }
        Ok(())
    }

    async fn submit_lease_request(
        &self,
        listing_id: &str,
        info: &str,
    ) -> Result<String, BackendError> {
        let mut ledger = self.ledger();
        self.require_user(&ledger)?;

        let listing = ledger
            .listings
            .get(listing_id)
            .ok_or_else(|| BackendError::NotFound(format!("listing {listing_id}")))?;
        if listing.status != LeaseStatus::Available {
            return Err(BackendError::Rejected(format!(
                "listing {listing_id} is not available"
            )));
        }
        if listing.owner == self.caller {
            return Err(BackendError::Rejected(
                "owners cannot request their own listing".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        ledger.requests.insert(
            id.clone(),
            LeaseRequest {
                id: id.clone(),
                status: RequestStatus::Pending,
                listing_id: listing_id.to_string(),
                info: info.to_string(),
                tenant: self.caller.clone(),
                request_date: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            },
        );
        Ok(id)
    }

    async fn get_tenant_requests(&self) -> Result<Vec<LeaseRequest>, BackendError> {
        Ok(self
            .ledger()
            .requests
            .values()
            .filter(|request| request.tenant == self.caller)
            .cloned()
            .collect())
    }

    async fn get_requests_for_owner(&self) -> Result<Vec<LeaseRequest>, BackendError> {
        let ledger = self.ledger();
        Ok(ledger
            .requests
            .values()
            .filter(|request| {
                ledger
                    .listings
                    .get(&request.listing_id)
                    .is_some_and(|listing| listing.owner == self.caller)
            })
            .cloned()
            .collect())
    }

    async fn get_requests_for_listing(
        &self,
        listing_id: &str,
    ) -> Result<Vec<LeaseRequest>, BackendError> {
        let ledger = self.ledger();
        ledger.owned_listing(listing_id, &self.caller)?;
        Ok(ledger
            .requests
            .values()
            .filter(|request| request.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn update_request_status(
        &self,
        request_id: &str,
        decision: RequestDecision,
    ) -> Result<(), BackendError> {
        let mut ledger = self.ledger();
        let request = ledger
            .requests
            .get(request_id)
            .ok_or_else(|| BackendError::NotFound(format!("request {request_id}")))?;
        if !request.is_pending() {
            return Err(BackendError::Rejected(format!(
                "request {request_id} was already decided"
            )));
        }
        let listing_id = request.listing_id.clone();
        ledger.owned_listing(&listing_id, &self.caller)?;

        if let Some(request) = ledger.requests.get_mut(request_id) {
            request.status = decision.into();
        }
        if decision == RequestDecision::Accepted {
            if let Some(listing) = ledger.listings.get_mut(&listing_id) {
                listing.status = LeaseStatus::Unavailable;
            }
        }
        Ok(())
    }

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, BackendError> {
        Ok(self.ledger().profiles.get(&self.caller).cloned())
    }

    async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<(), BackendError> {
        let mut ledger = self.ledger();
        self.require_user(&ledger)?;
        ledger.profiles.insert(self.caller.clone(), profile);
        Ok(())
    }

    async fn get_user_profile(
        &self,
        principal: &str,
    ) -> Result<Option<UserProfile>, BackendError> {
        Ok(self.ledger().profiles.get(principal).cloned())
    }

    async fn get_caller_user_role(&self) -> Result<UserRole, BackendError> {
        Ok(self.ledger().role_of(&self.caller))
    }

    async fn is_caller_admin(&self) -> Result<bool, BackendError> {
        Ok(self.ledger().role_of(&self.caller) == UserRole::Admin)
    }

    async fn assign_caller_user_role(
        &self,
        principal: &str,
        role: UserRole,
    ) -> Result<(), BackendError> {
        let mut ledger = self.ledger();
        if ledger.role_of(&self.caller) != UserRole::Admin {
            return Err(BackendError::Unauthorized(
                "only admins can assign roles".to_string(),
            ));
        }
        ledger.roles.insert(principal.to_string(), role);
        Ok(())
    }
}
