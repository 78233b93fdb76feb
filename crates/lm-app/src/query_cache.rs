//! Query cache
//!
//! Explicitly passed cache of query results, keyed by [`QueryKey`]. Entries are
//! type-erased; callers read them back with the type they stored. Invalidation
//! marks entries stale (the next `fetch` reloads them), reset removes them.
//! A load that overlaps an invalidation or reset is returned to its caller but
//! stored stale, so it never outlives the invalidation as a fresh entry.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use lm_core::IdentityKey;
use tracing::debug;

pub const CONNECTION: &str = "connection";
pub const CONNECTION_HEALTH: &str = "connection-health";
pub const ACTIVE_LISTINGS: &str = "activeListings";
pub const OWNER_LISTINGS: &str = "ownerListings";
pub const CURRENT_USER_PROFILE: &str = "currentUserProfile";
pub const TENANT_REQUESTS: &str = "tenantRequests";
pub const OWNER_REQUESTS: &str = "ownerRequests";
pub const LISTING_REQUESTS: &str = "listingRequests";
pub const CALLER_ROLE: &str = "callerRole";
pub const CALLER_IS_ADMIN: &str = "callerIsAdmin";
pub const USER_PROFILE: &str = "userProfile";

/// Scopes owned by the session controller, never invalidated as dependents.
const SESSION_SCOPES: [&str; 2] = [CONNECTION, CONNECTION_HEALTH];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    scope: String,
    discriminator: Option<String>,
}

impl QueryKey {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            discriminator: None,
        }
    }

    pub fn with(scope: impl Into<String>, discriminator: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            discriminator: Some(discriminator.into()),
        }
    }

    pub fn connection(identity: &IdentityKey) -> Self {
        Self::with(CONNECTION, identity.as_str())
    }

    pub fn connection_health(identity: &IdentityKey) -> Self {
        Self::with(CONNECTION_HEALTH, identity.as_str())
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    fn is_session_scoped(&self) -> bool {
        SESSION_SCOPES.contains(&self.scope.as_str())
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.discriminator {
            Some(d) => write!(f, "{}/{}", self.scope, d),
            None => write!(f, "{}", self.scope),
        }
    }
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    stale: bool,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
struct CacheInner {
    entries: Mutex<HashMap<QueryKey, CacheEntry>>,
    /// Bumped by every invalidation, reset and clear.
    epoch: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Cloneable handle; clones share the same entries.
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stored value regardless of staleness.
    pub fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.entries()
            .get(key)
            .and_then(|entry| entry.value.downcast_ref::<T>().cloned())
    }

    /// Stored value only if it has not been invalidated.
    pub fn get_fresh<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.entries()
            .get(key)
            .filter(|entry| !entry.stale)
            .and_then(|entry| entry.value.downcast_ref::<T>().cloned())
    }

    pub fn insert<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        debug!(key = %key, "query cache set");
        self.entries().insert(
            key,
            CacheEntry {
                value: Arc::new(value),
                stale: false,
            },
        );
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries().contains_key(key)
    }

    /// `None` when the key is absent.
    pub fn is_stale(&self, key: &QueryKey) -> Option<bool> {
        self.entries().get(key).map(|entry| entry.stale)
    }

    /// Mark every entry of `scope` stale. Returns the number of entries touched.
    pub fn invalidate(&self, scope: &str) -> usize {
        self.mark_stale(|key| key.scope == scope)
    }

    pub fn invalidate_all(&self) -> usize {
        self.mark_stale(|_| true)
    }

    /// Mark every query that depends on the session connection stale.
    pub fn invalidate_dependents(&self) -> usize {
        self.mark_stale(|key| !key.is_session_scoped())
    }

    fn bump_epoch(&self) {
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
    }

    fn mark_stale(&self, matches: impl Fn(&QueryKey) -> bool) -> usize {
        let mut entries = self.entries();
        self.bump_epoch();
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if matches(key) {
                entry.stale = true;
                count += 1;
            }
        }
        if count > 0 {
            debug!(count, "invalidated query cache entries");
        }
        count
    }

    /// Remove a single entry.
    pub fn reset(&self, key: &QueryKey) -> bool {
        let mut entries = self.entries();
        self.bump_epoch();
        entries.remove(key).is_some()
    }

    /// Remove every entry of `scope`.
    pub fn reset_scope(&self, scope: &str) -> usize {
        let mut entries = self.entries();
        self.bump_epoch();
        let before = entries.len();
        entries.retain(|key, _| key.scope != scope);
        before - entries.len()
    }

    pub fn clear(&self) {
        let mut entries = self.entries();
        self.bump_epoch();
        entries.clear();
    }

    /// Returns the fresh cached value or runs `loader`, storing its result.
    /// Failed loads leave the previous entry untouched. A load that overlapped
    /// an invalidation is stored stale.
    pub async fn fetch<T, E, F, Fut>(&self, key: QueryKey, loader: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get_fresh::<T>(&key) {
            self.inner.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }

        self.inner.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "query cache miss");
        let started = self.inner.epoch.load(Ordering::Acquire);
        let value = loader().await?;

        let mut entries = self.entries();
        let stale = self.inner.epoch.load(Ordering::Acquire) != started;
        if stale {
            debug!(key = %key, "query cache load overlapped an invalidation, storing stale");
        }
        entries.insert(
            key,
            CacheEntry {
                value: Arc::new(value.clone()),
                stale,
            },
        );
        Ok(value)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries().len(),
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
        }
    }
}
