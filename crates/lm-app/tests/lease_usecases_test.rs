use std::sync::Arc;

use tokio::sync::Mutex;

use lm_app::query_cache::{QueryKey, OWNER_LISTINGS, TENANT_REQUESTS};
use lm_app::usecases::ListingDraft;
use lm_app::{
    AccountCommands, AccountQueries, LeaseCommands, LeaseQueries, QueryCache, QueryError,
    SessionReadinessController, SessionReadinessDeps, SessionSettings,
};
use lm_core::ports::TimerPort;
use lm_core::{LeaseStatus, ReadinessState, RequestDecision, RequestStatus, UserProfile, UserRole};
use lm_infra::{LoopbackConnectionFactory, StaticIdentityProvider, Timer, TracingReadinessEmitter};

const OWNER: &str = "rrkah-fqaaa-aaaaa-aaaaq-cai";
const TENANT: &str = "ryjl3-tyaaa-aaaaa-aaaba-cai";
const ADMIN_TOKEN: &str = "local-admin";

async fn ready_session(
    backend: &LoopbackConnectionFactory,
    principal: &str,
    admin_token: &str,
) -> SessionReadinessController {
    let (timer, expirations) = Timer::channel();
    let timer: Arc<Mutex<dyn TimerPort>> = Arc::new(Mutex::new(timer));
    let controller = SessionReadinessController::from_deps(SessionReadinessDeps {
        identity_provider: Arc::new(StaticIdentityProvider::new(principal)),
        connection_factory: Arc::new(backend.clone()),
        timer,
        event_port: Arc::new(TracingReadinessEmitter),
        cache: QueryCache::new(),
        settings: SessionSettings {
            admin_token: admin_token.to_string(),
            ..SessionSettings::default()
        },
    });
    controller.spawn_timeout_listener(expirations);
    controller.login().await.unwrap();
    assert_eq!(controller.settled().await, ReadinessState::Ready);
    controller
}

fn draft(id: &str, location: &str) -> ListingDraft {
    ListingDraft {
        id: id.to_string(),
        location: location.to_string(),
        area: 42,
        capacity: 3,
    }
}

#[tokio::test]
async fn owner_listing_writes_refresh_cached_listings() {
    let backend = LoopbackConnectionFactory::new("");
    let owner = ready_session(&backend, OWNER, "").await;
    let queries = LeaseQueries::new(owner.clone());
    let commands = LeaseCommands::new(owner.clone());

    assert!(queries.owner_listings().await.unwrap().is_empty());

    let id = commands.create_listing(&draft("lease-1", "Lisbon")).await.unwrap();
    assert_eq!(id, "lease-1");
    assert_eq!(
        owner.cache().is_stale(&QueryKey::new(OWNER_LISTINGS)),
        Some(true)
    );
    assert_eq!(queries.owner_listings().await.unwrap().len(), 1);

    commands.update_listing(&draft("lease-1", "Porto")).await.unwrap();
    let listing = queries.listing("lease-1").await.unwrap().expect("listing");
    assert_eq!(listing.location, "Porto");

    commands.archive_listing("lease-1").await.unwrap();
    assert!(queries.active_listings().await.unwrap().is_empty());
    assert_eq!(
        queries.owner_listings().await.unwrap()[0].status,
        LeaseStatus::Archived
    );
}

#[tokio::test]
async fn request_lifecycle_between_tenant_and_owner() {
    let backend = LoopbackConnectionFactory::new("");
    let owner = ready_session(&backend, OWNER, "").await;
    let tenant = ready_session(&backend, TENANT, "").await;

    LeaseCommands::new(owner.clone())
        .create_listing(&draft("lease-7", "Braga"))
        .await
        .unwrap();

    let tenant_queries = LeaseQueries::new(tenant.clone());
    assert!(tenant_queries.tenant_requests().await.unwrap().is_empty());
    let request_id = LeaseCommands::new(tenant.clone())
        .submit_request("lease-7", "From March, two people")
        .await
        .unwrap();
    assert_eq!(
        tenant.cache().is_stale(&QueryKey::new(TENANT_REQUESTS)),
        Some(true)
    );
    assert_eq!(tenant_queries.tenant_requests().await.unwrap().len(), 1);

    let owner_queries = LeaseQueries::new(owner.clone());
    assert_eq!(owner_queries.pending_owner_requests().await.unwrap().len(), 1);
    assert_eq!(
        owner_queries.requests_for_listing("lease-7").await.unwrap()[0].id,
        request_id
    );

    LeaseCommands::new(owner.clone())
        .decide_request(&request_id, RequestDecision::Accepted)
        .await
        .unwrap();
    assert!(owner_queries.pending_owner_requests().await.unwrap().is_empty());
    assert_eq!(
        owner_queries.requests_for_listing("lease-7").await.unwrap()[0].status,
        RequestStatus::Accepted
    );
}

#[tokio::test]
async fn backend_rejections_are_reported_as_backend_errors() {
    let backend = LoopbackConnectionFactory::new("");
    let owner = ready_session(&backend, OWNER, "").await;
    let commands = LeaseCommands::new(owner.clone());

    commands.create_listing(&draft("lease-9", "Faro")).await.unwrap();
    let err = commands.submit_request("lease-9", "mine").await.unwrap_err();

    assert!(matches!(err, QueryError::Backend(_)));
}

#[tokio::test]
async fn profile_and_role_management() {
    let backend = LoopbackConnectionFactory::new(ADMIN_TOKEN);
    let admin = ready_session(&backend, OWNER, ADMIN_TOKEN).await;
    let user = ready_session(&backend, TENANT, "").await;

    let admin_queries = AccountQueries::new(admin.clone());
    assert!(admin_queries.is_caller_admin().await.unwrap());
    assert!(admin_queries.needs_profile_setup().await.unwrap());

    AccountCommands::new(admin.clone())
        .save_caller_profile(UserProfile {
            name: "Ana".to_string(),
        })
        .await
        .unwrap();
    assert!(!admin_queries.needs_profile_setup().await.unwrap());

    let user_queries = AccountQueries::new(user.clone());
    assert_eq!(user_queries.caller_role().await.unwrap(), UserRole::User);
    assert_eq!(
        user_queries.user_profile(OWNER).await.unwrap().map(|p| p.name),
        Some("Ana".to_string())
    );

    let err = AccountCommands::new(user.clone())
        .assign_role(TENANT, UserRole::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Backend(_)));

    AccountCommands::new(admin.clone())
        .assign_role(OWNER, UserRole::User)
        .await
        .unwrap();
    assert!(!admin_queries.is_caller_admin().await.unwrap());
}
