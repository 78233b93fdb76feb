//! Headless session driver.

use anyhow::Context;
use serde::Serialize;
use tracing::{info, warn};

use lm_core::lease::{availability_info, mask_lease_code_for_public_display, AvailabilityInfo};
use lm_core::readiness::GateView;
use lm_core::{ReadinessState, UserProfile};

use super::wiring::SessionRuntime;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingLine {
    pub code: String,
    pub location: String,
    pub area: u64,
    pub capacity: u64,
    pub availability: AvailabilityInfo,
}

/// What the session looked like once it settled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub state: ReadinessState,
    pub gate: GateView,
    pub display_name: Option<String>,
    pub listings: Vec<ListingLine>,
}

/// Logs in, waits for the session to settle (retrying once on error) and
/// collects what an authenticated page would show.
pub async fn run_headless(runtime: &SessionRuntime) -> anyhow::Result<SessionReport> {
    let session = &runtime.session;
    session.login().await.context("Failed to log in")?;

    let mut state = session.settled().await;
    if let Some(error) = state.error() {
        warn!(kind = ?error.kind, "session failed to initialize, retrying once");
        state = session.retry().await;
    }

    let gate = GateView::from_state(&state);
    if !state.is_ready() {
        info!(state = ?state, "session not ready");
        return Ok(SessionReport {
            state,
            gate,
            display_name: None,
            listings: Vec::new(),
        });
    }

    let profile = runtime
        .account_queries
        .caller_profile()
        .await
        .context("Failed to load caller profile")?;
    let display_name = UserProfile::display_name(profile.as_ref()).to_string();

    let listings = runtime
        .lease_queries
        .active_listings()
        .await
        .context("Failed to load active listings")?
        .into_iter()
        .map(|listing| ListingLine {
            code: mask_lease_code_for_public_display(Some(&listing.id)),
            availability: availability_info(listing.status),
            location: listing.location,
            area: listing.area,
            capacity: listing.capacity,
        })
        .collect();

    Ok(SessionReport {
        state,
        gate,
        display_name: Some(display_name),
        listings,
    })
}
