//! Lease listing domain module.

pub mod availability;
pub mod masking;
pub mod model;

pub use availability::{availability_info, unavailable_message, AvailabilityInfo, BadgeVariant};
pub use masking::mask_lease_code_for_public_display;
pub use model::{LeaseListing, LeaseRequest, LeaseStatus, RequestDecision, RequestStatus};
