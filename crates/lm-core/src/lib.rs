//! # lm-core
//!
//! Core domain models and business logic for LeaseMarket.
//!
//! This crate contains pure logic without any infrastructure dependencies:
//! the session readiness state machine, the lease/account models returned by
//! the backend, and the ports that the application layer drives.

pub mod account;
pub mod config;
pub mod identity;
pub mod lease;
pub mod ports;
pub mod readiness;

// Re-export commonly used types at the crate root
pub use account::{UserProfile, UserRole};
pub use config::AppConfig;
pub use identity::{Identity, IdentityKey, LoginStatus};
pub use lease::{LeaseListing, LeaseRequest, LeaseStatus, RequestDecision, RequestStatus};
pub use readiness::{
    ConnectionError, ConnectionErrorKind, Generation, ReadinessAction, ReadinessEvent,
    ReadinessInputs, ReadinessState, ReadinessStateMachine, SessionSnapshot,
};
