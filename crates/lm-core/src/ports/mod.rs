//! Port interfaces for the application layer
//!
//! Ports define the contract between the session controller (and the lease
//! use cases) and the collaborators it does not own: the identity provider,
//! the backend connection factory, timers, and readiness subscribers.

pub mod connection;
pub mod identity_provider;
pub mod readiness_event;
pub mod timer;

pub use connection::{BackendConnection, BackendError, ConnectionFactoryPort};
pub use identity_provider::IdentityProviderPort;
pub use readiness_event::ReadinessEventPort;
pub use timer::{TimerId, TimerPort};
