//! Session readiness domain module.
//!
//! This module defines the readiness state machine that decides whether
//! authenticated backend operations may run.

pub mod error;
pub mod gate;
pub mod state;
pub mod state_machine;

pub use error::{ConnectionError, ConnectionErrorKind};
pub use gate::{AuthGuardCopy, GateView, GuardMessage};
pub use state::{ReadinessInputs, ReadinessState};
pub use state_machine::{
    Generation, ReadinessAction, ReadinessEvent, ReadinessStateMachine, SessionSnapshot,
};
