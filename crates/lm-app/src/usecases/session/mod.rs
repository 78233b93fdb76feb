//! Session readiness use cases.
//!
//! This module exposes the session readiness controller.

mod context;
pub mod controller;
mod settings;

pub use controller::{ControllerError, SessionReadinessController, SessionReadinessDeps};
pub use settings::SessionSettings;
