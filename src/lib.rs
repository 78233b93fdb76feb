//! LeaseMarket client bootstrap.
//!
//! Assembles the session readiness controller from the workspace crates and
//! drives it headlessly.

pub mod bootstrap;
