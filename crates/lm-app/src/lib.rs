//! LeaseMarket Application Orchestration Layer
//!
//! This crate contains the session readiness controller, the query cache it
//! invalidates, and the lease/account use cases gated on readiness.

pub mod query_cache;
pub mod usecases;

pub use query_cache::{QueryCache, QueryKey};
pub use usecases::{
    AccountCommands, AccountQueries, LeaseCommands, LeaseQueries, QueryError,
    SessionReadinessController, SessionReadinessDeps, SessionSettings,
};
