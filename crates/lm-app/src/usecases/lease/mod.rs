//! Lease listing and lease request use cases.
//!
//! Every operation requires a ready session; reads are served through the
//! query cache and writes invalidate the scopes they affect.

mod commands;
mod queries;

pub use commands::{LeaseCommands, ListingDraft};
pub use queries::LeaseQueries;
