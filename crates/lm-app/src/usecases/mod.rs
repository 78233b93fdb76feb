pub mod account;
pub mod lease;
pub mod session;

mod error;

pub use account::{AccountCommands, AccountQueries};
pub use error::QueryError;
pub use lease::{LeaseCommands, LeaseQueries, ListingDraft};
pub use session::{SessionReadinessController, SessionReadinessDeps, SessionSettings};
