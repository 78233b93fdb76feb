use lm_core::ports::BackendError;

/// Errors produced by readiness-gated queries and mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Please wait for sign-in to finish and try again.")]
    NotReady,
    #[error(transparent)]
    Backend(#[from] BackendError),
}
