use serde::{Deserialize, Serialize};

/// Which step of session initialization failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionErrorKind {
    /// The connection factory rejected.
    Construction,
    /// The health-check probe rejected.
    Probe,
    /// No connection was ready before the liveness timer fired.
    Timeout,
}

impl ConnectionErrorKind {
    /// Explicit failures carry a cause; a timeout never does.
    pub fn is_explicit(self) -> bool {
        !matches!(self, Self::Timeout)
    }
}

/// Error detail stored in the `Error` readiness state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    /// User-facing text.
    pub message: String,
    /// Underlying failure, kept for diagnostics.
    pub cause: Option<String>,
}

impl ConnectionError {
    pub fn construction(cause: impl Into<String>) -> Self {
        Self {
            kind: ConnectionErrorKind::Construction,
            message: "Unable to establish a connection to the backend".to_string(),
            cause: Some(cause.into()),
        }
    }

    pub fn probe(cause: impl Into<String>) -> Self {
        Self {
            kind: ConnectionErrorKind::Probe,
            message: "The backend rejected the session health check".to_string(),
            cause: Some(cause.into()),
        }
    }

    pub fn timeout() -> Self {
        Self {
            kind: ConnectionErrorKind::Timeout,
            message: "Session initialization timed out without a response from the backend"
                .to_string(),
            cause: None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ConnectionErrorKind::Timeout
    }
}
