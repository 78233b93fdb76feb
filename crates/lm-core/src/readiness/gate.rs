//! What an auth gate should present for a readiness state.

use serde::Serialize;

use crate::readiness::{ConnectionErrorKind, ReadinessState};

/// Title and description shown by a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuardMessage {
    pub title: &'static str,
    pub description: &'static str,
}

/// Centralized copy for auth guard error states.
pub struct AuthGuardCopy;

impl AuthGuardCopy {
    pub const INITIALIZATION_ERROR: GuardMessage = GuardMessage {
        title: "Initialization Error",
        description:
            "We're having trouble setting up your session. This usually resolves with a refresh.",
    };

    pub const CONNECTION_ERROR: GuardMessage = GuardMessage {
        title: "Connection Issue",
        description: "Unable to establish a connection to the backend. Please check your internet connection and try again.",
    };

    pub const AUTHENTICATION_REQUIRED: GuardMessage = GuardMessage {
        title: "Authentication Required",
        description: "Please sign in to access this page.",
    };

    pub fn for_error(kind: ConnectionErrorKind) -> GuardMessage {
        match kind {
            ConnectionErrorKind::Timeout => Self::INITIALIZATION_ERROR,
            ConnectionErrorKind::Construction | ConnectionErrorKind::Probe => {
                Self::CONNECTION_ERROR
            }
        }
    }
}

/// Presentation decision of a gate guarding protected content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum GateView {
    LoginPrompt { copy: GuardMessage },
    Spinner,
    /// Retry affordance plus a full reload as last-resort recovery; both are
    /// offered for every error kind.
    RetryPrompt { copy: GuardMessage },
    Content,
}

impl GateView {
    pub fn from_state(state: &ReadinessState) -> Self {
        match state {
            ReadinessState::Unauthenticated => Self::LoginPrompt {
                copy: AuthGuardCopy::AUTHENTICATION_REQUIRED,
            },
            ReadinessState::Initializing => Self::Spinner,
            ReadinessState::Error { error } => Self::RetryPrompt {
                copy: AuthGuardCopy::for_error(error.kind),
            },
            ReadinessState::Ready => Self::Content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readiness::ConnectionError;

    #[test]
    fn timeout_uses_initialization_copy() {
        let view = GateView::from_state(&ReadinessState::Error {
            error: ConnectionError::timeout(),
        });
        assert_eq!(
            view,
            GateView::RetryPrompt {
                copy: AuthGuardCopy::INITIALIZATION_ERROR
            }
        );
    }

    #[test]
    fn explicit_failures_use_connection_copy() {
        for error in [
            ConnectionError::construction("x"),
            ConnectionError::probe("y"),
        ] {
            let view = GateView::from_state(&ReadinessState::Error { error });
            assert!(matches!(
                view,
                GateView::RetryPrompt { copy, .. } if copy == AuthGuardCopy::CONNECTION_ERROR
            ));
        }
    }

    #[test]
    fn retry_prompt_serializes_copy_only() {
        let view = GateView::from_state(&ReadinessState::Error {
            error: ConnectionError::probe("denied"),
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "view": "retry-prompt",
                "copy": {
                    "title": "Connection Issue",
                    "description": AuthGuardCopy::CONNECTION_ERROR.description,
                }
            })
        );
    }

    #[test]
    fn other_states_map_directly() {
        assert_eq!(GateView::from_state(&ReadinessState::Initializing), GateView::Spinner);
        assert_eq!(GateView::from_state(&ReadinessState::Ready), GateView::Content);
        assert!(matches!(
            GateView::from_state(&ReadinessState::Unauthenticated),
            GateView::LoginPrompt { .. }
        ));
    }
}
