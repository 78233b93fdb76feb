use serde::Serialize;

use crate::readiness::ConnectionError;

/// Readiness of the authenticated backend session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReadinessState {
    /// No identity. The gate shows a login prompt.
    Unauthenticated,
    /// Identity present, connection not usable yet. The gate shows a spinner.
    Initializing,
    /// Construction, probe or liveness timer failed. The gate offers retry.
    Error { error: ConnectionError },
    /// Connection validated. Protected content may render.
    Ready,
}

/// Flags the readiness state is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadinessInputs {
    pub identity_present: bool,
    pub connection_present: bool,
    pub connection_fetching: bool,
    pub probe_in_flight: bool,
    pub error: Option<ConnectionError>,
}

impl ReadinessState {
    /// Pure derivation; identity absence dominates every other flag.
    pub fn derive(inputs: &ReadinessInputs) -> Self {
        if !inputs.identity_present {
            return Self::Unauthenticated;
        }
        if inputs.connection_present && !inputs.connection_fetching {
            return Self::Ready;
        }
        match &inputs.error {
            Some(error) => Self::Error {
                error: error.clone(),
            },
            None => Self::Initializing,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_initializing(&self) -> bool {
        matches!(self, Self::Initializing)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn error(&self) -> Option<&ConnectionError> {
        match self {
            Self::Error { error } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_inputs() -> Vec<ReadinessInputs> {
        let errors = [None, Some(ConnectionError::probe("boom")), Some(ConnectionError::timeout())];
        let mut out = Vec::new();
        for bits in 0..16u8 {
            for error in &errors {
                out.push(ReadinessInputs {
                    identity_present: bits & 1 != 0,
                    connection_present: bits & 2 != 0,
                    connection_fetching: bits & 4 != 0,
                    probe_in_flight: bits & 8 != 0,
                    error: error.clone(),
                });
            }
        }
        out
    }

    #[test]
    fn absent_identity_is_always_unauthenticated() {
        for inputs in all_inputs().into_iter().filter(|i| !i.identity_present) {
            assert_eq!(
                ReadinessState::derive(&inputs),
                ReadinessState::Unauthenticated,
                "{inputs:?}"
            );
        }
    }

    #[test]
    fn derive_is_deterministic_and_exclusive() {
        for inputs in all_inputs() {
            let first = ReadinessState::derive(&inputs);
            let second = ReadinessState::derive(&inputs);
            assert_eq!(first, second);

            let flags = [
                first == ReadinessState::Unauthenticated,
                first.is_initializing(),
                first.is_error(),
                first.is_ready(),
            ];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{inputs:?}");
        }
    }

    #[test]
    fn connection_still_fetching_is_not_ready() {
        let inputs = ReadinessInputs {
            identity_present: true,
            connection_present: true,
            connection_fetching: true,
            ..Default::default()
        };
        assert_eq!(ReadinessState::derive(&inputs), ReadinessState::Initializing);
    }

    #[test]
    fn error_wins_over_in_flight_work() {
        let inputs = ReadinessInputs {
            identity_present: true,
            connection_fetching: true,
            probe_in_flight: true,
            error: Some(ConnectionError::timeout()),
            ..Default::default()
        };
        let state = ReadinessState::derive(&inputs);
        assert!(state.error().is_some_and(|e| e.is_timeout()));
    }
}
