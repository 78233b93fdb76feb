//! Readiness state machine.
//!
//! Defines a pure state transition function for session initialization.
//! Every connection attempt cycle is tagged with a [`Generation`]; results
//! carrying an older generation are dropped.

use serde::Serialize;
use std::fmt::{Display, Formatter};

use crate::identity::{Identity, IdentityKey};
use crate::readiness::{ConnectionError, ReadinessInputs, ReadinessState};

/// Connection attempt cycle number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Generation(u64);

impl Generation {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for Generation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the machine tracks for the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub generation: Generation,
    /// Validated connection handle exists.
    pub connection_present: bool,
    /// Connection factory call in flight.
    pub connection_fetching: bool,
    pub probe_in_flight: bool,
    pub error: Option<ConnectionError>,
    pub timeout_armed: bool,
    /// Set by retry; dependents are invalidated once the new connection is ready.
    pub invalidate_on_ready: bool,
}

impl SessionSnapshot {
    pub fn inputs(&self) -> ReadinessInputs {
        ReadinessInputs {
            identity_present: self.identity.is_some(),
            connection_present: self.connection_present,
            connection_fetching: self.connection_fetching,
            probe_in_flight: self.probe_in_flight,
            error: self.error.clone(),
        }
    }

    pub fn state(&self) -> ReadinessState {
        ReadinessState::derive(&self.inputs())
    }

    /// No further transition happens without outside input.
    pub fn is_settled(&self) -> bool {
        self.identity.is_none() || self.connection_present || self.error.is_some()
    }

    fn is_current(&self, generation: Generation) -> bool {
        self.identity.is_some() && self.generation == generation
    }
}

/// Events that drive the readiness flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessEvent {
    /// Identity provider reports a signed-in identity.
    IdentityAcquired { identity: Identity },
    /// Identity provider reports no identity (logout).
    IdentityCleared,
    /// Connection factory resolved; the probe is about to run.
    ConstructionSucceeded { generation: Generation },
    ConstructionFailed {
        generation: Generation,
        error: ConnectionError,
    },
    /// An automatic re-attempt of construction + probe started.
    AttemptRetrying { generation: Generation, attempt: u32 },
    ProbeSucceeded { generation: Generation },
    ProbeFailed {
        generation: Generation,
        error: ConnectionError,
    },
    /// The liveness timer armed for `generation` fired.
    TimeoutElapsed { generation: Generation },
    /// User asked to rebuild the connection.
    RetryRequested,
}

/// Side-effects produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessAction {
    /// Build a connection for `identity` and probe it.
    Connect {
        identity: Identity,
        generation: Generation,
    },
    /// Abort the in-flight connection attempt, if any.
    CancelConnect,
    ArmTimeout { generation: Generation },
    DisarmTimeout { generation: Generation },
    /// Drop the cached connection handle and probe result of `identity`.
    ResetConnectionCache { identity: IdentityKey },
    /// Mark every dependent cached query stale.
    InvalidateDependentQueries,
}

/// Pure readiness state machine.
pub struct ReadinessStateMachine;

impl ReadinessStateMachine {
    pub fn transition(
        session: SessionSnapshot,
        event: ReadinessEvent,
    ) -> (SessionSnapshot, Vec<ReadinessAction>) {
        match event {
            ReadinessEvent::IdentityAcquired { identity } => {
                if session.identity.as_ref() == Some(&identity) {
                    return (session, Vec::new());
                }
                let mut actions = Self::teardown(&session);
                // Dependent queries carry no identity; the previous caller's results must go.
                if session.identity.is_some() {
                    actions.push(ReadinessAction::InvalidateDependentQueries);
                }
                let next = Self::begin_attempt(&session, identity, false, &mut actions);
                (next, actions)
            }
            ReadinessEvent::IdentityCleared => {
                if session.identity.is_none() {
                    return (session, Vec::new());
                }
                let mut actions = Self::teardown(&session);
                actions.push(ReadinessAction::InvalidateDependentQueries);
                let next = SessionSnapshot {
                    generation: session.generation.next(),
                    ..SessionSnapshot::default()
                };
                (next, actions)
            }
            ReadinessEvent::RetryRequested => {
                let Some(identity) = session.identity.clone() else {
                    return (session, Vec::new());
                };
                let mut actions = Self::teardown(&session);
                let next = Self::begin_attempt(&session, identity, true, &mut actions);
                (next, actions)
            }
            ReadinessEvent::ConstructionSucceeded { generation } => {
                if !session.is_current(generation) || !session.connection_fetching {
                    return (session, Vec::new());
                }
                (
                    SessionSnapshot {
                        connection_fetching: false,
                        probe_in_flight: true,
                        ..session
                    },
                    Vec::new(),
                )
            }
            ReadinessEvent::AttemptRetrying { generation, .. } => {
                if !session.is_current(generation) || session.connection_present {
                    return (session, Vec::new());
                }
                (
                    SessionSnapshot {
                        connection_fetching: true,
                        probe_in_flight: false,
                        ..session
                    },
                    Vec::new(),
                )
            }
            ReadinessEvent::ConstructionFailed { generation, error }
            | ReadinessEvent::ProbeFailed { generation, error } => {
                if !session.is_current(generation) || session.connection_present {
                    return (session, Vec::new());
                }
                let mut actions = Vec::new();
                if session.timeout_armed {
                    actions.push(ReadinessAction::DisarmTimeout { generation });
                }
                // An explicit failure replaces a timeout recorded for the same attempt.
                (
                    SessionSnapshot {
                        connection_fetching: false,
                        probe_in_flight: false,
                        timeout_armed: false,
                        invalidate_on_ready: false,
                        error: Some(error),
                        ..session
                    },
                    actions,
                )
            }
            ReadinessEvent::ProbeSucceeded { generation } => {
                if !session.is_current(generation) {
                    return (session, Vec::new());
                }
                let mut actions = Vec::new();
                if session.timeout_armed {
                    actions.push(ReadinessAction::DisarmTimeout { generation });
                }
                if session.invalidate_on_ready {
                    actions.push(ReadinessAction::InvalidateDependentQueries);
                }
                (
                    SessionSnapshot {
                        connection_present: true,
                        connection_fetching: false,
                        probe_in_flight: false,
                        timeout_armed: false,
                        invalidate_on_ready: false,
                        error: None,
                        ..session
                    },
                    actions,
                )
            }
            ReadinessEvent::TimeoutElapsed { generation } => {
                if !session.is_current(generation) || !session.timeout_armed {
                    return (session, Vec::new());
                }
                if session.connection_present || session.error.is_some() {
                    return (
                        SessionSnapshot {
                            timeout_armed: false,
                            ..session
                        },
                        Vec::new(),
                    );
                }
                (
                    SessionSnapshot {
                        timeout_armed: false,
                        error: Some(ConnectionError::timeout()),
                        ..session
                    },
                    Vec::new(),
                )
            }
        }
    }

    /// Actions that dispose of everything bound to the current attempt.
    fn teardown(session: &SessionSnapshot) -> Vec<ReadinessAction> {
        let mut actions = Vec::new();
        if session.timeout_armed {
            actions.push(ReadinessAction::DisarmTimeout {
                generation: session.generation,
            });
        }
        if let Some(identity) = &session.identity {
            actions.push(ReadinessAction::CancelConnect);
            actions.push(ReadinessAction::ResetConnectionCache {
                identity: identity.key(),
            });
        }
        actions
    }

    fn begin_attempt(
        session: &SessionSnapshot,
        identity: Identity,
        invalidate_on_ready: bool,
        actions: &mut Vec<ReadinessAction>,
    ) -> SessionSnapshot {
        let generation = session.generation.next();
        actions.push(ReadinessAction::Connect {
            identity: identity.clone(),
            generation,
        });
        actions.push(ReadinessAction::ArmTimeout { generation });
        SessionSnapshot {
            identity: Some(identity),
            generation,
            connection_present: false,
            connection_fetching: true,
            probe_in_flight: false,
            error: None,
            timeout_armed: true,
            invalidate_on_ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity::new("alice-principal-0001")
    }

    fn logged_in() -> SessionSnapshot {
        let (session, _) = ReadinessStateMachine::transition(
            SessionSnapshot::default(),
            ReadinessEvent::IdentityAcquired { identity: alice() },
        );
        session
    }

    #[test]
    fn login_enters_initializing_and_arms_timer() {
        let (session, actions) = ReadinessStateMachine::transition(
            SessionSnapshot::default(),
            ReadinessEvent::IdentityAcquired { identity: alice() },
        );
        assert_eq!(session.state(), ReadinessState::Initializing);
        assert_eq!(
            actions,
            vec![
                ReadinessAction::Connect {
                    identity: alice(),
                    generation: Generation::new(1)
                },
                ReadinessAction::ArmTimeout {
                    generation: Generation::new(1)
                },
            ]
        );
    }

    #[test]
    fn same_identity_is_idempotent() {
        let session = logged_in();
        let (next, actions) = ReadinessStateMachine::transition(
            session.clone(),
            ReadinessEvent::IdentityAcquired { identity: alice() },
        );
        assert_eq!(next, session);
        assert!(actions.is_empty());
    }

    #[test]
    fn switching_identity_invalidates_dependents_and_rebuilds() {
        let session = logged_in();
        let previous = session.generation;
        let bob = Identity::new("bob-principal-0002");
        let (session, actions) = ReadinessStateMachine::transition(
            session,
            ReadinessEvent::IdentityAcquired {
                identity: bob.clone(),
            },
        );
        assert_eq!(session.identity, Some(bob.clone()));
        assert_eq!(session.state(), ReadinessState::Initializing);
        assert_eq!(
            actions,
            vec![
                ReadinessAction::DisarmTimeout {
                    generation: previous
                },
                ReadinessAction::CancelConnect,
                ReadinessAction::ResetConnectionCache {
                    identity: alice().key()
                },
                ReadinessAction::InvalidateDependentQueries,
                ReadinessAction::Connect {
                    identity: bob,
                    generation: previous.next()
                },
                ReadinessAction::ArmTimeout {
                    generation: previous.next()
                },
            ]
        );
    }

    #[test]
    fn construction_then_probe_success_reaches_ready() {
        let session = logged_in();
        let generation = session.generation;
        let (session, _) = ReadinessStateMachine::transition(
            session,
            ReadinessEvent::ConstructionSucceeded { generation },
        );
        assert!(session.probe_in_flight);
        assert_eq!(session.state(), ReadinessState::Initializing);

        let (session, actions) =
            ReadinessStateMachine::transition(session, ReadinessEvent::ProbeSucceeded { generation });
        assert_eq!(session.state(), ReadinessState::Ready);
        assert_eq!(actions, vec![ReadinessAction::DisarmTimeout { generation }]);
    }

    #[test]
    fn probe_failure_is_explicit_error_and_disarms_timer() {
        let session = logged_in();
        let generation = session.generation;
        let (session, actions) = ReadinessStateMachine::transition(
            session,
            ReadinessEvent::ProbeFailed {
                generation,
                error: ConnectionError::probe("denied"),
            },
        );
        assert!(session.state().error().is_some_and(|e| !e.is_timeout()));
        assert_eq!(actions, vec![ReadinessAction::DisarmTimeout { generation }]);
        assert!(!session.timeout_armed);
    }

    #[test]
    fn timeout_sets_timeout_error_when_nothing_resolved() {
        let session = logged_in();
        let generation = session.generation;
        let (session, _) = ReadinessStateMachine::transition(
            session,
            ReadinessEvent::TimeoutElapsed { generation },
        );
        assert!(session.state().error().is_some_and(|e| e.is_timeout()));
    }

    #[test]
    fn explicit_error_replaces_timeout_but_not_the_reverse() {
        let session = logged_in();
        let generation = session.generation;
        let (session, _) = ReadinessStateMachine::transition(
            session,
            ReadinessEvent::TimeoutElapsed { generation },
        );
        let (session, _) = ReadinessStateMachine::transition(
            session,
            ReadinessEvent::ConstructionFailed {
                generation,
                error: ConnectionError::construction("refused"),
            },
        );
        assert_eq!(
            session.error.as_ref().map(|e| e.kind),
            Some(crate::readiness::ConnectionErrorKind::Construction)
        );

        let (session, _) = ReadinessStateMachine::transition(
            session,
            ReadinessEvent::TimeoutElapsed { generation },
        );
        assert!(session.error.as_ref().is_some_and(|e| !e.is_timeout()));
    }

    #[test]
    fn logout_drops_late_timer_and_relogin_starts_fresh() {
        let session = logged_in();
        let stale = session.generation;
        let (session, actions) =
            ReadinessStateMachine::transition(session, ReadinessEvent::IdentityCleared);
        assert_eq!(session.state(), ReadinessState::Unauthenticated);
        assert!(actions.contains(&ReadinessAction::DisarmTimeout { generation: stale }));
        assert!(actions.contains(&ReadinessAction::CancelConnect));

        let (session, _) = ReadinessStateMachine::transition(
            session,
            ReadinessEvent::TimeoutElapsed { generation: stale },
        );
        assert_eq!(session.state(), ReadinessState::Unauthenticated);

        let (session, _) = ReadinessStateMachine::transition(
            session,
            ReadinessEvent::IdentityAcquired { identity: alice() },
        );
        let (session, _) = ReadinessStateMachine::transition(
            session,
            ReadinessEvent::TimeoutElapsed { generation: stale },
        );
        assert_eq!(session.state(), ReadinessState::Initializing);
    }

    #[test]
    fn retry_from_error_restarts_and_invalidates_on_ready() {
        let session = logged_in();
        let generation = session.generation;
        let (session, _) = ReadinessStateMachine::transition(
            session,
            ReadinessEvent::ProbeFailed {
                generation,
                error: ConnectionError::probe("denied"),
            },
        );
        let (session, actions) =
            ReadinessStateMachine::transition(session, ReadinessEvent::RetryRequested);
        let retry_generation = generation.next();
        assert_eq!(session.state(), ReadinessState::Initializing);
        assert_eq!(session.generation, retry_generation);
        assert!(actions.contains(&ReadinessAction::ResetConnectionCache {
            identity: alice().key()
        }));

        let (session, actions) = ReadinessStateMachine::transition(
            session,
            ReadinessEvent::ProbeSucceeded {
                generation: retry_generation,
            },
        );
        assert_eq!(session.state(), ReadinessState::Ready);
        assert!(actions.contains(&ReadinessAction::InvalidateDependentQueries));
    }

    #[test]
    fn superseded_attempt_results_are_ignored() {
        let session = logged_in();
        let first = session.generation;
        let (session, _) =
            ReadinessStateMachine::transition(session, ReadinessEvent::RetryRequested);
        let (session, _) = ReadinessStateMachine::transition(
            session,
            ReadinessEvent::ProbeFailed {
                generation: first,
                error: ConnectionError::probe("late"),
            },
        );
        assert_eq!(session.state(), ReadinessState::Initializing);
    }

    #[test]
    fn retry_without_identity_does_nothing() {
        let (session, actions) = ReadinessStateMachine::transition(
            SessionSnapshot::default(),
            ReadinessEvent::RetryRequested,
        );
        assert_eq!(session.state(), ReadinessState::Unauthenticated);
        assert!(actions.is_empty());
    }
}
