//! Session readiness controller.
//!
//! This module coordinates the readiness state machine with its side
//! effects: connection construction, the health-check probe, the liveness
//! timer and query cache invalidation.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use lm_core::{
    ports::{
        BackendConnection, ConnectionFactoryPort, IdentityProviderPort, ReadinessEventPort,
        TimerId, TimerPort,
    },
    ConnectionError, ConnectionErrorKind, Generation, Identity, LoginStatus, ReadinessAction,
    ReadinessEvent, ReadinessState, ReadinessStateMachine, SessionSnapshot,
};

use crate::query_cache::{QueryCache, QueryKey};
use crate::usecases::session::context::SessionContext;
use crate::usecases::session::SessionSettings;

/// Errors produced by the session readiness controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("login failed: {0}")]
    Login(#[source] anyhow::Error),
}

/// Cached outcome of the health-check probe for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    Failed(ConnectionError),
}

/// Helper for constructing the controller with explicit dependency fields.
pub struct SessionReadinessDeps {
    pub identity_provider: Arc<dyn IdentityProviderPort>,
    pub connection_factory: Arc<dyn ConnectionFactoryPort>,
    pub timer: Arc<Mutex<dyn TimerPort>>,
    pub event_port: Arc<dyn ReadinessEventPort>,
    pub cache: QueryCache,
    pub settings: SessionSettings,
}

/// Single authority on whether authenticated operations may run.
///
/// Clones share the same session.
#[derive(Clone)]
pub struct SessionReadinessController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    context: SessionContext,
    identity_provider: Arc<dyn IdentityProviderPort>,
    connection_factory: Arc<dyn ConnectionFactoryPort>,
    timer: Arc<Mutex<dyn TimerPort>>,
    event_port: Arc<dyn ReadinessEventPort>,
    cache: QueryCache,
    settings: SessionSettings,
    connect_task: StdMutex<Option<AbortHandle>>,
    timeout_listener: StdMutex<Option<AbortHandle>>,
}

type ConnectTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

impl SessionReadinessController {
    pub fn from_deps(deps: SessionReadinessDeps) -> Self {
        let SessionReadinessDeps {
            identity_provider,
            connection_factory,
            timer,
            event_port,
            cache,
            settings,
        } = deps;

        Self {
            inner: Arc::new(ControllerInner {
                context: SessionContext::default(),
                identity_provider,
                connection_factory,
                timer,
                event_port,
                cache,
                settings,
                connect_task: StdMutex::new(None),
                timeout_listener: StdMutex::new(None),
            }),
        }
    }

    /// Runs the provider login, then starts initializing for the new identity.
    pub async fn login(&self) -> Result<ReadinessState, ControllerError> {
        self.inner
            .identity_provider
            .login()
            .await
            .map_err(|err| {
                error!(error = %err, "identity provider login failed");
                ControllerError::Login(err)
            })?;
        Ok(self.sync_identity().await)
    }

    pub async fn logout(&self) -> ReadinessState {
        self.inner.identity_provider.logout().await;
        self.inner
            .dispatch(ReadinessEvent::IdentityCleared)
            .await
            .state()
    }

    /// Re-reads the identity provider and reacts to a changed identity.
    pub async fn sync_identity(&self) -> ReadinessState {
        let event = match self.inner.identity_provider.identity().await {
            Some(identity) => ReadinessEvent::IdentityAcquired { identity },
            None => ReadinessEvent::IdentityCleared,
        };
        self.inner.dispatch(event).await.state()
    }

    /// Discards the current connection and probe result, rebuilds both and
    /// waits until the session settles. Dependent queries are invalidated
    /// once the new connection is ready.
    pub async fn retry(&self) -> ReadinessState {
        let mut updates = self.inner.context.subscribe();
        let snapshot = self.inner.dispatch(ReadinessEvent::RetryRequested).await;
        if snapshot.identity.is_none() {
            debug!("retry ignored without identity");
            return snapshot.state();
        }

        info!(generation = %snapshot.generation, "session retry started");
        self.wait_settled(&mut updates).await
    }

    /// Waits until the session is ready, failed, or signed out.
    pub async fn settled(&self) -> ReadinessState {
        let mut updates = self.inner.context.subscribe();
        self.wait_settled(&mut updates).await
    }

    async fn wait_settled(&self, updates: &mut watch::Receiver<SessionSnapshot>) -> ReadinessState {
        let settled = updates
            .wait_for(SessionSnapshot::is_settled)
            .await
            .map(|snapshot| snapshot.state());
        match settled {
            Ok(state) => state,
            Err(_) => self.state().await,
        }
    }

    /// Feeds an expired liveness timer into the state machine.
    pub async fn handle_timer_expired(&self, timer_id: TimerId) -> ReadinessState {
        self.inner.handle_timer_expired(timer_id).await.state()
    }

    /// Drains timer expirations delivered by the timer adapter.
    pub fn spawn_timeout_listener(&self, mut expirations: mpsc::UnboundedReceiver<TimerId>) {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            while let Some(timer_id) = expirations.recv().await {
                inner.handle_timer_expired(timer_id).await;
            }
            debug!("timer expiry channel closed");
        });

        let previous = lock(&self.inner.timeout_listener).replace(task.abort_handle());
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Tears the session down: stops the listener, the in-flight connection
    /// attempt and the liveness timer.
    pub async fn shutdown(&self) {
        if let Some(listener) = lock(&self.inner.timeout_listener).take() {
            listener.abort();
        }

        let _dispatch_guard = self.inner.context.acquire_dispatch_lock().await;
        if let Some(task) = lock(&self.inner.connect_task).take() {
            task.abort();
        }
        let mut snapshot = self.inner.context.snapshot().await;
        if snapshot.timeout_armed {
            self.inner.disarm_timeout(snapshot.generation).await;
            snapshot.timeout_armed = false;
            self.inner.context.set_snapshot(snapshot).await;
        }
        info!("session readiness controller shut down");
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.context.snapshot().await
    }

    pub async fn state(&self) -> ReadinessState {
        self.snapshot().await.state()
    }

    pub async fn is_ready(&self) -> bool {
        self.state().await.is_ready()
    }

    pub async fn is_initializing(&self) -> bool {
        self.state().await.is_initializing()
    }

    pub async fn has_error(&self) -> bool {
        self.state().await.is_error()
    }

    pub async fn error_detail(&self) -> Option<ConnectionError> {
        self.state().await.error().cloned()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.snapshot().await.identity
    }

    pub async fn login_status(&self) -> LoginStatus {
        self.inner.identity_provider.login_status().await
    }

    /// Subscribe to every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.context.subscribe()
    }

    /// The validated connection, only while the session is ready.
    pub async fn connection(&self) -> Option<Arc<dyn BackendConnection>> {
        let snapshot = self.snapshot().await;
        if !snapshot.state().is_ready() {
            return None;
        }
        let identity = snapshot.identity?;
        self.inner
            .cache
            .get::<Arc<dyn BackendConnection>>(&QueryKey::connection(&identity.key()))
    }

    pub async fn probe_outcome(&self) -> Option<ProbeOutcome> {
        let identity = self.identity().await?;
        self.inner
            .cache
            .get::<ProbeOutcome>(&QueryKey::connection_health(&identity.key()))
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }
}

impl ControllerInner {
    async fn dispatch(self: &Arc<Self>, event: ReadinessEvent) -> SessionSnapshot {
        // Serializes transition + action execution + state update.
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;
        self.apply(event).await
    }

    /// Caller must hold the dispatch lock.
    async fn apply(self: &Arc<Self>, event: ReadinessEvent) -> SessionSnapshot {
        let span = info_span!("usecase.session_readiness.dispatch", event = ?event);
        async {
            let current = self.context.snapshot().await;
            let from = current.state();
            let (next, actions) = ReadinessStateMachine::transition(current, event);
            let to = next.state();
            if from != to {
                info!(from = ?from, to = ?to, generation = %next.generation, "readiness state transition");
            } else {
                debug!(state = ?to, generation = %next.generation, "readiness state unchanged");
            }

            self.execute_actions(actions).await;
            self.context.set_snapshot(next.clone()).await;
            if from != to {
                self.event_port.emit_readiness_changed(to).await;
            }
            next
        }
        .instrument(span)
        .await
    }

    async fn execute_actions(self: &Arc<Self>, actions: Vec<ReadinessAction>) {
        for action in actions {
            debug!(?action, "readiness executing action");
            match action {
                ReadinessAction::Connect {
                    identity,
                    generation,
                } => {
                    let task = tokio::spawn(Arc::clone(self).run_connect(identity, generation));
                    let previous = lock(&self.connect_task).replace(task.abort_handle());
                    if let Some(previous) = previous {
                        previous.abort();
                    }
                }
                ReadinessAction::CancelConnect => {
                    if let Some(task) = lock(&self.connect_task).take() {
                        task.abort();
                        debug!("in-flight connection attempt cancelled");
                    }
                }
                ReadinessAction::ArmTimeout { generation } => {
                    let ttl = self.settings.init_timeout;
                    if let Err(err) = self
                        .timer
                        .lock()
                        .await
                        .start(TimerId::from(generation), ttl)
                        .await
                    {
                        error!(error = %err, generation = %generation, "failed to arm readiness timeout");
                    }
                }
                ReadinessAction::DisarmTimeout { generation } => {
                    self.disarm_timeout(generation).await;
                }
                ReadinessAction::ResetConnectionCache { identity } => {
                    self.cache.reset(&QueryKey::connection(&identity));
                    self.cache.reset(&QueryKey::connection_health(&identity));
                }
                ReadinessAction::InvalidateDependentQueries => {
                    let count = self.cache.invalidate_dependents();
                    info!(count, "dependent queries invalidated");
                }
            }
        }
    }

    async fn disarm_timeout(&self, generation: Generation) {
        if let Err(err) = self.timer.lock().await.stop(TimerId::from(generation)).await {
            warn!(error = %err, generation = %generation, "failed to disarm readiness timeout");
        }
    }

    async fn handle_timer_expired(self: &Arc<Self>, timer_id: TimerId) -> SessionSnapshot {
        let generation = Generation::new(timer_id.value());
        let snapshot = self
            .dispatch(ReadinessEvent::TimeoutElapsed { generation })
            .await;
        if snapshot.error.as_ref().is_some_and(ConnectionError::is_timeout)
            && snapshot.generation == generation
        {
            warn!(
                generation = %generation,
                timeout_ms = self.settings.init_timeout.as_millis() as u64,
                "session initialization timed out"
            );
        }
        snapshot
    }

    /// Boxed so the spawned future does not name its own type.
    fn run_connect(self: Arc<Self>, identity: Identity, generation: Generation) -> ConnectTask {
        let span = info_span!(
            "usecase.session_readiness.connect",
            principal = %identity,
            generation = %generation
        );
        Box::pin(
            async move {
                let mut attempt = 0u32;
                loop {
                    match self.attempt_connection(&identity, generation).await {
                        Ok(connection) => {
                            self.settle(generation, &identity, Ok(connection)).await;
                            return;
                        }
                        Err(err) if attempt < self.settings.connect_retry_limit => {
                            attempt += 1;
                            let delay = self.settings.retry_delay(attempt);
                            warn!(
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                kind = ?err.kind,
                                cause = ?err.cause,
                                "connection attempt failed, retrying"
                            );
                            tokio::time::sleep(delay).await;
                            self.dispatch(ReadinessEvent::AttemptRetrying {
                                generation,
                                attempt,
                            })
                            .await;
                        }
                        Err(err) => {
                            self.settle(generation, &identity, Err(err)).await;
                            return;
                        }
                    }
                }
            }
            .instrument(span),
        )
    }

    /// One construction + probe round trip.
    async fn attempt_connection(
        self: &Arc<Self>,
        identity: &Identity,
        generation: Generation,
    ) -> Result<Arc<dyn BackendConnection>, ConnectionError> {
        let connection = self
            .connection_factory
            .create_connection(Some(identity))
            .await
            .map_err(|err| {
                error!(error = %err, "connection factory failed");
                ConnectionError::construction(err.to_string())
            })?;
        self.dispatch(ReadinessEvent::ConstructionSucceeded { generation })
            .await;

        connection
            .initialize_access_control_with_secret(&self.settings.admin_token)
            .await
            .map_err(|err| {
                error!(error = %err, "session health-check probe failed");
                ConnectionError::probe(err.to_string())
            })?;
        Ok(connection)
    }

    /// Records the final outcome of an attempt unless a newer attempt took over.
    async fn settle(
        self: &Arc<Self>,
        generation: Generation,
        identity: &Identity,
        outcome: Result<Arc<dyn BackendConnection>, ConnectionError>,
    ) {
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;
        let current = self.context.snapshot().await;
        if current.generation != generation || current.identity.as_ref() != Some(identity) {
            debug!(
                generation = %generation,
                current = %current.generation,
                "dropping superseded connection result"
            );
            return;
        }

        let key = identity.key();
        let event = match outcome {
            Ok(connection) => {
                self.cache.insert(QueryKey::connection(&key), connection);
                self.cache
                    .insert(QueryKey::connection_health(&key), ProbeOutcome::Healthy);
                ReadinessEvent::ProbeSucceeded { generation }
            }
            Err(error) => {
                self.cache.insert(
                    QueryKey::connection_health(&key),
                    ProbeOutcome::Failed(error.clone()),
                );
                match error.kind {
                    ConnectionErrorKind::Construction => {
                        ReadinessEvent::ConstructionFailed { generation, error }
                    }
                    _ => ReadinessEvent::ProbeFailed { generation, error },
                }
            }
        };
        self.apply(event).await;
    }
}

fn lock<T>(mutex: &StdMutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
