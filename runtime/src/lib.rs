//! # EventTicket Runtime
//!
//! The Store runtime that coordinates reducer execution and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: owns the state, runs the reducer, executes effects
//! - **Effect Executor**: spawns effects on tokio and feeds produced actions back
//! - **Cancellation registry**: at most one running effect per [`EffectId`]
//! - **EffectHandle**: lets a caller await everything an action set in motion
//!
//! ## Example
//!
//! ```ignore
//! use eventticket_runtime::Store;
//!
//! let store = Store::new(AppState::default(), AppReducer::new(), environment);
//!
//! let mut handle = store.send(AppAction::RefreshCatalog).await?;
//! handle.wait().await;
//!
//! let events = store.state(|s| s.catalog.len()).await;
//! ```

use eventticket_core::effect::{Effect, EffectId};
use eventticket_core::reducer::Reducer;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, watch};
use tokio::task::AbortHandle;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for an action or for effects to settle
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

type BoxedActionFuture<A> = Pin<Box<dyn Future<Output = Option<A>> + Send>>;

/// Handle for waiting on the effects started by one `send`.
///
/// Tracking cascades: if an effect produces an action, the effects of that
/// action are counted against the same handle, so `wait` returns once the
/// whole chain has settled. Cancellable effects are owned by the
/// cancellation registry and are not counted.
pub struct EffectHandle {
    counter: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let tracking = EffectTracking::new();
        let handle = Self {
            counter: Arc::clone(&tracking.counter),
            completion: tracking.notifier.subscribe(),
        };
        (handle, tracking)
    }

    /// A handle with nothing to wait for
    #[must_use]
    pub fn completed() -> Self {
        Self::new().0
    }

    /// True once every tracked effect has finished
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == 0
    }

    /// Wait until every tracked effect has finished
    pub async fn wait(&mut self) {
        loop {
            if self.is_complete() {
                return;
            }
            if self.completion.changed().await.is_err() {
                return;
            }
        }
    }

    /// Wait for tracked effects with an upper bound
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if effects are still running after `timeout`.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending", &self.counter.load(Ordering::SeqCst))
            .finish()
    }
}

#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn new() -> Self {
        let (notifier, _) = watch::channel(());
        Self {
            counter: Arc::new(AtomicUsize::new(0)),
            notifier: Arc::new(notifier),
        }
    }

    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notifier.send_replace(());
        }
    }
}

/// Decrements the tracking counter when the effect task ends, including on
/// panic or abort.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct Registration {
    seq: u64,
    handle: AbortHandle,
}

/// Store module - the runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicU64, AtomicUsize, BoxedActionFuture, DecrementGuard, Duration,
        Effect, EffectHandle, EffectId, EffectTracking, HashMap, Mutex, Ordering, PendingGuard,
        PoisonError, Reducer, Registration, RwLock, StoreError, broadcast,
    };

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; the reducer runs under the write lock)
    /// 2. Reducer (client logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    /// 5. Cancellable effects, keyed by [`EffectId`]
    ///
    /// Cloning a Store yields another handle to the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        /// Every action produced by an effect is broadcast after it has been reduced.
        action_broadcast: broadcast::Sender<A>,
        cancellations: Arc<Mutex<HashMap<EffectId, Registration>>>,
        registrations: Arc<AtomicU64>,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The action broadcast buffers 16 actions; use
        /// [`Store::with_broadcast_capacity`] for more.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
        }

        /// Create a new Store with custom action broadcast capacity
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                action_broadcast,
                cancellations: Arc::new(Mutex::new(HashMap::new())),
                registrations: Arc::new(AtomicU64::new(0)),
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// The injected environment
        #[must_use]
        pub fn environment(&self) -> &E {
            &self.environment
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Spawns the returned effects
        ///
        /// Returns once the effects are started, not finished. Await the
        /// returned [`EffectHandle`] to wait for them.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            let (handle, tracking) = EffectHandle::new();
            self.dispatch(action, &tracking).await;
            Ok(handle)
        }

        /// Send an action and wait for a matching action produced by its effects
        ///
        /// Subscribes before sending so the result cannot be missed. The
        /// matching action has already been reduced when it is returned.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action within `timeout`
        /// - [`StoreError::ChannelClosed`]: the broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: the store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to every action produced by effects
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let in_flight = store.state(|s| s.purchase.target().cloned()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Stop accepting actions, abort cancellable effects, and wait for the rest
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effects are still running
        /// when `timeout` elapses.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::Release);

            let aborted: Vec<Registration> = {
                let mut registry = self
                    .cancellations
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                registry.drain().map(|(_, registration)| registration).collect()
            };
            for registration in aborted {
                registration.handle.abort();
            }

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);
                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }
                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timeout");
                    return Err(StoreError::ShutdownTimeout(pending));
                }
                tokio::time::sleep(poll_interval).await;
            }
        }

        async fn dispatch(&self, action: A, tracking: &EffectTracking) {
            metrics::counter!("store.commands.total").increment(1);

            let effects = {
                let mut state = self.state.write().await;
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect(effect, tracking);
            }
        }

        /// Reduce an action produced by an effect, then tell observers about it.
        async fn feed_back(&self, action: A, tracking: &EffectTracking) {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::debug!("Dropping effect output: store is shutting down");
                return;
            }
            self.dispatch(action.clone(), tracking).await;
            let _ = self.action_broadcast.send(action);
        }

        fn track_pending(&self) -> PendingGuard {
            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            PendingGuard(Arc::clone(&self.pending_effects))
        }

        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    tracking.increment();
                    let guard = DecrementGuard(tracking.clone());
                    let pending = self.track_pending();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _pending = pending;
                        if let Some(action) = fut.await {
                            store.feed_back(action, &guard.0).await;
                        }
                        drop(guard);
                    });
                },
                Effect::Delay { duration, action } => {
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    tracking.increment();
                    let guard = DecrementGuard(tracking.clone());
                    let pending = self.track_pending();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _pending = pending;
                        tokio::time::sleep(duration).await;
                        store.feed_back(*action, &guard.0).await;
                        drop(guard);
                    });
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking);
                    }
                },
                Effect::Cancellable { id, effect } => {
                    metrics::counter!("store.effects.executed", "type" => "cancellable")
                        .increment(1);
                    self.spawn_cancellable(id, *effect);
                },
                Effect::Cancel(id) => {
                    metrics::counter!("store.effects.executed", "type" => "cancel").increment(1);
                    self.cancel(id);
                },
            }
        }

        fn spawn_cancellable(&self, id: EffectId, effect: Effect<A>) {
            let fut: BoxedActionFuture<A> = match effect {
                Effect::Future(fut) => fut,
                Effect::Delay { duration, action } => Box::pin(async move {
                    tokio::time::sleep(duration).await;
                    Some(*action)
                }),
                Effect::None => return,
                _ => {
                    tracing::warn!(effect_id = %id, "Only Delay and Future effects can be cancellable");
                    return;
                },
            };

            let seq = self.registrations.fetch_add(1, Ordering::SeqCst);
            let pending = self.track_pending();
            let store = self.clone();

            // Registry lock is held across spawn so the task cannot release
            // its registration before it has been inserted.
            let mut registry = self
                .cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            let task = tokio::spawn(async move {
                let _pending = pending;
                let output = fut.await;
                store.release(id, seq);
                if let Some(action) = output {
                    store.feed_back(action, &EffectTracking::new()).await;
                }
            });

            let previous = registry.insert(
                id,
                Registration {
                    seq,
                    handle: task.abort_handle(),
                },
            );
            drop(registry);

            if let Some(previous) = previous {
                previous.handle.abort();
                metrics::counter!("store.effects.cancelled").increment(1);
                tracing::trace!(effect_id = %id, "Replaced cancellable effect");
            }
        }

        fn cancel(&self, id: EffectId) {
            let removed = self
                .cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);

            if let Some(registration) = removed {
                registration.handle.abort();
                metrics::counter!("store.effects.cancelled").increment(1);
                tracing::trace!(effect_id = %id, "Cancelled effect");
            }
        }

        fn release(&self, id: EffectId, seq: u64) {
            let mut registry = self
                .cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if registry.get(&id).is_some_and(|r| r.seq == seq) {
                registry.remove(&id);
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                action_broadcast: self.action_broadcast.clone(),
                cancellations: Arc::clone(&self.cancellations),
                registrations: Arc::clone(&self.registrations),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
            }
        }
    }
}

pub use store::Store;
