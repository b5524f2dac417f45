//! # PhaseManager: The Trip State Machine
//!
//! Owns the current/previous phase of one trip, gates entry with an
//! `is_transitioning` flag, and commits a new phase only when the runner
//! reports success.
//!
//! ## Liveness
//!
//! * Every attempt is stamped with a generation. [`PhaseManager::cleanup`]
//!   bumps the generation and cancels in-flight work, so a stale completion can
//!   never commit.
//! * A cleaned-up manager is reinitialised transparently by the next
//!   [`PhaseManager::transition_to_phase`] while its [`TripSession`] lives.
//! * Once the bound session is gone every call is rejected. Attempt tokens are
//!   children of the session's token, so ending the session also cancels a
//!   running transition.
//! * Dropping a `transition_to_phase` future before it completes releases the
//!   in-flight flag.
//!
//! The state lock is never held across an `.await`.

use crate::bus::{ObserverBus, Subscription};
use crate::executor::CollaboratorExecutor;
use crate::runner::TransitionRunner;
use crate::session::{SessionLiveness, TripSession};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use wayphase_core::config::EngineConfig;
use wayphase_core::context::{LocationSnapshot, TransitionContext};
use wayphase_core::error::{EngineError, TransitionError};
use wayphase_core::event::PhaseObserver;
use wayphase_core::executor::ActionExecutor;
use wayphase_core::geo::Coordinate;
use wayphase_core::graph::{PhaseGraph, PhaseTransitionConfig};
use wayphase_core::outcome::TransitionResult;
use wayphase_core::phase::NavigationPhase;
use wayphase_core::synapse::Collaborators;
use wayphase_core::telemetry::Traced;

struct ManagerState {
    current: NavigationPhase,
    previous: Option<NavigationPhase>,
    transitioning: bool,
    generation: u64,
    cleaned_up: bool,
    cancel: CancellationToken,
    snapshot: LocationSnapshot,
    last_target: Option<NavigationPhase>,
    last_result: Option<TransitionResult>,
    last_failure: Option<(PhaseTransitionConfig, TransitionContext)>,
}

/// Result of the synchronous preparation step.
enum Prepared {
    Run {
        from: NavigationPhase,
        config: PhaseTransitionConfig,
        ctx: TransitionContext,
        generation: u64,
        cancel: CancellationToken,
    },
    /// Finished without running actions; `notify` marks failures observers see.
    Done {
        result: TransitionResult,
        notify: bool,
    },
}

/// Releases the in-flight flag when a transition future is dropped before
/// it commits.
struct InFlight<'a> {
    manager: &'a PhaseManager,
    generation: u64,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.manager.abandon(self.generation);
        }
    }
}

/// Stateful orchestrator for one trip's navigation phases.
pub struct PhaseManager {
    graph: PhaseGraph,
    runner: TransitionRunner,
    observers: ObserverBus,
    session: Option<SessionLiveness>,
    state: Mutex<ManagerState>,
}

impl PhaseManager {
    /// Manager with default config driving `collaborators`.
    pub fn new(collaborators: Collaborators) -> Self {
        Self::builder(collaborators).build()
    }

    pub fn builder(collaborators: Collaborators) -> PhaseManagerBuilder {
        let executor = Traced::new(CollaboratorExecutor::new(collaborators), "collaborators");
        PhaseManagerBuilder::with_executor(Arc::new(executor))
    }

    pub fn current_phase(&self) -> NavigationPhase {
        self.state.lock().current
    }

    pub fn previous_phase(&self) -> Option<NavigationPhase> {
        self.state.lock().previous
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.lock().transitioning
    }

    pub fn is_cleaned_up(&self) -> bool {
        self.state.lock().cleaned_up
    }

    pub fn is_session_alive(&self) -> bool {
        self.session.as_ref().is_none_or(SessionLiveness::is_alive)
    }

    /// The most recent attempt's result, if any.
    pub fn last_result(&self) -> Option<TransitionResult> {
        self.state.lock().last_result.clone()
    }

    /// Config and context of the last attempt that failed while running actions.
    pub fn last_failure(&self) -> Option<(PhaseTransitionConfig, TransitionContext)> {
        self.state.lock().last_failure.clone()
    }

    pub fn snapshot(&self) -> LocationSnapshot {
        self.state.lock().snapshot.clone()
    }

    /// Replace the caller state the next transition is built from.
    ///
    /// An in-flight transition keeps the context it started with.
    pub fn update_snapshot(&self, snapshot: LocationSnapshot) {
        self.state.lock().snapshot = snapshot;
    }

    pub fn update_driver_location(&self, location: Coordinate) {
        self.state.lock().snapshot.driver_location = Some(location);
    }

    pub fn can_transition_to(&self, phase: NavigationPhase) -> bool {
        if !self.is_session_alive() {
            return false;
        }
        let state = self.state.lock();
        !state.transitioning && self.graph.is_valid_transition(state.current, phase)
    }

    /// Phases reachable from the current one; empty once the session is closed.
    pub fn valid_next_phases(&self) -> Vec<NavigationPhase> {
        if !self.is_session_alive() {
            return Vec::new();
        }
        self.graph.valid_next_phases(self.current_phase()).to_vec()
    }

    fn fresh_token(&self) -> CancellationToken {
        self.session
            .as_ref()
            .map_or_else(CancellationToken::new, SessionLiveness::child_token)
    }

    #[must_use = "dropping the Subscription unsubscribes the observer"]
    pub fn subscribe(&self, observer: Arc<dyn PhaseObserver>) -> Subscription {
        self.observers.subscribe(observer)
    }

    /// Validate, execute and, on success, commit a move to `target`.
    ///
    /// Expected failures come back inside the result; this never panics or
    /// returns early with an error.
    pub async fn transition_to_phase(&self, target: NavigationPhase) -> TransitionResult {
        let (from, config, ctx, generation, cancel) = match self.prepare(target) {
            Prepared::Run {
                from,
                config,
                ctx,
                generation,
                cancel,
            } => (from, config, ctx, generation, cancel),
            Prepared::Done { result, notify } => {
                if notify {
                    if let Some(message) = result.error_message() {
                        tracing::warn!(%message, "Transition rejected");
                        self.observers.transition_failed(&message, &result);
                    }
                }
                return result;
            }
        };

        let guard = InFlight {
            manager: self,
            generation,
            armed: true,
        };
        self.observers.transition_started(from, target);

        let span = tracing::info_span!(
            "Transition",
            wayphase.from = %from,
            wayphase.to = %target,
            wayphase.attempt = %uuid::Uuid::new_v4(),
            wayphase.generation = generation,
        );
        let observers = &self.observers;
        let result = self
            .runner
            .execute_transition(&config, &ctx, &cancel, |progress| {
                observers.transition_progressed(progress)
            })
            .instrument(span)
            .await;

        guard.disarm();
        self.commit(target, generation, config, ctx, result)
    }

    fn prepare(&self, target: NavigationPhase) -> Prepared {
        let mut state = self.state.lock();
        let from = state.current;

        if !self.is_session_alive() {
            return Prepared::Done {
                result: TransitionResult::rejected(from, target, TransitionError::SessionClosed),
                notify: false,
            };
        }
        if state.transitioning {
            tracing::debug!(%from, %target, "Transition already in flight");
            return Prepared::Done {
                result: TransitionResult::rejected(
                    from,
                    target,
                    TransitionError::ConcurrentTransition,
                ),
                notify: false,
            };
        }
        if state.cleaned_up {
            state.cleaned_up = false;
            state.cancel = self.fresh_token();
            tracing::info!(phase = %from, "Phase manager reinitialised");
        }

        state.last_target = Some(target);

        if target == from {
            let result = TransitionResult::noop(from);
            state.last_result = Some(result.clone());
            return Prepared::Done {
                result,
                notify: false,
            };
        }

        let config = match self.graph.transition_config(from, target) {
            Some(config) => config,
            None => {
                let error = TransitionError::InvalidTransition { from, to: target };
                let result = TransitionResult::rejected(from, target, error);
                state.last_result = Some(result.clone());
                return Prepared::Done {
                    result,
                    notify: true,
                };
            }
        };

        let ctx = TransitionContext::new(from, target, &state.snapshot);
        if let Err(error) = ctx.validate(&config) {
            let result = TransitionResult::rejected(from, target, error);
            state.last_result = Some(result.clone());
            return Prepared::Done {
                result,
                notify: true,
            };
        }

        state.transitioning = true;
        state.generation += 1;
        Prepared::Run {
            from,
            config,
            ctx,
            generation: state.generation,
            cancel: state.cancel.clone(),
        }
    }

    fn commit(
        &self,
        target: NavigationPhase,
        generation: u64,
        config: PhaseTransitionConfig,
        ctx: TransitionContext,
        result: TransitionResult,
    ) -> TransitionResult {
        let from = result.from_phase;
        {
            let mut state = self.state.lock();
            let session_alive = self.is_session_alive();
            if state.generation != generation || state.cleaned_up || !session_alive {
                // a newer generation owns the flag
                if state.generation == generation {
                    state.transitioning = false;
                }
                tracing::info!(%from, %target, "Discarding stale transition result");
                let error = if session_alive {
                    TransitionError::CleanedUp
                } else {
                    TransitionError::SessionClosed
                };
                return TransitionResult::failed(
                    from,
                    target,
                    result.executed_actions,
                    error,
                    result.timeline,
                );
            }

            state.transitioning = false;
            if result.success {
                state.previous = Some(state.current);
                state.current = target;
                state.last_failure = None;
            } else {
                state.last_failure = Some((config, ctx));
            }
            state.last_result = Some(result.clone());
        }

        if result.success {
            tracing::info!(%from, %target, "Phase committed");
            self.observers.phase_changed(from, target);
        }
        self.observers.transition_completed(&result);
        if let Some(message) = result.error_message() {
            tracing::error!(%from, %target, %message, "Transition failed");
            self.observers.transition_failed(&message, &result);
        }
        result
    }

    /// Re-run the last attempted transition with a freshly built context.
    pub async fn retry_last_transition(&self) -> Result<TransitionResult, EngineError> {
        let target = self
            .state
            .lock()
            .last_target
            .ok_or(EngineError::NoPreviousTransition)?;
        tracing::info!(%target, "Retrying last transition");
        Ok(self.transition_to_phase(target).await)
    }

    /// Commit `target` directly, running no actions and skipping validation.
    ///
    /// Operator escape hatch: geofences, camera and voice may be stale
    /// afterwards. Any in-flight transition is cancelled and its result
    /// discarded.
    pub fn force_phase_change(&self, target: NavigationPhase) -> Result<(), EngineError> {
        if !self.is_session_alive() {
            return Err(EngineError::SessionClosed);
        }

        let from = {
            let mut state = self.state.lock();
            if state.transitioning {
                state.cancel.cancel();
                state.cancel = self.fresh_token();
                state.transitioning = false;
            }
            state.generation += 1;

            let from = state.current;
            if from == target {
                return Ok(());
            }
            state.previous = Some(from);
            state.current = target;
            state.last_failure = None;
            from
        };

        tracing::warn!(%from, %target, "Phase forced without running actions");
        self.observers.phase_changed(from, target);
        Ok(())
    }

    fn abandon(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.generation != generation || !state.transitioning {
            return;
        }
        state.transitioning = false;
        state.cancel.cancel();
        state.cancel = self.fresh_token();
        tracing::warn!(phase = %state.current, "Transition dropped before completion");
    }

    /// Stop accepting work until reinitialised, cancel in-flight actions and
    /// drop observers. Safe to call repeatedly.
    pub fn cleanup(&self) {
        {
            let mut state = self.state.lock();
            if state.cleaned_up {
                return;
            }
            state.cleaned_up = true;
            state.generation += 1;
            state.transitioning = false;
            state.cancel.cancel();
        }
        self.observers.clear();
        tracing::info!("Phase manager cleaned up");
    }
}

impl Drop for PhaseManager {
    fn drop(&mut self) {
        self.state.get_mut().cancel.cancel();
    }
}

impl std::fmt::Debug for PhaseManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PhaseManager")
            .field("current", &state.current)
            .field("previous", &state.previous)
            .field("transitioning", &state.transitioning)
            .field("cleaned_up", &state.cleaned_up)
            .field("runner", &self.runner)
            .finish()
    }
}

/// Builder for [`PhaseManager`].
pub struct PhaseManagerBuilder {
    executor: Arc<dyn ActionExecutor>,
    config: EngineConfig,
    snapshot: LocationSnapshot,
    session: Option<SessionLiveness>,
}

impl PhaseManagerBuilder {
    /// Drive a custom executor instead of the collaborator dispatch.
    pub fn with_executor(executor: Arc<dyn ActionExecutor>) -> Self {
        Self {
            executor,
            config: EngineConfig::default(),
            snapshot: LocationSnapshot::default(),
            session: None,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn initial_phase(mut self, phase: NavigationPhase) -> Self {
        self.config.initial_phase = phase;
        self
    }

    pub fn snapshot(mut self, snapshot: LocationSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Reject all work once `session` ends.
    pub fn session(mut self, session: &TripSession) -> Self {
        self.session = Some(session.liveness());
        self
    }

    pub fn build(self) -> PhaseManager {
        let runner = TransitionRunner::from_config(self.executor, &self.config);
        let cancel = self
            .session
            .as_ref()
            .map_or_else(CancellationToken::new, SessionLiveness::child_token);
        PhaseManager {
            graph: PhaseGraph::new(),
            runner,
            observers: ObserverBus::new(),
            session: self.session,
            state: Mutex::new(ManagerState {
                current: self.config.initial_phase,
                previous: None,
                transitioning: false,
                generation: 0,
                cleaned_up: false,
                cancel,
                snapshot: self.snapshot,
                last_target: None,
                last_result: None,
                last_failure: None,
            }),
        }
    }
}
