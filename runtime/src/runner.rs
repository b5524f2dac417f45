//! TransitionRunner - Sequential Action Execution
//!
//! Runs a transition's action list strictly in order through an
//! `ActionExecutor`, retrying only the failing action, and stops at the first
//! unrecoverable failure. There is no compensation: the caller decides whether
//! to run the whole transition again.
//!
//! ## Budget
//!
//! One deadline covers the whole list, retries and retry delays included.
//! An optional per-attempt timeout is additionally clamped to that deadline.

use crate::executor::RetryPolicy;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use wayphase_core::action::TransitionAction;
use wayphase_core::config::EngineConfig;
use wayphase_core::context::TransitionContext;
use wayphase_core::error::{ActionError, TransitionError};
use wayphase_core::executor::ActionExecutor;
use wayphase_core::graph::PhaseTransitionConfig;
use wayphase_core::outcome::{TransitionProgress, TransitionResult};
use wayphase_core::timeline::{Timeline, TimelineEvent};

/// Executes `PhaseTransitionConfig`s.
#[derive(Clone)]
pub struct TransitionRunner {
    executor: Arc<dyn ActionExecutor>,
    retry: RetryPolicy,
    budget: Duration,
    action_timeout: Option<Duration>,
}

impl TransitionRunner {
    pub fn new(executor: Arc<dyn ActionExecutor>) -> Self {
        Self::from_config(executor, &EngineConfig::default())
    }

    pub fn from_config(executor: Arc<dyn ActionExecutor>, config: &EngineConfig) -> Self {
        Self {
            executor,
            retry: RetryPolicy::from(config),
            budget: config.transition_timeout(),
            action_timeout: config.action_timeout(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_action_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.action_timeout = timeout;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Run every action of `config` against `ctx`.
    ///
    /// `on_progress` fires after each successful action with `(index + 1) / total`.
    /// Cancelling `cancel` stops the run at the next suspension point with
    /// [`TransitionError::CleanedUp`].
    pub async fn execute_transition<P>(
        &self,
        config: &PhaseTransitionConfig,
        ctx: &TransitionContext,
        cancel: &CancellationToken,
        mut on_progress: P,
    ) -> TransitionResult
    where
        P: FnMut(TransitionProgress) + Send,
    {
        let total = config.actions.len();
        let deadline = Instant::now() + self.budget;
        let mut executed = Vec::with_capacity(total);
        let mut timeline = Timeline::new();

        for (index, action) in config.actions.iter().enumerate() {
            match self
                .run_action(index, action, ctx, deadline, cancel, &mut timeline)
                .await
            {
                Ok(()) => {
                    executed.push(action.clone());
                    on_progress(TransitionProgress::new(index + 1, total));
                }
                Err(error) => {
                    tracing::warn!(
                        %error,
                        completed = executed.len(),
                        total,
                        "Transition stopped"
                    );
                    return TransitionResult::failed(config.from, config.to, executed, error, timeline);
                }
            }
        }

        TransitionResult::succeeded(config.from, config.to, executed, timeline)
    }

    async fn run_action(
        &self,
        index: usize,
        action: &TransitionAction,
        ctx: &TransitionContext,
        deadline: Instant,
        cancel: &CancellationToken,
        timeline: &mut Timeline,
    ) -> Result<(), TransitionError> {
        let kind = action.kind();
        let max_attempts = self.retry.attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(self.budget_exhausted(index, timeline));
            }
            let limit = self
                .action_timeout
                .map_or(remaining, |timeout| timeout.min(remaining));

            timeline.push(TimelineEvent::ActionStarted {
                index,
                action: kind,
                attempt,
                at: Utc::now(),
            });
            let started = Instant::now();

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Self::cancelled(index, timeline)),
                res = tokio::time::timeout(limit, self.executor.execute(action, ctx)) => res,
            };

            let error = match outcome {
                Ok(Ok(())) => {
                    timeline.push(TimelineEvent::ActionSucceeded {
                        index,
                        action: kind,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                        at: Utc::now(),
                    });
                    return Ok(());
                }
                Ok(Err(error)) => error,
                Err(_) if Instant::now() >= deadline => {
                    return Err(self.budget_exhausted(index, timeline));
                }
                Err(_) => ActionError::TimedOut(limit),
            };

            if attempt >= max_attempts || !error.is_retryable() {
                timeline.push(TimelineEvent::ActionFailed {
                    index,
                    action: kind,
                    error: error.to_string(),
                    at: Utc::now(),
                });
                return Err(TransitionError::ActionFailure {
                    action: kind,
                    attempts: attempt,
                    message: error.to_string(),
                });
            }

            tracing::warn!(
                action = %kind,
                attempt,
                max_attempts,
                %error,
                "Action failed, retrying"
            );
            timeline.push(TimelineEvent::ActionRetried {
                index,
                action: kind,
                attempt,
                error: error.to_string(),
                at: Utc::now(),
            });

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Self::cancelled(index, timeline)),
                _ = tokio::time::sleep(self.retry.delay) => {}
                _ = tokio::time::sleep_until(deadline) => {
                    return Err(self.budget_exhausted(index, timeline));
                }
            }
        }
    }

    fn budget_exhausted(&self, index: usize, timeline: &mut Timeline) -> TransitionError {
        timeline.push(TimelineEvent::BudgetExhausted {
            index,
            at: Utc::now(),
        });
        TransitionError::Timeout {
            budget: self.budget,
        }
    }

    fn cancelled(index: usize, timeline: &mut Timeline) -> TransitionError {
        timeline.push(TimelineEvent::Cancelled {
            index,
            at: Utc::now(),
        });
        TransitionError::CleanedUp
    }
}

impl std::fmt::Debug for TransitionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionRunner")
            .field("retry", &self.retry)
            .field("budget", &self.budget)
            .field("action_timeout", &self.action_timeout)
            .finish()
    }
}
