//! # Telemetry: Observability Decorators
//!
//! This module provides decorators for adding observability to action executors.

use crate::action::TransitionAction;
use crate::context::TransitionContext;
use crate::error::ActionResult;
use crate::executor::ActionExecutor;
use async_trait::async_trait;

/// A wrapper executor that adds tracing spans to any inner [`ActionExecutor`].
#[derive(Clone)]
pub struct Traced<T> {
    inner: T,
    name: String,
}

impl<T> Traced<T> {
    pub fn new(inner: T, name: &str) -> Self {
        Self {
            inner,
            name: name.to_string(),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T> ActionExecutor for Traced<T>
where
    T: ActionExecutor,
{
    async fn execute(&self, action: &TransitionAction, ctx: &TransitionContext) -> ActionResult {
        use tracing::{Instrument, info_span};

        let span = info_span!(
            "Action",
            wayphase.executor = %self.name,
            wayphase.action = %action.kind(),
            wayphase.from = %ctx.current_phase,
            wayphase.to = %ctx.target_phase,
        );

        async move {
            tracing::debug!(%action, "Entering action");
            let start = std::time::Instant::now();

            let result = self.inner.execute(action, ctx).await;

            let duration = start.elapsed();
            match &result {
                Ok(()) => tracing::info!(?duration, "Action completed"),
                Err(e) => tracing::error!(error = %e, ?duration, "Action failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
