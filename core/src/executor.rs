use crate::action::TransitionAction;
use crate::context::TransitionContext;
use crate::error::ActionResult;
use async_trait::async_trait;
use std::sync::Arc;

/// The contract for running one [`TransitionAction`].
///
/// Implementations translate the action into a call against an external
/// collaborator and report completion or failure. They see a single attempt;
/// retries and timeouts are layered on by the runtime.
#[async_trait]
pub trait ActionExecutor: Send + Sync + 'static {
    async fn execute(&self, action: &TransitionAction, ctx: &TransitionContext) -> ActionResult;
}

#[async_trait]
impl<T: ActionExecutor + ?Sized> ActionExecutor for Arc<T> {
    async fn execute(&self, action: &TransitionAction, ctx: &TransitionContext) -> ActionResult {
        (**self).execute(action, ctx).await
    }
}

#[async_trait]
impl<T: ActionExecutor + ?Sized> ActionExecutor for Box<T> {
    async fn execute(&self, action: &TransitionAction, ctx: &TransitionContext) -> ActionResult {
        (**self).execute(action, ctx).await
    }
}
