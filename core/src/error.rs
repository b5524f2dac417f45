use crate::action::ActionKind;
use crate::context::ContextField;
use crate::phase::NavigationPhase;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Why a transition attempt did not succeed.
///
/// Expected failures are folded into a [`TransitionResult`](crate::outcome::TransitionResult)
/// and never raised past the engine boundary.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionError {
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: NavigationPhase,
        to: NavigationPhase,
    },

    #[error("Missing required context field `{field}` for transition {from} -> {to}")]
    MissingContext {
        field: ContextField,
        from: NavigationPhase,
        to: NavigationPhase,
    },

    #[error("Action {action} failed after {attempts} attempt(s): {message}")]
    ActionFailure {
        action: ActionKind,
        attempts: u32,
        message: String,
    },

    #[error("Transition in progress")]
    ConcurrentTransition,

    #[error("Transition exceeded its {}ms budget", .budget.as_millis())]
    Timeout { budget: Duration },

    #[error("Phase manager has been cleaned up")]
    CleanedUp,

    #[error("Trip session has ended")]
    SessionClosed,
}

impl TransitionError {
    /// The action that failed, if this is an [`TransitionError::ActionFailure`].
    pub fn failed_action(&self) -> Option<ActionKind> {
        match self {
            TransitionError::ActionFailure { action, .. } => Some(*action),
            _ => None,
        }
    }

    /// Whether retrying the same transition later can succeed without the
    /// caller changing anything but the live context.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            TransitionError::InvalidTransition { .. } | TransitionError::SessionClosed
        )
    }
}

/// Failure of a single action attempt.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Collaborator rejected the request: {0}")]
    Rejected(String),

    #[error("{action} needs `{field}` but the context has none")]
    MissingEndpoint {
        action: ActionKind,
        field: ContextField,
    },

    #[error("Attempt timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ActionError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ActionError::Rejected(message.into())
    }

    /// A missing endpoint will still be missing on the next attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ActionError::MissingEndpoint { .. })
    }
}

pub type ActionResult = Result<(), ActionError>;

/// Programmer errors, returned directly instead of inside a result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("No previous transition to retry")]
    NoPreviousTransition,

    #[error("Trip session has ended")]
    SessionClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let err = TransitionError::ActionFailure {
            action: ActionKind::CalculateRoute,
            attempts: 3,
            message: "503".into(),
        };
        assert_eq!(
            err.to_string(),
            "Action CALCULATE_ROUTE failed after 3 attempt(s): 503"
        );
        assert_eq!(err.failed_action(), Some(ActionKind::CalculateRoute));

        let timeout = TransitionError::Timeout {
            budget: Duration::from_secs(30),
        };
        assert_eq!(timeout.to_string(), "Transition exceeded its 30000ms budget");
    }

    #[test]
    fn test_invalid_transition_is_not_retryable() {
        let err = TransitionError::InvalidTransition {
            from: NavigationPhase::Completed,
            to: NavigationPhase::ToPickup,
        };
        assert!(!err.is_retryable());
        assert!(TransitionError::ConcurrentTransition.is_retryable());
    }

    #[test]
    fn test_anyhow_errors_convert() {
        let err: ActionError = anyhow::anyhow!("socket closed").into();
        assert_eq!(err.to_string(), "socket closed");
    }
}
