use crate::action::TransitionAction;
use crate::error::TransitionError;
use crate::phase::NavigationPhase;
use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};

/// The explicit result of one transition attempt.
///
/// `executed_actions` is always a prefix of the configured action list: actions
/// run strictly in order and nothing after a failure is attempted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionResult {
    pub success: bool,
    pub from_phase: NavigationPhase,
    pub to_phase: NavigationPhase,
    pub executed_actions: Vec<TransitionAction>,
    pub error: Option<TransitionError>,
    #[serde(default)]
    pub timeline: Timeline,
}

impl TransitionResult {
    pub fn succeeded(
        from: NavigationPhase,
        to: NavigationPhase,
        executed_actions: Vec<TransitionAction>,
        timeline: Timeline,
    ) -> Self {
        Self {
            success: true,
            from_phase: from,
            to_phase: to,
            executed_actions,
            error: None,
            timeline,
        }
    }

    pub fn failed(
        from: NavigationPhase,
        to: NavigationPhase,
        executed_actions: Vec<TransitionAction>,
        error: TransitionError,
        timeline: Timeline,
    ) -> Self {
        Self {
            success: false,
            from_phase: from,
            to_phase: to,
            executed_actions,
            error: Some(error),
            timeline,
        }
    }

    /// A rejection that happened before any action ran.
    pub fn rejected(from: NavigationPhase, to: NavigationPhase, error: TransitionError) -> Self {
        Self::failed(from, to, Vec::new(), error, Timeline::new())
    }

    /// The `target == current` short-circuit.
    pub fn noop(phase: NavigationPhase) -> Self {
        Self::succeeded(phase, phase, Vec::new(), Timeline::new())
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

/// Fraction of a transition's actions completed so far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionProgress {
    pub completed: usize,
    pub total: usize,
}

impl TransitionProgress {
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// `completed / total`, or `1.0` for an empty action list.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}
