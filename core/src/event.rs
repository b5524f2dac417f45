use crate::outcome::{TransitionProgress, TransitionResult};
use crate::phase::NavigationPhase;

/// Receives lifecycle notifications from a phase engine.
///
/// Every method has a no-op default so hosts only implement what they render.
/// Notifications are delivered synchronously on the engine's call stack and
/// must not block.
pub trait PhaseObserver: Send + Sync {
    /// A new phase was committed (by a transition or a forced change).
    fn on_phase_change(&self, _from: NavigationPhase, _to: NavigationPhase) {}

    /// An action list is about to run.
    fn on_transition_start(&self, _from: NavigationPhase, _to: NavigationPhase) {}

    /// An action finished; `progress` counts completed actions.
    fn on_transition_progress(&self, _progress: TransitionProgress) {}

    /// Any attempt finished, successfully or not.
    fn on_transition_complete(&self, _result: &TransitionResult) {}

    /// An attempt failed; `message` is the human-readable error.
    fn on_transition_error(&self, _message: &str, _result: &TransitionResult) {}
}
