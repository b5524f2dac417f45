//! TransitionAction - Side Effects as Data
//!
//! Actions carry no behavior. An [`ActionExecutor`](crate::executor::ActionExecutor)
//! decides what each one does against the live navigation surface.

use crate::camera::CameraMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which leg of the trip a route or guidance request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteLeg {
    /// From the driver's live position to the pickup point
    DriverToPickup,
    /// From the pickup point to the destination
    PickupToDestination,
}

/// One side-effecting step of a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionAction {
    ClearRoute,
    CalculateRoute {
        leg: RouteLeg,
    },
    UpdateGeofences {
        show_pickup: bool,
        show_destination: bool,
    },
    UpdateCamera {
        mode: CameraMode,
    },
    RestartNavigation {
        leg: RouteLeg,
    },
    ClearVoiceGuidance,
    AnnounceInstruction {
        message: String,
    },
}

/// Payload-free tag of a [`TransitionAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    ClearRoute,
    CalculateRoute,
    UpdateGeofences,
    UpdateCamera,
    RestartNavigation,
    ClearVoiceGuidance,
    AnnounceInstruction,
}

impl TransitionAction {
    pub fn announce(message: impl Into<String>) -> Self {
        TransitionAction::AnnounceInstruction {
            message: message.into(),
        }
    }

    pub fn geofences(show_pickup: bool, show_destination: bool) -> Self {
        TransitionAction::UpdateGeofences {
            show_pickup,
            show_destination,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            TransitionAction::ClearRoute => ActionKind::ClearRoute,
            TransitionAction::CalculateRoute { .. } => ActionKind::CalculateRoute,
            TransitionAction::UpdateGeofences { .. } => ActionKind::UpdateGeofences,
            TransitionAction::UpdateCamera { .. } => ActionKind::UpdateCamera,
            TransitionAction::RestartNavigation { .. } => ActionKind::RestartNavigation,
            TransitionAction::ClearVoiceGuidance => ActionKind::ClearVoiceGuidance,
            TransitionAction::AnnounceInstruction { .. } => ActionKind::AnnounceInstruction,
        }
    }
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::ClearRoute => "CLEAR_ROUTE",
            ActionKind::CalculateRoute => "CALCULATE_ROUTE",
            ActionKind::UpdateGeofences => "UPDATE_GEOFENCES",
            ActionKind::UpdateCamera => "UPDATE_CAMERA",
            ActionKind::RestartNavigation => "RESTART_NAVIGATION",
            ActionKind::ClearVoiceGuidance => "CLEAR_VOICE_GUIDANCE",
            ActionKind::AnnounceInstruction => "ANNOUNCE_INSTRUCTION",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionAction::CalculateRoute { leg } | TransitionAction::RestartNavigation { leg } => {
                write!(f, "{}({:?})", self.kind(), leg)
            }
            TransitionAction::UpdateGeofences {
                show_pickup,
                show_destination,
            } => write!(
                f,
                "{}(pickup={}, destination={})",
                self.kind(),
                show_pickup,
                show_destination
            ),
            TransitionAction::UpdateCamera { mode } => write!(f, "{}({:?})", self.kind(), mode),
            _ => write!(f, "{}", self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_form_is_tagged_by_type() {
        let action = TransitionAction::CalculateRoute {
            leg: RouteLeg::PickupToDestination,
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["type"], "CALCULATE_ROUTE");
        assert_eq!(value["leg"], "pickup_to_destination");

        let back: TransitionAction = serde_json::from_value(value).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn test_kind_matches_wire_tag() {
        let action = TransitionAction::announce("Trip completed");
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["type"], action.kind().as_str());
    }

    #[test]
    fn test_display_includes_payload() {
        let action = TransitionAction::geofences(false, true);
        assert_eq!(
            action.to_string(),
            "UPDATE_GEOFENCES(pickup=false, destination=true)"
        );
    }
}
