//! PhaseGraph - Legal Moves and Their Actions
//!
//! The static adjacency table of the trip lifecycle. Each legal `(from, to)`
//! pair owns one immutable [`PhaseTransitionConfig`]: the ordered actions to
//! run and the context fields that must be present first.
//!
//! Pure lookup, no side effects.

use crate::action::{RouteLeg, TransitionAction};
use crate::camera::CameraMode;
use crate::context::ContextField;
use crate::phase::NavigationPhase;
use crate::schematic::{Edge, Node, Schematic};
use serde::{Deserialize, Serialize};

/// One legal edge of the phase graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransitionConfig {
    pub from: NavigationPhase,
    pub to: NavigationPhase,
    pub actions: Vec<TransitionAction>,
    pub required_context: Vec<ContextField>,
}

/// The trip's phase graph.
#[derive(Debug, Clone, Default)]
pub struct PhaseGraph {
    _private: (),
}

impl PhaseGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phases reachable in one step from `from`, in lifecycle order.
    pub fn valid_next_phases(&self, from: NavigationPhase) -> &'static [NavigationPhase] {
        use NavigationPhase::*;
        match from {
            ToPickup => &[AtPickup, Completed],
            AtPickup => &[PickingUp, Completed],
            PickingUp => &[ToDestination, Completed],
            ToDestination => &[AtDestination, Completed],
            AtDestination => &[Completed],
            Completed => &[],
        }
    }

    /// True iff `(from, to)` is an edge. Self-loops are not edges.
    pub fn is_valid_transition(&self, from: NavigationPhase, to: NavigationPhase) -> bool {
        self.valid_next_phases(from).contains(&to)
    }

    /// The fixed action list for `(from, to)`, or `None` when it is not an edge.
    pub fn transition_config(
        &self,
        from: NavigationPhase,
        to: NavigationPhase,
    ) -> Option<PhaseTransitionConfig> {
        if !self.is_valid_transition(from, to) {
            return None;
        }

        use NavigationPhase::*;
        let (actions, required_context) = match to {
            AtPickup => (
                vec![
                    TransitionAction::ClearRoute,
                    TransitionAction::geofences(true, false),
                    TransitionAction::UpdateCamera {
                        mode: CameraMode::ShowPickup,
                    },
                    TransitionAction::ClearVoiceGuidance,
                    TransitionAction::announce("You have arrived at the pickup location"),
                ],
                vec![ContextField::PickupLocation],
            ),
            PickingUp => (
                vec![
                    TransitionAction::UpdateCamera {
                        mode: CameraMode::ShowPickup,
                    },
                    TransitionAction::announce("Passenger is boarding"),
                ],
                vec![ContextField::PickupLocation],
            ),
            ToDestination => (
                vec![
                    TransitionAction::ClearRoute,
                    TransitionAction::CalculateRoute {
                        leg: RouteLeg::PickupToDestination,
                    },
                    TransitionAction::geofences(false, true),
                    TransitionAction::UpdateCamera {
                        mode: CameraMode::ShowFullRoute,
                    },
                    TransitionAction::RestartNavigation {
                        leg: RouteLeg::PickupToDestination,
                    },
                    TransitionAction::announce("Starting trip to destination"),
                ],
                vec![
                    ContextField::PickupLocation,
                    ContextField::DestinationLocation,
                ],
            ),
            AtDestination => (
                vec![
                    TransitionAction::ClearRoute,
                    TransitionAction::geofences(false, true),
                    TransitionAction::UpdateCamera {
                        mode: CameraMode::ShowDestination,
                    },
                    TransitionAction::ClearVoiceGuidance,
                    TransitionAction::announce("You have arrived at the destination"),
                ],
                vec![ContextField::DestinationLocation],
            ),
            Completed => (
                vec![
                    TransitionAction::ClearRoute,
                    TransitionAction::geofences(false, false),
                    TransitionAction::ClearVoiceGuidance,
                    TransitionAction::announce(if from == AtDestination {
                        "Trip completed"
                    } else {
                        "Trip ended"
                    }),
                ],
                vec![],
            ),
            // Nothing leads back to the first phase
            ToPickup => return None,
        };

        Some(PhaseTransitionConfig {
            from,
            to,
            actions,
            required_context,
        })
    }

    /// Every legal edge, in lifecycle order of the source phase.
    pub fn transitions(&self) -> Vec<PhaseTransitionConfig> {
        NavigationPhase::ALL
            .into_iter()
            .flat_map(move |from| {
                self.valid_next_phases(from)
                    .iter()
                    .filter_map(move |to| self.transition_config(from, *to))
            })
            .collect()
    }

    /// Structural view of the graph for visualisation and documentation.
    pub fn schematic(&self) -> Schematic {
        let mut schematic = Schematic::new("trip-phases");
        schematic.description = Some("Navigation phase lifecycle of one trip".to_string());

        for phase in NavigationPhase::ALL {
            schematic.nodes.push(Node::for_phase(phase));
        }
        for config in self.transitions() {
            schematic.edges.push(Edge::for_transition(&config));
        }
        schematic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;

    #[test]
    fn test_adjacency_table() {
        let graph = PhaseGraph::new();
        assert!(graph.is_valid_transition(NavigationPhase::ToPickup, NavigationPhase::AtPickup));
        assert!(graph.is_valid_transition(NavigationPhase::ToPickup, NavigationPhase::Completed));
        assert!(!graph.is_valid_transition(NavigationPhase::ToPickup, NavigationPhase::PickingUp));
        assert!(!graph.is_valid_transition(NavigationPhase::AtPickup, NavigationPhase::AtPickup));
        assert!(!graph.is_valid_transition(
            NavigationPhase::AtDestination,
            NavigationPhase::ToDestination
        ));
    }

    #[test]
    fn test_completed_has_no_outgoing_edges() {
        let graph = PhaseGraph::new();
        assert!(graph.valid_next_phases(NavigationPhase::Completed).is_empty());
        for to in NavigationPhase::ALL {
            assert!(graph.transition_config(NavigationPhase::Completed, to).is_none());
        }
    }

    #[test]
    fn test_config_exists_exactly_for_valid_edges() {
        let graph = PhaseGraph::new();
        for from in NavigationPhase::ALL {
            for to in NavigationPhase::ALL {
                assert_eq!(
                    graph.transition_config(from, to).is_some(),
                    graph.is_valid_transition(from, to),
                    "{from} -> {to}"
                );
            }
        }
        assert_eq!(graph.transitions().len(), 9);
    }

    #[test]
    fn test_boarding_to_destination_actions() {
        let config = PhaseGraph::new()
            .transition_config(NavigationPhase::PickingUp, NavigationPhase::ToDestination)
            .unwrap();
        let kinds: Vec<_> = config.actions.iter().map(|a| a.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::ClearRoute,
                ActionKind::CalculateRoute,
                ActionKind::UpdateGeofences,
                ActionKind::UpdateCamera,
                ActionKind::RestartNavigation,
                ActionKind::AnnounceInstruction,
            ]
        );
        assert_eq!(config.actions[2], TransitionAction::geofences(false, true));
        assert_eq!(
            config.required_context,
            vec![
                ContextField::PickupLocation,
                ContextField::DestinationLocation
            ]
        );
    }

    #[test]
    fn test_schematic_has_node_per_phase_and_edge_per_transition() {
        let schematic = PhaseGraph::new().schematic();
        assert_eq!(schematic.nodes.len(), 6);
        assert_eq!(schematic.edges.len(), 9);
        let json = schematic.to_json();
        assert_eq!(json["name"], "trip-phases");
    }
}
