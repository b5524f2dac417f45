//! Wayphase facade crate.
//!
//! Re-exports the phase model from `wayphase-core` and the engine from
//! `wayphase-runtime` behind a single entry point.
//!
//! ```no_run
//! use wayphase::prelude::*;
//!
//! # async fn run(collaborators: Collaborators) {
//! let manager = PhaseManager::builder(collaborators)
//!     .config(EngineConfig::default())
//!     .snapshot(LocationSnapshot::default().with_pickup(Coordinate::new(40.7589, -73.9851)))
//!     .build();
//!
//! let result = manager.transition_to_phase(NavigationPhase::AtPickup).await;
//! assert!(result.success);
//! # }
//! ```

pub use wayphase_core as core;
pub use wayphase_runtime as runtime;
#[cfg(feature = "testing")]
pub use wayphase_test as testing;

pub use wayphase_core::{
    Coordinate, EngineConfig, NavigationPhase, PhaseGraph, Schematic, TransitionError,
    TransitionResult,
};
pub use wayphase_runtime::{PhaseManager, PeriodicTask, TripSession};

pub mod prelude {
    pub use wayphase_core::prelude::*;
    pub use wayphase_runtime::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;
    use wayphase_test::RecordingCollaborators;

    #[tokio::test(start_paused = true)]
    async fn test_full_trip_through_facade() {
        let surface = Arc::new(RecordingCollaborators::new());
        let manager = PhaseManager::builder(Collaborators::from_shared(surface.clone()))
            .snapshot(
                LocationSnapshot::default()
                    .with_driver(Coordinate::new(40.7484, -73.9857))
                    .with_pickup(Coordinate::new(40.7589, -73.9851))
                    .with_destination(Coordinate::new(40.6892, -74.0445)),
            )
            .build();

        for phase in [
            NavigationPhase::AtPickup,
            NavigationPhase::PickingUp,
            NavigationPhase::ToDestination,
            NavigationPhase::AtDestination,
            NavigationPhase::Completed,
        ] {
            let result = manager.transition_to_phase(phase).await;
            assert!(result.success, "{phase}: {:?}", result.error);
        }

        assert_eq!(manager.current_phase(), NavigationPhase::Completed);
        assert!(manager.valid_next_phases().is_empty());
    }

    #[test]
    fn test_schematic_lists_every_edge() {
        let schematic = super::PhaseGraph::new().schematic();
        assert_eq!(schematic.edges.len(), 9);
        let json = serde_json::to_value(&schematic).unwrap();
        assert!(json["edges"].is_array());
    }
}
