//! TransitionContext - Point-in-Time Snapshot
//!
//! A context is built fresh for every transition attempt from the caller's
//! latest [`LocationSnapshot`] and is never mutated afterwards.

use crate::error::TransitionError;
use crate::geo::Coordinate;
use crate::graph::PhaseTransitionConfig;
use crate::phase::NavigationPhase;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A context field a transition may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextField {
    DriverLocation,
    PickupLocation,
    DestinationLocation,
}

impl ContextField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextField::DriverLocation => "driverLocation",
            ContextField::PickupLocation => "pickupLocation",
            ContextField::DestinationLocation => "destinationLocation",
        }
    }
}

impl fmt::Display for ContextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller's latest known state. Freshness is the caller's responsibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    pub driver_location: Option<Coordinate>,
    pub pickup_location: Option<Coordinate>,
    pub destination_location: Option<Coordinate>,
    pub has_active_route: bool,
    pub is_navigation_active: bool,
}

impl LocationSnapshot {
    pub fn with_driver(mut self, location: Coordinate) -> Self {
        self.driver_location = Some(location);
        self
    }

    pub fn with_pickup(mut self, location: Coordinate) -> Self {
        self.pickup_location = Some(location);
        self
    }

    pub fn with_destination(mut self, location: Coordinate) -> Self {
        self.destination_location = Some(location);
        self
    }

    pub fn with_active_route(mut self, active: bool) -> Self {
        self.has_active_route = active;
        self
    }

    pub fn with_navigation_active(mut self, active: bool) -> Self {
        self.is_navigation_active = active;
        self
    }
}

/// Everything a transition needs to validate and execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionContext {
    pub current_phase: NavigationPhase,
    pub target_phase: NavigationPhase,
    pub driver_location: Option<Coordinate>,
    pub pickup_location: Option<Coordinate>,
    pub destination_location: Option<Coordinate>,
    pub has_active_route: bool,
    pub is_navigation_active: bool,
}

impl TransitionContext {
    /// Copy `snapshot` verbatim into a context for `current -> target`.
    pub fn new(
        current: NavigationPhase,
        target: NavigationPhase,
        snapshot: &LocationSnapshot,
    ) -> Self {
        Self {
            current_phase: current,
            target_phase: target,
            driver_location: snapshot.driver_location,
            pickup_location: snapshot.pickup_location,
            destination_location: snapshot.destination_location,
            has_active_route: snapshot.has_active_route,
            is_navigation_active: snapshot.is_navigation_active,
        }
    }

    pub fn coordinate(&self, field: ContextField) -> Option<Coordinate> {
        match field {
            ContextField::DriverLocation => self.driver_location,
            ContextField::PickupLocation => self.pickup_location,
            ContextField::DestinationLocation => self.destination_location,
        }
    }

    pub fn has(&self, field: ContextField) -> bool {
        self.coordinate(field).is_some()
    }

    /// Check every field `config` requires, failing on the first one missing.
    ///
    /// Runs before any action executes, so a missing coordinate can never leave
    /// a route half-cleared.
    pub fn validate(&self, config: &PhaseTransitionConfig) -> Result<(), TransitionError> {
        match config
            .required_context
            .iter()
            .find(|field| !self.has(**field))
        {
            Some(field) => Err(TransitionError::MissingContext {
                field: *field,
                from: config.from,
                to: config.to,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PhaseGraph;

    fn pickup() -> Coordinate {
        Coordinate::new(40.7589, -73.9851)
    }

    fn destination() -> Coordinate {
        Coordinate::new(40.6892, -74.0445)
    }

    #[test]
    fn test_new_copies_snapshot_verbatim() {
        let snapshot = LocationSnapshot::default()
            .with_pickup(pickup())
            .with_active_route(true);
        let ctx = TransitionContext::new(
            NavigationPhase::ToPickup,
            NavigationPhase::AtPickup,
            &snapshot,
        );
        assert_eq!(ctx.pickup_location, Some(pickup()));
        assert_eq!(ctx.driver_location, None);
        assert!(ctx.has_active_route);
        assert!(!ctx.is_navigation_active);
    }

    #[test]
    fn test_validate_names_missing_field_and_edge() {
        let config = PhaseGraph::new()
            .transition_config(NavigationPhase::PickingUp, NavigationPhase::ToDestination)
            .unwrap();
        let snapshot = LocationSnapshot::default().with_pickup(pickup());
        let ctx = TransitionContext::new(config.from, config.to, &snapshot);

        let err = ctx.validate(&config).unwrap_err();
        assert_eq!(
            err,
            TransitionError::MissingContext {
                field: ContextField::DestinationLocation,
                from: NavigationPhase::PickingUp,
                to: NavigationPhase::ToDestination,
            }
        );
        let message = err.to_string();
        assert!(message.contains("destinationLocation"));
        assert!(message.contains("picking-up -> to-destination"));
    }

    #[test]
    fn test_validate_passes_with_all_fields() {
        let config = PhaseGraph::new()
            .transition_config(NavigationPhase::PickingUp, NavigationPhase::ToDestination)
            .unwrap();
        let snapshot = LocationSnapshot::default()
            .with_pickup(pickup())
            .with_destination(destination());
        let ctx = TransitionContext::new(config.from, config.to, &snapshot);
        assert_eq!(ctx.validate(&config), Ok(()));
    }
}
