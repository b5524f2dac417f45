//! Camera presets for each framing mode.

use crate::context::{ContextField, TransitionContext};
use crate::geo::{self, Coordinate};
use serde::{Deserialize, Serialize};

/// Zoom used when following the driver turn-by-turn.
pub const FOLLOW_ZOOM: f64 = 17.0;
/// Zoom used when focusing a single stop.
pub const STOP_ZOOM: f64 = 16.0;
/// Pitch used when following the driver.
pub const FOLLOW_PITCH: f64 = 45.0;

/// How the camera should frame the trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Tilted, close-up view tracking the driver
    FollowDriver,
    /// Top-down view of the pickup point
    ShowPickup,
    /// Top-down view of the destination
    ShowDestination,
    /// Overview framing the driver and the pickup point
    DriverToPickup,
    /// Overview framing the pickup point and the destination
    ShowFullRoute,
}

impl CameraMode {
    /// Context fields this mode reads.
    pub fn required_fields(&self) -> &'static [ContextField] {
        match self {
            CameraMode::FollowDriver => &[ContextField::DriverLocation],
            CameraMode::ShowPickup => &[ContextField::PickupLocation],
            CameraMode::ShowDestination => &[ContextField::DestinationLocation],
            CameraMode::DriverToPickup => {
                &[ContextField::DriverLocation, ContextField::PickupLocation]
            }
            CameraMode::ShowFullRoute => &[
                ContextField::PickupLocation,
                ContextField::DestinationLocation,
            ],
        }
    }

    pub fn is_overview(&self) -> bool {
        matches!(self, CameraMode::DriverToPickup | CameraMode::ShowFullRoute)
    }
}

/// A fully resolved camera move, ready to hand to the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub mode: CameraMode,
    pub center: Coordinate,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    pub duration_ms: u64,
}

impl CameraConfig {
    /// Resolve `mode` against the coordinates in `ctx`.
    ///
    /// Returns the first missing field when the mode cannot be built.
    pub fn for_mode(mode: CameraMode, ctx: &TransitionContext) -> Result<Self, ContextField> {
        let point = |field: ContextField| ctx.coordinate(field).ok_or(field);

        let config = match mode {
            CameraMode::FollowDriver => Self {
                mode,
                center: point(ContextField::DriverLocation)?,
                zoom: FOLLOW_ZOOM,
                pitch: FOLLOW_PITCH,
                bearing: 0.0,
                duration_ms: 1000,
            },
            CameraMode::ShowPickup => Self::stop(mode, point(ContextField::PickupLocation)?),
            CameraMode::ShowDestination => {
                Self::stop(mode, point(ContextField::DestinationLocation)?)
            }
            CameraMode::DriverToPickup => Self::overview(
                mode,
                &point(ContextField::DriverLocation)?,
                &point(ContextField::PickupLocation)?,
            ),
            CameraMode::ShowFullRoute => Self::overview(
                mode,
                &point(ContextField::PickupLocation)?,
                &point(ContextField::DestinationLocation)?,
            ),
        };
        Ok(config)
    }

    fn stop(mode: CameraMode, center: Coordinate) -> Self {
        Self {
            mode,
            center,
            zoom: STOP_ZOOM,
            pitch: 0.0,
            bearing: 0.0,
            duration_ms: 1000,
        }
    }

    fn overview(mode: CameraMode, a: &Coordinate, b: &Coordinate) -> Self {
        let frame = geo::calculate_bounds(a, b);
        Self {
            mode,
            center: frame.center,
            zoom: frame.zoom,
            pitch: 0.0,
            bearing: 0.0,
            duration_ms: 1500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LocationSnapshot;
    use crate::phase::NavigationPhase;

    fn ctx(snapshot: LocationSnapshot) -> TransitionContext {
        TransitionContext::new(
            NavigationPhase::PickingUp,
            NavigationPhase::ToDestination,
            &snapshot,
        )
    }

    #[test]
    fn test_full_route_is_flat_overview() {
        let snapshot = LocationSnapshot::default()
            .with_pickup(Coordinate::new(40.7589, -73.9851))
            .with_destination(Coordinate::new(40.6892, -74.0445));
        let config = CameraConfig::for_mode(CameraMode::ShowFullRoute, &ctx(snapshot)).unwrap();
        assert!(config.zoom <= 14.0);
        assert_eq!(config.pitch, 0.0);
        assert_eq!(config.mode, CameraMode::ShowFullRoute);
    }

    #[test]
    fn test_missing_point_is_reported() {
        let snapshot = LocationSnapshot::default().with_pickup(Coordinate::new(1.0, 1.0));
        let err = CameraConfig::for_mode(CameraMode::ShowFullRoute, &ctx(snapshot)).unwrap_err();
        assert_eq!(err, ContextField::DestinationLocation);
    }

    #[test]
    fn test_follow_driver_is_tilted() {
        let driver = Coordinate::new(10.0, 20.0);
        let snapshot = LocationSnapshot::default().with_driver(driver);
        let config = CameraConfig::for_mode(CameraMode::FollowDriver, &ctx(snapshot)).unwrap();
        assert_eq!(config.center, driver);
        assert_eq!(config.pitch, FOLLOW_PITCH);
    }
}
