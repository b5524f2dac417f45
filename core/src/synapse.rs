//! Synapse: The Integration Layer
//!
//! Each trait is a connection to one external collaborator of the navigation
//! surface. Implementations are supplied by the host at construction time;
//! nothing here is global.
//!
//! Collaborators must tolerate idempotent re-invocation: a retried action may
//! resend a request that already partially took effect.

use crate::camera::CameraConfig;
use crate::error::{ActionError, ActionResult};
use crate::geo::Coordinate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What the routing service hands back. Its wire format is not our concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance_m: f64,
    pub duration_s: f64,
    pub geometry: Vec<Coordinate>,
}

#[async_trait]
pub trait RouteService: Send + Sync {
    /// Discard the displayed route. Clearing an empty route succeeds.
    async fn clear_route(&self) -> ActionResult;

    async fn calculate_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteSummary, ActionError>;
}

#[async_trait]
pub trait GuidanceController: Send + Sync {
    /// Tear down turn-by-turn guidance and start it again for a new leg.
    async fn restart_navigation(&self, origin: Coordinate, destination: Coordinate)
    -> ActionResult;
}

#[async_trait]
pub trait GeofenceController: Send + Sync {
    async fn update_geofences(&self, show_pickup: bool, show_destination: bool) -> ActionResult;
}

#[async_trait]
pub trait CameraController: Send + Sync {
    async fn update_camera(&self, config: CameraConfig) -> ActionResult;
}

#[async_trait]
pub trait VoiceController: Send + Sync {
    async fn clear_guidance(&self) -> ActionResult;

    async fn announce(&self, message: &str) -> ActionResult;
}

/// The full set of collaborators a phase engine drives.
#[derive(Clone)]
pub struct Collaborators {
    pub route: Arc<dyn RouteService>,
    pub guidance: Arc<dyn GuidanceController>,
    pub geofences: Arc<dyn GeofenceController>,
    pub camera: Arc<dyn CameraController>,
    pub voice: Arc<dyn VoiceController>,
}

impl Collaborators {
    /// Use one object for every collaborator role.
    pub fn from_shared<T>(surface: Arc<T>) -> Self
    where
        T: RouteService
            + GuidanceController
            + GeofenceController
            + CameraController
            + VoiceController
            + 'static,
    {
        Self {
            route: surface.clone(),
            guidance: surface.clone(),
            geofences: surface.clone(),
            camera: surface.clone(),
            voice: surface,
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
