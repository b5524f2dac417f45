//! Executor - Actions Against Live Collaborators
//!
//! `CollaboratorExecutor` maps each `TransitionAction` onto one call of an
//! injected collaborator. It sees a single attempt; `RetryPolicy` and the
//! runner decide whether to try again.

use async_trait::async_trait;
use std::time::Duration;
use wayphase_core::action::{ActionKind, RouteLeg, TransitionAction};
use wayphase_core::camera::CameraConfig;
use wayphase_core::config::EngineConfig;
use wayphase_core::context::{ContextField, TransitionContext};
use wayphase_core::error::{ActionError, ActionResult};
use wayphase_core::executor::ActionExecutor;
use wayphase_core::geo::Coordinate;
use wayphase_core::synapse::Collaborators;

/// How often a failing action is re-attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Fail on the first error.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Total attempts, including the first one.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for RetryPolicy {
    fn from(config: &EngineConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay())
    }
}

/// Runs actions against the host's collaborators.
#[derive(Debug, Clone)]
pub struct CollaboratorExecutor {
    collaborators: Collaborators,
}

impl CollaboratorExecutor {
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }
}

/// Origin and destination of `leg`, read from the context.
fn leg_endpoints(
    leg: RouteLeg,
    ctx: &TransitionContext,
    action: ActionKind,
) -> Result<(Coordinate, Coordinate), ActionError> {
    let (origin, destination) = match leg {
        RouteLeg::DriverToPickup => (ContextField::DriverLocation, ContextField::PickupLocation),
        RouteLeg::PickupToDestination => (
            ContextField::PickupLocation,
            ContextField::DestinationLocation,
        ),
    };
    let point = |field: ContextField| {
        ctx.coordinate(field)
            .ok_or(ActionError::MissingEndpoint { action, field })
    };
    Ok((point(origin)?, point(destination)?))
}

#[async_trait]
impl ActionExecutor for CollaboratorExecutor {
    async fn execute(&self, action: &TransitionAction, ctx: &TransitionContext) -> ActionResult {
        let c = &self.collaborators;
        match action {
            TransitionAction::ClearRoute => c.route.clear_route().await,
            TransitionAction::CalculateRoute { leg } => {
                let (origin, destination) = leg_endpoints(*leg, ctx, action.kind())?;
                let route = c.route.calculate_route(origin, destination).await?;
                tracing::debug!(
                    ?leg,
                    distance_m = route.distance_m,
                    duration_s = route.duration_s,
                    "Route calculated"
                );
                Ok(())
            }
            TransitionAction::UpdateGeofences {
                show_pickup,
                show_destination,
            } => {
                c.geofences
                    .update_geofences(*show_pickup, *show_destination)
                    .await
            }
            TransitionAction::UpdateCamera { mode } => {
                let config = CameraConfig::for_mode(*mode, ctx).map_err(|field| {
                    ActionError::MissingEndpoint {
                        action: action.kind(),
                        field,
                    }
                })?;
                c.camera.update_camera(config).await
            }
            TransitionAction::RestartNavigation { leg } => {
                let (origin, destination) = leg_endpoints(*leg, ctx, action.kind())?;
                c.guidance.restart_navigation(origin, destination).await
            }
            TransitionAction::ClearVoiceGuidance => c.voice.clear_guidance().await,
            TransitionAction::AnnounceInstruction { message } => {
                if message.trim().is_empty() {
                    return Ok(());
                }
                c.voice.announce(message).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wayphase_core::camera::CameraMode;
    use wayphase_core::context::LocationSnapshot;
    use wayphase_core::phase::NavigationPhase;
    use wayphase_test::{CollaboratorCall, RecordingCollaborators};

    const PICKUP: Coordinate = Coordinate::new(40.7589, -73.9851);
    const DESTINATION: Coordinate = Coordinate::new(40.6892, -74.0445);

    fn ctx(snapshot: LocationSnapshot) -> TransitionContext {
        TransitionContext::new(
            NavigationPhase::PickingUp,
            NavigationPhase::ToDestination,
            &snapshot,
        )
    }

    fn executor() -> (Arc<RecordingCollaborators>, CollaboratorExecutor) {
        let surface = Arc::new(RecordingCollaborators::new());
        let executor = CollaboratorExecutor::new(Collaborators::from_shared(surface.clone()));
        (surface, executor)
    }

    #[test]
    fn test_retry_policy_attempts() {
        assert_eq!(RetryPolicy::default().attempts(), 3);
        assert_eq!(RetryPolicy::default().delay, Duration::from_secs(1));
        assert_eq!(RetryPolicy::none().attempts(), 1);
    }

    #[tokio::test]
    async fn test_calculate_route_uses_pickup_to_destination() {
        let (surface, executor) = executor();
        let snapshot = LocationSnapshot::default()
            .with_pickup(PICKUP)
            .with_destination(DESTINATION);
        let action = TransitionAction::CalculateRoute {
            leg: RouteLeg::PickupToDestination,
        };

        executor.execute(&action, &ctx(snapshot)).await.unwrap();
        assert_eq!(
            surface.calls(),
            vec![CollaboratorCall::CalculateRoute {
                origin: PICKUP,
                destination: DESTINATION
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_endpoint_fails_without_calling_out() {
        let (surface, executor) = executor();
        let snapshot = LocationSnapshot::default().with_pickup(PICKUP);
        let action = TransitionAction::CalculateRoute {
            leg: RouteLeg::DriverToPickup,
        };

        let err = executor.execute(&action, &ctx(snapshot)).await.unwrap_err();
        assert!(matches!(
            err,
            ActionError::MissingEndpoint {
                action: ActionKind::CalculateRoute,
                field: ContextField::DriverLocation,
            }
        ));
        assert!(!err.is_retryable());
        assert!(surface.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_announcement_is_a_noop() {
        let (surface, executor) = executor();
        let ctx = ctx(LocationSnapshot::default());

        executor
            .execute(&TransitionAction::announce("  "), &ctx)
            .await
            .unwrap();
        assert!(surface.calls().is_empty());

        executor
            .execute(&TransitionAction::announce("Turn left"), &ctx)
            .await
            .unwrap();
        assert_eq!(
            surface.calls(),
            vec![CollaboratorCall::Announce("Turn left".into())]
        );
    }

    #[tokio::test]
    async fn test_camera_overview_is_resolved_before_handoff() {
        let (surface, executor) = executor();
        let snapshot = LocationSnapshot::default()
            .with_pickup(PICKUP)
            .with_destination(DESTINATION);
        let action = TransitionAction::UpdateCamera {
            mode: CameraMode::ShowFullRoute,
        };

        executor.execute(&action, &ctx(snapshot)).await.unwrap();
        let cameras = surface.camera_updates();
        assert_eq!(cameras.len(), 1);
        assert!(cameras[0].zoom <= 14.0);
        assert_eq!(cameras[0].pitch, 0.0);
    }

    #[tokio::test]
    async fn test_clear_route_twice_is_harmless() {
        let (surface, executor) = executor();
        let ctx = ctx(LocationSnapshot::default());
        executor.execute(&TransitionAction::ClearRoute, &ctx).await.unwrap();
        executor.execute(&TransitionAction::ClearRoute, &ctx).await.unwrap();
        assert_eq!(
            surface.calls(),
            vec![CollaboratorCall::ClearRoute, CollaboratorCall::ClearRoute]
        );
    }
}
