//! Simulated trip: a driver heads to a pickup in Midtown, collects the rider
//! and drops them at the Statue of Liberty ferry.
//!
//! Usage: `trip-demo [engine.toml]`

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use wayphase::prelude::*;
use wayphase::runtime::logging;

const START: Coordinate = Coordinate::new(40.7484, -73.9857);
const PICKUP: Coordinate = Coordinate::new(40.7589, -73.9851);
const DESTINATION: Coordinate = Coordinate::new(40.6892, -74.0445);

/// Stands in for the map, guidance and voice SDKs.
struct SimulatedSurface {
    flaky_route: AtomicBool,
}

impl SimulatedSurface {
    async fn work(&self) {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[async_trait]
impl RouteService for SimulatedSurface {
    async fn clear_route(&self) -> ActionResult {
        self.work().await;
        tracing::info!("route cleared");
        Ok(())
    }

    async fn calculate_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteSummary, ActionError> {
        self.work().await;
        // first request fails to show the retry path
        if self.flaky_route.swap(false, Ordering::SeqCst) {
            return Err(ActionError::rejected("routing backend unavailable"));
        }
        let distance_m = origin.distance_to(&destination);
        tracing::info!(distance_m, "route calculated");
        Ok(RouteSummary {
            distance_m,
            duration_s: distance_m / 8.0,
            geometry: vec![origin, destination],
        })
    }
}

#[async_trait]
impl GuidanceController for SimulatedSurface {
    async fn restart_navigation(&self, origin: Coordinate, destination: Coordinate) -> ActionResult {
        self.work().await;
        tracing::info!(?origin, ?destination, "guidance restarted");
        Ok(())
    }
}

#[async_trait]
impl GeofenceController for SimulatedSurface {
    async fn update_geofences(&self, show_pickup: bool, show_destination: bool) -> ActionResult {
        tracing::info!(show_pickup, show_destination, "geofences updated");
        Ok(())
    }
}

#[async_trait]
impl CameraController for SimulatedSurface {
    async fn update_camera(&self, config: CameraConfig) -> ActionResult {
        tracing::info!(
            mode = ?config.mode,
            zoom = config.zoom,
            pitch = config.pitch,
            "camera moved"
        );
        Ok(())
    }
}

#[async_trait]
impl VoiceController for SimulatedSurface {
    async fn clear_guidance(&self) -> ActionResult {
        Ok(())
    }

    async fn announce(&self, message: &str) -> ActionResult {
        tracing::info!(%message, "voice");
        Ok(())
    }
}

struct PhaseLog;

impl PhaseObserver for PhaseLog {
    fn on_phase_change(&self, from: NavigationPhase, to: NavigationPhase) {
        println!("phase: {from} -> {to}");
    }

    fn on_transition_error(&self, message: &str, _result: &TransitionResult) {
        println!("transition failed: {message}");
    }
}

fn load_config() -> anyhow::Result<EngineConfig> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default().with_retry_delay(Duration::from_millis(200)),
    };
    config.validate()?;
    Ok(config)
}

fn lerp(from: Coordinate, to: Coordinate, t: f64) -> Coordinate {
    Coordinate::new(
        from.lat + (to.lat - from.lat) * t,
        from.lng + (to.lng - from.lng) * t,
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing(logging::DEFAULT_FILTER);

    let config = load_config()?;
    tracing::info!(?config, "engine configured");

    let surface = Arc::new(SimulatedSurface {
        flaky_route: AtomicBool::new(true),
    });
    let session = TripSession::new();
    let manager = Arc::new(
        PhaseManager::builder(Collaborators::from_shared(surface))
            .config(config)
            .session(&session)
            .snapshot(
                LocationSnapshot::default()
                    .with_driver(START)
                    .with_pickup(PICKUP)
                    .with_destination(DESTINATION),
            )
            .build(),
    );
    let _log = manager.subscribe(Arc::new(PhaseLog));

    println!("{}", PhaseGraph::new().schematic().to_json());

    // driver approaches the pickup before the first transition
    let tracker = {
        let manager = manager.clone();
        let mut step = 0u32;
        PeriodicTask::spawn("driver-location", Duration::from_millis(50), move || {
            step = (step + 1).min(10);
            manager.update_driver_location(lerp(START, PICKUP, f64::from(step) / 10.0));
            async {}
        })
    };
    tokio::time::sleep(Duration::from_millis(600)).await;
    tracker.shutdown().await;

    for target in [
        NavigationPhase::AtPickup,
        NavigationPhase::PickingUp,
        NavigationPhase::ToDestination,
        NavigationPhase::AtDestination,
        NavigationPhase::Completed,
    ] {
        let result = manager.transition_to_phase(target).await;
        if !result.success {
            anyhow::bail!(
                "trip stalled in {}: {}",
                manager.current_phase(),
                result.error_message().unwrap_or_default()
            );
        }
        println!(
            "  {} actions, {} timeline events",
            result.executed_actions.len(),
            result.timeline.events.len()
        );
    }

    manager.cleanup();
    session.end();
    Ok(())
}
