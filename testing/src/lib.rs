//! Test utilities for Wayphase engines.
//!
//! - [`RecordingCollaborators`]: one object playing every collaborator role,
//!   recording successful calls in order, with per-action failure injection and
//!   optional latency.
//! - [`RecordingObserver`]: captures every observer notification.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use wayphase_core::action::ActionKind;
use wayphase_core::camera::{CameraConfig, CameraMode};
use wayphase_core::error::{ActionError, ActionResult};
use wayphase_core::event::PhaseObserver;
use wayphase_core::geo::Coordinate;
use wayphase_core::outcome::{TransitionProgress, TransitionResult};
use wayphase_core::phase::NavigationPhase;
use wayphase_core::synapse::{
    CameraController, GeofenceController, GuidanceController, RouteService, RouteSummary,
    VoiceController,
};

/// A collaborator call that succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum CollaboratorCall {
    ClearRoute,
    CalculateRoute {
        origin: Coordinate,
        destination: Coordinate,
    },
    RestartNavigation {
        origin: Coordinate,
        destination: Coordinate,
    },
    UpdateGeofences {
        show_pickup: bool,
        show_destination: bool,
    },
    UpdateCamera(CameraMode),
    ClearVoiceGuidance,
    Announce(String),
}

impl CollaboratorCall {
    pub fn kind(&self) -> ActionKind {
        match self {
            CollaboratorCall::ClearRoute => ActionKind::ClearRoute,
            CollaboratorCall::CalculateRoute { .. } => ActionKind::CalculateRoute,
            CollaboratorCall::RestartNavigation { .. } => ActionKind::RestartNavigation,
            CollaboratorCall::UpdateGeofences { .. } => ActionKind::UpdateGeofences,
            CollaboratorCall::UpdateCamera(_) => ActionKind::UpdateCamera,
            CollaboratorCall::ClearVoiceGuidance => ActionKind::ClearVoiceGuidance,
            CollaboratorCall::Announce(_) => ActionKind::AnnounceInstruction,
        }
    }
}

/// Remaining injected failures for one action kind.
#[derive(Debug, Clone, Copy)]
enum Failures {
    Times(u32),
    Always,
}

#[derive(Default)]
struct Recorder {
    calls: Vec<CollaboratorCall>,
    cameras: Vec<CameraConfig>,
    attempts: HashMap<ActionKind, u32>,
    failures: HashMap<ActionKind, Failures>,
    latency: HashMap<ActionKind, Duration>,
    default_latency: Option<Duration>,
}

/// Plays every collaborator role and records what it was asked to do.
///
/// Only successful calls land in [`calls`](Self::calls); every attempt,
/// failed or not, is counted in [`attempts`](Self::attempts).
#[derive(Default)]
pub struct RecordingCollaborators {
    inner: Mutex<Recorder>,
}

impl RecordingCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` attempts of `kind`, then succeed.
    pub fn fail_times(&self, kind: ActionKind, times: u32) -> &Self {
        self.inner.lock().failures.insert(kind, Failures::Times(times));
        self
    }

    /// Fail every attempt of `kind`.
    pub fn fail_always(&self, kind: ActionKind) -> &Self {
        self.inner.lock().failures.insert(kind, Failures::Always);
        self
    }

    /// Make every call take `latency` (on tokio time).
    pub fn with_latency(&self, latency: Duration) -> &Self {
        self.inner.lock().default_latency = Some(latency);
        self
    }

    /// Make calls for `kind` take `latency` (on tokio time).
    pub fn with_latency_for(&self, kind: ActionKind, latency: Duration) -> &Self {
        self.inner.lock().latency.insert(kind, latency);
        self
    }

    pub fn calls(&self) -> Vec<CollaboratorCall> {
        self.inner.lock().calls.clone()
    }

    pub fn call_kinds(&self) -> Vec<ActionKind> {
        self.inner.lock().calls.iter().map(CollaboratorCall::kind).collect()
    }

    pub fn camera_updates(&self) -> Vec<CameraConfig> {
        self.inner.lock().cameras.clone()
    }

    pub fn attempts(&self, kind: ActionKind) -> u32 {
        self.inner.lock().attempts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_attempts(&self) -> u32 {
        self.inner.lock().attempts.values().sum()
    }

    /// Forget recorded calls and attempts; injected failures are kept.
    pub fn clear_history(&self) {
        let mut inner = self.inner.lock();
        inner.calls.clear();
        inner.cameras.clear();
        inner.attempts.clear();
    }

    async fn attempt(&self, kind: ActionKind) -> ActionResult {
        let latency = {
            let inner = self.inner.lock();
            inner.latency.get(&kind).copied().or(inner.default_latency)
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut inner = self.inner.lock();
        *inner.attempts.entry(kind).or_insert(0) += 1;
        match inner.failures.get(&kind).copied() {
            Some(Failures::Always) => Err(ActionError::rejected(format!("{kind} unavailable"))),
            Some(Failures::Times(n)) if n > 0 => {
                inner.failures.insert(kind, Failures::Times(n - 1));
                Err(ActionError::rejected(format!("{kind} unavailable")))
            }
            _ => Ok(()),
        }
    }

    fn record(&self, call: CollaboratorCall) {
        self.inner.lock().calls.push(call);
    }
}

#[async_trait]
impl RouteService for RecordingCollaborators {
    async fn clear_route(&self) -> ActionResult {
        self.attempt(ActionKind::ClearRoute).await?;
        self.record(CollaboratorCall::ClearRoute);
        Ok(())
    }

    async fn calculate_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteSummary, ActionError> {
        self.attempt(ActionKind::CalculateRoute).await?;
        self.record(CollaboratorCall::CalculateRoute {
            origin,
            destination,
        });
        Ok(RouteSummary {
            distance_m: origin.distance_to(&destination),
            duration_s: origin.distance_to(&destination) / 10.0,
            geometry: vec![origin, destination],
        })
    }
}

#[async_trait]
impl GuidanceController for RecordingCollaborators {
    async fn restart_navigation(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> ActionResult {
        self.attempt(ActionKind::RestartNavigation).await?;
        self.record(CollaboratorCall::RestartNavigation {
            origin,
            destination,
        });
        Ok(())
    }
}

#[async_trait]
impl GeofenceController for RecordingCollaborators {
    async fn update_geofences(&self, show_pickup: bool, show_destination: bool) -> ActionResult {
        self.attempt(ActionKind::UpdateGeofences).await?;
        self.record(CollaboratorCall::UpdateGeofences {
            show_pickup,
            show_destination,
        });
        Ok(())
    }
}

#[async_trait]
impl CameraController for RecordingCollaborators {
    async fn update_camera(&self, config: CameraConfig) -> ActionResult {
        self.attempt(ActionKind::UpdateCamera).await?;
        let mut inner = self.inner.lock();
        inner.calls.push(CollaboratorCall::UpdateCamera(config.mode));
        inner.cameras.push(config);
        Ok(())
    }
}

#[async_trait]
impl VoiceController for RecordingCollaborators {
    async fn clear_guidance(&self) -> ActionResult {
        self.attempt(ActionKind::ClearVoiceGuidance).await?;
        self.record(CollaboratorCall::ClearVoiceGuidance);
        Ok(())
    }

    async fn announce(&self, message: &str) -> ActionResult {
        self.attempt(ActionKind::AnnounceInstruction).await?;
        self.record(CollaboratorCall::Announce(message.to_string()));
        Ok(())
    }
}

/// One observer notification.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    PhaseChange(NavigationPhase, NavigationPhase),
    Start(NavigationPhase, NavigationPhase),
    Progress(TransitionProgress),
    Complete { success: bool },
    Error(String),
}

/// Captures every notification in arrival order.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().clone()
    }

    pub fn phase_changes(&self) -> Vec<(NavigationPhase, NavigationPhase)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::PhaseChange(from, to) => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ObservedEvent) {
        self.events.lock().push(event);
    }
}

impl PhaseObserver for RecordingObserver {
    fn on_phase_change(&self, from: NavigationPhase, to: NavigationPhase) {
        self.push(ObservedEvent::PhaseChange(from, to));
    }

    fn on_transition_start(&self, from: NavigationPhase, to: NavigationPhase) {
        self.push(ObservedEvent::Start(from, to));
    }

    fn on_transition_progress(&self, progress: TransitionProgress) {
        self.push(ObservedEvent::Progress(progress));
    }

    fn on_transition_complete(&self, result: &TransitionResult) {
        self.push(ObservedEvent::Complete {
            success: result.success,
        });
    }

    fn on_transition_error(&self, message: &str, _result: &TransitionResult) {
        self.push(ObservedEvent::Error(message.to_string()));
    }
}
