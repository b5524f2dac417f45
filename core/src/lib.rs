//! Wayphase Core - Trip Phase Orchestration Model
//!
//! The runtime-agnostic half of the engine:
//! - `NavigationPhase` and the static `PhaseGraph`
//! - `TransitionAction` as pure data, executed by an `ActionExecutor`
//! - `TransitionContext` snapshots and their validation
//! - geometry and camera presets used to build action payloads
//!
//! Timers, retries and the stateful `PhaseManager` live in `wayphase-runtime`.

pub mod action;
pub mod camera;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod executor;
pub mod geo;
pub mod graph;
pub mod outcome;
pub mod phase;
pub mod schematic;
pub mod synapse;
pub mod telemetry;
pub mod timeline;

pub use action::{ActionKind, RouteLeg, TransitionAction};
pub use camera::{CameraConfig, CameraMode};
pub use config::{ConfigError, EngineConfig};
pub use context::{ContextField, LocationSnapshot, TransitionContext};
pub use error::{ActionError, ActionResult, EngineError, TransitionError};
pub use event::PhaseObserver;
pub use executor::ActionExecutor;
pub use geo::Coordinate;
pub use graph::{PhaseGraph, PhaseTransitionConfig};
pub use outcome::{TransitionProgress, TransitionResult};
pub use phase::NavigationPhase;
pub use schematic::Schematic;
pub use synapse::Collaborators;
pub use telemetry::Traced;
pub use timeline::{Timeline, TimelineEvent};

pub mod prelude {
    pub use crate::action::{ActionKind, RouteLeg, TransitionAction};
    pub use crate::camera::{CameraConfig, CameraMode};
    pub use crate::config::EngineConfig;
    pub use crate::context::{ContextField, LocationSnapshot, TransitionContext};
    pub use crate::error::{ActionError, ActionResult, EngineError, TransitionError};
    pub use crate::event::PhaseObserver;
    pub use crate::executor::ActionExecutor;
    pub use crate::geo::Coordinate;
    pub use crate::graph::PhaseGraph;
    pub use crate::outcome::{TransitionProgress, TransitionResult};
    pub use crate::phase::NavigationPhase;
    pub use crate::synapse::{
        CameraController, Collaborators, GeofenceController, GuidanceController, RouteService,
        RouteSummary, VoiceController,
    };
}
