use crate::graph::PhaseTransitionConfig;
use crate::phase::NavigationPhase;
use serde::{Deserialize, Serialize};

/// The Static Analysis View of the phase graph.
///
/// `Schematic` is the graph representation extracted from the `PhaseGraph`.
/// It is used for visualization, documentation, and verification.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Schematic {
    pub name: String,
    pub description: Option<String>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Schematic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String, // phase tag
    pub kind: NodeKind,
    pub label: String,
}

impl Node {
    pub fn for_phase(phase: NavigationPhase) -> Self {
        let kind = match phase {
            NavigationPhase::ToPickup => NodeKind::Ingress,
            NavigationPhase::Completed => NodeKind::Egress,
            _ => NodeKind::Phase,
        };
        Self {
            id: phase.as_str().to_string(),
            kind,
            label: phase.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    Ingress, // Initial phase
    Phase,
    Egress, // Terminal phase
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub actions: Vec<String>, // e.g. "CLEAR_ROUTE", "UPDATE_CAMERA"
    pub requires: Vec<String>,
}

impl Edge {
    pub fn for_transition(config: &PhaseTransitionConfig) -> Self {
        Self {
            from: config.from.as_str().to_string(),
            to: config.to.as_str().to_string(),
            actions: config
                .actions
                .iter()
                .map(|a| a.kind().as_str().to_string())
                .collect(),
            requires: config
                .required_context
                .iter()
                .map(|f| f.as_str().to_string())
                .collect(),
        }
    }
}
