//! Shared fixtures for ReactionModel testing

use crate::{
    model::{GraphEdge, GraphNode, GraphPayload, NodeClass, ReactionModel},
    patch::FormEdit,
};
use serde_json::{json, Value};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Michaelis-Menten mapping: E + S <-> ES -> E + P, without `node_to_id`.
pub fn example_mapping() -> Value {
    json!({
        "species": {
            "spec1": {"name": "E", "amt": 5e-21, "fixed": false},
            "spec2": {"name": "S", "amt": 1e-20, "fixed": false},
            "spec3": {"name": "ES", "amt": 0.0, "fixed": false},
            "spec4": {"name": "P", "amt": 0.0, "fixed": false}
        },
        "reactions": {
            "reac1": {
                "name": "veq",
                "reagents": ["E", "S"],
                "products": ["ES"],
                "expression": "(kon*E*S-koff*ES)"
            },
            "reac2": {
                "name": "vcat",
                "reagents": ["ES"],
                "products": ["P"],
                "expression": "kcat*ES"
            }
        },
        "params": {
            "param1": {"name": "koff", "val": 0.2},
            "param2": {"name": "kon", "val": 10000000.0},
            "param3": {"name": "kcat", "val": 0.1}
        },
        "sim_params": {"sim_start": 0.0, "sim_end": 10.0, "sim_points": 120}
    })
}

pub fn example_model() -> ReactionModel {
    init_logging();
    ReactionModel::from_value(&example_mapping()).unwrap()
}

/// The graph the editor shows for [example_model].
pub fn example_graph() -> GraphPayload {
    GraphPayload {
        nodes: vec![
            GraphNode::new(1, "E", NodeClass::Species),
            GraphNode::new(2, "S", NodeClass::Species),
            GraphNode::new(3, "ES", NodeClass::Species),
            GraphNode::new(4, "P", NodeClass::Species),
            GraphNode::new(5, "veq", NodeClass::Reactions),
            GraphNode::new(6, "vcat", NodeClass::Reactions),
        ],
        edges: vec![
            GraphEdge::new(1, 5),
            GraphEdge::new(2, 5),
            GraphEdge::new(5, 3),
            GraphEdge::new(3, 6),
            GraphEdge::new(6, 4),
        ],
    }
}

/// [example_graph] after an editing session: S and vcat deleted, P renamed to Prod, species
/// I (node 7) and reaction vkcat (node 8) added and wired up.
pub fn updated_graph() -> GraphPayload {
    GraphPayload {
        nodes: vec![
            GraphNode::new(1, "E", NodeClass::Species),
            GraphNode::new(3, "ES", NodeClass::Species),
            GraphNode::new(4, "Prod", NodeClass::Species),
            GraphNode::new(5, "veq", NodeClass::Reactions),
            GraphNode::new(7, "I", NodeClass::Species),
            GraphNode::new(8, "vkcat", NodeClass::Reactions),
        ],
        edges: vec![
            GraphEdge::new(1, 5),
            GraphEdge::new(7, 5),
            GraphEdge::new(5, 3),
            GraphEdge::new(3, 8),
            GraphEdge::new(7, 8),
            GraphEdge::new(8, 4),
        ],
    }
}

/// Build form edits from borrowed literals.
pub fn form(edits: &[(&str, &[&str])]) -> Vec<FormEdit> {
    edits
        .iter()
        .map(|(key, values)| {
            (
                key.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect()
}
