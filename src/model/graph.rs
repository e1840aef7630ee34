//! Graph types exchanged with the node-link editor.
//!
//! - [`GraphPayload`]: the denormalized view a graph editor sends and receives
//! - [`ReactionGraph`]: a petgraph view of species/reaction connectivity

use petgraph::IntoWeightedEdge;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::{error::MolybdenumError, nodekey::NodeId, properties::EntityKind};

/// Node class as labelled by the graph editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeClass {
    #[serde(rename = "species")]
    Species,
    #[serde(rename = "reactions", alias = "reaction")]
    Reactions,
}

impl NodeClass {
    pub fn kind(&self) -> EntityKind {
        match self {
            NodeClass::Species => EntityKind::Species,
            NodeClass::Reactions => EntityKind::Reaction,
        }
    }

    /// Parameters never appear as graph nodes.
    pub fn from_kind(kind: EntityKind) -> Option<NodeClass> {
        match kind {
            EntityKind::Species => Some(NodeClass::Species),
            EntityKind::Reaction => Some(NodeClass::Reactions),
            EntityKind::Parameter => None,
        }
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeClass::Species => write!(f, "species"),
            NodeClass::Reactions => write!(f, "reactions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub title: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(rename = "nodeClass", alias = "class")]
    pub class: NodeClass,
}

impl GraphNode {
    pub fn new<S: Into<String>>(id: u32, title: S, class: NodeClass) -> Self {
        GraphNode {
            id: NodeId(id),
            title: title.into(),
            x: 0.0,
            y: 0.0,
            class,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
}

impl GraphEdge {
    pub fn new(source: u32, target: u32) -> Self {
        GraphEdge {
            source: NodeId(source),
            target: NodeId(target),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl GraphPayload {
    pub fn from_json(content: &str) -> Result<Self, MolybdenumError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == *id)
    }

    pub fn node_ids(&self) -> BTreeSet<NodeId> {
        self.nodes.iter().map(|node| node.id).collect()
    }

    /// Reject payloads whose nodes cannot be addressed unambiguously.
    pub fn validate(&self) -> Result<(), MolybdenumError> {
        let mut seen = BTreeSet::new();
        for node in self.nodes.iter() {
            if node.id.0 == 0 {
                return Err(MolybdenumError::Validation(
                    "graph node ids must be positive integers, got 0".to_string(),
                ));
            }
            if !seen.insert(node.id) {
                return Err(MolybdenumError::Validation(format!(
                    "graph payload lists node {} more than once",
                    node.id
                )));
            }
        }
        Ok(())
    }
}

/// Role of a species in the reaction an edge touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeRole {
    /// species -> reaction
    Reagent,
    /// reaction -> species
    Product,
}

/// Directed multigraph of node ids. Parallel edges are kept, a species consumed twice by the
/// same reaction appears twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionGraph(pub petgraph::Graph<NodeId, EdgeRole>);

impl Default for ReactionGraph {
    fn default() -> Self {
        ReactionGraph(petgraph::Graph::new())
    }
}

impl ReactionGraph {
    pub fn as_graph(&self) -> &petgraph::Graph<NodeId, EdgeRole> {
        &self.0
    }

    /// Build a graph holding `nodes` (in order) and then `edges`. Edge endpoints missing from
    /// `nodes` are added on the fly.
    pub fn from_nodes_and_edges<N, I>(nodes: N, iterable: I) -> Self
    where
        N: IntoIterator<Item = NodeId>,
        I: IntoIterator,
        I::Item: IntoWeightedEdge<EdgeRole, NodeId = NodeId>,
    {
        let mut graph = petgraph::Graph::new();
        let mut id_to_index = BTreeMap::new();
        for node in nodes {
            id_to_index
                .entry(node)
                .or_insert_with(|| graph.add_node(node));
        }
        for (source, sink, role) in iterable.into_iter().map(|edge| edge.into_weighted_edge()) {
            let source_idx = *id_to_index
                .entry(source)
                .or_insert_with(|| graph.add_node(source));
            let sink_idx = *id_to_index
                .entry(sink)
                .or_insert_with(|| graph.add_node(sink));
            graph.add_edge(source_idx, sink_idx, role);
        }
        ReactionGraph(graph)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.node_weights().copied()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, EdgeRole)> + '_ {
        self.0
            .raw_edges()
            .iter()
            .map(|edge| (self.0[edge.source()], self.0[edge.target()], edge.weight))
    }

    pub fn edge_count(&self) -> usize {
        self.0.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_payload_deserializes_editor_shape() {
        let payload = GraphPayload::from_json(
            r#"{"nodes":[{"id":1,"title":"E","x":1.5,"y":0.0,"nodeClass":"species"},
                         {"id":5,"title":"veq","class":"reaction"}],
                "edges":[{"source":1,"target":5}]}"#,
        )
        .unwrap();
        assert_eq!(payload.nodes.len(), 2);
        assert_eq!(payload.nodes[0].x, 1.5);
        assert_eq!(payload.nodes[1].class, NodeClass::Reactions);
        assert_eq!(payload.nodes[1].y, 0.0);
        assert_eq!(payload.edges, vec![GraphEdge::new(1, 5)]);
    }

    #[test]
    fn test_validate_rejects_duplicate_nodes() {
        let payload = GraphPayload {
            nodes: vec![
                GraphNode::new(1, "E", NodeClass::Species),
                GraphNode::new(1, "S", NodeClass::Species),
            ],
            edges: vec![],
        };
        assert!(matches!(
            payload.validate(),
            Err(MolybdenumError::Validation(_))
        ));
    }

    #[test]
    fn test_reaction_graph_keeps_parallel_edges() {
        let graph = ReactionGraph::from_nodes_and_edges(
            vec![NodeId(1), NodeId(2)],
            vec![
                (NodeId(1), NodeId(2), EdgeRole::Reagent),
                (NodeId(1), NodeId(2), EdgeRole::Reagent),
                (NodeId(2), NodeId(3), EdgeRole::Product),
            ],
        );
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec![NodeId(1), NodeId(2), NodeId(3)]);
        let roles: Vec<EdgeRole> = graph.edges().map(|(_, _, role)| role).collect();
        assert_eq!(roles, vec![EdgeRole::Reagent, EdgeRole::Reagent, EdgeRole::Product]);
    }
}
