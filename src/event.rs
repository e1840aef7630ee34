use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::{
    nodekey::{EntityId, NodeId},
    properties::EntityKind,
};

/// A change applied to a [crate::model::ReactionModel] by one engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelEvent {
    /// Node, new internal id, kind, name
    EntityCreated(NodeId, EntityId, EntityKind, String),
    /// Node, removed internal id, kind
    EntityRemoved(NodeId, EntityId, EntityKind),
    /// Internal id, old name, new name
    EntityRenamed(EntityId, String, String),
    /// Reaction id, old expression, new expression
    ExpressionChanged(EntityId, String, String),
    ParameterAdded(EntityId, String),
    ParameterRemoved(EntityId, String),
    /// Internal id, attribute, serialized new value
    AttributeChanged(EntityId, String, String),
}

impl Display for ModelEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelEvent::EntityCreated(node, id, kind, name) => {
                write!(f, "created {kind} {id} \"{name}\" for node {node}")
            }
            ModelEvent::EntityRemoved(node, id, kind) => {
                write!(f, "removed {kind} {id} (node {node})")
            }
            ModelEvent::EntityRenamed(id, old, new) => {
                write!(f, "renamed {id} from \"{old}\" to \"{new}\"")
            }
            ModelEvent::ExpressionChanged(id, old, new) => {
                write!(f, "expression of {id} changed from \"{old}\" to \"{new}\"")
            }
            ModelEvent::ParameterAdded(id, name) => write!(f, "added parameter {id} \"{name}\""),
            ModelEvent::ParameterRemoved(id, name) => {
                write!(f, "removed parameter {id} \"{name}\"")
            }
            ModelEvent::AttributeChanged(id, attribute, value) => {
                write!(f, "set {id}.{attribute} = {value}")
            }
        }
    }
}
