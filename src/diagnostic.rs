//! Non-fatal anomalies found while reconciling a graph payload.
//!
//! Diagnostics describe malformed graph edits that the engine chose to ignore. They never
//! abort a sync; a broken payload (unknown node ids) is an error instead.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::{model::NodeClass, nodekey::NodeId, properties::EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncDiagnostic {
    /// An edge joining two species or two reactions. It does not affect the model.
    SameClassEdge {
        source: NodeId,
        target: NodeId,
        kind: EntityKind,
    },
    /// A known node arrived with a different class than the stored entity. The stored kind
    /// is kept.
    ClassMismatch {
        node: NodeId,
        stored: EntityKind,
        payload: NodeClass,
    },
}

impl Display for SyncDiagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncDiagnostic::SameClassEdge {
                source,
                target,
                kind,
            } => write!(
                f,
                "connection ({source}, {target}) joins two {kind} nodes instead of a species and a reaction; ignored"
            ),
            SyncDiagnostic::ClassMismatch {
                node,
                stored,
                payload,
            } => write!(
                f,
                "node {node} is stored as a {stored} but the graph labels it {payload}; keeping {stored}"
            ),
        }
    }
}
