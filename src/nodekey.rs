/// [crate::nodekey] contains the identifiers of a reaction model: graph [NodeId]s, internal
/// [EntityId]s, and the [NodeMapping] bijection between them.
use serde::{Deserialize, Serialize};
use std::{
    borrow::Borrow,
    collections::{btree_map::Entry as BTreeEntry, BTreeMap, BTreeSet},
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::MolybdenumError;

/// Small positive integer naming a species or reaction within one graph view.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        NodeId(id)
    }
}

impl FromStr for NodeId {
    type Err = MolybdenumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u32>() {
            Ok(0) | Err(_) => Err(MolybdenumError::Validation(format!(
                "node id \"{s}\" is not a positive integer"
            ))),
            Ok(id) => Ok(NodeId(id)),
        }
    }
}

/// Canonical, class-prefixed key of an entity inside the model store (e.g. `spec3`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        EntityId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId(id)
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Return `<prefix><n>` for the lowest `n >= 1` for which `taken` is false.
pub fn lowest_free_id<F: Fn(&str) -> bool>(prefix: &str, taken: F) -> EntityId {
    let mut count: u64 = 1;
    loop {
        let candidate = format!("{prefix}{count}");
        if !taken(&candidate) {
            return EntityId(candidate);
        }
        count += 1;
    }
}

/// Bijection between graph node ids and the internal ids of species and reactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeMapping(BTreeMap<NodeId, EntityId>);

impl NodeMapping {
    pub fn new() -> Self {
        NodeMapping::default()
    }

    /// Number `species` then `reactions` 1..N in iteration order. The ordering is part of the
    /// contract: reloading the same model always yields the same node numbering.
    pub fn derive<'a, S, R>(species: S, reactions: R) -> NodeMapping
    where
        S: IntoIterator<Item = &'a EntityId>,
        R: IntoIterator<Item = &'a EntityId>,
    {
        NodeMapping(
            species
                .into_iter()
                .chain(reactions)
                .enumerate()
                .map(|(idx, id)| (NodeId(idx as u32 + 1), id.clone()))
                .collect(),
        )
    }

    /// Build a mapping from explicit pairs, rejecting repeated node ids or entity ids.
    pub fn from_pairs<I>(pairs: I) -> Result<NodeMapping, MolybdenumError>
    where
        I: IntoIterator<Item = (NodeId, EntityId)>,
    {
        let mut mapping = NodeMapping::default();
        let mut seen = BTreeSet::new();
        for (node, entity) in pairs {
            if !seen.insert(entity.clone()) {
                return Err(MolybdenumError::Validation(format!(
                    "node_to_id maps more than one node to \"{entity}\""
                )));
            }
            match mapping.0.entry(node) {
                BTreeEntry::Vacant(e) => {
                    e.insert(entity);
                }
                BTreeEntry::Occupied(_) => {
                    return Err(MolybdenumError::Validation(format!(
                        "node_to_id lists node {node} more than once"
                    )));
                }
            }
        }
        Ok(mapping)
    }

    pub fn entity(&self, node: &NodeId) -> Option<&EntityId> {
        self.0.get(node)
    }

    /// Reverse lookup. Linear, mappings are small.
    pub fn node_of(&self, entity: &str) -> Option<NodeId> {
        self.0
            .iter()
            .find(|(_, id)| id.as_str() == entity)
            .map(|(node, _)| *node)
    }

    pub fn contains_node(&self, node: &NodeId) -> bool {
        self.0.contains_key(node)
    }

    pub fn insert(&mut self, node: NodeId, entity: EntityId) -> Option<EntityId> {
        self.0.insert(node, entity)
    }

    pub fn remove(&mut self, node: &NodeId) -> Option<EntityId> {
        self.0.remove(node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &EntityId)> {
        self.0.iter()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.0.keys()
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.0.values()
    }

    /// Inverse view, internal id to node id.
    pub fn inverse(&self) -> BTreeMap<&str, NodeId> {
        self.0.iter().map(|(node, id)| (id.as_str(), *node)).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
