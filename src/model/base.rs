//! ReactionModel: the canonical, ID-addressed store.
//!
//! This module contains the store itself, its loading/validation from the nested mapping
//! shape, its serialization back to that shape, and the read-only derivations (parameter
//! names, modifiers, graph regeneration) the engines and collaborators rely on.

use crate::{
    expression::{parameters_in, species_in},
    model::graph::{EdgeRole, GraphEdge, GraphNode, GraphPayload, NodeClass, ReactionGraph},
    nodekey::{lowest_free_id, EntityId, NodeId, NodeMapping},
    properties::{EntityKind, Parameter, Reaction, Species},
    simulation::SimulationConfig,
    MolybdenumError,
};
use indexmap::{IndexMap, IndexSet};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

const NODE_TO_ID: &str = "node_to_id";
const SIM_PARAMS: &str = "sim_params";

/// One editing session's reaction network.
///
/// Species, reactions and parameters are keyed by internal id and keep their insertion
/// order, which is also the order of the serialized mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReactionModel {
    pub(crate) species: IndexMap<EntityId, Species>,
    pub(crate) reactions: IndexMap<EntityId, Reaction>,
    pub(crate) params: IndexMap<EntityId, Parameter>,
    pub(crate) node_to_id: NodeMapping,
    pub(crate) sim_params: SimulationConfig,
}

impl fmt::Display for ReactionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReactionModel({} species, {} reactions, {} params)",
            self.species.len(),
            self.reactions.len(),
            self.params.len()
        )
    }
}

impl FromStr for ReactionModel {
    type Err = MolybdenumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReactionModel::from_json(s)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

fn collection<T: DeserializeOwned>(
    mapping: &Map<String, Value>,
    kind: EntityKind,
) -> Result<IndexMap<EntityId, T>, MolybdenumError> {
    let key = kind.collection();
    let value = mapping.get(key).ok_or_else(|| {
        MolybdenumError::Validation(format!("Model must have a \"{key}\" key"))
    })?;
    let records = value.as_object().ok_or_else(|| {
        MolybdenumError::Validation(format!(
            "Model must have a \"{key}\" key with a mapping value, but got {}",
            json_kind(value)
        ))
    })?;
    records
        .iter()
        .map(|(id, record)| {
            serde_json::from_value::<T>(record.clone())
                .map(|parsed| (EntityId::from(id.as_str()), parsed))
                .map_err(|e| {
                    MolybdenumError::Validation(format!("Invalid {kind} \"{id}\" in \"{key}\": {e}"))
                })
        })
        .collect()
}

fn parse_node_mapping(value: &Value) -> Result<NodeMapping, MolybdenumError> {
    let entries = value.as_object().ok_or_else(|| {
        MolybdenumError::Validation(format!(
            "\"{NODE_TO_ID}\" must be a mapping, but got {}",
            json_kind(value)
        ))
    })?;
    let mut pairs = Vec::with_capacity(entries.len());
    for (node, id) in entries.iter() {
        let node = NodeId::from_str(node)?;
        let id = id.as_str().ok_or_else(|| {
            MolybdenumError::Validation(format!(
                "\"{NODE_TO_ID}\" entry {node} must name an id, but got {}",
                json_kind(id)
            ))
        })?;
        pairs.push((node, EntityId::from(id)));
    }
    NodeMapping::from_pairs(pairs)
}

impl ReactionModel {
    pub fn new() -> Self {
        ReactionModel::default()
    }

    /// Replace the whole store with `model`. On error the store is left as it was.
    pub fn load(&mut self, model: &Value) -> Result<(), MolybdenumError> {
        *self = ReactionModel::from_value(model)?;
        tracing::debug!("[ReactionModel::load] Loaded {}", self);
        Ok(())
    }

    pub fn from_json(content: &str) -> Result<Self, MolybdenumError> {
        let value: Value = serde_json::from_str(content)?;
        ReactionModel::from_value(&value)
    }

    pub fn from_value(model: &Value) -> Result<Self, MolybdenumError> {
        let mapping = model.as_object().ok_or_else(|| {
            MolybdenumError::Validation(format!(
                "Model must be entered as a mapping, but got {}",
                json_kind(model)
            ))
        })?;

        let mut species: IndexMap<EntityId, Species> = collection(mapping, EntityKind::Species)?;
        let reactions: IndexMap<EntityId, Reaction> = collection(mapping, EntityKind::Reaction)?;
        let params: IndexMap<EntityId, Parameter> = collection(mapping, EntityKind::Parameter)?;

        for record in species.values_mut() {
            let fixed = record.fixed;
            record.set_fixed(fixed);
        }

        let node_to_id = match mapping.get(NODE_TO_ID) {
            Some(value) if !value.is_null() => parse_node_mapping(value)?,
            _ => NodeMapping::derive(species.keys(), reactions.keys()),
        };

        let sim_params = match mapping.get(SIM_PARAMS) {
            Some(value) if !value.is_null() => {
                serde_json::from_value::<SimulationConfig>(value.clone()).map_err(|e| {
                    MolybdenumError::Validation(format!("Invalid \"{SIM_PARAMS}\": {e}"))
                })?
            }
            _ => SimulationConfig::default(),
        };

        let model = ReactionModel {
            species,
            reactions,
            params,
            node_to_id,
            sim_params,
        };

        let mut violations = model.identity_violations();
        violations.extend(model.mapping_violations());
        if !violations.is_empty() {
            return Err(MolybdenumError::Validation(violations.join("; ")));
        }
        Ok(model)
    }

    /// Full nested snapshot in the interchange shape.
    pub fn as_mapping(&self) -> Value {
        serde_json::to_value(self).expect("Model records hold only string keys and plain values")
    }

    /// Compact, deterministic JSON of [Self::as_mapping].
    pub fn as_json(&self) -> String {
        self.as_mapping().to_string()
    }

    pub fn species(&self) -> &IndexMap<EntityId, Species> {
        &self.species
    }

    pub fn reactions(&self) -> &IndexMap<EntityId, Reaction> {
        &self.reactions
    }

    pub fn params(&self) -> &IndexMap<EntityId, Parameter> {
        &self.params
    }

    pub fn node_mapping(&self) -> &NodeMapping {
        &self.node_to_id
    }

    pub fn sim_config(&self) -> &SimulationConfig {
        &self.sim_params
    }

    /// The class an internal id belongs to, resolved once so callers can match on it.
    pub fn kind_of(&self, id: &str) -> Option<EntityKind> {
        if self.species.contains_key(id) {
            Some(EntityKind::Species)
        } else if self.reactions.contains_key(id) {
            Some(EntityKind::Reaction)
        } else if self.params.contains_key(id) {
            Some(EntityKind::Parameter)
        } else {
            None
        }
    }

    /// Entity behind a graph node.
    pub fn entity_at(&self, node: &NodeId) -> Option<(&EntityId, EntityKind)> {
        let id = self.node_to_id.entity(node)?;
        self.kind_of(id.as_str()).map(|kind| (id, kind))
    }

    /// Stored name of a species, reaction or parameter.
    pub fn name_of(&self, id: &str) -> Option<&str> {
        match self.kind_of(id)? {
            EntityKind::Species => self.species.get(id).map(|s| s.name.as_str()),
            EntityKind::Reaction => self.reactions.get(id).map(|r| r.name.as_str()),
            EntityKind::Parameter => self.params.get(id).map(|p| p.name.as_str()),
        }
    }

    pub fn species_names(&self) -> BTreeSet<&str> {
        self.species.values().map(|s| s.name.as_str()).collect()
    }

    /// Lowest free `<prefix><n>` id for `kind`. Ids held by other classes are skipped too, so
    /// allocation can never produce a cross-class collision.
    pub fn new_id(&self, kind: EntityKind) -> EntityId {
        lowest_free_id(kind.prefix(), |candidate| self.kind_of(candidate).is_some())
    }

    /// Every parameter-classified token across all reaction expressions, without duplicates,
    /// in order of first appearance.
    pub fn all_parameter_names(&self) -> IndexSet<String> {
        let species = self.species_names();
        self.reactions
            .values()
            .flat_map(|reaction| parameters_in(&reaction.expression, &species))
            .map(str::to_string)
            .collect()
    }

    /// Species referenced in a reaction's expression that are neither reagents nor products.
    pub fn modifiers_of(&self, reaction_id: &str) -> Result<Vec<String>, MolybdenumError> {
        let reaction = self.reactions.get(reaction_id).ok_or_else(|| {
            MolybdenumError::Reference(format!("Could not find reaction \"{reaction_id}\""))
        })?;
        let species = self.species_names();
        Ok(species_in(&reaction.expression, &species)
            .into_iter()
            .filter(|name| !reaction.involves(name))
            .map(str::to_string)
            .collect())
    }

    /// Connectivity of the stored reactions as a node-id graph. Reagent edges run species ->
    /// reaction and product edges reaction -> species; reactions are visited in store order.
    pub fn reaction_graph(&self) -> Result<ReactionGraph, MolybdenumError> {
        let inverse = self.node_to_id.inverse();
        let mut species_nodes: BTreeMap<&str, NodeId> = BTreeMap::new();
        for (id, species) in self.species.iter() {
            if let Some(node) = inverse.get(id.as_str()) {
                species_nodes.insert(species.name.as_str(), *node);
            }
        }
        let species_node = |reaction: &Reaction, name: &str, role: &str| {
            species_nodes.get(name).copied().ok_or_else(|| {
                MolybdenumError::Reference(format!(
                    "Reaction \"{}\" lists unknown species \"{name}\" as {role}",
                    reaction.name
                ))
            })
        };

        let mut edges = vec![];
        for (id, reaction) in self.reactions.iter() {
            let reaction_node = inverse.get(id.as_str()).copied().ok_or_else(|| {
                MolybdenumError::Reference(format!("Reaction \"{id}\" has no graph node"))
            })?;
            for reagent in reaction.reagents.iter() {
                let source = species_node(reaction, reagent.as_str(), "reagent")?;
                edges.push((source, reaction_node, EdgeRole::Reagent));
            }
            for product in reaction.products.iter() {
                let target = species_node(reaction, product.as_str(), "product")?;
                edges.push((reaction_node, target, EdgeRole::Product));
            }
        }
        Ok(ReactionGraph::from_nodes_and_edges(
            self.node_to_id.nodes().copied(),
            edges,
        ))
    }

    /// Regenerate the payload a graph editor displays. Layout is not tracked, so every node
    /// sits at the origin.
    pub fn to_graph(&self) -> Result<GraphPayload, MolybdenumError> {
        let mut nodes = Vec::with_capacity(self.node_to_id.len());
        for (node, id) in self.node_to_id.iter() {
            let class = self
                .kind_of(id.as_str())
                .and_then(NodeClass::from_kind)
                .ok_or_else(|| {
                    MolybdenumError::Reference(format!(
                        "Could not find id \"{id}\" from node_to_id in species or reactions"
                    ))
                })?;
            let title = self.name_of(id.as_str()).unwrap_or_default();
            nodes.push(GraphNode::new(node.0, title, class));
        }
        let edges = self
            .reaction_graph()?
            .edges()
            .map(|(source, target, _)| GraphEdge { source, target })
            .collect();
        Ok(GraphPayload { nodes, edges })
    }

    /// Ids shared between entity classes.
    fn identity_violations(&self) -> Vec<String> {
        let mut seen: BTreeMap<&str, EntityKind> = BTreeMap::new();
        let mut errors = vec![];
        let all_ids = self
            .species
            .keys()
            .map(|id| (id, EntityKind::Species))
            .chain(self.reactions.keys().map(|id| (id, EntityKind::Reaction)))
            .chain(self.params.keys().map(|id| (id, EntityKind::Parameter)));
        for (id, kind) in all_ids {
            if let Some(previous) = seen.insert(id.as_str(), kind) {
                errors.push(format!(
                    "Id \"{id}\" is used by both a {previous} and a {kind}; all ids must be unique"
                ));
            }
        }
        errors
    }

    /// node_to_id must cover exactly the species and reactions.
    fn mapping_violations(&self) -> Vec<String> {
        let mut errors = vec![];
        for (node, id) in self.node_to_id.iter() {
            match self.kind_of(id.as_str()) {
                Some(EntityKind::Species) | Some(EntityKind::Reaction) => {}
                Some(EntityKind::Parameter) => errors.push(format!(
                    "node_to_id maps node {node} to parameter \"{id}\"; parameters have no graph node"
                )),
                None => errors.push(format!(
                    "node_to_id maps node {node} to \"{id}\", which is neither a species nor a reaction"
                )),
            }
        }
        let mapped: BTreeSet<&str> = self.node_to_id.entities().map(|id| id.as_str()).collect();
        for id in self.species.keys().chain(self.reactions.keys()) {
            if !mapped.contains(id.as_str()) {
                errors.push(format!("\"{id}\" has no entry in node_to_id"));
            }
        }
        errors
    }

    /// Parameters must be exactly the derived names, each once.
    fn parameter_violations(&self) -> Vec<String> {
        let mut errors = vec![];
        let derived = self.all_parameter_names();
        let mut stored = BTreeSet::new();
        for parameter in self.params.values() {
            if !stored.insert(parameter.name.as_str()) {
                errors.push(format!("Parameter name \"{}\" is defined more than once", parameter.name));
            } else if !derived.contains(&parameter.name) {
                errors.push(format!(
                    "Parameter \"{}\" is not used by any reaction expression",
                    parameter.name
                ));
            }
        }
        for name in derived.iter() {
            if !stored.contains(name.as_str()) {
                errors.push(format!("Expression identifier \"{name}\" has no parameter"));
            }
        }
        errors
    }

    /// Reagent and product names must resolve to stored species.
    fn connectivity_violations(&self) -> Vec<String> {
        let species = self.species_names();
        let mut errors = vec![];
        for reaction in self.reactions.values() {
            for name in reaction.reagents.iter().chain(reaction.products.iter()) {
                if !species.contains(name.as_str()) {
                    errors.push(format!(
                        "Reaction \"{}\" references unknown species \"{name}\"",
                        reaction.name
                    ));
                }
            }
        }
        errors
    }

    /// Human-readable list of every structural invariant the model currently violates.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut errors = self.identity_violations();
        errors.extend(self.mapping_violations());
        errors.extend(self.parameter_violations());
        errors.extend(self.connectivity_violations());
        errors
    }

    pub fn is_consistent(&self) -> Result<(), MolybdenumError> {
        let errors = self.check_invariants();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(MolybdenumError::Validation(errors.join("; ")))
        }
    }
}
