//! Graph diff and reconciliation.
//!
//! [ReactionModel::sync_from_graph] brings the store in line with a graph payload produced by
//! the node-link editor. The payload is authoritative for which species and reactions exist,
//! their names, and their connectivity; rate expressions and parameter values stay with the
//! store. The whole pass runs on a staged copy of the model and is only committed once every
//! step has succeeded, so a broken payload never leaves a half-applied model behind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{
    config::EngineConfig,
    diagnostic::SyncDiagnostic,
    event::ModelEvent,
    expression::rename_in_expression,
    model::{GraphPayload, ReactionModel},
    nodekey::{EntityId, NodeId},
    properties::{EntityKind, Parameter, Reaction, Species},
    MolybdenumError,
};

/// Node ids of one side of a [GraphDiff], split by class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDelta {
    pub species: Vec<NodeId>,
    pub reactions: Vec<NodeId>,
}

impl NodeDelta {
    pub fn is_empty(&self) -> bool {
        self.species.is_empty() && self.reactions.is_empty()
    }

    fn push(&mut self, kind: EntityKind, node: NodeId) {
        match kind {
            EntityKind::Species => self.species.push(node),
            EntityKind::Reaction => self.reactions.push(node),
            EntityKind::Parameter => {}
        }
    }
}

/// Nodes present in a payload but not in the store (`new`, classified by the payload), and
/// nodes in the store that the payload dropped (`deleted`, classified by the stored kind).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDiff {
    pub new: NodeDelta,
    pub deleted: NodeDelta,
}

/// Outcome of a successful [ReactionModel::sync_from_graph].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub events: Vec<ModelEvent>,
    pub diagnostics: Vec<SyncDiagnostic>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl ReactionModel {
    /// Compare a payload's node ids against the current node mapping. New nodes keep payload
    /// order; deleted nodes are listed in node-id order.
    pub fn diff_nodes(&self, graph: &GraphPayload) -> GraphDiff {
        let mut diff = GraphDiff::default();
        for node in graph.nodes.iter() {
            if !self.node_to_id.contains_node(&node.id) {
                diff.new.push(node.class.kind(), node.id);
            }
        }
        let present = graph.node_ids();
        for (node, id) in self.node_to_id.iter() {
            if present.contains(node) {
                continue;
            }
            if let Some(kind) = self.kind_of(id.as_str()) {
                diff.deleted.push(kind, *node);
            }
        }
        diff
    }

    /// Reconcile the store with `graph`.
    ///
    /// Steps, in order: create entities for new nodes, delete entities whose nodes vanished,
    /// apply node titles as names, rebuild every reaction's reagents/products from the edges,
    /// then resync parameters. Errors leave `self` untouched:
    ///
    /// - [MolybdenumError::Validation] if the payload repeats a node id
    /// - [MolybdenumError::Reference] if an edge names a node the payload doesn't define
    pub fn sync_from_graph(
        &mut self,
        graph: &GraphPayload,
        config: &EngineConfig,
    ) -> Result<SyncReport, MolybdenumError> {
        graph.validate()?;
        let mut staged = self.clone();
        let report = staged.apply_graph(graph, config)?;
        *self = staged;
        tracing::info!(
            "[sync_from_graph] {} events, {} diagnostics; now {}",
            report.events.len(),
            report.diagnostics.len(),
            self
        );
        Ok(report)
    }

    fn apply_graph(
        &mut self,
        graph: &GraphPayload,
        config: &EngineConfig,
    ) -> Result<SyncReport, MolybdenumError> {
        let mut report = SyncReport::default();
        let diff = self.diff_nodes(graph);
        tracing::debug!("[sync_from_graph] diff: {:?}", diff);

        self.create_nodes(graph, &diff.new, config, &mut report.events);
        self.delete_nodes(&diff.deleted, &mut report.events);
        self.apply_titles(graph, &mut report)?;
        self.rebuild_connectivity(graph, &mut report)?;
        report.events.extend(self.resync_parameters(config));
        Ok(report)
    }

    fn create_nodes(
        &mut self,
        graph: &GraphPayload,
        new: &NodeDelta,
        config: &EngineConfig,
        events: &mut Vec<ModelEvent>,
    ) {
        let title = |node: &NodeId| {
            graph
                .node(node)
                .map(|n| n.title.clone())
                .unwrap_or_default()
        };
        for node in new.species.iter() {
            let id = self.new_id(EntityKind::Species);
            let species = Species::new(title(node), config.default_species_amount, false);
            tracing::debug!("[sync_from_graph] node {} -> new species {}", node, id);
            events.push(ModelEvent::EntityCreated(
                *node,
                id.clone(),
                EntityKind::Species,
                species.name.clone(),
            ));
            self.species.insert(id.clone(), species);
            self.node_to_id.insert(*node, id);
        }
        for node in new.reactions.iter() {
            let id = self.new_id(EntityKind::Reaction);
            let reaction = Reaction::new(title(node), config.undefined_expression.clone());
            tracing::debug!("[sync_from_graph] node {} -> new reaction {}", node, id);
            events.push(ModelEvent::EntityCreated(
                *node,
                id.clone(),
                EntityKind::Reaction,
                reaction.name.clone(),
            ));
            self.reactions.insert(id.clone(), reaction);
            self.node_to_id.insert(*node, id);
        }
    }

    /// Expressions that still mention a deleted species are left alone; the dangling name is
    /// picked up as a parameter by the resync.
    fn delete_nodes(&mut self, deleted: &NodeDelta, events: &mut Vec<ModelEvent>) {
        for node in deleted.species.iter() {
            if let Some(id) = self.node_to_id.remove(node) {
                self.species.shift_remove(id.as_str());
                tracing::debug!("[sync_from_graph] removed species {} (node {})", id, node);
                events.push(ModelEvent::EntityRemoved(*node, id, EntityKind::Species));
            }
        }
        for node in deleted.reactions.iter() {
            if let Some(id) = self.node_to_id.remove(node) {
                self.reactions.shift_remove(id.as_str());
                tracing::debug!("[sync_from_graph] removed reaction {} (node {})", id, node);
                events.push(ModelEvent::EntityRemoved(*node, id, EntityKind::Reaction));
            }
        }
    }

    fn apply_titles(
        &mut self,
        graph: &GraphPayload,
        report: &mut SyncReport,
    ) -> Result<(), MolybdenumError> {
        for node in graph.nodes.iter() {
            let (id, kind) = self
                .entity_at(&node.id)
                .map(|(id, kind)| (id.clone(), kind))
                .ok_or_else(|| {
                    MolybdenumError::Reference(format!(
                        "Could not find node {} in node_to_id relations",
                        node.id
                    ))
                })?;
            if node.class.kind() != kind {
                let diagnostic = SyncDiagnostic::ClassMismatch {
                    node: node.id,
                    stored: kind,
                    payload: node.class,
                };
                tracing::warn!("[sync_from_graph] {}", diagnostic);
                report.diagnostics.push(diagnostic);
            }
            report
                .events
                .extend(self.rename_entity(&id, kind, &node.title));
        }
        Ok(())
    }

    /// Set the name of a species or reaction. Species renames are rewritten into every
    /// reaction expression. Returns no events when the name is unchanged.
    pub(crate) fn rename_entity(
        &mut self,
        id: &EntityId,
        kind: EntityKind,
        name: &str,
    ) -> Vec<ModelEvent> {
        let mut events = vec![];
        match kind {
            EntityKind::Species => {
                let Some(species) = self.species.get_mut(id.as_str()) else {
                    return events;
                };
                if species.name == name {
                    return events;
                }
                let old = species.name.clone();
                species.rename(name);
                events.push(ModelEvent::EntityRenamed(
                    id.clone(),
                    old.clone(),
                    name.to_string(),
                ));
                events.extend(self.rename_in_expressions(&old, name));
            }
            EntityKind::Reaction => {
                let Some(reaction) = self.reactions.get_mut(id.as_str()) else {
                    return events;
                };
                if reaction.name == name {
                    return events;
                }
                let old = std::mem::replace(&mut reaction.name, name.to_string());
                events.push(ModelEvent::EntityRenamed(id.clone(), old, name.to_string()));
            }
            EntityKind::Parameter => {}
        }
        events
    }

    /// Rewrite `old` to `new` in every reaction expression, token-exact.
    pub(crate) fn rename_in_expressions(&mut self, old: &str, new: &str) -> Vec<ModelEvent> {
        let mut events = vec![];
        for (id, reaction) in self.reactions.iter_mut() {
            let renamed = rename_in_expression(&reaction.expression, old, new);
            if renamed != reaction.expression {
                let previous = std::mem::replace(&mut reaction.expression, renamed);
                events.push(ModelEvent::ExpressionChanged(
                    id.clone(),
                    previous,
                    reaction.expression.clone(),
                ));
            }
        }
        events
    }

    fn rebuild_connectivity(
        &mut self,
        graph: &GraphPayload,
        report: &mut SyncReport,
    ) -> Result<(), MolybdenumError> {
        for reaction in self.reactions.values_mut() {
            reaction.clear_connectivity();
        }
        for edge in graph.edges.iter() {
            let (source_id, source_kind) = self.edge_end(&edge.source)?;
            let (target_id, target_kind) = self.edge_end(&edge.target)?;
            match (source_kind, target_kind) {
                (EntityKind::Species, EntityKind::Reaction) => {
                    let name = self.species.get(source_id.as_str()).map(|s| s.name.clone());
                    if let (Some(name), Some(reaction)) =
                        (name, self.reactions.get_mut(target_id.as_str()))
                    {
                        reaction.reagents.push(name);
                    }
                }
                (EntityKind::Reaction, EntityKind::Species) => {
                    let name = self.species.get(target_id.as_str()).map(|s| s.name.clone());
                    if let (Some(name), Some(reaction)) =
                        (name, self.reactions.get_mut(source_id.as_str()))
                    {
                        reaction.products.push(name);
                    }
                }
                (kind, _) => {
                    let diagnostic = SyncDiagnostic::SameClassEdge {
                        source: edge.source,
                        target: edge.target,
                        kind,
                    };
                    tracing::warn!("[sync_from_graph] {}", diagnostic);
                    report.diagnostics.push(diagnostic);
                }
            }
        }
        Ok(())
    }

    fn edge_end(&self, node: &NodeId) -> Result<(EntityId, EntityKind), MolybdenumError> {
        self.entity_at(node)
            .map(|(id, kind)| (id.clone(), kind))
            .ok_or_else(|| {
                MolybdenumError::Reference(format!("Could not find node_id with id {node}"))
            })
    }

    /// Make the parameter table match the identifiers used by the reaction expressions.
    ///
    /// Every missing name first gets a new parameter holding
    /// [EngineConfig::default_parameter_value]; then parameters whose name is no longer used,
    /// and later duplicates of a name, are removed. New parameters never take the id of a
    /// parameter removed in the same pass, so a form rendered before the call cannot address
    /// them. Running it twice changes nothing the second time.
    pub fn resync_parameters(&mut self, config: &EngineConfig) -> Vec<ModelEvent> {
        let derived = self.all_parameter_names();
        let mut events = vec![];
        let mut kept: BTreeSet<String> = BTreeSet::new();
        let stale: Vec<EntityId> = self
            .params
            .iter()
            .filter(|(_, parameter)| {
                !(derived.contains(&parameter.name) && kept.insert(parameter.name.clone()))
            })
            .map(|(id, _)| id.clone())
            .collect();

        // Stale records are still in the store here, so new_id skips their ids.
        for name in derived.into_iter() {
            if kept.contains(&name) {
                continue;
            }
            let id = self.new_id(EntityKind::Parameter);
            tracing::debug!("[resync_parameters] adding {} \"{}\"", id, name);
            events.push(ModelEvent::ParameterAdded(id.clone(), name.clone()));
            self.params
                .insert(id, Parameter::new(name, config.default_parameter_value));
        }

        for id in stale.into_iter() {
            if let Some(parameter) = self.params.shift_remove(&id) {
                tracing::debug!("[resync_parameters] removing {} \"{}\"", id, parameter.name);
                events.push(ModelEvent::ParameterRemoved(id, parameter.name));
            }
        }
        events
    }
}
