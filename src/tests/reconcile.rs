//! Tests for graph reconciliation

use super::helpers::*;
use crate::{
    config::EngineConfig,
    diagnostic::SyncDiagnostic,
    event::ModelEvent,
    model::{GraphEdge, GraphNode, GraphPayload, NodeClass},
    nodekey::{EntityId, NodeId},
    properties::EntityKind,
    reconcile::NodeDelta,
    MolybdenumError,
};
use std::collections::BTreeSet;
use test_log::test;

fn param_names(model: &crate::model::ReactionModel) -> BTreeSet<String> {
    model.params().values().map(|p| p.name.clone()).collect()
}

#[test]
fn test_diff_nodes() {
    let model = example_model();
    let diff = model.diff_nodes(&updated_graph());
    assert_eq!(
        diff.new,
        NodeDelta {
            species: vec![NodeId(7)],
            reactions: vec![NodeId(8)]
        }
    );
    assert_eq!(
        diff.deleted,
        NodeDelta {
            species: vec![NodeId(2)],
            reactions: vec![NodeId(6)]
        }
    );
    assert!(model.diff_nodes(&example_graph()).new.is_empty());
}

#[test]
fn test_sync_with_unchanged_graph_is_a_no_op() {
    let mut model = example_model();
    let before = model.clone();
    let report = model
        .sync_from_graph(&example_graph(), &EngineConfig::default())
        .unwrap();
    assert!(report.events.is_empty(), "{:?}", report.events);
    assert!(report.is_clean());
    assert_eq!(model, before);
}

#[test]
fn test_sync_updated_graph() {
    let mut model = example_model();
    let report = model
        .sync_from_graph(&updated_graph(), &EngineConfig::default())
        .unwrap();
    assert!(report.is_clean());

    let species: Vec<&str> = model.species().keys().map(|id| id.as_str()).collect();
    assert_eq!(species, vec!["spec1", "spec3", "spec4", "spec5"]);
    let reactions: Vec<&str> = model.reactions().keys().map(|id| id.as_str()).collect();
    assert_eq!(reactions, vec!["reac1", "reac3"]);

    assert_eq!(model.species()["spec4"].name, "Prod");
    assert_eq!(model.species()["spec5"].name, "I");
    assert_eq!(model.species()["spec5"].amount, 10.0);
    assert_eq!(model.reactions()["reac1"].reagents, vec!["E", "I"]);
    assert_eq!(model.reactions()["reac1"].products, vec!["ES"]);
    assert_eq!(model.reactions()["reac3"].reagents, vec!["ES", "I"]);
    assert_eq!(model.reactions()["reac3"].products, vec!["Prod"]);
    assert_eq!(model.reactions()["reac3"].expression, "undefined");

    assert_eq!(
        model.node_mapping().entity(&NodeId(7)),
        Some(&EntityId::from("spec5"))
    );
    assert_eq!(
        model.node_mapping().entity(&NodeId(8)),
        Some(&EntityId::from("reac3"))
    );
    assert!(!model.node_mapping().contains_node(&NodeId(2)));
    assert!(!model.node_mapping().contains_node(&NodeId(6)));

    // S is gone but still named by veq, so it is now a parameter; kcat went with vcat.
    assert_eq!(model.reactions()["reac1"].expression, "(kon*E*S-koff*ES)");
    let expected: BTreeSet<String> = ["kon", "koff", "S", "undefined"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(param_names(&model), expected);
    assert_eq!(model.params()["param1"].value, 0.2);
    assert!(report
        .events
        .contains(&ModelEvent::ParameterRemoved("param3".into(), "kcat".into())));
    assert!(report.events.contains(&ModelEvent::EntityCreated(
        NodeId(7),
        "spec5".into(),
        EntityKind::Species,
        "I".into()
    )));

    assert!(model.check_invariants().is_empty(), "{:?}", model.check_invariants());
    assert_eq!(model.to_graph().unwrap().edges.len(), 6);
}

#[test]
fn test_rename_species_propagates_into_expressions() {
    let mut model = example_model();
    let mut graph = example_graph();
    graph.nodes[1].title = "Subs".to_string();
    let report = model.sync_from_graph(&graph, &EngineConfig::default()).unwrap();

    assert_eq!(model.species()["spec2"].name, "Subs");
    assert_eq!(model.reactions()["reac1"].expression, "(kon*E*Subs-koff*ES)");
    assert_eq!(model.reactions()["reac1"].reagents, vec!["E", "Subs"]);
    assert_eq!(model.reactions()["reac2"].expression, "kcat*ES");
    assert_eq!(model.params().len(), 3);
    assert_eq!(
        report.events[0],
        ModelEvent::EntityRenamed("spec2".into(), "S".into(), "Subs".into())
    );
}

#[test]
fn test_rename_reaction_leaves_expressions_alone() {
    let mut model = example_model();
    let mut graph = example_graph();
    graph.nodes[4].title = "EQ".to_string();
    model.sync_from_graph(&graph, &EngineConfig::default()).unwrap();
    assert_eq!(model.reactions()["reac1"].name, "EQ");
    assert_eq!(model.reactions()["reac1"].expression, "(kon*E*S-koff*ES)");
}

#[test]
fn test_new_boundary_species_is_fixed() {
    let mut model = example_model();
    let mut graph = example_graph();
    graph.nodes.push(GraphNode::new(9, "$Src", NodeClass::Species));
    let config = EngineConfig {
        default_species_amount: 1.5,
        ..Default::default()
    };
    model.sync_from_graph(&graph, &config).unwrap();
    let created = &model.species()["spec5"];
    assert_eq!(created.name, "$Src");
    assert!(created.fixed);
    assert_eq!(created.amount, 1.5);
}

#[test]
fn test_connectivity_rebuild() {
    let mut model = example_model();
    let mut graph = example_graph();
    graph.edges.push(GraphEdge::new(4, 5));
    graph.edges.push(GraphEdge::new(6, 2));
    model.sync_from_graph(&graph, &EngineConfig::default()).unwrap();
    assert_eq!(model.reactions()["reac1"].reagents, vec!["E", "S", "P"]);
    assert_eq!(model.reactions()["reac2"].products, vec!["P", "S"]);
}

#[test]
fn test_same_class_edges_are_warnings() {
    let mut model = example_model();
    let mut graph = example_graph();
    graph.edges.push(GraphEdge::new(1, 2));
    graph.edges.push(GraphEdge::new(5, 6));
    let report = model.sync_from_graph(&graph, &EngineConfig::default()).unwrap();

    assert_eq!(
        report.diagnostics,
        vec![
            SyncDiagnostic::SameClassEdge {
                source: NodeId(1),
                target: NodeId(2),
                kind: EntityKind::Species
            },
            SyncDiagnostic::SameClassEdge {
                source: NodeId(5),
                target: NodeId(6),
                kind: EntityKind::Reaction
            },
        ]
    );
    assert_eq!(model.reactions()["reac1"].reagents, vec!["E", "S"]);
    assert_eq!(model.reactions()["reac2"].reagents, vec!["ES"]);
}

#[test]
fn test_class_mismatch_keeps_stored_kind() {
    let mut model = example_model();
    let mut graph = example_graph();
    graph.nodes[0].class = NodeClass::Reactions;
    let report = model.sync_from_graph(&graph, &EngineConfig::default()).unwrap();
    assert_eq!(
        report.diagnostics,
        vec![SyncDiagnostic::ClassMismatch {
            node: NodeId(1),
            stored: EntityKind::Species,
            payload: NodeClass::Reactions
        }]
    );
    assert_eq!(model.species()["spec1"].name, "E");
}

#[test]
fn test_unknown_edge_node_aborts_sync() {
    let mut model = example_model();
    let before = model.clone();
    let mut graph = updated_graph();
    graph.edges.push(GraphEdge::new(1, 200));
    let err = model
        .sync_from_graph(&graph, &EngineConfig::default())
        .unwrap_err();
    assert!(matches!(err, MolybdenumError::Reference(_)), "{err}");
    assert_eq!(model, before);
}

#[test]
fn test_duplicate_payload_nodes_rejected() {
    let mut model = example_model();
    let mut graph = example_graph();
    graph.nodes.push(GraphNode::new(3, "ES2", NodeClass::Species));
    assert!(matches!(
        model.sync_from_graph(&graph, &EngineConfig::default()),
        Err(MolybdenumError::Validation(_))
    ));
}

#[test]
fn test_empty_graph_clears_network() {
    let mut model = example_model();
    model
        .sync_from_graph(&GraphPayload::default(), &EngineConfig::default())
        .unwrap();
    assert!(model.species().is_empty());
    assert!(model.reactions().is_empty());
    assert!(model.params().is_empty());
    assert!(model.node_mapping().is_empty());
    assert_eq!(model.sim_config().points, Some(120));
}

#[test]
fn test_resync_parameters() {
    let mut model = example_model();
    let config = EngineConfig::default();
    assert!(model.resync_parameters(&config).is_empty());

    model.reactions.get_mut("reac1").unwrap().expression = "(kon*E*S^h-ES*kcat)".into();
    model.reactions.get_mut("reac2").unwrap().expression = "kcat*ES+const".into();
    let events = model.resync_parameters(&config);
    assert_eq!(
        events,
        vec![
            ModelEvent::ParameterAdded("param4".into(), "h".into()),
            ModelEvent::ParameterAdded("param5".into(), "const".into()),
            ModelEvent::ParameterRemoved("param1".into(), "koff".into()),
        ]
    );
    let expected: BTreeSet<String> = ["kon", "kcat", "const", "h"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(param_names(&model), expected);
    assert_eq!(model.params()["param2"].value, 10000000.0);
    assert_eq!(model.params()["param4"].value, 0.0);
    assert!(!model.params().contains_key("param1"));
    let ids: Vec<&str> = model.params().keys().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["param2", "param3", "param4", "param5"]);

    let snapshot = model.params().clone();
    assert!(model.resync_parameters(&config).is_empty());
    assert_eq!(model.params(), &snapshot);
}

#[test]
fn test_resync_drops_duplicate_parameter_names() {
    let mut model = example_model();
    model
        .params
        .insert(EntityId::from("param9"), crate::properties::Parameter::new("kon", 3.0));
    let events = model.resync_parameters(&EngineConfig::default());
    assert_eq!(
        events,
        vec![ModelEvent::ParameterRemoved("param9".into(), "kon".into())]
    );
    assert_eq!(model.params()["param2"].name, "kon");
}
