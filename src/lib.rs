//! # molybdenum-core
//!
//! A reconciliation engine for biochemical reaction-network models.
//!
//! ## Overview
//!
//! A reaction network (species, reactions, parameters) is edited through two interchangeable
//! surfaces: a node-link graph and a generated form. molybdenum-core holds the canonical,
//! ID-addressed model (the [`model::ReactionModel`]) and keeps it consistent with whichever
//! surface was edited last, while maintaining its structural invariants:
//!
//! - ids are unique across species, reactions and parameters
//! - every species and reaction has exactly one graph node
//! - the parameter table is exactly the set of free identifiers in the rate expressions
//! - renaming a species (or a parameter) rewrites every expression that uses it
//!
//! ## Architecture
//!
//! - **[`model`]**: the store, its JSON mapping shape, and graph payload types
//! - **[`nodekey`]**: node ids, internal ids, and the node mapping between them
//! - **[`expression`]**: tokenizer and classifier for rate expressions
//! - **[`reconcile`]**: graph diff and [`model::ReactionModel::sync_from_graph`]
//! - **[`patch`]**: form edits, [`model::ReactionModel::apply_patch`]
//! - **[`simulation`]**: simulation settings validated from form edits
//! - **[`event`]** / **[`diagnostic`]**: what a call changed, and what it ignored
//!
//! ## Quick Start
//!
//! ```rust
//! use molybdenum_core::{config::EngineConfig, model::{GraphPayload, ReactionModel}};
//!
//! # fn main() -> Result<(), molybdenum_core::MolybdenumError> {
//! let mut model = ReactionModel::from_json(
//!     r#"{"species": {"spec1": {"name": "E", "amt": 1.0, "fixed": false},
//!                     "spec2": {"name": "P", "amt": 0.0, "fixed": false}},
//!         "reactions": {"reac1": {"name": "v", "reagents": ["E"], "products": ["P"],
//!                                 "expression": "k*E"}},
//!         "params": {"param1": {"name": "k", "val": 0.5}}}"#,
//! )?;
//!
//! // The editor renamed E and removed the product edge.
//! let graph = GraphPayload::from_json(
//!     r#"{"nodes": [{"id": 1, "title": "Enz", "nodeClass": "species"},
//!                   {"id": 2, "title": "P", "nodeClass": "species"},
//!                   {"id": 3, "title": "v", "nodeClass": "reactions"}],
//!         "edges": [{"source": 1, "target": 3}]}"#,
//! )?;
//! let report = model.sync_from_graph(&graph, &EngineConfig::default())?;
//! assert!(report.is_clean());
//! assert_eq!(model.reactions()["reac1"].expression, "k*Enz");
//! assert!(model.reactions()["reac1"].products.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every operation returns [`MolybdenumError`]. Validation errors reject malformed input
//! before anything changes; reference errors abort a graph sync; type errors skip a single
//! form edit. Non-fatal anomalies are reported as [`diagnostic::SyncDiagnostic`]s and logged
//! through `tracing`.

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod event;
pub mod expression;
pub mod model;
pub mod nodekey;
pub mod patch;
pub mod properties;
pub mod reconcile;
pub mod simulation;

#[cfg(test)]
mod tests;

pub use error::*;
