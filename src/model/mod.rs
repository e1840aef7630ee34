//! Model module: the canonical reaction-network store and its graph views.
//!
//! # Module Organization
//!
//! - [`base`]: [`ReactionModel`], loading, serialization, derived queries
//! - [`graph`]: Graph payload types exchanged with the editor ([`GraphPayload`]) and the
//!   petgraph connectivity view ([`ReactionGraph`])
//!
//! ```rust
//! use molybdenum_core::model::{GraphPayload, ReactionModel};
//! ```

mod base;
mod graph;


pub use base::ReactionModel;
pub use graph::{EdgeRole, GraphEdge, GraphNode, GraphPayload, NodeClass, ReactionGraph};
