//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use molybdenum_core::model::{GraphPayload, ReactionModel};
use std::path::PathBuf;

/// Initialize tracing for tests, respecting RUST_LOG env var.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[allow(dead_code)]
pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

/// The Michaelis-Menten model from `tests/fixtures/enzyme_model.json`.
#[allow(dead_code)]
pub fn enzyme_model() -> ReactionModel {
    init_logging();
    ReactionModel::from_json(&fixture("enzyme_model.json")).unwrap()
}

#[allow(dead_code)]
pub fn graph_fixture(name: &str) -> GraphPayload {
    GraphPayload::from_json(&fixture(name)).unwrap()
}
