use crate::{
    error::MolybdenumError,
    properties::{DEFAULT_PARAMETER_VALUE, DEFAULT_SPECIES_AMOUNT, UNDEFINED_EXPRESSION},
};
use serde::{Deserialize, Serialize};
use std::{fs::read_to_string, path::Path};

/// Defaults applied to entities the engine creates on the caller's behalf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Amount given to a species created from a new graph node.
    pub default_species_amount: f64,
    /// Value given to a parameter discovered in a rate expression.
    pub default_parameter_value: f64,
    /// Expression given to a reaction created from a new graph node.
    pub undefined_expression: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_species_amount: DEFAULT_SPECIES_AMOUNT,
            default_parameter_value: DEFAULT_PARAMETER_VALUE,
            undefined_expression: UNDEFINED_EXPRESSION.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, MolybdenumError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, MolybdenumError> {
        tracing::debug!("Reading engine config from: {:?}", path.as_ref());
        let content = read_to_string(path)?;
        EngineConfig::from_toml_str(&content)
    }
}
