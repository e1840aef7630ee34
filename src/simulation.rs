//! Simulation settings attached to a model, and their validation from form edits.
//!
//! The settings are independent of the reaction network; they are only stored here so that a
//! simulation collaborator can read them back alongside the model.

use serde::{Deserialize, Serialize};

use crate::{error::MolybdenumError, model::ReactionModel, patch::FormEdit, properties::parse_float};

pub const SIM_START: &str = "sim_start";
pub const SIM_END: &str = "sim_end";
pub const SIM_POINTS: &str = "sim_points";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    #[serde(rename = "sim_start", default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(rename = "sim_end", default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(rename = "sim_points", default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
}

impl SimulationConfig {
    pub fn new(start: f64, end: f64, points: u64) -> Self {
        SimulationConfig {
            start: Some(start),
            end: Some(end),
            points: Some(points),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.points.is_none()
    }

    /// Build a configuration from `sim_*` form edits. Every key is checked before anything is
    /// returned, so a single bad edit rejects the whole set.
    pub fn from_form(edits: &[FormEdit]) -> Result<Self, MolybdenumError> {
        let mut config = SimulationConfig::default();
        for (key, values) in edits {
            let value = match values.as_slice() {
                [value] => value,
                _ => {
                    return Err(MolybdenumError::Validation(format!(
                        "Invalid form input for \"{key}\": exactly one value expected, got {}",
                        values.len()
                    )))
                }
            };
            match key.as_str() {
                SIM_START | SIM_END => {
                    let parsed = parse_float(value).ok_or_else(|| {
                        MolybdenumError::Validation(format!(
                            "Value for \"{key}\" must be an integer or float, got \"{value}\""
                        ))
                    })?;
                    if key == SIM_START {
                        config.start = Some(parsed);
                    } else {
                        config.end = Some(parsed);
                    }
                }
                SIM_POINTS => {
                    let parsed = value.trim().parse::<u64>().map_err(|_| {
                        MolybdenumError::Validation(format!(
                            "Value for \"{SIM_POINTS}\" must be a non-negative integer, got \"{value}\""
                        ))
                    })?;
                    config.points = Some(parsed);
                }
                _ => {
                    return Err(MolybdenumError::Validation(format!(
                        "Unrecognized simulation parameter \"{key}\", must be one of \"{SIM_START}\", \"{SIM_END}\" or \"{SIM_POINTS}\""
                    )))
                }
            }
        }
        Ok(config)
    }

    /// The complete `(start, end, points)` triple a simulation run needs.
    pub fn require(&self) -> Result<(f64, f64, u64), MolybdenumError> {
        let missing = |key: &str| {
            MolybdenumError::Validation(format!("Simulation parameter \"{key}\" is not configured"))
        };
        let start = self.start.ok_or_else(|| missing(SIM_START))?;
        let end = self.end.ok_or_else(|| missing(SIM_END))?;
        let points = self.points.ok_or_else(|| missing(SIM_POINTS))?;
        if end <= start {
            return Err(MolybdenumError::Validation(format!(
                "\"{SIM_END}\" ({end}) must be greater than \"{SIM_START}\" ({start})"
            )));
        }
        Ok((start, end, points))
    }
}

impl ReactionModel {
    /// Replace the simulation configuration with the one described by `edits`. On error the
    /// previous configuration is kept.
    pub fn set_sim_config(&mut self, edits: &[FormEdit]) -> Result<(), MolybdenumError> {
        let config = SimulationConfig::from_form(edits)?;
        tracing::debug!("[ReactionModel::set_sim_config] {:?}", config);
        self.sim_params = config;
        Ok(())
    }
}
