/// [crate::properties] contains the entity records held by a [crate::model::ReactionModel] and
/// the tagged [EntityKind] used to dispatch on them.
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Prefix marking a species as a boundary (fixed) species.
pub const BOUNDARY_MARKER: char = '$';

/// Expression given to reactions created from a bare graph node.
pub const UNDEFINED_EXPRESSION: &str = "undefined";

pub const DEFAULT_SPECIES_AMOUNT: f64 = 10.0;

pub const DEFAULT_PARAMETER_VALUE: f64 = 0.0;

/// The three classes of entity addressed by an internal id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Species,
    Reaction,
    Parameter,
}

impl EntityKind {
    /// Prefix used by the id allocator for freshly created entities.
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Species => "spec",
            EntityKind::Reaction => "reac",
            EntityKind::Parameter => "param",
        }
    }

    /// Key of the collection holding this kind in the model mapping.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Species => "species",
            EntityKind::Reaction => "reactions",
            EntityKind::Parameter => "params",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Species => "species",
            EntityKind::Reaction => "reaction",
            EntityKind::Parameter => "parameter",
        };
        write!(f, "{name}")
    }
}

pub fn is_boundary_name(name: &str) -> bool {
    name.starts_with(BOUNDARY_MARKER)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    #[serde(rename = "amt")]
    pub amount: f64,
    #[serde(default)]
    pub fixed: bool,
}

impl Species {
    /// A boundary-marked name forces `fixed` regardless of the requested flag.
    pub fn new<S: Into<String>>(name: S, amount: f64, fixed: bool) -> Species {
        let name = name.into();
        let fixed = fixed || is_boundary_name(&name);
        Species {
            name,
            amount,
            fixed,
        }
    }

    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed || is_boundary_name(&self.name);
    }

    /// Renaming to a `$` name fixes the species. Renaming away from one leaves `fixed` as it
    /// is; clear it with [Species::set_fixed].
    pub fn rename<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
        self.fixed = self.fixed || is_boundary_name(&self.name);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub name: String,
    #[serde(default)]
    pub reagents: Vec<String>,
    #[serde(default)]
    pub products: Vec<String>,
    pub expression: String,
}

impl Reaction {
    pub fn new<S: Into<String>, E: Into<String>>(name: S, expression: E) -> Reaction {
        Reaction {
            name: name.into(),
            reagents: vec![],
            products: vec![],
            expression: expression.into(),
        }
    }

    pub fn with_connectivity(mut self, reagents: &[&str], products: &[&str]) -> Reaction {
        self.reagents = reagents.iter().map(|s| s.to_string()).collect();
        self.products = products.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn clear_connectivity(&mut self) {
        self.reagents.clear();
        self.products.clear();
    }

    /// True if `species` takes part in this reaction as reagent or product.
    pub fn involves(&self, species: &str) -> bool {
        self.reagents.iter().any(|r| r == species) || self.products.iter().any(|p| p == species)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "val")]
    pub value: f64,
}

impl Parameter {
    pub fn new<S: Into<String>>(name: S, value: f64) -> Parameter {
        Parameter {
            name: name.into(),
            value,
        }
    }
}

/// Parse a form-supplied float. Booleans and non-finite values are rejected.
pub fn parse_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if parse_flag_literal(trimmed).is_some() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a form-supplied boolean (`true`/`false`, plus the `on`/`off` sent by checkboxes).
pub fn parse_flag(raw: &str) -> Option<bool> {
    parse_flag_literal(raw.trim())
}

fn parse_flag_literal(trimmed: &str) -> Option<bool> {
    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "on" => Some(true),
        "false" | "off" => Some(false),
        _ => None,
    }
}
