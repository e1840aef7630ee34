//! Form patch engine: attribute edits addressed by `<entityId>_<attribute>` keys.
//!
//! Edits are applied in two phases. Every edit is first checked for shape (key syntax, value
//! count, attribute known for the entity's kind); any failure there rejects the whole patch
//! before the model is touched. The checked edits are then applied in order. A value that
//! cannot be coerced to its attribute's type only skips that one edit.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{
    config::EngineConfig,
    event::ModelEvent,
    expression::{is_numeric_literal, tokenize},
    model::ReactionModel,
    nodekey::EntityId,
    properties::{parse_flag, parse_float, EntityKind},
    MolybdenumError,
};

/// One form field: key and the values the form submitted for it.
pub type FormEdit = (String, Vec<String>);

/// Parse a JSON form payload, `[["spec1_amt", ["12."]], ...]`.
pub fn form_from_json(content: &str) -> Result<Vec<FormEdit>, MolybdenumError> {
    Ok(serde_json::from_str(content)?)
}

/// A form key split at its single `_`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormKey {
    pub id: String,
    pub attribute: String,
}

impl FromStr for FormKey {
    type Err = MolybdenumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('_');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(attribute), None) => Ok(FormKey {
                id: id.to_string(),
                attribute: attribute.to_string(),
            }),
            _ => Err(MolybdenumError::Validation(format!(
                "Invalid component or attribute: \"{s}\" has zero or more than one \"_\" signs, exactly one required"
            ))),
        }
    }
}

/// Attributes the form may edit, each valid for exactly one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attribute {
    /// species amount, float
    Amount,
    /// species boundary flag, bool
    Fixed,
    /// reaction rate law, string
    Expression,
    /// parameter name, identifier
    Name,
    /// parameter value, float
    Value,
}

impl Attribute {
    pub fn resolve(kind: EntityKind, raw: &str) -> Option<Attribute> {
        match (kind, raw) {
            (EntityKind::Species, "amt" | "amount") => Some(Attribute::Amount),
            (EntityKind::Species, "fixed") => Some(Attribute::Fixed),
            (EntityKind::Reaction, "expression") => Some(Attribute::Expression),
            (EntityKind::Parameter, "name") => Some(Attribute::Name),
            (EntityKind::Parameter, "val" | "value") => Some(Attribute::Value),
            _ => None,
        }
    }

    /// Field name in the serialized model.
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Amount => "amt",
            Attribute::Fixed => "fixed",
            Attribute::Expression => "expression",
            Attribute::Name => "name",
            Attribute::Value => "val",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of [ReactionModel::apply_patch]. `skipped` holds the keys of edits addressed to
/// entities the model doesn't have; `rejected` holds the coercion errors of edits that were
/// left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchReport {
    pub events: Vec<ModelEvent>,
    pub skipped: Vec<String>,
    #[serde(default)]
    pub rejected: Vec<MolybdenumError>,
}

#[derive(Debug)]
struct CheckedEdit<'a> {
    key: &'a str,
    id: EntityId,
    attribute: Attribute,
    value: &'a str,
}

fn type_error(edit: &CheckedEdit<'_>, expected: &str) -> MolybdenumError {
    MolybdenumError::Type(format!(
        "Attribute \"{}\" in \"{}\" expects {expected}, got \"{}\"",
        edit.attribute, edit.key, edit.value
    ))
}

/// A replacement parameter name must survive tokenization as a single parameter token.
fn is_identifier(name: &str) -> bool {
    !name.is_empty() && tokenize(name) == [name] && !is_numeric_literal(name)
}

impl ReactionModel {
    /// Apply form edits.
    ///
    /// Returns [MolybdenumError::Validation] without changing anything when an edit has a
    /// malformed key, more or less than one value, or an attribute its entity doesn't have.
    /// Edits for unknown entity ids are skipped and listed in the report. When one or more
    /// values fail coercion, the other edits are still applied and the first
    /// [MolybdenumError::Type] is returned. Use [ReactionModel::apply_patch_with_report] to
    /// keep the report of what was committed in that case.
    ///
    /// Expression edits and parameter renames trigger one parameter resync at the end.
    pub fn apply_patch(
        &mut self,
        edits: &[FormEdit],
        config: &EngineConfig,
    ) -> Result<PatchReport, MolybdenumError> {
        let mut report = self.apply_patch_with_report(edits, config)?;
        if report.rejected.is_empty() {
            return Ok(report);
        }
        tracing::warn!(
            "[apply_patch] {} edits rejected, {} events committed, skipped {:?}",
            report.rejected.len(),
            report.events.len(),
            report.skipped
        );
        Err(report.rejected.remove(0))
    }

    /// Same as [ReactionModel::apply_patch], but coercion failures are collected in
    /// [PatchReport::rejected] instead of being returned. Only validation errors are `Err`.
    pub fn apply_patch_with_report(
        &mut self,
        edits: &[FormEdit],
        config: &EngineConfig,
    ) -> Result<PatchReport, MolybdenumError> {
        let mut report = PatchReport::default();
        let checked = self.check_edits(edits, &mut report.skipped)?;

        let mut needs_resync = false;
        for edit in checked.iter() {
            match self.apply_edit(edit) {
                Ok(events) => {
                    needs_resync |= !events.is_empty()
                        && matches!(edit.attribute, Attribute::Expression | Attribute::Name);
                    report.events.extend(events);
                }
                Err(e) => {
                    tracing::warn!("[apply_patch] skipping \"{}\": {}", edit.key, e);
                    report.rejected.push(e);
                }
            }
        }
        if needs_resync {
            report.events.extend(self.resync_parameters(config));
        }
        tracing::debug!(
            "[apply_patch] {} edits, {} events, {} skipped, {} rejected",
            edits.len(),
            report.events.len(),
            report.skipped.len(),
            report.rejected.len()
        );
        Ok(report)
    }

    fn check_edits<'a>(
        &self,
        edits: &'a [FormEdit],
        skipped: &mut Vec<String>,
    ) -> Result<Vec<CheckedEdit<'a>>, MolybdenumError> {
        let mut checked = Vec::with_capacity(edits.len());
        for (key, values) in edits.iter() {
            let form_key = FormKey::from_str(key)?;
            let value = match values.as_slice() {
                [value] => value.as_str(),
                _ => {
                    return Err(MolybdenumError::Validation(format!(
                        "Invalid form input for \"{key}\": exactly one value expected, got {}",
                        values.len()
                    )))
                }
            };
            let Some(kind) = self.kind_of(&form_key.id) else {
                tracing::debug!("[apply_patch] no entity \"{}\", ignoring \"{}\"", form_key.id, key);
                skipped.push(key.clone());
                continue;
            };
            let attribute = Attribute::resolve(kind, &form_key.attribute).ok_or_else(|| {
                MolybdenumError::Validation(format!(
                    "Unrecognized attribute \"{}\" for {kind} \"{}\"",
                    form_key.attribute, form_key.id
                ))
            })?;
            checked.push(CheckedEdit {
                key: key.as_str(),
                id: EntityId::from(form_key.id),
                attribute,
                value,
            });
        }
        Ok(checked)
    }

    fn apply_edit(&mut self, edit: &CheckedEdit<'_>) -> Result<Vec<ModelEvent>, MolybdenumError> {
        let id = edit.id.as_str();
        let missing = || MolybdenumError::Reference(format!("Could not find \"{id}\""));
        let changed = |value: String| {
            vec![ModelEvent::AttributeChanged(
                edit.id.clone(),
                edit.attribute.to_string(),
                value,
            )]
        };
        match edit.attribute {
            Attribute::Amount => {
                let amount = parse_float(edit.value).ok_or_else(|| type_error(edit, "a float"))?;
                let species = self.species.get_mut(id).ok_or_else(missing)?;
                species.amount = amount;
                Ok(changed(amount.to_string()))
            }
            Attribute::Fixed => {
                let flag = parse_flag(edit.value).ok_or_else(|| type_error(edit, "a boolean"))?;
                let species = self.species.get_mut(id).ok_or_else(missing)?;
                species.set_fixed(flag);
                Ok(changed(species.fixed.to_string()))
            }
            Attribute::Expression => {
                let reaction = self.reactions.get_mut(id).ok_or_else(missing)?;
                if reaction.expression == edit.value {
                    return Ok(vec![]);
                }
                let old = std::mem::replace(&mut reaction.expression, edit.value.to_string());
                Ok(vec![ModelEvent::ExpressionChanged(
                    edit.id.clone(),
                    old,
                    edit.value.to_string(),
                )])
            }
            Attribute::Name => {
                let name = edit.value.trim();
                if !is_identifier(name) || self.species_names().contains(name) {
                    return Err(type_error(edit, "an identifier that is not a species name"));
                }
                let position = self.params.get_index_of(id).ok_or_else(missing)?;
                if self.params[position].name == name {
                    return Ok(vec![]);
                }
                if let Some((index, (other_id, other))) = self
                    .params
                    .iter()
                    .enumerate()
                    .find(|(_, (_, p))| p.name == name)
                {
                    // The resync keeps whichever comes first in store order.
                    let (dropped_id, dropped_value) = if index < position {
                        (id, self.params[position].value)
                    } else {
                        (other_id.as_str(), other.value)
                    };
                    tracing::warn!(
                        "[apply_patch] renaming {} onto existing \"{}\" merges it with {}; \
                         value {} of {} is dropped",
                        id,
                        name,
                        other_id,
                        dropped_value,
                        dropped_id
                    );
                }
                let parameter = &mut self.params[position];
                let old = std::mem::replace(&mut parameter.name, name.to_string());
                let mut events = vec![ModelEvent::EntityRenamed(
                    edit.id.clone(),
                    old.clone(),
                    name.to_string(),
                )];
                events.extend(self.rename_in_expressions(&old, name));
                Ok(events)
            }
            Attribute::Value => {
                let value = parse_float(edit.value).ok_or_else(|| type_error(edit, "a float"))?;
                let parameter = self.params.get_mut(id).ok_or_else(missing)?;
                parameter.value = value;
                Ok(changed(value.to_string()))
            }
        }
    }
}
