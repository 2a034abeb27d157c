use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use z3::ast::Dynamic;
use z3::FuncDecl;

use crate::error::CexError;
use crate::names::{self, VarCategory};

/// A counterexample decoded from a Z3 model.
///
/// Keys are chipc variable names with the Sketch suffix removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterexample {
    /// Packet field assignments (`pkt_*`).
    pub pkt_fields: HashMap<String, i64>,
    /// State group assignments (`state_group_*`).
    pub state_vars: HashMap<String, i64>,
}

impl Counterexample {
    /// Decode every declaration of `model`.
    ///
    /// Each interpretation is coerced to an integer before routing, so a
    /// non-integer declaration is an error even when its name would be dropped.
    pub fn from_z3_model(model: &z3::Model<'_>) -> Result<Self, CexError> {
        let mut cex = Self::default();
        for decl in model.iter() {
            let raw_name = decl.name();
            let value = const_value(model, &decl)?;
            cex.record(&raw_name, value);
        }
        Ok(cex)
    }

    /// Route one raw model assignment. Returns `false` if it was dropped.
    pub fn record(&mut self, raw_name: &str, value: i64) -> bool {
        match names::decode(raw_name) {
            Some((VarCategory::PacketField, name)) => {
                self.pkt_fields.insert(name.to_string(), value);
                true
            }
            Some((VarCategory::StateGroup, name)) => {
                self.state_vars.insert(name.to_string(), value);
                true
            }
            None => {
                tracing::trace!("Dropping model variable {raw_name}");
                false
            }
        }
    }

    /// Return whether both mappings are empty.
    pub fn is_empty(&self) -> bool {
        self.pkt_fields.is_empty() && self.state_vars.is_empty()
    }

    /// Split into `(pkt_fields, state_vars)`.
    pub fn into_parts(self) -> (HashMap<String, i64>, HashMap<String, i64>) {
        (self.pkt_fields, self.state_vars)
    }

    /// Serialize as a JSON object with `pkt_fields` and `state_vars` keys.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "pkt_fields": self.pkt_fields,
            "state_vars": self.state_vars,
        })
    }
}

/// Interpretation of a constant declaration as an exact integer.
fn const_value(model: &z3::Model<'_>, decl: &FuncDecl<'_>) -> Result<i64, CexError> {
    let name = decl.name();
    if decl.arity() != 0 {
        return Err(CexError::NonIntegerValue {
            name,
            value: format!("function of arity {}", decl.arity()),
        });
    }
    let constant = decl.apply(&[]);
    let interp = model
        .get_const_interp(&constant)
        .ok_or_else(|| CexError::NonIntegerValue {
            name: name.clone(),
            value: "no interpretation".to_string(),
        })?;
    as_exact_integer(name, &interp)
}

/// Integer numerals convert directly, bit-vector numerals as their unsigned value.
fn as_exact_integer(name: String, value: &Dynamic<'_>) -> Result<i64, CexError> {
    let exact = match (value.as_int(), value.as_bv()) {
        (Some(int), _) => int.as_i64(),
        (None, Some(bv)) => bv.as_u64().and_then(|v| i64::try_from(v).ok()),
        (None, None) => {
            return Err(CexError::NonIntegerValue {
                name,
                value: value.to_string(),
            });
        }
    };
    exact.ok_or_else(|| CexError::ValueOutOfRange {
        name,
        value: value.to_string(),
    })
}
