//! Per-character value and function stores
//!
//! A `CharacterStore` holds the named values visible at one history index
//! for one character, plus the named formulas (`Scope::Function`) that are
//! re-resolved on every reference instead of being applied.

use crate::domain::value_objects::{CharacterId, Operator, Value, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// All characters' stores at one history index
pub type Frame = HashMap<CharacterId, CharacterStore>;

/// Named values and formulas for one character at one history index
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CharacterStore {
    pub values: BTreeMap<String, Value>,
    pub functions: BTreeMap<String, String>,
}

impl CharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one resolved mutation to the value store.
    ///
    /// Failures are diagnostic, never fatal: a malformed operand is logged
    /// and the key keeps its previous value. First use of a key seeds it by
    /// declared kind before the operator applies; so does a kind mismatch
    /// left behind by an earlier operation.
    pub fn apply(&mut self, key: &str, operator: Operator, kind: ValueKind, operand: &str) {
        if operator == Operator::Assign {
            match parse_operand(kind, operand) {
                Some(value) => {
                    self.values.insert(key.to_string(), value);
                }
                None => {
                    log::warn!("cannot assign '{operand}' to '{key}' as {kind:?}, skipping");
                }
            }
            return;
        }

        let current = self.values.entry(key.to_string()).or_insert_with(|| kind.seed());
        match kind {
            ValueKind::Text => {
                log::warn!("operator {operator:?} is not valid for text key '{key}', skipping");
            }
            ValueKind::Integer => {
                let Ok(operand) = operand.trim().parse::<i64>() else {
                    log::warn!("cannot parse '{operand}' as integer for '{key}', skipping");
                    return;
                };
                let base = match current.as_integer() {
                    Some(i) => i,
                    None => {
                        log::warn!("key '{key}' held a non-integer value, reseeding to 0");
                        0
                    }
                };
                let result = match operator {
                    Operator::Add => base.wrapping_add(operand),
                    Operator::Subtract => base.wrapping_sub(operand),
                    Operator::Multiply => base.wrapping_mul(operand),
                    Operator::Divide => {
                        if operand == 0 {
                            log::warn!("integer division of '{key}' by zero, skipping");
                            return;
                        }
                        // Floor division, matching the journal's integer semantics
                        base.div_euclid(operand)
                    }
                    Operator::Assign => unreachable!(),
                };
                *current = Value::Integer(result);
            }
            ValueKind::Float => {
                let Ok(operand) = operand.trim().parse::<f64>() else {
                    log::warn!("cannot parse '{operand}' as float for '{key}', skipping");
                    return;
                };
                let base = match current.as_float() {
                    Some(f) => f,
                    None => {
                        log::warn!("key '{key}' held a non-numeric value, reseeding to 0.0");
                        0.0
                    }
                };
                let result = match operator {
                    Operator::Add => base + operand,
                    Operator::Subtract => base - operand,
                    Operator::Multiply => base * operand,
                    Operator::Divide => {
                        if operand == 0.0 {
                            log::warn!("float division of '{key}' by zero, skipping");
                            return;
                        }
                        base / operand
                    }
                    Operator::Assign => unreachable!(),
                };
                *current = Value::Float(result);
            }
        }
    }
}

fn parse_operand(kind: ValueKind, operand: &str) -> Option<Value> {
    match kind {
        ValueKind::Text => Some(Value::Text(operand.to_string())),
        ValueKind::Integer => operand.trim().parse::<i64>().ok().map(Value::Integer),
        ValueKind::Float => operand.trim().parse::<f64>().ok().map(Value::Float),
    }
}
