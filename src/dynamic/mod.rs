//! Dynamic data evaluator
//!
//! Replays every dynamic-data operation declared on categories and entries,
//! in timeline order, producing a point-in-time store of named values per
//! character at every history index. This is the expensive pass: it runs
//! only inside mutation transactions, never on read.

pub mod expr;
pub mod resolve;
pub mod store;

use crate::chains::ChainIndex;
use crate::domain::entities::{Category, Character, Entry};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::*;
use crate::dynamic::resolve::{LINEAGE_MARKER, ResolveContext, resolve_key, resolve_template, rewrite_markers};
use crate::dynamic::store::Frame;
use crate::timeline::Timeline;
use std::collections::{BTreeMap, HashMap};

/// One planned store mutation, computed against an immutable frame view
/// before being written back
enum Planned {
    Value {
        character: CharacterId,
        key: String,
        operator: Operator,
        kind: ValueKind,
        operand: String,
    },
    Function {
        character: CharacterId,
        key: String,
        formula: String,
    },
}

/// Per-index, per-character value and function stores
///
/// `frames[i]` is the state visible at history index `i`, including that
/// index's Final-scope overlay.
#[derive(Debug, Clone, Default)]
pub struct DynamicIndex {
    frames: Vec<Frame>,
}

impl DynamicIndex {
    /// Full recompute over the whole timeline.
    pub fn recompute(
        characters: &BTreeMap<CharacterId, Character>,
        categories: &BTreeMap<CategoryId, Category>,
        entries: &HashMap<EntryId, Entry>,
        timeline: &Timeline,
        chains: &ChainIndex,
    ) -> Result<Self, DomainError> {
        let positions: HashMap<EntryId, usize> = timeline
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        // The rolling store carries Instant/Function state forward between
        // indices. Category-level ops seed it once per active category per
        // character, before any entry is processed.
        let mut rolling = Frame::new();
        for character in characters.values() {
            rolling.insert(character.id.clone(), store::CharacterStore::new());
        }
        for character in characters.values() {
            for category_id in &character.categories {
                let Some(category) = categories.get(category_id) else {
                    return Err(DomainError::category_not_found(category_id.clone()));
                };
                for op in &category.dynamic_ops {
                    if matches!(op.scope, Scope::Instant | Scope::Function) {
                        apply_op(&mut rolling, op, &character.id, None, chains);
                    }
                }
            }
        }

        let mut frames = Vec::with_capacity(timeline.len());
        for (index, entry_id) in timeline.iter().enumerate() {
            let entry = entries
                .get(entry_id)
                .ok_or_else(|| DomainError::entry_not_found(entry_id.clone()))?;

            if !entry.disabled {
                let anchor = chains.root_of(entry_id)?.clone();
                if entry.is_root()
                    && let Some(category) = categories.get(&entry.category)
                {
                    // Entry templates fire once per lineage root
                    for op in &category.entry_templates {
                        if matches!(op.scope, Scope::Instant | Scope::Function) {
                            apply_op(&mut rolling, op, &entry.character, Some(&anchor), chains);
                        }
                    }
                }
                for op in &entry.dynamic_ops {
                    if matches!(op.scope, Scope::Instant | Scope::Function) {
                        apply_op(&mut rolling, op, &entry.character, Some(&anchor), chains);
                    }
                }
            }

            // Final-scope operations apply to an overlay copy: visible at
            // this index, but never written into the rolling store, so an
            // additive Final never accumulates across indices.
            let mut overlay = rolling.clone();
            for character in characters.values() {
                for category_id in &character.categories {
                    let Some(category) = categories.get(category_id) else {
                        continue;
                    };
                    for op in &category.dynamic_ops {
                        if op.scope == Scope::Final {
                            apply_op(&mut overlay, op, &character.id, None, chains);
                        }
                    }
                    for root in chains.roots_for(&character.id, category_id) {
                        let Some(tip) = chains.tip_as_of(root, index, &positions)? else {
                            continue;
                        };
                        if entries.get(&tip).map(|e| e.disabled).unwrap_or(true) {
                            continue;
                        }
                        for op in &category.entry_templates {
                            if op.scope == Scope::Final {
                                apply_op(&mut overlay, op, &character.id, Some(root), chains);
                            }
                        }
                    }
                }
            }
            if !entry.disabled {
                let anchor = chains.root_of(entry_id)?.clone();
                for op in &entry.dynamic_ops {
                    if op.scope == Scope::Final {
                        apply_op(&mut overlay, op, &entry.character, Some(&anchor), chains);
                    }
                }
            }

            frames.push(overlay);
        }

        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn frame(&self, index: usize) -> Result<&Frame, DomainError> {
        self.frames.get(index).ok_or(DomainError::IndexOutOfRange {
            index,
            max: self.frames.len(),
        })
    }

    /// Point-in-time view of one character's named values.
    ///
    /// Function-scope keys are included, re-evaluated against this index's
    /// frame, and shadow a value-store key of the same name, matching
    /// reference-resolution order. Keys carrying the lineage marker are
    /// internal; they are filtered out unless `include_private` is set.
    pub fn snapshot(
        &self,
        character: &CharacterId,
        index: usize,
        include_private: bool,
        chains: &ChainIndex,
    ) -> Result<BTreeMap<String, Value>, DomainError> {
        let frame = self.frame(index)?;
        let store = frame
            .get(character)
            .ok_or_else(|| DomainError::character_not_found(character.clone()))?;
        let mut snapshot: BTreeMap<String, Value> = store
            .values
            .iter()
            .filter(|(key, _)| include_private || !key.contains(LINEAGE_MARKER))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let ctx = ResolveContext {
            frame,
            character,
            anchor: None,
            chains,
        };
        for key in store.functions.keys() {
            if !include_private && key.contains(LINEAGE_MARKER) {
                continue;
            }
            let rendered = resolve_template(&format!("[{key}]"), &ctx);
            snapshot.insert(key.clone(), parse_rendered(&rendered));
        }
        Ok(snapshot)
    }

    /// Resolve an arbitrary display template against one history index,
    /// using the entry's chain root as the implicit `$id` anchor.
    pub fn translate(
        &self,
        character: &CharacterId,
        entry: &EntryId,
        index: usize,
        template: &str,
        chains: &ChainIndex,
    ) -> Result<String, DomainError> {
        let frame = self.frame(index)?;
        let anchor = chains.root_of(entry)?.clone();
        let ctx = ResolveContext {
            frame,
            character,
            anchor: Some(&anchor),
            chains,
        };
        Ok(resolve_template(template, &ctx))
    }
}

/// Read a resolved template result back into the narrowest value type.
fn parse_rendered(text: &str) -> Value {
    if let Ok(integer) = text.parse::<i64>() {
        return Value::Integer(integer);
    }
    if let Ok(float) = text.parse::<f64>() {
        return Value::Float(float);
    }
    Value::Text(text.to_string())
}

/// Plan one operation against the current frame, then write it back.
fn apply_op(
    frame: &mut Frame,
    op: &DynamicOp,
    character: &CharacterId,
    anchor: Option<&EntryId>,
    chains: &ChainIndex,
) {
    let planned = {
        let ctx = ResolveContext {
            frame,
            character,
            anchor,
            chains,
        };
        let (target, key) = resolve_key(&op.key, &ctx);
        match op.scope {
            Scope::Function => Planned::Function {
                character: target,
                key,
                formula: rewrite_markers(&op.expression, &ctx),
            },
            Scope::Instant | Scope::Final => Planned::Value {
                character: target,
                key,
                operator: op.operator,
                kind: op.kind,
                operand: resolve_template(&op.expression, &ctx),
            },
        }
    };

    match planned {
        Planned::Function {
            character,
            key,
            formula,
        } => {
            frame
                .entry(character)
                .or_default()
                .functions
                .insert(key, formula);
        }
        Planned::Value {
            character,
            key,
            operator,
            kind,
            operand,
        } => {
            frame
                .entry(character)
                .or_default()
                .apply(&key, operator, kind, &operand);
        }
    }
}
