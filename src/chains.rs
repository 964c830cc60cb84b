//! Revision chain tracker
//!
//! Derives, from the flat entry set and the timeline order, the chain root
//! of every entry, the ordered member list of every chain, and the chain
//! roots belonging to each (character, category) pair. The index is a cache:
//! it is rebuilt from scratch after every structural mutation, never patched
//! incrementally.

use crate::domain::entities::Entry;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{CategoryId, CharacterId, EntryId};
use crate::timeline::Timeline;
use std::collections::HashMap;

/// Derived chain lookup tables
///
/// A corrupt pointer (dangling child, cycle, or a revision appearing in the
/// timeline before its parent) fails the whole rebuild: a best-effort
/// partial chain would silently produce wrong point-in-time views.
#[derive(Debug, Clone, Default)]
pub struct ChainIndex {
    root_of: HashMap<EntryId, EntryId>,
    members: HashMap<EntryId, Vec<EntryId>>,
    roots_by_owner: HashMap<(CharacterId, CategoryId), Vec<EntryId>>,
}

impl ChainIndex {
    /// Rebuild in one left-to-right pass over the timeline.
    ///
    /// In a well-formed timeline a chain's root appears before any of its
    /// revisions, so every unassigned entry starts a new chain and each
    /// entry is visited once.
    pub fn rebuild(
        timeline: &Timeline,
        entries: &HashMap<EntryId, Entry>,
    ) -> Result<Self, DomainError> {
        let mut index = ChainIndex::default();

        for id in timeline.iter() {
            if index.root_of.contains_key(id) {
                continue;
            }
            let entry = entries
                .get(id)
                .ok_or_else(|| DomainError::entry_not_found(id.clone()))?;
            if let Some(parent) = &entry.parent {
                return Err(DomainError::corrupt_chain(
                    id.clone(),
                    format!("revision precedes its parent '{parent}' in the timeline"),
                ));
            }

            let mut chain = Vec::new();
            let mut current = entry;
            loop {
                if chain.len() > entries.len() {
                    return Err(DomainError::corrupt_chain(
                        id.clone(),
                        "cycle detected in child pointers",
                    ));
                }
                chain.push(current.id.clone());
                index.root_of.insert(current.id.clone(), id.clone());
                match &current.child {
                    Some(child) => {
                        current = entries.get(child).ok_or_else(|| {
                            DomainError::corrupt_chain(
                                current.id.clone(),
                                format!("dangling child pointer '{child}'"),
                            )
                        })?;
                    }
                    None => break,
                }
            }

            index
                .roots_by_owner
                .entry((entry.character.clone(), entry.category.clone()))
                .or_default()
                .push(id.clone());
            index.members.insert(id.clone(), chain);
        }

        Ok(index)
    }

    /// Chain root of an entry.
    pub fn root_of(&self, entry: &EntryId) -> Result<&EntryId, DomainError> {
        self.root_of
            .get(entry)
            .ok_or_else(|| DomainError::entry_not_found(entry.clone()))
    }

    /// Ordered member list (root to tip) of the chain containing `entry`.
    pub fn chain(&self, entry: &EntryId) -> Result<&[EntryId], DomainError> {
        let root = self.root_of(entry)?;
        Ok(self.members.get(root).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Chain roots belonging to one character and category, in timeline order.
    pub fn roots_for(&self, character: &CharacterId, category: &CategoryId) -> &[EntryId] {
        self.roots_by_owner
            .get(&(character.clone(), category.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn roots(&self) -> impl Iterator<Item = &EntryId> {
        self.members.keys()
    }

    /// Latest revision of `entry`'s chain at or before `max_index`.
    pub fn tip_as_of(
        &self,
        entry: &EntryId,
        max_index: usize,
        positions: &HashMap<EntryId, usize>,
    ) -> Result<Option<EntryId>, DomainError> {
        let mut tip = None;
        for member in self.chain(entry)? {
            match positions.get(member) {
                Some(&position) if position <= max_index => tip = Some(member.clone()),
                _ => break,
            }
        }
        Ok(tip)
    }
}
