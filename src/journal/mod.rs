//! Journal aggregate - the single owner of all in-memory state
//!
//! Every mutation goes through a command on [`Journal`]; nothing outside
//! this module touches entries, chains, or outputs directly, because nearly
//! every mutation carries cascading re-link and cache-invalidation
//! obligations. Each public command runs to completion — including the full
//! chain/output/dynamic recompute — before returning.

pub mod search;

use crate::chains::ChainIndex;
use crate::domain::entities::*;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::*;
use crate::dynamic::DynamicIndex;
use crate::outputs;
use crate::timeline::Timeline;
use std::collections::{BTreeMap, HashMap};

/// Result of a whole-corpus search
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResults {
    pub entries: Vec<EntryId>,
    pub categories: Vec<CategoryId>,
}

/// The campaign journal: characters, categories, entries, the timeline,
/// output windows, and the derived caches over all of them
#[derive(Debug, Clone, Default)]
pub struct Journal {
    characters: BTreeMap<CharacterId, Character>,
    categories: BTreeMap<CategoryId, Category>,
    entries: HashMap<EntryId, Entry>,
    timeline: Timeline,
    outputs: Vec<Output>,
    credentials_path: Option<String>,

    chains: ChainIndex,
    dynamic: DynamicIndex,
    owners: HashMap<EntryId, OutputId>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a journal from persisted parts, validating all invariants.
    pub fn assemble(
        characters: BTreeMap<CharacterId, Character>,
        categories: BTreeMap<CategoryId, Category>,
        entries: HashMap<EntryId, Entry>,
        timeline: Timeline,
        outputs: Vec<Output>,
        credentials_path: Option<String>,
    ) -> Result<Self, DomainError> {
        let mut journal = Self {
            characters,
            categories,
            entries,
            timeline,
            outputs,
            credentials_path,
            ..Self::default()
        };
        journal.rebuild_caches()?;
        Ok(journal)
    }

    // ---- mutation transaction ----

    /// Run a mutating closure, then rebuild every cache.
    ///
    /// The rebuild happens even when the closure errors, so a partially
    /// applied command can never leave stale caches behind.
    fn mutate<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, DomainError>,
    ) -> Result<R, DomainError> {
        let result = f(self);
        let rebuilt = self.rebuild_caches();
        match result {
            Err(e) => Err(e),
            Ok(value) => rebuilt.map(|_| value),
        }
    }

    fn rebuild_caches(&mut self) -> Result<(), DomainError> {
        self.chains = ChainIndex::rebuild(&self.timeline, &self.entries)?;
        self.owners = outputs::reconcile(&mut self.outputs, &self.timeline)?;
        self.dynamic = DynamicIndex::recompute(
            &self.characters,
            &self.categories,
            &self.entries,
            &self.timeline,
            &self.chains,
        )?;
        Ok(())
    }

    // ---- characters ----

    pub fn add_character(&mut self, character: Character) -> Result<(), DomainError> {
        self.mutate(|j| {
            if character.name.trim().is_empty() {
                return Err(DomainError::invalid_operation("character name is empty"));
            }
            if j.characters.contains_key(&character.id) {
                return Err(DomainError::duplicate_id(character.id.as_str()));
            }
            if j.characters.values().any(|c| c.name == character.name) {
                return Err(DomainError::invalid_operation(format!(
                    "character name '{}' already in use",
                    character.name
                )));
            }
            for category in &character.categories {
                if !j.categories.contains_key(category) {
                    return Err(DomainError::category_not_found(category.clone()));
                }
            }
            j.characters.insert(character.id.clone(), character);
            Ok(())
        })
    }

    pub fn rename_character(
        &mut self,
        id: &CharacterId,
        name: impl Into<String>,
    ) -> Result<(), DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_operation("character name is empty"));
        }
        if self.characters.values().any(|c| &c.id != id && c.name == name) {
            return Err(DomainError::invalid_operation(format!(
                "character name '{name}' already in use"
            )));
        }
        let character = self
            .characters
            .get_mut(id)
            .ok_or_else(|| DomainError::character_not_found(id.clone()))?;
        character.name = name;
        Ok(())
    }

    /// Replace a character's active category list. Removing a category
    /// cascades into deleting that character's entries for it.
    pub fn set_character_categories(
        &mut self,
        id: &CharacterId,
        categories: Vec<CategoryId>,
    ) -> Result<(), DomainError> {
        self.mutate(|j| {
            for category in &categories {
                if !j.categories.contains_key(category) {
                    return Err(DomainError::category_not_found(category.clone()));
                }
            }
            let character = j
                .characters
                .get(id)
                .ok_or_else(|| DomainError::character_not_found(id.clone()))?;
            let removed: Vec<CategoryId> = character
                .categories
                .iter()
                .filter(|c| !categories.contains(c))
                .cloned()
                .collect();
            let doomed: Vec<EntryId> = j
                .entries
                .values()
                .filter(|e| &e.character == id && removed.contains(&e.category))
                .map(|e| e.id.clone())
                .collect();
            for entry in doomed {
                j.delete_entry_internal(&entry)?;
            }
            j.characters
                .get_mut(id)
                .expect("checked above")
                .categories = categories;
            Ok(())
        })
    }

    /// Delete a character and every entry belonging to it.
    pub fn delete_character(&mut self, id: &CharacterId) -> Result<(), DomainError> {
        self.mutate(|j| {
            if !j.characters.contains_key(id) {
                return Err(DomainError::character_not_found(id.clone()));
            }
            let doomed: Vec<EntryId> = j
                .entries
                .values()
                .filter(|e| &e.character == id)
                .map(|e| e.id.clone())
                .collect();
            for entry in doomed {
                j.delete_entry_internal(&entry)?;
            }
            j.characters.remove(id);
            Ok(())
        })
    }

    // ---- categories ----

    pub fn add_category(&mut self, category: Category) -> Result<(), DomainError> {
        self.mutate(|j| {
            if category.name.trim().is_empty() {
                return Err(DomainError::invalid_operation("category name is empty"));
            }
            if j.categories.contains_key(&category.id) {
                return Err(DomainError::duplicate_id(category.id.as_str()));
            }
            if j.categories.values().any(|c| c.name == category.name) {
                return Err(DomainError::invalid_operation(format!(
                    "category name '{}' already in use",
                    category.name
                )));
            }
            j.categories.insert(category.id.clone(), category);
            Ok(())
        })
    }

    /// Replace a category's templates, flags, and dynamic operations.
    ///
    /// The property schema is immutable here; schema changes go through
    /// [`Journal::edit_category_properties`] so entry data stays aligned.
    pub fn replace_category(&mut self, category: Category) -> Result<(), DomainError> {
        self.mutate(|j| {
            let existing = j
                .categories
                .get(&category.id)
                .ok_or_else(|| DomainError::category_not_found(category.id.clone()))?;
            if existing.properties != category.properties {
                return Err(DomainError::invalid_operation(
                    "property schema changes must go through edit_category_properties",
                ));
            }
            j.categories.insert(category.id.clone(), category);
            Ok(())
        })
    }

    /// Apply positional schema edits, replaying each one against every
    /// existing entry's value list so data stays aligned with the schema.
    pub fn edit_category_properties(
        &mut self,
        id: &CategoryId,
        edits: &[PropertyEdit],
    ) -> Result<(), DomainError> {
        self.mutate(|j| {
            if !j.categories.contains_key(id) {
                return Err(DomainError::category_not_found(id.clone()));
            }
            for edit in edits {
                j.categories
                    .get_mut(id)
                    .expect("checked above")
                    .apply_property_edit(edit)?;
                for entry in j.entries.values_mut().filter(|e| &e.category == id) {
                    apply_value_edit(&mut entry.values, edit);
                }
            }
            Ok(())
        })
    }

    /// Delete a category, all entries of it, and its membership everywhere.
    pub fn delete_category(&mut self, id: &CategoryId) -> Result<(), DomainError> {
        self.mutate(|j| {
            if !j.categories.contains_key(id) {
                return Err(DomainError::category_not_found(id.clone()));
            }
            let doomed: Vec<EntryId> = j
                .entries
                .values()
                .filter(|e| &e.category == id)
                .map(|e| e.id.clone())
                .collect();
            for entry in doomed {
                j.delete_entry_internal(&entry)?;
            }
            for character in j.characters.values_mut() {
                character.categories.retain(|c| c != id);
            }
            j.categories.remove(id);
            Ok(())
        })
    }

    // ---- entries ----

    /// Add a fresh chain root at the head of the timeline (right after the
    /// cursor), advancing the cursor onto it.
    pub fn add_entry(&mut self, mut entry: Entry) -> Result<(), DomainError> {
        self.mutate(|j| {
            if j.entries.contains_key(&entry.id) {
                return Err(DomainError::duplicate_id(entry.id.as_str()));
            }
            if entry.parent.is_some() || entry.child.is_some() {
                return Err(DomainError::invalid_operation(
                    "new entries start unlinked; use add_revision to extend a chain",
                ));
            }
            let character = j
                .characters
                .get(&entry.character)
                .ok_or_else(|| DomainError::character_not_found(entry.character.clone()))?;
            let category = j
                .categories
                .get(&entry.category)
                .ok_or_else(|| DomainError::category_not_found(entry.category.clone()))?;
            if !character.has_category(&entry.category) {
                return Err(DomainError::invalid_operation(format!(
                    "category '{}' is not active for character '{}'",
                    entry.category, entry.character
                )));
            }
            if category.is_singleton
                && !j.chains.roots_for(&entry.character, &entry.category).is_empty()
            {
                return Err(DomainError::invalid_operation(format!(
                    "category '{}' is a singleton and already has an entry",
                    entry.category
                )));
            }
            entry.values.resize(category.properties.len(), String::new());
            j.timeline.insert_at_head(entry.id.clone())?;
            j.entries.insert(entry.id.clone(), entry);
            Ok(())
        })
    }

    /// Add a revision extending the lineage containing `lineage_member`.
    ///
    /// The new entry becomes the child of the chain's tip and lands after
    /// both the cursor and the tip, keeping revision order aligned with
    /// timeline order.
    pub fn add_revision(
        &mut self,
        lineage_member: &EntryId,
        mut entry: Entry,
    ) -> Result<(), DomainError> {
        self.mutate(|j| {
            if j.entries.contains_key(&entry.id) {
                return Err(DomainError::duplicate_id(entry.id.as_str()));
            }
            let chain = j.chains.chain(lineage_member)?;
            let tip = chain.last().cloned().ok_or_else(|| {
                DomainError::entry_not_found(lineage_member.clone())
            })?;
            let tip_entry = j
                .entries
                .get(&tip)
                .ok_or_else(|| DomainError::entry_not_found(tip.clone()))?;
            if entry.character != tip_entry.character || entry.category != tip_entry.category {
                return Err(DomainError::invalid_operation(
                    "a revision must keep its lineage's character and category",
                ));
            }
            let category = j
                .categories
                .get(&entry.category)
                .ok_or_else(|| DomainError::category_not_found(entry.category.clone()))?;
            if !category.can_update {
                return Err(DomainError::invalid_operation(format!(
                    "category '{}' does not allow updates",
                    entry.category
                )));
            }
            entry.values.resize(category.properties.len(), String::new());
            entry.parent = Some(tip.clone());
            entry.child = None;

            let head = j.timeline.cursor().map(|c| c + 1).unwrap_or(0);
            let tip_position = j
                .timeline
                .index_of(&tip)
                .ok_or_else(|| DomainError::entry_not_found(tip.clone()))?;
            let position = head.max(tip_position + 1);
            j.timeline.insert_at(entry.id.clone(), position, false)?;
            j.timeline.set_cursor(Some(position));

            j.entries
                .get_mut(&tip)
                .expect("tip looked up above")
                .child = Some(entry.id.clone());
            j.entries.insert(entry.id.clone(), entry);
            Ok(())
        })
    }

    pub fn edit_entry_values(
        &mut self,
        id: &EntryId,
        mut values: Vec<String>,
    ) -> Result<(), DomainError> {
        self.mutate(|j| {
            let category = {
                let entry = j
                    .entries
                    .get(id)
                    .ok_or_else(|| DomainError::entry_not_found(id.clone()))?;
                entry.category.clone()
            };
            let width = j
                .categories
                .get(&category)
                .map(|c| c.properties.len())
                .unwrap_or(values.len());
            values.resize(width, String::new());
            j.entries.get_mut(id).expect("checked above").values = values;
            Ok(())
        })
    }

    pub fn set_entry_disabled(&mut self, id: &EntryId, disabled: bool) -> Result<(), DomainError> {
        self.mutate(|j| {
            let entry = j
                .entries
                .get_mut(id)
                .ok_or_else(|| DomainError::entry_not_found(id.clone()))?;
            entry.disabled = disabled;
            Ok(())
        })
    }

    pub fn set_entry_ops(
        &mut self,
        id: &EntryId,
        ops: Vec<DynamicOp>,
    ) -> Result<(), DomainError> {
        self.mutate(|j| {
            let entry = j
                .entries
                .get_mut(id)
                .ok_or_else(|| DomainError::entry_not_found(id.clone()))?;
            entry.dynamic_ops = ops;
            Ok(())
        })
    }

    /// Delete one entry, re-linking its chain neighbors.
    ///
    /// Deleting a chain root with a child promotes the child to root. An
    /// output targeting the entry is retargeted to the prior entry in its
    /// window, or removed when the window empties.
    pub fn delete_entry(&mut self, id: &EntryId) -> Result<(), DomainError> {
        self.mutate(|j| j.delete_entry_internal(id))
    }

    /// Delete an entire revision chain in one batch with a single rebuild.
    pub fn delete_chain(&mut self, lineage_member: &EntryId) -> Result<(), DomainError> {
        self.mutate(|j| {
            let members = j.chains.chain(lineage_member)?.to_vec();
            for member in members {
                j.delete_entry_internal(&member)?;
            }
            Ok(())
        })
    }

    fn delete_entry_internal(&mut self, id: &EntryId) -> Result<(), DomainError> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| DomainError::entry_not_found(id.clone()))?
            .clone();

        self.retarget_outputs_for_removal(id)?;

        if let Some(parent) = &entry.parent
            && let Some(parent_entry) = self.entries.get_mut(parent)
        {
            parent_entry.child = entry.child.clone();
        }
        if let Some(child) = &entry.child
            && let Some(child_entry) = self.entries.get_mut(child)
        {
            child_entry.parent = entry.parent.clone();
        }

        self.timeline.remove(id)?;
        self.entries.remove(id);
        Ok(())
    }

    /// Retarget or drop any output whose right edge is the entry about to
    /// be removed. Runs before the timeline mutation so window boundaries
    /// are still the pre-removal ones.
    fn retarget_outputs_for_removal(&mut self, id: &EntryId) -> Result<(), DomainError> {
        let Some(position) = self.timeline.index_of(id) else {
            return Ok(());
        };
        let mut targets = Vec::with_capacity(self.outputs.len());
        for (vec_index, output) in self.outputs.iter().enumerate() {
            let index = self
                .timeline
                .index_of(&output.target_entry)
                .ok_or_else(|| DomainError::entry_not_found(output.target_entry.clone()))?;
            targets.push((vec_index, index));
        }
        targets.sort_by_key(|(_, index)| *index);

        let Some(k) = targets.iter().position(|(_, index)| *index == position) else {
            return Ok(());
        };
        let window_start = if k == 0 { 0 } else { targets[k - 1].1 + 1 };
        let vec_index = targets[k].0;
        if position > window_start {
            let new_target = self
                .timeline
                .entry_at(position - 1)
                .expect("position > window_start >= 0")
                .clone();
            self.outputs[vec_index].target_entry = new_target;
        } else {
            // the window held nothing but the removed entry
            self.outputs.remove(vec_index);
        }
        Ok(())
    }

    /// Revision-aware move.
    ///
    /// Moving at or before the parent's index swaps parent/child roles (the
    /// moved entry becomes the parent-side anchor); moving at or past the
    /// child's index is the symmetric swap. The parent-side swap takes
    /// precedence when a single move crosses both boundaries. Afterwards
    /// the timeline reposition applies as a plain remove-then-reinsert.
    pub fn move_entry(&mut self, id: &EntryId, target_index: usize) -> Result<(), DomainError> {
        self.mutate(|j| {
            let entry = j
                .entries
                .get(id)
                .ok_or_else(|| DomainError::entry_not_found(id.clone()))?
                .clone();

            let parent_position = entry
                .parent
                .as_ref()
                .and_then(|p| j.timeline.index_of(p));
            let child_position = entry.child.as_ref().and_then(|c| j.timeline.index_of(c));

            if let (Some(parent), Some(position)) = (&entry.parent, parent_position)
                && target_index <= position
            {
                j.swap_with_parent(id, parent)?;
            } else if let (Some(child), Some(position)) = (&entry.child, child_position)
                && target_index >= position
            {
                j.swap_with_child(id, child)?;
            }

            j.timeline.move_to(id, target_index)
        })
    }

    fn swap_with_parent(
        &mut self,
        id: &EntryId,
        parent: &EntryId,
    ) -> Result<(), DomainError> {
        let grandparent = self
            .entries
            .get(parent)
            .ok_or_else(|| DomainError::entry_not_found(parent.clone()))?
            .parent
            .clone();
        let child = self
            .entries
            .get(id)
            .ok_or_else(|| DomainError::entry_not_found(id.clone()))?
            .child
            .clone();

        let moved = self.entries.get_mut(id).expect("looked up above");
        moved.parent = grandparent.clone();
        moved.child = Some(parent.clone());

        let old_parent = self.entries.get_mut(parent).expect("looked up above");
        old_parent.parent = Some(id.clone());
        old_parent.child = child.clone();

        if let Some(grandparent) = grandparent
            && let Some(entry) = self.entries.get_mut(&grandparent)
        {
            entry.child = Some(id.clone());
        }
        if let Some(child) = child
            && let Some(entry) = self.entries.get_mut(&child)
        {
            entry.parent = Some(parent.clone());
        }
        Ok(())
    }

    fn swap_with_child(&mut self, id: &EntryId, child: &EntryId) -> Result<(), DomainError> {
        let grandchild = self
            .entries
            .get(child)
            .ok_or_else(|| DomainError::entry_not_found(child.clone()))?
            .child
            .clone();
        let parent = self
            .entries
            .get(id)
            .ok_or_else(|| DomainError::entry_not_found(id.clone()))?
            .parent
            .clone();

        let moved = self.entries.get_mut(id).expect("looked up above");
        moved.parent = Some(child.clone());
        moved.child = grandchild.clone();

        let old_child = self.entries.get_mut(child).expect("looked up above");
        old_child.parent = parent.clone();
        old_child.child = Some(id.clone());

        if let Some(grandchild) = grandchild
            && let Some(entry) = self.entries.get_mut(&grandchild)
        {
            entry.parent = Some(id.clone());
        }
        if let Some(parent) = parent
            && let Some(entry) = self.entries.get_mut(&parent)
        {
            entry.child = Some(child.clone());
        }
        Ok(())
    }

    // ---- outputs ----

    pub fn add_output(&mut self, output: Output) -> Result<(), DomainError> {
        self.mutate(|j| {
            if output.name.trim().is_empty() {
                return Err(DomainError::invalid_operation("output name is empty"));
            }
            if j.outputs.iter().any(|o| o.id == output.id) {
                return Err(DomainError::duplicate_id(output.id.as_str()));
            }
            if !j.timeline.contains(&output.target_entry) {
                return Err(DomainError::entry_not_found(output.target_entry.clone()));
            }
            if j.outputs.iter().any(|o| o.target_entry == output.target_entry) {
                return Err(DomainError::invalid_operation(
                    "another output already targets that entry",
                ));
            }
            j.outputs.push(output);
            Ok(())
        })
    }

    pub fn delete_output(&mut self, id: &OutputId) -> Result<(), DomainError> {
        self.mutate(|j| {
            let position = j
                .outputs
                .iter()
                .position(|o| &o.id == id)
                .ok_or_else(|| DomainError::output_not_found(id.clone()))?;
            j.outputs.remove(position);
            Ok(())
        })
    }

    pub fn retarget_output(
        &mut self,
        id: &OutputId,
        target: EntryId,
    ) -> Result<(), DomainError> {
        self.mutate(|j| {
            if !j.timeline.contains(&target) {
                return Err(DomainError::entry_not_found(target.clone()));
            }
            if j.outputs.iter().any(|o| &o.id != id && o.target_entry == target) {
                return Err(DomainError::invalid_operation(
                    "another output already targets that entry",
                ));
            }
            let output = j
                .outputs
                .iter_mut()
                .find(|o| &o.id == id)
                .ok_or_else(|| DomainError::output_not_found(id.clone()))?;
            output.target_entry = target;
            Ok(())
        })
    }

    /// Flip one entry between an output's `members` and `ignored` lists.
    pub fn set_output_membership(
        &mut self,
        id: &OutputId,
        entry: &EntryId,
        included: bool,
    ) -> Result<(), DomainError> {
        if self.owners.get(entry) != Some(id) {
            return Err(DomainError::invalid_operation(format!(
                "entry '{entry}' is not in output '{id}'s window"
            )));
        }
        let output = self
            .outputs
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| DomainError::output_not_found(id.clone()))?;
        output.members.retain(|e| e != entry);
        output.ignored.retain(|e| e != entry);
        if included {
            output.members.push(entry.clone());
        } else {
            output.ignored.push(entry.clone());
        }
        // membership flips are not structural; only the partitions change
        self.owners = outputs::reconcile(&mut self.outputs, &self.timeline)?;
        Ok(())
    }

    // ---- cursor ----

    pub fn set_history_index(&mut self, index: Option<usize>) {
        self.timeline.set_cursor(index);
    }

    // ---- dry-run precondition checks ----

    /// How many downstream revisions a chain deletion from this entry
    /// onwards would remove (excluding the entry itself).
    pub fn deletion_impact(&self, id: &EntryId) -> Result<usize, DomainError> {
        let chain = self.chains.chain(id)?;
        let position = chain
            .iter()
            .position(|e| e == id)
            .ok_or_else(|| DomainError::entry_not_found(id.clone()))?;
        Ok(chain.len() - position - 1)
    }

    /// How many entries deactivating a category would delete.
    pub fn category_removal_impact(
        &self,
        character: &CharacterId,
        category: &CategoryId,
    ) -> usize {
        self.entries
            .values()
            .filter(|e| &e.character == character && &e.category == category)
            .count()
    }

    /// How many entries deleting a character would remove.
    pub fn character_deletion_impact(&self, character: &CharacterId) -> usize {
        self.entries
            .values()
            .filter(|e| &e.character == character)
            .count()
    }

    // ---- queries ----

    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn characters(&self) -> &BTreeMap<CharacterId, Character> {
        &self.characters
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.get(id)
    }

    pub fn categories(&self) -> &BTreeMap<CategoryId, Category> {
        &self.categories
    }

    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub fn entries(&self) -> &HashMap<EntryId, Entry> {
        &self.entries
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn output(&self, id: &OutputId) -> Option<&Output> {
        self.outputs.iter().find(|o| &o.id == id)
    }

    pub fn owning_output(&self, entry: &EntryId) -> Option<&OutputId> {
        self.owners.get(entry)
    }

    pub fn chains(&self) -> &ChainIndex {
        &self.chains
    }

    pub fn credentials_path(&self) -> Option<&str> {
        self.credentials_path.as_deref()
    }

    /// Point-in-time value snapshot for one character.
    pub fn snapshot(
        &self,
        character: &CharacterId,
        index: usize,
        include_private: bool,
    ) -> Result<BTreeMap<String, Value>, DomainError> {
        self.dynamic
            .snapshot(character, index, include_private, &self.chains)
    }

    /// Snapshot at the current history cursor.
    pub fn snapshot_at_cursor(
        &self,
        character: &CharacterId,
        include_private: bool,
    ) -> Result<BTreeMap<String, Value>, DomainError> {
        let index = self.timeline.cursor().ok_or_else(|| {
            DomainError::invalid_operation("no current history entry")
        })?;
        self.snapshot(character, index, include_private)
    }

    /// Resolve a display template against one history index.
    pub fn translate(
        &self,
        character: &CharacterId,
        entry: &EntryId,
        index: usize,
        template: &str,
    ) -> Result<String, DomainError> {
        self.dynamic
            .translate(character, entry, index, template, &self.chains)
    }

    /// Token-based search over entry values and category schemas.
    pub fn search(&self, query: &str) -> SearchResults {
        let needles = search::query_tokens(query);
        let mut results = SearchResults::default();
        if needles.is_empty() {
            return results;
        }

        for id in self.timeline.iter() {
            if let Some(entry) = self.entries.get(id) {
                let document = search::tokenize(&entry.values.join(" "));
                if search::matches(&needles, &document) {
                    results.entries.push(id.clone());
                }
            }
        }
        for (id, category) in &self.categories {
            let mut text = category.name.clone();
            for property in &category.properties {
                text.push(' ');
                text.push_str(&property.name);
            }
            if search::matches(&needles, &search::tokenize(&text)) {
                results.categories.push(id.clone());
            }
        }
        results
    }
}
