//! Domain entities - Core journal records with identity and lifecycle

use crate::domain::errors::DomainError;
use crate::domain::value_objects::*;
use serde::{Deserialize, Serialize};

/// A tracked character with an ordered list of active categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub categories: Vec<CategoryId>,
}

impl Character {
    pub fn new(id: CharacterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            categories: Vec::new(),
        }
    }

    pub fn has_category(&self, category: &CategoryId) -> bool {
        self.categories.contains(category)
    }
}

/// One named column of a category's entry schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    /// Whether editors should offer a multi-line input for this property
    pub large_input: bool,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>, large_input: bool) -> Self {
        Self {
            name: name.into(),
            large_input,
        }
    }
}

/// A category of entries (stat block, inventory, relationship, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub properties: Vec<PropertySpec>,
    /// Display template for a chain's root entry
    pub creation_template: String,
    /// Display template for revision entries
    pub update_template: String,
    pub print_to_overview: bool,
    pub can_update: bool,
    pub is_singleton: bool,
    /// Fire once per category activation per character
    pub dynamic_ops: Vec<DynamicOp>,
    /// Fire once per entry lineage root per character
    pub entry_templates: Vec<DynamicOp>,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>, properties: Vec<PropertySpec>) -> Self {
        Self {
            id,
            name: name.into(),
            properties,
            creation_template: String::new(),
            update_template: String::new(),
            print_to_overview: true,
            can_update: true,
            is_singleton: false,
            dynamic_ops: Vec::new(),
            entry_templates: Vec::new(),
        }
    }

    /// Apply one positional schema edit to the property list.
    pub fn apply_property_edit(&mut self, edit: &PropertyEdit) -> Result<(), DomainError> {
        match edit {
            PropertyEdit::InsertAt {
                index,
                name,
                large_input,
            } => {
                if *index > self.properties.len() {
                    return Err(DomainError::IndexOutOfRange {
                        index: *index,
                        max: self.properties.len(),
                    });
                }
                self.properties
                    .insert(*index, PropertySpec::new(name.clone(), *large_input));
            }
            PropertyEdit::Delete { index } => {
                if *index >= self.properties.len() {
                    return Err(DomainError::IndexOutOfRange {
                        index: *index,
                        max: self.properties.len(),
                    });
                }
                self.properties.remove(*index);
            }
            PropertyEdit::MoveUp { index } => {
                if *index == 0 || *index >= self.properties.len() {
                    return Err(DomainError::IndexOutOfRange {
                        index: *index,
                        max: self.properties.len(),
                    });
                }
                self.properties.swap(*index, *index - 1);
            }
            PropertyEdit::MoveDown { index } => {
                if *index + 1 >= self.properties.len() {
                    return Err(DomainError::IndexOutOfRange {
                        index: *index,
                        max: self.properties.len(),
                    });
                }
                self.properties.swap(*index, *index + 1);
            }
        }
        Ok(())
    }
}

/// Replay one schema edit against an entry's positionally aligned value list.
pub fn apply_value_edit(values: &mut Vec<String>, edit: &PropertyEdit) {
    match edit {
        PropertyEdit::InsertAt { index, .. } => {
            let at = (*index).min(values.len());
            values.insert(at, String::new());
        }
        PropertyEdit::Delete { index } => {
            if *index < values.len() {
                values.remove(*index);
            }
        }
        PropertyEdit::MoveUp { index } => {
            if *index > 0 && *index < values.len() {
                values.swap(*index, *index - 1);
            }
        }
        PropertyEdit::MoveDown { index } => {
            if *index + 1 < values.len() {
                values.swap(*index, *index + 1);
            }
        }
    }
}

/// One journal entry; a link in a revision chain
///
/// Chains are singly linked lists via `parent`/`child`: at most one parent
/// and one child per entry, never a tree or DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub character: CharacterId,
    pub category: CategoryId,
    /// Positionally aligned to the category's property list
    pub values: Vec<String>,
    pub disabled: bool,
    pub dynamic_ops: Vec<DynamicOp>,
    pub parent: Option<EntryId>,
    pub child: Option<EntryId>,
}

impl Entry {
    pub fn new(
        id: EntryId,
        character: CharacterId,
        category: CategoryId,
        values: Vec<String>,
    ) -> Self {
        Self {
            id,
            character,
            category,
            values,
            disabled: false,
            dynamic_ops: Vec::new(),
            parent: None,
            child: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A named, bounded window of the timeline earmarked for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub id: OutputId,
    pub name: String,
    /// External spreadsheet reference the writer collaborator consumes
    pub spreadsheet: String,
    /// Right edge of this output's timeline window
    pub target_entry: EntryId,
    /// Entries flagged for export
    pub members: Vec<EntryId>,
    /// Entries excluded from export (new arrivals default here)
    pub ignored: Vec<EntryId>,
}

impl Output {
    pub fn new(
        id: OutputId,
        name: impl Into<String>,
        spreadsheet: impl Into<String>,
        target_entry: EntryId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            spreadsheet: spreadsheet.into(),
            target_entry,
            members: Vec::new(),
            ignored: Vec::new(),
        }
    }

    pub fn contains(&self, entry: &EntryId) -> bool {
        self.members.contains(entry) || self.ignored.contains(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_with(names: &[&str]) -> Category {
        Category::new(
            CategoryId::from("cat"),
            "Stats",
            names.iter().map(|n| PropertySpec::new(*n, false)).collect(),
        )
    }

    #[test]
    fn property_edits_keep_values_aligned() {
        let mut category = category_with(&["str", "dex", "con"]);
        let mut values = vec!["10".to_string(), "12".to_string(), "14".to_string()];

        let edits = vec![
            PropertyEdit::InsertAt {
                index: 1,
                name: "wis".to_string(),
                large_input: false,
            },
            PropertyEdit::MoveDown { index: 0 },
            PropertyEdit::Delete { index: 3 },
        ];
        for edit in &edits {
            category.apply_property_edit(edit).unwrap();
            apply_value_edit(&mut values, edit);
        }

        let names: Vec<&str> = category.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["wis", "str", "dex"]);
        assert_eq!(values, vec!["", "10", "12"]);
    }

    #[test]
    fn out_of_range_edit_is_rejected() {
        let mut category = category_with(&["str"]);
        let result = category.apply_property_edit(&PropertyEdit::Delete { index: 5 });
        assert_eq!(
            result,
            Err(DomainError::IndexOutOfRange { index: 5, max: 1 })
        );
    }
}
