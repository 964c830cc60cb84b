//! Domain errors - Business rule and invariant violations

use crate::domain::value_objects::{CategoryId, CharacterId, EntryId, OutputId};
use thiserror::Error;

/// Domain-specific errors that represent invariant violations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Entry '{id}' not found")]
    EntryNotFound { id: EntryId },

    #[error("Character '{id}' not found")]
    CharacterNotFound { id: CharacterId },

    #[error("Category '{id}' not found")]
    CategoryNotFound { id: CategoryId },

    #[error("Output '{id}' not found")]
    OutputNotFound { id: OutputId },

    #[error("Duplicate id '{id}'")]
    DuplicateId { id: String },

    #[error("Index {index} out of range, maximum is {max}")]
    IndexOutOfRange { index: usize, max: usize },

    #[error("Corrupt revision chain at entry '{entry}': {reason}")]
    CorruptRevisionChain { entry: EntryId, reason: String },

    #[error("Invalid operation: {reason}")]
    InvalidOperation { reason: String },
}

impl DomainError {
    pub fn entry_not_found(id: impl Into<EntryId>) -> Self {
        Self::EntryNotFound { id: id.into() }
    }

    pub fn character_not_found(id: impl Into<CharacterId>) -> Self {
        Self::CharacterNotFound { id: id.into() }
    }

    pub fn category_not_found(id: impl Into<CategoryId>) -> Self {
        Self::CategoryNotFound { id: id.into() }
    }

    pub fn output_not_found(id: impl Into<OutputId>) -> Self {
        Self::OutputNotFound { id: id.into() }
    }

    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    pub fn corrupt_chain(entry: impl Into<EntryId>, reason: impl Into<String>) -> Self {
        Self::CorruptRevisionChain {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            reason: reason.into(),
        }
    }
}
