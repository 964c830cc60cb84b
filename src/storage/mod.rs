//! Storage module for saving and loading journal documents
//!
//! The persisted form is a single JSON document carrying an explicit
//! `file_version`. Legacy versions are detected by that tag and upgraded
//! through a one-way migration during load, before deserialization.

use crate::domain::entities::{Category, Character, Entry, Output};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{CategoryId, CharacterId, EntryId};
use crate::journal::Journal;
use crate::timeline::Timeline;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Version written by this build
pub const CURRENT_FILE_VERSION: u32 = 2;

/// The persisted document layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalDocument {
    pub file_version: u32,
    pub characters: BTreeMap<CharacterId, Character>,
    pub categories: BTreeMap<CategoryId, Category>,
    pub history: Vec<EntryId>,
    pub entries: HashMap<EntryId, Entry>,
    pub outputs: Vec<Output>,
    /// Signed cursor index; -1 means no current entry
    pub history_index: i64,
    #[serde(default)]
    pub credentials_path: Option<String>,
}

impl JournalDocument {
    /// Snapshot a journal into its persisted form.
    pub fn from_journal(journal: &Journal) -> Self {
        Self {
            file_version: CURRENT_FILE_VERSION,
            characters: journal.characters().clone(),
            categories: journal.categories().clone(),
            history: journal.timeline().order().to_vec(),
            entries: journal.entries().clone(),
            outputs: journal.outputs().to_vec(),
            history_index: journal.timeline().cursor_index(),
            credentials_path: journal.credentials_path().map(str::to_string),
        }
    }

    /// Validate and build the in-memory journal, rebuilding all caches.
    pub fn into_journal(self) -> Result<Journal, DomainError> {
        Journal::assemble(
            self.characters,
            self.categories,
            self.entries,
            Timeline::from_parts(self.history, self.history_index),
            self.outputs,
            self.credentials_path,
        )
    }
}

/// Save a document to bytes using JSON serialization
pub fn save(document: &JournalDocument) -> anyhow::Result<Vec<u8>> {
    let json = serde_json::to_string_pretty(document)?;
    Ok(json.into_bytes())
}

/// Load a document from bytes, migrating legacy versions first
pub fn load(bytes: &[u8]) -> anyhow::Result<JournalDocument> {
    let mut value: serde_json::Value = serde_json::from_slice(bytes)?;
    migrate(&mut value)?;
    let document = serde_json::from_value(value)?;
    Ok(document)
}

/// One-way, in-place upgrade of legacy document versions.
fn migrate(value: &mut serde_json::Value) -> anyhow::Result<()> {
    let object = value
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("journal document is not a JSON object"))?;
    let version = object
        .get("file_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(1) as u32;
    if version > CURRENT_FILE_VERSION {
        anyhow::bail!(
            "journal file version {version} is newer than supported version {CURRENT_FILE_VERSION}"
        );
    }
    if version < 2 {
        // v1 predates external-service credentials
        object
            .entry("credentials_path")
            .or_insert(serde_json::Value::Null);
    }
    object.insert(
        "file_version".to_string(),
        serde_json::json!(CURRENT_FILE_VERSION),
    );
    Ok(())
}

/// Repository errors at the persistence boundary
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Journal not found: {name}")]
    NotFound { name: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Repository for journal document persistence
#[async_trait]
pub trait JournalRepository: Send + Sync {
    async fn load_journal(&self, name: &str) -> Result<JournalDocument, RepositoryError>;
    async fn save_journal(
        &self,
        name: &str,
        document: &JournalDocument,
    ) -> Result<(), RepositoryError>;
    async fn journal_exists(&self, name: &str) -> Result<bool, RepositoryError>;
    async fn delete_journal(&self, name: &str) -> Result<(), RepositoryError>;
}

/// File system implementation of [`JournalRepository`]
pub struct JsonJournalRepository {
    base_path: PathBuf,
}

impl JsonJournalRepository {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn journal_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{name}.journal.json"))
    }
}

#[async_trait]
impl JournalRepository for JsonJournalRepository {
    async fn load_journal(&self, name: &str) -> Result<JournalDocument, RepositoryError> {
        let path = self.journal_path(name);
        if !path.exists() {
            return Err(RepositoryError::NotFound {
                name: name.to_string(),
            });
        }
        let bytes = tokio::fs::read(&path).await.map_err(|e| RepositoryError::Io {
            message: format!("Failed to read journal file {}: {}", path.display(), e),
        })?;
        load(&bytes).map_err(|e| RepositoryError::Serialization {
            message: format!("Failed to parse journal: {e}"),
        })
    }

    async fn save_journal(
        &self,
        name: &str,
        document: &JournalDocument,
    ) -> Result<(), RepositoryError> {
        let path = self.journal_path(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RepositoryError::Io {
                    message: format!("Failed to create journal directory: {e}"),
                })?;
        }
        let bytes = save(document).map_err(|e| RepositoryError::Serialization {
            message: format!("Failed to serialize journal: {e}"),
        })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| RepositoryError::Io {
                message: format!("Failed to write journal file {}: {}", path.display(), e),
            })
    }

    async fn journal_exists(&self, name: &str) -> Result<bool, RepositoryError> {
        Ok(self.journal_path(name).exists())
    }

    async fn delete_journal(&self, name: &str) -> Result<(), RepositoryError> {
        let path = self.journal_path(name);
        if !path.exists() {
            return Err(RepositoryError::NotFound {
                name: name.to_string(),
            });
        }
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| RepositoryError::Io {
                message: format!("Failed to delete journal file {}: {}", path.display(), e),
            })
    }
}
