//! Export boundary collaborators
//!
//! The core never writes spreadsheets itself; it assembles resolved
//! `(label, value)` rows per output window and hands them to a
//! [`SpreadsheetWriter`], reporting progress through a
//! [`ProgressReporter`]. Cell formatting is entirely the writer's problem.

use crate::domain::entities::Output;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{CategoryId, CharacterId, OutputId};
use crate::journal::Journal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet write failed: {0}")]
    Write(String),

    #[error("spreadsheet connection failed: {0}")]
    Connection(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Progress callback for long-running work driven from a UI-adjacent thread
pub trait ProgressReporter {
    fn set_maximum(&mut self, maximum: usize);
    fn set_current_work_done(&mut self, done: usize);
    fn finish(&mut self);
}

/// No-op reporter for headless callers
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressReporter for NullProgress {
    fn set_maximum(&mut self, _maximum: usize) {}
    fn set_current_work_done(&mut self, _done: usize) {}
    fn finish(&mut self) {}
}

/// External spreadsheet-writing collaborator
///
/// `range_id` is a stable identifier the writer can use for named-range
/// tracking across re-exports.
pub trait SpreadsheetWriter {
    fn write_rows(
        &mut self,
        sheet: &str,
        title: &str,
        rows: &[(String, String)],
        range_id: &str,
    ) -> Result<(), ExportError>;

    fn reconnect(&mut self) -> Result<(), ExportError>;
}

/// Stable named-range id for one (output, character, category) block.
pub fn range_id(output: &OutputId, character: &CharacterId, category: &CategoryId) -> String {
    format!(
        "{:x}",
        md5::compute(format!("{output}:{character}:{category}"))
    )
}

/// Assembles export rows from a read-only journal view
pub struct Exporter<'a> {
    journal: &'a Journal,
}

impl<'a> Exporter<'a> {
    pub fn new(journal: &'a Journal) -> Self {
        Self { journal }
    }

    /// Export one output window: one block per category per character with
    /// member entries, plus one consolidated history sheet.
    ///
    /// Blocks that resolve to no rows are skipped rather than written as
    /// empty ranges; the history sheet is always written, even empty.
    /// A failed write gets one reconnect-then-retry before the error
    /// surfaces to the caller.
    pub fn export_output(
        &self,
        id: &OutputId,
        writer: &mut dyn SpreadsheetWriter,
        progress: &mut dyn ProgressReporter,
    ) -> Result<(), ExportError> {
        let output = self
            .journal
            .output(id)
            .ok_or_else(|| DomainError::output_not_found(id.clone()))?;
        let target_index = self
            .journal
            .timeline()
            .index_of(&output.target_entry)
            .ok_or_else(|| DomainError::entry_not_found(output.target_entry.clone()))?;

        let characters: Vec<CharacterId> = self.journal.characters().keys().cloned().collect();
        let mut blocks = Vec::new();
        for character_id in &characters {
            let character = self.journal.character(character_id).expect("listed above");
            for category_id in character.categories.clone() {
                blocks.push((character_id.clone(), category_id));
            }
        }

        progress.set_maximum(blocks.len() + 1);
        for (done, (character_id, category_id)) in blocks.iter().enumerate() {
            let rows = self.category_rows(output, character_id, category_id, target_index)?;
            if !rows.is_empty() {
                let character = self.journal.character(character_id).expect("listed above");
                let category = self.journal.category(category_id).expect("active category");
                let title = format!("{} - {}", character.name, category.name);
                let range = range_id(&output.id, character_id, category_id);
                self.write_with_retry(writer, &output.spreadsheet, &title, &rows, &range)?;
            }
            progress.set_current_work_done(done + 1);
        }

        let history_rows = self.history_rows(output, target_index)?;
        let range = format!("{:x}", md5::compute(format!("{}:history", output.id)));
        self.write_with_retry(writer, &output.spreadsheet, "History", &history_rows, &range)?;
        progress.set_current_work_done(blocks.len() + 1);
        progress.finish();
        Ok(())
    }

    /// Property rows for every member entry of one character and category,
    /// values resolved through the template pipeline.
    fn category_rows(
        &self,
        output: &Output,
        character: &CharacterId,
        category_id: &CategoryId,
        target_index: usize,
    ) -> Result<Vec<(String, String)>, ExportError> {
        let category = self
            .journal
            .category(category_id)
            .ok_or_else(|| DomainError::category_not_found(category_id.clone()))?;

        let mut rows = Vec::new();
        for entry_id in &output.members {
            let Some(entry) = self.journal.entry(entry_id) else {
                continue;
            };
            if &entry.character != character || &entry.category != category_id || entry.disabled {
                continue;
            }
            for (property, value) in category.properties.iter().zip(&entry.values) {
                let resolved =
                    self.journal
                        .translate(character, entry_id, target_index, value)?;
                rows.push((property.name.clone(), resolved));
            }
        }
        Ok(rows)
    }

    /// One row per member entry across the whole window, in timeline order,
    /// rendered through its category's creation or update template.
    fn history_rows(
        &self,
        output: &Output,
        target_index: usize,
    ) -> Result<Vec<(String, String)>, ExportError> {
        let mut rows = Vec::new();
        for entry_id in self.journal.timeline().iter() {
            if !output.members.contains(entry_id) {
                continue;
            }
            let Some(entry) = self.journal.entry(entry_id) else {
                continue;
            };
            let Some(category) = self.journal.category(&entry.category) else {
                continue;
            };
            let character_name = self
                .journal
                .character(&entry.character)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| entry.character.to_string());
            let template = if entry.is_root() {
                &category.creation_template
            } else {
                &category.update_template
            };
            let resolved =
                self.journal
                    .translate(&entry.character, entry_id, target_index, template)?;
            rows.push((character_name, resolved));
        }
        Ok(rows)
    }

    fn write_with_retry(
        &self,
        writer: &mut dyn SpreadsheetWriter,
        sheet: &str,
        title: &str,
        rows: &[(String, String)],
        range: &str,
    ) -> Result<(), ExportError> {
        match writer.write_rows(sheet, title, rows, range) {
            Ok(()) => Ok(()),
            Err(first) => {
                log::warn!("spreadsheet write failed, reconnecting once: {first}");
                writer.reconnect()?;
                writer.write_rows(sheet, title, rows, range)
            }
        }
    }
}
