//! Journal inspection mode
//!
//! Loads a journal file and prints the timeline plus per-character value
//! snapshots at a chosen history index.

use crate::domain::value_objects::Value;
use crate::storage;

/// Print the timeline and per-character snapshots.
///
/// `index` defaults to the journal's own history cursor; with no cursor the
/// last timeline position is used.
pub fn run_inspect(bytes: &[u8], index: Option<usize>) -> anyhow::Result<()> {
    let document = storage::load(bytes)?;
    let journal = document.into_journal()?;

    let timeline = journal.timeline();
    println!("=== Timeline ({} entries) ===", timeline.len());
    for (position, entry_id) in timeline.iter().enumerate() {
        let marker = if timeline.cursor() == Some(position) {
            ">"
        } else {
            " "
        };
        match journal.entry(entry_id) {
            Some(entry) => {
                let character = journal
                    .character(&entry.character)
                    .map(|c| c.name.as_str())
                    .unwrap_or("?");
                let category = journal
                    .category(&entry.category)
                    .map(|c| c.name.as_str())
                    .unwrap_or("?");
                let state = if entry.disabled { " (disabled)" } else { "" };
                println!("{marker} {position:4}  {character} / {category}: {entry_id}{state}");
            }
            None => println!("{marker} {position:4}  {entry_id} (missing!)"),
        }
    }

    if timeline.is_empty() {
        return Ok(());
    }
    let index = index
        .or(timeline.cursor())
        .unwrap_or(timeline.len() - 1)
        .min(timeline.len() - 1);

    println!();
    println!("=== Snapshots at index {index} ===");
    for (character_id, character) in journal.characters() {
        let snapshot = journal.snapshot(character_id, index, false)?;
        println!("{}:", character.name);
        for (key, value) in snapshot {
            let rendered = match &value {
                Value::Text(s) => format!("\"{s}\""),
                other => other.render(),
            };
            println!("    {key} = {rendered}");
        }
    }

    Ok(())
}
