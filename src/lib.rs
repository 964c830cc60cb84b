//! # questlog
//!
//! A campaign-journal core for tabletop/LitRPG record keeping: entries per
//! character and category on a linear timeline, revision chains that
//! preserve lineage, point-in-time value snapshots computed by a small
//! templated expression language, and output windows earmarked for
//! spreadsheet export.
//!
//! ## Quick Start
//!
//! ```rust
//! use questlog::domain::*;
//! use questlog::journal::Journal;
//!
//! # fn main() -> Result<(), questlog::domain::DomainError> {
//! let mut journal = Journal::new();
//! journal.add_category(Category::new(
//!     CategoryId::from("stats"),
//!     "Stats",
//!     vec![PropertySpec::new("note", false)],
//! ))?;
//! let mut hero = Character::new(CharacterId::from("hero"), "Alia");
//! hero.categories.push(CategoryId::from("stats"));
//! journal.add_character(hero)?;
//!
//! let mut entry = Entry::new(
//!     EntryId::from("e1"),
//!     CharacterId::from("hero"),
//!     CategoryId::from("stats"),
//!     vec!["gains a sword".to_string()],
//! );
//! entry.dynamic_ops.push(DynamicOp::new(
//!     "swords",
//!     Operator::Add,
//!     ValueKind::Integer,
//!     Scope::Instant,
//!     "1",
//! ));
//! journal.add_entry(entry)?;
//!
//! let snapshot = journal.snapshot(&CharacterId::from("hero"), 0, false)?;
//! assert_eq!(snapshot.get("swords"), Some(&Value::Integer(1)));
//! # Ok(())
//! # }
//! ```

pub mod chains;
pub mod cli;
pub mod domain;
pub mod dynamic;
pub mod export;
pub mod journal;
pub mod outputs;
pub mod storage;
pub mod timeline;

pub use chains::ChainIndex;
pub use domain::errors::DomainError;
pub use dynamic::DynamicIndex;
pub use export::{Exporter, ProgressReporter, SpreadsheetWriter};
pub use journal::{Journal, SearchResults};
pub use storage::{JournalDocument, JournalRepository, JsonJournalRepository, load, save};
pub use timeline::Timeline;
