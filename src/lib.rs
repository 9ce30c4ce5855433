//! Selective export of tagged entries from a KeePass database.
//!
//! The export is configured from inside the source database: a single entry
//! titled [`config::CONFIG_ENTRY_TITLE`] names the tags to export, the
//! destination credential, an optional destination path and whether TOTP
//! secrets should be stripped from the clones. After every successful save
//! the host hands the open database to [`export::PartialExporter`], which
//! filters the tree, assembles an independently-keyed database and writes it
//! next to the source — never over it.

pub mod assemble;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod filter;
pub mod paths;
pub mod writer;

pub use config::{locate_config, ExportConfig, CONFIG_ENTRY_TITLE};
pub use database::OpenedDatabase;
pub use error::ExportError;
pub use export::{ExportHost, ExportOutcome, PartialExporter};
pub use filter::{clone_for_export, decide, filter_and_clone, EntryDecision, FilterOutcome};
pub use paths::{resolve_destination, EXPORT_SUFFIX};
pub use writer::{DatabaseWriter, FileDatabaseWriter};
