//! Save-event orchestration.
//!
//! The host fires one event per completed save; the exporter turns a
//! successful save into at most one destination write. Errors are reported
//! through the host and never escape the event handler, so a broken export
//! configuration can never take the host application down.

use std::path::PathBuf;

use anyhow::Result;
use keepass::DatabaseKey;
use tracing::{info, info_span};

use crate::assemble::assemble_export;
use crate::config::{locate_config, ExportConfig};
use crate::database::OpenedDatabase;
use crate::filter::filter_and_clone;
use crate::paths::resolve_destination;
use crate::writer::{DatabaseWriter, FileDatabaseWriter};

/// Host-side surface the exporter reports through.
///
/// Mirrors what a plugin gets from its main window: block input while the
/// export runs, and raise user-visible messages at two severities.
pub trait ExportHost {
    /// Toggle user interaction on the host UI.
    fn block_interaction(&self, blocked: bool);

    /// Non-fatal problem in the save-event handler.
    fn show_warning(&self, message: &str);

    /// Hard failure inside the export chain.
    fn show_fatal(&self, message: &str);
}

impl<H: ExportHost + ?Sized> ExportHost for &H {
    fn block_interaction(&self, blocked: bool) {
        (**self).block_interaction(blocked);
    }

    fn show_warning(&self, message: &str) {
        (**self).show_warning(message);
    }

    fn show_fatal(&self, message: &str) {
        (**self).show_fatal(message);
    }
}

/// Terminal state of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// A destination file was written.
    Exported { path: PathBuf, entry_count: usize },
    /// No usable configuration entry (or the save failed); nothing was done.
    NotApplicable,
    /// The export chain failed; the failure was reported to the host.
    Failed,
}

/// Runs one export per successful save event.
///
/// The exporter owns its host handle for the lifetime of the registration;
/// dropping it is the deterministic "unsubscribe".
pub struct PartialExporter<H, W = FileDatabaseWriter> {
    host: H,
    writer: W,
}

impl<H: ExportHost> PartialExporter<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            writer: FileDatabaseWriter,
        }
    }
}

impl<H: ExportHost, W: DatabaseWriter> PartialExporter<H, W> {
    /// Exporter with a custom persistence collaborator.
    pub fn with_writer(host: H, writer: W) -> Self {
        Self { host, writer }
    }

    /// Entry point for the host's "file saved" event.
    ///
    /// Events flagged as failed saves are ignored. Anything the export body
    /// could not handle itself is surfaced as a warning; nothing propagates.
    pub fn on_file_saved(&self, database: &OpenedDatabase, success: bool) -> ExportOutcome {
        if !success {
            return ExportOutcome::NotApplicable;
        }

        match self.export(database) {
            Ok(outcome) => outcome,
            Err(error) => {
                self.host.show_warning(&format!("{error:#}"));
                ExportOutcome::Failed
            }
        }
    }

    fn export(&self, database: &OpenedDatabase) -> Result<ExportOutcome> {
        // Interaction stays blocked and the progress span stays open for the
        // whole run; both are released on every exit path, including panics
        // unwinding through here.
        let _blocked = InteractionGuard::block(&self.host);
        let span = info_span!("partial_export", source = %database.path.display());
        let _span = span.enter();

        let Some(config) = locate_config(&database.db) else {
            info!("no export configuration entry, nothing to do");
            return Ok(ExportOutcome::NotApplicable);
        };

        match self.run_configured(database, &config) {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                self.host
                    .show_fatal(&format!("Error while exporting partial database: {error:?}"));
                Ok(ExportOutcome::Failed)
            }
        }
    }

    fn run_configured(
        &self,
        database: &OpenedDatabase,
        config: &ExportConfig,
    ) -> Result<ExportOutcome> {
        let destination = resolve_destination(&database.path, config.path_hint.as_deref())?;

        let outcome = filter_and_clone(&database.db.root, &config.tags, config.clear_totp);
        let entry_count = outcome.entries.len();
        info!(
            entries = entry_count,
            icons = outcome.icons.len(),
            destination = %destination.display(),
            "cloned export set"
        );

        let export = assemble_export(&database.db, outcome);

        // The one and only write of this run; everything before this point
        // leaves no artifact on failure.
        let key = DatabaseKey::new().with_password(&config.password);
        self.writer.write(&export, key, &destination)?;

        info!("partial export written");
        Ok(ExportOutcome::Exported {
            path: destination,
            entry_count,
        })
    }
}

/// Re-enables host interaction when dropped.
struct InteractionGuard<'a, H: ExportHost> {
    host: &'a H,
}

impl<'a, H: ExportHost> InteractionGuard<'a, H> {
    fn block(host: &'a H) -> Self {
        host.block_interaction(true);
        Self { host }
    }
}

impl<H: ExportHost> Drop for InteractionGuard<'_, H> {
    fn drop(&mut self) {
        self.host.block_interaction(false);
    }
}
