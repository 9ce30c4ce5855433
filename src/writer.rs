//! Persistence collaborator for assembled export databases.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use keepass::{Database, DatabaseKey};

/// Serializes an assembled database to its destination.
///
/// Path safety (no source overwrite) is established by the resolver before
/// this is called; writers do not re-check. Write failures propagate with
/// context so the orchestrator can surface them.
pub trait DatabaseWriter {
    fn write(&self, database: &Database, key: DatabaseKey, destination: &Path) -> Result<()>;
}

/// Writes KDBX4 files to the local filesystem.
#[derive(Debug, Default)]
pub struct FileDatabaseWriter;

impl DatabaseWriter for FileDatabaseWriter {
    fn write(&self, database: &Database, key: DatabaseKey, destination: &Path) -> Result<()> {
        let mut file = File::create(destination)
            .with_context(|| format!("Failed to create export file: {}", destination.display()))?;

        database
            .save(&mut file, key)
            .with_context(|| format!("Failed to save export database: {}", destination.display()))?;

        Ok(())
    }
}
