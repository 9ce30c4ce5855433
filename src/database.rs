//! Opened-database handle shared with the host application.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use keepass::{Database, DatabaseKey};

/// An unlocked database together with its on-disk location.
///
/// Hosts that already hold an open `Database` wrap it directly; `unlock` is
/// the convenience path for opening from disk.
pub struct OpenedDatabase {
    pub db: Database,
    pub path: PathBuf,
}

impl OpenedDatabase {
    /// Open and unlock a KDBX database with a password key.
    pub fn unlock(path: impl AsRef<Path>, password: &str) -> Result<Self> {
        let path = path.as_ref();

        let key = DatabaseKey::new().with_password(password);

        let db = Database::open(&mut File::open(path)?, key)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }
}
