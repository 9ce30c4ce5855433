//! Failures raised by the export pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors the export chain can raise before anything is written.
///
/// A missing or ambiguous configuration entry is deliberately not represented
/// here; the orchestrator treats that as "no export configured" and does
/// nothing.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The source database has no on-disk path to derive a destination from.
    #[error("source database path must not be empty")]
    MissingSourcePath,

    /// The configured destination has no file name component.
    #[error("export destination `{0}` has no file name")]
    EmptyFileName(String),

    /// The resolved destination would overwrite the live source database.
    #[error("export destination `{}` is the source database itself", .0.display())]
    UnsafeDestination(PathBuf),
}
