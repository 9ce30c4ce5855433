//! Destination path resolution for partial exports.

use std::path::{Component, Path, PathBuf};

use crate::error::ExportError;

/// Appended to the source file name (extension stripped) when the
/// configuration entry does not override the destination.
pub const EXPORT_SUFFIX: &str = ".partial.kdbx";

/// Extension enforced on user-configured destinations.
pub const KDBX_EXTENSION: &str = "kdbx";

/// Resolve the absolute destination path for an export.
///
/// `hint` is the configuration entry's URL field. A relative hint is anchored
/// to the source file's parent directory, never to the process working
/// directory. The resolved path is guaranteed not to collide with `source`,
/// compared case-insensitively after lexical normalization.
pub fn resolve_destination(source: &Path, hint: Option<&str>) -> Result<PathBuf, ExportError> {
    if source.as_os_str().is_empty() {
        return Err(ExportError::MissingSourcePath);
    }

    let destination = match hint {
        None | Some("") => default_destination(source),
        Some(configured) => configured_destination(source, configured)?,
    };

    if normalized_key(source) == normalized_key(&destination) {
        return Err(ExportError::UnsafeDestination(destination));
    }

    Ok(destination)
}

/// `db.kdbx` becomes `db.partial.kdbx` next to the source.
fn default_destination(source: &Path) -> PathBuf {
    let mut name = source.file_stem().unwrap_or_default().to_os_string();
    name.push(EXPORT_SUFFIX);
    source.with_file_name(name)
}

fn configured_destination(source: &Path, configured: &str) -> Result<PathBuf, ExportError> {
    // A trailing separator means "directory, no file name"; Path::file_name
    // would silently return the last directory component instead.
    if configured.ends_with(['/', '\\']) {
        return Err(ExportError::EmptyFileName(configured.to_string()));
    }

    let hinted = Path::new(configured);
    if hinted.file_name().is_none() {
        return Err(ExportError::EmptyFileName(configured.to_string()));
    }

    let mut destination = if hinted.is_absolute() {
        hinted.to_path_buf()
    } else {
        source.parent().unwrap_or_else(|| Path::new("")).join(hinted)
    };

    let has_container_extension = destination
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(KDBX_EXTENSION));
    if !has_container_extension {
        let mut name = destination.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(KDBX_EXTENSION);
        destination.set_file_name(name);
    }

    Ok(destination)
}

/// Lexically normalize a path (fold `.` and `..`) and lowercase it, so
/// `sub/../Db.KDBX` compares equal to `db.kdbx`.
fn normalized_key(path: &Path) -> String {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized.to_string_lossy().to_lowercase()
}
