//! File loading and crash-safe persistence.

use crate::error::InreplaceError;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Read a whole file as raw bytes; no encoding is assumed.
pub fn read_content(path: &Path) -> Result<Vec<u8>, InreplaceError> {
    fs::read(path).map_err(|source| InreplaceError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Readers see either the old or the new content, never a partial file.
/// The temp file lives next to the target so the rename stays on one
/// filesystem, and it takes over the target's permissions when the target
/// already exists.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), InreplaceError> {
    let write_err = |source| InreplaceError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;

    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_err)?;
    }

    temp.write_all(content).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|err| write_err(err.error))?;

    Ok(())
}
