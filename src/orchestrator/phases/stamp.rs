//! Phase 2: Version stamp - persist the short hash for the freeze step.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Write `hash` to `<project_root>/<file_name>` and return the file path.
///
/// The file holds exactly the hash: UTF-8, no trailing newline, so an
/// unchanged HEAD always produces identical bytes.
pub fn write_version_stamp(project_root: &Path, file_name: &str, hash: &str) -> io::Result<PathBuf> {
    let path = project_root.join(file_name);
    fs::write(&path, hash.as_bytes())?;
    log::debug!("[Stamp] Wrote {} ({} bytes)", path.display(), hash.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_contains_only_hash() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_version_stamp(temp_dir.path(), ".gitversion", "a1b2c3d").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"a1b2c3d");
    }

    #[test]
    fn test_stamp_overwrites_previous() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_version_stamp(temp_dir.path(), ".gitversion", "0123456789abcdef.DIRTY").unwrap();
        let path = write_version_stamp(temp_dir.path(), ".gitversion", "a1b2c3d").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "a1b2c3d");
    }
}
