use crate::error::{Error, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Replaces `path` with `content`.
///
/// # Process
///
/// 1. Creates the parent directory if needed
/// 2. Writes content to a temporary sibling file (see [`temp_path`])
/// 3. Syncs the temporary file to disk
/// 4. Renames it over the target
///
/// An interrupted write leaves the previous document in place.
///
/// # Errors
///
/// Returns an error if any step fails; the temporary file is removed on every failure.
pub(crate) fn write_document(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_path = temp_path(path)
        .ok_or_else(|| Error::config(format!("Invalid output path: {}", path.display())))?;

    let result = write_synced(&temp_path, content)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
        return result;
    }

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// The sibling file `write_document` stages `path` in: `<name>.tmp`.
pub(crate) fn temp_path(path: &Path) -> Option<PathBuf> {
    let mut temp_name = path.file_name()?.to_os_string();
    temp_name.push(".tmp");
    Some(path.with_file_name(temp_name))
}

fn write_synced(path: &Path, content: &str) -> Result<()> {
    let mut file = fs::File::create(path).map_err(|e| Error::io(path, e))?;

    file.write_all(content.as_bytes())
        .map_err(|e| Error::io(path, e))?;

    file.sync_all().map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_write_creates_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let out = temp.child("codebatch.md");

        write_document(out.path(), "# doc\n").unwrap();

        out.assert("# doc\n");
        assert!(!temp.path().join("codebatch.md.tmp").exists());
    }

    #[test]
    fn test_write_overwrites_fully() {
        let temp = assert_fs::TempDir::new().unwrap();
        let out = temp.child("codebatch.md");
        out.write_str("a much longer previous document that must disappear").unwrap();

        write_document(out.path(), "short").unwrap();

        out.assert("short");
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp = assert_fs::TempDir::new().unwrap();
        let out = temp.child("context/llm/codebatch.md");

        write_document(out.path(), "x").unwrap();

        out.assert("x");
    }

    #[test]
    fn test_write_into_file_parent_fails() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("blocker").write_str("not a directory").unwrap();

        let result = write_document(&temp.path().join("blocker/codebatch.md"), "x");
        assert!(result.unwrap_err().is_io());
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        // a non-empty directory cannot be replaced by a file
        temp.child("codebatch.md/keep.txt").write_str("x").unwrap();

        let result = write_document(&temp.path().join("codebatch.md"), "doc");

        assert!(result.unwrap_err().is_io());
        assert!(!temp.path().join("codebatch.md.tmp").exists());
        temp.child("codebatch.md/keep.txt").assert("x");
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("ctx/codebatch.md")),
            Some(PathBuf::from("ctx/codebatch.md.tmp"))
        );
        assert_eq!(temp_path(Path::new("/")), None);
    }
}
