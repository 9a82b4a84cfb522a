//! Atomic Writer (C6): write-temp-then-rename.

use std::io::Write;
use std::path::Path;

/// Write `bytes` to `path` such that a successful return means either the new content is
/// fully visible or nothing on disk changed. Creates the temp file in `path`'s parent
/// directory so the final rename is on the same filesystem.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut temp = tempfile::Builder::new().prefix(".erasmus-tmp-").tempfile_in(parent)?;
    let write_result = temp.write_all(bytes).and_then(|_| temp.as_file_mut().sync_all());
    if let Err(err) = write_result {
        return Err(err);
    }

    #[cfg(windows)]
    if path.exists() {
        std::fs::remove_file(path)?;
    }

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        write_atomic(&target, b"hello").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello");
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        std::fs::write(&target, b"old").unwrap();
        write_atomic(&target, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deep/out.txt");
        write_atomic(&target, b"content").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "content");
    }

    #[test]
    fn no_leftover_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        write_atomic(&target, b"content").unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
