//! Selection State (C8): the currently selected protocol name.

use std::path::PathBuf;

use crate::error::{Error, Result};

pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    pub fn new(selection_file: PathBuf) -> Self {
        Self { path: selection_file }
    }

    /// The active protocol name, or `None` if nothing is selected.
    pub fn get(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io("read", self.path.clone(), e)),
        }
    }

    pub fn set(&self, name: &str) -> Result<()> {
        crate::atomic::write_atomic(&self.path, name.as_bytes())
            .map_err(|e| Error::io("write", self.path.clone(), e))
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io("remove", self.path.clone(), e)),
        }
    }
}
