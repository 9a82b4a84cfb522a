//! Protocol Store (C4): read-only built-in templates shadowed by a writable user overlay.

use std::path::PathBuf;

use crate::error::{EntityKind, Error, Result};
use crate::sanitize::{sanitize_name, sanitize_xml};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolOrigin {
    User,
    BuiltIn,
}

pub trait ProtocolStore {
    fn list(&self) -> Vec<String>;
    fn get(&self, name: &str) -> Option<(String, ProtocolOrigin)>;
    fn create(&self, name: &str, body: &str) -> Result<String>;
    fn update(&self, name: &str, body: &str) -> Result<()>;
    fn delete(&self, name: &str) -> Result<()>;
}

pub struct FilesystemProtocolStore {
    user_dir: PathBuf,
}

impl FilesystemProtocolStore {
    pub fn new(user_dir: PathBuf) -> Self {
        Self { user_dir }
    }

    fn user_path(&self, name: &str) -> PathBuf {
        self.user_dir.join(format!("{name}.xml"))
    }

    fn fallback_body(body: &str) -> String {
        if body.trim().is_empty() || roxmltree::Document::parse(body).is_err() {
            let packaged = crate::assets::protocol_template();
            if !packaged.is_empty() {
                return packaged.to_string();
            }
            return "<Protocol></Protocol>".to_string();
        }
        sanitize_xml(body)
    }
}

impl ProtocolStore for FilesystemProtocolStore {
    fn list(&self) -> Vec<String> {
        let mut names: std::collections::BTreeSet<String> =
            crate::assets::builtin_protocol_names().into_iter().collect();
        if let Ok(entries) = std::fs::read_dir(&self.user_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("xml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        names.insert(stem.to_string());
                    }
                }
            }
        }
        names.into_iter().collect()
    }

    fn get(&self, name: &str) -> Option<(String, ProtocolOrigin)> {
        let sanitized = sanitize_name(name);
        let user_path = self.user_path(&sanitized);
        if let Ok(content) = std::fs::read_to_string(&user_path) {
            return Some((content, ProtocolOrigin::User));
        }
        crate::assets::builtin_protocol(&sanitized)
            .map(|body| (body.to_string(), ProtocolOrigin::BuiltIn))
    }

    fn create(&self, name: &str, body: &str) -> Result<String> {
        let sanitized = sanitize_name(name);
        if sanitized.is_empty() {
            return Err(Error::InvalidName { raw: name.to_string() });
        }
        let path = self.user_path(&sanitized);
        if path.is_file() {
            return Err(Error::AlreadyExists { kind: EntityKind::Protocol, name: sanitized });
        }
        let content = Self::fallback_body(body);
        crate::atomic::write_atomic(&path, content.as_bytes())
            .map_err(|e| Error::io("write", path, e))?;
        Ok(sanitized)
    }

    fn update(&self, name: &str, body: &str) -> Result<()> {
        let sanitized = sanitize_name(name);
        let path = self.user_path(&sanitized);
        if !path.is_file() {
            return Err(Error::NotFound { kind: EntityKind::Protocol, name: sanitized });
        }
        let content = Self::fallback_body(body);
        crate::atomic::write_atomic(&path, content.as_bytes()).map_err(|e| Error::io("write", path, e))
    }

    fn delete(&self, name: &str) -> Result<()> {
        let sanitized = sanitize_name(name);
        let path = self.user_path(&sanitized);
        if !path.is_file() {
            if crate::assets::builtin_protocol(&sanitized).is_some() {
                return Err(Error::PermissionDenied {
                    reason: format!("'{sanitized}' is a built-in protocol and cannot be deleted"),
                });
            }
            return Err(Error::NotFound { kind: EntityKind::Protocol, name: sanitized });
        }
        std::fs::remove_file(&path).map_err(|e| Error::io("remove", path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> FilesystemProtocolStore {
        FilesystemProtocolStore::new(dir.path().join("protocol"))
    }

    #[test]
    fn list_includes_builtin_and_user_protocols() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.create("demo", "<Protocol>D</Protocol>").unwrap();
        let names = store.list();
        assert!(names.contains(&"standard".to_string()));
        assert!(names.contains(&"demo".to_string()));
    }

    #[test]
    fn user_overlay_shadows_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        std::fs::create_dir_all(dir.path().join("protocol")).unwrap();
        std::fs::write(
            dir.path().join("protocol/standard.xml"),
            "<Protocol>custom override</Protocol>",
        )
        .unwrap();
        let (body, origin) = store.get("standard").unwrap();
        assert_eq!(origin, ProtocolOrigin::User);
        assert!(body.contains("custom override"));
    }

    #[test]
    fn builtin_resolves_when_no_user_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let (_, origin) = store.get("standard").unwrap();
        assert_eq!(origin, ProtocolOrigin::BuiltIn);
    }

    #[test]
    fn s4_delete_builtin_is_permission_denied() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let err = store.delete("standard").unwrap_err();
        assert!(matches!(err, Error::PermissionDenied { .. }));
        assert!(crate::assets::builtin_protocol("standard").is_some());
    }

    #[test]
    fn create_then_delete_user_protocol_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.create("throwaway", "<Protocol>x</Protocol>").unwrap();
        store.delete("throwaway").unwrap();
        assert!(store.get("throwaway").is_none());
    }

    #[test]
    fn create_duplicate_in_user_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.create("dup", "<Protocol>x</Protocol>").unwrap();
        let err = store.create("dup", "<Protocol>y</Protocol>").unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));
    }

    #[test]
    fn empty_body_falls_back_to_packaged_template() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.create("blank", "").unwrap();
        let (body, _) = store.get("blank").unwrap();
        assert!(!body.trim().is_empty());
    }

    #[test]
    fn malformed_body_falls_back_to_packaged_template_not_generic_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.create("garbled", "<Protocol>unterminated").unwrap();
        let (body, _) = store.get("garbled").unwrap();
        assert_eq!(body, crate::assets::protocol_template());
    }
}
