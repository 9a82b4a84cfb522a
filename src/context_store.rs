//! Context Store (C3): CRUD over named triples of planning fragments.

use std::path::PathBuf;

use crate::error::{EntityKind, Error, Result};
use crate::paths::PlanningKind;
use crate::sanitize::{sanitize_name, sanitize_xml};

/// Caller-supplied bodies for a new context, one per kind. Absent bodies fall back to the
/// packaged per-kind template, then to a minimal `<Kind></Kind>` document.
#[derive(Debug, Clone, Default)]
pub struct ContextBodies {
    pub architecture: Option<String>,
    pub progress: Option<String>,
    pub tasks: Option<String>,
}

impl ContextBodies {
    fn body_for(&self, kind: PlanningKind) -> Option<&str> {
        match kind {
            PlanningKind::Architecture => self.architecture.as_deref(),
            PlanningKind::Progress => self.progress.as_deref(),
            PlanningKind::Tasks => self.tasks.as_deref(),
        }
    }
}

pub trait ContextStore {
    /// Names of stored contexts, sorted.
    fn list(&self) -> Result<Vec<String>>;
    /// Create a new context, returning its sanitized name.
    fn create(&self, name: &str, bodies: ContextBodies) -> Result<String>;
    fn delete(&self, name: &str) -> Result<()>;
    fn read(&self, name: &str, kind: PlanningKind) -> Result<Option<String>>;
    fn update(&self, name: &str, kind: PlanningKind, body: &str) -> Result<()>;
    /// Copy the context's three files onto the project's live planning files. Best-effort:
    /// a failure copying one kind is recorded but does not abort the other two.
    fn copy_into_live(&self, name: &str, live_file: impl Fn(PlanningKind) -> PathBuf) -> Result<Vec<Error>>;
    /// Inverse of `copy_into_live`: read the three live files, extract the architecture
    /// file's `<Title>` text, sanitize it into a name, and create a context from the live
    /// contents. Returns the new context's sanitized name.
    fn capture_from_live(&self, live_file: impl Fn(PlanningKind) -> PathBuf) -> Result<String>;
}

pub struct FilesystemContextStore {
    context_dir: PathBuf,
}

impl FilesystemContextStore {
    pub fn new(context_dir: PathBuf) -> Self {
        Self { context_dir }
    }

    fn dir_for(&self, name: &str) -> PathBuf {
        self.context_dir.join(name)
    }

    fn file_for(&self, name: &str, kind: PlanningKind) -> PathBuf {
        self.dir_for(name).join(format!("ctx.{}.xml", kind.file_stem()))
    }

    fn default_body(kind: PlanningKind) -> String {
        let template = crate::assets::planning_template(kind);
        if !template.is_empty() {
            template.to_string()
        } else {
            format!("<{tag}></{tag}>", tag = kind.root_tag())
        }
    }
}

impl ContextStore for FilesystemContextStore {
    fn list(&self) -> Result<Vec<String>> {
        if !self.context_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        let entries = std::fs::read_dir(&self.context_dir)
            .map_err(|e| Error::io("read_dir", self.context_dir.clone(), e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io("read_dir", self.context_dir.clone(), e))?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn create(&self, name: &str, bodies: ContextBodies) -> Result<String> {
        let sanitized = sanitize_name(name);
        if sanitized.is_empty() {
            return Err(Error::InvalidName { raw: name.to_string() });
        }
        let dir = self.dir_for(&sanitized);
        if dir.is_dir() {
            return Err(Error::AlreadyExists { kind: EntityKind::Context, name: sanitized });
        }
        std::fs::create_dir_all(&dir).map_err(|e| Error::io("create_dir_all", dir.clone(), e))?;

        for kind in PlanningKind::ALL {
            let body = match bodies.body_for(kind) {
                Some(b) if !b.trim().is_empty() => sanitize_xml(b),
                _ => Self::default_body(kind),
            };
            let path = self.file_for(&sanitized, kind);
            crate::atomic::write_atomic(&path, body.as_bytes())
                .map_err(|e| Error::io("write", path, e))?;
        }
        Ok(sanitized)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let sanitized = sanitize_name(name);
        let dir = self.dir_for(&sanitized);
        if !dir.is_dir() {
            return Err(Error::NotFound { kind: EntityKind::Context, name: sanitized });
        }
        std::fs::remove_dir_all(&dir).map_err(|e| Error::io("remove_dir_all", dir, e))
    }

    fn read(&self, name: &str, kind: PlanningKind) -> Result<Option<String>> {
        let sanitized = sanitize_name(name);
        let path = self.file_for(&sanitized, kind);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io("read", path, e)),
        }
    }

    fn update(&self, name: &str, kind: PlanningKind, body: &str) -> Result<()> {
        let sanitized = sanitize_name(name);
        let dir = self.dir_for(&sanitized);
        if !dir.is_dir() {
            return Err(Error::NotFound { kind: EntityKind::Context, name: sanitized });
        }
        let path = self.file_for(&sanitized, kind);
        let content = sanitize_xml(body);
        crate::atomic::write_atomic(&path, content.as_bytes()).map_err(|e| Error::io("write", path, e))
    }

    fn copy_into_live(
        &self,
        name: &str,
        live_file: impl Fn(PlanningKind) -> PathBuf,
    ) -> Result<Vec<Error>> {
        let sanitized = sanitize_name(name);
        let dir = self.dir_for(&sanitized);
        if !dir.is_dir() {
            return Err(Error::NotFound { kind: EntityKind::Context, name: sanitized });
        }

        let mut failures = Vec::new();
        for kind in PlanningKind::ALL {
            let src = self.file_for(&sanitized, kind);
            let dst = live_file(kind);
            match std::fs::read(&src) {
                Ok(bytes) => {
                    if let Err(e) = crate::atomic::write_atomic(&dst, &bytes) {
                        failures.push(Error::io("write", dst, e));
                    }
                }
                Err(e) => failures.push(Error::io("read", src, e)),
            }
        }
        Ok(failures)
    }

    fn capture_from_live(&self, live_file: impl Fn(PlanningKind) -> PathBuf) -> Result<String> {
        let architecture_path = live_file(PlanningKind::Architecture);
        let architecture = std::fs::read_to_string(&architecture_path)
            .map_err(|e| Error::io("read", architecture_path.clone(), e))?;

        let title = extract_title(&architecture).ok_or_else(|| Error::MalformedContent {
            path: architecture_path.clone(),
            detail: "missing <Title> element".to_string(),
        })?;
        let name = sanitize_name(&title);
        if name.is_empty() {
            return Err(Error::InvalidName { raw: title });
        }

        let progress_path = live_file(PlanningKind::Progress);
        let tasks_path = live_file(PlanningKind::Tasks);
        let progress = std::fs::read_to_string(&progress_path).unwrap_or_default();
        let tasks = std::fs::read_to_string(&tasks_path).unwrap_or_default();

        self.create(
            &name,
            ContextBodies {
                architecture: Some(architecture),
                progress: Some(progress),
                tasks: Some(tasks),
            },
        )
    }
}

/// Extract the text of the first `<Title>` descendant element, if any.
fn extract_title(xml: &str) -> Option<String> {
    let doc = roxmltree::Document::parse(xml).ok()?;
    doc.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Title")
        .map(|n| n.text().unwrap_or_default().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> FilesystemContextStore {
        FilesystemContextStore::new(dir.path().join("context"))
    }

    #[test]
    fn create_writes_three_files_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let name = store.create("My App", ContextBodies::default()).unwrap();
        assert_eq!(name, "My_App");
        for kind in PlanningKind::ALL {
            assert!(store.read(&name, kind).unwrap().is_some());
        }
    }

    #[test]
    fn create_fails_on_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.create("dup", ContextBodies::default()).unwrap();
        let err = store.create("dup", ContextBodies::default()).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));
    }

    #[test]
    fn delete_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let err = store.delete("nope").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn s1_store_then_list_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let live_architecture = dir.path().join(".ctx.architecture.xml");
        let live_progress = dir.path().join(".ctx.progress.xml");
        let live_tasks = dir.path().join(".ctx.tasks.xml");
        std::fs::write(&live_architecture, "<Architecture><Title>My App</Title></Architecture>")
            .unwrap();
        std::fs::write(&live_progress, "<Progress/>").unwrap();
        std::fs::write(&live_tasks, "<Tasks/>").unwrap();

        let live_file = |kind: PlanningKind| match kind {
            PlanningKind::Architecture => live_architecture.clone(),
            PlanningKind::Progress => live_progress.clone(),
            PlanningKind::Tasks => live_tasks.clone(),
        };

        let name = store.capture_from_live(live_file).unwrap();
        assert_eq!(name, "My_App");
        assert_eq!(
            store.read(&name, PlanningKind::Architecture).unwrap().unwrap(),
            "<Architecture><Title>My App</Title></Architecture>"
        );
    }

    #[test]
    fn load_then_delete_then_load_fails_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let name = store.create("roundtrip", ContextBodies::default()).unwrap();

        let live_architecture = dir.path().join(".ctx.architecture.xml");
        let live_progress = dir.path().join(".ctx.progress.xml");
        let live_tasks = dir.path().join(".ctx.tasks.xml");
        let live_file = |kind: PlanningKind| match kind {
            PlanningKind::Architecture => live_architecture.clone(),
            PlanningKind::Progress => live_progress.clone(),
            PlanningKind::Tasks => live_tasks.clone(),
        };

        let failures = store.copy_into_live(&name, live_file).unwrap();
        assert!(failures.is_empty());
        let before = std::fs::read_to_string(&live_architecture).unwrap();

        store.delete(&name).unwrap();
        let err = store.copy_into_live(&name, live_file).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        let after = std::fs::read_to_string(&live_architecture).unwrap();
        assert_eq!(before, after);
    }
}
