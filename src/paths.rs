//! Path Resolver (C1): project-rooted layout for `.erasmus/`, live planning files, and the
//! editor-specific rules file.

use std::path::{Path, PathBuf};

use crate::editor::Editor;
use crate::error::{Error, Result};

/// One of the three planning-document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanningKind {
    Architecture,
    Progress,
    Tasks,
}

impl PlanningKind {
    pub const ALL: [PlanningKind; 3] =
        [PlanningKind::Architecture, PlanningKind::Progress, PlanningKind::Tasks];

    /// Lowercase name used in file names (`ctx.<kind>.xml`, `.ctx.<kind>.xml`).
    pub fn file_stem(self) -> &'static str {
        match self {
            PlanningKind::Architecture => "architecture",
            PlanningKind::Progress => "progress",
            PlanningKind::Tasks => "tasks",
        }
    }

    /// Tag name used for the minimal fallback document `<Kind></Kind>`.
    pub fn root_tag(self) -> &'static str {
        match self {
            PlanningKind::Architecture => "Architecture",
            PlanningKind::Progress => "Progress",
            PlanningKind::Tasks => "Tasks",
        }
    }

    /// Marker name used in the merge template (`ARCHITECTURE`, `PROGRESS`, `TASKS`).
    pub fn marker_name(self) -> &'static str {
        match self {
            PlanningKind::Architecture => "ARCHITECTURE",
            PlanningKind::Progress => "PROGRESS",
            PlanningKind::Tasks => "TASKS",
        }
    }
}

/// Resolved, project-rooted filesystem layout. Constructed once per process and threaded
/// through every component that needs a path.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
    editor: Editor,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>, editor: Editor) -> Self {
        Self { root: root.into(), editor }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn editor(&self) -> Editor {
        self.editor
    }

    pub fn erasmus_dir(&self) -> PathBuf {
        self.root.join(".erasmus")
    }

    pub fn context_dir(&self) -> PathBuf {
        self.erasmus_dir().join("context")
    }

    pub fn protocol_dir(&self) -> PathBuf {
        self.erasmus_dir().join("protocol")
    }

    pub fn template_dir(&self) -> PathBuf {
        self.erasmus_dir().join("templates")
    }

    pub fn selection_file(&self) -> PathBuf {
        self.erasmus_dir().join("current_protocol.txt")
    }

    /// `<root>/.ctx.<kind>.xml`
    pub fn live_file(&self, kind: PlanningKind) -> PathBuf {
        self.root.join(format!(".ctx.{}.xml", kind.file_stem()))
    }

    /// `<root>/<editor.rules_filename>`
    pub fn rules_file(&self) -> PathBuf {
        self.root.join(self.editor.rules_file_relative())
    }

    pub fn env_file(&self) -> PathBuf {
        self.root.join(".env")
    }

    /// Idempotently create every directory this layout needs.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            self.erasmus_dir(),
            self.context_dir(),
            self.protocol_dir(),
            self.template_dir(),
            self.template_dir().join("protocols"),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| Error::io("create_dir_all", dir, e))?;
        }
        Ok(())
    }

    /// Idempotently touch the three live planning files, creating them empty if absent, and
    /// materialize the packaged merge template into the template directory if no copy (user
    /// or previously-materialized) exists there yet.
    pub fn ensure_files(&self) -> Result<()> {
        for kind in PlanningKind::ALL {
            let path = self.live_file(kind);
            if !path.exists() {
                let doc = format!("<{tag}></{tag}>", tag = kind.root_tag());
                crate::atomic::write_atomic(&path, doc.as_bytes())
                    .map_err(|e| Error::io("write", path, e))?;
            }
        }
        let template_path = self.template_dir().join("meta_rules.xml");
        if !template_path.exists() {
            crate::atomic::write_atomic(&template_path, crate::assets::meta_rules().as_bytes())
                .map_err(|e| Error::io("write", template_path, e))?;
        }
        Ok(())
    }

    /// Windsurf-only fallback: if the windsurf rules file exists and `.cursorrules` does not,
    /// symlink `.cursorrules` -> `.windsurfrules`.
    pub fn ensure_windsurf_symlink(&self) -> Result<()> {
        if self.editor != Editor::Windsurf {
            return Ok(());
        }
        let rules = self.rules_file();
        let cursorrules = self.root.join(".cursorrules");
        if rules.exists() && !cursorrules.exists() {
            symlink(&rules, &cursorrules)
                .map_err(|e| Error::io("symlink", cursorrules, e))?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(original, link)
}
