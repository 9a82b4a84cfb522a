//! Editor Descriptor and `IDE_ENV` resolution.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// One of the four supported AI coding assistants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Editor {
    Windsurf,
    Cursor,
    Codex,
    Claude,
}

impl Editor {
    pub const ALL: [Editor; 4] = [Editor::Windsurf, Editor::Cursor, Editor::Codex, Editor::Claude];

    /// Short name as written to `IDE_ENV` and shown in prompts.
    pub fn short_name(self) -> &'static str {
        match self {
            Editor::Windsurf => "windsurf",
            Editor::Cursor => "cursor",
            Editor::Codex => "codex",
            Editor::Claude => "claude",
        }
    }

    /// `IDE_ENV` detection: first letter, case-insensitive, `w*`/`cu*`/`co*`/`cl*`.
    pub fn from_ide_env(value: &str) -> Option<Editor> {
        let lower = value.trim().to_ascii_lowercase();
        if lower.starts_with('w') {
            Some(Editor::Windsurf)
        } else if lower.starts_with("cu") {
            Some(Editor::Cursor)
        } else if lower.starts_with("co") {
            Some(Editor::Codex)
        } else if lower.starts_with("cl") {
            Some(Editor::Claude)
        } else {
            None
        }
    }

    /// Rules file path, relative to the project root.
    pub fn rules_file_relative(self) -> &'static str {
        match self {
            Editor::Windsurf => ".windsurfrules",
            Editor::Cursor => ".cursorrules",
            Editor::Codex => ".codex.md",
            Editor::Claude => "CLAUDE.md",
        }
    }

    /// Absolute global rules file path, or `None` if `$HOME` cannot be resolved.
    pub fn global_rules_file(self, project_root: &std::path::Path) -> Option<PathBuf> {
        let home = dirs::home_dir();
        match self {
            Editor::Windsurf => {
                home.map(|h| h.join(".codeium/windsurf/memories/global_rules.md"))
            }
            Editor::Cursor => Some(project_root.join(".cursor/global_rules.md")),
            Editor::Codex => home.map(|h| h.join(".codex/instructions.md")),
            Editor::Claude => home.map(|h| h.join(".claude/CLAUDE.md")),
        }
    }

    /// Filenames the watcher must never treat as a planning-file trigger, across all editors.
    pub fn ignored_rules_filenames() -> [&'static str; 4] {
        [".codex.md", ".cursorrules", ".windsurfrules", "CLAUDE.md"]
    }
}

/// Resolve the active editor from the project's `.env` file (or the process environment as a
/// fallback, e.g. when `.env` has not been written yet this run).
pub fn resolve_from_env(project_root: &std::path::Path) -> Option<Editor> {
    let env_path = project_root.join(".env");
    if let Ok(iter) = dotenvy::from_path_iter(&env_path) {
        for item in iter.flatten() {
            let (key, value) = item;
            if key == "IDE_ENV" {
                if let Some(editor) = Editor::from_ide_env(&value) {
                    return Some(editor);
                }
            }
        }
    }
    std::env::var("IDE_ENV").ok().and_then(|v| Editor::from_ide_env(&v))
}

/// Persist `IDE_ENV=<name>` into the project's `.env` file, preserving any other lines.
pub fn persist_ide_env(project_root: &std::path::Path, editor: Editor) -> Result<()> {
    let env_path = project_root.join(".env");
    let existing = std::fs::read_to_string(&env_path).unwrap_or_default();
    let mut lines: Vec<String> = existing
        .lines()
        .filter(|line| !line.trim_start().starts_with("IDE_ENV="))
        .map(str::to_string)
        .collect();
    lines.push(format!("IDE_ENV={}", editor.short_name()));
    let content = lines.join("\n") + "\n";
    crate::atomic::write_atomic(&env_path, content.as_bytes())
        .map_err(|e| Error::io("write", env_path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_letter_detection() {
        assert_eq!(Editor::from_ide_env("Windsurf"), Some(Editor::Windsurf));
        assert_eq!(Editor::from_ide_env("cursor"), Some(Editor::Cursor));
        assert_eq!(Editor::from_ide_env("codex"), Some(Editor::Codex));
        assert_eq!(Editor::from_ide_env("claude"), Some(Editor::Claude));
        assert_eq!(Editor::from_ide_env("  CU-anything"), Some(Editor::Cursor));
        assert_eq!(Editor::from_ide_env("xyz"), None);
    }

    #[test]
    fn rules_file_names() {
        assert_eq!(Editor::Windsurf.rules_file_relative(), ".windsurfrules");
        assert_eq!(Editor::Cursor.rules_file_relative(), ".cursorrules");
        assert_eq!(Editor::Codex.rules_file_relative(), ".codex.md");
        assert_eq!(Editor::Claude.rules_file_relative(), "CLAUDE.md");
    }

    #[test]
    fn persist_ide_env_preserves_other_lines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "OTHER=1\nIDE_ENV=stale\n").unwrap();
        persist_ide_env(dir.path(), Editor::Claude).unwrap();
        let content = std::fs::read_to_string(dir.path().join(".env")).unwrap();
        assert!(content.contains("OTHER=1"));
        assert!(content.contains("IDE_ENV=claude"));
        assert!(!content.contains("IDE_ENV=stale"));
    }
}
