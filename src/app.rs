//! Application facade: wires the path resolver, the two CRUD stores, the selection record,
//! and the merge engine into the operations the CLI surface (C9) dispatches to.

use std::path::PathBuf;
use std::sync::Arc;

use crate::context_store::{ContextBodies, ContextStore, FilesystemContextStore};
use crate::editor::Editor;
use crate::error::{EntityKind, Error, Result};
use crate::merge::{MergeEngine, MergeOutcome};
use crate::paths::{PlanningKind, ProjectPaths};
use crate::protocol_store::{FilesystemProtocolStore, ProtocolOrigin, ProtocolStore};
use crate::selection::SelectionStore;
use crate::watcher::Watcher;

pub struct App {
    paths: ProjectPaths,
    contexts: FilesystemContextStore,
    protocols: FilesystemProtocolStore,
    selection: SelectionStore,
    engine: Arc<MergeEngine<FilesystemProtocolStore>>,
}

impl App {
    pub fn new(root: impl Into<PathBuf>, editor: Editor) -> Self {
        let paths = ProjectPaths::new(root, editor);
        let contexts = FilesystemContextStore::new(paths.context_dir());
        let protocols = FilesystemProtocolStore::new(paths.protocol_dir());
        let selection = SelectionStore::new(paths.selection_file());
        let engine = Arc::new(MergeEngine::new(
            paths.clone(),
            FilesystemProtocolStore::new(paths.protocol_dir()),
            SelectionStore::new(paths.selection_file()),
        ));
        Self { paths, contexts, protocols, selection, engine }
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn contexts(&self) -> &FilesystemContextStore {
        &self.contexts
    }

    pub fn protocols(&self) -> &FilesystemProtocolStore {
        &self.protocols
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    /// `setup`: create the `.erasmus` layout, create and load a first context if none exist
    /// yet, select a protocol, and run one merge.
    pub fn setup(&self, context_name: &str, protocol_name: &str) -> Result<MergeOutcome> {
        self.paths.ensure_dirs()?;
        self.paths.ensure_files()?;
        if self.contexts.list()?.is_empty() {
            self.contexts.create(context_name, ContextBodies::default())?;
            self.load_context(context_name)?;
        }
        self.select_protocol(protocol_name)?;
        let outcome = self.engine.merge()?;
        self.paths.ensure_windsurf_symlink()?;
        Ok(outcome)
    }

    /// `context load`: copy a stored context's files onto the live planning files, then merge.
    pub fn load_context(&self, name: &str) -> Result<Vec<Error>> {
        let paths = self.paths.clone();
        let failures = self.contexts.copy_into_live(name, move |kind| paths.live_file(kind))?;
        self.engine.merge()?;
        Ok(failures)
    }

    /// `context store`: capture the live planning files into a new named context.
    pub fn store_context(&self) -> Result<String> {
        let paths = self.paths.clone();
        self.contexts.capture_from_live(move |kind| paths.live_file(kind))
    }

    /// `protocol select`: point the selection record at `name` and merge. Errors `NotFound`
    /// if no protocol of that name exists in either root.
    pub fn select_protocol(&self, name: &str) -> Result<MergeOutcome> {
        if self.protocols.get(name).is_none() {
            return Err(Error::NotFound { kind: EntityKind::Protocol, name: name.to_string() });
        }
        self.selection.set(name)?;
        self.engine.merge()
    }

    /// Run the merge with the current on-disk state, without changing any selection.
    pub fn merge_now(&self) -> Result<MergeOutcome> {
        self.engine.merge()
    }

    /// `watch`: start the debounced filesystem watcher over the three live planning files.
    /// The returned `Watcher` must be kept alive for the duration of the watch; dropping it
    /// (or calling `stop()`) halts dispatch.
    pub fn start_watching(&self) -> Result<Watcher> {
        let watched: Vec<PathBuf> =
            PlanningKind::ALL.iter().map(|kind| self.paths.live_file(*kind)).collect();
        let engine = self.engine.clone();
        let mut watcher = Watcher::new();
        watcher.start(watched, move |path| {
            tracing::info!(path = %path.display(), "planning file changed");
            if let Err(e) = engine.merge() {
                tracing::error!(error = %e, "merge failed");
            }
        })?;
        Ok(watcher)
    }

    pub fn protocol_origin(&self, name: &str) -> Option<ProtocolOrigin> {
        self.protocols.get(name).map(|(_, origin)| origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_creates_layout_and_merges() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(dir.path(), Editor::Claude);
        app.setup("My App", "standard").unwrap();
        assert!(app.paths().rules_file().is_file());
        assert_eq!(app.contexts().list().unwrap(), vec!["My_App".to_string()]);
        assert_eq!(app.selection().get().unwrap(), Some("standard".to_string()));
    }

    #[test]
    fn selecting_unknown_protocol_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(dir.path(), Editor::Claude);
        app.paths().ensure_dirs().unwrap();
        app.paths().ensure_files().unwrap();
        let err = app.select_protocol("does-not-exist").unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: EntityKind::Protocol, .. }));
    }

    #[test]
    fn store_then_load_roundtrips_through_live_files() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(dir.path(), Editor::Claude);
        app.paths().ensure_dirs().unwrap();
        std::fs::write(
            app.paths().live_file(PlanningKind::Architecture),
            "<Architecture><Title>Roundtrip</Title></Architecture>",
        )
        .unwrap();
        std::fs::write(app.paths().live_file(PlanningKind::Progress), "<Progress/>").unwrap();
        std::fs::write(app.paths().live_file(PlanningKind::Tasks), "<Tasks/>").unwrap();

        let name = app.store_context().unwrap();
        assert_eq!(name, "Roundtrip");

        std::fs::write(app.paths().live_file(PlanningKind::Architecture), "<Architecture/>")
            .unwrap();
        let failures = app.load_context(&name).unwrap();
        assert!(failures.is_empty());
        let restored = std::fs::read_to_string(app.paths().live_file(PlanningKind::Architecture))
            .unwrap();
        assert_eq!(restored, "<Architecture><Title>Roundtrip</Title></Architecture>");
    }
}
