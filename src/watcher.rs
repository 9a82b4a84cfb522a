//! Watcher (C7): debounced filesystem watch over the three live planning files, triggering
//! the Merge Engine on change.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};

use crate::error::{Error, Result};

/// Events arriving for the same path within this window of the last processed event for that
/// path are dropped.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(100);

/// Pure debounce decision, factored out so it can be unit tested without real filesystem
/// timing. Returns `true` if an event for `path` at `now` should trigger the callback.
fn should_process(last_processed: Option<Instant>, now: Instant) -> bool {
    match last_processed {
        Some(last) => now.duration_since(last) >= DEBOUNCE_WINDOW,
        None => true,
    }
}

pub struct Watcher {
    fs_watcher: Option<RecommendedWatcher>,
    dispatcher: Option<thread::JoinHandle<()>>,
    shutdown: Option<mpsc::Sender<()>>,
}

impl Watcher {
    pub fn new() -> Self {
        Self { fs_watcher: None, dispatcher: None, shutdown: None }
    }

    pub fn is_running(&self) -> bool {
        self.fs_watcher.is_some()
    }

    /// Watch `watched_paths` and call `on_trigger` (off the calling thread) whenever one of
    /// them changes, outside the debounce window. A path not in `watched_paths` never fires,
    /// which is how the rules file and the other editors' rules filenames stay ignored: we
    /// simply never register a watch on them.
    pub fn start<F>(&mut self, watched_paths: Vec<PathBuf>, on_trigger: F) -> Result<()>
    where
        F: Fn(&Path) + Send + 'static,
    {
        if self.is_running() {
            tracing::warn!("watcher already running; start() is a no-op");
            return Ok(());
        }

        let (event_tx, event_rx) = mpsc::channel::<notify::Result<Event>>();
        let mut fs_watcher = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        })
        .map_err(|e| watch_error(&e))?;

        for path in &watched_paths {
            fs_watcher
                .watch(path, RecursiveMode::NonRecursive)
                .map_err(|e| Error::io("watch", path.clone(), std::io::Error::other(e.to_string())))?;
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let watched_set: HashSet<PathBuf> = watched_paths.into_iter().collect();

        let dispatcher = thread::spawn(move || {
            let mut last_processed: HashMap<PathBuf, Instant> = HashMap::new();
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }
                match event_rx.recv_timeout(Duration::from_millis(50)) {
                    Ok(Ok(event)) => {
                        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                            continue;
                        }
                        for path in &event.paths {
                            if !watched_set.contains(path) {
                                continue;
                            }
                            let now = Instant::now();
                            if !should_process(last_processed.get(path).copied(), now) {
                                tracing::debug!(?path, "dropped event within debounce window");
                                continue;
                            }
                            last_processed.insert(path.clone(), now);
                            on_trigger(path);
                        }
                    }
                    Ok(Err(e)) => tracing::warn!(error = %e, "watch error"),
                    Err(mpsc::RecvTimeoutError::Timeout) => continue,
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        self.fs_watcher = Some(fs_watcher);
        self.dispatcher = Some(dispatcher);
        self.shutdown = Some(shutdown_tx);
        tracing::info!("watcher started");
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.dispatcher.take() {
            let _ = handle.join();
        }
        self.fs_watcher = None;
        tracing::info!("watcher stopped");
    }
}

impl Default for Watcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}

fn watch_error(cause: &notify::Error) -> Error {
    Error::io("watch", PathBuf::new(), std::io::Error::other(cause.to_string()))
}
