//! erasmus: a workstation daemon that merges project planning documents and a selected
//! protocol into an AI coding assistant's rules file.
//!
//! This crate never installs a `tracing` subscriber itself; the binary does that, so
//! embedding `erasmus` in another process does not fight over global logging state.

pub mod app;
pub mod assets;
pub mod atomic;
pub mod context_store;
pub mod editor;
pub mod error;
pub mod merge;
pub mod paths;
pub mod protocol_store;
pub mod sanitize;
pub mod selection;
pub mod watcher;

pub use app::App;
pub use editor::Editor;
pub use error::{Error, Result};
pub use paths::{PlanningKind, ProjectPaths};
