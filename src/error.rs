//! The single error type shared by every component.

use std::path::PathBuf;

/// What kind of named thing a `NotFound`/`AlreadyExists` error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Context,
    Protocol,
    File,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Context => "context",
            EntityKind::Protocol => "protocol",
            EntityKind::File => "file",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: EntityKind, name: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: EntityKind, name: String },

    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("malformed content in '{path}': {detail}")]
    MalformedContent { path: PathBuf, detail: String },

    #[error("filesystem error during {op} on '{path}': {cause}")]
    FileSystemError { op: &'static str, path: PathBuf, cause: std::io::Error },

    #[error("invalid name: '{raw}' sanitizes to an empty identifier")]
    InvalidName { raw: String },

    #[error("configuration missing: {key}")]
    ConfigMissing { key: &'static str },
}

impl Error {
    /// Exit code the CLI should use for this error, per the error handling design.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::FileSystemError { .. } => 2,
            _ => 1,
        }
    }

    /// A short, user-facing hint beyond the Display message.
    pub fn hint(&self) -> Option<String> {
        match self {
            Error::NotFound { kind: EntityKind::Context, .. } => {
                Some("run `erasmus context list` to see available contexts".to_string())
            }
            Error::NotFound { kind: EntityKind::Protocol, .. } => {
                Some("run `erasmus protocol list` to see available protocols".to_string())
            }
            Error::ConfigMissing { key: "IDE_ENV" } => {
                Some("run `erasmus setup` to choose an editor".to_string())
            }
            _ => None,
        }
    }

    pub fn io(op: &'static str, path: impl Into<PathBuf>, cause: std::io::Error) -> Self {
        Error::FileSystemError { op, path: path.into(), cause }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
