// src/error.rs
use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::config::consts::{EXIT_CONFIG, EXIT_IO_FAILURE, EXIT_MALFORMED, EXIT_NOT_FOUND};

/// Fatal conditions for one input file (or for the whole run when the
/// output cannot be written).
#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("{}: file not found", path.display())]
    NotFound { path: PathBuf },

    #[error("{}: malformed input: {detail}", path.display())]
    MalformedInput { path: PathBuf, detail: String },

    #[error("{}: {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl FlattenError {
    pub fn malformed(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        FlattenError::MalformedInput { path: path.into(), detail: detail.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FlattenError::IoFailure { path: path.into(), source }
    }

    /// Map an error from opening/reading an input file.
    pub fn from_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => FlattenError::NotFound { path },
            _ => FlattenError::IoFailure { path, source },
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            FlattenError::NotFound { .. } => EXIT_NOT_FOUND,
            FlattenError::MalformedInput { .. } => EXIT_MALFORMED,
            FlattenError::IoFailure { .. } => EXIT_IO_FAILURE,
            FlattenError::Config(_) => EXIT_CONFIG,
        }
    }

    /// Short tag for summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            FlattenError::NotFound { .. } => "NotFound",
            FlattenError::MalformedInput { .. } => "MalformedInput",
            FlattenError::IoFailure { .. } => "IOFailure",
            FlattenError::Config(_) => "Config",
        }
    }
}

/// Why a node or leaf was dropped during classification or flattening.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Option record without a usable `name`.
    MissingName,
    /// Node of a JSON type that has no meaning at its position.
    UnexpectedShape(&'static str),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingName => write!(f, "option has no name"),
            SkipReason::UnexpectedShape(kind) => write!(f, "unexpected {kind}"),
        }
    }
}

/// A recoverable skip. Logged and counted, never propagated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLeaf {
    /// Slash-joined path inside the feed, e.g. `Phantom/Default Configuration/wheels/2`.
    pub location: String,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.reason)
    }
}
