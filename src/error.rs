//! Error types for the office2pdf library.
//!
//! Two error types reflect two layers:
//!
//! * [`ConvertError`] — **Fatal** for one call: returned as
//!   `Err(ConvertError)` from the `convert*` entry points. Nothing is retried
//!   once it reaches the caller.
//!
//! * [`ChannelError`] — what a backend control channel reports. The
//!   executor inspects it: [`ChannelError::StaleHandle`] triggers exactly one
//!   session rebuild and retry, everything else becomes
//!   [`ConvertError::ConversionFailed`].
//!
//! Discovery failures (a variant that is not installed, a connection attempt
//! that errors or times out) never surface on their own; only running out of
//! variants does, as [`ConvertError::BackendUnavailable`].

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the office2pdf library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source document was not found at the given path.
    #[error("Can't find input file: '{path}'")]
    FileNotFound { path: PathBuf },

    // ── Backend errors ────────────────────────────────────────────────────
    /// No installed or reachable office suite after every discovery variant.
    #[error(
        "Can't find OpenOffice.org or LibreOffice (tried: {}).\n\
Office must be installed for pdf conversion.",
        .attempted.join(", ")
    )]
    BackendUnavailable { attempted: Vec<String> },

    /// The backend rejected the document while opening or exporting it.
    #[error("Conversion of '{path}' failed while {stage}: {detail}")]
    ConversionFailed {
        path: PathBuf,
        stage: Stage,
        detail: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// A scratch file for the byte-array entry point could not be created
    /// or written.
    #[error("Failed to prepare scratch file '{path}': {source}")]
    ScratchFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The produced PDF could not be read back.
    #[error("Failed to read converted output '{path}': {source}")]
    OutputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Which backend step a [`ConvertError::ConversionFailed`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Open,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Open => f.write_str("opening"),
            Stage::Export => f.write_str("exporting"),
        }
    }
}

/// Failure reported by a control channel or one of its documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The remote side has been torn down (suite restarted, control object
    /// expired). The session must be rebuilt before the channel is usable.
    #[error("control channel disposed: {0}")]
    StaleHandle(String),

    /// Any other backend-reported failure.
    #[error("{0}")]
    Failed(String),
}

impl ChannelError {
    pub fn is_stale(&self) -> bool {
        matches!(self, ChannelError::StaleHandle(_))
    }
}
