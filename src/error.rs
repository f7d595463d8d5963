//! Error types for the imgseq-pdf library.
//!
//! Two kinds of failure exist:
//!
//! * [`ImgSeqError`] — **Fatal** for the current step. Acquisition errors
//!   abort the download loop; compile errors abort the document. Files
//!   already written to disk are left in place either way.
//!
//! * [`HttpStatusWarning`] — **Non-fatal**: the server answered with a status
//!   that is neither success nor `404`. Acquisition stops and keeps what it
//!   has; the warning travels inside [`crate::pipeline::acquire::StopReason`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the imgseq-pdf library.
#[derive(Debug, Error)]
pub enum ImgSeqError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The locator does not end in `<prefix><6 digits><.ext>`.
    #[error(
        "Link '{input}' does not match the required format.\n\
Expected something like http://host/path/page_000001.jpg (six digits, lowercase extension)."
    )]
    InvalidLocator { input: String },

    // ── Acquisition errors ────────────────────────────────────────────────
    /// The per-prefix output directory could not be created.
    #[error("Cannot create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connection-level failure (DNS, refused, timeout) or a broken body.
    #[error("Transfer failed for '{url}': {reason}\nCheck your internet connection.")]
    Transfer { url: String, reason: String },

    /// A downloaded image could not be written to disk.
    #[error("Failed to write '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Compile errors ────────────────────────────────────────────────────
    /// A saved image could not be read or decoded.
    #[error("Cannot read image '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    /// Compile was asked to build a document from zero images.
    #[error("No images to put into '{path}'")]
    EmptyDocument { path: PathBuf },

    /// The assembled PDF could not be saved.
    #[error("Failed to write PDF '{path}': {reason}")]
    PdfWrite { path: PathBuf, reason: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or environment validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// The server answered with something other than success or `404`.
///
/// Acquisition stops at that index and keeps every file saved before it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {status} while fetching {url}")]
pub struct HttpStatusWarning {
    pub url: String,
    pub status: u16,
}
