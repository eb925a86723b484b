//! Error types for the GitCondDB resolution engine.
//!
//! All hard errors carry the offending object id or message so the
//! failure is actionable without re-deriving context at the call site.
//! An invalid IOV (a time-point outside any manifest entry, or outside
//! the supplied bounds) is *not* an error: [`crate::CondDB::get`] signals
//! it by returning an empty payload with [`crate::IOV::invalid`] — see
//! its doc comment.

use thiserror::Error;

#[derive(Error, Debug)]
/// Unified error enumeration for the GitCondDB crate.
pub enum GitCondDbError {
    /// Back-end could not locate `<tag>:<path>`.
    #[error("cannot resolve object {0}")]
    UnresolvableObject(String),

    /// Document back-end found a leaf that is neither a string nor an
    /// object (e.g. a number, bool, array, or null).
    #[error("invalid type at {0}")]
    InvalidObjectType(String),

    /// Repository could not be opened, root is not a directory, or a
    /// document literal/file failed to parse.
    #[error("backend init failed: {0}")]
    BackendInitFailure(String),

    /// Malformed IOV manifest line.
    #[error("malformed IOV manifest entry: {0}")]
    ManifestParseError(String),

    /// I/O failure reading a filesystem back-end path.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure from the underlying git repository.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// Failure parsing or walking a document back-end's JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
