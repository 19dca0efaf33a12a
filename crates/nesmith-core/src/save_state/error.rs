//! Save state error types.

use thiserror::Error;

/// Save state operation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveStateError {
    /// The blob was written by a different format version.
    #[error("save state version mismatch: found {found}, expected {expected}")]
    VersionMismatch {
        /// Version field in the blob.
        found: u32,
        /// Version this build writes.
        expected: u32,
    },

    /// The blob is malformed: bad magic, truncated, or trailing data.
    #[error("save state data is corrupt")]
    Corrupt,
}
