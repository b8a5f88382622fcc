//! Error taxonomy for the patching pipeline.
//!
//! Every failure is surfaced to the caller as a typed variant; nothing is
//! downgraded to a warning inside the library. The binary wraps these in
//! `anyhow` for display.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    /// The input is not a recognized standalone executable: missing trailer,
    /// bad magic, or an offset invariant violated. Not retryable.
    #[error("unrecognized executable format: {0}")]
    Format(String),

    /// Well-formed container, but the requested module is absent.
    /// Carries every module name discovered, for diagnostics.
    #[error("module {target:?} not found; embedded modules: {}", .found.join(", "))]
    NotFound { target: String, found: Vec<String> },

    /// Replacement content is larger than the module's existing content.
    /// The format stores overlapping string regions at fixed offsets, so
    /// content can only shrink in place; it is never truncated silently.
    #[error(
        "replacement for module {name:?} is {new_len} bytes but only {original_len} bytes fit in place"
    )]
    Capacity {
        name: String,
        original_len: usize,
        new_len: usize,
    },

    /// The target executable is currently running. Transient; the caller may
    /// retry after closing the running process.
    #[error("{} is busy; close running instances and retry", .path.display())]
    ResourceBusy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Post-write validation failed. This signals a defect in the codec, not
    /// a user error; the output should be restored from a backup.
    #[error("{} failed post-write validation; restore from a backup", .path.display())]
    Corruption { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PatchError>;
