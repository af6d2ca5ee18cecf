//! Session-level error type.

use thiserror::Error;

/// Errors surfaced by an extraction session.
///
/// Component errors bridge in via `#[from]`; batch operations catch these
/// per item and record them in [`ItemOutcome`](crate::ItemOutcome) rather
/// than aborting the run.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Archive-level error (index, decompression, lookup).
    #[error(transparent)]
    Archive(#[from] nightwave_archive::Error),

    /// Soundbank demux error.
    #[error(transparent)]
    Bank(#[from] nightwave_bnk::Error),

    /// Stream extraction error.
    #[error(transparent)]
    Stream(#[from] nightwave_wem::Error),

    /// The addressed bank has no stream with the requested id.
    #[error("bank {id:#018x} has no stream {sub}")]
    SubStreamNotFound { id: u64, sub: u32 },

    /// A multi-stream bank was addressed without a stream id.
    #[error("bank {id:#018x} contains {count} streams; a stream id is required")]
    SubStreamRequired { id: u64, count: usize },

    /// The batch was cancelled before this item started.
    #[error("extraction cancelled")]
    Cancelled,
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
