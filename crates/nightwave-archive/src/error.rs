//! Error types for the archive crate.

use thiserror::Error;

/// Errors that can occur when working with RDAR archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (truncated or out-of-range reads).
    #[error("{0}")]
    Common(#[from] nightwave_common::Error),

    /// The buffer does not start with the RDAR magic.
    #[error("not a REDengine archive: bad magic {actual:?}")]
    UnsupportedFormat { actual: [u8; 4] },

    /// Archive version outside the supported range.
    #[error("unsupported archive version: {0}")]
    UnsupportedVersion(u32),

    /// The index table is malformed.
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// Unsupported compression kind tag.
    #[error("unsupported compression kind: {0}")]
    UnsupportedCompression(u8),

    /// Decompressed output length disagrees with the declared size.
    #[error("decompressed size mismatch: expected {expected} bytes, got {actual}")]
    DecompressionMismatch { expected: usize, actual: usize },

    /// Declared uncompressed size exceeds the sanity cap.
    #[error("uncompressed size {size} exceeds limit of {limit} bytes")]
    SizeLimitExceeded { size: u64, limit: u64 },

    /// Decompression failed.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// No index entry with the given content id.
    #[error("entry not found: {0:#018x}")]
    EntryNotFound(u64),
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;
