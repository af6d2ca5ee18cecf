//! Nightwave - Cyberpunk 2077 audio extraction library.
//!
//! This crate provides a unified interface to the Nightwave library
//! ecosystem for pulling music and sound out of REDengine archives.
//!
//! # Crates
//!
//! - [`nightwave_common`] - Common utilities (binary reading, FNV-1a ids)
//! - [`nightwave_archive`] - RDAR archive reading (index + LZ4 payloads)
//! - [`nightwave_bnk`] - Wwise soundbank (`.bnk`) demuxing
//! - [`nightwave_wem`] - Wwise stream (`.wem`) extraction and decoding
//!
//! # Example
//!
//! ```no_run
//! use nightwave::prelude::*;
//!
//! // Open an archive and enumerate its audio.
//! let session = ExtractionSession::open("audio_2_soundbanks.archive")?;
//!
//! for info in session.list_audio_entries() {
//!     println!("{:#018x} {:?}: {}", info.content_id, info.wem_id, info.codec);
//! }
//!
//! // Extract everything, bit-exact.
//! let cancel = CancelToken::new();
//! for outcome in session.extract_all(ExtractMode::PassThrough, &cancel) {
//!     match outcome.result {
//!         Ok(audio) => println!("{} bytes", audio.payload.len()),
//!         Err(e) => eprintln!("{:#018x}: {e}", outcome.content_id),
//!     }
//! }
//! # Ok::<(), nightwave::ExtractError>(())
//! ```

// Re-export all sub-crates
pub use nightwave_archive as archive;
pub use nightwave_bnk as bnk;
pub use nightwave_common as common;
pub use nightwave_wem as wem;

mod dictionary;
mod error;
mod session;

pub use dictionary::PathDictionary;
pub use error::{ExtractError, Result};
pub use session::{
    AudioEntryInfo, CancelToken, ExtractMode, ExtractedAudio, ExtractionSession, ItemOutcome,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        AudioEntryInfo, CancelToken, ExtractError, ExtractMode, ExtractedAudio,
        ExtractionSession, ItemOutcome, PathDictionary,
    };
    pub use nightwave_archive::{Archive, CompressionKind, IndexEntry};
    pub use nightwave_bnk::SoundBank;
    pub use nightwave_common::{fnv, BinaryReader};
    pub use nightwave_wem::{Codec, WemStream};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
