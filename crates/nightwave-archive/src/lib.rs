//! REDengine archive (RDAR) reader for Cyberpunk 2077 game files.
//!
//! `.archive` containers pack game resources behind a fixed header and an
//! index table mapping 64-bit content identifiers (FNV-1a hashes of the
//! logical resource path) to payload byte ranges. This crate supports:
//!
//! - Header and version validation (`RDAR`, version 12)
//! - Checksummed index table parsing with duplicate-id rejection
//! - Uncompressed and LZ4 (`XLZ4` buffer) payloads
//! - Oodle Kraken payloads are recognized and reported as unsupported
//! - Memory-mapped or owned in-memory backing buffers
//!
//! # Example
//!
//! ```no_run
//! use nightwave_archive::Archive;
//!
//! let archive = Archive::open("audio_2_soundbanks.archive")?;
//!
//! for entry in archive.entries() {
//!     println!("{:#018x}: {} bytes", entry.id, entry.uncompressed_size);
//! }
//!
//! if let Some(entry) = archive.get(0x91ef6f3d43a2aa8f) {
//!     let block = archive.read(&entry)?;
//! }
//! # Ok::<(), nightwave_archive::Error>(())
//! ```

mod archive;
mod decompress;
mod error;
mod index;

pub use archive::{Archive, MAX_UNCOMPRESSED_SIZE};
pub use error::{Error, Result};
pub use index::{ArchiveHeader, CompressionKind, FileRecord, IndexEntry};
