//! Wwise soundbank (BNK) demuxer.
//!
//! Soundbanks are chunked containers: a sequence of 4-byte ASCII tags,
//! each followed by a little-endian length and payload. The chunks this
//! crate cares about are `BKHD` (bank header), `DIDX` (the media index:
//! one 12-byte record per embedded stream) and `DATA` (the concatenated
//! stream bytes). Everything else - `HIRC` event hierarchies, `STID`
//! name tables - is skipped by declared length, so newer bank revisions
//! demux without changes here.
//!
//! # Example
//!
//! ```
//! use nightwave_bnk::SoundBank;
//!
//! # fn example(block: &[u8]) -> Result<(), nightwave_bnk::Error> {
//! let bank = SoundBank::parse(block)?;
//! for entry in bank.entries() {
//!     let wem = bank.entry_bytes(entry);
//!     println!("{}: {} bytes", entry.id, wem.len());
//! }
//! # Ok(())
//! # }
//! ```

mod bank;
mod error;

pub use bank::{BankEntry, SoundBank};
pub use error::{Error, Result};
