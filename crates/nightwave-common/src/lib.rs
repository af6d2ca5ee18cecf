//! Common utilities for Nightwave.
//!
//! This crate provides foundational types and utilities used across all
//! Nightwave crates:
//!
//! - [`BinaryReader`] - Bounds-checked binary reading from byte slices
//! - [`fnv`] - FNV-1a 64 content-id hashing
//! - Shared error types for truncated or malformed input

mod error;
mod reader;

pub mod fnv;

pub use error::{Error, Result};
pub use reader::{BinaryReader, Endian};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
