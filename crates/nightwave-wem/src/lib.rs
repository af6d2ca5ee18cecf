//! Wwise audio stream (WEM) handling.
//!
//! WEM streams are self-contained RIFF containers with Wwise-specific
//! format tags in the `fmt ` chunk. This crate classifies the codec of a
//! stream and extracts it in one of two modes:
//!
//! - **Pass-through**: the stream bytes verbatim, bit-exact. A WEM is
//!   already a container common players recognize, so nothing needs to
//!   be synthesized around it.
//! - **Decode**: interleaved 16-bit PCM wrapped in a canonical WAV
//!   container. PCM and IMA ADPCM streams decode; Wwise Vorbis and Opus
//!   payloads are pass-through only (their framing is proprietary).

mod adpcm;
mod error;
mod extract;
mod stream;
mod wav;

pub use error::{Error, Result};
pub use extract::{decode, pass_through, AudioStream};
pub use stream::{Codec, WemStream};
pub use wav::{write_wav, write_wav_pcm16};
