//! Decompression of archive payload buffers.
//!
//! Compressed buffers carry a small preamble identifying the codec:
//! `XLZ4` buffers (written by the modding ecosystem in place of Oodle)
//! are LZ4 block data prefixed with the magic and the uncompressed size.

use nightwave_common::BinaryReader;

use crate::{Error, Result};

/// Magic prefix of an LZ4-compressed payload buffer.
pub const XLZ4_MAGIC: [u8; 4] = *b"XLZ4";

/// Decompress an `XLZ4` buffer with a known output size.
///
/// The preamble's declared size must agree with the index entry, and the
/// decompressed output must match it exactly.
pub fn decompress_lz4(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut reader = BinaryReader::new(data);
    reader.expect_magic(&XLZ4_MAGIC)?;

    let declared = reader.read_u32()? as usize;
    if declared != expected_size {
        return Err(Error::DecompressionMismatch {
            expected: expected_size,
            actual: declared,
        });
    }

    let output = lz4_flex::block::decompress(reader.remaining_bytes(), expected_size)
        .map_err(|e| Error::Decompression(e.to_string()))?;

    if output.len() != expected_size {
        return Err(Error::DecompressionMismatch {
            expected: expected_size,
            actual: output.len(),
        });
    }

    Ok(output)
}

/// Build an `XLZ4` buffer from raw bytes.
///
/// Extraction never writes archives; this exists for constructing test
/// fixtures and round-trip checks.
pub fn compress_lz4(data: &[u8]) -> Vec<u8> {
    let block = lz4_flex::block::compress(data);
    let mut output = Vec::with_capacity(8 + block.len());
    output.extend_from_slice(&XLZ4_MAGIC);
    output.extend_from_slice(&(data.len() as u32).to_le_bytes());
    output.extend_from_slice(&block);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lz4_roundtrip() {
        let original = b"Hello, Night City! This is a test of LZ4 block compression.";

        let compressed = compress_lz4(original);
        let decompressed = decompress_lz4(&compressed, original.len()).unwrap();

        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_declared_size_mismatch() {
        let compressed = compress_lz4(b"payload bytes");

        assert!(matches!(
            decompress_lz4(&compressed, 999),
            Err(Error::DecompressionMismatch {
                expected: 999,
                actual: 13
            })
        ));
    }

    #[test]
    fn test_bad_preamble() {
        let mut compressed = compress_lz4(b"payload bytes");
        compressed[0] = b'Z';

        assert!(decompress_lz4(&compressed, 13).is_err());
    }

    #[test]
    fn test_corrupt_block() {
        let mut compressed = compress_lz4(b"some reasonably long payload to corrupt");
        let last = compressed.len() - 1;
        compressed.truncate(last);

        assert!(decompress_lz4(&compressed, 39).is_err());
    }
}
