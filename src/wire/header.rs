// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Bit-exact wire header pack/parse (spec §4.B, §6).
//!
//! Layout of the leading 32-bit big-endian word: bit 31 is the compressed
//! flag, bits 30-28 the algorithm, bits 27-26 reserved (always zero), bits
//! 25-0 the payload size. On byte 0 that is `(compressed << 7) | (algorithm
//! << 4) | (top two bits of size)` — the reference implementation builds
//! byte 0 as `0x80 | (alg << 4)` plus those size bits, and this crate keeps
//! that exact layout for wire compatibility.

use crate::error::{WireError, WireErrorKind};

/// Maximum payload size the 26-bit size field can express.
pub const MAX_PAYLOAD_SIZE: u32 = (1 << 26) - 1;

/// Hard decode-time ceiling (64 MiB). Structurally unreachable given
/// [`MAX_PAYLOAD_SIZE`], but checked explicitly to match spec §4.B.
pub const HARD_PAYLOAD_CEILING: u64 = 64 * 1024 * 1024;

/// Header size for an uncompressed frame.
pub const UNCOMPRESSED_HEADER_LEN: usize = 6;
/// Header size for a compressed frame.
pub const COMPRESSED_HEADER_LEN: usize = 10;

/// Block compression algorithms known to this codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// LZ4 block compression.
    Lz4 = 1,
}

impl Algorithm {
    fn from_bits(bits: u32) -> Result<Self, WireError> {
        match bits {
            1 => Ok(Algorithm::Lz4),
            _ => Err(WireErrorKind::UnknownCompression.into()),
        }
    }
}

/// A decoded frame header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Declared payload size in bytes (the on-wire, possibly compressed size).
    pub payload_size: u32,
    /// The message type carried in this frame.
    pub message_type: u16,
    /// Whether this frame is compressed.
    pub compressed: bool,
    /// Compression algorithm, present iff `compressed`.
    pub algorithm: Option<Algorithm>,
    /// Uncompressed payload size, present iff `compressed`.
    pub uncompressed_size: Option<u32>,
}

impl Header {
    /// Number of header bytes this header occupies on the wire.
    pub fn wire_len(&self) -> usize {
        if self.compressed {
            COMPRESSED_HEADER_LEN
        } else {
            UNCOMPRESSED_HEADER_LEN
        }
    }
}

/// Encode a frame header into `buf`, returning the number of bytes written.
///
/// `algorithm` and `uncompressed_size` must both be `Some` for a compressed
/// frame and both `None` for an uncompressed one; a mismatch is an
/// [`WireErrorKind::InvalidHeader`].
pub fn encode_header(
    buf: &mut [u8],
    payload_size: u32,
    message_type: u16,
    algorithm: Option<Algorithm>,
    uncompressed_size: Option<u32>,
) -> Result<usize, WireError> {
    if payload_size > MAX_PAYLOAD_SIZE {
        return Err(WireErrorKind::MessageTooLarge.into());
    }
    if algorithm.is_some() != uncompressed_size.is_some() {
        return Err(WireErrorKind::InvalidHeader.into());
    }

    let required = if algorithm.is_some() {
        COMPRESSED_HEADER_LEN
    } else {
        UNCOMPRESSED_HEADER_LEN
    };
    if buf.len() < required {
        return Err(WireErrorKind::BufferTooSmall.into());
    }

    let compressed_bit: u32 = if algorithm.is_some() { 1 } else { 0 };
    let algo_bits: u32 = algorithm.map(|a| a as u32).unwrap_or(0);
    let word: u32 = (compressed_bit << 31) | (algo_bits << 28) | (payload_size & MAX_PAYLOAD_SIZE);

    buf[0..4].copy_from_slice(&word.to_be_bytes());
    buf[4..6].copy_from_slice(&message_type.to_be_bytes());

    if let Some(uncompressed) = uncompressed_size {
        buf[6..10].copy_from_slice(&uncompressed.to_be_bytes());
    }

    Ok(required)
}

/// Parse a frame header from the front of `buf`. `buf` may be longer than
/// the header; only the prefix is consumed.
pub fn decode_header(buf: &[u8]) -> Result<Header, WireError> {
    if buf.len() < UNCOMPRESSED_HEADER_LEN {
        return Err(WireErrorKind::Truncated.into());
    }

    let mut word_bytes = [0u8; 4];
    word_bytes.copy_from_slice(&buf[0..4]);
    let word = u32::from_be_bytes(word_bytes);

    let compressed = (word >> 31) & 1 == 1;
    let algo_bits = (word >> 28) & 0x7;
    let payload_size = word & MAX_PAYLOAD_SIZE;

    if compressed && buf.len() < COMPRESSED_HEADER_LEN {
        return Err(WireErrorKind::Truncated.into());
    }

    let message_type = u16::from_be_bytes([buf[4], buf[5]]);

    if payload_size as u64 > HARD_PAYLOAD_CEILING {
        return Err(WireErrorKind::MessageTooLarge.into());
    }

    let (algorithm, uncompressed_size) = if compressed {
        let algo = Algorithm::from_bits(algo_bits)?;
        let mut size_bytes = [0u8; 4];
        size_bytes.copy_from_slice(&buf[6..10]);
        (Some(algo), Some(u32::from_be_bytes(size_bytes)))
    } else {
        (None, None)
    };

    Ok(Header {
        payload_size,
        message_type,
        compressed,
        algorithm,
        uncompressed_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_header_round_trips() {
        let mut buf = [0u8; COMPRESSED_HEADER_LEN];
        let n = encode_header(&mut buf, 1000, 32, Some(Algorithm::Lz4), Some(5000)).expect("encode");
        assert_eq!(n, COMPRESSED_HEADER_LEN);

        let header = decode_header(&buf).expect("decode");
        assert_eq!(header.payload_size, 1000);
        assert_eq!(header.message_type, 32);
        assert!(header.compressed);
        assert_eq!(header.algorithm, Some(Algorithm::Lz4));
        assert_eq!(header.uncompressed_size, Some(5000));
    }

    #[test]
    fn uncompressed_header_round_trips() {
        let mut buf = [0u8; UNCOMPRESSED_HEADER_LEN];
        let n = encode_header(&mut buf, 42, 3, None, None).expect("encode");
        assert_eq!(n, UNCOMPRESSED_HEADER_LEN);

        let header = decode_header(&buf).expect("decode");
        assert_eq!(header.payload_size, 42);
        assert_eq!(header.message_type, 3);
        assert!(!header.compressed);
        assert_eq!(header.algorithm, None);
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let mut buf = [0u8; COMPRESSED_HEADER_LEN];
        let err = encode_header(&mut buf, MAX_PAYLOAD_SIZE + 1, 1, None, None).unwrap_err();
        assert_eq!(err.kind, WireErrorKind::MessageTooLarge);
    }

    #[test]
    fn encode_rejects_buffer_too_small() {
        let mut buf = [0u8; 5];
        let err = encode_header(&mut buf, 1, 1, None, None).unwrap_err();
        assert_eq!(err.kind, WireErrorKind::BufferTooSmall);
    }

    #[test]
    fn decode_rejects_truncated_uncompressed() {
        let buf = [0u8; 5];
        let err = decode_header(&buf).unwrap_err();
        assert_eq!(err.kind, WireErrorKind::Truncated);
    }

    #[test]
    fn decode_rejects_truncated_compressed() {
        let mut buf = [0u8; COMPRESSED_HEADER_LEN];
        encode_header(&mut buf, 10, 1, Some(Algorithm::Lz4), Some(20)).unwrap();
        let err = decode_header(&buf[0..6]).unwrap_err();
        assert_eq!(err.kind, WireErrorKind::Truncated);
    }

    #[test]
    fn decode_rejects_unknown_algorithm() {
        let mut buf = [0u8; COMPRESSED_HEADER_LEN];
        // Hand-craft a header with compressed bit set and algorithm = 3 (unknown).
        let word: u32 = (1u32 << 31) | (3u32 << 28) | 10;
        buf[0..4].copy_from_slice(&word.to_be_bytes());
        buf[4..6].copy_from_slice(&1u16.to_be_bytes());
        buf[6..10].copy_from_slice(&20u32.to_be_bytes());

        let err = decode_header(&buf).unwrap_err();
        assert_eq!(err.kind, WireErrorKind::UnknownCompression);
    }

    #[test]
    fn byte_zero_matches_reference_bit_layout() {
        let mut buf = [0u8; COMPRESSED_HEADER_LEN];
        encode_header(&mut buf, 0, 0, Some(Algorithm::Lz4), Some(0)).unwrap();
        // 0x80 (compressed) | (1 << 4) (algorithm) | top size bits (0 here).
        assert_eq!(buf[0], 0x80 | (1 << 4));
    }
}
