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

//! LZ4 block compression, gated to skip blocks that are not worth the
//! round-trip (spec §4.A).

use crate::error::{WireError, WireErrorKind};

/// Below this many bytes, compression is never attempted.
pub const MIN_COMPRESSIBLE_SIZE: usize = 70;

/// Compress `input`, returning `None` when compression is not worthwhile:
/// input shorter than [`MIN_COMPRESSIBLE_SIZE`], the codec reports an
/// incompressible block, or the compressed output is not smaller than the
/// input.
pub fn compress(input: &[u8]) -> Option<Vec<u8>> {
    if input.len() < MIN_COMPRESSIBLE_SIZE {
        return None;
    }

    let out = lz4_flex::block::compress(input);
    if out.is_empty() {
        return None;
    }
    if out.len() >= input.len() {
        return None;
    }
    Some(out)
}

/// Decompress `input`, which must expand to exactly `expected_uncompressed_size`
/// bytes.
pub fn decompress(input: &[u8], expected_uncompressed_size: usize) -> Result<Vec<u8>, WireError> {
    if expected_uncompressed_size == 0 {
        return Err(WireErrorKind::DecompressionFailed.into());
    }

    let out = lz4_flex::block::decompress(input, expected_uncompressed_size)
        .map_err(|_| WireError::from(WireErrorKind::DecompressionFailed))?;

    if out.len() != expected_uncompressed_size {
        return Err(WireErrorKind::DecompressionFailed.into());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_never_compressed() {
        let input = vec![0x42u8; MIN_COMPRESSIBLE_SIZE - 1];
        assert!(compress(&input).is_none());
    }

    #[test]
    fn compressible_input_round_trips() {
        let input = vec![0x41u8; 4096];
        let compressed = compress(&input).expect("should compress");
        assert!(compressed.len() < input.len());
        let back = decompress(&compressed, input.len()).expect("should decompress");
        assert_eq!(back, input);
    }

    #[test]
    fn random_input_may_skip_or_shrink() {
        // A pseudo-random-looking buffer: either compress() declines, or the
        // result is strictly smaller than the input (spec §8 scenario 2).
        let input: Vec<u8> = (0..1000u32).map(|i| (i.wrapping_mul(2654435761) >> 24) as u8).collect();
        match compress(&input) {
            None => {}
            Some(c) => assert!(c.len() < input.len()),
        }
    }

    #[test]
    fn decompress_rejects_zero_expected_size() {
        assert!(decompress(&[], 0).is_err());
    }

    #[test]
    fn decompress_rejects_size_mismatch() {
        let input = vec![0x7au8; 256];
        let compressed = compress(&input).expect("should compress");
        assert!(decompress(&compressed, input.len() + 1).is_err());
    }
}
