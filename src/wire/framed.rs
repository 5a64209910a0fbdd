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

//! Framed read/write over an async byte stream (spec §4.B).

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::header::{decode_header, encode_header, Algorithm, Header, COMPRESSED_HEADER_LEN, UNCOMPRESSED_HEADER_LEN};
use crate::error::{WireError, WireErrorKind};

/// Read one framed message from `stream`, returning its header and raw
/// payload bytes (still compressed, if `header.compressed`).
pub async fn read_message<R: AsyncRead + Unpin>(stream: &mut R) -> Result<(Header, Vec<u8>), WireError> {
    let mut header_buf = vec![0u8; UNCOMPRESSED_HEADER_LEN];
    stream
        .read_exact(&mut header_buf)
        .await
        .map_err(|_| WireError::from(WireErrorKind::IoError))?;

    // Peek the compression bit without a full header parse yet — we may
    // need four more header bytes before `decode_header` can run.
    let compressed = header_buf[0] & 0x80 != 0;
    if compressed {
        header_buf.resize(COMPRESSED_HEADER_LEN, 0);
        stream
            .read_exact(&mut header_buf[UNCOMPRESSED_HEADER_LEN..COMPRESSED_HEADER_LEN])
            .await
            .map_err(|_| WireError::from(WireErrorKind::IoError))?;
    }

    let header = decode_header(&header_buf)?;

    let mut payload = vec![0u8; header.payload_size as usize];
    stream
        .read_exact(&mut payload)
        .await
        .map_err(|_| WireError::from(WireErrorKind::IoError))?;

    Ok((header, payload))
}

/// Write an uncompressed framed message.
pub async fn write_message<W: AsyncWrite + Unpin>(
    stream: &mut W,
    message_type: u16,
    payload: &[u8],
) -> Result<(), WireError> {
    let payload_size: u32 = payload
        .len()
        .try_into()
        .map_err(|_| WireError::from(WireErrorKind::MessageTooLarge))?;

    let mut header_buf = [0u8; UNCOMPRESSED_HEADER_LEN];
    encode_header(&mut header_buf, payload_size, message_type, None, None)?;

    stream
        .write_all(&header_buf)
        .await
        .map_err(|_| WireError::from(WireErrorKind::IoError))?;
    stream
        .write_all(payload)
        .await
        .map_err(|_| WireError::from(WireErrorKind::IoError))?;
    Ok(())
}

/// Write a compressed framed message. `compressed_payload` is the already
/// LZ4-compressed block; `uncompressed_size` is the size it expands to.
pub async fn write_message_compressed<W: AsyncWrite + Unpin>(
    stream: &mut W,
    message_type: u16,
    compressed_payload: &[u8],
    uncompressed_size: u32,
) -> Result<(), WireError> {
    let payload_size: u32 = compressed_payload
        .len()
        .try_into()
        .map_err(|_| WireError::from(WireErrorKind::MessageTooLarge))?;

    let mut header_buf = [0u8; COMPRESSED_HEADER_LEN];
    encode_header(
        &mut header_buf,
        payload_size,
        message_type,
        Some(Algorithm::Lz4),
        Some(uncompressed_size),
    )?;

    stream
        .write_all(&header_buf)
        .await
        .map_err(|_| WireError::from(WireErrorKind::IoError))?;
    stream
        .write_all(compressed_payload)
        .await
        .map_err(|_| WireError::from(WireErrorKind::IoError))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn uncompressed_round_trip() {
        let mut buf = Vec::new();
        write_message(&mut buf, 32, b"hello").await.expect("write");

        let mut cursor = Cursor::new(buf);
        let (header, payload) = read_message(&mut cursor).await.expect("read");
        assert_eq!(header.message_type, 32);
        assert!(!header.compressed);
        assert_eq!(payload, b"hello");
    }

    #[tokio::test]
    async fn compressed_round_trip() {
        let mut buf = Vec::new();
        write_message_compressed(&mut buf, 15, &[1, 2, 3, 4], 9000)
            .await
            .expect("write");

        let mut cursor = Cursor::new(buf);
        let (header, payload) = read_message(&mut cursor).await.expect("read");
        assert_eq!(header.message_type, 15);
        assert!(header.compressed);
        assert_eq!(header.uncompressed_size, Some(9000));
        assert_eq!(payload, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn truncated_stream_is_an_io_error() {
        let mut cursor = Cursor::new(vec![0u8; 3]);
        let err = read_message(&mut cursor).await.unwrap_err();
        assert_eq!(err.kind, WireErrorKind::IoError);
    }
}
