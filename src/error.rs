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

//! Error kinds shared across the wire, codec, and dispatch layers.
//!
//! Each subsystem keeps its own `*Error` enum (matching the rest of this
//! crate's per-module convention) but the leaf variants are all drawn from
//! here so callers can match on a closed, crate-wide vocabulary of failure
//! modes without every module re-declaring the same strings.

use thiserror::Error;

/// Wire-level and codec-level failure kinds.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WireErrorKind {
    /// Declared or requested payload size exceeds the protocol ceiling.
    #[error("message too large")]
    MessageTooLarge,
    /// Header fields are internally inconsistent.
    #[error("invalid header")]
    InvalidHeader,
    /// Fewer bytes were available than the header requires.
    #[error("truncated")]
    Truncated,
    /// The header names a compression algorithm this crate does not implement.
    #[error("unknown compression algorithm")]
    UnknownCompression,
    /// Block compression failed.
    #[error("compression failed")]
    CompressionFailed,
    /// Block decompression failed or produced an unexpected size.
    #[error("decompression failed")]
    DecompressionFailed,
    /// The message type is not part of the closed enumeration this crate decodes.
    #[error("unknown message type")]
    UnknownMessageType,
    /// Payload bytes did not decode as the declared message type.
    #[error("decode failed")]
    DecodeFailed,
    /// The buffer supplied by the caller could not hold the result.
    #[error("buffer too small")]
    BufferTooSmall,
    /// Underlying I/O failure on the framed stream.
    #[error("io error")]
    IoError,
}

/// A small, destination-agnostic byte-buffer-too-small / too-large report
/// attached to [`WireErrorKind`] for callers that want the numbers, not just
/// the kind.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{kind}")]
pub struct WireError {
    /// The kind of failure.
    pub kind: WireErrorKind,
}

impl From<WireErrorKind> for WireError {
    fn from(kind: WireErrorKind) -> Self {
        Self { kind }
    }
}

/// Configuration validation failures (spec §6).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_peers` must be greater than zero.
    #[error("max_peers must be > 0")]
    MaxPeersZero,
    /// `max_inbound + max_outbound` exceeds `max_peers`.
    #[error("max_inbound + max_outbound exceeds max_peers")]
    InboundOutboundExceedsMaxPeers,
    /// `connect_timeout` must be positive.
    #[error("connect_timeout must be positive")]
    ConnectTimeoutNotPositive,
    /// `handshake_timeout` must be positive.
    #[error("handshake_timeout must be positive")]
    HandshakeTimeoutNotPositive,
    /// A clock capability was not supplied.
    #[error("clock is required")]
    ClockMissing,
    /// The TOML document could not be parsed.
    #[error("failed to parse config")]
    Parse,
    /// The config file could not be read.
    #[error("failed to read config file")]
    Read,
}

/// Resource-admission failure (boolean in spec terms; kept as a unit type
/// so call sites read as `Result<(), ResourceRejected>`).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("charge rejected: over limit")]
pub struct ResourceRejected;

/// Boot-cache persistence failures (spec §4.I, §7).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BootCacheError {
    /// The cache file could not be read.
    #[error("failed to read boot cache")]
    Read,
    /// The cache file's contents did not parse as JSON.
    #[error("failed to parse boot cache")]
    Parse,
    /// The in-memory table could not be serialized.
    #[error("failed to serialize boot cache")]
    Serialize,
    /// The cache file could not be written.
    #[error("failed to write boot cache")]
    Write,
}

/// Reservation-table persistence failures (spec §4.K, §7).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReservationError {
    /// The reservation file could not be read.
    #[error("failed to read reservation table")]
    Read,
    /// The reservation file's contents did not parse as JSON.
    #[error("failed to parse reservation table")]
    Parse,
    /// The in-memory table could not be serialized.
    #[error("failed to serialize reservation table")]
    Serialize,
    /// The reservation file could not be written.
    #[error("failed to write reservation table")]
    Write,
}

/// Dispatch-layer failures (spec §4.D, §7).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The wire-level decode failed.
    #[error(transparent)]
    Wire(#[from] WireError),
    /// A registered handler rejected the message.
    #[error("handler rejected message")]
    HandlerRejected,
}

/// Discovery-layer failures (spec §4.L, §7). Connect failures are recorded
/// in the boot cache and are never represented here — they are not fatal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryError {
    /// The supplied address could not be parsed into host/port.
    #[error("invalid address")]
    InvalidAddress,
}

/// Reduce-relay failures (spec §4.M, §7).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReduceRelayError {
    /// `update` was called before the bootup gate opened.
    #[error("reduce-relay is not ready (bootup gate still closed)")]
    NotReady,
}
