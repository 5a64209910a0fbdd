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

//! Narrow capability interfaces the core depends on instead of reaching
//! into a collaborator's internals directly (handshake, TLS, signature
//! verification, RPC — see the crate's non-goals).

use libp2p::PeerId;
use std::{
    fmt,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

/// Injectable time source so state machines are deterministic under test.
///
/// Mirrors the `clock` configuration hook in spec §6: production code uses
/// [`SystemClock`], tests use a fixed or steppable fake.
pub trait Clock: Send + Sync {
    /// Monotonic instant, for durations/deadlines.
    fn now(&self) -> Instant;
    /// Wall-clock milliseconds since the UNIX epoch, for wire timestamps.
    fn now_unix_ms(&self) -> u64;
}

/// The real-time clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_unix_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Opaque public-key bytes, as reported by the connection collaborator once
/// a handshake it owns has completed. The core never performs the handshake
/// or verifies the key itself.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKeyBytes(pub Vec<u8>);

impl fmt::Debug for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyBytes({} bytes)", self.0.len())
    }
}

/// Identity facts the core needs about a connection, supplied by the
/// collaborator that actually ran the handshake.
pub trait PeerIdentitySource: Send + Sync {
    /// This node's own peer identifier.
    fn local_peer_id(&self) -> PeerId;

    /// The public key a given peer presented during handshake, if known.
    fn public_key_of(&self, peer: &PeerId) -> Option<PublicKeyBytes>;
}

/// A sink for messages a handler wants to emit, injected at construction
/// rather than reached for as a shared singleton (spec §9).
pub trait OutboundSink<M>: Send + Sync {
    /// Queue `message` for delivery to `peer`.
    fn send(&self, peer: PeerId, message: M);
}

/// An [`OutboundSink`] that discards everything, for handlers under test
/// that do not exercise the outbound path.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl<M> OutboundSink<M> for NullSink {
    fn send(&self, _peer: PeerId, _message: M) {}
}
