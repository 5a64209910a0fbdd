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

//! Connection slot state machine (spec §4.H), plus its co-owned
//! recent-endpoints filter.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::capability::{Clock, PublicKeyBytes};
use crate::recent_endpoints::RecentEndpoints;

/// A connection slot's lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// An inbound connection that has not yet been accepted.
    Accept,
    /// An outbound connection that has not yet connected.
    Connect,
    /// Transport-connected, handshake not yet complete.
    Connected,
    /// Handshake complete; the peer's public key is known and the slot is
    /// exchanging application traffic.
    Active,
    /// Tearing down. Terminal: no transition leaves this state.
    Closing,
}

/// Which side initiated the connection this slot tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// We accepted an inbound connection.
    Inbound,
    /// We dialed an outbound connection.
    Outbound,
}

#[derive(Debug)]
struct Inner {
    state: SlotState,
    public_key: Option<PublicKeyBytes>,
    activated_at: Option<Instant>,
}

/// One connection's state container (spec §4.H). Co-owns a
/// [`RecentEndpoints`] filter, since both are scoped to a single peer
/// connection's lifetime (spec §3 Ownership).
pub struct Slot {
    direction: Direction,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
    recent_endpoints: RecentEndpoints,
}

impl Slot {
    /// A new slot in its direction-appropriate initial state
    /// (`Accept` for inbound, `Connect` for outbound).
    pub fn new(direction: Direction, clock: Arc<dyn Clock>) -> Self {
        let state = match direction {
            Direction::Inbound => SlotState::Accept,
            Direction::Outbound => SlotState::Connect,
        };
        Self {
            direction,
            clock,
            inner: Mutex::new(Inner { state, public_key: None, activated_at: None }),
            recent_endpoints: RecentEndpoints::new(),
        }
    }

    /// This slot's connection direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SlotState {
        self.inner.lock().expect("slot lock poisoned").state
    }

    /// The co-owned recent-endpoints filter (spec §4.H, §4.J).
    pub fn recent_endpoints(&self) -> &RecentEndpoints {
        &self.recent_endpoints
    }

    fn transition(&self, inner: &mut Inner, to: SlotState) -> Result<(), SlotError> {
        let allowed = match (inner.state, to) {
            (SlotState::Connect, SlotState::Connected) => true,
            (SlotState::Accept, SlotState::Connected) => true,
            (SlotState::Connected, SlotState::Active) => true,
            (_, SlotState::Closing) => inner.state != SlotState::Closing,
            _ => false,
        };
        if !allowed {
            return Err(SlotError::IllegalTransition { from: inner.state, to });
        }
        inner.state = to;
        Ok(())
    }

    /// Advance `Accept`/`Connect` to `Connected`.
    pub fn mark_connected(&self) -> Result<(), SlotError> {
        let mut inner = self.inner.lock().expect("slot lock poisoned");
        self.transition(&mut inner, SlotState::Connected)
    }

    /// Record the peer's public key, learned once the handshake completes.
    pub fn set_public_key(&self, key: PublicKeyBytes) {
        self.inner.lock().expect("slot lock poisoned").public_key = Some(key);
    }

    /// Advance `Connected` to `Active`. Requires a public key to already be
    /// set (spec §4.H); records `activated_at`.
    pub fn activate(&self) -> Result<(), SlotError> {
        let mut inner = self.inner.lock().expect("slot lock poisoned");
        if inner.public_key.is_none() {
            return Err(SlotError::NoPublicKey);
        }
        self.transition(&mut inner, SlotState::Active)?;
        inner.activated_at = Some(self.clock.now());
        Ok(())
    }

    /// Move to `Closing`. Idempotent failure: closing from `Closing` is
    /// rejected as an illegal transition since `Closing` is terminal.
    pub fn close(&self) -> Result<(), SlotError> {
        let mut inner = self.inner.lock().expect("slot lock poisoned");
        self.transition(&mut inner, SlotState::Closing)
    }

    /// When this slot became `Active`, if it ever did.
    pub fn activated_at(&self) -> Option<Instant> {
        self.inner.lock().expect("slot lock poisoned").activated_at
    }
}

/// Slot state-machine failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    /// The requested transition is not a legal forward move from the
    /// current state.
    #[error("illegal transition from {from:?} to {to:?}")]
    IllegalTransition {
        /// The state the slot was in.
        from: SlotState,
        /// The state the caller tried to move to.
        to: SlotState,
    },
    /// `activate()` was called before a public key was recorded.
    #[error("cannot activate without a public key")]
    NoPublicKey,
}
