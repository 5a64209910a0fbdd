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

//! Per-validator relay squelching (spec §4.M): picks a small set of peers
//! to keep relaying each validator's messages and squelches the rest.

pub mod container;
pub mod slot;

pub use container::ReduceRelayContainer;
pub use slot::{PeerRelayState, SlotState, ValidatorSlot};

use libp2p::PeerId;

/// A window considered idle: no message from a peer within this long means
/// it is no longer "active" for candidate selection or is reapable.
pub const IDLED_SECS: u64 = 8;
/// Message count a peer must exceed to enter the `considered` set.
pub const MAX_MESSAGE_THRESHOLD: u32 = 20;
/// How many peers are kept `Selected` per validator.
pub const DEFAULT_MAX_SELECTED_PEERS: usize = 5;
/// Inactivity window after which a validator's slot resets to `Counting`.
pub const INACTIVITY_RESET_SECS: u64 = 2 * 600;
/// Baseline squelch-duration cap component, scaled by peer count.
pub const SQUELCH_PER_PEER_SECS: u64 = 10;
/// How long the container ignores `update` calls after construction.
pub const WAIT_ON_BOOTUP_SECS: u64 = 10 * 60;

/// Squelch/unsquelch and ignored-squelch notifications, injected at
/// construction (spec §9).
pub trait ReduceRelayEvents: Send + Sync {
    /// `peer` was put into `Squelched` for `validator`, for `duration_secs`.
    fn on_squelch(&self, validator: &[u8], peer: PeerId, duration_secs: u64);
    /// `peer` was taken out of `Squelched` for `validator` (peer removal
    /// unsquelching everyone, spec §4.M "Peer removal").
    fn on_unsquelch(&self, validator: &[u8], peer: PeerId);
    /// A message from an already-`Squelched` peer was dropped from
    /// counting.
    fn on_ignored_squelch(&self, validator: &[u8], peer: PeerId) {
        let (_, _) = (validator, peer);
    }
}
