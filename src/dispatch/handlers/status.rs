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

//! Peer status/phase-change handler (spec §4.D).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use libp2p::PeerId;

use crate::capability::Clock;
use crate::dispatch::MessageHandler;
use crate::error::DispatchError;
use crate::message::Message;

/// A peer's most recently reported status snapshot (spec §4.D).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerStatus {
    /// Reported status code.
    pub status: Option<u32>,
    /// Reported event code.
    pub event: Option<u32>,
    /// Current ledger sequence.
    pub ledger_seq: Option<u32>,
    /// Current ledger hash.
    pub ledger_hash: Option<Vec<u8>>,
    /// Sender's network time.
    pub network_time: Option<u64>,
    /// First ledger sequence the sender has.
    pub first_seq: Option<u32>,
    /// Last ledger sequence the sender has.
    pub last_seq: Option<u32>,
    /// When this snapshot was recorded (ms since epoch).
    pub updated_at: u64,
}

/// Stores the latest [`PeerStatus`] per peer (spec §4.D).
pub struct StatusChangeHandler {
    clock: Arc<dyn Clock>,
    statuses: Mutex<HashMap<PeerId, PeerStatus>>,
}

impl StatusChangeHandler {
    /// A handler over the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, statuses: Mutex::new(HashMap::new()) }
    }

    /// The latest status reported by `peer`, if any.
    pub fn status_of(&self, peer: &PeerId) -> Option<PeerStatus> {
        self.statuses.lock().expect("status handler lock poisoned").get(peer).cloned()
    }
}

impl MessageHandler for StatusChangeHandler {
    fn handle(&self, peer: &PeerId, message: &Message) -> Result<(), DispatchError> {
        let Message::StatusChange(change) = message else { return Ok(()) };
        let status = PeerStatus {
            status: change.new_status,
            event: change.new_event,
            ledger_seq: change.ledger_seq,
            ledger_hash: change.ledger_hash.clone(),
            network_time: change.network_time,
            first_seq: change.first_seq,
            last_seq: change.last_seq,
            updated_at: self.clock.now_unix_ms(),
        };
        self.statuses.lock().expect("status handler lock poisoned").insert(*peer, status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::model::StatusChange;
    use crate::test_support::FakeClock;

    #[test]
    fn records_latest_status_per_peer() {
        let clock = Arc::new(FakeClock::new());
        let handler = StatusChangeHandler::new(clock.clone());
        let peer = PeerId::random();
        handler
            .handle(
                &peer,
                &Message::StatusChange(StatusChange { new_status: Some(1), new_event: Some(2), ledger_seq: Some(10), ..Default::default() }),
            )
            .unwrap();
        let status = handler.status_of(&peer).unwrap();
        assert_eq!(status.status, Some(1));
        assert_eq!(status.ledger_seq, Some(10));
        assert_eq!(status.updated_at, clock.now_unix_ms());
    }
}
