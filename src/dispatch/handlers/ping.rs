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

//! Keepalive ping/pong handler (spec §4.D).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use libp2p::PeerId;

use crate::capability::Clock;
use crate::dispatch::MessageHandler;
use crate::error::DispatchError;
use crate::message::model::PingType;
use crate::message::Message;

/// Notified of ping activity, e.g. to feed [`crate::score::PeerScore`]
/// (spec §9: injected, not reached for as a singleton).
pub trait PingEvents: Send + Sync {
    /// A pong carrying a measurable round trip arrived from `peer`.
    fn on_latency_sample(&self, peer: &PeerId, latency_ms: u64);
}

/// A [`PingEvents`] that discards every sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPingEvents;
impl PingEvents for NullPingEvents {
    fn on_latency_sample(&self, _peer: &PeerId, _latency_ms: u64) {}
}

/// Tracks `last_ping_time[peer]` and `latency[peer]` (spec §4.D).
pub struct PingHandler {
    clock: Arc<dyn Clock>,
    events: Arc<dyn PingEvents>,
    last_ping_time: Mutex<HashMap<PeerId, u64>>,
    latency: Mutex<HashMap<PeerId, u64>>,
}

impl PingHandler {
    /// A handler over the given clock, forwarding latency samples to
    /// `events`.
    pub fn new(clock: Arc<dyn Clock>, events: Arc<dyn PingEvents>) -> Self {
        Self { clock, events, last_ping_time: Mutex::new(HashMap::new()), latency: Mutex::new(HashMap::new()) }
    }

    /// The last time (ms since epoch) a `Ping` was received from `peer`.
    pub fn last_ping_time(&self, peer: &PeerId) -> Option<u64> {
        self.last_ping_time.lock().expect("ping handler lock poisoned").get(peer).copied()
    }

    /// The most recently computed round-trip latency (ms) for `peer`.
    pub fn latency_of(&self, peer: &PeerId) -> Option<u64> {
        self.latency.lock().expect("ping handler lock poisoned").get(peer).copied()
    }
}

impl MessageHandler for PingHandler {
    fn handle(&self, peer: &PeerId, message: &Message) -> Result<(), DispatchError> {
        let Message::Ping(ping) = message else { return Ok(()) };
        let now_ms = self.clock.now_unix_ms();
        match ping.kind {
            PingType::Ping => {
                self.last_ping_time.lock().expect("ping handler lock poisoned").insert(*peer, now_ms);
            }
            PingType::Pong => {
                if let Some(sent_ms) = ping.ping_time.filter(|&t| t != 0) {
                    let latency_ms = now_ms.saturating_sub(sent_ms);
                    self.latency.lock().expect("ping handler lock poisoned").insert(*peer, latency_ms);
                    self.events.on_latency_sample(peer, latency_ms);
                }
            }
        }
        Ok(())
    }
}
