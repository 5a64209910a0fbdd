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

//! Endpoint-gossip handler (spec §4.D, §8 scenario 3).
//!
//! Relayed hop counts are incremented by one hop at receipt before the
//! strictly-less gate is applied, and an entry whose incremented hop count
//! exceeds [`crate::discovery::MAX_HOPS`] is dropped outright rather than
//! clamped — a relay never re-advertises a peer it would itself refuse to
//! dial. Accepted entries are forwarded to discovery over an injected
//! sink so this handler owns gossip-relay bookkeeping without reaching
//! into [`crate::discovery::Discovery`] directly (spec §9).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use crate::capability::Clock;
use crate::discovery::{PeerSource, MAX_HOPS};
use crate::dispatch::MessageHandler;
use crate::error::DispatchError;
use crate::message::Message;
use libp2p::PeerId;
use std::sync::Arc;

/// Where accepted, hop-incremented endpoints are forwarded (spec §9).
pub trait EndpointsSink: Send + Sync {
    /// `addr` was learned at `hops` hops from the gossiping peer.
    fn add_peer(&self, addr: &str, hops: u32, source: PeerSource);
}

impl EndpointsSink for crate::discovery::Discovery {
    fn add_peer(&self, addr: &str, hops: u32, source: PeerSource) {
        crate::discovery::Discovery::add_peer(self, addr, hops, source)
    }
}

struct Entry {
    hops: u32,
    last_seen: Instant,
}

/// Relay-local view of gossiped endpoints (spec §4.D).
pub struct EndpointsHandler {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EndpointsSink>,
    endpoints: Mutex<HashMap<String, Entry>>,
}

impl EndpointsHandler {
    /// A handler forwarding accepted endpoints to `sink`.
    pub fn new(clock: Arc<dyn Clock>, sink: Arc<dyn EndpointsSink>) -> Self {
        Self { clock, sink, endpoints: Mutex::new(HashMap::new()) }
    }

    /// The hop count this handler has stored for `addr`, if any.
    pub fn hops_of(&self, addr: &str) -> Option<u32> {
        self.endpoints.lock().expect("endpoints handler lock poisoned").get(addr).map(|e| e.hops)
    }
}

impl MessageHandler for EndpointsHandler {
    fn handle(&self, _peer: &PeerId, message: &Message) -> Result<(), DispatchError> {
        let Message::Endpoints(batch) = message else { return Ok(()) };
        let now = self.clock.now();
        for entry in &batch.endpoints_v2 {
            let hops = entry.hops + 1;
            if hops > MAX_HOPS {
                continue;
            }
            let mut endpoints = self.endpoints.lock().expect("endpoints handler lock poisoned");
            let accept = match endpoints.get(&entry.endpoint) {
                Some(existing) => hops < existing.hops,
                None => true,
            };
            endpoints
                .entry(entry.endpoint.clone())
                .and_modify(|e| {
                    if hops < e.hops {
                        e.hops = hops;
                    }
                    e.last_seen = now;
                })
                .or_insert(Entry { hops, last_seen: now });
            drop(endpoints);
            if accept {
                self.sink.add_peer(&entry.endpoint, hops, PeerSource::Gossip);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::model::{Endpoint, Endpoints};
    use crate::test_support::FakeClock;
    use std::sync::Mutex as StdMutex;

    struct RecordingSink {
        calls: StdMutex<Vec<(String, u32)>>,
    }
    impl EndpointsSink for RecordingSink {
        fn add_peer(&self, addr: &str, hops: u32, _source: PeerSource) {
            self.calls.lock().unwrap().push((addr.to_string(), hops));
        }
    }

    fn batch(entries: &[(&str, u32)]) -> Message {
        Message::Endpoints(Endpoints {
            endpoints_v2: entries.iter().map(|(addr, hops)| Endpoint { endpoint: addr.to_string(), hops: *hops }).collect(),
            version: 2,
        })
    }

    #[test]
    fn hops_increment_on_receipt_and_only_lower() {
        let clock = Arc::new(FakeClock::new());
        let sink = Arc::new(RecordingSink { calls: StdMutex::new(Vec::new()) });
        let handler = EndpointsHandler::new(clock, sink.clone());
        let peer = PeerId::random();

        handler.handle(&peer, &batch(&[("A", 0), ("B", 1)])).unwrap();
        assert_eq!(handler.hops_of("A"), Some(1));
        assert_eq!(handler.hops_of("B"), Some(2));

        handler.handle(&peer, &batch(&[("A", 3)])).unwrap();
        assert_eq!(handler.hops_of("A"), Some(1));

        assert_eq!(sink.calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn hops_exceeding_max_hops_are_dropped() {
        let clock = Arc::new(FakeClock::new());
        let sink = Arc::new(RecordingSink { calls: StdMutex::new(Vec::new()) });
        let handler = EndpointsHandler::new(clock, sink.clone());
        let peer = PeerId::random();

        handler.handle(&peer, &batch(&[("C", MAX_HOPS)])).unwrap();
        assert_eq!(handler.hops_of("C"), None);
        assert!(sink.calls.lock().unwrap().is_empty());
    }
}
