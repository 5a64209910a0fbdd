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

//! End-to-end scenarios mirroring concrete worked examples: header
//! round-trip, endpoint gossip hop gating, boot-cache prioritization, and
//! reduce-relay peer selection.

use std::sync::Arc;
use std::time::Duration;

use libp2p::PeerId;
use tempfile::tempdir;

use xrpl_peer_core::bootcache::BootCache;
use xrpl_peer_core::capability::Clock;
use xrpl_peer_core::discovery::{Discovery, DiscoveryEvents, PeerSource};
use xrpl_peer_core::dispatch::handlers::{EndpointsHandler, EndpointsSink};
use xrpl_peer_core::dispatch::{Dispatcher, MessageHandler};
use xrpl_peer_core::message::model::{Endpoint, Endpoints};
use xrpl_peer_core::message::{self, Message, MessageType};
use xrpl_peer_core::reduce_relay::{PeerRelayState, ReduceRelayContainer, ReduceRelayEvents};
use xrpl_peer_core::traffic::TrafficCounters;
use xrpl_peer_core::wire::header::{decode_header, encode_header, Algorithm};
use xrpl_peer_core::wire::{self, compress};

struct FakeClock {
    base: std::time::Instant,
    base_unix_ms: u64,
    offset_ms: std::sync::atomic::AtomicU64,
}

impl FakeClock {
    fn new() -> Self {
        Self { base: std::time::Instant::now(), base_unix_ms: 1_700_000_000_000, offset_ms: std::sync::atomic::AtomicU64::new(0) }
    }
    fn advance(&self, by: Duration) {
        self.offset_ms.fetch_add(by.as_millis() as u64, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> std::time::Instant {
        self.base + Duration::from_millis(self.offset_ms.load(std::sync::atomic::Ordering::SeqCst))
    }
    fn now_unix_ms(&self) -> u64 {
        self.base_unix_ms + self.offset_ms.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[test]
fn header_round_trip_compressed() {
    let mut buf = [0u8; 10];
    let len = encode_header(&mut buf, 1200, 30, Some(Algorithm::Lz4), Some(5000)).unwrap();
    assert_eq!(len, 10);
    let header = decode_header(&buf).unwrap();
    assert_eq!(header.payload_size, 1200);
    assert_eq!(header.message_type, 30);
    assert!(header.compressed);
    assert_eq!(header.algorithm, Some(Algorithm::Lz4));
    assert_eq!(header.uncompressed_size, Some(5000));
}

#[test]
fn compression_skip_scenario() {
    let short = vec![0x42u8; 69];
    assert!(compress::compress(&short).is_none());

    let pseudo_random: Vec<u8> = (0..1000u32).map(|i| (i.wrapping_mul(2654435761) >> 24) as u8).collect();
    match compress::compress(&pseudo_random) {
        None => {}
        Some(c) => assert!(c.len() < pseudo_random.len()),
    }
    assert!(wire::is_compression_eligible(30));
    assert!(!wire::is_compression_eligible(3));
}

#[test]
fn endpoint_gossip_hop_update_scenario() {
    struct NullEvents;
    impl DiscoveryEvents for NullEvents {
        fn on_connect(&self, _addr: &str) {}
    }

    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
    let dir = tempdir().unwrap();
    let boot_cache = Arc::new(BootCache::new(dir.path(), clock.clone()));
    let config = xrpl_peer_core::config::Config::default();
    let discovery = Arc::new(Discovery::new(&config, boot_cache, clock.clone(), Arc::new(NullEvents)));

    struct DiscoverySink(Arc<Discovery>);
    impl EndpointsSink for DiscoverySink {
        fn add_peer(&self, addr: &str, hops: u32, source: PeerSource) {
            self.0.add_peer(addr, hops, source);
        }
    }

    let handler = EndpointsHandler::new(clock, Arc::new(DiscoverySink(discovery.clone())));
    let peer = PeerId::random();

    let batch = Endpoints {
        endpoints_v2: vec![Endpoint { endpoint: "A".into(), hops: 0 }, Endpoint { endpoint: "B".into(), hops: 1 }],
        version: 2,
    };
    handler.handle(&peer, &Message::Endpoints(batch)).unwrap();
    assert_eq!(discovery.hops_of("A"), Some(1));
    assert_eq!(discovery.hops_of("B"), Some(2));

    handler
        .handle(&peer, &Message::Endpoints(Endpoints { endpoints_v2: vec![Endpoint { endpoint: "A".into(), hops: 3 }], version: 2 }))
        .unwrap();
    assert_eq!(discovery.hops_of("A"), Some(1));

    let at_max_hops = Endpoints { endpoints_v2: vec![Endpoint { endpoint: "C".into(), hops: xrpl_peer_core::discovery::MAX_HOPS }], version: 2 };
    handler.handle(&peer, &Message::Endpoints(at_max_hops)).unwrap();
    assert_eq!(discovery.hops_of("C"), None);
}

#[test]
fn boot_cache_prioritization_scenario() {
    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
    let dir = tempdir().unwrap();
    let cache = BootCache::new(dir.path(), clock);
    cache.insert("primary", 1);
    cache.insert("backup1", 1);
    cache.insert("backup2", 1);
    for _ in 0..10 {
        cache.mark_success("backup1", 1);
        cache.mark_success("backup2", 1);
    }

    let mut primary_hits = 0;
    for _ in 0..100 {
        let top = cache.get_endpoints(1);
        if top[0].addr == "primary" {
            primary_hits += 1;
        }
    }
    assert!(primary_hits <= 20, "primary selected {primary_hits}/100 times, expected <= 20%");

    for _ in 0..15 {
        cache.mark_failed("backup1", 1);
    }
    let top = cache.get_endpoints(3);
    let backup1 = top.iter().find(|e| e.addr == "backup1").unwrap();
    assert_eq!(backup1.valence, 0);
}

#[test]
fn reduce_relay_selection_scenario() {
    struct NullEvents;
    impl ReduceRelayEvents for NullEvents {
        fn on_squelch(&self, _validator: &[u8], _peer: PeerId, _duration_secs: u64) {}
        fn on_unsquelch(&self, _validator: &[u8], _peer: PeerId) {}
    }

    let clock = Arc::new(FakeClock::new());
    clock.advance(Duration::from_secs(11 * 60));
    let container = ReduceRelayContainer::new(clock.clone(), Arc::new(NullEvents));
    assert!(container.ready());

    let peers: Vec<PeerId> = (0..10).map(|_| PeerId::random()).collect();
    let mut hash = 0u64;
    for round in 0..21 {
        for peer in &peers {
            hash += 1;
            container.update(b"validator1", *peer, hash);
        }
        let _ = round;
    }

    let selected = peers.iter().filter(|p| container.peer_state(b"validator1", p) == Some(PeerRelayState::Selected)).count();
    let squelched = peers.iter().filter(|p| container.peer_state(b"validator1", p) == Some(PeerRelayState::Squelched)).count();
    assert_eq!(selected, 5);
    assert_eq!(squelched, 5);
}

#[test]
fn dispatcher_decodes_and_accounts_transaction_traffic() {
    let traffic = Arc::new(TrafficCounters::new());
    let dispatcher = Dispatcher::new(traffic.clone());
    let peer = PeerId::random();
    let payload = message::encode(&Message::Transaction(xrpl_peer_core::message::model::Transaction {
        raw_transaction: vec![1, 2, 3],
        status: None,
        receive_timestamp: None,
        deferred: None,
    }));
    dispatcher.dispatch(&peer, MessageType::Transaction, &payload, true).unwrap();
    let snapshot = traffic.snapshot(xrpl_peer_core::traffic::TrafficCategory::Transactions);
    assert_eq!(snapshot.messages, 1);
}
