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

//! Peer discovery (spec §4.L): known/connected peer bookkeeping and the
//! outbound-connection maintenance loop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use libp2p::PeerId;
use rand::seq::SliceRandom;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::bootcache::BootCache;
use crate::capability::Clock;
use crate::config::Config;

/// Maximum hop count a known peer may be stored at (spec §8 scenario 3).
pub const MAX_HOPS: u32 = 3;
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(30);
const MAX_CONNECT_ATTEMPTS_PER_SWEEP: usize = 3;

/// Where a known peer's address was learned from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerSource {
    /// Listed in `Config::bootstrap_peers`.
    Bootstrap,
    /// Listed in `Config::fixed_peers`.
    Fixed,
    /// Learned from another peer's endpoint gossip.
    Gossip,
}

#[derive(Clone, Debug)]
struct KnownPeer {
    hops: u32,
    last_seen: Instant,
    source: PeerSource,
}

/// A connect/disconnect event sink, injected at construction (spec §9).
pub trait DiscoveryEvents: Send + Sync {
    /// Fired once per address `try_connect_more` decides to dial.
    fn on_connect(&self, addr: &str);
    /// Fired when a previously connected peer disconnects.
    fn on_disconnect(&self, peer: &PeerId) {
        let _ = peer;
    }
}

struct State {
    known: RwLock<HashMap<String, KnownPeer>>,
    connected: RwLock<HashMap<PeerId, String>>,
}

/// Known/connected peer bookkeeping and outbound-connection maintenance
/// (spec §4.L).
pub struct Discovery {
    state: Arc<State>,
    boot_cache: Arc<BootCache>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn DiscoveryEvents>,
    max_outbound: usize,
    prune_horizon: Duration,
    shutdown_tx: Mutex<Option<watch::Sender<bool>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Discovery {
    /// A discovery component over the given boot cache, config, and event
    /// sink.
    pub fn new(config: &Config, boot_cache: Arc<BootCache>, clock: Arc<dyn Clock>, events: Arc<dyn DiscoveryEvents>) -> Self {
        Self {
            state: Arc::new(State { known: RwLock::new(HashMap::new()), connected: RwLock::new(HashMap::new()) }),
            boot_cache,
            clock,
            events,
            max_outbound: config.max_outbound as usize,
            prune_horizon: Duration::from_secs(24 * 60 * 60),
            shutdown_tx: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    /// Insert `addr` into the known-peer map, or lower its stored hop count
    /// if `hops` is smaller than what's already recorded. `last_seen` is
    /// always refreshed (spec §4.L, §8).
    pub fn add_peer(&self, addr: &str, hops: u32, source: PeerSource) {
        let now = self.clock.now();
        let mut known = self.state.known.write().expect("discovery known-map lock poisoned");
        known
            .entry(addr.to_string())
            .and_modify(|p| {
                if hops < p.hops {
                    p.hops = hops;
                }
                p.last_seen = now;
            })
            .or_insert(KnownPeer { hops, last_seen: now, source });
    }

    /// The hop count currently stored for `addr`, if known.
    pub fn hops_of(&self, addr: &str) -> Option<u32> {
        self.state.known.read().expect("discovery known-map lock poisoned").get(addr).map(|p| p.hops)
    }

    /// Record that `peer_id` is now connected at `addr`.
    pub fn mark_connected(&self, addr: &str, peer_id: PeerId) {
        self.state.connected.write().expect("discovery connected-map lock poisoned").insert(peer_id, addr.to_string());
    }

    /// Record that `peer_id` disconnected, firing the disconnect event.
    pub fn mark_disconnected(&self, peer_id: &PeerId) {
        let removed = self.state.connected.write().expect("discovery connected-map lock poisoned").remove(peer_id);
        if removed.is_some() {
            self.events.on_disconnect(peer_id);
        }
    }

    /// Number of currently connected peers.
    pub fn connected_count(&self) -> usize {
        self.state.connected.read().expect("discovery connected-map lock poisoned").len()
    }

    /// True if this node should try to connect to more peers (spec §4.L:
    /// `connected_count < max_outbound`).
    pub fn needs_more_peers(&self) -> bool {
        self.connected_count() < self.max_outbound
    }

    /// Up to `n` candidate addresses to dial: unconnected known peers with
    /// `hops <= MAX_HOPS`, augmented with the top of the boot cache,
    /// excluding already-connected addresses, in randomized order.
    pub fn select_peers_to_connect(&self, n: usize) -> Vec<String> {
        let connected: std::collections::HashSet<String> =
            self.state.connected.read().expect("discovery connected-map lock poisoned").values().cloned().collect();
        let mut candidates: Vec<String> = {
            let known = self.state.known.read().expect("discovery known-map lock poisoned");
            known
                .iter()
                .filter(|(addr, p)| p.hops <= MAX_HOPS && !connected.contains(*addr))
                .map(|(addr, _)| addr.clone())
                .collect()
        };
        for entry in self.boot_cache.get_endpoints(n) {
            let addr = format!("{}:{}", entry.addr, entry.port);
            if !connected.contains(&addr) && !candidates.contains(&addr) {
                candidates.push(addr);
            }
        }
        candidates.shuffle(&mut rand::thread_rng());
        candidates.truncate(n);
        candidates
    }

    /// Dial up to `MAX_CONNECT_ATTEMPTS_PER_SWEEP` candidates, firing the
    /// connect event per address.
    pub fn try_connect_more(&self) {
        if !self.needs_more_peers() {
            return;
        }
        for addr in self.select_peers_to_connect(MAX_CONNECT_ATTEMPTS_PER_SWEEP) {
            debug!(%addr, "discovery dialing candidate");
            self.events.on_connect(&addr);
        }
    }

    fn prune_known_locked(&self) {
        let now = self.clock.now();
        let horizon = self.prune_horizon;
        let connected: std::collections::HashSet<String> =
            self.state.connected.read().expect("discovery connected-map lock poisoned").values().cloned().collect();
        let mut known = self.state.known.write().expect("discovery known-map lock poisoned");
        known.retain(|addr, p| connected.contains(addr) || now.duration_since(p.last_seen) < horizon);
    }

    /// Seed the known-peer map from `bootstrap_peers`/`fixed_peers` and
    /// launch the maintenance loop (spec §4.L), stopped by [`Discovery::stop`].
    pub fn start(self: &Arc<Self>, config: &Config) {
        for addr in config.bootstrap_peers.iter().chain(config.fixed_peers.iter()) {
            self.add_peer(addr, 0, PeerSource::Bootstrap);
        }

        let (tx, mut rx) = watch::channel(false);
        *self.shutdown_tx.lock().expect("discovery shutdown lock poisoned") = Some(tx);

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(MAINTENANCE_INTERVAL);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        this.prune_known_locked();
                        this.try_connect_more();
                    }
                    _ = rx.changed() => {
                        if *rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("discovery maintenance loop stopped");
        });
        *self.task.lock().expect("discovery task lock poisoned") = Some(handle);
    }

    /// Stop the maintenance loop and persist the boot cache.
    pub async fn stop(&self) {
        if let Some(tx) = self.shutdown_tx.lock().expect("discovery shutdown lock poisoned").take() {
            let _ = tx.send(true);
        }
        let handle = self.task.lock().expect("discovery task lock poisoned").take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        let _ = self.boot_cache.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeClock;
    use tempfile::tempdir;

    struct NullEvents;
    impl DiscoveryEvents for NullEvents {
        fn on_connect(&self, _addr: &str) {}
    }

    fn discovery() -> Discovery {
        let dir = tempdir().unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
        let boot_cache = Arc::new(BootCache::new(dir.path(), clock.clone()));
        let config = Config::default();
        Discovery::new(&config, boot_cache, clock, Arc::new(NullEvents))
    }

    #[test]
    fn add_peer_only_lowers_hops_never_raises() {
        let d = discovery();
        d.add_peer("A", 1, PeerSource::Gossip);
        d.add_peer("A", 3, PeerSource::Gossip);
        assert_eq!(d.hops_of("A"), Some(1));
        d.add_peer("A", 0, PeerSource::Gossip);
        assert_eq!(d.hops_of("A"), Some(0));
    }

    #[test]
    fn needs_more_peers_until_max_outbound_connected() {
        let d = discovery();
        assert!(d.needs_more_peers());
        let peer = PeerId::random();
        d.mark_connected("A", peer);
        assert!(d.needs_more_peers());
    }

    #[test]
    fn select_peers_to_connect_excludes_connected_and_far_hops() {
        let d = discovery();
        d.add_peer("near", 1, PeerSource::Gossip);
        d.add_peer("far", MAX_HOPS + 1, PeerSource::Gossip);
        let peer = PeerId::random();
        d.mark_connected("near", peer);
        let candidates = d.select_peers_to_connect(10);
        assert!(!candidates.contains(&"near".to_string()));
        assert!(!candidates.contains(&"far".to_string()));
    }

    #[test]
    fn mark_disconnected_fires_event_only_if_was_connected() {
        let d = discovery();
        let peer = PeerId::random();
        d.mark_disconnected(&peer); // no-op, was never connected
        d.mark_connected("A", peer);
        assert_eq!(d.connected_count(), 1);
        d.mark_disconnected(&peer);
        assert_eq!(d.connected_count(), 0);
    }
}
