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

//! The per-validator slot registry, message dedup, and bootup gate
//! (spec §4.M).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use libp2p::PeerId;

use crate::capability::Clock;

use super::{ReduceRelayEvents, ValidatorSlot, IDLED_SECS, WAIT_ON_BOOTUP_SECS};

struct Dedup {
    seen: HashMap<(u64, PeerId), Instant>,
}

impl Dedup {
    fn new() -> Self {
        Self { seen: HashMap::new() }
    }

    /// True if this is a fresh `(message_hash, peer)` pair (or the prior
    /// sighting has aged out of the idle window). Sweeps stale entries
    /// opportunistically.
    fn observe(&mut self, message_hash: u64, peer: PeerId, now: Instant) -> bool {
        let window = Duration::from_secs(IDLED_SECS);
        self.seen.retain(|_, last| now.duration_since(*last) < window);
        match self.seen.insert((message_hash, peer), now) {
            Some(last) if now.duration_since(last) < window => false,
            _ => true,
        }
    }
}

/// Owns one [`ValidatorSlot`] per validator seen, a bootup grace period, and
/// message-level dedup ahead of per-peer counting (spec §4.M).
pub struct ReduceRelayContainer {
    clock: Arc<dyn Clock>,
    events: Arc<dyn ReduceRelayEvents>,
    start_time: Instant,
    slots: Mutex<HashMap<Vec<u8>, Arc<ValidatorSlot>>>,
    dedup: Mutex<Dedup>,
}

impl ReduceRelayContainer {
    /// A fresh container; `update` calls are ignored until the bootup
    /// window elapses (spec §4.M "Bootup").
    pub fn new(clock: Arc<dyn Clock>, events: Arc<dyn ReduceRelayEvents>) -> Self {
        let start_time = clock.now();
        Self { clock, events, start_time, slots: Mutex::new(HashMap::new()), dedup: Mutex::new(Dedup::new()) }
    }

    /// True once the bootup grace period has elapsed.
    pub fn ready(&self) -> bool {
        self.clock.now().duration_since(self.start_time) >= Duration::from_secs(WAIT_ON_BOOTUP_SECS)
    }

    fn slot_for(&self, validator: &[u8]) -> Arc<ValidatorSlot> {
        let mut slots = self.slots.lock().expect("reduce-relay slot map lock poisoned");
        slots
            .entry(validator.to_vec())
            .or_insert_with(|| Arc::new(ValidatorSlot::new(validator.to_vec(), self.clock.clone(), self.events.clone())))
            .clone()
    }

    /// Record one observed `validator`-signed message relayed by `peer`.
    /// Ignored entirely before [`ReduceRelayContainer::ready`]; deduped by
    /// `message_hash` thereafter.
    pub fn update(&self, validator: &[u8], peer: PeerId, message_hash: u64) {
        if !self.ready() {
            return;
        }
        let now = self.clock.now();
        let fresh = self.dedup.lock().expect("reduce-relay dedup lock poisoned").observe(message_hash, peer, now);
        if !fresh {
            return;
        }
        self.slot_for(validator).update(peer, now);
    }

    /// The relay state of `peer` for `validator`, if tracked.
    pub fn peer_state(&self, validator: &[u8], peer: &PeerId) -> Option<super::PeerRelayState> {
        self.slots.lock().expect("reduce-relay slot map lock poisoned").get(validator).and_then(|slot| slot.peer_state(peer))
    }

    /// Sweep every validator slot for peers idle past the window, removing
    /// each outside that slot's own lock (spec §9 `DeleteIdlePeer` lock
    /// interaction: collect victims while the slot lock is held internally
    /// to `idle_peers`, then mutate after it's released, avoiding nested
    /// reentrancy into the same slot's mutex).
    pub fn reap_idle_peers(&self) {
        let now = self.clock.now();
        let slots: Vec<Arc<ValidatorSlot>> = self.slots.lock().expect("reduce-relay slot map lock poisoned").values().cloned().collect();
        for slot in slots {
            let victims = slot.idle_peers(now);
            for peer in victims {
                slot.remove_peer(&peer);
            }
        }
    }

    /// Remove `peer` from every validator's slot (e.g. on peer disconnect).
    pub fn remove_peer_everywhere(&self, peer: &PeerId) {
        let slots: Vec<Arc<ValidatorSlot>> = self.slots.lock().expect("reduce-relay slot map lock poisoned").values().cloned().collect();
        for slot in slots {
            slot.remove_peer(peer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeClock;

    struct NullEvents;
    impl ReduceRelayEvents for NullEvents {
        fn on_squelch(&self, _validator: &[u8], _peer: PeerId, _duration_secs: u64) {}
        fn on_unsquelch(&self, _validator: &[u8], _peer: PeerId) {}
    }

    #[test]
    fn updates_are_ignored_during_bootup() {
        let clock = Arc::new(FakeClock::new());
        let container = ReduceRelayContainer::new(clock.clone(), Arc::new(NullEvents));
        assert!(!container.ready());
        let peer = PeerId::random();
        container.update(b"v1", peer, 1);
        assert_eq!(container.peer_state(b"v1", &peer), None);
    }

    #[test]
    fn updates_flow_through_after_bootup() {
        let clock = Arc::new(FakeClock::new());
        let container = ReduceRelayContainer::new(clock.clone(), Arc::new(NullEvents));
        clock.advance(Duration::from_secs(WAIT_ON_BOOTUP_SECS + 1));
        assert!(container.ready());
        let peer = PeerId::random();
        container.update(b"v1", peer, 1);
        assert_eq!(container.peer_state(b"v1", &peer), Some(super::super::PeerRelayState::Counting));
    }

    #[test]
    fn duplicate_message_hash_from_same_peer_is_deduped() {
        let clock = Arc::new(FakeClock::new());
        let container = ReduceRelayContainer::new(clock.clone(), Arc::new(NullEvents));
        clock.advance(Duration::from_secs(WAIT_ON_BOOTUP_SECS + 1));
        let peer = PeerId::random();
        container.update(b"v1", peer, 42);
        container.update(b"v1", peer, 42);
        let slots = container.slots.lock().unwrap();
        let slot = slots.get(b"v1".as_slice()).unwrap();
        drop(slots);
        assert_eq!(slot.peer_count(), 1);
    }

    #[test]
    fn reap_idle_peers_removes_stale_entries_without_deadlock() {
        let clock = Arc::new(FakeClock::new());
        let container = ReduceRelayContainer::new(clock.clone(), Arc::new(NullEvents));
        clock.advance(Duration::from_secs(WAIT_ON_BOOTUP_SECS + 1));
        let peer = PeerId::random();
        container.update(b"v1", peer, 1);
        clock.advance(Duration::from_secs(IDLED_SECS + 1));
        container.reap_idle_peers();
        assert_eq!(container.peer_state(b"v1", &peer), None);
    }

    #[test]
    fn remove_peer_everywhere_clears_all_validators() {
        let clock = Arc::new(FakeClock::new());
        let container = ReduceRelayContainer::new(clock.clone(), Arc::new(NullEvents));
        clock.advance(Duration::from_secs(WAIT_ON_BOOTUP_SECS + 1));
        let peer = PeerId::random();
        container.update(b"v1", peer, 1);
        container.update(b"v2", peer, 2);
        container.remove_peer_everywhere(&peer);
        assert_eq!(container.peer_state(b"v1", &peer), None);
        assert_eq!(container.peer_state(b"v2", &peer), None);
    }
}
