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

//! One validator's relay-squelch state: its peer set and the
//! counting/selection state machine (spec §4.M).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use libp2p::PeerId;
use rand::Rng;

use crate::capability::Clock;
use crate::squelch::{MAX_UNSQUELCH_EXPIRE_PEERS_SECS, MIN_UNSQUELCH_EXPIRE_SECS};

use super::{ReduceRelayEvents, DEFAULT_MAX_SELECTED_PEERS, IDLED_SECS, INACTIVITY_RESET_SECS, MAX_MESSAGE_THRESHOLD, SQUELCH_PER_PEER_SECS};

/// A single peer's relay state within one validator's slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerRelayState {
    /// Accumulating a message count toward the selection threshold.
    Counting,
    /// Chosen to keep relaying this validator's messages.
    Selected,
    /// Instructed to stop relaying this validator's messages until expiry.
    Squelched,
}

/// The validator-level aggregate state (spec §4.M).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// No selection has been made (yet, or since the last reset).
    Counting,
    /// A peer set has been selected; everyone else is squelched.
    Selected,
}

#[derive(Debug)]
struct PeerEntry {
    state: PeerRelayState,
    count: u32,
    last_message: Instant,
    squelch_expire: Option<Instant>,
}

struct Inner {
    state: SlotState,
    peers: HashMap<PeerId, PeerEntry>,
    considered: HashSet<PeerId>,
    reached_threshold: u32,
    last_selected: Instant,
}

/// Per-validator relay-squelch slot (spec §4.M).
pub struct ValidatorSlot {
    validator: Vec<u8>,
    max_selected_peers: usize,
    clock: Arc<dyn Clock>,
    events: Arc<dyn ReduceRelayEvents>,
    inner: Mutex<Inner>,
}

impl ValidatorSlot {
    /// A fresh, empty slot for `validator`.
    pub fn new(validator: Vec<u8>, clock: Arc<dyn Clock>, events: Arc<dyn ReduceRelayEvents>) -> Self {
        let now = clock.now();
        Self {
            validator,
            max_selected_peers: DEFAULT_MAX_SELECTED_PEERS,
            clock,
            events,
            inner: Mutex::new(Inner { state: SlotState::Counting, peers: HashMap::new(), considered: HashSet::new(), reached_threshold: 0, last_selected: now }),
        }
    }

    /// The aggregate slot state.
    pub fn state(&self) -> SlotState {
        self.inner.lock().expect("validator slot lock poisoned").state
    }

    /// Current peer count (all states combined).
    pub fn peer_count(&self) -> usize {
        self.inner.lock().expect("validator slot lock poisoned").peers.len()
    }

    /// The relay state of a specific peer, if tracked.
    pub fn peer_state(&self, peer: &PeerId) -> Option<PeerRelayState> {
        self.inner.lock().expect("validator slot lock poisoned").peers.get(peer).map(|p| p.state)
    }

    fn init_counting_locked(inner: &mut Inner, now: Instant) {
        for entry in inner.peers.values_mut() {
            if entry.state != PeerRelayState::Squelched {
                entry.state = PeerRelayState::Counting;
                entry.count = 0;
            }
        }
        inner.considered.clear();
        inner.reached_threshold = 0;
        inner.state = SlotState::Counting;
        let _ = now;
    }

    fn squelch_duration_secs(peer_count: usize, max_selected_peers: usize) -> u64 {
        let n = peer_count.saturating_sub(max_selected_peers) as u64;
        let cap = (n * SQUELCH_PER_PEER_SECS).clamp(600, MAX_UNSQUELCH_EXPIRE_PEERS_SECS);
        if cap <= MIN_UNSQUELCH_EXPIRE_SECS {
            return MIN_UNSQUELCH_EXPIRE_SECS;
        }
        rand::thread_rng().gen_range(MIN_UNSQUELCH_EXPIRE_SECS..=cap)
    }

    /// Record an observed message from `peer` (spec §4.M's per-peer
    /// counting, selection, and inactivity-reset rules). Call only once
    /// the container's bootup gate has opened and the message passed
    /// dedup.
    pub fn update(&self, peer: PeerId, now: Instant) {
        let mut inner = self.inner.lock().expect("validator slot lock poisoned");

        if now.duration_since(inner.last_selected) > Duration::from_secs(INACTIVITY_RESET_SECS) {
            Self::init_counting_locked(&mut inner, now);
        }

        let is_new = !inner.peers.contains_key(&peer);
        if is_new {
            inner.peers.insert(peer, PeerEntry { state: PeerRelayState::Counting, count: 0, last_message: now, squelch_expire: None });
            Self::init_counting_locked(&mut inner, now);
        }

        let entry = inner.peers.get_mut(&peer).expect("just inserted or pre-existing");

        if entry.state == PeerRelayState::Squelched {
            let expired = entry.squelch_expire.map(|exp| now > exp).unwrap_or(true);
            if expired {
                entry.state = PeerRelayState::Counting;
                entry.count = 0;
                entry.squelch_expire = None;
                drop(entry);
                Self::init_counting_locked(&mut inner, now);
            } else {
                drop(entry);
                let validator = self.validator.clone();
                drop(inner);
                self.events.on_ignored_squelch(&validator, peer);
                return;
            }
        }

        let entry = inner.peers.get_mut(&peer).expect("present");
        if entry.state == PeerRelayState::Counting {
            entry.count += 1;
            entry.last_message = now;
            if entry.count > MAX_MESSAGE_THRESHOLD - 1 {
                inner.considered.insert(peer);
            }
            if entry.count == MAX_MESSAGE_THRESHOLD + 1 {
                inner.reached_threshold += 1;
            }
        } else {
            entry.last_message = now;
        }

        if inner.reached_threshold as usize == self.max_selected_peers {
            self.try_select_locked(&mut inner, now);
        }
    }

    fn try_select_locked(&self, inner: &mut Inner, now: Instant) {
        let idled = Duration::from_secs(IDLED_SECS);
        let candidates: Vec<PeerId> = inner
            .considered
            .iter()
            .copied()
            .filter(|p| inner.peers.get(p).map(|e| now.duration_since(e.last_message) < idled).unwrap_or(false))
            .collect();

        if candidates.len() < self.max_selected_peers {
            Self::init_counting_locked(inner, now);
            return;
        }

        let mut pool = candidates;
        let mut rng = rand::thread_rng();
        let mut selected = HashSet::new();
        while selected.len() < self.max_selected_peers && !pool.is_empty() {
            let idx = rng.gen_range(0..pool.len());
            selected.insert(pool.swap_remove(idx));
        }

        let peer_count = inner.peers.len();
        let duration = Self::squelch_duration_secs(peer_count, self.max_selected_peers);
        let expire = now + Duration::from_secs(duration);

        let mut to_notify = Vec::new();
        for (peer_id, entry) in inner.peers.iter_mut() {
            if selected.contains(peer_id) {
                entry.state = PeerRelayState::Selected;
            } else {
                entry.state = PeerRelayState::Squelched;
                entry.squelch_expire = Some(expire);
                to_notify.push(*peer_id);
            }
        }
        inner.considered.clear();
        inner.reached_threshold = 0;
        inner.state = SlotState::Selected;
        inner.last_selected = now;

        let validator = self.validator.clone();
        for peer_id in to_notify {
            self.events.on_squelch(&validator, peer_id, duration);
        }
    }

    /// If `peer` was `Selected`, unsquelch everyone and reset the whole
    /// slot to `Counting`. Otherwise adjust `considered`/`reached_threshold`
    /// bookkeeping before removing the entry (spec §4.M "Peer removal").
    pub fn remove_peer(&self, peer: &PeerId) {
        let mut inner = self.inner.lock().expect("validator slot lock poisoned");
        let Some(entry) = inner.peers.get(peer) else { return };
        let was_selected = entry.state == PeerRelayState::Selected;
        let was_considered_high_count = inner.considered.contains(peer) && entry.count > MAX_MESSAGE_THRESHOLD;

        if was_selected {
            let mut to_unsquelch = Vec::new();
            for (peer_id, e) in inner.peers.iter_mut() {
                if e.state == PeerRelayState::Squelched {
                    to_unsquelch.push(*peer_id);
                }
                e.state = PeerRelayState::Counting;
                e.count = 0;
                e.squelch_expire = None;
            }
            inner.considered.clear();
            inner.reached_threshold = 0;
            inner.state = SlotState::Counting;
            inner.peers.remove(peer);
            let validator = self.validator.clone();
            drop(inner);
            for peer_id in to_unsquelch {
                self.events.on_unsquelch(&validator, peer_id);
            }
            return;
        }

        if was_considered_high_count {
            inner.reached_threshold = inner.reached_threshold.saturating_sub(1);
        }
        inner.considered.remove(peer);
        inner.peers.remove(peer);
    }

    /// Peers with no message observed for at least the idle window
    /// (spec §4.M "Idle reaping"). Returns victims without mutating —
    /// callers should feed each into [`ValidatorSlot::remove_peer`] after
    /// releasing any lock of their own (spec §9 `DeleteIdlePeer` guidance).
    pub fn idle_peers(&self, now: Instant) -> Vec<PeerId> {
        let idled = Duration::from_secs(IDLED_SECS);
        self.inner
            .lock()
            .expect("validator slot lock poisoned")
            .peers
            .iter()
            .filter(|(_, e)| now.duration_since(e.last_message) >= idled)
            .map(|(peer, _)| *peer)
            .collect()
    }
}
