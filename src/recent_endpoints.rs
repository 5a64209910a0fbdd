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

//! Per-slot anti-echo filter (spec §4.J): don't re-gossip an endpoint back
//! to the peer that just told us about it.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone, Copy, Debug)]
struct Entry {
    hops: u32,
    last_seen: Instant,
}

/// Time-bounded `addr -> {hops, last_seen}` map (spec §4.J), owned per slot.
#[derive(Default)]
pub struct RecentEndpoints {
    entries: Mutex<HashMap<String, Entry>>,
}

impl RecentEndpoints {
    /// An empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that this peer just told us about `addr` at `hops`, observed
    /// at `now`.
    pub fn insert(&self, addr: &str, hops: u32, now: Instant) {
        self.entries.lock().expect("recent endpoints lock poisoned").insert(addr.to_string(), Entry { hops, last_seen: now });
    }

    /// True if `addr` was learned from this peer within the TTL at a hop
    /// count no greater than `candidate_hops` — i.e. re-gossiping it back
    /// would tell the peer nothing it doesn't already know as well or
    /// better (spec §4.H/§4.J).
    pub fn filter(&self, addr: &str, candidate_hops: u32, now: Instant) -> bool {
        let entries = self.entries.lock().expect("recent endpoints lock poisoned");
        match entries.get(addr) {
            Some(entry) => now.duration_since(entry.last_seen) < TTL && entry.hops <= candidate_hops,
            None => false,
        }
    }

    /// Drop entries older than the TTL.
    pub fn expire(&self, now: Instant) {
        self.entries.lock().expect("recent endpoints lock poisoned").retain(|_, e| now.duration_since(e.last_seen) < TTL);
    }
}
