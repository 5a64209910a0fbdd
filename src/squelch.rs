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

//! Receive-side squelch table (spec §4.D squelch handler, §4.N; the two
//! are one component per spec.md's own consolidation note).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::capability::Clock;

/// Shortest duration a squelch instruction may request.
pub const MIN_UNSQUELCH_EXPIRE_SECS: u64 = 300;
/// Longest duration a squelch instruction may request.
pub const MAX_UNSQUELCH_EXPIRE_PEERS_SECS: u64 = 3600;

/// Receive-side record of which validators this node has been told to stop
/// relaying, and until when (spec §4.D).
pub struct SquelchTable {
    clock: Arc<dyn Clock>,
    expirations: Mutex<HashMap<Vec<u8>, Instant>>,
}

impl SquelchTable {
    /// An empty table.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, expirations: Mutex::new(HashMap::new()) }
    }

    /// Apply a squelch instruction. `duration` must be in
    /// `[MIN_UNSQUELCH_EXPIRE_SECS, MAX_UNSQUELCH_EXPIRE_PEERS_SECS]` or the
    /// entry is removed instead and `false` is returned.
    pub fn add_squelch(&self, validator: &[u8], duration_secs: u64) -> bool {
        if duration_secs < MIN_UNSQUELCH_EXPIRE_SECS || duration_secs > MAX_UNSQUELCH_EXPIRE_PEERS_SECS {
            self.remove_squelch(validator);
            return false;
        }
        let expiration = self.clock.now() + std::time::Duration::from_secs(duration_secs);
        self.expirations.lock().expect("squelch table lock poisoned").insert(validator.to_vec(), expiration);
        true
    }

    /// Remove any squelch on `validator` (e.g. on an explicit
    /// `squelch=false` instruction).
    pub fn remove_squelch(&self, validator: &[u8]) {
        self.expirations.lock().expect("squelch table lock poisoned").remove(validator);
    }

    /// True if `validator` is currently squelched.
    pub fn is_squelched(&self, validator: &[u8]) -> bool {
        let now = self.clock.now();
        self.expirations
            .lock()
            .expect("squelch table lock poisoned")
            .get(validator)
            .is_some_and(|expiration| now < *expiration)
    }

    /// Remove every entry whose expiration has passed, returning how many
    /// were removed.
    pub fn prune_expired(&self) -> usize {
        let now = self.clock.now();
        let mut expirations = self.expirations.lock().expect("squelch table lock poisoned");
        let before = expirations.len();
        expirations.retain(|_, expiration| now < *expiration);
        before - expirations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeClock;
    use std::time::Duration;

    #[test]
    fn duration_out_of_bounds_is_rejected() {
        let clock = Arc::new(FakeClock::new());
        let table = SquelchTable::new(clock);
        assert!(!table.add_squelch(b"v1", 1));
        assert!(!table.is_squelched(b"v1"));
    }

    #[test]
    fn valid_duration_squelches_until_expiry() {
        let clock = Arc::new(FakeClock::new());
        let table = SquelchTable::new(clock.clone());
        assert!(table.add_squelch(b"v1", 300));
        assert!(table.is_squelched(b"v1"));
        clock.advance(Duration::from_secs(301));
        assert!(!table.is_squelched(b"v1"));
        assert_eq!(table.prune_expired(), 1);
    }

    #[test]
    fn explicit_unsquelch_removes_entry() {
        let clock = Arc::new(FakeClock::new());
        let table = SquelchTable::new(clock);
        table.add_squelch(b"v1", 600);
        table.remove_squelch(b"v1");
        assert!(!table.is_squelched(b"v1"));
    }

    #[test]
    fn boundary_durations_are_accepted() {
        let clock = Arc::new(FakeClock::new());
        let table = SquelchTable::new(clock);
        assert!(table.add_squelch(b"lo", MIN_UNSQUELCH_EXPIRE_SECS));
        assert!(table.add_squelch(b"hi", MAX_UNSQUELCH_EXPIRE_PEERS_SECS));
    }
}
