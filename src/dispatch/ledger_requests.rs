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

//! Outstanding ledger-sync request bookkeeping (spec §9 open question (b)).
//! Not wired to any ledger-sync implementation — this crate's scope stops
//! at the peer/overlay layer — but typed and tested rather than stubbed.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Correlates a `GetLedger`/`GetObjects` request with its eventual reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u32);

/// Default time a request may remain outstanding before it's considered
/// abandoned (spec §5 `DefaultRequestTimeout`).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tracks `sent_at` for outstanding ledger-sync requests, keyed by
/// [`RequestId`] (spec §4.D).
pub struct LedgerRequestTracker {
    timeout: Duration,
    outstanding: Mutex<HashMap<RequestId, Instant>>,
}

impl LedgerRequestTracker {
    /// A tracker using [`DEFAULT_REQUEST_TIMEOUT`].
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// A tracker using a caller-supplied timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout, outstanding: Mutex::new(HashMap::new()) }
    }

    /// Record that `id` was sent at `now`.
    pub fn record_sent(&self, id: RequestId, now: Instant) {
        self.outstanding.lock().expect("ledger request tracker lock poisoned").insert(id, now);
    }

    /// Clear `id`, e.g. once its reply arrives. Returns `true` if it was
    /// still outstanding.
    pub fn complete(&self, id: RequestId) -> bool {
        self.outstanding.lock().expect("ledger request tracker lock poisoned").remove(&id).is_some()
    }

    /// Number of requests still outstanding.
    pub fn len(&self) -> usize {
        self.outstanding.lock().expect("ledger request tracker lock poisoned").len()
    }

    /// True if no requests are outstanding.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return every request id whose timeout has elapsed as of
    /// `now`.
    pub fn sweep_expired(&self, now: Instant) -> Vec<RequestId> {
        let mut outstanding = self.outstanding.lock().expect("ledger request tracker lock poisoned");
        let expired: Vec<RequestId> = outstanding
            .iter()
            .filter(|(_, sent_at)| now.duration_since(**sent_at) >= self.timeout)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            outstanding.remove(id);
        }
        expired
    }
}

impl Default for LedgerRequestTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_clears_outstanding_request() {
        let tracker = LedgerRequestTracker::new();
        let now = Instant::now();
        tracker.record_sent(RequestId(1), now);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.complete(RequestId(1)));
        assert!(tracker.is_empty());
        assert!(!tracker.complete(RequestId(1)));
    }

    #[test]
    fn sweep_expired_only_removes_timed_out_requests() {
        let tracker = LedgerRequestTracker::with_timeout(Duration::from_secs(10));
        let now = Instant::now();
        tracker.record_sent(RequestId(1), now);
        tracker.record_sent(RequestId(2), now + Duration::from_secs(5));
        let expired = tracker.sweep_expired(now + Duration::from_secs(11));
        assert_eq!(expired, vec![RequestId(1)]);
        assert_eq!(tracker.len(), 1);
        assert!(!tracker.is_empty());
    }
}
