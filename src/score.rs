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

//! Peer scoring (spec §4.G): a composite score from latency, ping
//! reliability, uptime, and observed message behavior.

use std::sync::Mutex;

const BASE_SCORE: i64 = 100;
const SCORE_MIN: i64 = -100;
const SCORE_MAX: i64 = 1000;
const LATENCY_SAMPLES: usize = 10;

#[derive(Default)]
struct Inner {
    latency_samples: [u64; LATENCY_SAMPLES],
    latency_next: usize,
    latency_filled: usize,
    pings_total: u64,
    pings_success: u64,
    disconnects: u64,
    invalid_messages: u64,
    good_messages: u64,
}

/// Accumulates a peer's behavior and computes a composite score on demand
/// (spec §4.G). One instance per peer.
#[derive(Default)]
pub struct PeerScore {
    inner: Mutex<Inner>,
}

impl PeerScore {
    /// A fresh, unscored peer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new latency sample in milliseconds (ring buffer of the
    /// last 10; zero samples are excluded from the average).
    pub fn record_latency_ms(&self, latency_ms: u64) {
        let mut inner = self.inner.lock().expect("peer score lock poisoned");
        let idx = inner.latency_next;
        inner.latency_samples[idx] = latency_ms;
        inner.latency_next = (idx + 1) % LATENCY_SAMPLES;
        inner.latency_filled = (inner.latency_filled + 1).min(LATENCY_SAMPLES);
    }

    /// Record the outcome of a ping round-trip.
    pub fn record_ping(&self, success: bool) {
        let mut inner = self.inner.lock().expect("peer score lock poisoned");
        inner.pings_total += 1;
        if success {
            inner.pings_success += 1;
        }
    }

    /// Record a disconnect event (any reason).
    pub fn record_disconnect(&self) {
        self.inner.lock().expect("peer score lock poisoned").disconnects += 1;
    }

    /// Record a protocol-invalid message from this peer.
    pub fn record_invalid_message(&self) {
        self.inner.lock().expect("peer score lock poisoned").invalid_messages += 1;
    }

    /// Record a well-formed, useful message from this peer.
    pub fn record_good_message(&self) {
        self.inner.lock().expect("peer score lock poisoned").good_messages += 1;
    }

    fn latency_bonus(inner: &Inner) -> i64 {
        let samples: Vec<u64> = inner.latency_samples.iter().copied().filter(|&s| s != 0).collect();
        if samples.is_empty() {
            return 0;
        }
        let avg = samples.iter().sum::<u64>() as f64 / samples.len() as f64;
        if avg <= 50.0 {
            50
        } else if avg <= 150.0 {
            25
        } else if avg <= 500.0 {
            0
        } else {
            -25
        }
    }

    fn reliability_bonus(inner: &Inner) -> i64 {
        if inner.pings_total == 0 {
            return 0;
        }
        let rate = inner.pings_success as f64 / inner.pings_total as f64;
        if rate >= 0.99 {
            50
        } else if rate >= 0.95 {
            25
        } else if rate >= 0.90 {
            0
        } else if rate >= 0.80 {
            -25
        } else {
            -50
        }
    }

    fn uptime_bonus(inner: &Inner) -> i64 {
        if inner.disconnects > 10 {
            -50
        } else if inner.disconnects > 5 {
            -25
        } else {
            0
        }
    }

    fn behavior_bonus(inner: &Inner) -> i64 {
        if inner.invalid_messages > 100 {
            -100
        } else if inner.invalid_messages > 50 {
            -50
        } else if inner.invalid_messages > 10 {
            -25
        } else {
            (inner.good_messages / 100).min(25) as i64
        }
    }

    /// The composite score, clamped to `[-100, 1000]` (spec §4.G).
    pub fn score(&self) -> i64 {
        let inner = self.inner.lock().expect("peer score lock poisoned");
        let total = BASE_SCORE
            + Self::latency_bonus(&inner)
            + Self::reliability_bonus(&inner)
            + Self::uptime_bonus(&inner)
            + Self::behavior_bonus(&inner);
        total.clamp(SCORE_MIN, SCORE_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_peer_scores_base() {
        let s = PeerScore::new();
        assert_eq!(s.score(), BASE_SCORE);
    }

    #[test]
    fn good_latency_and_reliability_raise_score() {
        let s = PeerScore::new();
        for _ in 0..5 {
            s.record_latency_ms(20);
        }
        for _ in 0..100 {
            s.record_ping(true);
        }
        assert_eq!(s.score(), BASE_SCORE + 50 + 50);
    }

    #[test]
    fn excess_disconnects_and_invalid_messages_lower_score() {
        let s = PeerScore::new();
        for _ in 0..11 {
            s.record_disconnect();
        }
        for _ in 0..101 {
            s.record_invalid_message();
        }
        assert_eq!(s.score(), (BASE_SCORE - 50 - 100).clamp(SCORE_MIN, SCORE_MAX));
    }

    #[test]
    fn score_is_clamped_to_bounds() {
        let s = PeerScore::new();
        s.record_latency_ms(900); // > 500ms -> -25
        for _ in 0..10 {
            s.record_ping(false); // rate 0.0 -> -50
        }
        for _ in 0..11 {
            s.record_disconnect(); // > 10 -> -50
        }
        for _ in 0..101 {
            s.record_invalid_message(); // > 100 -> -100
        }
        // 100 - 25 - 50 - 50 - 100 = -125, clamped to -100
        assert_eq!(s.score(), SCORE_MIN);
    }

    #[test]
    fn good_messages_capped_at_25_bonus() {
        let s = PeerScore::new();
        for _ in 0..10_000 {
            s.record_good_message();
        }
        assert_eq!(s.score(), BASE_SCORE + 25);
    }
}
