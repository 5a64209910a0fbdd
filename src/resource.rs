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

//! Per-peer resource (abuse budget) accounting (spec §4.F). One instance
//! lives for a connection's lifetime, owned by the connection collaborator.

use std::sync::{Arc, Mutex};

use crate::capability::Clock;
use crate::error::ResourceRejected;

/// Named charge tiers, each worth a fixed number of resource points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargeTier {
    /// No cost.
    None,
    /// A cheap, routine message.
    Low,
    /// A moderately expensive request.
    Medium,
    /// An expensive request (e.g. a large ledger fetch).
    High,
    /// A malformed or protocol-violating message.
    Invalid,
}

impl ChargeTier {
    /// The point cost of this tier.
    pub fn points(self) -> u32 {
        match self {
            ChargeTier::None => 0,
            ChargeTier::Low => 10,
            ChargeTier::Medium => 50,
            ChargeTier::High => 200,
            ChargeTier::Invalid => 500,
        }
    }
}

const WARNING_USAGE: f64 = 0.75;
const DEFAULT_LIMIT: u32 = 10_000;
const DEFAULT_DECAY_RATE: u32 = 100;

struct Inner {
    charge: u32,
    last_decay_unix_s: u64,
}

/// Tracks a peer's accumulated abuse-resource charge, decaying over time
/// (spec §4.F).
pub struct ResourceConsumer {
    limit: u32,
    decay_rate: u32,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl ResourceConsumer {
    /// A consumer with the default limit (10,000 points) and decay rate
    /// (100 points/second).
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_limit(clock, DEFAULT_LIMIT, DEFAULT_DECAY_RATE)
    }

    /// A consumer with an explicit limit and decay rate.
    pub fn with_limit(clock: Arc<dyn Clock>, limit: u32, decay_rate: u32) -> Self {
        let now = clock.now_unix_ms() / 1000;
        Self { limit, decay_rate, clock, inner: Mutex::new(Inner { charge: 0, last_decay_unix_s: now }) }
    }

    fn decay_locked(&self, inner: &mut Inner) {
        let now = self.clock.now_unix_ms() / 1000;
        let elapsed = now.saturating_sub(inner.last_decay_unix_s);
        if elapsed == 0 {
            return;
        }
        let decay = (elapsed as u32).saturating_mul(self.decay_rate);
        inner.charge = inner.charge.saturating_sub(decay);
        inner.last_decay_unix_s = now;
    }

    /// Apply `tier`'s charge, decaying first. Rejects without mutating
    /// `charge` if the post-charge total would exceed `limit`.
    pub fn charge(&self, tier: ChargeTier) -> Result<(), ResourceRejected> {
        self.charge_amount(tier.points())
    }

    /// Apply an arbitrary point charge, decaying first (spec §4.F).
    pub fn charge_amount(&self, amount: u32) -> Result<(), ResourceRejected> {
        let mut inner = self.inner.lock().expect("resource consumer lock poisoned");
        self.decay_locked(&mut inner);
        let next = inner.charge.saturating_add(amount);
        if next > self.limit {
            return Err(ResourceRejected);
        }
        inner.charge = next;
        Ok(())
    }

    /// Fraction of `limit` currently charged.
    pub fn usage(&self) -> f64 {
        let mut inner = self.inner.lock().expect("resource consumer lock poisoned");
        self.decay_locked(&mut inner);
        inner.charge as f64 / self.limit as f64
    }

    /// True once usage reaches the warning threshold (0.75).
    pub fn is_warning(&self) -> bool {
        self.usage() >= WARNING_USAGE
    }

    /// True once usage reaches or exceeds the limit.
    pub fn should_disconnect(&self) -> bool {
        self.usage() >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeClock;
    use std::time::Duration;

    #[test]
    fn charge_is_rejected_over_limit_without_mutation() {
        let clock = Arc::new(FakeClock::new());
        let rc = ResourceConsumer::with_limit(clock, 100, 1);
        assert!(rc.charge(ChargeTier::High).is_err()); // 200 > 100
        assert_eq!(rc.usage(), 0.0);
    }

    #[test]
    fn charge_accumulates_until_limit_then_rejects() {
        let clock = Arc::new(FakeClock::new());
        let rc = ResourceConsumer::with_limit(clock, 100, 0);
        rc.charge_amount(60).unwrap();
        assert!(rc.charge_amount(60).is_err());
        assert_eq!(rc.usage(), 0.6);
    }

    #[test]
    fn decay_reduces_charge_over_time() {
        let clock = Arc::new(FakeClock::new());
        let rc = ResourceConsumer::with_limit(clock.clone(), 100, 10);
        rc.charge_amount(50).unwrap();
        clock.advance(Duration::from_secs(3));
        assert_eq!(rc.usage(), 0.2); // 50 - 3*10 = 20
    }

    #[test]
    fn warning_and_disconnect_thresholds() {
        let clock = Arc::new(FakeClock::new());
        let rc = ResourceConsumer::with_limit(clock, 100, 0);
        rc.charge_amount(74).unwrap();
        assert!(!rc.is_warning());
        rc.charge_amount(1).unwrap();
        assert!(rc.is_warning());
        assert!(!rc.should_disconnect());
        rc.charge_amount(25).unwrap();
        assert!(rc.should_disconnect());
    }
}
