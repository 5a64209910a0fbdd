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

//! Traffic accounting (spec §4.E). Counters are plain atomics behind a
//! fixed-size array indexed by [`TrafficCategory`] — no map lookup on the
//! hot dispatch path.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::message::MessageType;

/// The fixed set of traffic categories (spec §4.E).
///
/// `Total` is not produced by [`categorize`] — every [`add_count`] call
/// folds into it automatically, mirroring the "grand total" row callers
/// expect in traffic reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum TrafficCategory {
    /// Ping/pong keepalive overhead.
    Overhead = 0,
    /// Trusted-cluster status.
    Cluster,
    /// Peer endpoint gossip.
    Overlay,
    /// Validator manifests.
    Manifest,
    /// Relayed transactions.
    Transactions,
    /// Transactions that were already seen (dropped duplicates).
    TransactionsDuplicate,
    /// Consensus proposals.
    Proposals,
    /// Proposals from an untrusted source.
    ProposalsUntrusted,
    /// Proposals already seen.
    ProposalsDuplicate,
    /// Validations.
    Validations,
    /// Validations from an untrusted source.
    ValidationsUntrusted,
    /// Validations already seen.
    ValidationsDuplicate,
    /// Validator list (UNL) blobs.
    ValidatorLists,
    /// Squelch instructions.
    Squelch,
    /// Squelch instructions that suppressed a relay.
    SquelchSuppressed,
    /// Squelch instructions ignored (already squelched / invalid duration).
    SquelchIgnored,
    /// Outbound request for a held transaction set.
    SetGet,
    /// Inbound sharing of a held transaction set.
    SetShare,
    /// Ledger data responses.
    LedgerData,
    /// Ledger data requests.
    LedgerGet,
    /// SHAMap proof-path traffic.
    ProofPath,
    /// Ledger replay-delta traffic.
    ReplayDelta,
    /// Announcements of held transaction hashes.
    HaveTransactions,
    /// Requests for raw objects by hash.
    RequestedTransactions,
    /// Traffic this node could not classify by known message type.
    Unknown,
    /// Running grand total across every category.
    Total,
}

const CATEGORY_COUNT: usize = TrafficCategory::Total as usize + 1;

/// Maps a known wire type plus transfer direction to its traffic category
/// (spec §4.E). Direction only changes the result for [`MessageType::HaveSet`]
/// (`set_get` outbound vs `set_share` inbound); every other message type has
/// a single, direction-independent category because the wire protocol
/// already models request/response as distinct message types.
pub fn categorize(message_type: MessageType, inbound: bool) -> TrafficCategory {
    use TrafficCategory as C;
    match message_type {
        MessageType::Ping | MessageType::StatusChange => C::Overhead,
        MessageType::Cluster => C::Cluster,
        MessageType::Endpoints => C::Overlay,
        MessageType::Manifests => C::Manifest,
        MessageType::Transaction | MessageType::Transactions => C::Transactions,
        MessageType::HaveTransactions => C::HaveTransactions,
        MessageType::ProposeLedger => C::Proposals,
        MessageType::Validation => C::Validations,
        MessageType::ValidatorList | MessageType::ValidatorListCollection => C::ValidatorLists,
        MessageType::Squelch => C::Squelch,
        MessageType::HaveSet => {
            if inbound {
                C::SetShare
            } else {
                C::SetGet
            }
        }
        MessageType::LedgerData => C::LedgerData,
        MessageType::GetLedger => C::LedgerGet,
        MessageType::ProofPathReq | MessageType::ProofPathResponse => C::ProofPath,
        MessageType::ReplayDeltaReq | MessageType::ReplayDeltaResponse => C::ReplayDelta,
        MessageType::GetObjects => C::RequestedTransactions,
    }
}

#[derive(Debug, Default)]
struct Counter {
    bytes: AtomicU64,
    messages: AtomicU64,
}

impl Counter {
    fn add(&self, bytes: u64) {
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
        self.messages.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            bytes: self.bytes.load(Ordering::Relaxed),
            messages: self.messages.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time read of one category's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    /// Total bytes counted.
    pub bytes: u64,
    /// Total messages counted.
    pub messages: u64,
}

/// Atomic per-category byte/message counters (spec §4.E, §5).
#[derive(Debug)]
pub struct TrafficCounters {
    counters: [Counter; CATEGORY_COUNT],
}

impl Default for TrafficCounters {
    fn default() -> Self {
        Self { counters: std::array::from_fn(|_| Counter::default()) }
    }
}

impl TrafficCounters {
    /// A fresh, zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `bytes` of inbound/outbound traffic under `category`, and
    /// fold the same count into [`TrafficCategory::Total`].
    pub fn add_count(&self, category: TrafficCategory, bytes: u64) {
        self.counters[category as usize].add(bytes);
        if category as usize != TrafficCategory::Total as usize {
            self.counters[TrafficCategory::Total as usize].add(bytes);
        }
    }

    /// Read the current value for `category`.
    pub fn snapshot(&self, category: TrafficCategory) -> CounterSnapshot {
        self.counters[category as usize].snapshot()
    }

    /// Read every category at once, keyed by category index order.
    pub fn snapshot_all(&self) -> Vec<CounterSnapshot> {
        self.counters.iter().map(Counter::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorize_distinguishes_have_set_by_direction() {
        assert_eq!(categorize(MessageType::HaveSet, true), TrafficCategory::SetShare);
        assert_eq!(categorize(MessageType::HaveSet, false), TrafficCategory::SetGet);
    }

    #[test]
    fn categorize_is_direction_independent_for_ledger_types() {
        assert_eq!(categorize(MessageType::GetLedger, true), TrafficCategory::LedgerGet);
        assert_eq!(categorize(MessageType::GetLedger, false), TrafficCategory::LedgerGet);
        assert_eq!(categorize(MessageType::LedgerData, true), TrafficCategory::LedgerData);
        assert_eq!(categorize(MessageType::LedgerData, false), TrafficCategory::LedgerData);
    }

    #[test]
    fn add_count_folds_into_total() {
        let counters = TrafficCounters::new();
        counters.add_count(TrafficCategory::Manifest, 100);
        counters.add_count(TrafficCategory::Overhead, 20);
        assert_eq!(counters.snapshot(TrafficCategory::Manifest), CounterSnapshot { bytes: 100, messages: 1 });
        assert_eq!(counters.snapshot(TrafficCategory::Total), CounterSnapshot { bytes: 120, messages: 2 });
    }

    #[test]
    fn every_known_message_type_categorizes() {
        for &t in MessageType::ALL {
            let _ = categorize(t, true);
            let _ = categorize(t, false);
        }
    }
}
