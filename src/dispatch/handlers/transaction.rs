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

//! Transaction and validation relay handlers (spec §4.D). Both forward to
//! a consumer callback and share the same seen-hash dedup shape, so the
//! dedup table is factored out as [`SeenTracker`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use libp2p::PeerId;

use crate::capability::Clock;
use crate::dispatch::MessageHandler;
use crate::error::DispatchError;
use crate::message::model::{Transaction, Validation};
use crate::message::Message;

/// How long a marked hash is remembered before it prunes out.
pub const SEEN_TTL: Duration = Duration::from_secs(5 * 60);

/// Time-pruned `hash string -> last marked` set, shared by the
/// transaction and validation handlers (spec §4.D).
pub struct SeenTracker {
    clock: Arc<dyn Clock>,
    seen: Mutex<HashMap<String, Instant>>,
}

impl SeenTracker {
    /// A fresh, empty tracker.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, seen: Mutex::new(HashMap::new()) }
    }

    /// True if `hash` was marked within [`SEEN_TTL`].
    pub fn contains(&self, hash: &str) -> bool {
        let now = self.clock.now();
        self.seen.lock().expect("seen tracker lock poisoned").get(hash).is_some_and(|t| now.duration_since(*t) < SEEN_TTL)
    }

    /// Mark `hash` as seen now.
    pub fn mark(&self, hash: &str) {
        let now = self.clock.now();
        self.seen.lock().expect("seen tracker lock poisoned").insert(hash.to_string(), now);
    }

    /// Remove every entry older than [`SEEN_TTL`], returning how many were
    /// removed.
    pub fn prune(&self) -> usize {
        let now = self.clock.now();
        let mut seen = self.seen.lock().expect("seen tracker lock poisoned");
        let before = seen.len();
        seen.retain(|_, t| now.duration_since(*t) < SEEN_TTL);
        before - seen.len()
    }
}

/// Forwards decoded payloads to application code (spec §9: injected, not a
/// singleton).
pub trait TransactionSink: Send + Sync {
    /// A transaction was received from `peer`.
    fn on_transaction(&self, peer: &PeerId, transaction: &Transaction);
    /// A validation was received from `peer`.
    fn on_validation(&self, peer: &PeerId, validation: &Validation) {
        let (_, _) = (peer, validation);
    }
}

/// Forwards `Transaction`/`Validation` messages to a [`TransactionSink`],
/// deduplicating by caller-marked hash via a shared [`SeenTracker`].
pub struct TransactionHandler {
    sink: Arc<dyn TransactionSink>,
    seen: Arc<SeenTracker>,
}

impl TransactionHandler {
    /// A handler forwarding to `sink`, sharing `seen` with any sibling
    /// validation handler.
    pub fn new(sink: Arc<dyn TransactionSink>, seen: Arc<SeenTracker>) -> Self {
        Self { sink, seen }
    }

    /// The shared dedup tracker.
    pub fn seen(&self) -> &SeenTracker {
        &self.seen
    }
}

impl MessageHandler for TransactionHandler {
    fn handle(&self, peer: &PeerId, message: &Message) -> Result<(), DispatchError> {
        match message {
            Message::Transaction(tx) => {
                self.sink.on_transaction(peer, tx);
                Ok(())
            }
            Message::Validation(validation) => {
                self.sink.on_validation(peer, validation);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeClock;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration as StdDuration;

    struct RecordingSink {
        transactions: StdMutex<usize>,
        validations: StdMutex<usize>,
    }
    impl TransactionSink for RecordingSink {
        fn on_transaction(&self, _peer: &PeerId, _transaction: &Transaction) {
            *self.transactions.lock().unwrap() += 1;
        }
        fn on_validation(&self, _peer: &PeerId, _validation: &Validation) {
            *self.validations.lock().unwrap() += 1;
        }
    }

    #[test]
    fn forwards_transactions_and_validations() {
        let clock = Arc::new(FakeClock::new());
        let sink = Arc::new(RecordingSink { transactions: StdMutex::new(0), validations: StdMutex::new(0) });
        let seen = Arc::new(SeenTracker::new(clock));
        let handler = TransactionHandler::new(sink.clone(), seen);
        let peer = PeerId::random();
        handler.handle(&peer, &Message::Transaction(Transaction { raw_transaction: vec![1], status: None, receive_timestamp: None, deferred: None })).unwrap();
        handler.handle(&peer, &Message::Validation(Validation { validation: vec![2] })).unwrap();
        assert_eq!(*sink.transactions.lock().unwrap(), 1);
        assert_eq!(*sink.validations.lock().unwrap(), 1);
    }

    #[test]
    fn seen_tracker_dedups_until_ttl_elapses() {
        let clock = Arc::new(FakeClock::new());
        let seen = SeenTracker::new(clock.clone());
        seen.mark("abc");
        assert!(seen.contains("abc"));
        clock.advance(SEEN_TTL + StdDuration::from_secs(1));
        assert!(!seen.contains("abc"));
        assert_eq!(seen.prune(), 1);
    }
}
