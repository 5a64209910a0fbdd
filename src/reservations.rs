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

//! Durable node-identity allowlist (spec §4.K): reserved peers are always
//! admitted regardless of inbound slot pressure.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::bootcache::atomic_write;
use crate::error::ReservationError;

const FILE_NAME: &str = "peer_reservations.json";

/// One reserved node identity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reservation {
    /// The reserved node's identity (e.g. a base58 public key).
    pub node_id: String,
    /// Operator-supplied note, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

struct Inner {
    entries: BTreeMap<String, Option<String>>,
    dirty: bool,
}

/// Durable allowlist of reserved node identities (spec §4.K).
pub struct ReservationTable {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl ReservationTable {
    /// An empty table backed by `<data_dir>/peer_reservations.json`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self { path: data_dir.as_ref().join(FILE_NAME), inner: Mutex::new(Inner { entries: BTreeMap::new(), dirty: false }) }
    }

    /// Load from disk. A missing file yields an empty table.
    pub fn load(&self) -> Result<(), ReservationError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(_) => return Err(ReservationError::Read),
        };
        let parsed: Vec<Reservation> = serde_json::from_str(&raw).map_err(|_| ReservationError::Parse)?;
        let mut inner = self.inner.lock().expect("reservation table lock poisoned");
        inner.entries = parsed.into_iter().map(|r| (r.node_id, r.description)).collect();
        inner.dirty = false;
        Ok(())
    }

    /// True if `node_id` is reserved.
    pub fn contains(&self, node_id: &str) -> bool {
        self.inner.lock().expect("reservation table lock poisoned").entries.contains_key(node_id)
    }

    /// The description for `node_id`, if reserved.
    pub fn get(&self, node_id: &str) -> Option<Option<String>> {
        self.inner.lock().expect("reservation table lock poisoned").entries.get(node_id).cloned()
    }

    /// Insert or update a reservation, returning the previous description
    /// (as `Some(previous)`) if the identity was already reserved.
    pub fn insert_or_assign(&self, node_id: &str, description: Option<String>) -> Option<Option<String>> {
        let mut inner = self.inner.lock().expect("reservation table lock poisoned");
        let previous = inner.entries.insert(node_id.to_string(), description);
        inner.dirty = true;
        previous
    }

    /// Remove a reservation, returning its description if it existed.
    pub fn erase(&self, node_id: &str) -> Option<Option<String>> {
        let mut inner = self.inner.lock().expect("reservation table lock poisoned");
        let removed = inner.entries.remove(node_id);
        if removed.is_some() {
            inner.dirty = true;
        }
        removed
    }

    /// All reservations, in node-id order.
    pub fn list(&self) -> Vec<Reservation> {
        self.inner
            .lock()
            .expect("reservation table lock poisoned")
            .entries
            .iter()
            .map(|(node_id, description)| Reservation { node_id: node_id.clone(), description: description.clone() })
            .collect()
    }

    /// Number of reservations held.
    pub fn size(&self) -> usize {
        self.inner.lock().expect("reservation table lock poisoned").entries.len()
    }

    /// Remove every reservation.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("reservation table lock poisoned");
        if !inner.entries.is_empty() {
            inner.dirty = true;
        }
        inner.entries.clear();
    }

    /// A canonical, key-ordered JSON rendering for operator tooling and
    /// tests.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.list()).expect("reservation list always serializes")
    }

    /// Write to disk, but only when dirty (idempotent when clean).
    pub fn save(&self) -> Result<(), ReservationError> {
        let mut inner = self.inner.lock().expect("reservation table lock poisoned");
        if !inner.dirty {
            return Ok(());
        }
        let list: Vec<Reservation> = inner
            .entries
            .iter()
            .map(|(node_id, description)| Reservation { node_id: node_id.clone(), description: description.clone() })
            .collect();
        let json = serde_json::to_string_pretty(&list).map_err(|_| ReservationError::Serialize)?;
        atomic_write(&self.path, json.as_bytes()).map_err(|_| ReservationError::Write)?;
        inner.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn insert_contains_get_erase() {
        let dir = tempdir().unwrap();
        let table = ReservationTable::new(dir.path());
        assert!(!table.contains("node1"));
        assert_eq!(table.insert_or_assign("node1", Some("primary".into())), None);
        assert!(table.contains("node1"));
        assert_eq!(table.get("node1"), Some(Some("primary".into())));
        assert_eq!(table.insert_or_assign("node1", Some("updated".into())), Some(Some("primary".into())));
        assert_eq!(table.erase("node1"), Some(Some("updated".into())));
        assert!(!table.contains("node1"));
        assert_eq!(table.erase("node1"), None);
    }

    #[test]
    fn clear_and_size() {
        let dir = tempdir().unwrap();
        let table = ReservationTable::new(dir.path());
        table.insert_or_assign("a", None);
        table.insert_or_assign("b", None);
        assert_eq!(table.size(), 2);
        table.clear();
        assert_eq!(table.size(), 0);
    }

    #[test]
    fn to_json_is_key_ordered() {
        let dir = tempdir().unwrap();
        let table = ReservationTable::new(dir.path());
        table.insert_or_assign("zzz", None);
        table.insert_or_assign("aaa", None);
        let json = table.to_json();
        assert!(json.find("aaa").unwrap() < json.find("zzz").unwrap());
    }

    #[test]
    fn save_round_trips_and_is_idempotent_when_clean() {
        let dir = tempdir().unwrap();
        {
            let table = ReservationTable::new(dir.path());
            table.insert_or_assign("node1", Some("desc".into()));
            table.save().unwrap();
        }
        let table2 = ReservationTable::new(dir.path());
        table2.load().unwrap();
        assert!(table2.contains("node1"));
        table2.save().unwrap(); // clean; no-op
    }
}
