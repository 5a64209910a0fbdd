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

//! Persistent, ranked store of known endpoints (spec §4.I), used to seed
//! discovery across restarts.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::capability::Clock;
use crate::error::BootCacheError;

const MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;
const FILE_NAME: &str = "peerfinder.cache";

/// One boot-cache entry as persisted to disk.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    /// Endpoint host/address.
    pub addr: String,
    /// Endpoint port.
    pub port: u16,
    /// Ranking score: rises on success, falls on failure.
    pub valence: u32,
    /// Consecutive recorded failures.
    pub fail_count: u32,
    /// Unix seconds of the last successful contact or insert/refresh.
    pub last_seen: u64,
    /// Unix seconds of the last recorded failure, if any.
    pub last_failed: Option<u64>,
}

struct Inner {
    entries: HashMap<(String, u16), CacheEntry>,
    dirty: bool,
}

/// Ranked store of candidate endpoints (spec §4.I).
pub struct BootCache {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl BootCache {
    /// An empty cache backed by `<data_dir>/peerfinder.cache`.
    pub fn new(data_dir: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Self {
        Self { path: data_dir.as_ref().join(FILE_NAME), clock, inner: Mutex::new(Inner { entries: HashMap::new(), dirty: false }) }
    }

    fn now_s(&self) -> u64 {
        self.clock.now_unix_ms() / 1000
    }

    /// Load from disk, discarding entries older than 7 days. Missing file
    /// is not an error (an empty cache is the natural starting state).
    pub fn load(&self) -> Result<(), BootCacheError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(_) => return Err(BootCacheError::Read),
        };
        let parsed: Vec<CacheEntry> = serde_json::from_str(&raw).map_err(|_| BootCacheError::Parse)?;
        let now = self.now_s();
        let mut inner = self.inner.lock().expect("boot cache lock poisoned");
        inner.entries = parsed
            .into_iter()
            .filter(|e| now.saturating_sub(e.last_seen) <= MAX_AGE_SECS)
            .map(|e| ((e.addr.clone(), e.port), e))
            .collect();
        inner.dirty = false;
        Ok(())
    }

    /// Insert a new endpoint (`valence = 1`) or, if already present,
    /// refresh `last_seen` and increment `valence`.
    pub fn insert(&self, addr: &str, port: u16) {
        let now = self.now_s();
        let mut inner = self.inner.lock().expect("boot cache lock poisoned");
        let key = (addr.to_string(), port);
        inner
            .entries
            .entry(key)
            .and_modify(|e| {
                e.last_seen = now;
                e.valence += 1;
            })
            .or_insert(CacheEntry { addr: addr.to_string(), port, valence: 1, fail_count: 0, last_seen: now, last_failed: None });
        inner.dirty = true;
    }

    /// Refresh `last_seen`, increment `valence`, reset `fail_count` to 0.
    pub fn mark_success(&self, addr: &str, port: u16) {
        let now = self.now_s();
        let mut inner = self.inner.lock().expect("boot cache lock poisoned");
        if let Some(e) = inner.entries.get_mut(&(addr.to_string(), port)) {
            e.last_seen = now;
            e.valence += 1;
            e.fail_count = 0;
            inner.dirty = true;
        }
    }

    /// Increment `fail_count`, record `last_failed`, decrement `valence`
    /// (clamped at 0).
    pub fn mark_failed(&self, addr: &str, port: u16) {
        let now = self.now_s();
        let mut inner = self.inner.lock().expect("boot cache lock poisoned");
        if let Some(e) = inner.entries.get_mut(&(addr.to_string(), port)) {
            e.fail_count += 1;
            e.last_failed = Some(now);
            e.valence = e.valence.saturating_sub(1);
            inner.dirty = true;
        }
    }

    /// Up to `n` entries, ranked by `valence` descending (stable on ties,
    /// preserving insertion order among equal-valence entries).
    pub fn get_endpoints(&self, n: usize) -> Vec<CacheEntry> {
        let inner = self.inner.lock().expect("boot cache lock poisoned");
        let mut entries: Vec<CacheEntry> = inner.entries.values().cloned().collect();
        entries.sort_by(|a, b| b.valence.cmp(&a.valence));
        entries.truncate(n);
        entries
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("boot cache lock poisoned").entries.len()
    }

    /// True if no entries are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write to disk only if entries have changed since the last save,
    /// via a temp-file-then-rename atomic write with `0644` permissions
    /// (and `0755` on the parent directory) on Unix.
    pub fn save(&self) -> Result<(), BootCacheError> {
        let mut inner = self.inner.lock().expect("boot cache lock poisoned");
        if !inner.dirty {
            return Ok(());
        }
        let mut entries: Vec<&CacheEntry> = inner.entries.values().collect();
        entries.sort_by(|a, b| (&a.addr, a.port).cmp(&(&b.addr, b.port)));
        let json = serde_json::to_string_pretty(&entries).map_err(|_| BootCacheError::Serialize)?;
        atomic_write(&self.path, json.as_bytes())?;
        inner.dirty = false;
        Ok(())
    }
}

pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), BootCacheError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|_| BootCacheError::Write)?;
            set_dir_permissions(parent);
        }
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, bytes).map_err(|_| BootCacheError::Write)?;
    set_file_permissions(&tmp_path);
    fs::rename(&tmp_path, path).map_err(|_| BootCacheError::Write)?;
    Ok(())
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o755));
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) {
    // No POSIX permission model to apply on this target.
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o644));
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) {
    // No POSIX permission model to apply on this target.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeClock;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn insert_then_success_then_failure_tracks_valence() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(FakeClock::new());
        let cache = BootCache::new(dir.path(), clock);
        cache.insert("10.0.0.1", 51235);
        assert_eq!(cache.get_endpoints(1)[0].valence, 1);
        cache.mark_success("10.0.0.1", 51235);
        assert_eq!(cache.get_endpoints(1)[0].valence, 2);
        cache.mark_failed("10.0.0.1", 51235);
        let e = &cache.get_endpoints(1)[0];
        assert_eq!(e.valence, 1);
        assert_eq!(e.fail_count, 1);
    }

    #[test]
    fn valence_never_goes_negative() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(FakeClock::new());
        let cache = BootCache::new(dir.path(), clock);
        cache.insert("10.0.0.1", 51235);
        for _ in 0..5 {
            cache.mark_failed("10.0.0.1", 51235);
        }
        assert_eq!(cache.get_endpoints(1)[0].valence, 0);
    }

    #[test]
    fn get_endpoints_sorted_by_valence_descending() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(FakeClock::new());
        let cache = BootCache::new(dir.path(), clock);
        cache.insert("a", 1);
        cache.insert("b", 1);
        cache.mark_success("b", 1);
        cache.mark_success("b", 1);
        let top = cache.get_endpoints(2);
        assert_eq!(top[0].addr, "b");
        assert_eq!(top[1].addr, "a");
    }

    #[test]
    fn save_and_load_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(FakeClock::new());
        {
            let cache = BootCache::new(dir.path(), clock.clone());
            cache.insert("10.0.0.1", 51235);
            cache.mark_success("10.0.0.1", 51235);
            cache.save().unwrap();
        }
        let cache2 = BootCache::new(dir.path(), clock);
        cache2.load().unwrap();
        assert_eq!(cache2.len(), 1);
        assert_eq!(cache2.get_endpoints(1)[0].valence, 2);
    }

    #[test]
    fn load_discards_entries_older_than_seven_days() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(FakeClock::new());
        {
            let cache = BootCache::new(dir.path(), clock.clone());
            cache.insert("stale", 1);
            cache.save().unwrap();
        }
        clock.advance(Duration::from_secs(8 * 24 * 60 * 60));
        let cache2 = BootCache::new(dir.path(), clock);
        cache2.load().unwrap();
        assert!(cache2.is_empty());
    }

    #[test]
    fn save_is_a_no_op_when_clean() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(FakeClock::new());
        let cache = BootCache::new(dir.path(), clock);
        // never dirtied
        cache.save().unwrap();
        assert!(!dir.path().join(FILE_NAME).exists());
    }
}
