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

//! A deterministic [`Clock`] for tests, shared across modules instead of
//! every `#[cfg(test)] mod tests` reinventing one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::capability::Clock;

/// A clock that starts at process-start `Instant::now()` and only moves
/// when [`FakeClock::advance`] is called.
pub struct FakeClock {
    base: Instant,
    base_unix_ms: u64,
    offset_ms: AtomicU64,
}

impl FakeClock {
    /// A fresh clock pinned to an arbitrary, fixed wall-clock origin.
    pub fn new() -> Self {
        Self { base: Instant::now(), base_unix_ms: 1_700_000_000_000, offset_ms: AtomicU64::new(0) }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.offset_ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }

    fn now_unix_ms(&self) -> u64 {
        self.base_unix_ms + self.offset_ms.load(Ordering::SeqCst)
    }
}
