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

//! Validator-manifest forwarding handler (spec §4.D).

use std::sync::Arc;

use libp2p::PeerId;

use crate::dispatch::MessageHandler;
use crate::error::DispatchError;
use crate::message::model::Manifest;
use crate::message::Message;

/// Forwards each manifest in a batch to application code (spec §9).
pub trait ManifestsSink: Send + Sync {
    /// One manifest was received from `peer`.
    fn on_manifest(&self, peer: &PeerId, manifest: &Manifest);
}

/// Forwards `Manifests` batches to a [`ManifestsSink`], one call per entry
/// (spec §4.D).
pub struct ManifestsHandler {
    sink: Arc<dyn ManifestsSink>,
}

impl ManifestsHandler {
    /// A handler forwarding to `sink`.
    pub fn new(sink: Arc<dyn ManifestsSink>) -> Self {
        Self { sink }
    }
}

impl MessageHandler for ManifestsHandler {
    fn handle(&self, peer: &PeerId, message: &Message) -> Result<(), DispatchError> {
        let Message::Manifests(batch) = message else { return Ok(()) };
        for manifest in &batch.list {
            self.sink.on_manifest(peer, manifest);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::model::Manifests;
    use std::sync::Mutex;

    struct RecordingSink(Mutex<usize>);
    impl ManifestsSink for RecordingSink {
        fn on_manifest(&self, _peer: &PeerId, _manifest: &Manifest) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn forwards_each_manifest_in_the_batch() {
        let sink = Arc::new(RecordingSink(Mutex::new(0)));
        let handler = ManifestsHandler::new(sink.clone());
        let peer = PeerId::random();
        let batch = Manifests { list: vec![Manifest { stobject: vec![1] }, Manifest { stobject: vec![2] }] };
        handler.handle(&peer, &Message::Manifests(batch)).unwrap();
        assert_eq!(*sink.0.lock().unwrap(), 2);
    }
}
