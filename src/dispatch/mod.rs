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

//! Message dispatch: `type -> ordered handlers`, traffic accounting, and
//! the optional decompression front door (spec §4.D).

pub mod handlers;
pub mod ledger_requests;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use libp2p::PeerId;
use tracing::{debug, warn};

use crate::error::{DispatchError, WireErrorKind};
use crate::message::{self, Message, MessageType};
use crate::traffic::{categorize, TrafficCounters};
use crate::wire::header::Header;

pub use ledger_requests::{LedgerRequestTracker, RequestId};

/// One registered reaction to a decoded message (spec §9: handlers are
/// injected, not singletons).
pub trait MessageHandler: Send + Sync {
    /// React to `message` from `peer`. An `Err` short-circuits the
    /// remaining handlers registered for this message type.
    fn handle(&self, peer: &PeerId, message: &Message) -> Result<(), DispatchError>;
}

/// Holds `type -> ordered handler list` and the shared traffic counters
/// (spec §4.D, §4.E).
pub struct Dispatcher {
    handlers: Mutex<HashMap<MessageType, Vec<Arc<dyn MessageHandler>>>>,
    traffic: Arc<TrafficCounters>,
}

impl Dispatcher {
    /// An empty dispatcher over the given traffic counters.
    pub fn new(traffic: Arc<TrafficCounters>) -> Self {
        Self { handlers: Mutex::new(HashMap::new()), traffic }
    }

    /// Register `handler` to run for `message_type`, after any handler
    /// already registered for that type.
    pub fn register(&self, message_type: MessageType, handler: Arc<dyn MessageHandler>) {
        self.handlers.lock().expect("dispatcher handler map lock poisoned").entry(message_type).or_default().push(handler);
    }

    /// Decode `payload` as `message_type`, record traffic, then invoke
    /// registered handlers in registration order. The first handler error
    /// short-circuits and is returned.
    pub fn dispatch(&self, peer: &PeerId, message_type: MessageType, payload: &[u8], inbound: bool) -> Result<(), DispatchError> {
        self.traffic.add_count(categorize(message_type, inbound), payload.len() as u64);
        let message = message::decode(message_type, payload)?;
        debug!(%peer, msg_type = ?message_type, bytes = payload.len(), "dispatching message");

        let handlers = {
            let guard = self.handlers.lock().expect("dispatcher handler map lock poisoned");
            guard.get(&message_type).cloned().unwrap_or_default()
        };
        for handler in handlers {
            if let Err(e) = handler.handle(peer, &message) {
                warn!(%peer, msg_type = ?message_type, error = %e, "handler rejected message");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Decompress `payload` when `header.compressed`, then [`Dispatcher::dispatch`].
    ///
    /// An unrecognized `header.message_type` is never fatal (spec §7): it is
    /// counted under [`crate::traffic::TrafficCategory::Unknown`] and the
    /// message is dropped, rather than propagated as an error that would
    /// cause a caller to drop the connection.
    pub fn dispatch_raw(&self, peer: &PeerId, header: &Header, payload: &[u8], inbound: bool) -> Result<(), DispatchError> {
        let message_type = match MessageType::try_from(header.message_type) {
            Ok(t) => t,
            Err(_) => {
                debug!(%peer, wire_type = header.message_type, "dropping unrecognized message type");
                self.traffic.add_count(crate::traffic::TrafficCategory::Unknown, payload.len() as u64);
                return Ok(());
            }
        };
        let owned;
        let body: &[u8] = if header.compressed {
            let uncompressed_size = header.uncompressed_size.ok_or(DispatchError::Wire(WireErrorKind::InvalidHeader.into()))?;
            owned = crate::wire::compress::decompress(payload, uncompressed_size as usize)?;
            &owned
        } else {
            payload
        };
        self.dispatch(peer, message_type, body, inbound)
    }
}
