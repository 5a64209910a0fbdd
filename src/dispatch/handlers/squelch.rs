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

//! Receive-side squelch handler (spec §4.D, consolidated with §4.N).

use std::sync::Arc;

use libp2p::PeerId;

use crate::dispatch::MessageHandler;
use crate::error::DispatchError;
use crate::message::Message;
use crate::squelch::SquelchTable;

/// Applies `Squelch` instructions to a shared [`SquelchTable`] (spec §4.D).
pub struct SquelchHandler {
    table: Arc<SquelchTable>,
}

impl SquelchHandler {
    /// A handler over a shared squelch table.
    pub fn new(table: Arc<SquelchTable>) -> Self {
        Self { table }
    }
}

impl MessageHandler for SquelchHandler {
    fn handle(&self, _peer: &PeerId, message: &Message) -> Result<(), DispatchError> {
        let Message::Squelch(instruction) = message else { return Ok(()) };
        if instruction.squelch {
            let duration = instruction.duration.unwrap_or(0) as u64;
            self.table.add_squelch(&instruction.validator_pubkey, duration);
        } else {
            self.table.remove_squelch(&instruction.validator_pubkey);
        }
        Ok(())
    }
}
