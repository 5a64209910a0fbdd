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

//! The closed enumeration of wire message types (spec §3).

/// A message type known to this codec. Any other `u16` value is a type this
/// node does not decode; it is counted under the `unknown` traffic category
/// and dropped (spec §7).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageType {
    /// Validator manifest broadcast.
    Manifests = 2,
    /// Keepalive ping/pong.
    Ping = 3,
    /// Cluster node status (trusted-cluster topology only).
    Cluster = 5,
    /// Peer endpoint gossip.
    Endpoints = 15,
    /// A signed transaction.
    Transaction = 30,
    /// Request for ledger data.
    GetLedger = 31,
    /// Ledger data response.
    LedgerData = 32,
    /// Consensus proposal.
    ProposeLedger = 33,
    /// Peer status/phase change.
    StatusChange = 34,
    /// Announcement of a held transaction set.
    HaveSet = 35,
    /// A validation.
    Validation = 41,
    /// Request for raw objects by hash.
    GetObjects = 42,
    /// Signed validator list (UNL) blob.
    ValidatorList = 54,
    /// Instruction to stop/start relaying a validator's messages.
    Squelch = 55,
    /// Collection of validator list blobs.
    ValidatorListCollection = 56,
    /// SHAMap proof-path request.
    ProofPathReq = 57,
    /// SHAMap proof-path response.
    ProofPathResponse = 58,
    /// Ledger replay delta request.
    ReplayDeltaReq = 59,
    /// Ledger replay delta response.
    ReplayDeltaResponse = 60,
    /// Announcement of held transaction hashes.
    HaveTransactions = 63,
    /// A batch of transactions.
    Transactions = 64,
}

impl MessageType {
    /// All known message types, in ascending wire-value order.
    pub const ALL: &'static [MessageType] = &[
        MessageType::Manifests,
        MessageType::Ping,
        MessageType::Cluster,
        MessageType::Endpoints,
        MessageType::Transaction,
        MessageType::GetLedger,
        MessageType::LedgerData,
        MessageType::ProposeLedger,
        MessageType::StatusChange,
        MessageType::HaveSet,
        MessageType::Validation,
        MessageType::GetObjects,
        MessageType::ValidatorList,
        MessageType::Squelch,
        MessageType::ValidatorListCollection,
        MessageType::ProofPathReq,
        MessageType::ProofPathResponse,
        MessageType::ReplayDeltaReq,
        MessageType::ReplayDeltaResponse,
        MessageType::HaveTransactions,
        MessageType::Transactions,
    ];

    /// The wire value for this type.
    pub fn wire_value(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for MessageType {
    type Error = ();

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        MessageType::ALL
            .iter()
            .copied()
            .find(|t| t.wire_value() == value)
            .ok_or(())
    }
}

impl From<MessageType> for u16 {
    fn from(value: MessageType) -> Self {
        value.wire_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_type_round_trips_through_u16() {
        for &t in MessageType::ALL {
            let v: u16 = t.into();
            assert_eq!(MessageType::try_from(v), Ok(t));
        }
    }

    #[test]
    fn unknown_value_is_rejected() {
        assert_eq!(MessageType::try_from(9999), Err(()));
        assert_eq!(MessageType::try_from(1), Err(()));
    }
}
