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

//! Ergonomic, plain-data message variants (spec §3, §4.C).
//!
//! Every field here owns its data and equality is structural, independent
//! of the generated protobuf types in [`super::pb`] — those exist purely as
//! a wire-shape bridge in [`super::codec`].

/// One manifest entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    /// Serialized manifest object.
    pub stobject: Vec<u8>,
}

/// A batch of validator manifests.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Manifests {
    /// The manifests in this batch.
    pub list: Vec<Manifest>,
}

/// Ping/pong direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PingType {
    /// A ping, expecting a pong reply.
    Ping,
    /// A pong reply.
    Pong,
}

/// A keepalive ping or pong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ping {
    /// Direction.
    pub kind: PingType,
    /// Correlation sequence number.
    pub seq: Option<u32>,
    /// Echoed send time, present on pongs that answer a timed ping.
    pub ping_time: Option<u64>,
    /// Sender's network time.
    pub net_time: Option<u32>,
}

/// One cluster member's reported status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterNode {
    /// The node's public key.
    pub public_key: Vec<u8>,
    /// Operator-assigned name, if any.
    pub node_name: Option<String>,
    /// When this report was generated (ms since epoch).
    pub report_time: u64,
    /// Reported load factor.
    pub node_load: Option<u32>,
    /// Reported address, if shared.
    pub address: Option<String>,
}

/// Trusted-cluster status broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Cluster {
    /// Member reports in this broadcast.
    pub cluster_nodes: Vec<ClusterNode>,
}

/// One gossiped endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// Dialable endpoint (`host:port` or bare host depending on hop origin).
    pub endpoint: String,
    /// Hop count from the gossiping peer's perspective.
    pub hops: u32,
}

/// A batch of gossiped endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Endpoints {
    /// The endpoints in this batch.
    pub endpoints_v2: Vec<Endpoint>,
    /// Endpoint-gossip protocol version.
    pub version: u32,
}

/// Lifecycle status of a relayed transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Newly observed.
    New,
    /// Currently in the open ledger.
    Current,
    /// Included in a closed/validated ledger.
    Committed,
    /// No longer relevant (e.g. superseded).
    Obsolete,
}

/// A single relayed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Serialized transaction blob.
    pub raw_transaction: Vec<u8>,
    /// Sender-reported status, if known.
    pub status: Option<TransactionStatus>,
    /// Sender's receive timestamp (ms since epoch).
    pub receive_timestamp: Option<u64>,
    /// Whether the sender is holding this transaction deferred.
    pub deferred: Option<bool>,
}

/// A batch of relayed transactions.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Transactions {
    /// The transactions in this batch.
    pub transactions: Vec<Transaction>,
}

/// Announcement of transaction hashes the sender holds.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct HaveTransactions {
    /// Transaction hashes.
    pub hashes: Vec<Vec<u8>>,
}

/// A request for ledger data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetLedger {
    /// What kind of ledger item is being requested.
    pub item_type: u32,
    /// Target ledger hash, if known.
    pub ledger_hash: Option<Vec<u8>>,
    /// Target ledger sequence, if known.
    pub ledger_seq: Option<u32>,
    /// SHAMap node identifiers being requested.
    pub node_ids: Vec<Vec<u8>>,
    /// Query-type flag (request semantics vary by `item_type`).
    pub query_type: Option<bool>,
    /// Requested SHAMap traversal depth.
    pub query_depth: Option<u32>,
}

/// One SHAMap node in a [`LedgerData`] response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerNode {
    /// Serialized node data.
    pub nodedata: Vec<u8>,
    /// Node identifier, if distinct from data-derived.
    pub nodeid: Option<Vec<u8>>,
}

/// A response to [`GetLedger`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerData {
    /// The ledger this data belongs to.
    pub ledger_hash: Vec<u8>,
    /// The ledger's sequence number.
    pub ledger_seq: u32,
    /// Echo of the request's item type.
    pub r#type: u32,
    /// The SHAMap nodes returned.
    pub nodes: Vec<LedgerNode>,
    /// Echoed request cookie for correlation.
    pub request_cookie: Option<u32>,
}

/// A consensus proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposeLedger {
    /// Proposal sequence number.
    pub proposal_seq: u32,
    /// Hash of the proposed transaction set.
    pub current_tx_hash: Vec<u8>,
    /// Proposer's close-time vote.
    pub close_time: u32,
    /// Proposer's public key.
    pub node_pub_key: Vec<u8>,
    /// Signature over the proposal.
    pub signature: Vec<u8>,
    /// Hash of the previous ledger this proposal builds on.
    pub previous_ledger: Vec<u8>,
}

/// A peer status/phase change announcement.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StatusChange {
    /// Reported status code.
    pub new_status: Option<u32>,
    /// Reported event code.
    pub new_event: Option<u32>,
    /// Current ledger sequence.
    pub ledger_seq: Option<u32>,
    /// Current ledger hash.
    pub ledger_hash: Option<Vec<u8>>,
    /// Previous ledger hash.
    pub ledger_hash_previous: Option<Vec<u8>>,
    /// Sender's network time.
    pub network_time: Option<u64>,
    /// First ledger sequence the sender has.
    pub first_seq: Option<u32>,
    /// Last ledger sequence the sender has.
    pub last_seq: Option<u32>,
}

/// Announcement of a held transaction set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HaveSet {
    /// Transaction-set hash.
    pub hash: Vec<u8>,
    /// Possession status code.
    pub status: u32,
}

/// A validation message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    /// Serialized validation blob.
    pub validation: Vec<u8>,
}

/// One object requested or returned by hash.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct IndexedObject {
    /// Object hash.
    pub hash: Option<Vec<u8>>,
    /// SHAMap node identifier.
    pub node_id: Option<Vec<u8>>,
    /// SHAMap key/index.
    pub index: Option<Vec<u8>>,
    /// Object data, present on responses.
    pub data: Option<Vec<u8>>,
    /// Ledger sequence the object belongs to.
    pub ledger_seq: Option<u32>,
}

/// A request/response for raw objects by hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetObjects {
    /// Object-type discriminator.
    pub r#type: u32,
    /// True for a request, false for a response.
    pub query: bool,
    /// Correlation sequence number.
    pub seq: Option<u32>,
    /// Ledger these objects belong to.
    pub ledger_hash: Option<Vec<u8>>,
    /// Whether to include full subtrees ("fat" fetch).
    pub fat: Option<bool>,
    /// The objects themselves.
    pub objects: Vec<IndexedObject>,
}

/// A signed validator-list (UNL) blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorList {
    /// Publisher manifest.
    pub manifest: Vec<u8>,
    /// Serialized list blob.
    pub blob: Vec<u8>,
    /// Signature over the blob.
    pub signature: Vec<u8>,
    /// Blob format version.
    pub version: u32,
}

/// One blob within a [`ValidatorListCollection`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorListCollectionItem {
    /// Serialized list blob.
    pub blob: Vec<u8>,
    /// Signature over the blob.
    pub signature: Vec<u8>,
    /// Blob sequence number.
    pub sequence: Option<u32>,
}

/// A collection of validator-list blobs under one manifest.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ValidatorListCollection {
    /// Collection format version.
    pub version: u32,
    /// Publisher manifest.
    pub manifest: Vec<u8>,
    /// The blobs in this collection.
    pub blobs: Vec<ValidatorListCollectionItem>,
}

/// Instruction to start or stop relaying a validator's messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Squelch {
    /// True to squelch, false to unsquelch.
    pub squelch: bool,
    /// The validator this instruction applies to.
    pub validator_pubkey: Vec<u8>,
    /// Requested squelch duration in seconds, present when `squelch` is true.
    pub duration: Option<u32>,
}

/// A SHAMap proof-path request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofPathRequest {
    /// Ledger the key belongs to.
    pub ledger_hash: Vec<u8>,
    /// SHAMap key being proved.
    pub key: Vec<u8>,
    /// Tree type discriminator.
    pub r#type: Option<String>,
}

/// A SHAMap proof-path response.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ProofPathResponse {
    /// Ledger the key belongs to.
    pub ledger_hash: Vec<u8>,
    /// SHAMap key being proved.
    pub key: Vec<u8>,
    /// Path nodes from leaf to root.
    pub path: Vec<Vec<u8>>,
    /// Serialized ledger header, if requested.
    pub header: Option<Vec<u8>>,
}

/// A ledger replay delta request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayDeltaRequest {
    /// The ledger to replay.
    pub ledger_hash: Vec<u8>,
}

/// A ledger replay delta response.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ReplayDeltaResponse {
    /// Serialized ledger header.
    pub ledger_header: Vec<u8>,
    /// Serialized transactions, in execution order.
    pub transaction: Vec<Vec<u8>>,
}

/// The closed set of decodable message payloads.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// See [`Manifests`].
    Manifests(Manifests),
    /// See [`Ping`].
    Ping(Ping),
    /// See [`Cluster`].
    Cluster(Cluster),
    /// See [`Endpoints`].
    Endpoints(Endpoints),
    /// See [`Transaction`].
    Transaction(Transaction),
    /// See [`GetLedger`].
    GetLedger(GetLedger),
    /// See [`LedgerData`].
    LedgerData(LedgerData),
    /// See [`ProposeLedger`].
    ProposeLedger(ProposeLedger),
    /// See [`StatusChange`].
    StatusChange(StatusChange),
    /// See [`HaveSet`].
    HaveSet(HaveSet),
    /// See [`Validation`].
    Validation(Validation),
    /// See [`GetObjects`].
    GetObjects(GetObjects),
    /// See [`ValidatorList`].
    ValidatorList(ValidatorList),
    /// See [`Squelch`].
    Squelch(Squelch),
    /// See [`ValidatorListCollection`].
    ValidatorListCollection(ValidatorListCollection),
    /// See [`ProofPathRequest`].
    ProofPathReq(ProofPathRequest),
    /// See [`ProofPathResponse`].
    ProofPathResponse(ProofPathResponse),
    /// See [`ReplayDeltaRequest`].
    ReplayDeltaReq(ReplayDeltaRequest),
    /// See [`ReplayDeltaResponse`].
    ReplayDeltaResponse(ReplayDeltaResponse),
    /// See [`HaveTransactions`].
    HaveTransactions(HaveTransactions),
    /// See [`Transactions`].
    Transactions(Transactions),
}

impl Message {
    /// The wire type this payload is carried as.
    pub fn message_type(&self) -> super::types::MessageType {
        use super::types::MessageType as T;
        match self {
            Message::Manifests(_) => T::Manifests,
            Message::Ping(_) => T::Ping,
            Message::Cluster(_) => T::Cluster,
            Message::Endpoints(_) => T::Endpoints,
            Message::Transaction(_) => T::Transaction,
            Message::GetLedger(_) => T::GetLedger,
            Message::LedgerData(_) => T::LedgerData,
            Message::ProposeLedger(_) => T::ProposeLedger,
            Message::StatusChange(_) => T::StatusChange,
            Message::HaveSet(_) => T::HaveSet,
            Message::Validation(_) => T::Validation,
            Message::GetObjects(_) => T::GetObjects,
            Message::ValidatorList(_) => T::ValidatorList,
            Message::Squelch(_) => T::Squelch,
            Message::ValidatorListCollection(_) => T::ValidatorListCollection,
            Message::ProofPathReq(_) => T::ProofPathReq,
            Message::ProofPathResponse(_) => T::ProofPathResponse,
            Message::ReplayDeltaReq(_) => T::ReplayDeltaReq,
            Message::ReplayDeltaResponse(_) => T::ReplayDeltaResponse,
            Message::HaveTransactions(_) => T::HaveTransactions,
            Message::Transactions(_) => T::Transactions,
        }
    }
}
