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

//! Bridges the ergonomic [`super::model::Message`] to the generated
//! protobuf types in [`super::pb`] and back (spec §4.C).
//!
//! `decode(t, encode(m)) == m` for every known variant `t`/`m`; the
//! conversions below are where that bijection and the optional-field
//! defaulting rules are enforced.

use prost::Message as _;

use super::{model::*, pb, types::MessageType};
use crate::error::{WireError, WireErrorKind};

fn pb_ping_type(kind: PingType) -> i32 {
    match kind {
        PingType::Ping => pb::PingType::PingTypePing as i32,
        PingType::Pong => pb::PingType::PingTypePong as i32,
    }
}

fn model_ping_type(raw: i32) -> PingType {
    if raw == pb::PingType::PingTypePong as i32 {
        PingType::Pong
    } else {
        PingType::Ping
    }
}

fn pb_tx_status(status: TransactionStatus) -> i32 {
    match status {
        TransactionStatus::New => pb::TransactionStatus::TsNew as i32,
        TransactionStatus::Current => pb::TransactionStatus::TsCurrent as i32,
        TransactionStatus::Committed => pb::TransactionStatus::TsCommitted as i32,
        TransactionStatus::Obsolete => pb::TransactionStatus::TsObsolete as i32,
    }
}

fn model_tx_status(raw: i32) -> TransactionStatus {
    match raw {
        x if x == pb::TransactionStatus::TsCurrent as i32 => TransactionStatus::Current,
        x if x == pb::TransactionStatus::TsCommitted as i32 => TransactionStatus::Committed,
        x if x == pb::TransactionStatus::TsObsolete as i32 => TransactionStatus::Obsolete,
        _ => TransactionStatus::New,
    }
}

fn pb_manifests(m: &Manifests) -> pb::ManifestBatch {
    pb::ManifestBatch {
        list: m
            .list
            .iter()
            .map(|e| pb::ManifestEntry { stobject: e.stobject.clone() })
            .collect(),
    }
}

fn model_manifests(m: pb::ManifestBatch) -> Manifests {
    Manifests {
        list: m
            .list
            .into_iter()
            .map(|e| Manifest { stobject: e.stobject })
            .collect(),
    }
}

fn pb_ping(p: &Ping) -> pb::PingMsg {
    pb::PingMsg {
        r#type: pb_ping_type(p.kind),
        seq: p.seq,
        ping_time: p.ping_time,
        net_time: p.net_time,
    }
}

fn model_ping(p: pb::PingMsg) -> Ping {
    Ping {
        kind: model_ping_type(p.r#type),
        seq: p.seq,
        ping_time: p.ping_time,
        net_time: p.net_time,
    }
}

fn pb_cluster(c: &Cluster) -> pb::ClusterMsg {
    pb::ClusterMsg {
        cluster_nodes: c
            .cluster_nodes
            .iter()
            .map(|n| pb::ClusterNode {
                public_key: n.public_key.clone(),
                node_name: n.node_name.clone(),
                report_time: n.report_time,
                node_load: n.node_load,
                address: n.address.clone(),
            })
            .collect(),
    }
}

fn model_cluster(c: pb::ClusterMsg) -> Cluster {
    Cluster {
        cluster_nodes: c
            .cluster_nodes
            .into_iter()
            .map(|n| ClusterNode {
                public_key: n.public_key,
                node_name: n.node_name,
                report_time: n.report_time,
                node_load: n.node_load,
                address: n.address,
            })
            .collect(),
    }
}

fn pb_endpoints(e: &Endpoints) -> pb::EndpointBatch {
    pb::EndpointBatch {
        endpoints_v2: e
            .endpoints_v2
            .iter()
            .map(|ep| pb::EndpointEntry { endpoint: ep.endpoint.clone(), hops: ep.hops })
            .collect(),
        version: e.version,
    }
}

fn model_endpoints(e: pb::EndpointBatch) -> Endpoints {
    Endpoints {
        endpoints_v2: e
            .endpoints_v2
            .into_iter()
            .map(|ep| Endpoint { endpoint: ep.endpoint, hops: ep.hops })
            .collect(),
        version: e.version,
    }
}

fn pb_transaction(t: &Transaction) -> pb::TransactionMsg {
    pb::TransactionMsg {
        raw_transaction: t.raw_transaction.clone(),
        status: t.status.map(pb_tx_status),
        receive_timestamp: t.receive_timestamp,
        deferred: t.deferred,
    }
}

fn model_transaction(t: pb::TransactionMsg) -> Transaction {
    Transaction {
        raw_transaction: t.raw_transaction,
        status: t.status.map(model_tx_status),
        receive_timestamp: t.receive_timestamp,
        deferred: t.deferred,
    }
}

fn pb_transactions(t: &Transactions) -> pb::TransactionBatch {
    pb::TransactionBatch {
        transactions: t.transactions.iter().map(pb_transaction).collect(),
    }
}

fn model_transactions(t: pb::TransactionBatch) -> Transactions {
    Transactions {
        transactions: t.transactions.into_iter().map(model_transaction).collect(),
    }
}

fn pb_have_transactions(h: &HaveTransactions) -> pb::HaveTransactionsMsg {
    pb::HaveTransactionsMsg { hashes: h.hashes.clone() }
}

fn model_have_transactions(h: pb::HaveTransactionsMsg) -> HaveTransactions {
    HaveTransactions { hashes: h.hashes }
}

fn pb_get_ledger(g: &GetLedger) -> pb::GetLedgerMsg {
    pb::GetLedgerMsg {
        item_type: g.item_type,
        ledger_hash: g.ledger_hash.clone(),
        ledger_seq: g.ledger_seq,
        node_ids: g.node_ids.clone(),
        query_type: g.query_type,
        query_depth: g.query_depth,
    }
}

fn model_get_ledger(g: pb::GetLedgerMsg) -> GetLedger {
    GetLedger {
        item_type: g.item_type,
        ledger_hash: g.ledger_hash,
        ledger_seq: g.ledger_seq,
        node_ids: g.node_ids,
        query_type: g.query_type,
        query_depth: g.query_depth,
    }
}

fn pb_ledger_data(l: &LedgerData) -> pb::LedgerDataMsg {
    pb::LedgerDataMsg {
        ledger_hash: l.ledger_hash.clone(),
        ledger_seq: l.ledger_seq,
        r#type: l.r#type,
        nodes: l
            .nodes
            .iter()
            .map(|n| pb::LedgerNodeEntry { nodedata: n.nodedata.clone(), nodeid: n.nodeid.clone() })
            .collect(),
        request_cookie: l.request_cookie,
    }
}

fn model_ledger_data(l: pb::LedgerDataMsg) -> LedgerData {
    LedgerData {
        ledger_hash: l.ledger_hash,
        ledger_seq: l.ledger_seq,
        r#type: l.r#type,
        nodes: l
            .nodes
            .into_iter()
            .map(|n| LedgerNode { nodedata: n.nodedata, nodeid: n.nodeid })
            .collect(),
        request_cookie: l.request_cookie,
    }
}

fn pb_propose_ledger(p: &ProposeLedger) -> pb::ProposeSetMsg {
    pb::ProposeSetMsg {
        proposal_seq: p.proposal_seq,
        current_tx_hash: p.current_tx_hash.clone(),
        close_time: p.close_time,
        node_pub_key: p.node_pub_key.clone(),
        signature: p.signature.clone(),
        previous_ledger: p.previous_ledger.clone(),
    }
}

fn model_propose_ledger(p: pb::ProposeSetMsg) -> ProposeLedger {
    ProposeLedger {
        proposal_seq: p.proposal_seq,
        current_tx_hash: p.current_tx_hash,
        close_time: p.close_time,
        node_pub_key: p.node_pub_key,
        signature: p.signature,
        previous_ledger: p.previous_ledger,
    }
}

fn pb_status_change(s: &StatusChange) -> pb::StatusChangeMsg {
    pb::StatusChangeMsg {
        new_status: s.new_status,
        new_event: s.new_event,
        ledger_seq: s.ledger_seq,
        ledger_hash: s.ledger_hash.clone(),
        ledger_hash_previous: s.ledger_hash_previous.clone(),
        network_time: s.network_time,
        first_seq: s.first_seq,
        last_seq: s.last_seq,
    }
}

fn model_status_change(s: pb::StatusChangeMsg) -> StatusChange {
    StatusChange {
        new_status: s.new_status,
        new_event: s.new_event,
        ledger_seq: s.ledger_seq,
        ledger_hash: s.ledger_hash,
        ledger_hash_previous: s.ledger_hash_previous,
        network_time: s.network_time,
        first_seq: s.first_seq,
        last_seq: s.last_seq,
    }
}

fn pb_have_set(h: &HaveSet) -> pb::HaveTransactionSetMsg {
    pb::HaveTransactionSetMsg { hash: h.hash.clone(), status: h.status }
}

fn model_have_set(h: pb::HaveTransactionSetMsg) -> HaveSet {
    HaveSet { hash: h.hash, status: h.status }
}

fn pb_validation(v: &Validation) -> pb::ValidationMsg {
    pb::ValidationMsg { validation: v.validation.clone() }
}

fn model_validation(v: pb::ValidationMsg) -> Validation {
    Validation { validation: v.validation }
}

fn pb_get_objects(g: &GetObjects) -> pb::GetObjectByHashMsg {
    pb::GetObjectByHashMsg {
        r#type: g.r#type,
        query: g.query,
        seq: g.seq,
        ledger_hash: g.ledger_hash.clone(),
        fat: g.fat,
        objects: g
            .objects
            .iter()
            .map(|o| pb::IndexedObjectEntry {
                hash: o.hash.clone(),
                node_id: o.node_id.clone(),
                index: o.index.clone(),
                data: o.data.clone(),
                ledger_seq: o.ledger_seq,
            })
            .collect(),
    }
}

fn model_get_objects(g: pb::GetObjectByHashMsg) -> GetObjects {
    GetObjects {
        r#type: g.r#type,
        query: g.query,
        seq: g.seq,
        ledger_hash: g.ledger_hash,
        fat: g.fat,
        objects: g
            .objects
            .into_iter()
            .map(|o| IndexedObject {
                hash: o.hash,
                node_id: o.node_id,
                index: o.index,
                data: o.data,
                ledger_seq: o.ledger_seq,
            })
            .collect(),
    }
}

fn pb_validator_list(v: &ValidatorList) -> pb::ValidatorListMsg {
    pb::ValidatorListMsg {
        manifest: v.manifest.clone(),
        blob: v.blob.clone(),
        signature: v.signature.clone(),
        version: v.version,
    }
}

fn model_validator_list(v: pb::ValidatorListMsg) -> ValidatorList {
    ValidatorList {
        manifest: v.manifest,
        blob: v.blob,
        signature: v.signature,
        version: v.version,
    }
}

fn pb_validator_list_collection(v: &ValidatorListCollection) -> pb::ValidatorListCollectionMsg {
    pb::ValidatorListCollectionMsg {
        version: v.version,
        manifest: v.manifest.clone(),
        blobs: v
            .blobs
            .iter()
            .map(|b| pb::ValidatorListCollectionItemEntry {
                blob: b.blob.clone(),
                signature: b.signature.clone(),
                sequence: b.sequence,
            })
            .collect(),
    }
}

fn model_validator_list_collection(v: pb::ValidatorListCollectionMsg) -> ValidatorListCollection {
    ValidatorListCollection {
        version: v.version,
        manifest: v.manifest,
        blobs: v
            .blobs
            .into_iter()
            .map(|b| ValidatorListCollectionItem {
                blob: b.blob,
                signature: b.signature,
                sequence: b.sequence,
            })
            .collect(),
    }
}

fn pb_squelch(s: &Squelch) -> pb::SquelchMsg {
    pb::SquelchMsg {
        squelch: s.squelch,
        validator_pubkey: s.validator_pubkey.clone(),
        duration: s.duration,
    }
}

fn model_squelch(s: pb::SquelchMsg) -> Squelch {
    Squelch {
        squelch: s.squelch,
        validator_pubkey: s.validator_pubkey,
        duration: s.duration,
    }
}

fn pb_proof_path_request(p: &ProofPathRequest) -> pb::ProofPathRequestMsg {
    pb::ProofPathRequestMsg {
        ledger_hash: p.ledger_hash.clone(),
        key: p.key.clone(),
        r#type: p.r#type.clone(),
    }
}

fn model_proof_path_request(p: pb::ProofPathRequestMsg) -> ProofPathRequest {
    ProofPathRequest {
        ledger_hash: p.ledger_hash,
        key: p.key,
        r#type: p.r#type,
    }
}

fn pb_proof_path_response(p: &ProofPathResponse) -> pb::ProofPathResponseMsg {
    pb::ProofPathResponseMsg {
        ledger_hash: p.ledger_hash.clone(),
        key: p.key.clone(),
        path: p.path.clone(),
        header: p.header.clone(),
    }
}

fn model_proof_path_response(p: pb::ProofPathResponseMsg) -> ProofPathResponse {
    ProofPathResponse {
        ledger_hash: p.ledger_hash,
        key: p.key,
        path: p.path,
        header: p.header,
    }
}

fn pb_replay_delta_request(r: &ReplayDeltaRequest) -> pb::ReplayDeltaRequestMsg {
    pb::ReplayDeltaRequestMsg { ledger_hash: r.ledger_hash.clone() }
}

fn model_replay_delta_request(r: pb::ReplayDeltaRequestMsg) -> ReplayDeltaRequest {
    ReplayDeltaRequest { ledger_hash: r.ledger_hash }
}

fn pb_replay_delta_response(r: &ReplayDeltaResponse) -> pb::ReplayDeltaResponseMsg {
    pb::ReplayDeltaResponseMsg {
        ledger_header: r.ledger_header.clone(),
        transaction: r.transaction.clone(),
    }
}

fn model_replay_delta_response(r: pb::ReplayDeltaResponseMsg) -> ReplayDeltaResponse {
    ReplayDeltaResponse {
        ledger_header: r.ledger_header,
        transaction: r.transaction,
    }
}

/// Encode a known message to its wire bytes.
pub fn encode(message: &Message) -> Vec<u8> {
    match message {
        Message::Manifests(m) => pb_manifests(m).encode_to_vec(),
        Message::Ping(m) => pb_ping(m).encode_to_vec(),
        Message::Cluster(m) => pb_cluster(m).encode_to_vec(),
        Message::Endpoints(m) => pb_endpoints(m).encode_to_vec(),
        Message::Transaction(m) => pb_transaction(m).encode_to_vec(),
        Message::GetLedger(m) => pb_get_ledger(m).encode_to_vec(),
        Message::LedgerData(m) => pb_ledger_data(m).encode_to_vec(),
        Message::ProposeLedger(m) => pb_propose_ledger(m).encode_to_vec(),
        Message::StatusChange(m) => pb_status_change(m).encode_to_vec(),
        Message::HaveSet(m) => pb_have_set(m).encode_to_vec(),
        Message::Validation(m) => pb_validation(m).encode_to_vec(),
        Message::GetObjects(m) => pb_get_objects(m).encode_to_vec(),
        Message::ValidatorList(m) => pb_validator_list(m).encode_to_vec(),
        Message::Squelch(m) => pb_squelch(m).encode_to_vec(),
        Message::ValidatorListCollection(m) => pb_validator_list_collection(m).encode_to_vec(),
        Message::ProofPathReq(m) => pb_proof_path_request(m).encode_to_vec(),
        Message::ProofPathResponse(m) => pb_proof_path_response(m).encode_to_vec(),
        Message::ReplayDeltaReq(m) => pb_replay_delta_request(m).encode_to_vec(),
        Message::ReplayDeltaResponse(m) => pb_replay_delta_response(m).encode_to_vec(),
        Message::HaveTransactions(m) => pb_have_transactions(m).encode_to_vec(),
        Message::Transactions(m) => pb_transactions(m).encode_to_vec(),
    }
}

/// Decode `bytes` as `message_type`. Unknown types are rejected before this
/// is ever called (see [`MessageType::try_from`]); this function only
/// handles the closed, known enumeration.
pub fn decode(message_type: MessageType, bytes: &[u8]) -> Result<Message, WireError> {
    let bad = || WireError::from(WireErrorKind::DecodeFailed);
    Ok(match message_type {
        MessageType::Manifests => Message::Manifests(model_manifests(pb::ManifestBatch::decode(bytes).map_err(|_| bad())?)),
        MessageType::Ping => Message::Ping(model_ping(pb::PingMsg::decode(bytes).map_err(|_| bad())?)),
        MessageType::Cluster => Message::Cluster(model_cluster(pb::ClusterMsg::decode(bytes).map_err(|_| bad())?)),
        MessageType::Endpoints => Message::Endpoints(model_endpoints(pb::EndpointBatch::decode(bytes).map_err(|_| bad())?)),
        MessageType::Transaction => Message::Transaction(model_transaction(pb::TransactionMsg::decode(bytes).map_err(|_| bad())?)),
        MessageType::GetLedger => Message::GetLedger(model_get_ledger(pb::GetLedgerMsg::decode(bytes).map_err(|_| bad())?)),
        MessageType::LedgerData => Message::LedgerData(model_ledger_data(pb::LedgerDataMsg::decode(bytes).map_err(|_| bad())?)),
        MessageType::ProposeLedger => {
            Message::ProposeLedger(model_propose_ledger(pb::ProposeSetMsg::decode(bytes).map_err(|_| bad())?))
        }
        MessageType::StatusChange => {
            Message::StatusChange(model_status_change(pb::StatusChangeMsg::decode(bytes).map_err(|_| bad())?))
        }
        MessageType::HaveSet => Message::HaveSet(model_have_set(pb::HaveTransactionSetMsg::decode(bytes).map_err(|_| bad())?)),
        MessageType::Validation => Message::Validation(model_validation(pb::ValidationMsg::decode(bytes).map_err(|_| bad())?)),
        MessageType::GetObjects => {
            Message::GetObjects(model_get_objects(pb::GetObjectByHashMsg::decode(bytes).map_err(|_| bad())?))
        }
        MessageType::ValidatorList => {
            Message::ValidatorList(model_validator_list(pb::ValidatorListMsg::decode(bytes).map_err(|_| bad())?))
        }
        MessageType::Squelch => Message::Squelch(model_squelch(pb::SquelchMsg::decode(bytes).map_err(|_| bad())?)),
        MessageType::ValidatorListCollection => Message::ValidatorListCollection(model_validator_list_collection(
            pb::ValidatorListCollectionMsg::decode(bytes).map_err(|_| bad())?,
        )),
        MessageType::ProofPathReq => {
            Message::ProofPathReq(model_proof_path_request(pb::ProofPathRequestMsg::decode(bytes).map_err(|_| bad())?))
        }
        MessageType::ProofPathResponse => Message::ProofPathResponse(model_proof_path_response(
            pb::ProofPathResponseMsg::decode(bytes).map_err(|_| bad())?,
        )),
        MessageType::ReplayDeltaReq => Message::ReplayDeltaReq(model_replay_delta_request(
            pb::ReplayDeltaRequestMsg::decode(bytes).map_err(|_| bad())?,
        )),
        MessageType::ReplayDeltaResponse => Message::ReplayDeltaResponse(model_replay_delta_response(
            pb::ReplayDeltaResponseMsg::decode(bytes).map_err(|_| bad())?,
        )),
        MessageType::HaveTransactions => {
            Message::HaveTransactions(model_have_transactions(pb::HaveTransactionsMsg::decode(bytes).map_err(|_| bad())?))
        }
        MessageType::Transactions => {
            Message::Transactions(model_transactions(pb::TransactionBatch::decode(bytes).map_err(|_| bad())?))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(message: Message) {
        let t = message.message_type();
        let bytes = encode(&message);
        let decoded = decode(t, &bytes).expect("decode");
        assert_eq!(decoded, message);
    }

    #[test]
    fn ping_round_trips() {
        round_trip(Message::Ping(Ping {
            kind: PingType::Pong,
            seq: Some(7),
            ping_time: Some(123456),
            net_time: None,
        }));
    }

    #[test]
    fn endpoints_round_trips() {
        round_trip(Message::Endpoints(Endpoints {
            endpoints_v2: vec![
                Endpoint { endpoint: "10.0.0.1:51235".into(), hops: 1 },
                Endpoint { endpoint: "10.0.0.2:51235".into(), hops: 2 },
            ],
            version: 2,
        }));
    }

    #[test]
    fn transaction_round_trips_with_absent_optionals() {
        round_trip(Message::Transaction(Transaction {
            raw_transaction: vec![1, 2, 3],
            status: None,
            receive_timestamp: None,
            deferred: None,
        }));
        round_trip(Message::Transaction(Transaction {
            raw_transaction: vec![1, 2, 3],
            status: Some(TransactionStatus::Committed),
            receive_timestamp: Some(42),
            deferred: Some(true),
        }));
    }

    #[test]
    fn squelch_round_trips() {
        round_trip(Message::Squelch(Squelch {
            squelch: true,
            validator_pubkey: vec![9; 33],
            duration: Some(600),
        }));
    }

    #[test]
    fn manifests_round_trips_empty_and_populated() {
        round_trip(Message::Manifests(Manifests::default()));
        round_trip(Message::Manifests(Manifests {
            list: vec![Manifest { stobject: vec![1, 2] }],
        }));
    }

    #[test]
    fn decode_rejects_garbage_bytes_for_length_delimited_fields() {
        // An invalid varint-length prefix on a bytes field is a decode error.
        let garbage = vec![0x0A, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert!(decode(MessageType::Manifests, &garbage).is_err());
    }
}
