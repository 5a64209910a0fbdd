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

//! Amunchain peer-core — the connection-and-gossip layer of an XRPL-style
//! overlay network, independent of consensus, ledger storage, or RPC.
//!
//! This crate provides:
//! - A bit-exact wire frame codec with optional LZ4 block compression
//! - A protobuf-shaped message model and dispatcher with per-type handlers
//! - Peer admission: resource charging, scoring, connection slots
//! - Peer discovery: boot cache, reservations, recent-endpoints gossip guard
//! - Per-validator relay squelching to bound validation/proposal fan-out
//! - Prometheus metrics and structured logging around all of the above

/// Narrow capability interfaces the core depends on instead of reaching
/// into a collaborator's internals directly.
pub mod capability;
/// Durable boot-strapping cache of known peer addresses.
pub mod bootcache;
/// Runtime configuration, loaded from TOML.
pub mod config;
/// Message dispatch: per-type handler registry and traffic accounting hook.
pub mod dispatch;
/// Peer discovery: known/connected bookkeeping and connection maintenance.
pub mod discovery;
/// Crate-wide error kinds, one `thiserror` enum per component.
pub mod error;
/// Protobuf-shaped wire message types and their plain-data bridge.
pub mod message;
/// Prometheus metrics and an optional standalone metrics/health server.
pub mod metrics;
/// Recent-endpoints gossip-suppression filter.
pub mod recent_endpoints;
/// Per-validator relay squelching.
pub mod reduce_relay;
/// Durable node-identity allowlist.
pub mod reservations;
/// Per-connection resource accounting and admission control.
pub mod resource;
/// Composite peer reputation scoring.
pub mod score;
/// Connection slot lifecycle state machine.
pub mod slot;
/// Receive-side squelch table.
pub mod squelch;
/// Traffic accounting by category.
pub mod traffic;
/// Wire framing: header pack/parse, block compression.
pub mod wire;

#[cfg(test)]
mod test_support;
