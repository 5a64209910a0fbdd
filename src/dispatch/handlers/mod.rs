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

//! Per-type handler implementations (spec §4.D).

pub mod endpoints;
pub mod manifests;
pub mod ping;
pub mod squelch;
pub mod status;
pub mod transaction;

pub use endpoints::{EndpointsHandler, EndpointsSink};
pub use manifests::{ManifestsHandler, ManifestsSink};
pub use ping::{PingEvents, PingHandler};
pub use squelch::SquelchHandler;
pub use status::{PeerStatus, StatusChangeHandler};
pub use transaction::{SeenTracker, TransactionHandler, TransactionSink};
