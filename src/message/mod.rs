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

//! The message model: wire types, the ergonomic [`model::Message`] enum,
//! the generated protobuf bridge, and the codec tying them together
//! (spec §3, §4.C).

pub mod codec;
pub mod model;
pub mod pb;
pub mod types;

pub use codec::{decode, encode};
pub use model::Message;
pub use types::MessageType;
