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
#![allow(missing_docs)]

//! Wire framing: block compression, header pack/parse, and framed I/O.

pub mod compress;
pub mod framed;
pub mod header;

/// Message types eligible for outbound compression (spec §6).
pub const COMPRESSIBLE_TYPES: &[u16] = &[2, 15, 30, 31, 32, 42, 54, 56, 60, 64];

/// Whether outbound compression should even be attempted for `message_type`.
pub fn is_compression_eligible(message_type: u16) -> bool {
    COMPRESSIBLE_TYPES.contains(&message_type)
}
