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

//! Node-wide configuration (spec §6), loaded from TOML.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::error::ConfigError;

fn default_listen_addr() -> String {
    ":51235".to_string()
}
fn default_user_agent() -> String {
    "goXRPL/0.1.0".to_string()
}
fn default_max_peers() -> u32 {
    50
}
fn default_max_inbound() -> u32 {
    25
}
fn default_max_outbound() -> u32 {
    25
}
fn default_connect_timeout_s() -> u64 {
    10
}
fn default_handshake_timeout_s() -> u64 {
    5
}
fn default_ping_interval_s() -> u64 {
    30
}
fn default_idle_timeout_s() -> u64 {
    120
}
fn default_event_buffer_size() -> usize {
    256
}
fn default_message_buffer_size() -> usize {
    256
}
fn default_send_buffer_size() -> usize {
    64
}
const fn default_true() -> bool {
    true
}

/// Recognized peer-core configuration options and their defaults (spec §6).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen address, e.g. `":51235"`.
    pub listen_addr: String,
    /// Network identifier used to reject cross-network peers.
    pub network_id: u32,
    /// User-agent string advertised to peers.
    pub user_agent: String,
    /// Soft ceiling on total connected peers.
    pub max_peers: u32,
    /// Maximum inbound connection slots.
    pub max_inbound: u32,
    /// Maximum outbound connection slots.
    pub max_outbound: u32,
    /// Peers to dial at startup.
    pub bootstrap_peers: Vec<String>,
    /// Peers to maintain an outbound connection to indefinitely.
    pub fixed_peers: Vec<String>,
    /// When true, never advertise this node via endpoint gossip.
    pub private_mode: bool,
    /// Directory for the boot cache and reservation table.
    pub data_dir: String,
    /// Outbound connect timeout, in seconds.
    pub connect_timeout_secs: u64,
    /// Handshake timeout, in seconds.
    pub handshake_timeout_secs: u64,
    /// Ping interval, in seconds.
    pub ping_interval_secs: u64,
    /// Idle connection timeout, in seconds.
    pub idle_timeout_secs: u64,
    /// Event channel buffer size.
    pub event_buffer_size: usize,
    /// Inbound message channel buffer size.
    pub message_buffer_size: usize,
    /// Outbound send channel buffer size.
    pub send_buffer_size: usize,
    /// Enable the reduce-relay squelching subsystem.
    pub enable_reduce_relay: bool,
    /// Enable outbound block compression.
    pub enable_compression: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            network_id: 0,
            user_agent: default_user_agent(),
            max_peers: default_max_peers(),
            max_inbound: default_max_inbound(),
            max_outbound: default_max_outbound(),
            bootstrap_peers: Vec::new(),
            fixed_peers: Vec::new(),
            private_mode: false,
            data_dir: String::new(),
            connect_timeout_secs: default_connect_timeout_s(),
            handshake_timeout_secs: default_handshake_timeout_s(),
            ping_interval_secs: default_ping_interval_s(),
            idle_timeout_secs: default_idle_timeout_s(),
            event_buffer_size: default_event_buffer_size(),
            message_buffer_size: default_message_buffer_size(),
            send_buffer_size: default_send_buffer_size(),
            enable_reduce_relay: default_true(),
            enable_compression: default_true(),
        }
    }
}

impl Config {
    /// Parse configuration from a TOML document.
    pub fn from_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(raw).map_err(|_| ConfigError::Parse)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|_| ConfigError::Read)?;
        Self::from_str(&raw)
    }

    /// Validate against the rules in spec §6. A clock is supplied by the
    /// caller at runtime (it is not a TOML-serializable field), so the
    /// "clock not absent" rule is enforced by [`Config::require_clock`]
    /// rather than here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_peers == 0 {
            return Err(ConfigError::MaxPeersZero);
        }
        if self.max_inbound + self.max_outbound > self.max_peers {
            return Err(ConfigError::InboundOutboundExceedsMaxPeers);
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::ConnectTimeoutNotPositive);
        }
        if self.handshake_timeout_secs == 0 {
            return Err(ConfigError::HandshakeTimeoutNotPositive);
        }
        Ok(())
    }

    /// Assert that a clock capability is present; called by the node
    /// bootstrap path once it has constructed its [`crate::capability::Clock`].
    pub fn require_clock(clock_present: bool) -> Result<(), ConfigError> {
        if !clock_present {
            return Err(ConfigError::ClockMissing);
        }
        Ok(())
    }

    /// Outbound connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Handshake timeout as a [`Duration`].
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    /// Ping interval as a [`Duration`].
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    /// Idle timeout as a [`Duration`].
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_max_peers() {
        let mut cfg = Config::default();
        cfg.max_peers = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::MaxPeersZero));
    }

    #[test]
    fn rejects_inbound_outbound_overflow() {
        let mut cfg = Config::default();
        cfg.max_peers = 10;
        cfg.max_inbound = 6;
        cfg.max_outbound = 6;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InboundOutboundExceedsMaxPeers)
        );
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let cfg = Config::from_str("max_peers = 10\n").expect("parse");
        assert_eq!(cfg.max_peers, 10);
        assert_eq!(cfg.max_inbound, default_max_inbound());
    }
}
