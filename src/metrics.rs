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

//! Prometheus metrics (spec §6) and an optional standalone `/metrics` +
//! `/healthz` surface for hosts that don't fold this registry into their
//! own.

use std::sync::Arc;

use axum::{routing::get, Router};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use thiserror::Error;

/// Metrics registration/export failures.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A metric could not be constructed or registered.
    #[error("prometheus error")]
    Prom,
}

/// Prometheus metrics for every ambient component this crate owns
/// (spec §6).
#[derive(Clone)]
pub struct PeerCoreMetrics {
    /// The registry these metrics are registered against.
    pub registry: Registry,

    /// Traffic bytes, labeled by category.
    pub traffic_bytes_total: IntCounterVec,
    /// Traffic messages, labeled by category.
    pub traffic_messages_total: IntCounterVec,
    /// Resource-consumer rejections.
    pub resource_rejections_total: IntCounter,
    /// Squelch instructions issued (reduce-relay selection).
    pub squelches_issued_total: IntCounter,
    /// Squelch instructions received (receive-side).
    pub squelches_received_total: IntCounter,
    /// Reduce-relay peer-set selections performed.
    pub reduce_relay_selections_total: IntCounter,
    /// Connection slots that reached `Active`.
    pub slot_activations_total: IntCounter,
    /// Current boot-cache entry count.
    pub boot_cache_size: IntGauge,
    /// Current known-peer count.
    pub discovery_known_peers: IntGauge,
    /// Current connected-peer count.
    pub discovery_connected_peers: IntGauge,
}

impl PeerCoreMetrics {
    /// Build and register every metric against a fresh [`Registry`].
    pub fn new() -> Result<Self, MetricsError> {
        Self::with_registry(Registry::new())
    }

    /// Build and register every metric against a caller-supplied
    /// [`Registry`], so a host process can fold these into its own
    /// `/metrics` endpoint.
    pub fn with_registry(registry: Registry) -> Result<Self, MetricsError> {
        let traffic_bytes_total = IntCounterVec::new(
            Opts::new("peer_core_traffic_bytes_total", "Traffic bytes by category"),
            &["category"],
        )
        .map_err(|_| MetricsError::Prom)?;
        let traffic_messages_total = IntCounterVec::new(
            Opts::new("peer_core_traffic_messages_total", "Traffic messages by category"),
            &["category"],
        )
        .map_err(|_| MetricsError::Prom)?;
        let resource_rejections_total =
            IntCounter::new("peer_core_resource_rejections_total", "Resource-consumer rejections").map_err(|_| MetricsError::Prom)?;
        let squelches_issued_total =
            IntCounter::new("peer_core_squelches_issued_total", "Squelch instructions issued").map_err(|_| MetricsError::Prom)?;
        let squelches_received_total =
            IntCounter::new("peer_core_squelches_received_total", "Squelch instructions received").map_err(|_| MetricsError::Prom)?;
        let reduce_relay_selections_total =
            IntCounter::new("peer_core_reduce_relay_selections_total", "Reduce-relay peer-set selections").map_err(|_| MetricsError::Prom)?;
        let slot_activations_total =
            IntCounter::new("peer_core_slot_activations_total", "Connection slots that reached Active").map_err(|_| MetricsError::Prom)?;
        let boot_cache_size = IntGauge::new("peer_core_boot_cache_size", "Boot-cache entry count").map_err(|_| MetricsError::Prom)?;
        let discovery_known_peers = IntGauge::new("peer_core_discovery_known_peers", "Known-peer count").map_err(|_| MetricsError::Prom)?;
        let discovery_connected_peers =
            IntGauge::new("peer_core_discovery_connected_peers", "Connected-peer count").map_err(|_| MetricsError::Prom)?;

        registry.register(Box::new(traffic_bytes_total.clone())).map_err(|_| MetricsError::Prom)?;
        registry.register(Box::new(traffic_messages_total.clone())).map_err(|_| MetricsError::Prom)?;
        registry.register(Box::new(resource_rejections_total.clone())).map_err(|_| MetricsError::Prom)?;
        registry.register(Box::new(squelches_issued_total.clone())).map_err(|_| MetricsError::Prom)?;
        registry.register(Box::new(squelches_received_total.clone())).map_err(|_| MetricsError::Prom)?;
        registry.register(Box::new(reduce_relay_selections_total.clone())).map_err(|_| MetricsError::Prom)?;
        registry.register(Box::new(slot_activations_total.clone())).map_err(|_| MetricsError::Prom)?;
        registry.register(Box::new(boot_cache_size.clone())).map_err(|_| MetricsError::Prom)?;
        registry.register(Box::new(discovery_known_peers.clone())).map_err(|_| MetricsError::Prom)?;
        registry.register(Box::new(discovery_connected_peers.clone())).map_err(|_| MetricsError::Prom)?;

        Ok(Self {
            registry,
            traffic_bytes_total,
            traffic_messages_total,
            resource_rejections_total,
            squelches_issued_total,
            squelches_received_total,
            reduce_relay_selections_total,
            slot_activations_total,
            boot_cache_size,
            discovery_known_peers,
            discovery_connected_peers,
        })
    }

    fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&families, &mut buf).expect("prometheus text encoding cannot fail on valid metrics");
        String::from_utf8(buf).expect("prometheus text encoder emits valid utf-8")
    }
}

async fn metrics_handler(metrics: Arc<PeerCoreMetrics>) -> String {
    metrics.render()
}

async fn healthz_handler() -> &'static str {
    "ok"
}

/// A standalone `axum` router exposing `/metrics` and `/healthz`, for
/// operators not already folding this registry into a host process
/// (spec §6).
pub fn serve(metrics: Arc<PeerCoreMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(move || metrics_handler(metrics.clone())))
        .route("/healthz", get(healthz_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_render_in_prometheus_text_format() {
        let metrics = PeerCoreMetrics::new().unwrap();
        metrics.traffic_bytes_total.with_label_values(&["overhead"]).inc_by(42);
        metrics.resource_rejections_total.inc();
        let rendered = metrics.render();
        assert!(rendered.contains("peer_core_traffic_bytes_total"));
        assert!(rendered.contains("peer_core_resource_rejections_total"));
    }

    #[test]
    fn with_registry_shares_a_caller_supplied_registry() {
        let registry = Registry::new();
        let metrics = PeerCoreMetrics::with_registry(registry.clone()).unwrap();
        assert_eq!(registry.gather().len(), metrics.registry.gather().len());
    }
}
