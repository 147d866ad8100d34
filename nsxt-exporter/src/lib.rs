//! Prometheus exporter for VMware NSX-T.
//!
//! Each scrape of the metrics endpoint polls the NSX-T Manager through a set
//! of per-domain collectors and renders their samples as OpenMetrics text.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │  NSX-T Manager  │<────│   Collectors    │<────│   HTTP Server   │
//! │   (/api/v1)     │     │ (per domain)    │     │   (/metrics)    │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! A collector lists the resources of its domain and then fetches details
//! per resource. A failed list call drops the whole domain for that scrape;
//! a failed detail call drops only the affected resource. Either way the
//! scrape itself succeeds.
//!
//! # Usage
//!
//! ```bash
//! nsxt-exporter --config config.json5
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod collector;
pub mod config;
pub mod http;
pub mod mapping;
pub mod metric;
pub mod registry;
pub mod scrape;

#[cfg(test)]
mod test_support;

pub use collector::{CollectionStatus, Collector};
pub use config::ExporterConfig;
pub use http::HttpServer;
pub use metric::{Descriptor, Sample, ValueType};
pub use registry::{RegistryError, build_collectors};
pub use scrape::{ScrapeCoordinator, SharedCoordinator};
