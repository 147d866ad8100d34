//! Typed client abstraction over the NSX-T Manager API.
//!
//! Collectors depend on the per-domain traits in [`api`] rather than on a
//! concrete transport, so they can be exercised against in-memory fakes.
//! [`NsxtClient`] is the production implementation over HTTPS.
//!
//! # Modules
//!
//! - [`api`] - Capability traits, one per resource domain
//! - [`types`] - Resource and status documents
//! - [`rest`] - REST transport with pagination and basic auth
//! - [`config`] - Manager connection settings
//! - [`error`] - Error types

pub mod api;
pub mod config;
pub mod error;
pub mod rest;
pub mod types;

pub use api::{
    DhcpClient, LogicalPortClient, LogicalRouterPortClient, ManagerClient, TransportZoneClient,
};
pub use config::ManagerConfig;
pub use error::{ClientError, Result};
pub use rest::NsxtClient;
