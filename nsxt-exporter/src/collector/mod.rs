//! Per-domain collectors.
//!
//! Every collector follows the same shape: one list call whose failure
//! aborts this collector for the current scrape, followed by one or more
//! per-resource detail passes whose failures only drop the affected resource.
//! Which outcome applies is decided by the [`CallSite`] of each remote call,
//! see [`Call::check`].

use std::sync::Arc;

use async_trait::async_trait;
use nsxt_client::ClientError;
use tracing::error;

use crate::metric::{Descriptor, Sample};

pub mod dhcp;
pub mod logical_port;
pub mod logical_router_port;
pub mod transport_zone;

pub use dhcp::DhcpCollector;
pub use logical_port::LogicalPortCollector;
pub use logical_router_port::LogicalRouterPortCollector;
pub use transport_zone::TransportZoneCollector;

/// Outcome of one `collect` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// The resource list was fetched; individual resources may still be missing.
    Success,
    /// The resource list could not be fetched and nothing was emitted.
    Failed,
}

impl CollectionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, CollectionStatus::Success)
    }
}

/// A source of metrics for one NSX-T resource domain.
///
/// Implementations are immutable after construction and may be collected
/// concurrently.
#[async_trait]
pub trait Collector: Send + Sync + 'static {
    /// Stable registry name, e.g. `transport_zone`.
    fn name(&self) -> &'static str;

    /// Every descriptor this collector can emit samples for.
    fn describe(&self) -> Vec<Arc<Descriptor>>;

    /// Fetch the current state and append samples to `sink`.
    ///
    /// Never fails the scrape: remote errors are logged and the affected
    /// data is left out.
    async fn collect(&self, sink: &mut Vec<Sample>) -> CollectionStatus;
}

/// Where a remote call sits in the collection algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSite {
    /// Enumerates the resources of a domain.
    List,
    /// Fetches details for one resource (or one independent aggregate).
    Detail,
}

/// What a collector does when a call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Stop collecting this domain for the current scrape.
    AbortCollector,
    /// Leave out the affected resource and keep going.
    SkipResource,
}

impl CallSite {
    pub const fn on_failure(self) -> OnFailure {
        match self {
            CallSite::List => OnFailure::AbortCollector,
            CallSite::Detail => OnFailure::SkipResource,
        }
    }
}

/// Result of checking one call outcome.
#[derive(Debug, PartialEq, Eq)]
pub enum Step<T> {
    Proceed(T),
    Skip,
    Abort,
}

/// A named remote call of a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub site: CallSite,
    pub domain: &'static str,
    pub action: &'static str,
}

impl Call {
    pub const fn list(domain: &'static str, action: &'static str) -> Self {
        Self {
            site: CallSite::List,
            domain,
            action,
        }
    }

    pub const fn detail(domain: &'static str, action: &'static str) -> Self {
        Self {
            site: CallSite::Detail,
            domain,
            action,
        }
    }

    /// Turn a call result into the next step, logging failures once.
    pub fn check<T>(&self, resource_id: Option<&str>, result: Result<T, ClientError>) -> Step<T> {
        let err = match result {
            Ok(value) => return Step::Proceed(value),
            Err(err) => err,
        };

        match resource_id {
            Some(id) => error!(
                domain = self.domain,
                id,
                error = %err,
                "Unable to {}", self.action
            ),
            None => error!(
                domain = self.domain,
                error = %err,
                "Unable to {}", self.action
            ),
        }

        match self.site.on_failure() {
            OnFailure::AbortCollector => Step::Abort,
            OnFailure::SkipResource => Step::Skip,
        }
    }
}

/// Append a sample, dropping it with an error log if its labels do not fit.
pub(crate) fn emit(
    sink: &mut Vec<Sample>,
    descriptor: &Arc<Descriptor>,
    value: f64,
    label_values: Vec<String>,
) {
    match Sample::new(descriptor, value, label_values) {
        Ok(sample) => sink.push(sample),
        Err(e) => error!(error = %e, "Dropping malformed sample"),
    }
}

/// Emit a 1 for `current` and a 0 for every other state in `states`.
pub(crate) fn emit_state_set(
    sink: &mut Vec<Sample>,
    descriptor: &Arc<Descriptor>,
    id: &str,
    name: &str,
    states: &[&str],
    current: &str,
) {
    for state in states {
        let value = if *state == current { 1.0 } else { 0.0 };
        emit(
            sink,
            descriptor,
            value,
            vec![id.to_string(), name.to_string(), state.to_string()],
        );
    }
}
