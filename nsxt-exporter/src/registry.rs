//! Collector registry.
//!
//! The set of collectors is an explicit, ordered table. [`build_collectors`]
//! runs once at startup and instantiates the selected entries in table order.

use std::collections::HashMap;
use std::sync::Arc;

use nsxt_client::ManagerClient;
use thiserror::Error;
use tracing::{Span, info, warn};

use crate::collector::{
    Collector, DhcpCollector, LogicalPortCollector, LogicalRouterPortCollector,
    TransportZoneCollector,
};
use crate::config::CollectorsConfig;

/// Registry errors, all raised at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Unknown collector '{0}'")]
    UnknownCollector(String),
    #[error("Collector '{0}' is registered more than once")]
    DuplicateName(String),
    #[error("Metric '{name}' is described by both '{first}' and '{second}'")]
    DuplicateDescriptor {
        name: String,
        first: String,
        second: String,
    },
}

/// Builds a collector from the shared client and the parent logging span.
pub type Factory<C> = fn(Arc<C>, &Span) -> Box<dyn Collector>;

/// One row of the registration table.
pub struct Registration<C> {
    pub name: &'static str,
    pub factory: Factory<C>,
}

/// Every known collector, in scrape order.
pub fn registrations<C: ManagerClient>() -> Vec<Registration<C>> {
    vec![
        Registration {
            name: TransportZoneCollector::NAME,
            factory: transport_zone::<C>,
        },
        Registration {
            name: LogicalPortCollector::NAME,
            factory: logical_port::<C>,
        },
        Registration {
            name: LogicalRouterPortCollector::NAME,
            factory: logical_router_port::<C>,
        },
        Registration {
            name: DhcpCollector::NAME,
            factory: dhcp::<C>,
        },
    ]
}

fn transport_zone<C: ManagerClient>(client: Arc<C>, logger: &Span) -> Box<dyn Collector> {
    Box::new(TransportZoneCollector::new(client, logger))
}

fn logical_port<C: ManagerClient>(client: Arc<C>, logger: &Span) -> Box<dyn Collector> {
    Box::new(LogicalPortCollector::new(client, logger))
}

fn logical_router_port<C: ManagerClient>(client: Arc<C>, logger: &Span) -> Box<dyn Collector> {
    Box::new(LogicalRouterPortCollector::new(client, logger))
}

fn dhcp<C: ManagerClient>(client: Arc<C>, logger: &Span) -> Box<dyn Collector> {
    Box::new(DhcpCollector::new(client, logger))
}

/// Instantiate the selected collectors from the built-in table.
pub fn build_collectors<C: ManagerClient>(
    client: Arc<C>,
    logger: &Span,
    selection: &CollectorsConfig,
) -> Result<Vec<Arc<dyn Collector>>, RegistryError> {
    build_from(registrations(), client, logger, selection)
}

/// Instantiate the selected collectors from `table`.
pub fn build_from<C>(
    table: Vec<Registration<C>>,
    client: Arc<C>,
    logger: &Span,
    selection: &CollectorsConfig,
) -> Result<Vec<Arc<dyn Collector>>, RegistryError> {
    let mut names: Vec<&str> = Vec::with_capacity(table.len());
    for registration in &table {
        if names.contains(&registration.name) {
            return Err(RegistryError::DuplicateName(registration.name.to_string()));
        }
        names.push(registration.name);
    }

    if let Some(unknown) = selection.names().find(|n| !names.contains(n)) {
        return Err(RegistryError::UnknownCollector(unknown.to_string()));
    }

    let mut owners: HashMap<String, &'static str> = HashMap::new();
    let mut collectors: Vec<Arc<dyn Collector>> = Vec::new();

    for registration in table {
        if !selection.is_enabled(registration.name) {
            continue;
        }

        let collector = (registration.factory)(Arc::clone(&client), logger);
        for descriptor in collector.describe() {
            let name = descriptor.fq_name().to_string();
            if let Some(first) = owners.insert(name.clone(), registration.name) {
                return Err(RegistryError::DuplicateDescriptor {
                    name,
                    first: first.to_string(),
                    second: registration.name.to_string(),
                });
            }
        }
        collectors.push(Arc::from(collector));
    }

    if collectors.is_empty() {
        warn!("No collectors enabled, scrapes will only report exporter metrics");
    } else {
        let enabled: Vec<&str> = collectors.iter().map(|c| c.name()).collect();
        info!(collectors = ?enabled, "Collectors enabled");
    }

    Ok(collectors)
}
