//! Per-domain client capabilities.
//!
//! Each trait exposes only the calls one collector needs. List calls fail for
//! the whole domain; per-resource calls fail for that resource only. No
//! caching or retrying happens at this layer.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    DhcpServer, DhcpServerStatus, HeatmapTransportZoneStatus, LogicalPort,
    LogicalPortOperationalStatus, LogicalPortStatusSummary, LogicalRouterPort,
    LogicalRouterPortStatisticsSummary, TransportZone, TransportZoneStatus,
};

/// Transport zone API group.
#[async_trait]
pub trait TransportZoneClient: Send + Sync {
    /// List every transport zone, following pagination.
    async fn list_all_transport_zones(&self) -> Result<Vec<TransportZone>>;

    async fn get_transport_zone_status(&self, zone_id: &str) -> Result<TransportZoneStatus>;

    async fn get_heatmap_transport_zone_status(
        &self,
        zone_id: &str,
    ) -> Result<HeatmapTransportZoneStatus>;
}

/// Logical port API group.
#[async_trait]
pub trait LogicalPortClient: Send + Sync {
    async fn list_all_logical_ports(&self) -> Result<Vec<LogicalPort>>;

    async fn get_logical_port_status_summary(&self) -> Result<LogicalPortStatusSummary>;

    async fn get_logical_port_operational_status(
        &self,
        port_id: &str,
    ) -> Result<LogicalPortOperationalStatus>;
}

/// Logical router port API group.
#[async_trait]
pub trait LogicalRouterPortClient: Send + Sync {
    async fn list_all_logical_router_ports(&self) -> Result<Vec<LogicalRouterPort>>;

    async fn get_logical_router_port_statistics_summary(
        &self,
        port_id: &str,
    ) -> Result<LogicalRouterPortStatisticsSummary>;
}

/// DHCP API group.
#[async_trait]
pub trait DhcpClient: Send + Sync {
    async fn list_all_dhcp_servers(&self) -> Result<Vec<DhcpServer>>;

    async fn get_dhcp_server_status(&self, server_id: &str) -> Result<DhcpServerStatus>;
}

/// Every API group the exporter consumes.
pub trait ManagerClient:
    TransportZoneClient + LogicalPortClient + LogicalRouterPortClient + DhcpClient + 'static
{
}

impl<T> ManagerClient for T where
    T: TransportZoneClient + LogicalPortClient + LogicalRouterPortClient + DhcpClient + 'static
{
}
