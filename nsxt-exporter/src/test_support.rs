//! In-memory manager and log capture shared by unit tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use nsxt_client::types::{
    DhcpServer, DhcpServerStatus, HeatmapTransportZoneStatus, LogicalPort,
    LogicalPortOperationalStatus, LogicalPortStatusSummary, LogicalRouterPort,
    LogicalRouterPortStatisticsSummary, PortCounters, TransportZone, TransportZoneStatus,
};
use nsxt_client::{
    ClientError, DhcpClient, LogicalPortClient, LogicalRouterPortClient, Result,
    TransportZoneClient,
};
use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

/// Error the fake returns for a failing call.
pub fn api_error(status: u16) -> ClientError {
    ClientError::Http {
        path: "/api/v1/fake".to_string(),
        status,
        body: format!("fake error {status}"),
    }
}

pub fn zone(id: &str, name: &str) -> TransportZone {
    TransportZone {
        id: id.to_string(),
        display_name: name.to_string(),
        transport_type: Some("OVERLAY".to_string()),
    }
}

pub fn zone_status(id: &str, logical_ports: i64) -> TransportZoneStatus {
    TransportZoneStatus {
        transport_zone_id: id.to_string(),
        num_logical_ports: logical_ports,
        num_logical_switches: 1,
        num_transport_nodes: 2,
    }
}

pub fn heatmap(degraded: i32, down: i32, unknown: i32, up: i32) -> HeatmapTransportZoneStatus {
    HeatmapTransportZoneStatus {
        degraded_count: degraded,
        down_count: down,
        unknown_count: unknown,
        up_count: up,
    }
}

pub fn logical_port(id: &str, name: &str) -> LogicalPort {
    LogicalPort {
        id: id.to_string(),
        display_name: name.to_string(),
        logical_switch_id: Some("ls-1".to_string()),
    }
}

pub fn port_status(id: &str, status: &str) -> LogicalPortOperationalStatus {
    LogicalPortOperationalStatus {
        logical_port_id: id.to_string(),
        status: status.to_string(),
    }
}

pub fn router_port(id: &str, name: &str) -> LogicalRouterPort {
    LogicalRouterPort {
        id: id.to_string(),
        display_name: name.to_string(),
        logical_router_id: Some("lr-1".to_string()),
        resource_type: Some("LogicalRouterUpLinkPort".to_string()),
    }
}

pub fn router_port_stats(id: &str, rx_bytes: u64, tx_bytes: u64) -> LogicalRouterPortStatisticsSummary {
    LogicalRouterPortStatisticsSummary {
        logical_router_port_id: id.to_string(),
        rx: PortCounters {
            total_bytes: rx_bytes,
            total_packets: rx_bytes / 100,
            dropped_packets: 1,
        },
        tx: PortCounters {
            total_bytes: tx_bytes,
            total_packets: tx_bytes / 100,
            dropped_packets: 0,
        },
    }
}

pub fn dhcp_server(id: &str, name: &str) -> DhcpServer {
    DhcpServer {
        id: id.to_string(),
        display_name: name.to_string(),
    }
}

pub fn dhcp_status(status: &str) -> DhcpServerStatus {
    DhcpServerStatus {
        service_status: status.to_string(),
        active_node: Some("edge-1".to_string()),
        stand_by_node: None,
        error_message: None,
    }
}

/// Scripted manager.
///
/// A list set to `None` fails; a detail entry missing from its map fails
/// with a 404. Every call is recorded in `calls`.
#[derive(Default)]
pub struct FakeManager {
    pub transport_zones: Mutex<Option<Vec<TransportZone>>>,
    pub zone_status: HashMap<String, TransportZoneStatus>,
    pub zone_heatmap: HashMap<String, HeatmapTransportZoneStatus>,

    pub logical_ports: Mutex<Option<Vec<LogicalPort>>>,
    pub port_summary: Option<LogicalPortStatusSummary>,
    pub port_status: HashMap<String, LogicalPortOperationalStatus>,

    pub router_ports: Mutex<Option<Vec<LogicalRouterPort>>>,
    pub router_port_stats: HashMap<String, LogicalRouterPortStatisticsSummary>,

    pub dhcp_servers: Mutex<Option<Vec<DhcpServer>>>,
    pub dhcp_status: HashMap<String, DhcpServerStatus>,

    pub calls: Mutex<Vec<String>>,
}

impl FakeManager {
    /// A manager whose lists all succeed and are empty.
    pub fn empty() -> Self {
        Self {
            transport_zones: Mutex::new(Some(Vec::new())),
            logical_ports: Mutex::new(Some(Vec::new())),
            port_summary: Some(LogicalPortStatusSummary::default()),
            router_ports: Mutex::new(Some(Vec::new())),
            dhcp_servers: Mutex::new(Some(Vec::new())),
            ..Default::default()
        }
    }

    pub fn with_zone(
        mut self,
        zone: TransportZone,
        status: Option<TransportZoneStatus>,
        heatmap: Option<HeatmapTransportZoneStatus>,
    ) -> Self {
        if let Some(status) = status {
            self.zone_status.insert(zone.id.clone(), status);
        }
        if let Some(heatmap) = heatmap {
            self.zone_heatmap.insert(zone.id.clone(), heatmap);
        }
        self.transport_zones
            .get_mut()
            .get_or_insert_with(Vec::new)
            .push(zone);
        self
    }

    pub fn with_logical_port(
        mut self,
        port: LogicalPort,
        status: Option<LogicalPortOperationalStatus>,
    ) -> Self {
        if let Some(status) = status {
            self.port_status.insert(port.id.clone(), status);
        }
        self.logical_ports
            .get_mut()
            .get_or_insert_with(Vec::new)
            .push(port);
        self
    }

    pub fn with_router_port(
        mut self,
        port: LogicalRouterPort,
        stats: Option<LogicalRouterPortStatisticsSummary>,
    ) -> Self {
        if let Some(stats) = stats {
            self.router_port_stats.insert(port.id.clone(), stats);
        }
        self.router_ports
            .get_mut()
            .get_or_insert_with(Vec::new)
            .push(port);
        self
    }

    pub fn with_dhcp_server(mut self, server: DhcpServer, status: Option<DhcpServerStatus>) -> Self {
        if let Some(status) = status {
            self.dhcp_status.insert(server.id.clone(), status);
        }
        self.dhcp_servers
            .get_mut()
            .get_or_insert_with(Vec::new)
            .push(server);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

fn list<T: Clone>(items: &Mutex<Option<Vec<T>>>) -> Result<Vec<T>> {
    items.lock().clone().ok_or_else(|| api_error(503))
}

fn detail<T: Clone>(items: &HashMap<String, T>, id: &str) -> Result<T> {
    items.get(id).cloned().ok_or_else(|| api_error(404))
}

#[async_trait]
impl TransportZoneClient for FakeManager {
    async fn list_all_transport_zones(&self) -> Result<Vec<TransportZone>> {
        self.record("list_all_transport_zones".to_string());
        list(&self.transport_zones)
    }

    async fn get_transport_zone_status(&self, zone_id: &str) -> Result<TransportZoneStatus> {
        self.record(format!("get_transport_zone_status:{zone_id}"));
        detail(&self.zone_status, zone_id)
    }

    async fn get_heatmap_transport_zone_status(
        &self,
        zone_id: &str,
    ) -> Result<HeatmapTransportZoneStatus> {
        self.record(format!("get_heatmap_transport_zone_status:{zone_id}"));
        detail(&self.zone_heatmap, zone_id)
    }
}

#[async_trait]
impl LogicalPortClient for FakeManager {
    async fn list_all_logical_ports(&self) -> Result<Vec<LogicalPort>> {
        self.record("list_all_logical_ports".to_string());
        list(&self.logical_ports)
    }

    async fn get_logical_port_status_summary(&self) -> Result<LogicalPortStatusSummary> {
        self.record("get_logical_port_status_summary".to_string());
        self.port_summary.clone().ok_or_else(|| api_error(500))
    }

    async fn get_logical_port_operational_status(
        &self,
        port_id: &str,
    ) -> Result<LogicalPortOperationalStatus> {
        self.record(format!("get_logical_port_operational_status:{port_id}"));
        detail(&self.port_status, port_id)
    }
}

#[async_trait]
impl LogicalRouterPortClient for FakeManager {
    async fn list_all_logical_router_ports(&self) -> Result<Vec<LogicalRouterPort>> {
        self.record("list_all_logical_router_ports".to_string());
        list(&self.router_ports)
    }

    async fn get_logical_router_port_statistics_summary(
        &self,
        port_id: &str,
    ) -> Result<LogicalRouterPortStatisticsSummary> {
        self.record(format!("get_logical_router_port_statistics_summary:{port_id}"));
        detail(&self.router_port_stats, port_id)
    }
}

#[async_trait]
impl DhcpClient for FakeManager {
    async fn list_all_dhcp_servers(&self) -> Result<Vec<DhcpServer>> {
        self.record("list_all_dhcp_servers".to_string());
        list(&self.dhcp_servers)
    }

    async fn get_dhcp_server_status(&self, server_id: &str) -> Result<DhcpServerStatus> {
        self.record(format!("get_dhcp_server_status:{server_id}"));
        detail(&self.dhcp_status, server_id)
    }
}

/// One recorded tracing event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Layer that records every event it sees.
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    /// Make this capture the thread's default subscriber until the guard drops.
    pub fn install(&self) -> DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().clone()
    }

    pub fn errors(&self) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == Level::ERROR)
            .collect()
    }

    /// Events at warn or error.
    pub fn problems(&self) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == Level::ERROR || e.level == Level::WARN)
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldRecorder::default();
        event.record(&mut visitor);

        self.events.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldRecorder {
    message: String,
    fields: Vec<(String, String)>,
}

impl FieldRecorder {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldRecorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }
}
