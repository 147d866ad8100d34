//! NSX-T Manager API resource and status documents.
//!
//! Only the fields the exporter reads are modelled; everything else in the
//! manager's responses is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// One page of a paginated list call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResult<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,

    /// Opaque pointer to the next page; absent or empty on the last page.
    #[serde(default)]
    pub cursor: Option<String>,

    #[serde(default)]
    pub result_count: Option<i64>,
}

impl<T> ListResult<T> {
    /// Cursor for the next page, if there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.cursor.as_deref().filter(|c| !c.is_empty())
    }
}

/// A transport zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportZone {
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    /// `OVERLAY` or `VLAN`.
    #[serde(default)]
    pub transport_type: Option<String>,
}

/// Aggregate counters of a transport zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportZoneStatus {
    #[serde(default)]
    pub transport_zone_id: String,

    #[serde(default)]
    pub num_logical_ports: i64,

    #[serde(default)]
    pub num_logical_switches: i64,

    #[serde(default)]
    pub num_transport_nodes: i64,
}

/// Transport node health partition of a transport zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapTransportZoneStatus {
    #[serde(default)]
    pub degraded_count: i32,

    #[serde(default)]
    pub down_count: i32,

    #[serde(default)]
    pub unknown_count: i32,

    #[serde(default)]
    pub up_count: i32,
}

/// A logical switch port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalPort {
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub logical_switch_id: Option<String>,
}

/// Manager-wide logical port counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalPortStatusSummary {
    #[serde(default)]
    pub total_ports: i64,

    #[serde(default)]
    pub up_ports: i64,

    #[serde(default)]
    pub last_update_timestamp: Option<i64>,
}

/// Operational state of one logical port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalPortOperationalStatus {
    #[serde(default)]
    pub logical_port_id: String,

    /// `UP`, `DOWN` or `UNKNOWN`.
    #[serde(default)]
    pub status: String,
}

/// Operational state as reported by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationalStatus {
    Up,
    Down,
    Unknown,
}

impl OperationalStatus {
    /// Parse the manager's status string; anything unrecognized is `Unknown`.
    pub fn from_api(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "UP" => OperationalStatus::Up,
            "DOWN" => OperationalStatus::Down,
            _ => OperationalStatus::Unknown,
        }
    }
}

impl LogicalPortOperationalStatus {
    pub fn operational_status(&self) -> OperationalStatus {
        OperationalStatus::from_api(&self.status)
    }
}

/// A logical router port (uplink, downlink, link port, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalRouterPort {
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub logical_router_id: Option<String>,

    #[serde(default)]
    pub resource_type: Option<String>,
}

/// Traffic counters of one direction of a router port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortCounters {
    #[serde(default)]
    pub total_bytes: u64,

    #[serde(default)]
    pub total_packets: u64,

    #[serde(default)]
    pub dropped_packets: u64,
}

/// Aggregated statistics of a logical router port across transport nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalRouterPortStatisticsSummary {
    #[serde(default)]
    pub logical_router_port_id: String,

    #[serde(default)]
    pub rx: PortCounters,

    #[serde(default)]
    pub tx: PortCounters,
}

/// A logical DHCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpServer {
    pub id: String,

    #[serde(default)]
    pub display_name: String,
}

/// Runtime status of a logical DHCP server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpServerStatus {
    /// `UP`, `DOWN`, `ERROR` or `NO_STANDBY`.
    #[serde(default)]
    pub service_status: String,

    #[serde(default)]
    pub active_node: Option<String>,

    #[serde(default)]
    pub stand_by_node: Option<String>,

    #[serde(default)]
    pub error_message: Option<String>,
}
