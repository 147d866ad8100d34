//! Transport zone collector.
//!
//! Emits the logical port count of every zone from its status document and
//! the transport node health partition from its heatmap. The two passes are
//! independent: a zone missing from one can still appear in the other.

use std::sync::Arc;

use async_trait::async_trait;
use nsxt_client::TransportZoneClient;
use tracing::{Instrument, Span, debug, info_span};

use super::{Call, CollectionStatus, Collector, Step, emit};
use crate::metric::{Descriptor, Sample};

const SUBSYSTEM: &str = "transport_zone";

const LIST_ZONES: Call = Call::list(SUBSYSTEM, "list transport zones");
const GET_STATUS: Call = Call::detail(SUBSYSTEM, "get transport zone status");
const GET_HEATMAP: Call = Call::detail(SUBSYSTEM, "get transport zone heatmap status");

/// Transport node states, in emission order.
pub const NODE_STATES: [&str; 4] = ["degraded", "down", "unknown", "up"];

pub struct TransportZoneCollector {
    client: Arc<dyn TransportZoneClient>,
    logger: Span,
    logical_port_total: Arc<Descriptor>,
    transport_node_total: Arc<Descriptor>,
}

impl TransportZoneCollector {
    pub const NAME: &'static str = "transport_zone";

    pub fn new(client: Arc<dyn TransportZoneClient>, logger: &Span) -> Self {
        Self {
            client,
            logger: info_span!(parent: logger, "collector", collector = Self::NAME),
            logical_port_total: Descriptor::gauge(
                SUBSYSTEM,
                "logical_port_total",
                "Total number of logical ports in the transport zone",
                &["id", "name"],
            ),
            transport_node_total: Descriptor::gauge(
                SUBSYSTEM,
                "transport_node_total",
                "Number of transport nodes in the transport zone by status",
                &["id", "name", "status"],
            ),
        }
    }

    async fn collect_zones(&self, sink: &mut Vec<Sample>) -> CollectionStatus {
        let zones = match LIST_ZONES.check(None, self.client.list_all_transport_zones().await) {
            Step::Proceed(zones) => zones,
            Step::Skip | Step::Abort => return CollectionStatus::Failed,
        };

        let before = sink.len();

        for zone in &zones {
            let result = self.client.get_transport_zone_status(&zone.id).await;
            let status = match GET_STATUS.check(Some(&zone.id), result) {
                Step::Proceed(status) => status,
                Step::Skip | Step::Abort => continue,
            };

            emit(
                sink,
                &self.logical_port_total,
                status.num_logical_ports as f64,
                vec![zone.id.clone(), zone.display_name.clone()],
            );
        }

        for zone in &zones {
            let result = self.client.get_heatmap_transport_zone_status(&zone.id).await;
            let heatmap = match GET_HEATMAP.check(Some(&zone.id), result) {
                Step::Proceed(heatmap) => heatmap,
                Step::Skip | Step::Abort => continue,
            };

            let counts = [
                heatmap.degraded_count,
                heatmap.down_count,
                heatmap.unknown_count,
                heatmap.up_count,
            ];
            for (state, count) in NODE_STATES.iter().zip(counts) {
                emit(
                    sink,
                    &self.transport_node_total,
                    f64::from(count),
                    vec![
                        zone.id.clone(),
                        zone.display_name.clone(),
                        state.to_string(),
                    ],
                );
            }
        }

        if !zones.is_empty() {
            debug!(
                zones = zones.len(),
                samples = sink.len() - before,
                "Collected transport zones"
            );
        }
        CollectionStatus::Success
    }
}

#[async_trait]
impl Collector for TransportZoneCollector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn describe(&self) -> Vec<Arc<Descriptor>> {
        vec![
            Arc::clone(&self.logical_port_total),
            Arc::clone(&self.transport_node_total),
        ]
    }

    async fn collect(&self, sink: &mut Vec<Sample>) -> CollectionStatus {
        self.collect_zones(sink)
            .instrument(self.logger.clone())
            .await
    }
}
