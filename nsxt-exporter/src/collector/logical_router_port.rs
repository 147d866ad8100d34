//! Logical router port traffic collector.

use std::sync::Arc;

use async_trait::async_trait;
use nsxt_client::LogicalRouterPortClient;
use nsxt_client::types::PortCounters;
use tracing::{Instrument, Span, debug, info_span};

use super::{Call, CollectionStatus, Collector, Step, emit};
use crate::metric::{Descriptor, Sample};

const SUBSYSTEM: &str = "logical_router_port";

const LIST_PORTS: Call = Call::list(SUBSYSTEM, "list logical router ports");
const GET_STATISTICS: Call = Call::detail(SUBSYSTEM, "get logical router port statistics");

/// Counters of one traffic direction.
struct DirectionDescriptors {
    bytes: Arc<Descriptor>,
    packets: Arc<Descriptor>,
    dropped_packets: Arc<Descriptor>,
}

impl DirectionDescriptors {
    fn new(direction: &str) -> Self {
        let labels = ["id", "name"];
        Self {
            bytes: Descriptor::counter(
                SUBSYSTEM,
                &format!("{direction}_bytes"),
                &format!("Total {direction} bytes of the logical router port"),
                &labels,
            ),
            packets: Descriptor::counter(
                SUBSYSTEM,
                &format!("{direction}_packets"),
                &format!("Total {direction} packets of the logical router port"),
                &labels,
            ),
            dropped_packets: Descriptor::counter(
                SUBSYSTEM,
                &format!("{direction}_dropped_packets"),
                &format!("Total {direction} dropped packets of the logical router port"),
                &labels,
            ),
        }
    }

    fn all(&self) -> [&Arc<Descriptor>; 3] {
        [&self.bytes, &self.packets, &self.dropped_packets]
    }

    fn emit(&self, sink: &mut Vec<Sample>, counters: &PortCounters, id: &str, name: &str) {
        let values = [
            counters.total_bytes,
            counters.total_packets,
            counters.dropped_packets,
        ];
        for (descriptor, value) in self.all().into_iter().zip(values) {
            emit(
                sink,
                descriptor,
                value as f64,
                vec![id.to_string(), name.to_string()],
            );
        }
    }
}

pub struct LogicalRouterPortCollector {
    client: Arc<dyn LogicalRouterPortClient>,
    logger: Span,
    rx: DirectionDescriptors,
    tx: DirectionDescriptors,
}

impl LogicalRouterPortCollector {
    pub const NAME: &'static str = "logical_router_port";

    pub fn new(client: Arc<dyn LogicalRouterPortClient>, logger: &Span) -> Self {
        Self {
            client,
            logger: info_span!(parent: logger, "collector", collector = Self::NAME),
            rx: DirectionDescriptors::new("rx"),
            tx: DirectionDescriptors::new("tx"),
        }
    }

    async fn collect_ports(&self, sink: &mut Vec<Sample>) -> CollectionStatus {
        let ports = match LIST_PORTS.check(None, self.client.list_all_logical_router_ports().await)
        {
            Step::Proceed(ports) => ports,
            Step::Skip | Step::Abort => return CollectionStatus::Failed,
        };

        let before = sink.len();

        for port in &ports {
            let result = self
                .client
                .get_logical_router_port_statistics_summary(&port.id)
                .await;
            let stats = match GET_STATISTICS.check(Some(&port.id), result) {
                Step::Proceed(stats) => stats,
                Step::Skip | Step::Abort => continue,
            };

            self.rx.emit(sink, &stats.rx, &port.id, &port.display_name);
            self.tx.emit(sink, &stats.tx, &port.id, &port.display_name);
        }

        if !ports.is_empty() {
            debug!(
                ports = ports.len(),
                samples = sink.len() - before,
                "Collected logical router ports"
            );
        }
        CollectionStatus::Success
    }
}

#[async_trait]
impl Collector for LogicalRouterPortCollector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn describe(&self) -> Vec<Arc<Descriptor>> {
        self.rx
            .all()
            .into_iter()
            .chain(self.tx.all())
            .map(Arc::clone)
            .collect()
    }

    async fn collect(&self, sink: &mut Vec<Sample>) -> CollectionStatus {
        self.collect_ports(sink)
            .instrument(self.logger.clone())
            .await
    }
}
