//! DHCP server collector.

use std::sync::Arc;

use async_trait::async_trait;
use nsxt_client::DhcpClient;
use tracing::{Instrument, Span, debug, info_span};

use super::{Call, CollectionStatus, Collector, Step, emit_state_set};
use crate::metric::{Descriptor, Sample};

const SUBSYSTEM: &str = "dhcp";

const LIST_SERVERS: Call = Call::list(SUBSYSTEM, "list DHCP servers");
const GET_STATUS: Call = Call::detail(SUBSYSTEM, "get DHCP server status");

/// Service states, in emission order.
pub const SERVICE_STATES: [&str; 4] = ["up", "down", "error", "no_standby"];

pub struct DhcpCollector {
    client: Arc<dyn DhcpClient>,
    logger: Span,
    server_status: Arc<Descriptor>,
}

impl DhcpCollector {
    pub const NAME: &'static str = "dhcp";

    pub fn new(client: Arc<dyn DhcpClient>, logger: &Span) -> Self {
        Self {
            client,
            logger: info_span!(parent: logger, "collector", collector = Self::NAME),
            server_status: Descriptor::gauge(
                SUBSYSTEM,
                "server_status",
                "Service status of the logical DHCP server",
                &["id", "name", "status"],
            ),
        }
    }

    async fn collect_servers(&self, sink: &mut Vec<Sample>) -> CollectionStatus {
        let servers = match LIST_SERVERS.check(None, self.client.list_all_dhcp_servers().await) {
            Step::Proceed(servers) => servers,
            Step::Skip | Step::Abort => return CollectionStatus::Failed,
        };

        let before = sink.len();

        for server in &servers {
            let result = self.client.get_dhcp_server_status(&server.id).await;
            let status = match GET_STATUS.check(Some(&server.id), result) {
                Step::Proceed(status) => status,
                Step::Skip | Step::Abort => continue,
            };

            // Unrecognized states leave every series at 0.
            let current = status.service_status.to_ascii_lowercase();
            emit_state_set(
                sink,
                &self.server_status,
                &server.id,
                &server.display_name,
                &SERVICE_STATES,
                &current,
            );
        }

        if !servers.is_empty() {
            debug!(
                servers = servers.len(),
                samples = sink.len() - before,
                "Collected DHCP servers"
            );
        }
        CollectionStatus::Success
    }
}

#[async_trait]
impl Collector for DhcpCollector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn describe(&self) -> Vec<Arc<Descriptor>> {
        vec![Arc::clone(&self.server_status)]
    }

    async fn collect(&self, sink: &mut Vec<Sample>) -> CollectionStatus {
        self.collect_servers(sink)
            .instrument(self.logger.clone())
            .await
    }
}
