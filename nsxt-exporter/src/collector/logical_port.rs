//! Logical port collector.

use std::sync::Arc;

use async_trait::async_trait;
use nsxt_client::LogicalPortClient;
use nsxt_client::types::OperationalStatus;
use tracing::{Instrument, Span, debug, info_span};

use super::{Call, CollectionStatus, Collector, Step, emit, emit_state_set};
use crate::metric::{Descriptor, Sample};

const SUBSYSTEM: &str = "logical_port";

const LIST_PORTS: Call = Call::list(SUBSYSTEM, "list logical ports");
const GET_SUMMARY: Call = Call::detail(SUBSYSTEM, "get logical port status summary");
const GET_STATUS: Call = Call::detail(SUBSYSTEM, "get logical port status");

/// Operational states, in emission order.
pub const PORT_STATES: [&str; 3] = ["up", "down", "unknown"];

fn state_label(status: OperationalStatus) -> &'static str {
    match status {
        OperationalStatus::Up => "up",
        OperationalStatus::Down => "down",
        OperationalStatus::Unknown => "unknown",
    }
}

pub struct LogicalPortCollector {
    client: Arc<dyn LogicalPortClient>,
    logger: Span,
    summary_total: Arc<Descriptor>,
    port_status: Arc<Descriptor>,
}

impl LogicalPortCollector {
    pub const NAME: &'static str = "logical_port";

    pub fn new(client: Arc<dyn LogicalPortClient>, logger: &Span) -> Self {
        Self {
            client,
            logger: info_span!(parent: logger, "collector", collector = Self::NAME),
            summary_total: Descriptor::gauge(
                SUBSYSTEM,
                "summary_total",
                "Number of logical ports known to the manager",
                &["status"],
            ),
            port_status: Descriptor::gauge(
                SUBSYSTEM,
                "status",
                "Operational status of the logical port",
                &["id", "name", "status"],
            ),
        }
    }

    async fn collect_ports(&self, sink: &mut Vec<Sample>) -> CollectionStatus {
        let ports = match LIST_PORTS.check(None, self.client.list_all_logical_ports().await) {
            Step::Proceed(ports) => ports,
            Step::Skip | Step::Abort => return CollectionStatus::Failed,
        };

        let before = sink.len();

        let summary = self.client.get_logical_port_status_summary().await;
        if let Step::Proceed(summary) = GET_SUMMARY.check(None, summary) {
            emit(sink, &self.summary_total, summary.total_ports as f64, vec!["total".to_string()]);
            emit(sink, &self.summary_total, summary.up_ports as f64, vec!["up".to_string()]);
        }

        for port in &ports {
            let result = self.client.get_logical_port_operational_status(&port.id).await;
            let status = match GET_STATUS.check(Some(&port.id), result) {
                Step::Proceed(status) => status,
                Step::Skip | Step::Abort => continue,
            };

            emit_state_set(
                sink,
                &self.port_status,
                &port.id,
                &port.display_name,
                &PORT_STATES,
                state_label(status.operational_status()),
            );
        }

        if !ports.is_empty() {
            debug!(
                ports = ports.len(),
                samples = sink.len() - before,
                "Collected logical ports"
            );
        }
        CollectionStatus::Success
    }
}

#[async_trait]
impl Collector for LogicalPortCollector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn describe(&self) -> Vec<Arc<Descriptor>> {
        vec![Arc::clone(&self.summary_total), Arc::clone(&self.port_status)]
    }

    async fn collect(&self, sink: &mut Vec<Sample>) -> CollectionStatus {
        self.collect_ports(sink)
            .instrument(self.logger.clone())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeManager, LogCapture, logical_port, port_status};
    use nsxt_client::types::LogicalPortStatusSummary;

    const SUMMARY: &str = "nsxt_logical_port_summary_total";
    const STATUS: &str = "nsxt_logical_port_status";

    fn collector(fake: &Arc<FakeManager>) -> LogicalPortCollector {
        LogicalPortCollector::new(fake.clone(), &Span::none())
    }

    fn fake_with_summary(total: i64, up: i64) -> FakeManager {
        FakeManager {
            port_summary: Some(LogicalPortStatusSummary {
                total_ports: total,
                up_ports: up,
                last_update_timestamp: None,
            }),
            ..FakeManager::empty()
        }
    }

    #[test]
    fn test_descriptors() {
        let c = collector(&Arc::new(FakeManager::empty()));
        let names: Vec<String> = c
            .describe()
            .iter()
            .map(|d| d.fq_name().to_string())
            .collect();
        assert_eq!(names, vec![SUMMARY, STATUS]);
        assert_eq!(c.describe(), c.describe());
    }

    #[tokio::test]
    async fn test_summary_and_one_hot_status() {
        let fake = Arc::new(
            fake_with_summary(2, 1)
                .with_logical_port(logical_port("lp-1", "web"), Some(port_status("lp-1", "UP")))
                .with_logical_port(logical_port("lp-2", "db"), Some(port_status("lp-2", "DOWN"))),
        );
        let logs = LogCapture::default();
        let _guard = logs.install();

        let mut samples = Vec::new();
        let status = collector(&fake).collect(&mut samples).await;

        assert_eq!(status, CollectionStatus::Success);
        assert!(logs.problems().is_empty());

        let summary: Vec<(Option<&str>, f64)> = samples
            .iter()
            .filter(|s| s.descriptor().fq_name() == SUMMARY)
            .map(|s| (s.label("status"), s.value()))
            .collect();
        assert_eq!(summary, vec![(Some("total"), 2.0), (Some("up"), 1.0)]);

        let lp2: Vec<(Option<&str>, f64)> = samples
            .iter()
            .filter(|s| s.label("id") == Some("lp-2"))
            .map(|s| (s.label("status"), s.value()))
            .collect();
        assert_eq!(
            lp2,
            vec![(Some("up"), 0.0), (Some("down"), 1.0), (Some("unknown"), 0.0)]
        );
        assert_eq!(samples.len(), 2 + 6);
    }

    #[tokio::test]
    async fn test_unrecognized_status_is_unknown() {
        let fake = Arc::new(
            FakeManager::empty()
                .with_logical_port(logical_port("lp-1", "web"), Some(port_status("lp-1", "BOGUS"))),
        );

        let mut samples = Vec::new();
        collector(&fake).collect(&mut samples).await;

        let hot: Vec<Option<&str>> = samples
            .iter()
            .filter(|s| s.descriptor().fq_name() == STATUS && s.value() == 1.0)
            .map(|s| s.label("status"))
            .collect();
        assert_eq!(hot, vec![Some("unknown")]);
    }

    #[tokio::test]
    async fn test_list_failure() {
        let fake = Arc::new(FakeManager {
            logical_ports: Default::default(),
            ..FakeManager::empty()
        });
        let logs = LogCapture::default();
        let _guard = logs.install();

        let mut samples = Vec::new();
        let status = collector(&fake).collect(&mut samples).await;

        assert_eq!(status, CollectionStatus::Failed);
        assert!(samples.is_empty());
        assert_eq!(logs.errors().len(), 1);
        assert_eq!(fake.calls(), vec!["list_all_logical_ports"]);
    }

    #[tokio::test]
    async fn test_summary_failure_keeps_port_status() {
        let fake = Arc::new(FakeManager {
            port_summary: None,
            ..FakeManager::empty()
                .with_logical_port(logical_port("lp-1", "web"), Some(port_status("lp-1", "UP")))
        });
        let logs = LogCapture::default();
        let _guard = logs.install();

        let mut samples = Vec::new();
        let status = collector(&fake).collect(&mut samples).await;

        assert_eq!(status, CollectionStatus::Success);
        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(|s| s.descriptor().fq_name() == STATUS));

        let errors = logs.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field("id"), None);
    }

    #[tokio::test]
    async fn test_status_failure_skips_port() {
        let fake = Arc::new(
            FakeManager::empty()
                .with_logical_port(logical_port("lp-1", "web"), None)
                .with_logical_port(logical_port("lp-2", "db"), Some(port_status("lp-2", "UP"))),
        );
        let logs = LogCapture::default();
        let _guard = logs.install();

        let mut samples = Vec::new();
        collector(&fake).collect(&mut samples).await;

        assert!(samples.iter().all(|s| s.label("id") != Some("lp-1")));
        assert_eq!(
            samples
                .iter()
                .filter(|s| s.descriptor().fq_name() == STATUS)
                .count(),
            3
        );
        let errors = logs.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field("id"), Some("lp-1"));
    }

    #[tokio::test]
    async fn test_empty_list_still_reports_summary() {
        let fake = Arc::new(fake_with_summary(0, 0));
        let logs = LogCapture::default();
        let _guard = logs.install();

        let mut samples = Vec::new();
        let status = collector(&fake).collect(&mut samples).await;

        assert_eq!(status, CollectionStatus::Success);
        assert_eq!(samples.len(), 2);
        assert!(logs.events().is_empty());
    }
}
