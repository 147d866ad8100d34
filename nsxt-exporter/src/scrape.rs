//! Scrape coordination and exposition.
//!
//! One scrape runs every active collector concurrently, reassembles their
//! output in registry order and renders it through a throwaway
//! `prometheus_client` registry. Nothing is kept between scrapes except a
//! small summary used by the readiness probe.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::collector::{CollectionStatus, Collector};
use crate::mapping::{build_fq_name, escape_label_value};
use crate::metric::{Descriptor, NAMESPACE, Sample, ValueType};

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

type Labels = Vec<(String, String)>;
type GaugeFamily = Family<Labels, Gauge<f64, AtomicU64>>;
type CounterFamily = Family<Labels, Counter<f64, AtomicU64>>;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct CollectorLabels {
    collector: String,
}

/// Output of one collector for one scrape.
#[derive(Debug, Clone)]
pub struct CollectorReport {
    pub name: &'static str,
    pub status: CollectionStatus,
    pub duration: Duration,
    pub samples: Vec<Sample>,
}

impl CollectorReport {
    fn failed(name: &'static str) -> Self {
        Self {
            name,
            status: CollectionStatus::Failed,
            duration: Duration::ZERO,
            samples: Vec::new(),
        }
    }
}

/// Result of one scrape cycle.
#[derive(Debug, Clone)]
pub struct Scrape {
    pub descriptors: Vec<Arc<Descriptor>>,
    pub reports: Vec<CollectorReport>,
}

impl Scrape {
    /// All samples in registry order.
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.reports.iter().flat_map(|r| r.samples.iter())
    }

    /// Render the scrape as OpenMetrics text.
    ///
    /// Every described metric gets a family, even when it has no samples.
    /// Each collector additionally reports whether its list call succeeded
    /// and how long it took.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut registry = Registry::default();
        let mut gauges: HashMap<&str, GaugeFamily> = HashMap::new();
        let mut counters: HashMap<&str, CounterFamily> = HashMap::new();

        for descriptor in &self.descriptors {
            let name = descriptor.fq_name();
            match descriptor.value_type() {
                ValueType::Gauge => {
                    let family = GaugeFamily::default();
                    registry.register(name, descriptor.help(), family.clone());
                    gauges.insert(name, family);
                }
                ValueType::Counter => {
                    let family = CounterFamily::default();
                    registry.register(name, descriptor.help(), family.clone());
                    counters.insert(name, family);
                }
            }
        }

        for sample in self.samples() {
            let name = sample.descriptor().fq_name();
            let labels: Labels = sample
                .label_pairs()
                .into_iter()
                .map(|(name, value)| (name, escape_label_value(&value)))
                .collect();
            if let Some(family) = gauges.get(name) {
                family.get_or_create(&labels).set(sample.value());
            } else if let Some(family) = counters.get(name) {
                family.get_or_create(&labels).inc_by(sample.value());
            } else {
                warn!(metric = name, "Dropping sample of undescribed metric");
            }
        }

        let success = Family::<CollectorLabels, Gauge>::default();
        registry.register(
            build_fq_name(NAMESPACE, "scrape", "collector_success"),
            "Whether the collector listed its resources successfully",
            success.clone(),
        );
        let duration = Family::<CollectorLabels, Gauge<f64, AtomicU64>>::default();
        registry.register(
            build_fq_name(NAMESPACE, "scrape", "collector_duration_seconds"),
            "Time the collector spent on this scrape",
            duration.clone(),
        );

        for report in &self.reports {
            let labels = CollectorLabels {
                collector: report.name.to_string(),
            };
            success
                .get_or_create(&labels)
                .set(i64::from(report.status.is_success()));
            duration
                .get_or_create(&labels)
                .set(report.duration.as_secs_f64());
        }

        let mut body = String::new();
        encode(&mut body, &registry)?;
        Ok(body)
    }
}

/// What the readiness probe knows about past scrapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub scrapes: u64,
    pub samples: usize,
    pub failed: Vec<&'static str>,
    pub duration: Duration,
}

/// Runs scrape cycles over a fixed set of collectors.
pub struct ScrapeCoordinator {
    collectors: Vec<Arc<dyn Collector>>,
    last: RwLock<Option<ScrapeSummary>>,
}

/// Shared coordinator handle for the HTTP server.
pub type SharedCoordinator = Arc<ScrapeCoordinator>;

impl ScrapeCoordinator {
    pub fn new(collectors: Vec<Arc<dyn Collector>>) -> Self {
        Self {
            collectors,
            last: RwLock::new(None),
        }
    }

    pub fn collectors(&self) -> &[Arc<dyn Collector>] {
        &self.collectors
    }

    /// Descriptors of every active collector, in registry order.
    pub fn describe(&self) -> Vec<Arc<Descriptor>> {
        self.collectors.iter().flat_map(|c| c.describe()).collect()
    }

    /// Run one scrape cycle.
    pub async fn scrape(&self) -> Scrape {
        let started = Instant::now();
        let descriptors = self.describe();

        let mut reports: Vec<CollectorReport> = self
            .collectors
            .iter()
            .map(|c| CollectorReport::failed(c.name()))
            .collect();

        let mut tasks = JoinSet::new();
        for (index, collector) in self.collectors.iter().enumerate() {
            let collector = Arc::clone(collector);
            tasks.spawn(async move {
                let started = Instant::now();
                let mut samples = Vec::new();
                let status = collector.collect(&mut samples).await;
                let report = CollectorReport {
                    name: collector.name(),
                    status,
                    duration: started.elapsed(),
                    samples,
                };
                (index, report)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, report)) => reports[index] = report,
                Err(e) => error!(error = %e, "Collector task did not complete"),
            }
        }

        let summary = ScrapeSummary {
            scrapes: self.last.read().as_ref().map_or(0, |s| s.scrapes) + 1,
            samples: reports.iter().map(|r| r.samples.len()).sum(),
            failed: reports
                .iter()
                .filter(|r| !r.status.is_success())
                .map(|r| r.name)
                .collect(),
            duration: started.elapsed(),
        };

        debug!(
            samples = summary.samples,
            failed = ?summary.failed,
            duration_ms = summary.duration.as_millis() as u64,
            "Scrape complete"
        );
        *self.last.write() = Some(summary);

        Scrape {
            descriptors,
            reports,
        }
    }

    /// Summary of the most recent scrape, if any has completed.
    pub fn last_summary(&self) -> Option<ScrapeSummary> {
        self.last.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.last.read().is_some()
    }
}
