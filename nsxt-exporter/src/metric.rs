//! Metric descriptors and samples.
//!
//! A [`Descriptor`] is created once when a collector is built and shared
//! read-only by every scrape. A [`Sample`] is one value of a descriptor with
//! exactly as many label values as the descriptor has label names.

use std::sync::Arc;

use thiserror::Error;

use crate::mapping::{build_fq_name, sanitize_label_name};

/// Namespace prefixed to every exported metric.
pub const NAMESPACE: &str = "nsxt";

/// Metric value semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Gauge,
    Counter,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Gauge => "gauge",
            ValueType::Counter => "counter",
        }
    }
}

/// Errors raised while building samples.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("Metric {name} expects {expected} label values, got {got}")]
    LabelArity {
        name: String,
        expected: usize,
        got: usize,
    },
}

/// Immutable schema of a metric family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Descriptor {
    fq_name: String,
    help: String,
    label_names: Vec<String>,
    value_type: ValueType,
}

impl Descriptor {
    /// Create a descriptor named `nsxt_{subsystem}_{name}`.
    pub fn new(
        subsystem: &str,
        name: &str,
        help: &str,
        label_names: &[&str],
        value_type: ValueType,
    ) -> Arc<Self> {
        Arc::new(Self {
            fq_name: build_fq_name(NAMESPACE, subsystem, name),
            help: help.to_string(),
            label_names: label_names
                .iter()
                .map(|l| sanitize_label_name(l))
                .collect(),
            value_type,
        })
    }

    pub fn gauge(subsystem: &str, name: &str, help: &str, label_names: &[&str]) -> Arc<Self> {
        Self::new(subsystem, name, help, label_names, ValueType::Gauge)
    }

    /// Counter descriptor; the exposition format appends `_total` to the name.
    pub fn counter(subsystem: &str, name: &str, help: &str, label_names: &[&str]) -> Arc<Self> {
        Self::new(subsystem, name, help, label_names, ValueType::Counter)
    }

    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

/// One observed value of a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    descriptor: Arc<Descriptor>,
    value: f64,
    label_values: Vec<String>,
}

impl Sample {
    /// Build a sample, rejecting label values that do not match the
    /// descriptor's label names one to one.
    pub fn new(
        descriptor: &Arc<Descriptor>,
        value: f64,
        label_values: Vec<String>,
    ) -> Result<Self, MetricError> {
        if label_values.len() != descriptor.label_names.len() {
            return Err(MetricError::LabelArity {
                name: descriptor.fq_name.clone(),
                expected: descriptor.label_names.len(),
                got: label_values.len(),
            });
        }

        Ok(Self {
            descriptor: Arc::clone(descriptor),
            value,
            label_values,
        })
    }

    pub fn descriptor(&self) -> &Arc<Descriptor> {
        &self.descriptor
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Value of the label called `name`.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .label_names
            .iter()
            .position(|l| l == name)
            .map(|i| self.label_values[i].as_str())
    }

    /// Label name/value pairs in descriptor order.
    pub fn label_pairs(&self) -> Vec<(String, String)> {
        self.descriptor
            .label_names
            .iter()
            .cloned()
            .zip(self.label_values.iter().cloned())
            .collect()
    }
}
