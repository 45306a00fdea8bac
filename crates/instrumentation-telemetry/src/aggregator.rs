// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use hashbrown::HashMap;
use tracing::debug;

use crate::metric::{metric_key, Metric, MetricKind, Namespace};
use crate::payload::Metrics;

/// In-memory store of every metric recorded since the client started.
///
/// Values are cumulative over the lifetime of the store: draining only clears
/// the dirty flag, so gauges keep reporting their last value and counts keep
/// growing across flushes.
#[derive(Debug, Default)]
pub struct Aggregator {
    metrics: HashMap<Namespace, HashMap<String, Metric>>,
    dirty: bool,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of a gauge.
    pub fn record_gauge(
        &mut self,
        namespace: Namespace,
        name: &str,
        value: f64,
        tags: &[String],
        common: bool,
        timestamp: f64,
    ) {
        self.entry(namespace, name, MetricKind::Gauge, tags, common)
            .set(value, timestamp);
        self.dirty = true;
    }

    /// Adds `delta` to a count.
    pub fn record_count(
        &mut self,
        namespace: Namespace,
        name: &str,
        delta: f64,
        tags: &[String],
        common: bool,
        timestamp: f64,
    ) {
        self.entry(namespace, name, MetricKind::Count, tags, common)
            .add(delta, timestamp);
        self.dirty = true;
    }

    /// Finds or creates a metric. An existing metric keeps the kind it was created with.
    fn entry(
        &mut self,
        namespace: Namespace,
        name: &str,
        kind: MetricKind,
        tags: &[String],
        common: bool,
    ) -> &mut Metric {
        let metric = self
            .metrics
            .entry(namespace)
            .or_default()
            .entry(metric_key(name, tags))
            .or_insert_with(|| Metric::new(name, kind, tags, common));
        if metric.kind != kind {
            debug!(
                "recording a {kind} sample into {namespace}/{name}, which stays a {}",
                metric.kind
            );
        }
        metric
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns one payload per namespace if anything changed since the last drain.
    ///
    /// Namespaces come out in a stable order so sequence numbers are assigned
    /// deterministically.
    pub fn drain(&mut self) -> Vec<Metrics> {
        if !self.dirty {
            return Vec::new();
        }
        self.dirty = false;
        let by_namespace: BTreeMap<_, _> = self.metrics.iter().collect();
        by_namespace
            .into_iter()
            .map(|(namespace, metrics)| Metrics {
                namespace: *namespace,
                series: metrics.values().map(Metric::to_series).collect(),
            })
            .collect()
    }

    #[must_use]
    pub fn get(&self, namespace: Namespace, name: &str, tags: &[String]) -> Option<&Metric> {
        self.metrics.get(&namespace)?.get(&metric_key(name, tags))
    }

    /// Number of distinct metrics across all namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
