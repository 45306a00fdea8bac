// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use derive_more::Display;
use serde::Serialize;

use crate::payload::Series;

/// Product area a metric belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    #[display("tracers")]
    Tracers,
    #[display("profilers")]
    Profilers,
    #[display("appsec")]
    #[serde(rename = "appsec")]
    AppSec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[display("gauge")]
    Gauge,
    #[display("count")]
    Count,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub kind: MetricKind,
    pub value: f64,
    /// Unix timestamp of the last update, in seconds.
    pub timestamp: f64,
    pub tags: Vec<String>,
    /// Whether the metric is shared across languages rather than specific to this one.
    pub common: bool,
}

impl Metric {
    /// Creates an empty metric. The tags are copied so the caller's slice is never aliased.
    #[must_use]
    pub fn new(name: &str, kind: MetricKind, tags: &[String], common: bool) -> Self {
        Metric {
            name: name.to_string(),
            kind,
            value: 0.0,
            timestamp: 0.0,
            tags: tags.to_vec(),
            common,
        }
    }

    /// Overwrites the value, as a gauge sample does.
    pub fn set(&mut self, value: f64, timestamp: f64) {
        self.value = value;
        self.timestamp = timestamp;
    }

    /// Adds `delta` to the value, as a count sample does.
    pub fn add(&mut self, delta: f64, timestamp: f64) {
        self.value += delta;
        self.timestamp = timestamp;
    }

    #[must_use]
    pub fn to_series(&self) -> Series {
        Series {
            metric: self.name.clone(),
            points: vec![[self.timestamp, self.value]],
            kind: self.kind,
            tags: self.tags.clone(),
            common: self.common,
        }
    }
}

/// Identity of a metric within a namespace.
///
/// Tags are joined in the order given, so the same tags in a different order
/// make a different metric, and distinct tag lists may collide when their
/// joined text is equal.
#[must_use]
pub fn metric_key(name: &str, tags: &[String]) -> String {
    let capacity = name.len() + tags.iter().map(|t| t.len() + 1).sum::<usize>();
    let mut key = String::with_capacity(capacity);
    key.push_str(name);
    key.push_str(&tags.join("-"));
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_metric_key_is_order_sensitive() {
        let a = metric_key("requests", &tags(&["a:1", "b:2"]));
        let b = metric_key("requests", &tags(&["b:2", "a:1"]));
        assert_eq!(a, "requestsa:1-b:2");
        assert_ne!(a, b);
    }

    #[test]
    fn test_metric_key_without_tags() {
        assert_eq!(metric_key("requests", &[]), "requests");
    }

    #[test]
    fn test_gauge_overwrites() {
        let mut metric = Metric::new("g", MetricKind::Gauge, &[], false);
        metric.set(3.0, 10.0);
        metric.set(1.5, 11.0);
        assert!((metric.value - 1.5).abs() < f64::EPSILON);
        assert!((metric.timestamp - 11.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_count_accumulates() {
        let mut metric = Metric::new("c", MetricKind::Count, &[], true);
        metric.add(3.0, 10.0);
        metric.add(1.5, 11.0);
        assert!((metric.value - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tags_are_copied() {
        let mut caller_tags = tags(&["env:prod"]);
        let metric = Metric::new("c", MetricKind::Count, &caller_tags, false);
        caller_tags[0] = "env:staging".to_string();
        assert_eq!(metric.tags, vec!["env:prod".to_string()]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Namespace::AppSec.to_string(), "appsec");
        assert_eq!(Namespace::Tracers.to_string(), "tracers");
        assert_eq!(MetricKind::Count.to_string(), "count");
        assert_eq!(
            serde_json::to_string(&Namespace::Profilers).unwrap(),
            "\"profilers\""
        );
        assert_eq!(serde_json::to_string(&MetricKind::Gauge).unwrap(), "\"gauge\"");
    }
}
