// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wire format of telemetry requests (API v2, JSON).

use derive_more::Display;
use serde::Serialize;

use crate::metric::{MetricKind, Namespace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum RequestType {
    #[display("app-started")]
    #[serde(rename = "app-started")]
    AppStarted,
    #[display("app-dependencies-loaded")]
    #[serde(rename = "app-dependencies-loaded")]
    DependenciesLoaded,
    #[display("app-closing")]
    #[serde(rename = "app-closing")]
    AppClosing,
    #[display("app-heartbeat")]
    #[serde(rename = "app-heartbeat")]
    AppHeartbeat,
    #[display("generate-metrics")]
    #[serde(rename = "generate-metrics")]
    GenerateMetrics,
}

/// Top-level body shared by every request.
#[derive(Debug, Clone, Serialize)]
pub struct Body {
    pub api_version: &'static str,
    pub request_type: RequestType,
    /// Unix timestamp, in seconds, at which the request was built.
    pub tracer_time: i64,
    pub runtime_id: String,
    pub seq_id: u64,
    pub debug: bool,
    pub payload: Payload,
    pub application: Application,
    pub host: Host,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Application {
    pub service_name: String,
    pub env: String,
    pub service_version: String,
    pub tracer_version: String,
    pub language_name: String,
    pub language_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Host {
    pub hostname: String,
    pub os: String,
    pub os_version: String,
    pub architecture: String,
}

/// Request-specific payload. Events without a payload serialize as `null`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    AppStarted(AppStarted),
    DependenciesLoaded(Dependencies),
    AppClosing,
    AppHeartbeat,
    GenerateMetrics(Metrics),
}

impl Payload {
    #[must_use]
    pub fn request_type(&self) -> RequestType {
        match self {
            Payload::AppStarted(_) => RequestType::AppStarted,
            Payload::DependenciesLoaded(_) => RequestType::DependenciesLoaded,
            Payload::AppClosing => RequestType::AppClosing,
            Payload::AppHeartbeat => RequestType::AppHeartbeat,
            Payload::GenerateMetrics(_) => RequestType::GenerateMetrics,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppStarted {
    pub configuration: Vec<Configuration>,
    pub products: Products,
}

/// A configuration option reported by the host library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    pub name: String,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl Configuration {
    pub fn new(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Configuration {
            name: name.into(),
            value: value.into(),
            origin: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Products {
    pub appsec: ProductDetails,
    pub profiler: ProductDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductDetails {
    pub version: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Dependencies {
    pub dependencies: Vec<Dependency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Dependency {
            name: name.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    pub namespace: Namespace,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub metric: String,
    /// `[timestamp, value]` pairs.
    pub points: Vec<[f64; 2]>,
    #[serde(rename = "type")]
    pub kind: MetricKind,
    pub tags: Vec<String>,
    pub common: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(payload: Payload) -> Body {
        Body {
            api_version: "v2",
            request_type: payload.request_type(),
            tracer_time: 1_700_000_000,
            runtime_id: "runtime".to_string(),
            seq_id: 7,
            debug: false,
            payload,
            application: Application::default(),
            host: Host::default(),
        }
    }

    #[test]
    fn test_closing_payload_is_null() {
        let value = serde_json::to_value(body(Payload::AppClosing)).unwrap();
        assert_eq!(value["request_type"], "app-closing");
        assert_eq!(value["payload"], serde_json::Value::Null);
        assert_eq!(value["seq_id"], 7);
        assert_eq!(value["api_version"], "v2");
    }

    #[test]
    fn test_metrics_payload_shape() {
        let payload = Payload::GenerateMetrics(Metrics {
            namespace: Namespace::Tracers,
            series: vec![Series {
                metric: "spans_created".to_string(),
                points: vec![[1_700_000_000.0, 3.0]],
                kind: MetricKind::Count,
                tags: vec!["integration:sql".to_string()],
                common: true,
            }],
        });
        let value = serde_json::to_value(body(payload)).unwrap();
        assert_eq!(value["request_type"], "generate-metrics");
        assert_eq!(
            value["payload"],
            json!({
                "namespace": "tracers",
                "series": [{
                    "metric": "spans_created",
                    "points": [[1_700_000_000.0, 3.0]],
                    "type": "count",
                    "tags": ["integration:sql"],
                    "common": true
                }]
            })
        );
    }

    #[test]
    fn test_app_started_payload_shape() {
        let payload = Payload::AppStarted(AppStarted {
            configuration: vec![Configuration::new("trace_enabled", true)],
            products: Products {
                appsec: ProductDetails {
                    version: "1.0.0".to_string(),
                    enabled: true,
                },
                profiler: ProductDetails {
                    version: "1.0.0".to_string(),
                    enabled: false,
                },
            },
        });
        let value = serde_json::to_value(body(payload)).unwrap();
        assert_eq!(
            value["payload"],
            json!({
                "configuration": [{"name": "trace_enabled", "value": true}],
                "products": {
                    "appsec": {"version": "1.0.0", "enabled": true},
                    "profiler": {"version": "1.0.0", "enabled": false}
                }
            })
        );
    }

    #[test]
    fn test_request_type_display_matches_wire() {
        for request_type in [
            RequestType::AppStarted,
            RequestType::DependenciesLoaded,
            RequestType::AppClosing,
            RequestType::AppHeartbeat,
            RequestType::GenerateMetrics,
        ] {
            assert_eq!(
                serde_json::to_value(request_type).unwrap(),
                request_type.to_string()
            );
        }
    }
}
