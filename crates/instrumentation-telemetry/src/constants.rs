// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Version of the telemetry API spoken by this client.
pub const API_VERSION: &str = "v2";

/// Reported as `language_name` and in the library language header.
pub const LANGUAGE_NAME: &str = "rust";

/// Version of this library, reported as `tracer_version`.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_SITE: &str = "datadoghq.com";
pub const DEFAULT_AGENT_URL: &str = "http://localhost:8126";
/// Path on the Agent proxying telemetry to the intake.
pub const AGENT_TELEMETRY_PATH: &str = "/telemetry/proxy/api/v2/apmtelemetry";

pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 60;
pub const MIN_HEARTBEAT_INTERVAL_SECS: u64 = 1;
pub const MAX_HEARTBEAT_INTERVAL_SECS: u64 = 3600;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Maximum number of flushed batches waiting for the submission worker.
pub const SUBMISSION_QUEUE_CAPACITY: usize = 64;

// Lowercase, for `HeaderName::from_static`
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_API_VERSION: &str = "dd-telemetry-api-version";
pub const HEADER_REQUEST_TYPE: &str = "dd-telemetry-request-type";
pub const HEADER_DEBUG_ENABLED: &str = "dd-telemetry-debug-enabled";
pub const HEADER_LIBRARY_LANGUAGE: &str = "dd-client-library-language";
pub const HEADER_LIBRARY_VERSION: &str = "dd-client-library-version";
pub const HEADER_AGENT_ENV: &str = "dd-agent-env";
pub const HEADER_AGENT_HOSTNAME: &str = "dd-agent-hostname";
pub const HEADER_CONTAINER_ID: &str = "datadog-container-id";
pub const HEADER_API_KEY: &str = "dd-api-key";

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Builds the agentless intake URL for a Datadog site, e.g. `datadoghq.eu`.
#[must_use]
pub fn agentless_url(site: &str) -> String {
    format!("https://instrumentation-telemetry-intake.{site}/api/v2/apmtelemetry")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agentless_url_default_site() {
        assert_eq!(
            agentless_url(DEFAULT_SITE),
            "https://instrumentation-telemetry-intake.datadoghq.com/api/v2/apmtelemetry"
        );
    }

    #[test]
    fn test_agentless_url_other_site() {
        assert_eq!(
            agentless_url("us5.datadoghq.com"),
            "https://instrumentation-telemetry-intake.us5.datadoghq.com/api/v2/apmtelemetry"
        );
    }
}
