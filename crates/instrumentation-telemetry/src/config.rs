// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Telemetry configuration.
//!
//! Values are read once from `DD_*` environment variables (or from any lookup
//! function, which tests use to avoid touching the process environment) and
//! merged with defaults. Invalid values are logged at debug level and replaced
//! by their default; configuration never fails to load.

use std::env;
use std::fmt::{self, Debug};
use std::time::Duration;

use tracing::debug;

use crate::constants::{
    agentless_url, AGENT_TELEMETRY_PATH, DEFAULT_AGENT_URL, DEFAULT_HEARTBEAT_INTERVAL_SECS,
    DEFAULT_SITE, MAX_HEARTBEAT_INTERVAL_SECS, MIN_HEARTBEAT_INTERVAL_SECS,
};
use crate::errors::ConfigError;
use crate::util::{bool_or, int_or, non_empty};

pub const ENV_ENABLED: &str = "DD_INSTRUMENTATION_TELEMETRY_ENABLED";
pub const ENV_HEARTBEAT_INTERVAL: &str = "DD_TELEMETRY_HEARTBEAT_INTERVAL";
pub const ENV_DEBUG: &str = "DD_INSTRUMENTATION_TELEMETRY_DEBUG";
pub const ENV_DEPENDENCY_COLLECTION: &str = "DD_TELEMETRY_DEPENDENCY_COLLECTION_ENABLED";
pub const ENV_AGENTLESS: &str = "DD_INSTRUMENTATION_TELEMETRY_AGENTLESS";
pub const ENV_API_KEY: &str = "DD_API_KEY";
pub const ENV_SITE: &str = "DD_SITE";
pub const ENV_AGENT_URL: &str = "DD_TRACE_AGENT_URL";
pub const ENV_SERVICE: &str = "DD_SERVICE";
pub const ENV_ENV: &str = "DD_ENV";
pub const ENV_VERSION: &str = "DD_VERSION";

#[derive(Clone)]
pub struct Config {
    /// Master kill switch.
    pub enabled: bool,
    /// Interval between app-heartbeat events, always within [1s, 3600s].
    pub heartbeat_interval: Duration,
    /// Sets the debug flag on every outgoing request.
    pub debug: bool,
    /// Whether an app-dependencies-loaded event is sent on start.
    pub dependency_collection: bool,
    /// Send directly to the agentless intake instead of the Agent.
    pub agentless: bool,
    pub api_key: Option<String>,
    pub site: String,
    /// Base URL of the Datadog Agent.
    pub agent_url: String,
    pub service: String,
    pub env: String,
    pub version: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enabled: true,
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_INTERVAL_SECS),
            debug: false,
            dependency_collection: true,
            agentless: false,
            api_key: None,
            site: DEFAULT_SITE.to_string(),
            agent_url: DEFAULT_AGENT_URL.to_string(),
            service: String::new(),
            env: String::new(),
            version: String::new(),
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("enabled", &self.enabled)
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("debug", &self.debug)
            .field("dependency_collection", &self.dependency_collection)
            .field("agentless", &self.agentless)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("site", &self.site)
            .field("agent_url", &self.agent_url)
            .field("service", &self.service)
            .field("env", &self.env)
            .field("version", &self.version)
            .finish()
    }
}

impl Config {
    /// Loads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key);

        let heartbeat = int_or(
            ENV_HEARTBEAT_INTERVAL,
            get(ENV_HEARTBEAT_INTERVAL).as_deref(),
            i64::try_from(DEFAULT_HEARTBEAT_INTERVAL_SECS).unwrap_or(60),
        );

        Config {
            enabled: bool_or(ENV_ENABLED, get(ENV_ENABLED).as_deref(), defaults.enabled),
            heartbeat_interval: heartbeat_interval_from_secs(heartbeat),
            debug: bool_or(ENV_DEBUG, get(ENV_DEBUG).as_deref(), defaults.debug),
            dependency_collection: bool_or(
                ENV_DEPENDENCY_COLLECTION,
                get(ENV_DEPENDENCY_COLLECTION).as_deref(),
                defaults.dependency_collection,
            ),
            agentless: bool_or(ENV_AGENTLESS, get(ENV_AGENTLESS).as_deref(), defaults.agentless),
            api_key: non_empty(get(ENV_API_KEY)),
            site: non_empty(get(ENV_SITE)).unwrap_or(defaults.site),
            agent_url: non_empty(get(ENV_AGENT_URL))
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.agent_url),
            service: non_empty(get(ENV_SERVICE)).unwrap_or_default(),
            env: non_empty(get(ENV_ENV)).unwrap_or_default(),
            version: non_empty(get(ENV_VERSION)).unwrap_or_default(),
        }
    }

    /// The agentless intake URL for the configured site.
    #[must_use]
    pub fn agentless_url(&self) -> String {
        agentless_url(&self.site)
    }

    /// The URL telemetry is first submitted to.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        if self.agentless {
            self.agentless_url()
        } else {
            format!("{}{AGENT_TELEMETRY_PATH}", self.agent_url)
        }
    }

    /// Checks the options needed to submit telemetry, including on fallback.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agentless && self.api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }
        let url = self.endpoint_url();
        if reqwest::Url::parse(&url).is_err() {
            return Err(ConfigError::InvalidUrl(url));
        }
        Ok(())
    }
}

/// Out-of-range intervals fall back to the default rather than the nearest bound.
fn heartbeat_interval_from_secs(secs: i64) -> Duration {
    let min = i64::try_from(MIN_HEARTBEAT_INTERVAL_SECS).unwrap_or(1);
    let max = i64::try_from(MAX_HEARTBEAT_INTERVAL_SECS).unwrap_or(3600);
    match u64::try_from(secs) {
        Ok(valid) if (min..=max).contains(&secs) => Duration::from_secs(valid),
        _ => {
            debug!(
                "{ENV_HEARTBEAT_INTERVAL}={secs} not in [{min},{max}] range, setting to default of {DEFAULT_HEARTBEAT_INTERVAL_SECS}"
            );
            Duration::from_secs(DEFAULT_HEARTBEAT_INTERVAL_SECS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert!(config.enabled);
        assert!(!config.debug);
        assert!(config.dependency_collection);
        assert!(!config.agentless);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(60));
        assert_eq!(
            config.endpoint_url(),
            "http://localhost:8126/telemetry/proxy/api/v2/apmtelemetry"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_heartbeat_interval_in_range() {
        let config = config_from(&[(ENV_HEARTBEAT_INTERVAL, "1")]);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(1));
        let config = config_from(&[(ENV_HEARTBEAT_INTERVAL, "3600")]);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(3600));
    }

    #[test]
    fn test_heartbeat_interval_out_of_range_uses_default() {
        for value in ["0", "-5", "3601", "abc"] {
            let config = config_from(&[(ENV_HEARTBEAT_INTERVAL, value)]);
            assert_eq!(
                config.heartbeat_interval,
                Duration::from_secs(60),
                "value: {value}"
            );
        }
    }

    #[test]
    fn test_flags() {
        let config = config_from(&[
            (ENV_ENABLED, "false"),
            (ENV_DEBUG, "true"),
            (ENV_DEPENDENCY_COLLECTION, "0"),
        ]);
        assert!(!config.enabled);
        assert!(config.debug);
        assert!(!config.dependency_collection);
    }

    #[test]
    fn test_agentless_requires_api_key() {
        let config = config_from(&[(ENV_AGENTLESS, "true")]);
        assert!(matches!(config.validate(), Err(ConfigError::MissingApiKey)));

        let config = config_from(&[(ENV_AGENTLESS, "true"), (ENV_API_KEY, "  ")]);
        assert!(matches!(config.validate(), Err(ConfigError::MissingApiKey)));

        let config = config_from(&[(ENV_AGENTLESS, "true"), (ENV_API_KEY, "abc")]);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.endpoint_url(),
            "https://instrumentation-telemetry-intake.datadoghq.com/api/v2/apmtelemetry"
        );
    }

    #[test]
    fn test_site_and_agent_url() {
        let config = config_from(&[
            (ENV_SITE, "datadoghq.eu"),
            (ENV_AGENT_URL, "http://10.0.0.1:8126/"),
        ]);
        assert_eq!(
            config.agentless_url(),
            "https://instrumentation-telemetry-intake.datadoghq.eu/api/v2/apmtelemetry"
        );
        assert_eq!(
            config.endpoint_url(),
            "http://10.0.0.1:8126/telemetry/proxy/api/v2/apmtelemetry"
        );
    }

    #[test]
    fn test_invalid_agent_url() {
        let config = config_from(&[(ENV_AGENT_URL, "not a url")]);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = config_from(&[(ENV_API_KEY, "secret-api-key"), (ENV_SERVICE, "checkout")]);
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret-api-key"));
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("checkout"));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var(ENV_SERVICE, "checkout");
        env::set_var(ENV_ENV, "prod");
        env::set_var(ENV_VERSION, "1.2.3");
        env::set_var(ENV_HEARTBEAT_INTERVAL, "5");
        let config = Config::from_env();
        assert_eq!(config.service, "checkout");
        assert_eq!(config.env, "prod");
        assert_eq!(config.version, "1.2.3");
        assert_eq!(config.heartbeat_interval, Duration::from_secs(5));
        env::remove_var(ENV_SERVICE);
        env::remove_var(ENV_ENV);
        env::remove_var(ENV_VERSION);
        env::remove_var(ENV_HEARTBEAT_INTERVAL);
    }
}
