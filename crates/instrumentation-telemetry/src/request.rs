// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Construction of self-contained telemetry requests.

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::api_key::ApiKeyFactory;
use crate::constants::{
    API_VERSION, CONNECT_TIMEOUT, CONTENT_TYPE_JSON, HEADER_AGENT_ENV, HEADER_AGENT_HOSTNAME,
    HEADER_API_KEY, HEADER_API_VERSION, HEADER_CONTAINER_ID, HEADER_CONTENT_TYPE,
    HEADER_DEBUG_ENABLED, HEADER_LIBRARY_LANGUAGE, HEADER_LIBRARY_VERSION, HEADER_REQUEST_TYPE,
    LANGUAGE_NAME, LIBRARY_VERSION, POOL_IDLE_TIMEOUT, REQUEST_TIMEOUT,
};
use crate::host;
use crate::payload::{Application, Body, Host, Payload};
use crate::submitter::AgentlessUrl;

/// A fully built request, ready to be submitted.
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub headers: HeaderMap,
    pub http_client: reqwest::Client,
    pub body: Body,
}

impl Request {
    /// Sets or replaces a header, ignoring values that are not valid header text.
    pub fn set_header(&mut self, name: &'static str, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(mut value) => {
                value.set_sensitive(name == HEADER_API_KEY);
                self.headers.insert(HeaderName::from_static(name), value);
            }
            Err(e) => debug!("dropping invalid value for header {name}: {e}"),
        }
    }
}

/// Builds the HTTP client used when the host does not provide one.
pub fn default_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .build()
}

/// Stamps identity, host and runtime metadata onto payloads.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    url: String,
    http_client: reqwest::Client,
    api_key: ApiKeyFactory,
    agentless_url: AgentlessUrl,
    application: Application,
    host: Host,
    debug: bool,
}

impl RequestBuilder {
    #[must_use]
    pub fn new(
        url: String,
        http_client: reqwest::Client,
        api_key: ApiKeyFactory,
        agentless_url: AgentlessUrl,
    ) -> Self {
        RequestBuilder {
            url,
            http_client,
            api_key,
            agentless_url,
            application: Application {
                tracer_version: LIBRARY_VERSION.to_string(),
                language_name: LANGUAGE_NAME.to_string(),
                language_version: rustc_version().to_string(),
                ..Application::default()
            },
            host: Host {
                hostname: host::hostname().to_string(),
                os: host::os_name().to_string(),
                os_version: host::os_version().to_string(),
                architecture: host::architecture().to_string(),
            },
            debug: false,
        }
    }

    #[must_use]
    pub fn with_service(mut self, service: &str, env: &str, version: &str) -> Self {
        self.application.service_name = service.to_string();
        self.application.env = env.to_string();
        self.application.service_version = version.to_string();
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builds a request for `payload`, consuming the next sequence number.
    pub fn build(&self, seq_id: &mut u64, payload: Payload) -> Request {
        *seq_id += 1;
        let request_type = payload.request_type();
        let body = Body {
            api_version: API_VERSION,
            request_type,
            tracer_time: unix_now_secs(),
            runtime_id: host::runtime_id().to_string(),
            seq_id: *seq_id,
            debug: self.debug,
            payload,
            application: self.application.clone(),
            host: self.host.clone(),
        };

        let mut request = Request {
            url: self.url.clone(),
            headers: HeaderMap::new(),
            http_client: self.http_client.clone(),
            body,
        };
        request.set_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON);
        request.set_header(HEADER_API_VERSION, API_VERSION);
        request.set_header(HEADER_REQUEST_TYPE, &request_type.to_string());
        request.set_header(HEADER_LIBRARY_LANGUAGE, LANGUAGE_NAME);
        request.set_header(HEADER_LIBRARY_VERSION, LIBRARY_VERSION);
        request.set_header(HEADER_AGENT_ENV, &self.application.env);
        request.set_header(HEADER_AGENT_HOSTNAME, &self.host.hostname);
        request.set_header(HEADER_CONTAINER_ID, host::container_id());
        if self.debug {
            request.set_header(HEADER_DEBUG_ENABLED, "true");
        }
        // the local Agent adds the key itself
        if self.url == self.agentless_url.get() {
            if let Some(api_key) = self.api_key.get_api_key() {
                request.set_header(HEADER_API_KEY, api_key);
            }
        }
        request
    }
}

pub(crate) fn unix_now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

/// Set by the build script.
fn rustc_version() -> &'static str {
    env!("RUSTC_VERSION")
}
