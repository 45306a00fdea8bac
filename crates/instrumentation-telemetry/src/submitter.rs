// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery of one request, with a single fallback to the agentless intake.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::api_key::ApiKeyFactory;
use crate::constants::HEADER_API_KEY;
use crate::errors::SubmitError;
use crate::request::Request;
use crate::transport::{try_submit, AttemptFailure};

/// Shared, overridable location of the agentless intake.
#[derive(Debug, Clone)]
pub struct AgentlessUrl(Arc<RwLock<String>>);

impl AgentlessUrl {
    pub fn new(url: impl Into<String>) -> Self {
        AgentlessUrl(Arc::new(RwLock::new(url.into())))
    }

    #[must_use]
    pub fn get(&self) -> String {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Redirects every later fallback, e.g. to a local test server.
    pub fn set(&self, url: impl Into<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = url.into();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Primary,
    Agentless,
}

#[derive(Debug, Clone)]
pub struct Submitter {
    agentless_url: AgentlessUrl,
    api_key: ApiKeyFactory,
}

impl Submitter {
    #[must_use]
    pub fn new(agentless_url: AgentlessUrl, api_key: ApiKeyFactory) -> Self {
        Submitter {
            agentless_url,
            api_key,
        }
    }

    #[must_use]
    pub fn agentless_url(&self) -> &AgentlessUrl {
        &self.agentless_url
    }

    /// Submits `request`, falling back once to the agentless intake on a retryable failure.
    ///
    /// The request is rewritten in place when it falls back. Only the error of
    /// the last attempt is returned.
    pub async fn submit(&self, request: &mut Request) -> Result<(), SubmitError> {
        let mut stage = Stage::Primary;
        loop {
            let agentless_url = self.agentless_url.get();
            let failure = match try_submit(request, &agentless_url).await {
                Ok(()) => return Ok(()),
                Err(failure) => failure,
            };
            match (stage, failure) {
                (
                    Stage::Primary,
                    AttemptFailure {
                        error,
                        retry_agentless: true,
                    },
                ) => {
                    debug!("telemetry submission failed, retrying with agentless: {error}");
                    self.redirect_to_agentless(request, agentless_url);
                    stage = Stage::Agentless;
                }
                (Stage::Primary, AttemptFailure { error, .. }) => return Err(error),
                (Stage::Agentless, AttemptFailure { error, .. }) => {
                    debug!("retrying with agentless telemetry failed: {error}");
                    return Err(error);
                }
            }
        }
    }

    fn redirect_to_agentless(&self, request: &mut Request, agentless_url: String) {
        request.url = agentless_url;
        match self.api_key.get_api_key() {
            Some(api_key) => request.set_header(HEADER_API_KEY, api_key),
            None => {
                request.headers.remove(HEADER_API_KEY);
                debug!("no API key available for agentless telemetry, the intake will reject it");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agentless_url_override_is_shared() {
        let url = AgentlessUrl::new("https://a.example");
        let clone = url.clone();
        clone.set("http://127.0.0.1:1234/agentless");
        assert_eq!(url.get(), "http://127.0.0.1:1234/agentless");
    }
}
