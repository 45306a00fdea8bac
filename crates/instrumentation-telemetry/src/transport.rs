// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Single submission attempt and classification of its outcome.

use reqwest::StatusCode;
use tracing::trace;

use crate::errors::SubmitError;
use crate::request::Request;

/// Statuses for which retrying against the agentless intake cannot help.
const DO_NOT_RETRY: [StatusCode; 4] = [
    StatusCode::BAD_REQUEST,
    StatusCode::UNAUTHORIZED,
    StatusCode::FORBIDDEN,
    StatusCode::TOO_MANY_REQUESTS,
];

/// A failed attempt and whether it is worth repeating against the agentless intake.
#[derive(Debug)]
pub struct AttemptFailure {
    pub error: SubmitError,
    pub retry_agentless: bool,
}

/// Posts `request` once to its current URL.
pub async fn try_submit(request: &Request, agentless_url: &str) -> Result<(), AttemptFailure> {
    let payload = serde_json::to_vec(&request.body).map_err(|e| AttemptFailure {
        error: SubmitError::Serialization(e),
        retry_agentless: false,
    })?;

    trace!(
        "posting {} ({} bytes) to {}",
        request.body.request_type,
        payload.len(),
        request.url
    );
    let response = request
        .http_client
        .post(&request.url)
        .headers(request.headers.clone())
        .body(payload)
        .send()
        .await
        .map_err(|e| AttemptFailure {
            error: SubmitError::Transport(e),
            retry_agentless: should_retry_agentless(&request.url, agentless_url, None),
        })?;

    let status = response.status();
    if status == StatusCode::OK || status == StatusCode::ACCEPTED {
        return Ok(());
    }
    Err(AttemptFailure {
        error: SubmitError::BadStatus(status),
        retry_agentless: should_retry_agentless(&request.url, agentless_url, Some(status)),
    })
}

/// Decides whether a failed attempt should be repeated against the agentless intake.
///
/// `status` is `None` when no response was received at all.
#[must_use]
pub fn should_retry_agentless(url: &str, agentless_url: &str, status: Option<StatusCode>) -> bool {
    if url == agentless_url {
        // nowhere left to fall back to
        return false;
    }
    match status {
        None => true,
        Some(status) => !DO_NOT_RETRY.contains(&status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENT: &str = "http://localhost:8126/telemetry/proxy/api/v2/apmtelemetry";
    const AGENTLESS: &str =
        "https://instrumentation-telemetry-intake.datadoghq.com/api/v2/apmtelemetry";

    #[test]
    fn test_no_response_retries() {
        assert!(should_retry_agentless(AGENT, AGENTLESS, None));
    }

    #[test]
    fn test_server_errors_retry() {
        for code in [500, 502, 503, 404, 408] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(should_retry_agentless(AGENT, AGENTLESS, Some(status)), "{code}");
        }
    }

    #[test]
    fn test_client_errors_do_not_retry() {
        for code in [400, 401, 403, 429] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(!should_retry_agentless(AGENT, AGENTLESS, Some(status)), "{code}");
        }
    }

    #[test]
    fn test_never_retry_from_agentless() {
        assert!(!should_retry_agentless(AGENTLESS, AGENTLESS, None));
        assert!(!should_retry_agentless(
            AGENTLESS,
            AGENTLESS,
            Some(StatusCode::INTERNAL_SERVER_ERROR)
        ));
    }
}
