// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use reqwest::StatusCode;

/// Errors preventing the client from being configured or started.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("agentless telemetry is enabled, but a valid DD API key was not found")]
    MissingApiKey,

    #[error("invalid telemetry endpoint URL '{0}'")]
    InvalidUrl(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors raised while delivering a single telemetry request.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("failed to serialize telemetry payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to send telemetry request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("bad HTTP response status {}", .0.as_u16())]
    BadStatus(StatusCode),
}
