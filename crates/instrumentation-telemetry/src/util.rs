// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Parsing helpers for environment-style configuration values.

/// Parses a boolean configuration value.
///
/// Accepted values (case-insensitive, surrounding whitespace ignored):
/// - `1`, `true`, `t`, `yes`, `y` for `true`
/// - `0`, `false`, `f`, `no`, `n` for `false`
///
/// # Returns
///
/// * `Some(bool)` - The parsed value
/// * `None` - If the value is not recognized
///
/// # Examples
///
/// ```
/// use instrumentation_telemetry::util::parse_bool;
///
/// assert_eq!(parse_bool("TRUE"), Some(true));
/// assert_eq!(parse_bool(" 0 "), Some(false));
/// assert_eq!(parse_bool("maybe"), None);
/// ```
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Parses a boolean value, logging and returning `default` when it is missing or invalid.
#[must_use]
pub fn bool_or(key: &str, value: Option<&str>, default: bool) -> bool {
    let Some(raw) = value else {
        return default;
    };
    parse_bool(raw).unwrap_or_else(|| {
        tracing::debug!("{key}={raw} is not a valid boolean, using default of {default}");
        default
    })
}

/// Parses an integer value, logging and returning `default` when it is missing or invalid.
#[must_use]
pub fn int_or(key: &str, value: Option<&str>, default: i64) -> i64 {
    let Some(raw) = value else {
        return default;
    };
    raw.trim().parse::<i64>().unwrap_or_else(|_| {
        tracing::debug!("{key}={raw} is not a valid integer, using default of {default}");
        default
    })
}

/// Returns the trimmed value, or `None` when it is missing or blank.
#[must_use]
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
