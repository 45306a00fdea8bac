// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

use crate::config::ENV_API_KEY;
use crate::util::non_empty;

pub type ApiKeyResolverFn = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Source of the API key attached to agentless submissions.
///
/// The key is only needed when a request goes to the agentless intake, which
/// for Agent-bound telemetry only happens on fallback, so dynamic sources are
/// resolved lazily on first use and then cached.
#[derive(Clone)]
pub enum ApiKeyFactory {
    Static(Option<String>),
    Dynamic {
        resolver_fn: ApiKeyResolverFn,
        api_key: Arc<OnceLock<Option<String>>>,
    },
}

impl ApiKeyFactory {
    pub fn new_from_resolver(resolver_fn: ApiKeyResolverFn) -> Self {
        Self::Dynamic {
            resolver_fn,
            api_key: Arc::new(OnceLock::new()),
        }
    }

    /// Uses the given key, or reads `DD_API_KEY` on first use when it is missing.
    pub fn new_with_env_fallback(api_key: Option<String>) -> Self {
        match non_empty(api_key) {
            Some(key) => Self::Static(Some(key)),
            None => Self::new_from_resolver(Arc::new(|| {
                non_empty(std::env::var(ENV_API_KEY).ok())
            })),
        }
    }

    pub fn new_from_static_key(api_key: &str) -> Self {
        Self::Static(non_empty(Some(api_key.to_string())))
    }

    /// Returns the key, or `None` if no usable key is configured.
    pub fn get_api_key(&self) -> Option<&str> {
        match self {
            Self::Static(api_key) => api_key.as_deref(),
            Self::Dynamic {
                resolver_fn,
                api_key,
            } => api_key
                .get_or_init(|| non_empty((resolver_fn)()))
                .as_deref(),
        }
    }
}

impl Debug for ApiKeyFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print the key itself
        write!(f, "ApiKeyFactory")
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn new_from_static_key() {
        let factory = ApiKeyFactory::new_from_static_key("mock-api-key");
        assert_eq!(factory.get_api_key(), Some("mock-api-key"));
    }

    #[test]
    fn blank_static_key_is_missing() {
        let factory = ApiKeyFactory::new_from_static_key("   ");
        assert_eq!(factory.get_api_key(), None);
    }

    #[test]
    fn resolver_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let factory = ApiKeyFactory::new_from_resolver(Arc::new(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            Some("resolved-key".to_string())
        }));
        assert_eq!(factory.get_api_key(), Some("resolved-key"));
        assert_eq!(factory.get_api_key(), Some("resolved-key"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn configured_key_wins_over_env() {
        let factory = ApiKeyFactory::new_with_env_fallback(Some("configured".to_string()));
        assert_eq!(factory.get_api_key(), Some("configured"));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let factory = ApiKeyFactory::new_from_static_key("secret");
        assert!(!format!("{factory:?}").contains("secret"));
    }
}
