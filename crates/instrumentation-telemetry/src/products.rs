// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Product activation signals reported in the app-started event.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error};

/// Read-only view of whether a product is active in this process.
pub trait ProductStatus: Debug + Send + Sync {
    fn enabled(&self) -> bool;
}

/// Outcome of applying one remote configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyStatus {
    Acknowledged,
    Error(String),
}

#[derive(Debug, Deserialize)]
struct AsmFeatures {
    asm: AsmFeature,
}

#[derive(Debug, Deserialize)]
struct AsmFeature {
    enabled: bool,
}

/// Remotely toggled activation flag for the security product.
///
/// Clones share the same flag, so one copy can be handed to the remote
/// configuration poller while another is registered with the telemetry client.
#[derive(Debug, Clone, Default)]
pub struct RemoteActivation {
    enabled: Arc<AtomicBool>,
}

impl RemoteActivation {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        RemoteActivation {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Applies an update mapping config paths to raw `{"asm":{"enabled":bool}}` documents.
    ///
    /// Only an update carrying exactly one valid document changes the flag.
    /// Empty, ambiguous or malformed updates keep the current state.
    pub fn on_config_update(
        &self,
        update: &HashMap<String, Vec<u8>>,
    ) -> HashMap<String, ApplyStatus> {
        if update.len() > 1 {
            error!(
                "ignoring security activation update with {} configs, expected exactly one",
                update.len()
            );
            return update
                .keys()
                .map(|path| {
                    (
                        path.clone(),
                        ApplyStatus::Error("more than one config received".to_string()),
                    )
                })
                .collect();
        }

        let mut statuses = HashMap::with_capacity(update.len());
        for (path, raw) in update {
            let status = match serde_json::from_slice::<AsmFeatures>(raw) {
                Ok(features) => {
                    debug!("security activation set to {} by {path}", features.asm.enabled);
                    self.set(features.asm.enabled);
                    ApplyStatus::Acknowledged
                }
                Err(e) => {
                    error!("invalid security activation config at {path}: {e}");
                    ApplyStatus::Error(e.to_string())
                }
            };
            statuses.insert(path.clone(), status);
        }
        statuses
    }
}

impl ProductStatus for RemoteActivation {
    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}
