// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The telemetry client: lifecycle, buffering and scheduling.
//!
//! Every entry point mutates the shared state under one mutex and returns
//! without touching the network. Flushing moves the pending requests out of the
//! state and hands them to the session's submission worker.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::aggregator::Aggregator;
use crate::api_key::ApiKeyFactory;
use crate::config::Config;
use crate::constants::LIBRARY_VERSION;
use crate::errors::ConfigError;
use crate::flusher::Flusher;
use crate::heartbeat;
use crate::metric::Namespace;
use crate::payload::{
    AppStarted, Configuration, Dependencies, Dependency, Payload, ProductDetails, Products,
};
use crate::products::ProductStatus;
use crate::request::{default_http_client, unix_now_secs, Request, RequestBuilder};
use crate::submitter::{AgentlessUrl, Submitter};

/// Handle to the telemetry client.
///
/// Cloning is cheap and every clone drives the same client, so one instance
/// is created at process start and passed to every producer.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: Config,
    builder: RequestBuilder,
    submitter: Submitter,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    started: bool,
    seq_id: u64,
    heartbeat_interval: Duration,
    pending: Vec<Request>,
    aggregator: Aggregator,
    appsec: Option<Arc<dyn ProductStatus>>,
    flusher: Option<Flusher>,
    heartbeat: Option<CancellationToken>,
    /// Workers of stopped sessions still submitting their last batches.
    draining: Vec<JoinHandle<()>>,
}

impl Client {
    /// Creates a stopped client using the default HTTP client.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let http_client = default_http_client()?;
        Ok(Self::with_http_client(config, http_client))
    }

    /// Creates a stopped client submitting through `http_client`.
    #[must_use]
    pub fn with_http_client(config: Config, http_client: reqwest::Client) -> Self {
        let agentless_url = AgentlessUrl::new(config.agentless_url());
        let api_key = ApiKeyFactory::new_with_env_fallback(config.api_key.clone());
        let builder = RequestBuilder::new(
            config.endpoint_url(),
            http_client,
            api_key.clone(),
            agentless_url.clone(),
        )
        .with_service(&config.service, &config.env, &config.version)
        .with_debug(config.debug);
        let submitter = Submitter::new(agentless_url, api_key);

        Client {
            inner: Arc::new(Inner {
                config,
                builder,
                submitter,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// The agentless intake used on fallback. Tests point it at a local server.
    #[must_use]
    pub fn agentless_url(&self) -> &AgentlessUrl {
        self.inner.submitter.agentless_url()
    }

    /// Registers the status of the security product reported on start.
    pub fn set_appsec_status(&self, status: Arc<dyn ProductStatus>) {
        self.lock().appsec = Some(status);
    }

    /// Whether telemetry has been turned off through the environment.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        !self.inner.config.enabled
    }

    /// Whether the client is started.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.lock().started
    }

    /// The sequence number of the last request built.
    #[must_use]
    pub fn sequence_id(&self) -> u64 {
        self.lock().seq_id
    }

    /// Starts the client, reporting `configuration` and `dependencies` in the
    /// first events, and arms the heartbeat.
    ///
    /// Does nothing if telemetry is disabled, the client is already started,
    /// the configuration cannot be used, or no tokio runtime is available.
    pub fn start(&self, configuration: Vec<Configuration>, dependencies: Vec<Dependency>) {
        if self.is_disabled() {
            debug!("instrumentation telemetry is disabled");
            return;
        }
        let mut state = self.lock();
        if state.started {
            debug!("telemetry client has already started, ignoring start");
            return;
        }
        if let Err(e) = self.inner.config.validate() {
            debug!("telemetry client not started: {e}");
            return;
        }
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("telemetry client not started, no tokio runtime available: {e}");
                return;
            }
        };

        state.started = true;
        state.aggregator = Aggregator::new();
        state.heartbeat_interval = self.inner.config.heartbeat_interval;

        let appsec_enabled = state.appsec.as_ref().is_some_and(|status| status.enabled());
        let app_started = Payload::AppStarted(AppStarted {
            configuration,
            products: Products {
                appsec: ProductDetails {
                    version: LIBRARY_VERSION.to_string(),
                    enabled: appsec_enabled,
                },
                profiler: ProductDetails {
                    version: LIBRARY_VERSION.to_string(),
                    enabled: false,
                },
            },
        });
        self.enqueue(&mut state, app_started);
        if self.inner.config.dependency_collection {
            self.enqueue(
                &mut state,
                Payload::DependenciesLoaded(Dependencies { dependencies }),
            );
        }

        state.draining.retain(|worker| !worker.is_finished());
        state.flusher = Some(Flusher::spawn(self.inner.submitter.clone(), &runtime));
        self.flush_locked(&mut state);

        let cancel_token = CancellationToken::new();
        let weak = Arc::downgrade(&self.inner);
        heartbeat::spawn(
            &runtime,
            state.heartbeat_interval,
            cancel_token.clone(),
            move || {
                let client = upgrade(&weak);
                async move { client.is_some_and(|client| client.heartbeat()) }
            },
        );
        state.heartbeat = Some(cancel_token);
        debug!(
            "telemetry client started, heartbeat every {}s",
            state.heartbeat_interval.as_secs()
        );
    }

    /// Stops the client, sending a final app-closing event. Idempotent.
    ///
    /// Does not wait for the final submissions; see [`Client::shutdown`].
    pub fn stop(&self) {
        let mut state = self.lock();
        if !state.started {
            return;
        }
        state.started = false;
        if let Some(cancel_token) = state.heartbeat.take() {
            cancel_token.cancel();
        }
        self.enqueue(&mut state, Payload::AppClosing);
        self.flush_locked(&mut state);
        if let Some(flusher) = state.flusher.take() {
            let worker = flusher.close();
            state.draining.push(worker);
        }
        debug!("telemetry client stopped");
    }

    /// Stops the client and waits up to `timeout` for pending submissions.
    ///
    /// Returns `false` if the submissions did not complete in time.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.stop();
        let workers = std::mem::take(&mut self.lock().draining);
        let drained = tokio::time::timeout(timeout, async move {
            for worker in workers {
                if let Err(e) = worker.await {
                    debug!("telemetry submission worker failed: {e}");
                }
            }
        })
        .await;
        if drained.is_err() {
            warn!(
                "timed out after {}ms waiting for telemetry submissions",
                timeout.as_millis()
            );
        }
        drained.is_ok()
    }

    /// Sets a gauge. Dropped if the client is not started.
    pub fn gauge(
        &self,
        namespace: Namespace,
        name: &str,
        value: f64,
        tags: &[String],
        common: bool,
    ) {
        let mut state = self.lock();
        if !state.started {
            return;
        }
        state
            .aggregator
            .record_gauge(namespace, name, value, tags, common, now());
    }

    /// Adds `delta` to a count. Dropped if the client is not started.
    pub fn count(
        &self,
        namespace: Namespace,
        name: &str,
        delta: f64,
        tags: &[String],
        common: bool,
    ) {
        let mut state = self.lock();
        if !state.started {
            return;
        }
        state
            .aggregator
            .record_count(namespace, name, delta, tags, common, now());
    }

    /// Submits pending events and changed metrics without waiting for the next heartbeat.
    pub fn flush(&self) {
        let mut state = self.lock();
        if !state.started {
            return;
        }
        self.flush_locked(&mut state);
    }

    /// Sends an app-heartbeat along with anything pending. Returns `false`
    /// once the client is stopped.
    pub(crate) fn heartbeat(&self) -> bool {
        let mut state = self.lock();
        if !state.started {
            return false;
        }
        self.enqueue(&mut state, Payload::AppHeartbeat);
        self.flush_locked(&mut state);
        true
    }

    fn enqueue(&self, state: &mut State, payload: Payload) {
        let request = self.inner.builder.build(&mut state.seq_id, payload);
        state.pending.push(request);
    }

    fn flush_locked(&self, state: &mut State) {
        for metrics in state.aggregator.drain() {
            self.enqueue(state, Payload::GenerateMetrics(metrics));
        }
        let batch = std::mem::take(&mut state.pending);
        match &state.flusher {
            Some(flusher) => {
                flusher.schedule(batch);
            }
            None => debug!(
                "no telemetry submission worker, dropping {} requests",
                batch.len()
            ),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn upgrade(weak: &Weak<Inner>) -> Option<Client> {
    weak.upgrade().map(|inner| Client { inner })
}

#[allow(clippy::cast_precision_loss)]
fn now() -> f64 {
    unix_now_secs() as f64
}
