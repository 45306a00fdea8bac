// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Instrumentation telemetry client.
//!
//! Collects lifecycle events and aggregated metrics produced by an instrumented
//! process and reports them in the background to the Datadog Agent, falling back
//! to the agentless intake when the Agent cannot be reached. Producers never
//! block on network I/O and delivery failures never reach the host application.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod aggregator;
pub mod api_key;
pub mod client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flusher;
pub mod heartbeat;
pub mod host;
pub mod metric;
pub mod payload;
pub mod products;
pub mod request;
pub mod submitter;
pub mod transport;
pub mod util;

pub use client::Client;
pub use config::Config;
pub use metric::Namespace;
pub use payload::{Configuration, Dependency};
pub use products::{ProductStatus, RemoteActivation};
