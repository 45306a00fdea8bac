// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Background submission of flushed batches.
//!
//! The client hands each flushed batch to a dedicated task over a bounded
//! channel and returns immediately. The task submits the requests of a batch
//! one after another; errors are logged and dropped so that telemetry
//! failures never reach the host application.

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::constants::SUBMISSION_QUEUE_CAPACITY;
use crate::request::Request;
use crate::submitter::Submitter;

#[derive(Debug)]
pub struct Flusher {
    tx: mpsc::Sender<Vec<Request>>,
    task: JoinHandle<()>,
}

impl Flusher {
    /// Spawns the submission task on `runtime`.
    #[must_use]
    pub fn spawn(submitter: Submitter, runtime: &Handle) -> Self {
        let (tx, rx) = mpsc::channel(SUBMISSION_QUEUE_CAPACITY);
        let task = runtime.spawn(run(rx, submitter));
        Flusher { tx, task }
    }

    /// Queues a batch without blocking. Returns `false` if the batch was dropped.
    pub fn schedule(&self, batch: Vec<Request>) -> bool {
        if batch.is_empty() {
            return true;
        }
        match self.tx.try_send(batch) {
            Ok(()) => true,
            Err(TrySendError::Full(batch)) => {
                warn!(
                    "telemetry submission queue is full, dropping {} requests",
                    batch.len()
                );
                false
            }
            Err(TrySendError::Closed(batch)) => {
                debug!(
                    "telemetry submission worker has stopped, dropping {} requests",
                    batch.len()
                );
                false
            }
        }
    }

    /// Closes the queue. The task exits once every queued batch has been submitted.
    #[must_use]
    pub fn close(self) -> JoinHandle<()> {
        drop(self.tx);
        self.task
    }
}

async fn run(mut rx: mpsc::Receiver<Vec<Request>>, submitter: Submitter) {
    debug!("telemetry submission worker started");
    while let Some(batch) = rx.recv().await {
        for mut request in batch {
            let request_type = request.body.request_type;
            let seq_id = request.body.seq_id;
            match submitter.submit(&mut request).await {
                Ok(()) => debug!("submitted {request_type} (seq_id {seq_id})"),
                Err(e) => debug!("submission error for {request_type} (seq_id {seq_id}): {e}"),
            }
        }
    }
    debug!("telemetry submission worker stopped");
}
