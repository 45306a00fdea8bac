// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Spawns a task calling `tick` every `interval` until cancelled.
///
/// The timer is re-armed only after a tick completes, and the loop ends as
/// soon as `tick` returns `false`.
pub fn spawn<F, Fut>(
    runtime: &Handle,
    interval: Duration,
    cancel_token: CancellationToken,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send,
{
    runtime.spawn(async move {
        loop {
            tokio::select! {
                () = cancel_token.cancelled() => break,
                () = tokio::time::sleep(interval) => {
                    if !tick().await {
                        break;
                    }
                }
            }
        }
        debug!("telemetry heartbeat stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_until_cancelled() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_clone = Arc::clone(&ticks);
        let cancel_token = CancellationToken::new();
        let task = spawn(
            &Handle::current(),
            Duration::from_secs(1),
            cancel_token.clone(),
            move || {
                let ticks = Arc::clone(&ticks_clone);
                async move {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    true
                }
            },
        );

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        cancel_token.cancel();
        task.await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_tick_returns_false() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_clone = Arc::clone(&ticks);
        let task = spawn(
            &Handle::current(),
            Duration::from_secs(1),
            CancellationToken::new(),
            move || {
                let ticks = Arc::clone(&ticks_clone);
                async move { ticks.fetch_add(1, Ordering::SeqCst) < 2 }
            },
        );
        task.await.unwrap();
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }
}
