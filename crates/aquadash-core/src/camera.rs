//! Periodic camera snapshot refresh.
//!
//! The dashboard shows a camera picture that reloads on a fixed timer.
//! [`SnapshotPoller`] republishes a cache-busted snapshot URL on a watch
//! channel; the consumer simply re-renders whenever the URL changes.
//!
//! The poller's background task stops through a cancellation token: a
//! tick in flight when the poller is torn down completes harmlessly and
//! its result is discarded with the channel.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::gateway::Gateway;

/// Default snapshot refresh interval.
pub const SNAPSHOT_REFRESH: Duration = Duration::from_secs(10);

/// Background poller publishing fresh snapshot URLs.
#[derive(Debug)]
pub struct SnapshotPoller {
    url_rx: watch::Receiver<String>,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SnapshotPoller {
    /// Start polling with the default refresh interval.
    pub fn start(gateway: Gateway) -> Self {
        Self::start_with_interval(gateway, SNAPSHOT_REFRESH)
    }

    /// Start polling with a custom refresh interval.
    pub fn start_with_interval(gateway: Gateway, every: Duration) -> Self {
        let (url_tx, url_rx) = watch::channel(gateway.picture_url());
        let token = CancellationToken::new();
        let child = token.child_token();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // First tick fires immediately; the initial URL is already
            // published.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = child.cancelled() => {
                        debug!("snapshot poller stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        url_tx.send_replace(gateway.picture_url());
                    }
                }
            }
        });

        Self {
            url_rx,
            token,
            task: Some(task),
        }
    }

    /// The current snapshot URL.
    pub fn url(&self) -> String {
        self.url_rx.borrow().clone()
    }

    /// Observe snapshot URLs: current value now, a fresh one per tick.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.url_rx.clone()
    }

    /// Stop the background task. Safe to call more than once.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Stop and wait for the background task to finish.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SnapshotPoller {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
