//! Online/offline signal for the form.
//!
//! A background task checks the API root and publishes the result on a `watch` channel. The
//! flag only drives the offline notice; it never blocks or queues a submission.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use crate::api::ApiClient;
use crate::config::ConnectivityConfig;

/// Receiving side handed to the UI; `None` when probing is disabled.
pub(crate) struct ConnectivityMonitor {
    rx: Option<watch::Receiver<bool>>,
}

impl ConnectivityMonitor {
    pub(crate) fn disabled() -> Self {
        Self { rx: None }
    }

    pub(crate) fn spawn(
        handle: &tokio::runtime::Handle,
        client: Arc<ApiClient>,
        config: &ConnectivityConfig,
    ) -> Self {
        if !config.enabled {
            return Self::disabled();
        }

        let interval = Duration::from_secs(config.check_interval_seconds.max(1));
        let timeout = Duration::from_secs(config.check_timeout_seconds.max(1));
        let (tx, rx) = watch::channel(true);

        handle.spawn(async move {
            loop {
                let online = client.health_check(timeout).await;
                if publish(&tx, online) {
                    info!(online, "connectivity changed");
                }
                if tx.is_closed() {
                    break;
                }
                tokio::time::sleep(interval).await;
            }
        });

        Self { rx: Some(rx) }
    }

    /// New online state if it changed since the last poll.
    pub(crate) fn poll(&mut self) -> Option<bool> {
        let rx = self.rx.as_mut()?;
        match rx.has_changed() {
            Ok(true) => Some(*rx.borrow_and_update()),
            _ => None,
        }
    }
}

/// Send only real transitions; returns whether the value changed.
fn publish(tx: &watch::Sender<bool>, online: bool) -> bool {
    tx.send_if_modified(|current| {
        if *current == online {
            false
        } else {
            *current = online;
            true
        }
    })
}
