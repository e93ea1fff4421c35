use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{config::Config, gateway::PlatformGateway, state::CommunityStore};

/// Cycles the bot's presence through the community's status list.
pub struct StatusRotation {
    store: CommunityStore,
    gateway: Arc<dyn PlatformGateway>,
    interval: Duration,
    cursor: Option<usize>,
}

impl StatusRotation {
    pub fn new(store: CommunityStore, gateway: Arc<dyn PlatformGateway>, interval: Duration) -> Self {
        Self {
            store,
            gateway,
            interval,
            cursor: None,
        }
    }

    pub fn from_config(
        store: CommunityStore,
        gateway: Arc<dyn PlatformGateway>,
        cfg: &Config,
    ) -> Self {
        Self::new(store, gateway, cfg.status_interval)
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        let mut tick = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        loop {
            tokio::select! {
              _ = cancel.cancelled() => break,
              _ = tick.tick() => self.rotate_once().await,
            }
        }
    }

    /// Push the next status. Empty list or gateway failure skips the tick.
    pub async fn rotate_once(&mut self) {
        // Lock is released before talking to the gateway.
        let Some((idx, text)) = self.store.next_status(self.cursor).await else {
            return;
        };
        match self.gateway.set_presence(&text).await {
            Ok(()) => {
                debug!(status = %text, "presence updated");
                self.cursor = Some(idx);
            }
            Err(e) => warn!(status = %text, "presence update failed: {e}"),
        }
    }
}
