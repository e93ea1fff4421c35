//! Snapshot file I/O and the periodic save loop.
//!
//! Snapshots are pretty-printed JSON of [`BotState`]. Writes go to a sibling
//! `.tmp` file first and are then renamed over the target, so a crash mid-write
//! leaves the previous snapshot intact.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    config::Config,
    errors::Error,
    state::{BotState, CommunityStore},
    utils::{iso_timestamp_utc, unix_now},
    Result,
};

/// Read a snapshot. `None` when the file is missing or blank.
pub fn load(path: &Path) -> Result<Option<BotState>> {
    if !path.exists() {
        return Ok(None);
    }
    let txt = fs::read_to_string(path)?;
    if txt.trim().is_empty() {
        return Ok(None);
    }
    let state: BotState = serde_json::from_str(&txt)?;
    Ok(Some(state))
}

pub fn save(path: &Path, state: &BotState) -> Result<()> {
    let txt = serde_json::to_string_pretty(state)?;
    write_atomic(path, txt.as_bytes())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, bytes).map_err(|e| {
        Error::Persistence(format!("failed to write {}: {e}", tmp.display()))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        Error::Persistence(format!(
            "failed to move {} into place: {e}",
            path.display()
        ))
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Startup: load the snapshot, or build and immediately save a fresh state from
/// the bootstrap values in `cfg`. Missing both is a config error.
pub fn load_or_bootstrap(cfg: &Config) -> Result<BotState> {
    if let Some(state) = load(&cfg.snapshot_file)? {
        info!(
            path = %cfg.snapshot_file.display(),
            registered = state.community.is_some(),
            "loaded snapshot"
        );
        return Ok(state);
    }

    let (Some(token), Some(community)) = (&cfg.bootstrap_token, &cfg.bootstrap_community) else {
        return Err(Error::Config(format!(
            "no snapshot at {} and VEE_BOT_TOKEN / VEE_COMMUNITY_ID are not both set",
            cfg.snapshot_file.display()
        )));
    };

    let state = BotState::new(token.clone(), community.clone());
    save(&cfg.snapshot_file, &state)?;
    info!(path = %cfg.snapshot_file.display(), community = %community, "wrote first-run snapshot");
    Ok(state)
}

/// Periodically writes the store to disk until cancelled, then flushes once more.
pub struct PersistenceLoop {
    store: CommunityStore,
    path: PathBuf,
    interval: Duration,
}

impl PersistenceLoop {
    pub fn new(store: CommunityStore, path: PathBuf, interval: Duration) -> Self {
        Self {
            store,
            path,
            interval,
        }
    }

    pub fn from_config(store: CommunityStore, cfg: &Config) -> Self {
        Self::new(store, cfg.snapshot_file.clone(), cfg.save_interval)
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    pub async fn run(self, cancel: CancellationToken) {
        let mut tick = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        // The first tick completes immediately; startup already has a snapshot.
        tick.tick().await;

        loop {
            tokio::select! {
              _ = cancel.cancelled() => break,
              _ = tick.tick() => {
                if let Err(e) = self.save_once().await {
                  error!("snapshot skipped, retrying next tick: {e}");
                }
              }
            }
        }

        match self.save_once().await {
            Ok(()) => info!(saved_at = %iso_timestamp_utc(), "final snapshot written"),
            Err(e) => error!("final snapshot failed: {e}"),
        }
    }

    /// Prune, serialize under the read lock, then write with the lock released.
    pub async fn save_once(&self) -> Result<()> {
        let pruned = self.store.prune_activity(unix_now()).await;
        if pruned > 0 {
            debug!(pruned, "pruned expired activity records");
        }

        let txt = self.store.to_snapshot_json().await?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, txt.as_bytes()))
            .await
            .map_err(|e| Error::Persistence(format!("snapshot writer task failed: {e}")))?
    }
}
