use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use vee_core::{
    activity::EvictionPolicy,
    config::Config,
    persistence::{self, PersistenceLoop},
    state::CommunityStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vee_core::logging::init("vee")?;

    let cfg = Config::load().context("failed to load configuration")?;
    let state = persistence::load_or_bootstrap(&cfg).context("failed to load bot state")?;
    info!(community = %state.community_id, "starting");

    let store = CommunityStore::new(state, EvictionPolicy::from_config(&cfg));
    let cancel = CancellationToken::new();
    let saver = PersistenceLoop::from_config(store.clone(), &cfg).spawn(cancel.clone());

    // The platform adapter attaches here through `handlers::BotContext` and
    // `presence::StatusRotation`, sharing `store` and `cancel`.

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutting down");

    cancel.cancel();
    saver.await.context("persistence task panicked")?;
    Ok(())
}
