//! Gateway event entry points.
//!
//! Adapters call into [`BotContext`] for every inbound event; the context owns
//! the store handle, the gateway, and the permission resolver built on it.

use std::sync::Arc;

use tracing::debug;

use crate::{
    gateway::{InboundMessage, PlatformGateway},
    permissions::PermissionResolver,
    state::{CommunityStore, Registration},
};

#[derive(Clone)]
pub struct BotContext {
    pub store: CommunityStore,
    pub gateway: Arc<dyn PlatformGateway>,
    pub permissions: PermissionResolver,
}

impl BotContext {
    pub fn new(store: CommunityStore, gateway: Arc<dyn PlatformGateway>) -> Self {
        let permissions = PermissionResolver::new(gateway.clone());
        Self {
            store,
            gateway,
            permissions,
        }
    }

    /// Register on first contact, then record the message. Returns whether a
    /// record was appended.
    pub async fn on_message(&self, msg: &InboundMessage) -> bool {
        let me = self.gateway.current_user();
        if msg.author == me {
            return false;
        }
        if !self.store.is_registered().await {
            self.register_from(msg).await;
        }
        self.store.record_activity(msg, &me).await
    }

    /// Resolve the message's channel to its community and register it.
    /// An unresolvable channel is a silent no-op.
    async fn register_from(&self, msg: &InboundMessage) -> Option<Registration> {
        let channel = match self.gateway.channel(&msg.channel).await {
            Ok(c) => c,
            Err(e) => {
                debug!(channel = %msg.channel, "registration skipped: {e}");
                return None;
            }
        };
        let Some(community) = channel.community else {
            debug!(channel = %msg.channel, "registration skipped: channel has no community");
            return None;
        };
        let outcome = self.store.register(&community).await;
        debug!(community = %community, ?outcome, "registration attempt");
        Some(outcome)
    }
}
