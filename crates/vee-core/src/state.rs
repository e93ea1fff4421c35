//! Bot state and its lock discipline.
//!
//! `BotState` is the snapshot root. `CommunityStore` is the only way to touch it
//! at runtime: every mutation holds the write lock for its own critical section,
//! and the persistence loop serializes under the read lock. Nothing awaits the
//! gateway while holding either lock.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    activity::{ActivityLog, ActivityRecord, EvictionPolicy},
    domain::{CommunityId, UserId},
    errors::Error,
    gateway::InboundMessage,
    status::StatusList,
    utils::unix_now,
    Result,
};

pub const DEFAULT_PREFIX: &str = ".";

/// Channels the bot posts into. Empty string means "not configured".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSlots {
    pub autorole: String,
    pub greeting: String,
    pub farewell: String,
}

/// Per-community settings and activity. One per process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityState {
    pub prefix: String,
    pub autorole: String,
    pub greeting: String,
    pub farewell: String,
    pub channels: ChannelSlots,
    pub activity: ActivityLog,
    pub statuses: StatusList,
}

impl Default for CommunityState {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            autorole: String::new(),
            greeting: String::new(),
            farewell: String::new(),
            channels: ChannelSlots::default(),
            activity: ActivityLog::default(),
            statuses: StatusList::default(),
        }
    }
}

/// Snapshot root: credentials, the managed community, and its state once registered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotState {
    pub token: String,
    pub community_id: CommunityId,
    pub community: Option<CommunityState>,
}

impl BotState {
    pub fn new(token: impl Into<String>, community_id: CommunityId) -> Self {
        Self {
            token: token.into(),
            community_id,
            community: None,
        }
    }
}

/// Outcome of a registration attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    Created,
    AlreadyRegistered,
    /// The community is not the one this process manages.
    Foreign,
}

#[derive(Clone)]
pub struct CommunityStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: RwLock<BotState>,
    policy: EvictionPolicy,
}

impl CommunityStore {
    pub fn new(state: BotState, policy: EvictionPolicy) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(state),
                policy,
            }),
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.inner.policy
    }

    pub async fn community_id(&self) -> CommunityId {
        self.inner.state.read().await.community_id.clone()
    }

    pub async fn is_registered(&self) -> bool {
        self.inner.state.read().await.community.is_some()
    }

    /// Create community state on first contact. Idempotent.
    pub async fn register(&self, community: &CommunityId) -> Registration {
        let mut st = self.inner.state.write().await;
        if st.community.is_some() {
            return Registration::AlreadyRegistered;
        }
        if &st.community_id != community {
            return Registration::Foreign;
        }
        st.community = Some(CommunityState::default());
        debug!(community = %community, "registered community state");
        Registration::Created
    }

    /// Append an activity record for `msg`. Returns whether anything was recorded.
    ///
    /// Skipped when unregistered, when `msg` was written by `me`, or when it comes
    /// from a community other than the managed one.
    pub async fn record_activity(&self, msg: &InboundMessage, me: &UserId) -> bool {
        self.record_activity_at(msg, me, unix_now()).await
    }

    pub async fn record_activity_at(&self, msg: &InboundMessage, me: &UserId, now: i64) -> bool {
        if &msg.author == me {
            return false;
        }

        let policy = self.inner.policy;
        let mut st = self.inner.state.write().await;
        if msg
            .community
            .as_ref()
            .is_some_and(|c| c != &st.community_id)
        {
            return false;
        }
        let Some(community) = st.community.as_mut() else {
            return false;
        };

        community.activity.append(
            ActivityRecord {
                id: msg.id.clone(),
                author: msg.author.clone(),
                channel: msg.channel.clone(),
                timestamp: now,
            },
            &policy,
        );
        true
    }

    pub async fn add_status(&self, text: &str) -> Result<()> {
        let mut st = self.inner.state.write().await;
        let community = st.community.as_mut().ok_or(Error::StateMissing)?;
        community.statuses.add(text)
    }

    pub async fn remove_status(&self, text: &str) -> Result<()> {
        let mut st = self.inner.state.write().await;
        let community = st.community.as_mut().ok_or(Error::StateMissing)?;
        community.statuses.remove(text)
    }

    pub async fn statuses(&self) -> Vec<String> {
        let st = self.inner.state.read().await;
        st.community
            .as_ref()
            .map(|c| c.statuses.as_slice().to_vec())
            .unwrap_or_default()
    }

    /// Next presence string for rotation; see [`StatusList::next_after`].
    pub async fn next_status(&self, cursor: Option<usize>) -> Option<(usize, String)> {
        let st = self.inner.state.read().await;
        st.community
            .as_ref()?
            .statuses
            .next_after(cursor)
            .map(|(idx, s)| (idx, s.to_string()))
    }

    /// Apply the age window to the activity log. Returns records removed.
    pub async fn prune_activity(&self, now: i64) -> usize {
        let policy = self.inner.policy;
        let mut st = self.inner.state.write().await;
        st.community
            .as_mut()
            .map(|c| c.activity.prune(now, &policy))
            .unwrap_or(0)
    }

    pub async fn community(&self) -> Option<CommunityState> {
        self.inner.state.read().await.community.clone()
    }

    pub async fn snapshot(&self) -> BotState {
        self.inner.state.read().await.clone()
    }

    /// Pretty JSON of the whole state, produced under the read lock.
    pub async fn to_snapshot_json(&self) -> Result<String> {
        let st = self.inner.state.read().await;
        Ok(serde_json::to_string_pretty(&*st)?)
    }
}
