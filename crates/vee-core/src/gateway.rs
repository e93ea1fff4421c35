use async_trait::async_trait;
use bitflags::bitflags;

use crate::{
    domain::{ChannelId, CommunityId, MessageId, RoleId, UserId},
    Result,
};

bitflags! {
    /// Effective permission bitmask for a member, as reported by the platform.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        const CREATE_INVITES   = 1 << 0;
        const KICK_MEMBERS     = 1 << 1;
        const BAN_MEMBERS      = 1 << 2;
        const ADMINISTRATOR    = 1 << 3;
        const MANAGE_CHANNELS  = 1 << 4;
        const MANAGE_SERVER    = 1 << 5;
        const SEND_MESSAGES    = 1 << 11;
        const MANAGE_MESSAGES  = 1 << 13;
        const MANAGE_ROLES     = 1 << 28;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: RoleId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberInfo {
    pub user: UserId,
    pub roles: Vec<RoleId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub community: Option<CommunityId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommunityInfo {
    pub id: CommunityId,
    pub channels: Vec<ChannelId>,
    pub members: Vec<UserId>,
    pub roles: Vec<RoleInfo>,
}

/// An observed message, as delivered by the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: MessageId,
    pub author: UserId,
    pub channel: ChannelId,
    pub community: Option<CommunityId>,
}

/// Hexagonal port for the chat platform (Discord today).
///
/// Reads should prefer the adapter's local cache; `fetch_member` is the only
/// method that is expected to go over the network.
#[async_trait]
pub trait PlatformGateway: Send + Sync {
    /// The bot's own authenticated identity.
    fn current_user(&self) -> UserId;

    async fn channel(&self, id: &ChannelId) -> Result<ChannelInfo>;
    async fn community(&self, id: &CommunityId) -> Result<CommunityInfo>;

    fn cached_member(&self, community: &CommunityId, member: &UserId) -> Option<MemberInfo>;
    async fn fetch_member(&self, community: &CommunityId, member: &UserId) -> Result<MemberInfo>;

    async fn member_permissions(
        &self,
        community: &CommunityId,
        member: &UserId,
    ) -> Result<Permissions>;

    async fn set_presence(&self, text: &str) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod fake {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicBool, AtomicUsize, Ordering},
            Mutex,
        },
    };

    use super::*;
    use crate::errors::Error;

    pub(crate) const BOT_ID: &str = "bot";

    /// In-memory gateway for tests. Unknown ids resolve to `Error::Resolution`.
    #[derive(Default)]
    pub(crate) struct FakeGateway {
        pub channels: HashMap<ChannelId, ChannelInfo>,
        pub communities: HashMap<CommunityId, CommunityInfo>,
        pub cached: HashMap<(CommunityId, UserId), MemberInfo>,
        pub remote: HashMap<(CommunityId, UserId), MemberInfo>,
        pub permissions: HashMap<(CommunityId, UserId), Permissions>,
        pub fail_presence: AtomicBool,
        pub fetches: AtomicUsize,
        pub presences: Mutex<Vec<String>>,
    }

    impl FakeGateway {
        /// One community `G1` with channel `C1` and roles `Admin` / `Member`.
        pub(crate) fn with_community() -> Self {
            let g = CommunityId::new("G1");
            let mut gw = Self::default();
            gw.channels.insert(
                ChannelId::new("C1"),
                ChannelInfo {
                    id: ChannelId::new("C1"),
                    community: Some(g.clone()),
                },
            );
            gw.communities.insert(
                g.clone(),
                CommunityInfo {
                    id: g,
                    channels: vec![ChannelId::new("C1")],
                    members: vec![UserId::new("U1")],
                    roles: vec![
                        RoleInfo {
                            id: RoleId::new("R-admin"),
                            name: "Admin".to_string(),
                        },
                        RoleInfo {
                            id: RoleId::new("R-member"),
                            name: "Member".to_string(),
                        },
                    ],
                },
            );
            gw
        }

        pub(crate) fn presences(&self) -> Vec<String> {
            self.presences.lock().unwrap().clone()
        }

        pub(crate) fn fetch_calls(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlatformGateway for FakeGateway {
        fn current_user(&self) -> UserId {
            UserId::new(BOT_ID)
        }

        async fn channel(&self, id: &ChannelId) -> Result<ChannelInfo> {
            self.channels
                .get(id)
                .cloned()
                .ok_or_else(|| Error::Resolution(format!("unknown channel {id}")))
        }

        async fn community(&self, id: &CommunityId) -> Result<CommunityInfo> {
            self.communities
                .get(id)
                .cloned()
                .ok_or_else(|| Error::Resolution(format!("unknown community {id}")))
        }

        fn cached_member(&self, community: &CommunityId, member: &UserId) -> Option<MemberInfo> {
            self.cached
                .get(&(community.clone(), member.clone()))
                .cloned()
        }

        async fn fetch_member(
            &self,
            community: &CommunityId,
            member: &UserId,
        ) -> Result<MemberInfo> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.remote
                .get(&(community.clone(), member.clone()))
                .cloned()
                .ok_or_else(|| Error::Resolution(format!("unknown member {member}")))
        }

        async fn member_permissions(
            &self,
            community: &CommunityId,
            member: &UserId,
        ) -> Result<Permissions> {
            self.permissions
                .get(&(community.clone(), member.clone()))
                .copied()
                .ok_or_else(|| Error::Resolution(format!("no permissions for {member}")))
        }

        async fn set_presence(&self, text: &str) -> Result<()> {
            if self.fail_presence.load(Ordering::SeqCst) {
                return Err(Error::External("presence update rejected".to_string()));
            }
            self.presences.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }
}
