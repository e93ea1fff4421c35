//! Role and permission checks used to gate privileged commands.
//!
//! Every check fails closed: a lookup that cannot be completed answers `false`
//! (or `None`) instead of surfacing an error.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    domain::{CommunityId, RoleId, UserId},
    gateway::{MemberInfo, Permissions, PlatformGateway},
};

#[derive(Clone)]
pub struct PermissionResolver {
    gateway: Arc<dyn PlatformGateway>,
}

impl PermissionResolver {
    pub fn new(gateway: Arc<dyn PlatformGateway>) -> Self {
        Self { gateway }
    }

    /// Id of the first role named exactly `role_name` (case-sensitive).
    pub async fn resolve_role_id(&self, community: &CommunityId, role_name: &str) -> Option<RoleId> {
        let info = match self.gateway.community(community).await {
            Ok(info) => info,
            Err(e) => {
                debug!(community = %community, "role lookup failed: {e}");
                return None;
            }
        };
        info.roles
            .into_iter()
            .find(|r| r.name == role_name)
            .map(|r| r.id)
    }

    pub async fn member_has_role(
        &self,
        community: &CommunityId,
        member: &UserId,
        role_name: &str,
    ) -> bool {
        let Some(role) = self.resolve_role_id(community, role_name).await else {
            return false;
        };
        let Some(info) = self.member(community, member).await else {
            return false;
        };
        info.roles.contains(&role)
    }

    pub async fn has_manage_permission(&self, community: &CommunityId, member: &UserId) -> bool {
        match self.gateway.member_permissions(community, member).await {
            Ok(perms) => perms.contains(Permissions::MANAGE_SERVER),
            Err(e) => {
                debug!(community = %community, member = %member, "permission lookup failed: {e}");
                false
            }
        }
    }

    /// Cached member view, falling back to a live fetch on a cache miss.
    async fn member(&self, community: &CommunityId, member: &UserId) -> Option<MemberInfo> {
        if let Some(info) = self.gateway.cached_member(community, member) {
            return Some(info);
        }
        match self.gateway.fetch_member(community, member).await {
            Ok(info) => Some(info),
            Err(e) => {
                warn!(community = %community, member = %member, "member fetch failed: {e}");
                None
            }
        }
    }
}
