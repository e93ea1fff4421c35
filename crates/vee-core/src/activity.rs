use std::{collections::VecDeque, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    domain::{ChannelId, MessageId, UserId},
};

/// One observed message. Never mutated after capture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: MessageId,
    pub author: UserId,
    pub channel: ChannelId,
    /// Capture time, seconds since the Unix epoch.
    pub timestamp: i64,
}

/// Bounds applied to the activity log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvictionPolicy {
    pub max_records: usize,
    pub max_age: Duration,
}

impl EvictionPolicy {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            max_records: cfg.activity_max_records,
            max_age: cfg.activity_max_age,
        }
    }
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Append-only, oldest-first record of observed messages.
///
/// Serialized as a plain JSON array so snapshots stay human-readable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    records: VecDeque<ActivityRecord>,
}

impl ActivityLog {
    /// Append, then drop the oldest records beyond `policy.max_records`.
    ///
    /// A zero `max_records` disables the count bound.
    pub fn append(&mut self, record: ActivityRecord, policy: &EvictionPolicy) {
        self.records.push_back(record);
        if policy.max_records == 0 {
            return;
        }
        while self.records.len() > policy.max_records {
            self.records.pop_front();
        }
    }

    /// Drop records captured more than `policy.max_age` before `now`.
    /// Returns how many were removed.
    pub fn prune(&mut self, now: i64, policy: &EvictionPolicy) -> usize {
        let max_age = i64::try_from(policy.max_age.as_secs()).unwrap_or(i64::MAX);
        let cutoff = now.saturating_sub(max_age);
        let before = self.records.len();
        self.records.retain(|r| r.timestamp >= cutoff);
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityRecord> {
        self.records.iter()
    }
}
