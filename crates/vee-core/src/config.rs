use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{domain::CommunityId, errors::Error, Result};

const DEFAULT_SNAPSHOT_FILE: &str = "config.json";
const DEFAULT_SAVE_INTERVAL_SECS: u64 = 5 * 60;
const DEFAULT_ACTIVITY_MAX_RECORDS: usize = 10_000;
const DEFAULT_ACTIVITY_MAX_AGE_SECS: u64 = 7 * 24 * 3600;
const DEFAULT_STATUS_INTERVAL_SECS: u64 = 60;

/// Typed runtime configuration.
///
/// The snapshot file holds the bot's own state (token, community, activity);
/// this struct only covers how the process runs around it.
#[derive(Clone, Debug)]
pub struct Config {
    // Persistence
    pub snapshot_file: PathBuf,
    pub save_interval: Duration,

    // Activity log eviction
    pub activity_max_records: usize,
    pub activity_max_age: Duration,

    // Presence
    pub status_interval: Duration,

    // First-run bootstrap (used only when no snapshot exists)
    pub bootstrap_token: Option<String>,
    pub bootstrap_community: Option<CommunityId>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_file: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            save_interval: Duration::from_secs(DEFAULT_SAVE_INTERVAL_SECS),
            activity_max_records: DEFAULT_ACTIVITY_MAX_RECORDS,
            activity_max_age: Duration::from_secs(DEFAULT_ACTIVITY_MAX_AGE_SECS),
            status_interval: Duration::from_secs(DEFAULT_STATUS_INTERVAL_SECS),
            bootstrap_token: None,
            bootstrap_community: None,
        }
    }
}

impl Config {
    /// Load from the process environment (plus `.env`, which never overrides).
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let snapshot_file = lookup("VEE_SNAPSHOT_FILE")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or(defaults.snapshot_file);

        let save_interval = secs(&lookup, "VEE_SAVE_INTERVAL_SECS")?
            .unwrap_or(defaults.save_interval);
        let status_interval = secs(&lookup, "VEE_STATUS_INTERVAL_SECS")?
            .unwrap_or(defaults.status_interval);

        let activity_max_records = match lookup("VEE_ACTIVITY_MAX_RECORDS") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                Error::Config(format!("VEE_ACTIVITY_MAX_RECORDS is not a number: {raw}"))
            })?,
            None => defaults.activity_max_records,
        };
        let activity_max_age = secs(&lookup, "VEE_ACTIVITY_MAX_AGE_SECS")?
            .unwrap_or(defaults.activity_max_age);

        let bootstrap_token = lookup("VEE_BOT_TOKEN").and_then(non_empty);
        let bootstrap_community = lookup("VEE_COMMUNITY_ID")
            .and_then(non_empty)
            .map(|s| CommunityId(s.trim().to_string()));

        Ok(Self {
            snapshot_file,
            save_interval,
            activity_max_records,
            activity_max_age,
            status_interval,
            bootstrap_token,
            bootstrap_community,
        })
    }
}

/// Positive number of seconds, `None` when unset.
fn secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let n = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{key} is not a number: {raw}")))?;
    if n == 0 {
        return Err(Error::Config(format!("{key} must be greater than zero")));
    }
    Ok(Some(Duration::from_secs(n)))
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.snapshot_file, PathBuf::from("config.json"));
        assert_eq!(cfg.save_interval, Duration::from_secs(300));
        assert_eq!(cfg.activity_max_records, 10_000);
        assert_eq!(cfg.activity_max_age, Duration::from_secs(604_800));
        assert!(cfg.bootstrap_token.is_none());
        assert!(cfg.bootstrap_community.is_none());
    }

    #[test]
    fn reads_overrides_and_bootstrap_values() {
        let cfg = Config::from_lookup(lookup(&[
            ("VEE_SNAPSHOT_FILE", "/var/lib/vee/state.json"),
            ("VEE_SAVE_INTERVAL_SECS", "30"),
            ("VEE_ACTIVITY_MAX_RECORDS", "50"),
            ("VEE_BOT_TOKEN", "abc"),
            ("VEE_COMMUNITY_ID", " 1234 "),
        ]))
        .unwrap();
        assert_eq!(cfg.snapshot_file, PathBuf::from("/var/lib/vee/state.json"));
        assert_eq!(cfg.save_interval, Duration::from_secs(30));
        assert_eq!(cfg.activity_max_records, 50);
        assert_eq!(cfg.bootstrap_token.as_deref(), Some("abc"));
        assert_eq!(cfg.bootstrap_community, Some(CommunityId::new("1234")));
    }

    #[test]
    fn rejects_zero_and_garbage_intervals() {
        let err = Config::from_lookup(lookup(&[("VEE_SAVE_INTERVAL_SECS", "0")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err =
            Config::from_lookup(lookup(&[("VEE_STATUS_INTERVAL_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn blank_bootstrap_values_are_ignored() {
        let cfg = Config::from_lookup(lookup(&[("VEE_BOT_TOKEN", "  "), ("VEE_COMMUNITY_ID", "")]))
            .unwrap();
        assert!(cfg.bootstrap_token.is_none());
        assert!(cfg.bootstrap_community.is_none());
    }
}
