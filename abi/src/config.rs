use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::MAX_BOOKINGS;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Where the flat data files live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_dir")]
    pub dir: String,
    #[serde(default = "default_users")]
    pub users: String,
    #[serde(default = "default_rooms")]
    pub rooms: String,
    #[serde(default = "default_bookings")]
    pub bookings: String,
    #[serde(default = "default_events")]
    pub events: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// How many random draws to try before giving up on a free booking id.
    #[serde(default = "default_id_retry_limit")]
    pub id_retry_limit: usize,
    #[serde(default = "default_max_bookings")]
    pub max_bookings: usize,
}

fn default_dir() -> String {
    ".".into()
}

fn default_users() -> String {
    "users.txt".into()
}

fn default_rooms() -> String {
    "rooms.txt".into()
}

fn default_bookings() -> String {
    "bookings.txt".into()
}

fn default_events() -> String {
    "login_logout_events.txt".into()
}

fn default_id_retry_limit() -> usize {
    10_000
}

fn default_max_bookings() -> usize {
    MAX_BOOKINGS
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            users: default_users(),
            rooms: default_rooms(),
            bookings: default_bookings(),
            events: default_events(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            id_retry_limit: default_id_retry_limit(),
            max_bookings: default_max_bookings(),
        }
    }
}

impl Config {
    pub fn load(filename: &str) -> Result<Self> {
        let config = fs::read_to_string(filename)
            .with_context(|| format!("failed to read config file {}", filename))?;
        serde_yaml::from_str(&config)
            .with_context(|| format!("failed to parse config file {}", filename))
    }

    /// A config rooted at `dir` with every other setting defaulted.
    pub fn with_data_dir(dir: impl Into<String>) -> Self {
        Self {
            data: DataConfig {
                dir: dir.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

impl DataConfig {
    /// The data directory with `~` and `$VARS` expanded.
    pub fn dir(&self) -> PathBuf {
        let dir = shellexpand::full(&self.dir)
            .map(|d| d.into_owned())
            .unwrap_or_else(|_| self.dir.clone());
        PathBuf::from(dir)
    }

    pub fn users_path(&self) -> PathBuf {
        self.dir().join(&self.users)
    }

    pub fn rooms_path(&self) -> PathBuf {
        self.dir().join(&self.rooms)
    }

    pub fn bookings_path(&self) -> PathBuf {
        self.dir().join(&self.bookings)
    }

    pub fn events_path(&self) -> PathBuf {
        self.dir().join(&self.events)
    }
}
