//! Optional `config.toml` inside the application directory.
//!
//! ```toml
//! calendar_days = 21
//! grace_days = 1
//! color = false
//! log_level = "debug"
//! ```
//!
//! Every key may be omitted. A missing file means defaults for everything.

use std::{io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    calendar::{DEFAULT_CALENDAR_DAYS, MAX_CALENDAR_DAYS},
    streak::DEFAULT_GRACE_DAYS,
};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Days shown by `calendar` when `--days` isn't given.
    #[serde(default = "default_calendar_days")]
    pub calendar_days: u32,
    /// Days a streak survives without a completion.
    #[serde(default = "default_grace_days")]
    pub grace_days: u32,
    #[serde(default = "default_true")]
    pub color: bool,
    /// Level written to the log files when no logging flag is given.
    #[serde(default = "default_log_level", deserialize_with = "level_filter_de::deserialize")]
    pub log_level: LevelFilter,
}

fn default_calendar_days() -> u32 {
    DEFAULT_CALENDAR_DAYS
}

fn default_grace_days() -> u32 {
    DEFAULT_GRACE_DAYS
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> LevelFilter {
    LevelFilter::INFO
}

mod level_filter_de {
    use serde::{de::Error, Deserialize, Deserializer};
    use tracing::level_filters::LevelFilter;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<LevelFilter>().map_err(D::Error::custom)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calendar_days: default_calendar_days(),
            grace_days: default_grace_days(),
            color: default_true(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(application_path: &Path) -> Result<Self> {
        let path = application_path.join(CONFIG_FILE_NAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {path:?}, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to read {path:?}")),
        };
        Self::parse(&content).with_context(|| format!("Invalid config {path:?}"))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if !(1..=MAX_CALENDAR_DAYS).contains(&config.calendar_days) {
            anyhow::bail!("calendar_days should be between 1 and {MAX_CALENDAR_DAYS}");
        }
        Ok(config)
    }
}
