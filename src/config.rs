// src/config.rs

use anyhow::{bail, Result};
use std::path::PathBuf;

/// Run settings, read from `LIS_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where raw files are cached under their canonical names.
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    /// Session code such as `20251`; discovered from the portal when unset.
    pub session: Option<String>,
    pub enforce_foreign_keys: bool,
    /// Load whatever is already in `data_dir` without touching the network.
    pub skip_fetch: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("lis_data"),
            db_path: PathBuf::from("lis.db"),
            session: None,
            enforce_foreign_keys: false,
            skip_fetch: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(dir) = lookup("LIS_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("LIS_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        config.session = lookup("LIS_SESSION").filter(|s| !s.trim().is_empty());
        if let Some(session) = &config.session {
            if session.len() != 5 || !session.chars().all(|c| c.is_ascii_digit()) {
                bail!("LIS_SESSION must look like YYYYN, got {session:?}");
            }
        }
        if let Some(v) = lookup("LIS_ENFORCE_FOREIGN_KEYS") {
            config.enforce_foreign_keys = flag("LIS_ENFORCE_FOREIGN_KEYS", &v)?;
        }
        if let Some(v) = lookup("LIS_SKIP_FETCH") {
            config.skip_fetch = flag("LIS_SKIP_FETCH", &v)?;
        }
        Ok(config)
    }
}

fn flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("{key}: expected a boolean, got {other:?}"),
    }
}
