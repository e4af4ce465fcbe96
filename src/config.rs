//! Configuration constants and utilities for httpline
//!
//! Defaults may be stored in an INI file:
//!
//! ```ini
//! [defaults]
//! json = true
//! check_status = true
//! timeout = 30
//!
//! [headers]
//! User-Agent = httpline/0.1
//! ```
//!
//! Flags on the command line can only turn options on, so anything set
//! here acts as a baseline for every invocation.

use anyhow::{bail, Context, Result};
use ini::Ini;
use std::path::Path;
use std::time::Duration;

/// Default config file path for httpline
pub const DEFAULT_CONFIG_PATH: &str = "~/.httpline/config";

/// Environment variable name for overriding the config path
pub const CONFIG_PATH_ENV_VAR: &str = "HTTPLINE_CONFIG_PATH";

/// Environment variable name for the log filter (e.g. `debug`, `httpline=trace`)
pub const LOG_LEVEL_ENV_VAR: &str = "HTTPLINE_LOG_LEVEL";

/// Log filter used when neither `--verbose` nor the env var is set
pub const DEFAULT_LOG_LEVEL: &str = "warn";

const DEFAULTS_SECTION: &str = "defaults";
const HEADERS_SECTION: &str = "headers";

/// Get the config file path, checking environment variable first, then falling back to default
pub fn get_config_path() -> String {
    std::env::var_os(CONFIG_PATH_ENV_VAR)
        .and_then(|val| val.into_string().ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Get the log filter from the environment, falling back to the default
pub fn get_log_level() -> String {
    std::env::var(LOG_LEVEL_ENV_VAR)
        .ok()
        .filter(|level| !level.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// Option defaults read from the config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defaults {
    pub json: bool,
    pub raw: bool,
    pub check_status: bool,
    pub insecure: bool,
    pub print_headers: bool,
    pub timeout: Option<Duration>,
    /// Request headers applied before any request item
    pub headers: Vec<(String, String)>,
}

impl Defaults {
    /// Load defaults from `path`; a missing file yields empty defaults
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let path = Path::new(expanded.as_ref());
        if !path.exists() {
            tracing::debug!("Config file {} not found, using built-in defaults", path.display());
            return Ok(Self::default());
        }

        tracing::debug!("Loading config from {}", path.display());
        let ini = Ini::load_from_file(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_ini(&ini).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Load defaults from the path given by [`get_config_path`]
    pub fn load_default() -> Result<Self> {
        Self::load(&get_config_path())
    }

    fn from_ini(ini: &Ini) -> Result<Self> {
        let mut defaults = Self::default();

        if let Some(section) = ini.section(Some(DEFAULTS_SECTION)) {
            for (key, value) in section.iter() {
                match key {
                    "json" => defaults.json = parse_bool(key, value)?,
                    "raw" => defaults.raw = parse_bool(key, value)?,
                    "check_status" => defaults.check_status = parse_bool(key, value)?,
                    "insecure" => defaults.insecure = parse_bool(key, value)?,
                    "headers" => defaults.print_headers = parse_bool(key, value)?,
                    "timeout" => {
                        let seconds: f64 = value
                            .trim()
                            .parse()
                            .with_context(|| format!("timeout must be a number of seconds, got {value:?}"))?;
                        defaults.timeout = Some(timeout_from_secs(seconds)?);
                    }
                    other => tracing::warn!("ignoring unknown config key {:?}", other),
                }
            }
        }

        if let Some(section) = ini.section(Some(HEADERS_SECTION)) {
            defaults.headers = section
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
        }

        Ok(defaults)
    }
}

/// Convert a number of seconds into a timeout, rejecting negative or non-finite values
pub fn timeout_from_secs(seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("timeout must be a non-negative number of seconds, got {seconds}"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => bail!("{key} must be a boolean, got {other:?}"),
    }
}
