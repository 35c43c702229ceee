//! CLI configuration.
//!
//! Stored as JSON at `~/.config/tribute/config.json`. Every field has a
//! default, and a file that fails to parse is ignored with a warning.
//! Environment variables override the file:
//! - `TRIBUTE_API_URL`
//! - `TRIBUTE_INIT_DATA`
//! - `TRIBUTE_AGENT_NAME`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tribute_linking::types::DEFAULT_POLL_INTERVAL;
use tribute_linking::{DeepLink, LinkingConfig};
use tribute_protocol::constants::DEFAULT_BASE_URL;

pub const ENV_API_URL: &str = "TRIBUTE_API_URL";
pub const ENV_INIT_DATA: &str = "TRIBUTE_INIT_DATA";
pub const ENV_AGENT_NAME: &str = "TRIBUTE_AGENT_NAME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Signed identity blob handed over by the messaging host.
    #[serde(default)]
    pub init_data: String,

    /// Agent account the linking deep link points at.
    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    /// Sent with publish, payout and verification requests.
    #[serde(default)]
    pub access_token: String,

    /// Currency used when printing amounts.
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_api_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_agent_name() -> String {
    tribute_linking::deep_link::DEFAULT_AGENT_NAME.into()
}

fn default_currency() -> String {
    "USD".into()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            init_data: String::new(),
            agent_name: default_agent_name(),
            access_token: String::new(),
            currency: default_currency(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl CliConfig {
    /// Loads the config file, then applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from(&config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Overrides fields from non-empty variables returned by `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        if let Some(url) = non_empty(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(data) = non_empty(ENV_INIT_DATA) {
            self.init_data = data;
        }
        if let Some(name) = non_empty(ENV_AGENT_NAME) {
            self.agent_name = name;
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        set_permissions_0600(path);
        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Linking settings derived from this config.
    pub fn linking(&self) -> anyhow::Result<LinkingConfig> {
        let config = LinkingConfig::default()
            .with_deep_link(DeepLink::new(self.agent_name.clone()))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))?;
        Ok(config)
    }
}

fn set_permissions_0600(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
}

pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_base_dir()?.join("tribute").join("config.json"))
}

fn config_base_dir() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA")
            .map_err(|_| anyhow::anyhow!("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config"))
    }
}
