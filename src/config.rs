//! Configuration management for noipv6-duc.

use crate::error::{DdnsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// System-wide config location.
pub const SYSTEM_CONFIG_PATH: &str = "/usr/local/etc/noipv6-duc/config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hostname to keep updated and how often to check.
    pub host: HostConfig,

    /// Provider account credentials.
    pub auth: AuthConfig,

    /// HTTP and address source settings.
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Fully-qualified hostname registered with the provider.
    pub host_name: String,

    /// Check interval in minutes.
    pub interval: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Account user (or environment variable name if prefixed with $).
    pub user: String,

    /// Account password (or environment variable name if prefixed with $).
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Update endpoint.
    #[serde(default = "default_update_url")]
    pub update_url: String,

    /// Value of the User-Agent header sent with every update.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Shell command printing the host's addresses, whitespace separated.
    #[serde(default = "default_address_command")]
    pub address_command: String,
}

fn default_update_url() -> String {
    "https://dynupdate.no-ip.com/nic/update".to_string()
}

fn default_user_agent() -> String {
    "Personal noipv6-duc/linux-v5.0".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_address_command() -> String {
    "hostname -I".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            update_url: default_update_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            address_command: default_address_command(),
        }
    }
}

impl Config {
    /// Get the per-user config file path.
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("noipv6-duc").join("config.toml"))
    }

    /// Pick the first existing config file, falling back to the system path.
    pub fn default_path() -> PathBuf {
        let candidates = [
            Self::user_path(),
            Some(PathBuf::from(SYSTEM_CONFIG_PATH)),
            Some(PathBuf::from("config.toml")),
        ];

        candidates
            .into_iter()
            .flatten()
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| PathBuf::from(SYSTEM_CONFIG_PATH))
    }

    /// Load and validate configuration from a specific path.
    ///
    /// Credentials written as `$NAME` are replaced with the value of that
    /// environment variable.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DdnsError::Config(format!(
                "{} is not a file",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DdnsError::Config(format!("{}: {}", path.display(), e)))?;
        let mut config: Config = toml::from_str(&content)?;
        config.auth.user = resolve_env(&config.auth.user)?;
        config.auth.password = resolve_env(&config.auth.password)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.host.host_name.trim().is_empty() {
            return Err(DdnsError::Config("host.host_name is empty".to_string()));
        }
        if self.host.interval == 0 {
            return Err(DdnsError::Config(
                "host.interval must be at least 1 minute".to_string(),
            ));
        }
        if self.host.interval.checked_mul(60).is_none() {
            return Err(DdnsError::Config(format!(
                "host.interval of {} minutes is too large",
                self.host.interval
            )));
        }
        if self.auth.user.is_empty() {
            return Err(DdnsError::Config("auth.user is empty".to_string()));
        }
        if self.client.timeout_secs == 0 {
            return Err(DdnsError::Config(
                "client.timeout_secs must be positive".to_string(),
            ));
        }
        if self.client.address_command.trim().is_empty() {
            return Err(DdnsError::Config(
                "client.address_command is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Time between two address checks.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.host.interval.saturating_mul(60))
    }

    /// Generate example configuration.
    pub fn example() -> Self {
        Self {
            host: HostConfig {
                host_name: "myhost.ddns.net".to_string(),
                interval: 5,
            },
            auth: AuthConfig {
                user: "user@example.com".to_string(),
                password: "$NOIP_PASSWORD".to_string(),
            },
            client: ClientConfig::default(),
        }
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DdnsError::Config(e.to_string()))
    }
}

/// Resolve environment variable references (values starting with $).
fn resolve_env(value: &str) -> Result<String> {
    match value.strip_prefix('$') {
        Some(var_name) => std::env::var(var_name).map_err(|_| {
            DdnsError::Config(format!("Environment variable {} not set", var_name))
        }),
        None => Ok(value.to_string()),
    }
}
