use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::live::ReconnectPolicy;
use crate::state::Settings;
use crate::{API_BASE, LIVE_WS_URL};

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Environment variable overriding `api.base_url`.
pub const API_BASE_ENV: &str = "PRIZEEDGE_API_BASE";

/// Top-level application config deserialized from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub live: LiveConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    /// Display and notification preferences.
    #[serde(default)]
    pub preferences: Settings,
}

/// Backend HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base")]
    pub base_url: String,
}

fn default_api_base() -> String {
    API_BASE.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
        }
    }
}

/// Live update socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveConfig {
    #[serde(default = "default_live_url")]
    pub url: String,
    /// Delay before reconnecting, in seconds.
    #[serde(default = "default_reconnect_secs")]
    pub reconnect_secs: u64,
    /// Backoff cap in seconds. 0 keeps the fixed interval.
    #[serde(default)]
    pub max_backoff_secs: u64,
}

fn default_live_url() -> String {
    LIVE_WS_URL.to_string()
}

fn default_reconnect_secs() -> u64 {
    3
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            url: default_live_url(),
            reconnect_secs: default_reconnect_secs(),
            max_backoff_secs: 0,
        }
    }
}

impl LiveConfig {
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        let base = Duration::from_secs(self.reconnect_secs);
        if self.max_backoff_secs > self.reconnect_secs {
            ReconnectPolicy::CappedExponential {
                base,
                max: Duration::from_secs(self.max_backoff_secs),
            }
        } else {
            ReconnectPolicy::Fixed(base)
        }
    }
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Polling interval in seconds for prediction refresh.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    10
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Reject intervals that would turn the refresh or reconnect loops into
    /// busy loops.
    pub fn validate(&self) -> Result<()> {
        if self.settings.poll_interval_secs == 0 {
            anyhow::bail!("settings.poll_interval_secs must be positive");
        }
        if self.live.reconnect_secs == 0 {
            anyhow::bail!("live.reconnect_secs must be positive");
        }
        Ok(())
    }

    /// Load config if the file exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write config to the given TOML file path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Apply environment overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                self.api.base_url = base.trim().to_string();
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.live.url, "ws://localhost:8000/ws/predictions");
        assert_eq!(config.settings.poll_interval_secs, 10);
        assert_eq!(
            config.live.reconnect_policy(),
            ReconnectPolicy::Fixed(Duration::from_secs(3))
        );
    }

    #[test]
    fn parses_full_file() {
        let config: AppConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://api.prizeedge.test"

            [live]
            url = "wss://api.prizeedge.test/ws/predictions"
            reconnect_secs = 2
            max_backoff_secs = 60

            [settings]
            poll_interval_secs = 5

            [preferences]
            high_confidence_only = true
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://api.prizeedge.test");
        assert_eq!(config.settings.poll_interval_secs, 5);
        assert!(config.preferences.high_confidence_only);
        assert_eq!(
            config.live.reconnect_policy(),
            ReconnectPolicy::CappedExponential {
                base: Duration::from_secs(2),
                max: Duration::from_secs(60),
            }
        );
    }

    #[test]
    fn save_then_load() {
        let path =
            std::env::temp_dir().join(format!("prizeedge-config-{}.toml", std::process::id()));
        let mut config = AppConfig::default();
        config.settings.poll_interval_secs = 7;
        config.preferences.sport_updates.nhl = false;
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_intervals() {
        let zero_poll: AppConfig = toml::from_str("[settings]\npoll_interval_secs = 0\n").unwrap();
        assert!(zero_poll.validate().is_err());

        let zero_reconnect: AppConfig =
            toml::from_str("[live]\nreconnect_secs = 0\nmax_backoff_secs = 30\n").unwrap();
        assert!(zero_reconnect.validate().is_err());
    }

    #[test]
    fn load_rejects_zero_intervals() {
        let path = std::env::temp_dir().join(format!(
            "prizeedge-zero-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[live]\nreconnect_secs = 0\n[settings]\npoll_interval_secs = 0\n",
        )
        .unwrap();
        let loaded = AppConfig::load(&path);
        let loaded_or_default = AppConfig::load_or_default(&path);
        std::fs::remove_file(&path).ok();
        assert!(loaded.is_err());
        assert!(loaded_or_default.is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = Path::new("/nonexistent/prizeedge/config.toml");
        assert!(AppConfig::load(path).is_err());
        assert_eq!(AppConfig::load_or_default(path).unwrap(), AppConfig::default());
    }
}
