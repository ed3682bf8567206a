use anyhow::{bail, Context};
use portal_client::portal::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use serde::Deserialize;
use std::{fs, time::Duration};

pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub portal: PortalConfig,
    #[serde(default)]
    pub poll: PollConfig,
    pub metrics: Option<MetricsConfig>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_interval_secs() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

impl PortalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("WATER_CONFIG").unwrap_or_else(|_| "water-config.toml".to_string());
        let contents =
            fs::read_to_string(&path).with_context(|| format!("failed to read config file {path}"))?;
        let mut cfg = Self::parse(&contents)?;

        if let Ok(username) = env::var("PLANO_WATER_USERNAME") {
            cfg.portal.username = username;
        }
        if let Ok(password) = env::var("PLANO_WATER_PASSWORD") {
            cfg.portal.password = password;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents).context("invalid config file")?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.portal.username.trim().is_empty() || self.portal.password.is_empty() {
            bail!("portal credentials missing: set portal.username/portal.password or PLANO_WATER_USERNAME/PLANO_WATER_PASSWORD");
        }
        if self.poll.interval_secs == 0 {
            bail!("poll.interval_secs must be greater than zero");
        }
        Ok(())
    }
}
