//! festival.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `monitoring.cron_secret`.
pub const ENV_CRON_SECRET: &str = "CRON_SECRET";
/// Environment variable overriding `monitoring.mail_api_key`.
pub const ENV_MAIL_API_KEY: &str = "RESEND_API_KEY";
/// Environment variable overriding `monitoring.notification_email`.
pub const ENV_NOTIFICATION_EMAIL: &str = "NOTIFICATION_EMAIL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FestConfig {
    pub site: SiteConfig,
    pub content: ContentConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    /// File name prefix for registration CSV exports.
    pub export_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "San Diego Yacht Rock Festival".to_string(),
            export_prefix: "yacht-rock-registrations".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Content cache freshness window in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self { cache_ttl_secs: 300 }
    }
}

impl ContentConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// How often the daemon runs the registration check, in seconds.
    pub interval_secs: u64,
    /// Trailing window inspected for new registrations, in hours.
    pub window_hours: u64,
    pub cron_secret: Option<String>,
    pub notification_email: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_endpoint: String,
    pub from_address: String,
    pub dashboard_url: Option<String>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            window_hours: 1,
            cron_secret: None,
            notification_email: None,
            mail_api_key: None,
            mail_endpoint: "https://api.resend.com/emails".to_string(),
            from_address: "Festival Alerts <onboarding@resend.dev>".to_string(),
            dashboard_url: None,
        }
    }
}

impl MonitoringConfig {
    /// True when both the mail key and the recipient are present.
    pub fn mail_configured(&self) -> bool {
        self.mail_api_key.as_deref().is_some_and(|k| !k.is_empty())
            && self.notification_email.as_deref().is_some_and(|e| !e.is_empty())
    }
}

impl FestConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FestConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise start from defaults.
    /// Environment secrets are applied in both cases.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(p) if p.exists() => Self::from_file(p)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override secrets from the environment. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(v) = read(ENV_CRON_SECRET) {
            self.monitoring.cron_secret = Some(v);
        }
        if let Some(v) = read(ENV_MAIL_API_KEY) {
            self.monitoring.mail_api_key = Some(v);
        }
        if let Some(v) = read(ENV_NOTIFICATION_EMAIL) {
            self.monitoring.notification_email = Some(v);
        }
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
