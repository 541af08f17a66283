//! Configuration management for the leadgate relay service.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use leadgate_delivery::{RelaySeeds, SheetsConfig, TrackdriveConfig};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// The five configuration values the service cannot deliver without.
///
/// They are never defaulted to working values: absence is logged at
/// startup and reported by `GET /debug/env`, but does not prevent the
/// process from serving requests.
pub const REQUIRED_VALUES: [&str; 5] = [
    "GOOGLE_SHEETS_ID",
    "GOOGLE_PROJECT_ID",
    "GOOGLE_CLIENT_EMAIL",
    "GOOGLE_PRIVATE_KEY",
    "TRACKDRIVE_API_KEY",
];

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// Inbound HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,
    /// Path to the static landing-page file served at `/`.
    ///
    /// Environment variable: `LANDING_PAGE`
    #[serde(default = "default_landing_page", alias = "LANDING_PAGE")]
    pub landing_page: String,

    // Lead API
    /// TrackDrive lead submission endpoint.
    ///
    /// Environment variable: `TRACKDRIVE_API_URL`
    #[serde(default = "default_trackdrive_api_url", alias = "TRACKDRIVE_API_URL")]
    pub trackdrive_api_url: String,
    /// Bearer credential for the lead API. Required.
    ///
    /// Environment variable: `TRACKDRIVE_API_KEY`
    #[serde(default, alias = "TRACKDRIVE_API_KEY")]
    pub trackdrive_api_key: String,
    /// Timeout for lead API submissions in seconds.
    ///
    /// Environment variable: `DELIVERY_TIMEOUT_SECONDS`
    #[serde(default = "default_delivery_timeout", alias = "DELIVERY_TIMEOUT_SECONDS")]
    pub delivery_timeout_seconds: u64,
    /// Fixed client identifier sent as the outbound `User-Agent`.
    ///
    /// Environment variable: `USER_AGENT`
    #[serde(default = "default_user_agent", alias = "USER_AGENT")]
    pub user_agent: String,
    /// Publisher token seeded into every lead record.
    ///
    /// Environment variable: `LEAD_TOKEN`
    #[serde(default = "default_lead_token", alias = "LEAD_TOKEN")]
    pub lead_token: String,
    /// Origin URL reported as the lead source.
    ///
    /// Environment variable: `SOURCE_URL`
    #[serde(default = "default_source_url", alias = "SOURCE_URL")]
    pub source_url: String,

    // Spreadsheet
    /// Target spreadsheet identifier. Required.
    ///
    /// Environment variable: `GOOGLE_SHEETS_ID`
    #[serde(default, alias = "GOOGLE_SHEETS_ID")]
    pub google_sheets_id: String,
    /// Service-account project identifier. Required.
    ///
    /// Environment variable: `GOOGLE_PROJECT_ID`
    #[serde(default, alias = "GOOGLE_PROJECT_ID")]
    pub google_project_id: String,
    /// Service-account email. Required.
    ///
    /// Environment variable: `GOOGLE_CLIENT_EMAIL`
    #[serde(default, alias = "GOOGLE_CLIENT_EMAIL")]
    pub google_client_email: String,
    /// Service-account private key (PEM). Required.
    ///
    /// Environment variable: `GOOGLE_PRIVATE_KEY`
    #[serde(default, alias = "GOOGLE_PRIVATE_KEY")]
    pub google_private_key: String,
    /// Spreadsheet tab receiving lead rows.
    ///
    /// Environment variable: `SHEET_TITLE`
    #[serde(default = "default_sheet_title", alias = "SHEET_TITLE")]
    pub sheet_title: String,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Loads configuration from defaults, `config.toml`, and environment
    /// variable overrides.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Names of required values that are currently unset.
    pub fn missing_required(&self) -> Vec<&'static str> {
        self.required_values()
            .into_iter()
            .filter_map(|(name, present)| (!present).then_some(name))
            .collect()
    }

    /// Presence of each required value, in reporting order.
    pub fn required_values(&self) -> [(&'static str, bool); 5] {
        let present = |value: &str| !value.trim().is_empty();
        [
            ("GOOGLE_SHEETS_ID", present(&self.google_sheets_id)),
            ("GOOGLE_PROJECT_ID", present(&self.google_project_id)),
            ("GOOGLE_CLIENT_EMAIL", present(&self.google_client_email)),
            ("GOOGLE_PRIVATE_KEY", present(&self.google_private_key)),
            ("TRACKDRIVE_API_KEY", present(&self.trackdrive_api_key)),
        ]
    }

    /// Converts to the lead API client configuration.
    pub fn to_trackdrive_config(&self) -> TrackdriveConfig {
        TrackdriveConfig {
            api_url: self.trackdrive_api_url.clone(),
            api_key: self.trackdrive_api_key.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.delivery_timeout_seconds),
        }
    }

    /// Converts to the spreadsheet client configuration.
    pub fn to_sheets_config(&self) -> SheetsConfig {
        SheetsConfig {
            spreadsheet_id: self.google_sheets_id.clone(),
            client_email: self.google_client_email.clone(),
            private_key: self.google_private_key.clone(),
            ..SheetsConfig::default()
        }
    }

    /// Converts to the per-deployment relay seeds.
    pub fn to_relay_seeds(&self) -> RelaySeeds {
        RelaySeeds {
            lead_token: self.lead_token.clone(),
            origin_url: self.source_url.clone(),
            sheet_title: self.sheet_title.clone(),
        }
    }

    /// Parses the server socket address from host and port.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validates configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.delivery_timeout_seconds == 0 {
            anyhow::bail!("delivery_timeout_seconds must be greater than 0");
        }

        if self.trackdrive_api_url.trim().is_empty() {
            anyhow::bail!("trackdrive_api_url must not be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            landing_page: default_landing_page(),
            trackdrive_api_url: default_trackdrive_api_url(),
            trackdrive_api_key: String::new(),
            delivery_timeout_seconds: default_delivery_timeout(),
            user_agent: default_user_agent(),
            lead_token: default_lead_token(),
            source_url: default_source_url(),
            google_sheets_id: String::new(),
            google_project_id: String::new(),
            google_client_email: String::new(),
            google_private_key: String::new(),
            sheet_title: default_sheet_title(),
            rust_log: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_landing_page() -> String {
    "static/lead-form.html".to_string()
}

fn default_trackdrive_api_url() -> String {
    "https://ramonmarquez.trackdrive.com/api/v1/leads".to_string()
}

fn default_delivery_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Leadgate-Webhook/1.0".to_string()
}

fn default_lead_token() -> String {
    "74aae788dcb64a4c8c5328176bb6403a".to_string()
}

fn default_source_url() -> String {
    "https://mva-laura-i3vvi.ondigitalocean.app/".to_string()
}

fn default_sheet_title() -> String {
    "rideshare".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env;
    use std::sync::Mutex;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct TestEnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
        vars: Vec<String>,
        originals: HashMap<String, Option<String>>,
    }

    impl TestEnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            Self { _lock: lock, vars: Vec::new(), originals: HashMap::new() }
        }

        fn set_var(&mut self, key: &str, value: &str) {
            if !self.vars.contains(&key.to_string()) {
                self.originals.insert(key.to_string(), env::var(key).ok());
                self.vars.push(key.to_string());
            }
            env::set_var(key, value);
        }
    }

    impl Drop for TestEnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                match self.originals.get(var) {
                    Some(Some(value)) => env::set_var(var, value),
                    Some(None) => env::remove_var(var),
                    None => {},
                }
            }
        }
    }

    #[test]
    fn defaults_are_valid_and_report_missing_required() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.port, 5000);
        assert_eq!(config.delivery_timeout_seconds, 10);
        assert_eq!(config.sheet_title, "rideshare");
        assert_eq!(config.missing_required(), REQUIRED_VALUES.to_vec());
    }

    #[test]
    fn env_overrides_take_priority() {
        let mut guard = TestEnvGuard::new();
        guard.set_var("PORT", "9090");
        guard.set_var("HOST", "0.0.0.0");
        guard.set_var("TRACKDRIVE_API_KEY", "env-key");
        guard.set_var("DELIVERY_TIMEOUT_SECONDS", "5");

        let config = Config::load().expect("config should load with env overrides");

        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.trackdrive_api_key, "env-key");
        assert_eq!(config.to_trackdrive_config().timeout, Duration::from_secs(5));
    }

    #[test]
    fn required_values_reported_in_fixed_order() {
        let mut config = Config::default();
        config.google_sheets_id = "sheet".to_string();
        config.trackdrive_api_key = "key".to_string();

        let status = config.required_values();

        assert_eq!(status[0], ("GOOGLE_SHEETS_ID", true));
        assert_eq!(status[1], ("GOOGLE_PROJECT_ID", false));
        assert_eq!(status[4], ("TRACKDRIVE_API_KEY", true));
    }

    #[test]
    fn whitespace_only_required_value_counts_as_missing() {
        let mut config = Config::default();
        config.google_private_key = "   ".to_string();

        assert!(config.missing_required().contains(&"GOOGLE_PRIVATE_KEY"));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut config = Config::default();
        config.port = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.delivery_timeout_seconds = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.trackdrive_api_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn socket_address_parsing() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 9000;

        let addr = config.parse_server_addr().expect("should parse socket address");

        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 9000);
    }
}
