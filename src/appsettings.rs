use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_API_BASE_URL: &str = "https://graph.facebook.com";
const DEFAULT_API_VERSION: &str = "v19.0";
const MAX_SCAN_INTERVAL_SECS: u64 = 60;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WhatsAppSettings {
    #[serde(default)]
    pub verify_token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub phone_number_id: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SchedulerSettings {
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub whatsapp: WhatsAppSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

impl AppSettings {
    /// Layers `appsettings`, `appsettings.local`, `APP_*` variables and the
    /// bare `VERIFY_TOKEN`/`WHATSAPP_TOKEN`/`PHONE_NUMBER_ID`/`PORT` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bare = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let settings = Config::builder()
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("whatsapp.verify_token", bare("VERIFY_TOKEN"))?
            .set_override_option("whatsapp.access_token", bare("WHATSAPP_TOKEN"))?
            .set_override_option("whatsapp.phone_number_id", bare("PHONE_NUMBER_ID"))?
            .set_override_option("server.port", bare("PORT"))?
            .build()?;

        settings.try_deserialize()
    }
}

impl SchedulerSettings {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.clamp(1, MAX_SCAN_INTERVAL_SECS))
    }
}

impl WhatsAppSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for WhatsAppSettings {
    fn default() -> Self {
        Self {
            verify_token: None,
            access_token: None,
            phone_number_id: None,
            api_base_url: default_api_base_url(),
            api_version: default_api_version(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_scan_interval_secs() -> u64 {
    30
}
