use anyhow::{Context, Result};
use serde_derive::Deserialize;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::modem::ModemModel;

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl AppConfig {
    pub fn log_level(&self) -> tracing::Level {
        tracing::Level::from_str(self.log_level.as_str()).unwrap_or(tracing::Level::INFO)
    }
}

pub(crate) fn load_app_config() -> Result<AppConfig> {
    envy::from_env::<AppConfig>()
        .map_err(ConfigError::env_parse)
        .context("Failed to load AppConfig")
}

fn default_interval_sec() -> u64 {
    30
}

fn default_task_timeout_seconds() -> u64 {
    60
}

#[derive(Deserialize, Debug)]
pub struct CollectorConfig {
    #[serde(default = "default_interval_sec")]
    pub interval_sec: u64,
    // upper bound for one collect-and-write cycle
    #[serde(default = "default_task_timeout_seconds")]
    pub task_timeout_seconds: u64,
}

impl CollectorConfig {
    fn validate(self) -> Result<Self, ConfigError> {
        if self.interval_sec == 0 {
            return Err(ConfigError::invalid("interval_sec", "must be greater than zero"));
        }
        if self.task_timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "task_timeout_seconds",
                "must be greater than zero",
            ));
        }
        Ok(self)
    }
}

pub fn load_collector_config() -> Result<CollectorConfig> {
    envy::prefixed("COLLECTOR_")
        .from_env::<CollectorConfig>()
        .map_err(ConfigError::env_parse)
        .and_then(CollectorConfig::validate)
        .context("Failed to load CollectorConfig")
}

fn default_model() -> String {
    "CM600".to_string()
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModemConfig {
    /// Host or host:port of the management interface
    pub address: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub event_log_path: Option<String>,
}

impl ModemConfig {
    pub fn model(&self) -> ModemModel {
        ModemModel::from_name(&self.model)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.address.trim_end_matches('/'))
    }
}

pub(crate) fn load_modem_config() -> Result<ModemConfig> {
    envy::prefixed("MODEM_")
        .from_env::<ModemConfig>()
        .map_err(ConfigError::env_parse)
        .context("Failed to load ModemConfig")
}

#[derive(Deserialize, Debug)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

pub fn load_influx_config() -> Result<InfluxConfig> {
    envy::prefixed("INFLUXDB_")
        .from_env::<InfluxConfig>()
        .map_err(ConfigError::env_parse)
        .context("Failed to load InfluxConfig")
}
