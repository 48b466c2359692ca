// Configuration loading - defaults, optional config file, then environment
use crate::domain::window::RangeSelector;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config/host-metrics";
const ENV_PREFIX: &str = "HOST_METRICS";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub monitoring: MonitoringSettings,
    pub server: ServerSettings,
    pub display: DisplaySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitoringSettings {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub devices_path: String,
    pub metrics_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    pub default_range: RangeSelector,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub file: String,
}

fn with_defaults(builder: ConfigBuilder<DefaultState>) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("monitoring.timeout_secs", 30)?
        .set_default("monitoring.devices_path", "/api/v1/devices")?
        .set_default("monitoring.metrics_path", "/api/v1/zabbix/metrics/${hostid}")?
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("display.default_range", RangeSelector::default().code())?
        .set_default("logging.file", "host-metrics.log")
}

/// Defaults, then the optional config file, then `HOST_METRICS__SECTION__KEY` variables.
pub fn load_app_config(path: &str) -> anyhow::Result<AppConfig> {
    let settings = with_defaults(config::Config::builder())?
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
