use serde::Deserialize;
use std::time::Duration;

use crate::application::refresh_coordinator::RefreshIntervals;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_widgets_secs")]
    pub widgets_secs: u64,
    #[serde(default = "default_charts_secs")]
    pub charts_secs: u64,
    #[serde(default = "default_live_match_secs")]
    pub live_match_secs: u64,
    #[serde(default = "default_chart_period_days")]
    pub chart_period_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_widgets_secs() -> u64 {
    300
}

fn default_charts_secs() -> u64 {
    600
}

fn default_live_match_secs() -> u64 {
    30
}

fn default_chart_period_days() -> u32 {
    30
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            widgets_secs: default_widgets_secs(),
            charts_secs: default_charts_secs(),
            live_match_secs: default_live_match_secs(),
            chart_period_days: default_chart_period_days(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl From<&RefreshSettings> for RefreshIntervals {
    fn from(settings: &RefreshSettings) -> Self {
        // Zero intervals would spin the timer loops
        Self {
            widgets: Duration::from_secs(settings.widgets_secs.max(1)),
            charts: Duration::from_secs(settings.charts_secs.max(1)),
            live_match: Duration::from_secs(settings.live_match_secs.max(1)),
            chart_period_days: settings.chart_period_days.max(1),
        }
    }
}

/// Load `config/dashboard.{toml,yaml,json}` if present, then apply
/// `DASHBOARD_*` environment overrides (`DASHBOARD_API__BASE_URL`, ...).
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
