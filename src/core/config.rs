//! Application configuration loaded from environment variables.
use envconfig::Envconfig;
use humantime::Duration;
use reqwest::Url;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Envconfig)]
pub struct Config {
    #[allow(dead_code)]
    #[envconfig(from = "APP_LOG", default = "error")]
    pub app_log: String,
    #[allow(dead_code)]
    #[envconfig(from = "APP_LOG_STYLE", default = "always")]
    pub app_log_style: String,
    #[envconfig(
        from = "TALENTMONITOR_URL",
        default = "https://www.talent-monitoring.com/prod-api"
    )]
    pub talentmonitor_url: Url,
    /// Falls back to `PYTALENT_USERNAME` when unset.
    #[envconfig(from = "TALENTMONITOR_USERNAME")]
    pub talentmonitor_username: Option<String>,
    /// Falls back to `PYTALENT_PASSWORD` when unset.
    #[envconfig(from = "TALENTMONITOR_PASSWORD")]
    pub talentmonitor_password: Option<String>,
    #[envconfig(from = "TALENTMONITOR_TIMEZONE", default = "+02:00")]
    pub talentmonitor_timezone: String,
    #[envconfig(from = "HOMEASSISTANT_URL")]
    pub homeassistant_url: Url,
    #[envconfig(from = "HOMEASSISTANT_TOKEN")]
    pub homeassistant_token: String,
    #[envconfig(from = "SCAN_INTERVAL", default = "30s")]
    pub scan_interval: Duration,
}

pub fn configure_logger() {
    let env = env_logger::Env::default()
        .filter_or("APP_LOG", "info")
        .write_style_or("APP_LOG_STYLE", "always");
    env_logger::init_from_env(env);
}
