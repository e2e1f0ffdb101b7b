use crate::domain::readings::LookbackWindow;
use anyhow::Context;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub api: ApiSettings,
    pub humidity: HumiditySettings,
    pub predictions: PredictionSettings,
    pub lookback: LookbackSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub listen_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    /// Token to start the session with; normally obtained via `POST /session`.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HumiditySettings {
    pub base_url: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PredictionSettings {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LookbackSettings {
    pub default_days: u32,
}

impl DashboardConfig {
    pub fn lookback_window(&self) -> anyhow::Result<LookbackWindow> {
        LookbackWindow::new(self.lookback.default_days)
            .with_context(|| {
                format!(
                    "lookback.default_days must be between 1 and {}",
                    LookbackWindow::MAX_DAYS
                )
            })
    }
}

/// `config/dashboard.{toml,yaml,json}` overridden by `DASHBOARD__SECTION__KEY`
/// environment variables.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__"),
        );
    build(builder)
}

fn build(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<DashboardConfig> {
    let settings = builder
        .set_default("server.listen_addr", "0.0.0.0:8080")?
        .set_default("humidity.base_url", "https://api.open-meteo.com")?
        .set_default("predictions.base_url", "http://localhost:5000")?
        .set_default("lookback.default_days", i64::from(LookbackWindow::DEFAULT_DAYS))?
        .build()?;

    settings
        .try_deserialize()
        .context("invalid dashboard configuration")
}
