// Port traits for the external collaborators the dashboard depends on
use crate::domain::readings::{ExternalSeriesPoint, SensorSeriesPoint};
use crate::domain::sensor::Sensor;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Failure of a call to a readings backend.
///
/// `Clone` so that one in-flight result can be handed to every caller
/// attached to it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The session is missing or was rejected; the caller must re-authenticate.
    #[error("not authenticated")]
    Auth,
    #[error("transport error: {0}")]
    Transport(String),
}

impl FetchError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        FetchError::Transport(err.to_string())
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, FetchError::Auth)
    }
}

pub type SensorReadings = HashMap<String, Vec<SensorSeriesPoint>>;

#[async_trait]
pub trait SensorReadingsSource: Send + Sync {
    /// Daily averages for each identifier over the trailing `lookback_days`.
    /// Identifiers without data may be missing from the result.
    async fn fetch_sensor_readings(
        &self,
        identifiers: &[String],
        lookback_days: u32,
    ) -> Result<SensorReadings, FetchError>;
}

#[async_trait]
pub trait ExternalSeriesSource: Send + Sync {
    async fn fetch_external_series(
        &self,
        latitude: f64,
        longitude: f64,
        lookback_days: u32,
    ) -> Result<Vec<ExternalSeriesPoint>, FetchError>;

    /// Forecast value for a single day, `None` if the provider has none.
    async fn fetch_forecast_day(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> Result<Option<f64>, FetchError>;
}

#[async_trait]
pub trait SensorCatalog: Send + Sync {
    /// All sensors known to the backend for the current user.
    async fn list_sensors(&self) -> Result<Vec<Sensor>, FetchError>;
}

/// Predicted values keyed by sensor identifier.
pub type SensorPredictions = HashMap<String, f64>;

#[async_trait]
pub trait PredictionSource: Send + Sync {
    /// Tomorrow's predicted indoor humidity for every sensor the model knows.
    async fn fetch_predictions(&self) -> Result<SensorPredictions, FetchError>;
}

#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, username: &str, password: &str) -> Result<String, FetchError>;
}
