// In-memory collaborators for service tests
use crate::application::ports::{
    AuthClient, ExternalSeriesSource, FetchError, PredictionSource, SensorCatalog,
    SensorPredictions, SensorReadings, SensorReadingsSource,
};
use crate::domain::readings::{ExternalSeriesPoint, SensorSeriesPoint};
use crate::domain::sensor::Sensor;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::Semaphore;

pub fn day(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
}

pub fn point(date: &str, value: f64) -> SensorSeriesPoint {
    SensorSeriesPoint::new(day(date), value, 1)
}

pub fn humidity(date: &str, value: f64) -> ExternalSeriesPoint {
    ExternalSeriesPoint::new(day(date), value)
}

/// Readings keyed by `(identifier, lookback_days)`. A gated source blocks
/// every call until `release` hands out a permit.
#[derive(Default)]
pub struct FakeReadingsSource {
    data: Mutex<HashMap<(String, u32), Vec<SensorSeriesPoint>>>,
    calls: Mutex<Vec<(Vec<String>, u32)>>,
    failure: Mutex<Option<FetchError>>,
    gate: Option<Semaphore>,
}

impl FakeReadingsSource {
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn insert(&self, id: &str, days: u32, points: Vec<SensorSeriesPoint>) {
        self.data
            .lock()
            .unwrap()
            .insert((id.to_string(), days), points);
    }

    pub fn fail_with(&self, err: FetchError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub fn calls(&self) -> Vec<(Vec<String>, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SensorReadingsSource for FakeReadingsSource {
    async fn fetch_sensor_readings(
        &self,
        identifiers: &[String],
        lookback_days: u32,
    ) -> Result<SensorReadings, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((identifiers.to_vec(), lookback_days));

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }

        let data = self.data.lock().unwrap();
        Ok(identifiers
            .iter()
            .filter_map(|id| {
                data.get(&(id.clone(), lookback_days))
                    .map(|points| (id.clone(), points.clone()))
            })
            .collect())
    }
}

/// Humidity keyed by `lookback_days`, plus single-day forecasts. Gated the
/// same way as `FakeReadingsSource`.
#[derive(Default)]
pub struct FakeHumiditySource {
    data: Mutex<HashMap<u32, Vec<ExternalSeriesPoint>>>,
    forecasts: Mutex<HashMap<NaiveDate, f64>>,
    failure: Mutex<Option<FetchError>>,
    calls: Mutex<Vec<u32>>,
    gate: Option<Semaphore>,
}

impl FakeHumiditySource {
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn insert(&self, days: u32, points: Vec<ExternalSeriesPoint>) {
        self.data.lock().unwrap().insert(days, points);
    }

    pub fn insert_forecast(&self, date: NaiveDate, value: f64) {
        self.forecasts.lock().unwrap().insert(date, value);
    }

    pub fn fail_with(&self, err: FetchError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExternalSeriesSource for FakeHumiditySource {
    async fn fetch_external_series(
        &self,
        _latitude: f64,
        _longitude: f64,
        lookback_days: u32,
    ) -> Result<Vec<ExternalSeriesPoint>, FetchError> {
        self.calls.lock().unwrap().push(lookback_days);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self
            .data
            .lock()
            .unwrap()
            .get(&lookback_days)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_forecast_day(
        &self,
        _latitude: f64,
        _longitude: f64,
        date: NaiveDate,
    ) -> Result<Option<f64>, FetchError> {
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.forecasts.lock().unwrap().get(&date).copied())
    }
}

#[derive(Default)]
pub struct FakePredictionSource {
    predictions: Mutex<SensorPredictions>,
    failure: Mutex<Option<FetchError>>,
}

impl FakePredictionSource {
    pub fn insert(&self, id: &str, value: f64) {
        self.predictions.lock().unwrap().insert(id.to_string(), value);
    }

    pub fn fail_with(&self, err: FetchError) {
        *self.failure.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl PredictionSource for FakePredictionSource {
    async fn fetch_predictions(&self) -> Result<SensorPredictions, FetchError> {
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.predictions.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub sensors: Mutex<Vec<Sensor>>,
}

impl FakeCatalog {
    pub fn with(sensors: Vec<Sensor>) -> Self {
        Self {
            sensors: Mutex::new(sensors),
        }
    }
}

#[async_trait]
impl SensorCatalog for FakeCatalog {
    async fn list_sensors(&self) -> Result<Vec<Sensor>, FetchError> {
        Ok(self.sensors.lock().unwrap().clone())
    }
}

/// Accepts exactly one username/password pair.
pub struct FakeAuth {
    pub username: String,
    pub password: String,
    pub token: String,
}

#[async_trait]
impl AuthClient for FakeAuth {
    async fn login(&self, username: &str, password: &str) -> Result<String, FetchError> {
        if username == self.username && password == self.password {
            Ok(self.token.clone())
        } else {
            Err(FetchError::Auth)
        }
    }
}
