// Dashboard service - Selection, lookback and chart assembly
use crate::application::ports::{ExternalSeriesSource, FetchError, PredictionSource};
use crate::application::readings_cache::ReadingsCache;
use crate::application::sensor_service::LabelResolver;
use crate::application::series_aligner::{align, LabeledSeries};
use crate::application::session::Session;
use crate::domain::chart::ChartView;
use crate::domain::prediction::{Predictions, SensorPrediction};
use crate::domain::readings::{ExternalSeriesPoint, LookbackWindow};
use crate::domain::sensor::Sensor;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// External series together with the window it was fetched at.
#[derive(Debug, Clone)]
struct ExternalSeries {
    window: LookbackWindow,
    points: Vec<ExternalSeriesPoint>,
}

/// A sensor as shown in the selection grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorStatus {
    pub unique_identifier: String,
    pub label: String,
    pub count: i64,
    pub reporting_today: bool,
    pub selected: bool,
    pub loading: bool,
    /// Last fetch failure for a selected sensor. The chart shows it as empty.
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct DashboardService {
    cache: Arc<ReadingsCache>,
    humidity_source: Arc<dyn ExternalSeriesSource>,
    prediction_source: Arc<dyn PredictionSource>,
    location: Location,
    external: Arc<RwLock<Option<ExternalSeries>>>,
    labels: Arc<LabelResolver>,
    session: Arc<Session>,
}

impl DashboardService {
    pub fn new(
        cache: Arc<ReadingsCache>,
        humidity_source: Arc<dyn ExternalSeriesSource>,
        prediction_source: Arc<dyn PredictionSource>,
        location: Location,
        labels: Arc<LabelResolver>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            cache,
            humidity_source,
            prediction_source,
            location,
            external: Arc::new(RwLock::new(None)),
            labels,
            session,
        }
    }

    pub fn window(&self) -> LookbackWindow {
        self.cache.window()
    }

    pub async fn select(&self, id: &str) -> Result<(), FetchError> {
        let result = self.cache.select(id).await;
        self.check_auth(result)
    }

    pub fn deselect(&self, id: &str) {
        self.cache.deselect(id);
    }

    /// Re-fetch every selected sensor and the humidity series at `window`.
    pub async fn change_window(&self, window: LookbackWindow) -> Result<(), FetchError> {
        let (sensors, _) = tokio::join!(self.cache.change_window(window), self.refresh_humidity());
        self.check_auth(sensors)
    }

    /// Fetch the humidity series for the current window. Failures only
    /// affect the humidity line.
    pub async fn refresh_humidity(&self) {
        let window = self.cache.window();
        let result = self
            .humidity_source
            .fetch_external_series(self.location.latitude, self.location.longitude, window.days())
            .await;

        let points = match result {
            Ok(points) => points,
            Err(e) => {
                tracing::warn!("Error fetching outdoor humidity: {}", e);
                return;
            }
        };

        // Window check and store under one guard.
        let mut external = self.external.write().unwrap_or_else(PoisonError::into_inner);
        if window == self.cache.window() {
            tracing::debug!("Outdoor humidity: {} days", points.len());
            *external = Some(ExternalSeries { window, points });
        } else {
            tracing::debug!("Discarding humidity fetched for a previous window");
        }
    }

    /// Current chart, rebuilt from a consistent snapshot of the cache.
    pub fn chart(&self) -> ChartView {
        let snapshot = self.cache.snapshot();

        let resolved: Vec<(String, &[_])> = snapshot
            .selected
            .iter()
            .filter_map(|id| {
                snapshot
                    .entries
                    .get(id)
                    .map(|points| (self.labels.resolve(id), points.as_slice()))
            })
            .collect();
        let series: Vec<LabeledSeries<'_>> = resolved
            .iter()
            .map(|(label, points)| LabeledSeries::new(label, points))
            .collect();

        let external = self
            .external
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|e| e.window == snapshot.window)
            .map(|e| e.points.clone());

        let chart = align(&series, external.as_deref());
        ChartView::from_chart(snapshot.any_selected(), chart)
    }

    /// Tomorrow's predictions for the selected sensors, with the outdoor
    /// humidity forecast. A failed forecast only drops the outdoor value.
    pub async fn predictions(&self, today: NaiveDate) -> Result<Predictions, FetchError> {
        let (predicted, outdoor) = tokio::join!(
            self.prediction_source.fetch_predictions(),
            self.tomorrow_humidity(today)
        );
        let predicted = predicted.map_err(|e| {
            tracing::warn!("Error fetching predictions: {}", e);
            e
        })?;

        let sensors = self
            .cache
            .snapshot()
            .selected
            .into_iter()
            .filter_map(|id| {
                let value = *predicted.get(&id)?;
                Some(SensorPrediction {
                    label: self.labels.resolve(&id),
                    unique_identifier: id,
                    value,
                })
            })
            .collect();

        Ok(Predictions {
            sensors,
            tomorrow_outdoor_humidity: outdoor,
        })
    }

    async fn tomorrow_humidity(&self, today: NaiveDate) -> Option<f64> {
        let tomorrow = today.succ_opt()?;
        match self
            .humidity_source
            .fetch_forecast_day(self.location.latitude, self.location.longitude, tomorrow)
            .await
        {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Error fetching outdoor humidity forecast: {}", e);
                None
            }
        }
    }

    pub fn sensor_statuses(&self, sensors: &[Sensor], today: NaiveDate) -> Vec<SensorStatus> {
        sensors
            .iter()
            .map(|s| {
                let id = s.unique_identifier.as_str();
                SensorStatus {
                    unique_identifier: id.to_string(),
                    label: s.display_name().to_string(),
                    count: s.count,
                    reporting_today: s.is_reporting_today(today),
                    selected: self.cache.is_selected(id),
                    loading: self.cache.is_pending(id),
                    error: self.cache.failure(id).map(|e| e.to_string()),
                }
            })
            .collect()
    }

    fn check_auth(&self, result: Result<(), FetchError>) -> Result<(), FetchError> {
        if let Err(FetchError::Auth) = &result {
            tracing::warn!("Backend rejected the session, signing out");
            self.session.clear();
        }
        result
    }
}
