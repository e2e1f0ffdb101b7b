// Open-Meteo client - Daily mean outdoor relative humidity
use crate::application::ports::{ExternalSeriesSource, FetchError};
use crate::domain::readings::{ExternalSeriesPoint, LookbackWindow};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailySeries,
}

#[derive(Debug, Deserialize)]
struct DailySeries {
    time: Vec<NaiveDate>,
    relative_humidity_2m_mean: Vec<Option<f64>>,
}

impl DailySeries {
    /// Days without a value are dropped rather than zero-filled.
    fn into_points(self) -> Vec<ExternalSeriesPoint> {
        self.time
            .into_iter()
            .zip(self.relative_humidity_2m_mean)
            .filter_map(|(date, value)| value.map(|v| ExternalSeriesPoint::new(date, v)))
            .collect()
    }
}

impl OpenMeteoClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn forecast_url(&self, latitude: f64, longitude: f64, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/v1/forecast?latitude={}&longitude={}&start_date={}&end_date={}&daily=relative_humidity_2m_mean&timezone=auto",
            self.base_url,
            latitude,
            longitude,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        )
    }

    async fn fetch_daily(&self, url: &str) -> Result<Vec<ExternalSeriesPoint>, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(FetchError::transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Transport(format!("HTTP {}: {}", status, body)));
        }

        let forecast = response
            .json::<ForecastResponse>()
            .await
            .map_err(FetchError::transport)?;
        Ok(forecast.daily.into_points())
    }
}

#[async_trait]
impl ExternalSeriesSource for OpenMeteoClient {
    async fn fetch_external_series(
        &self,
        latitude: f64,
        longitude: f64,
        lookback_days: u32,
    ) -> Result<Vec<ExternalSeriesPoint>, FetchError> {
        let (start, end) = LookbackWindow::new(lookback_days)
            .and_then(|window| window.date_range(Utc::now().date_naive()))
            .ok_or_else(|| {
                FetchError::Transport(format!("lookback of {} days is out of range", lookback_days))
            })?;
        let url = self.forecast_url(latitude, longitude, start, end);
        self.fetch_daily(&url).await
    }

    async fn fetch_forecast_day(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> Result<Option<f64>, FetchError> {
        let url = self.forecast_url(latitude, longitude, date, date);
        let points = self.fetch_daily(&url).await?;
        Ok(points.into_iter().find(|p| p.date == date).map(|p| p.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_url() {
        let client = OpenMeteoClient::new("https://api.open-meteo.com/".to_string());
        let url = client.forecast_url(
            57.7,
            11.97,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
        );
        assert_eq!(
            url,
            "https://api.open-meteo.com/v1/forecast?latitude=57.7&longitude=11.97&start_date=2024-01-01&end_date=2024-01-08&daily=relative_humidity_2m_mean&timezone=auto"
        );
    }

    #[tokio::test]
    async fn test_oversized_lookback_fails_without_request() {
        // Unroutable base URL: reaching the network would surface a different error.
        let client = OpenMeteoClient::new("http://127.0.0.1:9".to_string());
        let result = client.fetch_external_series(57.7, 11.97, 100_000_000).await;
        assert_eq!(
            result,
            Err(FetchError::Transport(
                "lookback of 100000000 days is out of range".to_string()
            ))
        );
    }

    #[test]
    fn test_null_days_are_skipped() {
        let body = r#"{
            "latitude": 57.7,
            "daily_units": {"time": "iso8601", "relative_humidity_2m_mean": "%"},
            "daily": {
                "time": ["2024-01-01", "2024-01-02", "2024-01-03"],
                "relative_humidity_2m_mean": [81.0, null, 77.5]
            }
        }"#;
        let forecast: ForecastResponse = serde_json::from_str(body).unwrap();
        let points = forecast.daily.into_points();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 81.0);
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }
}
