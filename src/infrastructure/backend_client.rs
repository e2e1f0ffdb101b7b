// Sensor backend client - Averages, sensor listing and login over HTTP
use crate::application::ports::{
    AuthClient, FetchError, SensorCatalog, SensorReadings, SensorReadingsSource,
};
use crate::application::session::Session;
use crate::domain::readings::SensorSeriesPoint;
use crate::domain::sensor::Sensor;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
    session: Arc<Session>,
}

/// `GET /` response body. `total_count` is not used and is left unparsed.
#[derive(Debug, Deserialize)]
struct CountResponse {
    entries_by_identifier: Vec<Sensor>,
}

/// `GET /averages` response body: one key per identifier plus `labels`.
#[derive(Debug, Deserialize)]
struct AverageResponse {
    #[serde(default)]
    #[allow(dead_code)]
    labels: HashMap<String, String>,
    #[serde(flatten)]
    identifiers: HashMap<String, Vec<SensorSeriesPoint>>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

impl BackendClient {
    pub fn new(base_url: String, session: Arc<Session>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            session,
        }
    }

    fn averages_url(&self, identifiers: &[String], lookback_days: u32) -> String {
        let ids: Vec<String> = identifiers
            .iter()
            .map(|id| urlencoding::encode(id).into_owned())
            .collect();
        format!(
            "{}/averages?unique_identifiers={}&days={}",
            self.base_url,
            ids.join(","),
            lookback_days
        )
    }

    /// Attach the bearer token, or fail without touching the network when
    /// there is no session.
    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, FetchError> {
        let token = self.session.token().ok_or(FetchError::Auth)?;
        Ok(request.bearer_auth(token))
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, FetchError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(FetchError::transport)?;
        let response = check_status(response).await?;
        response.json::<T>().await.map_err(FetchError::transport)
    }
}

async fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(FetchError::Auth);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Transport(format!("HTTP {}: {}", status, body)));
    }
    Ok(response)
}

#[async_trait]
impl SensorReadingsSource for BackendClient {
    async fn fetch_sensor_readings(
        &self,
        identifiers: &[String],
        lookback_days: u32,
    ) -> Result<SensorReadings, FetchError> {
        let url = self.averages_url(identifiers, lookback_days);
        let request = self.authorized(self.http.get(&url))?;
        let response: AverageResponse = self.execute(request).await?;
        Ok(response.identifiers)
    }
}

#[async_trait]
impl SensorCatalog for BackendClient {
    async fn list_sensors(&self) -> Result<Vec<Sensor>, FetchError> {
        let request = self.authorized(self.http.get(format!("{}/", self.base_url)))?;
        let response: CountResponse = self.execute(request).await?;
        Ok(response.entries_by_identifier)
    }
}

#[async_trait]
impl AuthClient for BackendClient {
    async fn login(&self, username: &str, password: &str) -> Result<String, FetchError> {
        let request = self
            .http
            .post(format!("{}/login", self.base_url))
            .json(&LoginRequest { username, password });
        let response: LoginResponse = self.execute(request).await?;
        Ok(response.token)
    }
}
