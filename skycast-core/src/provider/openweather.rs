use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::model::WeatherSnapshot;

use super::{FetchError, WeatherProvider};

const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// OpenWeather current-weather client.
///
/// Temperatures come back in Kelvin: the endpoint is queried without a
/// units parameter, and conversion is left to the presentation layer.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
        }
    }

    async fn fetch(&self, params: &[(&str, String)]) -> Result<WeatherSnapshot, FetchError> {
        let res = self
            .http
            .get(WEATHER_URL)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }

        let snapshot: WeatherSnapshot = serde_json::from_str(&body)?;
        debug!(location = %snapshot.name, cod = snapshot.cod, "weather lookup succeeded");

        Ok(snapshot)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_by_city(&self, city: &str) -> Result<WeatherSnapshot, FetchError> {
        debug!(%city, "requesting weather by city");
        self.fetch(&[("q", city.to_owned())]).await
    }

    async fn fetch_by_coords(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, FetchError> {
        debug!(lat, lon, "requesting weather by coordinates");
        self.fetch(&[("lat", lat.to_string()), ("lon", lon.to_string())])
            .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
