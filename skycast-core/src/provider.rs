use crate::{config::Config, model::WeatherSnapshot, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;

pub mod openweather;

/// Failure modes of a single weather lookup.
///
/// Everything that can go wrong between issuing a request and holding a
/// decoded snapshot lands here; the search pipeline converts these into the
/// `LoadFailed` UI state instead of propagating them.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced an HTTP response.
    #[error("failed to reach the weather service")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("weather service returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The service answered successfully but with nothing in the body.
    #[error("weather service returned an empty body")]
    EmptyBody,

    /// The body did not match the expected payload schema.
    #[error("failed to decode weather payload")]
    Decode(#[from] serde_json::Error),
}

/// Port for the remote weather lookup: resolve a city name or a coordinate
/// pair into a current-weather snapshot. Both calls are single-shot.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_by_city(&self, city: &str) -> Result<WeatherSnapshot, FetchError>;

    async fn fetch_by_coords(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, FetchError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;
    Ok(Arc::new(OpenWeatherProvider::new(api_key.to_owned())))
}
