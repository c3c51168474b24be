use crate::{CityQuery, Config, LookupError, UpstreamWeatherRecord, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of raw current-weather records.
///
/// Implementations perform exactly one upstream call per invocation and map
/// every transport or status failure into a [`LookupError`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &CityQuery) -> Result<UpstreamWeatherRecord, LookupError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let provider = OpenWeatherProvider::from_config(config)?;
    Ok(Box::new(provider))
}
