use crate::{
    config::Config,
    error::Result,
    model::{ForecastEntry, Units, WeatherRecord},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of weather data. Values come back already in the requested units.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, location: &str, units: Units) -> Result<WeatherRecord>;

    /// Daily entries in chronological order.
    async fn forecast(&self, location: &str, units: Units) -> Result<Vec<ForecastEntry>>;
}

/// Construct the provider for a loaded configuration.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>> {
    Ok(Box::new(OpenWeatherProvider::new(config.clone())?))
}
