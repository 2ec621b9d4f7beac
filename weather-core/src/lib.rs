//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration read from the environment
//! - The OpenWeather provider (fetch, validation, daily aggregation)
//! - Shared domain models and errors
//! - Text formatting of current weather and forecasts
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod provider;

pub use config::Config;
pub use error::{Result, WeatherError};
pub use format::{format_forecast, format_weather};
pub use model::{ForecastEntry, Units, WeatherRecord};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
