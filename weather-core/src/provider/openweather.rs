use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    config::Config,
    error::{Result, WeatherError},
    model::{ForecastEntry, Units, WeatherRecord},
};

use super::WeatherProvider;

/// Days kept after grouping the 3-hour forecast points.
pub const FORECAST_DAYS: usize = 5;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    config: Config,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(config: Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WeatherError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    /// GET `{base_url}/{endpoint}` and return the body of a successful response.
    #[instrument(skip(self), fields(base_url = %self.config.base_url))]
    async fn fetch(&self, endpoint: &str, location: &str, units: Units) -> Result<String> {
        let url = format!("{}/{endpoint}", self.config.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", location),
                ("appid", self.config.api_key.as_str()),
                ("units", units.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WeatherError::Network(format!("OpenWeather {endpoint} request timed out"))
                } else {
                    WeatherError::Network(format!(
                        "Failed to send request to OpenWeather ({endpoint}): {}",
                        e.without_url()
                    ))
                }
            })?;

        let status = res.status();
        debug!(%status, "received response");

        let body = res.text().await.map_err(|e| {
            WeatherError::Network(format!(
                "Failed to read OpenWeather {endpoint} response body: {}",
                e.without_url()
            ))
        })?;

        match status {
            s if s.is_success() => Ok(body),
            StatusCode::NOT_FOUND => Err(WeatherError::NotFound { location: location.to_string() }),
            StatusCode::UNAUTHORIZED => {
                Err(WeatherError::Configuration("Invalid API key".to_string()))
            }
            s => Err(WeatherError::Network(format!(
                "OpenWeather {endpoint} request failed with status {s}: {}",
                truncate_body(&body),
            ))),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, location: &str, units: Units) -> Result<WeatherRecord> {
        let body = self.fetch("weather", location, units).await?;
        parse_current(&body)
    }

    async fn forecast(&self, location: &str, units: Units) -> Result<Vec<ForecastEntry>> {
        let body = self.fetch("forecast", location, units).await?;
        let points = parse_forecast_points(&body)?;

        let days = daily_entries(&points, FORECAST_DAYS);
        debug!(points = points.len(), days = days.len(), "aggregated forecast");

        Ok(days)
    }
}

// Every field is optional on the wire so that a missing one can be reported by name.

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    dt: Option<i64>,
    sys: Option<OwSys>,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
}

#[derive(Debug, Deserialize)]
struct OwForecastItem {
    dt: Option<i64>,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    list: Vec<OwForecastItem>,
}

/// A single 3-hour forecast point in local time.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub at: NaiveDateTime,
    pub temp: f64,
    pub description: String,
}

fn required<T>(value: Option<T>, path: &str) -> Result<T> {
    value.ok_or_else(|| WeatherError::missing_field(path))
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| WeatherError::Format(e.to_string()))
}

fn first_description(weather: Vec<OwWeather>, path: &str) -> Result<String> {
    let description = weather.into_iter().next().and_then(|w| w.description);
    required(description, &format!("{path}weather[0].description"))
}

/// Validate a `/weather` response body into a [`WeatherRecord`].
pub fn parse_current(body: &str) -> Result<WeatherRecord> {
    let parsed: OwCurrentResponse = decode(body)?;

    let main = required(parsed.main, "main")?;
    let humidity_pct = required(main.humidity, "main.humidity")?;
    if humidity_pct > 100 {
        return Err(WeatherError::missing_field("main.humidity"));
    }

    Ok(WeatherRecord {
        location: required(parsed.name, "name")?,
        country: required(parsed.sys.and_then(|s| s.country), "sys.country")?,
        temperature: required(main.temp, "main.temp")?,
        feels_like: required(main.feels_like, "main.feels_like")?,
        description: first_description(parsed.weather, "")?,
        humidity_pct,
        wind_speed: required(parsed.wind.and_then(|w| w.speed), "wind.speed")?,
        observed_at: local_time(required(parsed.dt, "dt")?, "dt")?,
    })
}

/// Validate a `/forecast` response body into its list of points.
pub fn parse_forecast_points(body: &str) -> Result<Vec<ForecastPoint>> {
    let parsed: OwForecastResponse = decode(body)?;
    if parsed.list.is_empty() {
        return Err(WeatherError::missing_field("list"));
    }

    parsed
        .list
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let prefix = format!("list[{i}].");
            let dt = required(item.dt, &format!("{prefix}dt"))?;
            let temp = item.main.and_then(|m| m.temp);

            Ok(ForecastPoint {
                at: local_time(dt, &format!("{prefix}dt"))?,
                temp: required(temp, &format!("{prefix}main.temp"))?,
                description: first_description(item.weather, &prefix)?,
            })
        })
        .collect()
}

/// Group forecast points by local calendar day, in order of first appearance,
/// and keep at most `max_days` days.
///
/// Each day gets the min and max temperature of its points and the most frequent
/// description; ties go to the description seen first that day.
pub fn daily_entries(points: &[ForecastPoint], max_days: usize) -> Vec<ForecastEntry> {
    let mut days: Vec<(NaiveDate, Vec<&ForecastPoint>)> = Vec::new();

    for point in points {
        let date = point.at.date();
        match days.iter_mut().find(|(d, _)| *d == date) {
            Some((_, bucket)) => bucket.push(point),
            None => days.push((date, vec![point])),
        }
    }

    days.into_iter()
        .take(max_days)
        .map(|(date, bucket)| ForecastEntry {
            date,
            temp_min: bucket.iter().map(|p| p.temp).fold(f64::INFINITY, f64::min),
            temp_max: bucket.iter().map(|p| p.temp).fold(f64::NEG_INFINITY, f64::max),
            description: most_common_description(&bucket),
        })
        .collect()
}

fn most_common_description(bucket: &[&ForecastPoint]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for point in bucket {
        match counts.iter_mut().find(|(d, _)| *d == point.description) {
            Some((_, n)) => *n += 1,
            None => counts.push((point.description.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (description, n) in counts {
        if best.is_none_or(|(_, top)| n > top) {
            best = Some((description, n));
        }
    }

    best.map(|(d, _)| d.to_string()).unwrap_or_default()
}

fn local_time(ts: i64, path: &str) -> Result<NaiveDateTime> {
    DateTime::from_timestamp(ts, 0)
        .map(|utc| utc.with_timezone(&Local).naive_local())
        .ok_or_else(|| WeatherError::missing_field(path))
}

/// First 200 characters of a body, flattened onto one line.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    let flat: String =
        body.chars().take(MAX).map(|c| if c == '\n' || c == '\r' { ' ' } else { c }).collect();

    if body.chars().count() > MAX { format!("{flat}...") } else { flat }
}
