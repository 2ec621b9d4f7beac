//! Plain-text rendering of weather records.
//!
//! Both renderers are pure: they trust that the numbers are already in the
//! requested unit system and only pick labels from [`Units`].

use crate::model::{ForecastEntry, Units, WeatherRecord};

const DIVIDER: char = '─';
const WEATHER_WIDTH: usize = 40;
const FORECAST_WIDTH: usize = 50;

/// `%a %b %d` is always ten characters wide.
const DAY_WIDTH: usize = 10;
/// Width of a forecast temperature, sign and decimal included.
const TEMP_WIDTH: usize = 6;

/// Render current conditions as an eight-line block.
pub fn format_weather(weather: &WeatherRecord, units: Units) -> String {
    let temp_unit = temperature_unit(units);
    let divider = divider(WEATHER_WIDTH);

    let lines = [
        format!("Weather for {}, {}", weather.location, weather.country),
        divider.clone(),
        format!(
            "Temperature:  {:.1}{temp_unit} (feels like {:.1}{temp_unit})",
            weather.temperature, weather.feels_like
        ),
        format!("Conditions:   {}", capitalize(&weather.description)),
        format!("Humidity:     {}%", weather.humidity_pct),
        format!("Wind:         {:.1} {}", weather.wind_speed, units.speed_suffix()),
        divider,
        format!("Updated: {}", weather.observed_at.format("%Y-%m-%d %H:%M")),
    ];

    lines.join("\n")
}

/// Render a daily forecast table. Rows keep the order they are given in and
/// no day count is enforced.
pub fn format_forecast(entries: &[ForecastEntry], location: &str, units: Units) -> String {
    let temp_unit = temperature_unit(units);

    let mut lines = Vec::with_capacity(entries.len() + 2);
    lines.push(format!("5-Day Forecast for {location}"));
    lines.push(divider(FORECAST_WIDTH));

    for entry in entries {
        let day = entry.date.format("%a %b %d").to_string();
        lines.push(format!(
            "{day:<dw$}  {min:>tw$.1}{temp_unit} - {max:>tw$.1}{temp_unit}  {desc}",
            dw = DAY_WIDTH,
            tw = TEMP_WIDTH,
            min = entry.temp_min,
            max = entry.temp_max,
            desc = capitalize(&entry.description),
        ));
    }

    lines.join("\n")
}

fn temperature_unit(units: Units) -> String {
    format!("°{}", units.temperature_letter())
}

fn divider(width: usize) -> String {
    DIVIDER.to_string().repeat(width)
}

/// Upper-case the first character, lower-case the rest.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
