use clap::{ArgAction, Parser, ValueEnum};
use tracing::info;
use weather_core::{Config, Units, WeatherProvider, format_forecast, format_weather, provider_from_config};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum UnitsArg {
    Metric,
    Imperial,
}

impl From<UnitsArg> for Units {
    fn from(value: UnitsArg) -> Self {
        match value {
            UnitsArg::Metric => Units::Metric,
            UnitsArg::Imperial => Units::Imperial,
        }
    }
}

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather",
    version,
    about = "Get weather information from the command line",
    after_help = "Requires the OPENWEATHER_API_KEY environment variable."
)]
pub struct Cli {
    /// City name (e.g. London or "New York").
    #[arg(required = true, num_args = 1..)]
    pub location: Vec<String>,

    /// Show 5-day forecast instead of current conditions.
    #[arg(short, long)]
    pub forecast: bool,

    /// Temperature units.
    #[arg(short, long, value_enum, default_value_t = UnitsArg::Metric)]
    pub units: UnitsArg,

    /// Log verbosity on stderr (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Location words joined back into a single query.
    pub fn location(&self) -> String {
        self.location.join(" ")
    }

    /// Read configuration, query OpenWeather and return the text to print.
    pub async fn run(self) -> anyhow::Result<String> {
        let config = Config::from_env()?;
        let provider = provider_from_config(&config)?;

        self.render(provider.as_ref()).await
    }

    pub async fn render(&self, provider: &dyn WeatherProvider) -> anyhow::Result<String> {
        let location = self.location();
        let units = Units::from(self.units);
        info!(%location, %units, forecast = self.forecast, "looking up weather");

        let output = if self.forecast {
            let days = provider.forecast(&location, units).await?;
            format_forecast(&days, &location, units)
        } else {
            let weather = provider.current(&location, units).await?;
            format_weather(&weather, units)
        };

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use weather_core::{ForecastEntry, WeatherError, WeatherRecord};

    /// Returns canned data and remembers nothing.
    #[derive(Debug)]
    struct StubProvider {
        fail: bool,
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn current(&self, location: &str, _units: Units) -> weather_core::Result<WeatherRecord> {
            if self.fail {
                return Err(WeatherError::NotFound { location: location.to_string() });
            }

            Ok(WeatherRecord {
                location: location.to_string(),
                country: "GB".into(),
                temperature: 15.2,
                feels_like: 14.8,
                description: "partly cloudy".into(),
                humidity_pct: 72,
                wind_speed: 3.5,
                observed_at: NaiveDate::from_ymd_opt(2026, 1, 28)
                    .unwrap()
                    .and_hms_opt(14, 30, 0)
                    .unwrap(),
            })
        }

        async fn forecast(
            &self,
            location: &str,
            _units: Units,
        ) -> weather_core::Result<Vec<ForecastEntry>> {
            if self.fail {
                return Err(WeatherError::NotFound { location: location.to_string() });
            }

            Ok((28..=31)
                .map(|day| ForecastEntry {
                    date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
                    temp_min: 10.0,
                    temp_max: 15.0,
                    description: "clear sky".into(),
                })
                .collect())
        }
    }

    #[test]
    fn defaults_to_current_metric() {
        let cli = Cli::parse_from(["weather", "London"]);

        assert_eq!(cli.location(), "London");
        assert!(!cli.forecast);
        assert_eq!(cli.units, UnitsArg::Metric);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_short_flags() {
        let cli = Cli::parse_from(["weather", "-f", "-u", "imperial", "-vv", "London"]);

        assert!(cli.forecast);
        assert_eq!(Units::from(cli.units), Units::Imperial);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn joins_unquoted_location_words() {
        let cli = Cli::parse_from(["weather", "New", "York", "--forecast"]);
        assert_eq!(cli.location(), "New York");

        let quoted = Cli::parse_from(["weather", "New York"]);
        assert_eq!(quoted.location(), "New York");
    }

    #[test]
    fn rejects_unknown_units() {
        assert!(Cli::try_parse_from(["weather", "--units", "kelvin", "London"]).is_err());
    }

    #[test]
    fn requires_location() {
        assert!(Cli::try_parse_from(["weather"]).is_err());
    }

    #[tokio::test]
    async fn renders_current_weather() {
        let cli = Cli::parse_from(["weather", "London"]);
        let output = cli.render(&StubProvider { fail: false }).await.expect("render");

        assert!(output.starts_with("Weather for London, GB\n"));
        assert!(output.contains("Conditions:   Partly cloudy"));
        assert!(output.ends_with("Updated: 2026-01-28 14:30"));
    }

    #[tokio::test]
    async fn renders_forecast_with_typed_location() {
        let cli = Cli::parse_from(["weather", "-f", "-u", "imperial", "london"]);
        let output = cli.render(&StubProvider { fail: false }).await.expect("render");

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "5-Day Forecast for london");
        assert_eq!(lines.len(), 6);
        assert!(lines[2].contains("°F"));
    }

    #[tokio::test]
    async fn provider_errors_surface_as_single_line() {
        let cli = Cli::parse_from(["weather", "Atlantis"]);
        let err = cli.render(&StubProvider { fail: true }).await.unwrap_err();

        assert_eq!(err.to_string(), "City 'Atlantis' not found");
        assert!(err.downcast_ref::<WeatherError>().is_some());
    }
}
