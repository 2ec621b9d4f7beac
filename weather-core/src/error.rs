use thiserror::Error;

/// Everything that can stop a weather lookup. None of these are retried.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Missing or rejected credentials, bad environment.
    #[error("{0}")]
    Configuration(String),

    /// Transport failure, timeout, or an unexpected HTTP status.
    #[error("{0}")]
    Network(String),

    #[error("City '{location}' not found")]
    NotFound { location: String },

    /// The API answered, but not in the shape we expect.
    #[error("Malformed response from weather API: {0}")]
    Format(String),
}

impl WeatherError {
    /// A required field is absent or has the wrong type. `path` is the dotted JSON path.
    pub(crate) fn missing_field(path: impl AsRef<str>) -> Self {
        WeatherError::Format(format!("missing or invalid field '{}'", path.as_ref()))
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
