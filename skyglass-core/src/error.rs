use thiserror::Error;

/// Errors produced while obtaining or parsing weather data.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Missing credential, unknown provider or no default provider.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The location string was empty or whitespace only.
    #[error("Location must not be empty")]
    InvalidLocation,

    /// Upstream answered with a non-2xx status.
    #[error("Upstream request failed with status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The request never produced an HTTP response (connect, IO, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The upstream answered, but not with a usable weather payload.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Coarse classification callers can branch on without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    InvalidInput,
    Transient,
    MalformedResponse,
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::InvalidLocation => ErrorKind::InvalidInput,
            Self::Upstream { .. } | Self::Transport(_) => ErrorKind::Transient,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WeatherError::MalformedResponse(err.to_string())
        } else {
            WeatherError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::MalformedResponse(err.to_string())
    }
}

/// Cap an upstream body before it ends up in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
