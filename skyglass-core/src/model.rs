use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};

pub const FALLBACK_TEMPERATURE: f64 = 20.0;
pub const FALLBACK_HIGH: f64 = 25.0;
pub const FALLBACK_LOW: f64 = 15.0;
pub const FALLBACK_FEELS_LIKE: f64 = 21.0;
pub const FALLBACK_CONDITION: &str = "Data Unavailable (Fallback)";

#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub location: String,
    /// Caller's local time; the generative prompt embeds it.
    pub requested_at: DateTime<FixedOffset>,
}

impl WeatherRequest {
    pub fn new(location: impl Into<String>, requested_at: DateTime<FixedOffset>) -> Self {
        Self { location: location.into(), requested_at }
    }

    pub fn now(location: impl Into<String>) -> Self {
        Self::new(location, Local::now().fixed_offset())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyForecast {
    pub time: String,
    pub temp: f64,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub is_now: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub day: String,
    pub high: f64,
    pub low: f64,
    #[serde(default)]
    pub icon: String,
}

/// A citation collected from grounding metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// Canonical weather record handed to renderers.
///
/// Either genuine (`is_mock == false`, no `error_details`) or a fallback built by
/// [`WeatherRecord::fallback`]. Both have the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub city: String,
    #[serde(rename = "temp")]
    pub temperature: f64,
    pub condition: String,
    pub high: Option<f64>,
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub hourly: Vec<HourlyForecast>,
    #[serde(default)]
    pub weekly: Vec<DailyForecast>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    #[serde(default)]
    pub is_mock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl WeatherRecord {
    /// Placeholder record used when real data could not be obtained or parsed.
    pub fn fallback(location: &str, cause: impl std::fmt::Display) -> Self {
        Self {
            city: capitalize_first(location.trim()),
            temperature: FALLBACK_TEMPERATURE,
            condition: FALLBACK_CONDITION.to_string(),
            high: Some(FALLBACK_HIGH),
            low: Some(FALLBACK_LOW),
            feels_like: Some(FALLBACK_FEELS_LIKE),
            hourly: Vec::new(),
            weekly: Vec::new(),
            sources: None,
            is_mock: true,
            error_details: Some(cause.to_string()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.is_mock
    }
}

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Icon family for a free-text icon or condition label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Rain,
    Storm,
    Snow,
    PartlyCloudy,
    Sun,
    Moon,
    Cloud,
}

impl Icon {
    pub fn classify(label: &str) -> Self {
        let name = label.to_lowercase();

        if name.contains("rain") {
            Icon::Rain
        } else if name.contains("storm") || name.contains("thunder") {
            Icon::Storm
        } else if name.contains("snow") {
            Icon::Snow
        } else if name.contains("partly") {
            Icon::PartlyCloudy
        } else if name.contains("sun") || name.contains("clear") {
            Icon::Sun
        } else if name.contains("moon") {
            Icon::Moon
        } else {
            Icon::Cloud
        }
    }

    /// Label from the vocabulary the generative prompt asks for.
    pub fn as_str(&self) -> &'static str {
        match self {
            Icon::Rain => "rain",
            Icon::Storm => "storm",
            Icon::Snow => "snow",
            Icon::PartlyCloudy => "partly-cloudy",
            Icon::Sun => "sun",
            Icon::Moon => "moon",
            Icon::Cloud => "cloudy",
        }
    }
}
