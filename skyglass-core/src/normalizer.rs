//! Turns provider output into a [`WeatherRecord`].
//!
//! Generated text is cleaned with a deliberately small heuristic: fence markers are
//! dropped and the span between the first `{` and the last `}` is parsed. Nothing
//! outside this module depends on how that extraction works.

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::WeatherError,
    model::{DailyForecast, HourlyForecast, Icon, WeatherRecord, capitalize_first},
    provider::RawWeather,
};

const UNKNOWN_CONDITION: &str = "Unknown";

/// Map one provider result to a genuine record. Pure: equal inputs give equal records.
pub fn normalize(location: &str, raw: RawWeather) -> Result<WeatherRecord, WeatherError> {
    match raw {
        RawWeather::Structured(value) => from_structured(location, value),
        RawWeather::Text { text, sources } => {
            let mut record = from_text(location, &text)?;
            if !sources.is_empty() {
                record.sources = Some(sources);
            }
            Ok(record)
        }
    }
}

/// Remove ```` ``` ```` and ```` ```json ```` markers wherever they appear, then trim.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Slice from the first `{` to the last `}` inclusive.
pub fn extract_json_object(text: &str) -> Result<&str, WeatherError> {
    if text.trim().is_empty() {
        return Err(WeatherError::MalformedResponse("Empty response text".to_string()));
    }

    let start = text.find('{').ok_or_else(|| {
        WeatherError::MalformedResponse("No JSON object found in response text".to_string())
    })?;
    let end = text.rfind('}').filter(|end| *end > start).ok_or_else(|| {
        WeatherError::MalformedResponse("Unterminated JSON object in response text".to_string())
    })?;

    Ok(&text[start..=end])
}

fn from_text(location: &str, text: &str) -> Result<WeatherRecord, WeatherError> {
    let cleaned = strip_code_fences(text);
    let candidate = extract_json_object(&cleaned)?;

    let value: Value = serde_json::from_str(candidate).map_err(|e| {
        WeatherError::MalformedResponse(format!("Failed to parse JSON payload: {e}"))
    })?;

    from_flat(location, value)
}

fn from_structured(location: &str, value: Value) -> Result<WeatherRecord, WeatherError> {
    if !value.is_object() {
        return Err(WeatherError::MalformedResponse(
            "Expected a JSON object from the weather API".to_string(),
        ));
    }

    if value.get("current").is_some() {
        from_weatherapi(location, value)
    } else {
        from_flat(location, value)
    }
}

/// The schema the generative backend is asked for; also accepted from REST bodies.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatPayload {
    city: Option<String>,
    #[serde(alias = "temperature")]
    temp: f64,
    condition: Option<String>,
    high: Option<f64>,
    low: Option<f64>,
    feels_like: Option<f64>,
    #[serde(default)]
    hourly: Value,
    #[serde(default)]
    weekly: Value,
}

fn from_flat(location: &str, value: Value) -> Result<WeatherRecord, WeatherError> {
    let payload: FlatPayload = serde_json::from_value(value).map_err(|e| {
        WeatherError::MalformedResponse(format!("Payload does not match weather schema: {e}"))
    })?;

    Ok(WeatherRecord {
        city: non_blank(payload.city).unwrap_or_else(|| capitalize_first(location.trim())),
        temperature: payload.temp,
        condition: non_blank(payload.condition).unwrap_or_else(|| UNKNOWN_CONDITION.to_string()),
        high: payload.high,
        low: payload.low,
        feels_like: payload.feels_like,
        hourly: lenient_list(payload.hourly, "hourly"),
        weekly: lenient_list(payload.weekly, "weekly"),
        sources: None,
        is_mock: false,
        error_details: None,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Anything that is not an array becomes empty; entries that don't fit are dropped.
fn lenient_list<T: DeserializeOwned>(value: Value, field: &str) -> Vec<T> {
    let Value::Array(items) = value else {
        if !value.is_null() {
            debug!(field, "Ignoring non-array forecast field");
        }
        return Vec::new();
    };

    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if parsed.len() != total {
        debug!(field, dropped = total - parsed.len(), "Dropped malformed forecast entries");
    }

    parsed
}

#[derive(Debug, Deserialize)]
struct WaPayload {
    location: WaLocation,
    current: WaCurrent,
    forecast: Option<WaForecast>,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: Option<String>,
    /// "2024-01-15 13:45"
    localtime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: Option<f64>,
    condition: Option<WaCondition>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    #[serde(default)]
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    day: WaDay,
    #[serde(default)]
    hour: Vec<WaHour>,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    condition: Option<WaCondition>,
}

#[derive(Debug, Deserialize)]
struct WaHour {
    /// "2024-01-15 13:00"
    time: String,
    temp_c: f64,
    condition: Option<WaCondition>,
    is_day: Option<u8>,
}

fn from_weatherapi(location: &str, value: Value) -> Result<WeatherRecord, WeatherError> {
    let payload: WaPayload = serde_json::from_value(value).map_err(|e| {
        WeatherError::MalformedResponse(format!("Unexpected WeatherAPI payload: {e}"))
    })?;

    let days = payload.forecast.map(|f| f.forecastday).unwrap_or_default();
    let today = days.first();
    let now_hour = payload
        .location
        .localtime
        .as_deref()
        .and_then(clock_of)
        .map(|t| hour_of(&t).to_string());

    let hourly = today
        .map(|day| {
            day.hour
                .iter()
                .filter_map(|h| {
                    let time = clock_of(&h.time)?;
                    let is_now = now_hour.as_deref() == Some(hour_of(&time));
                    Some(HourlyForecast {
                        temp: h.temp_c,
                        icon: hour_icon(h).as_str().to_string(),
                        is_now,
                        time,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let weekly = days
        .iter()
        .map(|d| DailyForecast {
            day: weekday_name(&d.date),
            high: d.day.maxtemp_c,
            low: d.day.mintemp_c,
            icon: condition_icon(d.day.condition.as_ref()).as_str().to_string(),
        })
        .collect();

    Ok(WeatherRecord {
        city: non_blank(payload.location.name).unwrap_or_else(|| capitalize_first(location.trim())),
        temperature: payload.current.temp_c,
        condition: non_blank(payload.current.condition.map(|c| c.text))
            .unwrap_or_else(|| UNKNOWN_CONDITION.to_string()),
        high: today.map(|d| d.day.maxtemp_c),
        low: today.map(|d| d.day.mintemp_c),
        feels_like: payload.current.feelslike_c,
        hourly,
        weekly,
        sources: None,
        is_mock: false,
        error_details: None,
    })
}

/// "2024-01-15 13:00" -> "13:00"
fn clock_of(stamp: &str) -> Option<String> {
    let time = stamp.split_whitespace().nth(1)?;
    let well_formed =
        time.len() >= 5 && time.is_char_boundary(5) && time.as_bytes()[2] == b':';
    well_formed.then(|| time[..5].to_string())
}

fn hour_of(clock: &str) -> &str {
    &clock[..2]
}

fn weekday_name(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%A").to_string())
        .unwrap_or_else(|_| date.to_string())
}

fn condition_icon(condition: Option<&WaCondition>) -> Icon {
    condition.map(|c| Icon::classify(&c.text)).unwrap_or(Icon::Cloud)
}

fn hour_icon(hour: &WaHour) -> Icon {
    match condition_icon(hour.condition.as_ref()) {
        Icon::Sun if hour.is_day == Some(0) => Icon::Moon,
        icon => icon,
    }
}
