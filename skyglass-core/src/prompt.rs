//! Prompt text for the generative search provider.

use chrono::{DateTime, FixedOffset};

pub const DEFAULT_LANGUAGE: &str = "English";

/// Instruction that pins the model to live search and JSON-only output.
pub fn system_instruction() -> &'static str {
    "You are a strictly factual Weather API.\n\
     Your ONLY job is to retrieve real-time weather data using the Google Search tool \
     and format it as JSON.\n\
     \n\
     CRITICAL RULES:\n\
     1. USE THE GOOGLE SEARCH TOOL. Do not use your internal training data (it is old).\n\
     2. FIND THE CURRENT LIVE TEMPERATURE. Do not return a daily average or a forecast as the current temp.\n\
     3. DO NOT GUESS. If search fails, say so instead of inventing numbers.\n\
     4. OUTPUT ONLY VALID JSON. No markdown formatting outside the block, no chat text."
}

/// Request time as embedded in the prompt.
pub fn format_request_time(at: &DateTime<FixedOffset>) -> String {
    at.format("%Y-%m-%d %H:%M:%S %:z").to_string()
}

/// User turn: location, request time and the exact schema to fill in.
pub fn user_prompt(location: &str, requested_at: &DateTime<FixedOffset>, language: &str) -> String {
    let now = format_request_time(requested_at);

    format!(
        r#"Context:
- User Location Query: "{location}"
- Current Request Time: {now}

Task:
1. Search for "current weather in {location} celsius".
2. Extract the current temperature, condition, high/low for today, and the forecast.
3. Format the response strictly according to this JSON Schema:
{{
  "city": "String (the specific city name found, in {language})",
  "temp": Number (the CURRENT live temperature in Celsius),
  "condition": "String (short condition label in {language})",
  "high": Number (today's high in Celsius),
  "low": Number (today's low in Celsius),
  "feelsLike": Number (in Celsius),
  "hourly": [
    {{ "time": "HH:MM", "temp": Number, "icon": "String (cloudy, rain, sun, partly-cloudy, storm, snow, moon)", "isNow": Boolean }}
  ],
  "weekly": [
    {{ "day": "String (day name in {language})", "high": Number, "low": Number, "icon": "String" }}
  ]
}}

Notes:
- For 'hourly': ensure times are in the future relative to {now}.
- For 'weekly': forecast for the next 5 days."#
    )
}
