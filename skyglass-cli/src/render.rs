//! Plain-text rendering of weather records.

use skyglass_core::{Config, Icon, ProviderId, WeatherRecord};

const UNAVAILABLE: &str = "--";

fn glyph(label: &str) -> &'static str {
    match Icon::classify(label) {
        Icon::Rain => "🌧",
        Icon::Storm => "⛈",
        Icon::Snow => "❄",
        Icon::PartlyCloudy => "⛅",
        Icon::Sun => "☀",
        Icon::Moon => "☾",
        Icon::Cloud => "☁",
    }
}

fn degrees(value: f64) -> String {
    format!("{value:.0}°")
}

fn maybe_degrees(value: Option<f64>) -> String {
    value.map(degrees).unwrap_or_else(|| UNAVAILABLE.to_string())
}

pub fn weather(record: &WeatherRecord) -> String {
    let mut lines = Vec::new();

    if record.is_fallback() {
        let details = record.error_details.as_deref().unwrap_or("unknown error");
        lines.push("! Live data unavailable, showing placeholder values.".to_string());
        lines.push(format!("! {details}"));
        lines.push(String::new());
    }

    lines.push(record.city.clone());

    let mut current = format!(
        "{} {}  {}",
        glyph(&record.condition),
        record.condition,
        degrees(record.temperature)
    );
    if let Some(feels_like) = record.feels_like {
        current.push_str(&format!(" (feels like {})", degrees(feels_like)));
    }
    lines.push(current);
    lines.push(format!("H: {}  L: {}", maybe_degrees(record.high), maybe_degrees(record.low)));

    if !record.hourly.is_empty() {
        lines.push("\nHourly".to_string());
        lines.extend(record.hourly.iter().map(|hour| {
            let marker = if hour.is_now { "now" } else { "" };
            format!("  {:<5} {:<3} {} {:>4}", hour.time, marker, glyph(&hour.icon), degrees(hour.temp))
        }));
    }

    if !record.weekly.is_empty() {
        lines.push("\nThis week".to_string());
        lines.extend(record.weekly.iter().map(|day| {
            format!(
                "  {:<10} {} {:>4} / {:>4}",
                day.day,
                glyph(&day.icon),
                degrees(day.high),
                degrees(day.low)
            )
        }));
    }

    if let Some(sources) = record.sources.as_deref().filter(|s| !s.is_empty()) {
        lines.push("\nSources".to_string());
        lines.extend(sources.iter().map(|source| {
            if source.title.is_empty() {
                format!("  - {}", source.uri)
            } else {
                format!("  - {} <{}>", source.title, source.uri)
            }
        }));
    }

    lines.into_iter().map(|line| line + "\n").collect()
}

pub fn provider_list(config: &Config) -> String {
    let default = config.default_provider.as_deref();

    ProviderId::all()
        .iter()
        .map(|id| {
            let status = if config.is_provider_configured(*id) { "configured" } else { "not configured" };
            let marker = if default == Some(id.as_str()) { " (default)" } else { "" };
            format!("{:<11} {status}{marker}\n", id.as_str())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyglass_core::{DailyForecast, HourlyForecast, Source};

    fn genuine() -> WeatherRecord {
        WeatherRecord {
            city: "Ankara".into(),
            temperature: 12.4,
            condition: "Partly cloudy".into(),
            high: Some(15.0),
            low: Some(4.0),
            feels_like: Some(11.0),
            hourly: vec![HourlyForecast {
                time: "13:00".into(),
                temp: 13.0,
                icon: "rain".into(),
                is_now: true,
            }],
            weekly: vec![DailyForecast {
                day: "Friday".into(),
                high: 15.0,
                low: 4.0,
                icon: "sun".into(),
            }],
            sources: Some(vec![Source { title: "MGM".into(), uri: "https://mgm.gov.tr".into() }]),
            is_mock: false,
            error_details: None,
        }
    }

    #[test]
    fn genuine_record_renders_all_sections() {
        let text = weather(&genuine());

        assert!(text.starts_with("Ankara\n"));
        assert!(text.contains("⛅ Partly cloudy  12°"));
        assert!(text.contains("(feels like 11°)"));
        assert!(text.contains("H: 15°  L: 4°"));
        assert!(text.contains("13:00 now 🌧"));
        assert!(text.contains("Friday"));
        assert!(text.contains("MGM <https://mgm.gov.tr>"));
        assert!(!text.contains("placeholder"));
    }

    #[test]
    fn missing_bounds_render_as_dashes() {
        let mut record = genuine();
        record.high = None;
        record.low = None;
        record.feels_like = None;

        let text = weather(&record);
        assert!(text.contains("H: --  L: --"));
        assert!(!text.contains("feels like"));
    }

    #[test]
    fn fallback_record_shows_warning_banner() {
        let record = WeatherRecord::fallback("istanbul", "Malformed response: No JSON object found");
        let text = weather(&record);

        assert!(text.starts_with("! Live data unavailable"));
        assert!(text.contains("No JSON object found"));
        assert!(text.contains("Istanbul"));
        assert!(!text.contains("Hourly"));
        assert!(!text.contains("Sources"));
    }

    #[test]
    fn sections_are_separated_by_blank_lines() {
        let text = weather(&genuine());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[..3], ["Ankara", "⛅ Partly cloudy  12° (feels like 11°)", "H: 15°  L: 4°"]);
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Hourly");
        assert!(text.ends_with("MGM <https://mgm.gov.tr>\n"));
    }

    #[test]
    fn provider_list_marks_default_and_configured() {
        let mut config = Config::default();
        config.upsert_provider_api_key(ProviderId::WeatherApi, "KEY".into());

        let text = provider_list(&config);
        assert!(text.contains("gemini      not configured\n"));
        assert!(text.contains("weatherapi  configured (default)\n"));
    }
}
