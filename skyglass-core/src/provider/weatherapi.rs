use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::{
    error::{WeatherError, truncate_body},
    model::WeatherRequest,
    provider::{ProviderId, RawWeather},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";
/// Today plus the following days; the first day feeds `high`/`low` and `hourly`.
const FORECAST_DAYS: &str = "5";

/// Direct REST provider for WeatherAPI.com-style endpoints.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http: Client::new() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast.json", self.base_url)
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    #[instrument(skip(self, request), fields(location = %request.location))]
    async fn get_weather(&self, request: &WeatherRequest) -> Result<RawWeather, WeatherError> {
        let url = self.forecast_url();
        debug!(url = %url, "Fetching current weather and forecast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", request.location.as_str()),
                ("days", FORECAST_DAYS),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            warn!(status = %status, "WeatherAPI request failed");
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            WeatherError::MalformedResponse(format!("WeatherAPI returned non-JSON body: {e}"))
        })?;

        debug!(bytes = body.len(), "WeatherAPI response received");

        Ok(RawWeather::Structured(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let provider = WeatherApiProvider::new("KEY".into()).with_base_url("http://localhost:9000/");
        assert_eq!(provider.forecast_url(), "http://localhost:9000/forecast.json");
    }

    #[test]
    fn default_endpoint_is_forecast_json() {
        let provider = WeatherApiProvider::new("KEY".into());
        assert_eq!(provider.forecast_url(), "http://api.weatherapi.com/v1/forecast.json");
        assert_eq!(provider.id(), ProviderId::WeatherApi);
    }
}
