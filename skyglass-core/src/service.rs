use tracing::{info, instrument, warn};

use crate::{
    Config, WeatherError, WeatherRecord, WeatherRequest, normalizer,
    provider::{
        ProviderId, WeatherProvider, default_provider_from_config, provider_from_config,
    },
};

/// Consumer-facing entry point: one provider, one request per call.
#[derive(Debug)]
pub struct WeatherService {
    provider: Box<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Build from the configured default provider. Missing credentials fail here.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        default_provider_from_config(config).map(Self::new)
    }

    pub fn for_provider(id: ProviderId, config: &Config) -> Result<Self, WeatherError> {
        provider_from_config(id, config).map(Self::new)
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    /// Fetch and normalize, surfacing every failure.
    #[instrument(skip(self), fields(provider = %self.provider.id()))]
    pub async fn try_fetch(&self, location: &str) -> Result<WeatherRecord, WeatherError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(WeatherError::InvalidLocation);
        }

        let request = WeatherRequest::now(location);
        let raw = self.provider.get_weather(&request).await?;
        let record = normalizer::normalize(location, raw)?;

        info!(city = %record.city, "Weather fetched");
        Ok(record)
    }

    /// Always returns a record; failures become the fallback record.
    pub async fn fetch(&self, location: &str) -> WeatherRecord {
        match self.try_fetch(location).await {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "Substituting fallback weather");
                WeatherRecord::fallback(location, err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, model::Source, provider::RawWeather};
    use async_trait::async_trait;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug)]
    enum Canned {
        Structured(serde_json::Value),
        Text(&'static str, Vec<Source>),
        Upstream(u16),
        Transport,
    }

    #[derive(Debug)]
    struct StubProvider {
        canned: Canned,
        calls: Arc<AtomicUsize>,
    }

    impl StubProvider {
        fn boxed(canned: Canned) -> (Box<dyn WeatherProvider>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (Box::new(Self { canned, calls: calls.clone() }), calls)
        }
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        fn id(&self) -> ProviderId {
            ProviderId::Gemini
        }

        async fn get_weather(&self, _request: &WeatherRequest) -> Result<RawWeather, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.canned {
                Canned::Structured(v) => Ok(RawWeather::Structured(v.clone())),
                Canned::Text(t, s) => Ok(RawWeather::Text { text: t.to_string(), sources: s.clone() }),
                Canned::Upstream(status) => {
                    Err(WeatherError::Upstream { status: *status, body: "quota".into() })
                }
                Canned::Transport => Err(WeatherError::Transport("connection refused".into())),
            }
        }
    }

    #[tokio::test]
    async fn structured_result_passes_through() {
        let body = serde_json::json!({"city":"Istanbul","temp":20,"condition":"Clear","high":25,"low":15});
        let (provider, _) = StubProvider::boxed(Canned::Structured(body));
        let service = WeatherService::new(provider);

        let record = service.fetch("Istanbul").await;

        assert_eq!(record.city, "Istanbul");
        assert_eq!(record.temperature, 20.0);
        assert!(!record.is_mock);
    }

    #[tokio::test]
    async fn non_json_text_becomes_fallback() {
        let (provider, _) =
            StubProvider::boxed(Canned::Text("I cannot access search right now.", Vec::new()));
        let service = WeatherService::new(provider);

        let record = service.fetch("istanbul").await;

        assert_eq!(record.city, "Istanbul");
        assert!(record.is_mock);
        let details = record.error_details.expect("details");
        assert!(details.contains("No JSON object found"));
    }

    #[tokio::test]
    async fn try_fetch_surfaces_the_cause() {
        let (provider, _) = StubProvider::boxed(Canned::Upstream(429));
        let service = WeatherService::new(provider);

        let err = service.try_fetch("Ankara").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn every_failure_kind_yields_a_complete_fallback() {
        for canned in [Canned::Upstream(500), Canned::Transport, Canned::Text("", Vec::new())] {
            let (provider, _) = StubProvider::boxed(canned);
            let record = WeatherService::new(provider).fetch("bursa").await;

            assert!(record.is_mock);
            assert_eq!(record.city, "Bursa");
            assert!(record.high.is_some() && record.low.is_some() && record.feels_like.is_some());
            assert!(!record.error_details.unwrap_or_default().is_empty());
        }
    }

    #[tokio::test]
    async fn blank_location_never_reaches_the_provider() {
        let (provider, calls) = StubProvider::boxed(Canned::Transport);
        let service = WeatherService::new(provider);

        let err = service.try_fetch("   ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let record = service.fetch("").await;
        assert!(record.is_mock);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn one_upstream_call_per_fetch() {
        let (provider, calls) = StubProvider::boxed(Canned::Upstream(503));
        let service = WeatherService::new(provider);

        let _ = service.fetch("Konya").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sources_survive_the_pipeline() {
        let sources = vec![Source { title: "MGM".into(), uri: "https://mgm.gov.tr".into() }];
        let (provider, _) = StubProvider::boxed(Canned::Text(
            r#"```json
{"city":"Ankara","temp":3,"condition":"Karlı"}
```"#,
            sources.clone(),
        ));

        let record = WeatherService::new(provider).fetch("ankara").await;
        assert_eq!(record.sources, Some(sources));
    }

    #[test]
    fn missing_credential_fails_before_any_fetch() {
        let err = WeatherService::for_provider(ProviderId::Gemini, &Config::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = WeatherService::from_config(&Config::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
