use crate::{
    Config, WeatherError, WeatherRequest,
    model::Source,
    provider::{gemini::GeminiProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod gemini;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Gemini,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "gemini",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Gemini, ProviderId::WeatherApi]
    }

    /// Environment variable consulted when the config file has no key.
    pub fn credential_env_var(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "GEMINI_API_KEY",
            ProviderId::WeatherApi => "WEATHERAPI_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        match lower.as_str() {
            "gemini" => Ok(ProviderId::Gemini),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(WeatherError::Configuration(format!(
                "Unknown provider '{value}'. Supported providers: gemini, weatherapi."
            ))),
        }
    }
}

/// What a provider hands to the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum RawWeather {
    /// JSON body from a REST weather API, untouched.
    Structured(serde_json::Value),
    /// Generated text expected to embed a JSON object, plus any citations.
    Text { text: String, sources: Vec<Source> },
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Issue exactly one upstream request.
    async fn get_weather(&self, request: &WeatherRequest) -> Result<RawWeather, WeatherError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    let api_key = config.provider_api_key(id).ok_or_else(|| {
        WeatherError::Configuration(format!(
            "No API key configured for provider '{id}'.\n\
             Hint: run `skyglass configure {id}` or set {}.",
            id.credential_env_var()
        ))
    })?;

    let settings = config.provider_config(id).cloned().unwrap_or_default();

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::Gemini => {
            let mut provider = GeminiProvider::new(api_key.to_owned());
            if let Some(base_url) = settings.base_url {
                provider = provider.with_base_url(base_url);
            }
            if let Some(model) = settings.model {
                provider = provider.with_model(model);
            }
            if let Some(language) = settings.language {
                provider = provider.with_language(language);
            }
            Box::new(provider)
        }
        ProviderId::WeatherApi => {
            let mut provider = WeatherApiProvider::new(api_key.to_owned());
            if let Some(base_url) = settings.base_url {
                provider = provider.with_base_url(base_url);
            }
            Box::new(provider)
        }
    };

    Ok(boxed)
}

/// Construct the default provider from config.
///
/// Without an explicit `default_provider`, the first provider that has a credential
/// is used, so an environment key alone is enough to get going.
pub fn default_provider_from_config(
    config: &Config,
) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    let id = match config.default_provider_id() {
        Ok(id) => id,
        Err(err) => match ProviderId::all()
            .iter()
            .copied()
            .find(|id| config.is_provider_configured(*id))
        {
            Some(id) if config.default_provider.is_none() => id,
            _ => return Err(err),
        },
    };

    provider_from_config(id, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_parse_is_case_insensitive() {
        assert_eq!(ProviderId::try_from("Gemini").unwrap(), ProviderId::Gemini);
        assert_eq!(ProviderId::try_from(" WEATHERAPI ").unwrap(), ProviderId::WeatherApi);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::Gemini, &cfg).unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("No API key configured for provider"));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn default_provider_from_config_errors_when_not_set() {
        let cfg = Config::default();
        let err = default_provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No default provider configured"));
        assert!(msg.contains("Hint: run `skyglass configure"));
    }

    #[test]
    fn default_provider_from_config_works_when_set_and_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "KEY".to_string());

        let provider = default_provider_from_config(&cfg).expect("provider");
        assert_eq!(provider.id(), ProviderId::WeatherApi);
    }

    #[test]
    fn default_provider_falls_back_to_first_credentialed_provider() {
        let cfg = Config::default().with_credentials_from(|name| {
            (name == "WEATHERAPI_API_KEY").then(|| "KEY".to_string())
        });

        let provider = default_provider_from_config(&cfg).expect("provider");
        assert_eq!(provider.id(), ProviderId::WeatherApi);
    }

    #[test]
    fn explicit_default_without_key_is_not_replaced() {
        let mut cfg = Config::default().with_credentials_from(|name| {
            (name == "WEATHERAPI_API_KEY").then(|| "KEY".to_string())
        });
        cfg.set_default_provider(ProviderId::Gemini);

        let err = default_provider_from_config(&cfg).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("'gemini'"));
    }
}
