use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode, Text};
use skyglass_core::{Config, ProviderId, WeatherService};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyglass", version, about = "Current weather and forecast for a city")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for a provider.
    Configure {
        /// Provider short name: "gemini" or "weatherapi".
        provider: String,
    },

    /// Show weather for a city.
    Show {
        /// City or location name; prompted for when omitted.
        location: Option<String>,

        /// Use this provider instead of the configured default.
        #[arg(long)]
        provider: Option<String>,

        /// Print the record as JSON.
        #[arg(long)]
        json: bool,

        /// Fail with the upstream error instead of showing placeholder data.
        #[arg(long)]
        strict: bool,
    },

    /// List providers and whether they are configured.
    Providers,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { location, provider, json, strict } => {
                show(location, provider.as_deref(), json, strict).await
            }
            Command::Providers => {
                let config = Config::load()?.with_env_credentials();
                print!("{}", render::provider_list(&config));
                Ok(())
            }
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.upsert_provider_api_key(id, api_key.trim().to_string());

    if config.default_provider.as_deref() != Some(id.as_str()) {
        let make_default = Confirm::new(&format!("Make {id} the default provider?"))
            .with_default(false)
            .prompt()
            .context("Failed to read answer")?;
        if make_default {
            config.set_default_provider(id);
        }
    }

    config.save()?;
    println!("Saved {id} credentials to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(
    location: Option<String>,
    provider: Option<&str>,
    json: bool,
    strict: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?.with_env_credentials();

    let service = match provider {
        Some(name) => WeatherService::for_provider(ProviderId::try_from(name)?, &config)?,
        None => WeatherService::from_config(&config)?,
    };
    tracing::debug!(provider = %service.provider_id(), "Provider selected");

    let location = match location {
        Some(location) => location,
        None => Text::new("City:").prompt().context("Failed to read city name")?,
    };

    let record = if strict {
        service.try_fetch(&location).await?
    } else {
        service.fetch(&location).await
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", render::weather(&record));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_accepts_flags_and_optional_location() {
        let cli = Cli::try_parse_from(["skyglass", "-vv", "show", "Istanbul", "--json", "--strict"])
            .expect("parse");

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Show { location, provider, json, strict } => {
                assert_eq!(location.as_deref(), Some("Istanbul"));
                assert!(provider.is_none());
                assert!(json && strict);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["skyglass", "show", "--provider", "weatherapi"]).expect("parse");
        assert!(matches!(
            cli.command,
            Command::Show { location: None, provider: Some(ref p), .. } if p == "weatherapi"
        ));
    }

    #[test]
    fn configure_requires_provider() {
        assert!(Cli::try_parse_from(["skyglass", "configure"]).is_err());
    }
}
