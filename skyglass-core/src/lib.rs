//! Core library for the `skyglass` weather tool.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Two provider strategies (WeatherAPI.com REST, Gemini with live search)
//! - The normalizer that turns provider output into a canonical [`WeatherRecord`]
//! - [`WeatherService`], whose `fetch` always returns a record (real or fallback)
//!
//! It is used by `skyglass-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod prompt;
pub mod provider;
pub mod service;

pub use config::{Config, ProviderConfig};
pub use error::{ErrorKind, WeatherError};
pub use model::{DailyForecast, HourlyForecast, Icon, Source, WeatherRecord, WeatherRequest};
pub use provider::{ProviderId, RawWeather, WeatherProvider};
pub use service::WeatherService;
