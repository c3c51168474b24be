//! Core library for the weather lookup API.
//!
//! This crate defines:
//! - Configuration & credential loading from the environment
//! - Abstraction over the upstream weather provider
//! - Shared domain models and the request error taxonomy
//! - The lookup transformer that turns a city name into a localized summary
//!
//! It is used by `weather-api`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod provider;

pub use config::Config;
pub use error::{InvalidCity, LookupError};
pub use lookup::WeatherService;
pub use model::{CityQuery, UpstreamWeatherRecord, WeatherDetails, WeatherResult};
pub use provider::{WeatherProvider, provider_from_config};
