//! Core library for the `weather-dashboard` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather forecast client
//! - Flattening of raw forecast entries into an ordered table
//! - Rendering of the four-panel dashboard image
//!
//! It is used by `dashboard-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod dashboard;
pub mod model;
pub mod provider;
pub mod render;

pub use config::{Config, Units};
pub use dashboard::{RunOutcome, run_dashboard};
pub use model::{ForecastRecord, ForecastResponse, ForecastTable};
pub use provider::openweather::OpenWeatherProvider;
pub use provider::{FetchError, ForecastProvider, ForecastQuery};
