//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration handling (default location, user agent)
//! - The api.weather.gov data source and the place-name geocoder
//! - Shared domain models (locations, forecast periods, observations, alerts)
//! - Plain-text rendering of daily, hourly, current and alert reports
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries.

pub mod config;
pub mod error;
pub mod geocode;
mod http;
pub mod model;
pub mod report;
pub mod source;
pub mod units;

pub use config::Config;
pub use error::ForecastError;
pub use geocode::{Geocoder, NominatimGeocoder};
pub use model::{Alert, ForecastPeriod, Location, Observation, ReportKind};
pub use report::Reporter;
pub use source::{NwsClient, WeatherSource};
