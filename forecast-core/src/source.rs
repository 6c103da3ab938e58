use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config, ForecastError,
    model::{Alert, ForecastPeriod, Location, Observation},
};

pub mod nws;

pub use nws::NwsClient;

/// Remote source of forecasts, observations and alerts.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Gridpoint forecast periods, in source order.
    async fn forecast(&self, location: &Location) -> Result<Vec<ForecastPeriod>, ForecastError>;

    /// Gridpoint hourly forecast periods, in source order.
    async fn hourly_forecast(
        &self,
        location: &Location,
    ) -> Result<Vec<ForecastPeriod>, ForecastError>;

    /// Identifier of the observation station nearest to `location`.
    async fn nearest_station(&self, location: &Location) -> Result<String, ForecastError>;

    async fn current_observation(&self, station: &str) -> Result<Observation, ForecastError>;

    async fn active_alerts(&self, location: &Location) -> Result<Vec<Alert>, ForecastError>;
}

/// Construct the api.weather.gov source described by `config`.
pub fn source_from_config(config: &Config) -> Box<dyn WeatherSource> {
    Box::new(NwsClient::new(config.api_base_url(), &config.user_agent))
}
