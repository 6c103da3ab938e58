//! Forward geocoding: turn a place name into coordinates.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{Config, ForecastError, http::get_json, model::Location};

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Best match for `query`, or [`ForecastError::LocationNotFound`].
    async fn locate(&self, query: &str) -> Result<Location, ForecastError>;
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    user_agent: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            http: Client::new(),
        }
    }
}

/// Nominatim reports coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[allow(dead_code)]
    display_name: Option<String>,
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn locate(&self, query: &str) -> Result<Location, ForecastError> {
        if let Some(location) = Location::parse_coordinates(query) {
            return Ok(location);
        }

        let url = format!("{}/search", self.base_url);
        let places: Vec<NominatimPlace> = get_json(
            &self.http,
            &self.user_agent,
            &url,
            &[("q", query), ("format", "json"), ("limit", "1")],
        )
        .await?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| ForecastError::LocationNotFound(query.to_string()))?;

        let latitude = place.lat.parse::<f64>().map_err(|_| ForecastError::MissingField("lat"))?;
        let longitude = place.lon.parse::<f64>().map_err(|_| ForecastError::MissingField("lon"))?;

        tracing::debug!(query, latitude, longitude, "geocoded location");
        Ok(Location::new(latitude, longitude))
    }
}

/// Construct the geocoder described by `config`.
pub fn geocoder_from_config(config: &Config) -> Box<dyn Geocoder> {
    Box::new(NominatimGeocoder::new(config.geocoder_url(), &config.user_agent))
}
