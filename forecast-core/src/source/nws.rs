use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    ForecastError,
    http::get_json,
    model::{Alert, ForecastPeriod, Location, Observation},
    units::kph_to_mps,
};

use super::WeatherSource;

pub const DEFAULT_API_BASE_URL: &str = "https://api.weather.gov";

/// Client for the US National Weather Service API.
#[derive(Debug, Clone)]
pub struct NwsClient {
    base_url: String,
    user_agent: String,
    http: Client,
}

impl NwsClient {
    pub fn new(base_url: &str, user_agent: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            http: Client::new(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ForecastError> {
        get_json(&self.http, &self.user_agent, url, query).await
    }

    /// Resolve a point to the gridpoint and station-list URLs that serve it.
    async fn points(&self, location: &Location) -> Result<NwsPointProperties, ForecastError> {
        let url = format!("{}/points/{}", self.base_url, location.point());
        let parsed: NwsFeature<NwsPointProperties> = self.get(&url, &[]).await?;
        Ok(parsed.properties)
    }

    async fn periods(&self, url: &str) -> Result<Vec<ForecastPeriod>, ForecastError> {
        let parsed: NwsFeature<NwsForecastProperties> = self.get(url, &[]).await?;
        Ok(parsed.properties.periods.into_iter().map(ForecastPeriod::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct NwsFeature<P> {
    properties: P,
}

#[derive(Debug, Deserialize)]
struct NwsFeatureCollection<P> {
    features: Vec<NwsFeature<P>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NwsPointProperties {
    forecast: Option<String>,
    forecast_hourly: Option<String>,
    observation_stations: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NwsForecastProperties {
    periods: Vec<NwsPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NwsPeriod {
    name: String,
    start_time: DateTime<FixedOffset>,
    end_time: DateTime<FixedOffset>,
    temperature: f64,
    temperature_unit: String,
    wind_speed: String,
    wind_direction: String,
    short_forecast: String,
    detailed_forecast: String,
}

impl From<NwsPeriod> for ForecastPeriod {
    fn from(p: NwsPeriod) -> Self {
        Self {
            name: p.name,
            start_time: p.start_time,
            end_time: p.end_time,
            temperature: p.temperature,
            temperature_unit: p.temperature_unit,
            wind_speed: p.wind_speed,
            wind_direction: p.wind_direction,
            short_forecast: p.short_forecast,
            detailed_forecast: p.detailed_forecast,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NwsStationProperties {
    station_identifier: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NwsValue {
    value: Option<f64>,
    #[serde(default)]
    unit_code: String,
}

impl NwsValue {
    /// Speeds arrive in km/h from the live API and m/s in older payloads.
    fn speed_mps(&self) -> Option<f64> {
        if self.unit_code.ends_with("km_h-1") {
            self.value.map(kph_to_mps)
        } else {
            self.value
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NwsObservationProperties {
    timestamp: DateTime<FixedOffset>,
    #[serde(default)]
    temperature: NwsValue,
    #[serde(default)]
    wind_chill: NwsValue,
    #[serde(default)]
    heat_index: NwsValue,
    #[serde(default)]
    relative_humidity: NwsValue,
    #[serde(default)]
    wind_speed: NwsValue,
    #[serde(default)]
    wind_gust: NwsValue,
    #[serde(default)]
    wind_direction: NwsValue,
    #[serde(default)]
    barometric_pressure: NwsValue,
}

impl From<NwsObservationProperties> for Observation {
    fn from(p: NwsObservationProperties) -> Self {
        Self {
            timestamp: p.timestamp,
            temperature_c: p.temperature.value,
            wind_chill_c: p.wind_chill.value,
            heat_index_c: p.heat_index.value,
            relative_humidity_pct: p.relative_humidity.value,
            wind_speed_mps: p.wind_speed.speed_mps(),
            wind_gust_mps: p.wind_gust.speed_mps(),
            wind_direction_deg: p.wind_direction.value,
            barometric_pressure_pa: p.barometric_pressure.value,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NwsAlertProperties {
    message_type: String,
    event: String,
    headline: Option<String>,
    effective: DateTime<FixedOffset>,
    expires: DateTime<FixedOffset>,
    description: Option<String>,
    instruction: Option<String>,
}

impl From<NwsAlertProperties> for Alert {
    fn from(p: NwsAlertProperties) -> Self {
        Self {
            message_type: p.message_type,
            event: p.event,
            headline: p.headline,
            effective: p.effective,
            expires: p.expires,
            description: p.description,
            instruction: p.instruction,
        }
    }
}

#[async_trait]
impl WeatherSource for NwsClient {
    async fn forecast(&self, location: &Location) -> Result<Vec<ForecastPeriod>, ForecastError> {
        let url = self
            .points(location)
            .await?
            .forecast
            .ok_or(ForecastError::MissingField("forecast"))?;
        self.periods(&url).await
    }

    async fn hourly_forecast(
        &self,
        location: &Location,
    ) -> Result<Vec<ForecastPeriod>, ForecastError> {
        let url = self
            .points(location)
            .await?
            .forecast_hourly
            .ok_or(ForecastError::MissingField("forecastHourly"))?;
        self.periods(&url).await
    }

    async fn nearest_station(&self, location: &Location) -> Result<String, ForecastError> {
        let url = self
            .points(location)
            .await?
            .observation_stations
            .ok_or(ForecastError::MissingField("observationStations"))?;

        let parsed: NwsFeatureCollection<NwsStationProperties> = self.get(&url, &[]).await?;

        // The API lists stations nearest first.
        let station = parsed
            .features
            .into_iter()
            .next()
            .map(|f| f.properties.station_identifier)
            .ok_or_else(|| ForecastError::NoStation(location.point()))?;

        tracing::debug!(%station, point = %location.point(), "resolved nearest station");
        Ok(station)
    }

    async fn current_observation(&self, station: &str) -> Result<Observation, ForecastError> {
        let url = format!("{}/stations/{}/observations/latest", self.base_url, station);
        let parsed: NwsFeature<NwsObservationProperties> = self.get(&url, &[]).await?;
        Ok(parsed.properties.into())
    }

    async fn active_alerts(&self, location: &Location) -> Result<Vec<Alert>, ForecastError> {
        let url = format!("{}/alerts/active", self.base_url);
        let point = location.point();
        let parsed: NwsFeatureCollection<NwsAlertProperties> =
            self.get(&url, &[("point", point.as_str())]).await?;
        Ok(parsed.features.into_iter().map(|f| f.properties.into()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // wiremock's header matcher splits values on commas, so keep this
    // user agent comma-free.
    const UA: &str = "forecast-tests/1.0 test@example.com";

    fn period(name: &str, detailed: &str) -> serde_json::Value {
        json!({
            "number": 1,
            "name": name,
            "startTime": "2024-03-01T18:00:00-06:00",
            "endTime": "2024-03-02T06:00:00-06:00",
            "isDaytime": false,
            "temperature": 41,
            "temperatureUnit": "F",
            "windSpeed": "5 to 10 mph",
            "windDirection": "S",
            "shortForecast": "Mostly Clear",
            "detailedForecast": detailed
        })
    }

    async fn mount_points(server: &MockServer) {
        let base = server.uri();
        Mock::given(method("GET"))
            .and(path("/points/35.47,-97.52"))
            .and(header("user-agent", UA))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {
                    "forecast": format!("{base}/gridpoints/OUN/97,94/forecast"),
                    "forecastHourly": format!("{base}/gridpoints/OUN/97,94/forecast/hourly"),
                    "observationStations": format!("{base}/gridpoints/OUN/97,94/stations")
                }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn forecast_resolves_points_then_gridpoint() {
        let server = MockServer::start().await;
        mount_points(&server).await;

        Mock::given(method("GET"))
            .and(path("/gridpoints/OUN/97,94/forecast"))
            .and(header("user-agent", UA))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": { "periods": [
                    period("Tonight", "Mostly clear, with a low around 41."),
                    period("Saturday", "Sunny, with a high near 70.")
                ]}
            })))
            .mount(&server)
            .await;

        let client = NwsClient::new(&server.uri(), UA);
        let periods = client.forecast(&Location::new(35.47, -97.52)).await.unwrap();

        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].name, "Tonight");
        assert_eq!(periods[0].temperature, 41.0);
        assert_eq!(periods[1].detailed_forecast, "Sunny, with a high near 70.");
    }

    #[tokio::test]
    async fn hourly_forecast_follows_forecast_hourly_url() {
        let server = MockServer::start().await;
        mount_points(&server).await;

        Mock::given(method("GET"))
            .and(path("/gridpoints/OUN/97,94/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": { "periods": [ period("Tonight", "Daily narrative.") ] }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/gridpoints/OUN/97,94/forecast/hourly"))
            .and(header("user-agent", UA))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": { "periods": [
                    period("", "First hour."),
                    period("", "Second hour."),
                    period("", "Third hour.")
                ]}
            })))
            .mount(&server)
            .await;

        let client = NwsClient::new(&server.uri(), UA);
        let periods = client.hourly_forecast(&Location::new(35.47, -97.52)).await.unwrap();

        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0].detailed_forecast, "First hour.");
        assert_eq!(periods[2].detailed_forecast, "Third hour.");
    }

    #[tokio::test]
    async fn nearest_station_takes_first_feature() {
        let server = MockServer::start().await;
        mount_points(&server).await;

        Mock::given(method("GET"))
            .and(path("/gridpoints/OUN/97,94/stations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "features": [
                    { "properties": { "stationIdentifier": "KOKC" } },
                    { "properties": { "stationIdentifier": "KPWA" } }
                ]
            })))
            .mount(&server)
            .await;

        let client = NwsClient::new(&server.uri(), UA);
        let station = client.nearest_station(&Location::new(35.47, -97.52)).await.unwrap();
        assert_eq!(station, "KOKC");
    }

    #[tokio::test]
    async fn nearest_station_errors_on_empty_list() {
        let server = MockServer::start().await;
        mount_points(&server).await;

        Mock::given(method("GET"))
            .and(path("/gridpoints/OUN/97,94/stations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "features": [] })))
            .mount(&server)
            .await;

        let client = NwsClient::new(&server.uri(), UA);
        let err = client.nearest_station(&Location::new(35.47, -97.52)).await.unwrap_err();
        assert!(matches!(err, ForecastError::NoStation(_)));
    }

    #[tokio::test]
    async fn observation_converts_kph_and_keeps_nulls() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/stations/KOKC/observations/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {
                    "timestamp": "2024-03-01T23:53:00+00:00",
                    "temperature": { "unitCode": "wmoUnit:degC", "value": 20.0 },
                    "windChill": { "unitCode": "wmoUnit:degC", "value": null },
                    "heatIndex": { "unitCode": "wmoUnit:degC", "value": null },
                    "relativeHumidity": { "unitCode": "wmoUnit:percent", "value": 45.2 },
                    "windSpeed": { "unitCode": "wmoUnit:km_h-1", "value": 36.0 },
                    "windGust": { "unitCode": "wmoUnit:km_h-1", "value": null },
                    "windDirection": { "unitCode": "wmoUnit:degree_(angle)", "value": 180 },
                    "barometricPressure": { "unitCode": "wmoUnit:Pa", "value": 101590 }
                }
            })))
            .mount(&server)
            .await;

        let client = NwsClient::new(&server.uri(), UA);
        let obs = client.current_observation("KOKC").await.unwrap();

        assert_eq!(obs.temperature_c, Some(20.0));
        assert_eq!(obs.wind_chill_c, None);
        assert!((obs.wind_speed_mps.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(obs.wind_gust_mps, None);
        assert_eq!(obs.wind_direction_deg, Some(180.0));
    }

    #[tokio::test]
    async fn alerts_query_by_point() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/alerts/active"))
            .and(query_param("point", "35.47,-97.52"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "features": [{
                    "properties": {
                        "messageType": "Alert",
                        "event": "Wind Advisory",
                        "headline": "Wind Advisory issued March 1",
                        "effective": "2024-03-01T10:00:00-06:00",
                        "expires": "2024-03-01T19:00:00-06:00",
                        "description": "South winds 25 to 35 mph.",
                        "instruction": null
                    }
                }]
            })))
            .mount(&server)
            .await;

        let client = NwsClient::new(&server.uri(), UA);
        let alerts = client.active_alerts(&Location::new(35.47, -97.52)).await.unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].event, "Wind Advisory");
        assert!(alerts[0].instruction.is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/points/35.47,-97.52"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let client = NwsClient::new(&server.uri(), UA);
        let err = client.forecast(&Location::new(35.47, -97.52)).await.unwrap_err();

        match err {
            ForecastError::Status { status, body, .. } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unexpected_shape_is_a_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/stations/KOKC/observations/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 200 })))
            .mount(&server)
            .await;

        let client = NwsClient::new(&server.uri(), UA);
        let err = client.current_observation("KOKC").await.unwrap_err();
        assert!(matches!(err, ForecastError::Parse { .. }));
    }
}
