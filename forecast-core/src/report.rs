//! Rendering of forecasts, observations and alerts as plain text, and the
//! [`Reporter`] that fetches and renders a report end to end.

use chrono::{DateTime, FixedOffset};

use crate::{
    Config, ForecastError,
    geocode::{Geocoder, geocoder_from_config},
    model::{Alert, ForecastPeriod, Location, Observation, ReportKind},
    source::{WeatherSource, source_from_config},
    units::{celsius_to_fahrenheit, compass, mps_to_mph, pascals_to_inhg},
};

const DATE_TIME_FORMAT: &str = "%A %B %d %Y %I:%M %p";
const TIME_FORMAT: &str = "%I:%M %p";
const RULE_WIDTH: usize = 40;

fn full_time(dt: &DateTime<FixedOffset>) -> String {
    dt.format(DATE_TIME_FORMAT).to_string()
}

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

fn first_periods(
    periods: &[ForecastPeriod],
    count: usize,
) -> Result<&[ForecastPeriod], ForecastError> {
    periods.get(..count).ok_or(ForecastError::NotEnoughPeriods {
        requested: count,
        available: periods.len(),
    })
}

/// Name and narrative of the first `count` periods, one blank line apart.
pub fn format_daily(periods: &[ForecastPeriod], count: usize) -> Result<String, ForecastError> {
    let blocks: Vec<String> = first_periods(periods, count)?
        .iter()
        .map(|p| format!("{}\n{}", p.name, p.detailed_forecast))
        .collect();

    Ok(blocks.join("\n\n"))
}

pub fn format_hourly(periods: &[ForecastPeriod], count: usize) -> Result<String, ForecastError> {
    let blocks: Vec<String> = first_periods(periods, count)?
        .iter()
        .map(|p| {
            // Hourly periods never cross midnight, so the end shows time only.
            [
                format!("{}-{}", full_time(&p.start_time), p.end_time.format(TIME_FORMAT)),
                p.short_forecast.clone(),
                format!("Temperature: {} {}", p.temperature, p.temperature_unit),
                format!("Wind: {} {}", p.wind_speed, p.wind_direction),
            ]
            .join("\n")
        })
        .collect();

    Ok(blocks.join("\n\n"))
}

pub fn format_current(station: &str, obs: &Observation) -> Result<String, ForecastError> {
    let temperature = obs.temperature_c.ok_or(ForecastError::MissingField("temperature"))?;
    let humidity = obs
        .relative_humidity_pct
        .ok_or(ForecastError::MissingField("relativeHumidity"))?;
    let wind_speed = obs.wind_speed_mps.ok_or(ForecastError::MissingField("windSpeed"))?;
    // Stations report a null direction when the wind is calm; that is
    // surfaced as missing data rather than guessed.
    let wind_direction = obs
        .wind_direction_deg
        .ok_or(ForecastError::MissingField("windDirection"))?;
    let pressure = obs
        .barometric_pressure_pa
        .ok_or(ForecastError::MissingField("barometricPressure"))?;

    let feels_like = obs.wind_chill_c.or(obs.heat_index_c).unwrap_or(temperature);
    let gust = obs.wind_gust_mps.unwrap_or(wind_speed);

    let lines = [
        format!("Station ID: {station}"),
        format!("Temperature: {:.0} F", celsius_to_fahrenheit(temperature)),
        format!("Feels like: {:.0} F", celsius_to_fahrenheit(feels_like)),
        format!("Humidity: {humidity:.0} %"),
        format!(
            "Wind from {} at {:.0} mph with gusts to {:.0} mph",
            compass(wind_direction),
            mps_to_mph(wind_speed),
            mps_to_mph(gust),
        ),
        format!("Barometer: {:.2} inHg", pascals_to_inhg(pressure)),
        format!("Timestamp: {}", full_time(&obs.timestamp)),
    ];

    Ok(lines.join("\n"))
}

pub fn format_alerts(location: &Location, alerts: &[Alert]) -> String {
    let mut lines = vec![format!("Active alerts for {}", location.point()), rule()];

    for alert in alerts {
        lines.push(format!("Type: {}", alert.message_type));
        lines.push(format!("Event: {}", alert.event));
        if let Some(headline) = &alert.headline {
            lines.push(headline.clone());
        }
        lines.push(format!(
            "Active: {}-{}",
            full_time(&alert.effective),
            full_time(&alert.expires)
        ));
        lines.push(String::new());
        lines.push("Description:".to_string());
        lines.push(alert.description.clone().unwrap_or_else(|| "(none)".to_string()));
        lines.push(String::new());
        lines.push("Instructions:".to_string());
        lines.push(alert.instruction.clone().unwrap_or_else(|| "(none)".to_string()));
        lines.push(rule());
    }

    lines.join("\n")
}

/// Runs reports against a weather source, resolving place names first.
#[derive(Debug)]
pub struct Reporter {
    config: Config,
    source: Box<dyn WeatherSource>,
    geocoder: Box<dyn Geocoder>,
}

impl Reporter {
    pub fn new(
        config: Config,
        source: Box<dyn WeatherSource>,
        geocoder: Box<dyn Geocoder>,
    ) -> Self {
        Self { config, source, geocoder }
    }

    /// Reporter backed by api.weather.gov and Nominatim.
    pub fn from_config(config: Config) -> Self {
        let source = source_from_config(&config);
        let geocoder = geocoder_from_config(&config);
        Self::new(config, source, geocoder)
    }

    /// The configured location when `query` is absent. A query that cannot
    /// be resolved is an error; it never falls back to the default.
    async fn resolve(&self, query: Option<&str>) -> Result<Location, ForecastError> {
        match query {
            None => Ok(self.config.default_location()),
            Some(q) => {
                tracing::debug!(query = q, "resolving location");
                self.geocoder.locate(q).await
            }
        }
    }

    pub async fn daily(
        &self,
        query: Option<&str>,
        periods: usize,
    ) -> Result<String, ForecastError> {
        let location = self.resolve(query).await?;
        let forecast = self.source.forecast(&location).await?;
        format_daily(&forecast, periods)
    }

    pub async fn hourly(&self, query: Option<&str>, hours: usize) -> Result<String, ForecastError> {
        let location = self.resolve(query).await?;
        let forecast = self.source.hourly_forecast(&location).await?;
        format_hourly(&forecast, hours)
    }

    pub async fn current(&self, query: Option<&str>) -> Result<String, ForecastError> {
        let location = self.resolve(query).await?;
        let station = match location.station {
            Some(ref station) => station.clone(),
            None => self.source.nearest_station(&location).await?,
        };

        let observation = self.source.current_observation(&station).await?;
        format_current(&station, &observation)
    }

    pub async fn alerts(&self, query: Option<&str>) -> Result<String, ForecastError> {
        let location = self.resolve(query).await?;
        let alerts = self.source.active_alerts(&location).await?;
        Ok(format_alerts(&location, &alerts))
    }

    /// Radar imagery is not available as text; always unsupported.
    pub async fn radar(&self, _query: Option<&str>) -> Result<String, ForecastError> {
        Err(ForecastError::Unsupported(ReportKind::Radar))
    }

    /// Run `kind`, using its default period count when `count` is `None`.
    pub async fn run(
        &self,
        kind: ReportKind,
        query: Option<&str>,
        count: Option<usize>,
    ) -> Result<String, ForecastError> {
        let count = count.or(kind.default_count()).unwrap_or_default();

        match kind {
            ReportKind::Daily => self.daily(query, count).await,
            ReportKind::Hourly => self.hourly(query, count).await,
            ReportKind::Current => self.current(query).await,
            ReportKind::Alerts => self.alerts(query).await,
            ReportKind::Radar => self.radar(query).await,
        }
    }
}
