use chrono::{DateTime, FixedOffset};
use std::fmt;

/// A point on the map, optionally paired with the stations that serve it.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub station: Option<String>,
    pub radar_station: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            station: None,
            radar_station: None,
        }
    }

    /// `lat,lon` as api.weather.gov expects it: at most four decimals and
    /// no trailing zeros, otherwise the API answers with a redirect.
    pub fn point(&self) -> String {
        format!("{},{}", trim_coordinate(self.latitude), trim_coordinate(self.longitude))
    }

    /// Parse a `"<lat>,<lon>"` pair. Returns `None` for anything else,
    /// including coordinates out of range.
    pub fn parse_coordinates(input: &str) -> Option<Self> {
        let (lat, lon) = input.split_once(',')?;
        let latitude: f64 = lat.trim().parse().ok()?;
        let longitude: f64 = lon.trim().parse().ok()?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }

        Some(Self::new(latitude, longitude))
    }
}

fn trim_coordinate(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// One entry of a daily or hourly forecast, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPeriod {
    pub name: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub temperature: f64,
    pub temperature_unit: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub short_forecast: String,
    pub detailed_forecast: String,
}

/// Latest conditions reported by an observation station.
///
/// Values are in SI units: degrees Celsius, metres per second, percent,
/// degrees from north and pascals. Any of them may be absent upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<FixedOffset>,
    pub temperature_c: Option<f64>,
    pub wind_chill_c: Option<f64>,
    pub heat_index_c: Option<f64>,
    pub relative_humidity_pct: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub wind_gust_mps: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub barometric_pressure_pa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub message_type: String,
    pub event: String,
    pub headline: Option<String>,
    pub effective: DateTime<FixedOffset>,
    pub expires: DateTime<FixedOffset>,
    pub description: Option<String>,
    pub instruction: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Daily,
    Hourly,
    Current,
    Alerts,
    Radar,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Daily => "daily",
            ReportKind::Hourly => "hourly",
            ReportKind::Current => "current",
            ReportKind::Alerts => "alerts",
            ReportKind::Radar => "radar",
        }
    }

    /// Default number of periods shown, for the reports that take a count.
    pub fn default_count(&self) -> Option<usize> {
        match self {
            ReportKind::Daily => Some(4),
            ReportKind::Hourly => Some(6),
            _ => None,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_trims_trailing_zeros() {
        assert_eq!(Location::new(35.5, -97.25).point(), "35.5,-97.25");
        assert_eq!(Location::new(35.0, -97.0).point(), "35,-97");
        assert_eq!(Location::new(35.467_612, -97.516_428).point(), "35.4676,-97.5164");
    }

    #[test]
    fn parses_coordinate_pairs() {
        let loc = Location::parse_coordinates(" 35.47, -97.52 ").expect("valid pair");
        assert_eq!(loc.latitude, 35.47);
        assert_eq!(loc.longitude, -97.52);
        assert!(loc.station.is_none());
    }

    #[test]
    fn rejects_place_names_and_out_of_range_pairs() {
        assert!(Location::parse_coordinates("Norman, OK").is_none());
        assert!(Location::parse_coordinates("95.0,10.0").is_none());
        assert!(Location::parse_coordinates("10.0,-190.0").is_none());
        assert!(Location::parse_coordinates("35.47").is_none());
    }

    #[test]
    fn default_counts() {
        assert_eq!(ReportKind::Daily.default_count(), Some(4));
        assert_eq!(ReportKind::Hourly.default_count(), Some(6));
        assert_eq!(ReportKind::Current.default_count(), None);
    }
}
