//! Unit conversions from the SI values the API reports to US customary
//! units, plus the 16-point compass rose.

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const SECTOR_DEG: f64 = 360.0 / 16.0;

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 1.8 + 32.0
}

pub fn mps_to_mph(mps: f64) -> f64 {
    mps * 2.23694
}

pub fn kph_to_mps(kph: f64) -> f64 {
    kph / 3.6
}

pub fn pascals_to_inhg(pa: f64) -> f64 {
    pa * 0.0002953
}

/// Label of the compass sector containing `heading` (degrees from north).
pub fn compass(heading: f64) -> &'static str {
    let heading = heading.rem_euclid(360.0);
    // Exact sector edges (11.25, 33.75, ...) round half to even.
    let index = (heading / SECTOR_DEG).round_ties_even() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}
