use crate::{Error, Result};
use serde::Deserialize;

pub const DEFAULT_LAT: f64 = 25.00307729247567;
pub const DEFAULT_LON: f64 = 55.167526256190804;

/// Raw form fields, exactly as typed by the user.
#[derive(Deserialize, Default, Debug, Clone)]
pub struct QueryArgs {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub minutes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub lat: f64,
    pub lon: f64,
    /// Travel time thresholds in minutes, in input order
    pub minutes: Vec<u32>,
}

impl QueryArgs {
    pub fn lat_or_default(&self) -> String {
        field_or(&self.lat, DEFAULT_LAT)
    }

    pub fn lon_or_default(&self) -> String {
        field_or(&self.lon, DEFAULT_LON)
    }

    pub fn minutes_or_default(&self) -> String {
        self.minutes.clone().unwrap_or_default()
    }

    /// Returns `None` when nothing was submitted yet.
    pub fn to_query(&self) -> Option<Result<Query>> {
        let minutes = self.minutes.as_deref().map(str::trim).unwrap_or_default();
        if minutes.is_empty() {
            return None;
        }
        Some(Query::parse(
            &self.lat_or_default(),
            &self.lon_or_default(),
            minutes,
        ))
    }
}

fn field_or(field: &Option<String>, default: f64) -> String {
    match field.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

impl Query {
    pub fn parse(lat: &str, lon: &str, minutes: &str) -> Result<Query> {
        let lat = parse_coordinate("latitude", lat, 90.0)?;
        let lon = parse_coordinate("longitude", lon, 180.0)?;
        let minutes = parse_minutes(minutes)?;
        Ok(Query { lat, lon, minutes })
    }

    pub fn range_seconds(&self) -> Vec<u32> {
        self.minutes.iter().map(|it| it * 60).collect()
    }
}

fn parse_coordinate(name: &str, value: &str, limit: f64) -> Result<f64> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("Error: invalid {name}: '{value}'")))?;
    if !parsed.is_finite() || parsed.abs() > limit {
        return Err(Error::InvalidInput(format!(
            "Error: {name} must be between -{limit} and {limit}"
        )));
    }
    Ok(parsed)
}

pub fn parse_minutes(input: &str) -> Result<Vec<u32>> {
    if input.trim().is_empty() {
        return Err(Error::InvalidInput(
            "Error: enter at least one isochrone time".into(),
        ));
    }
    input
        .split(',')
        .map(|token| {
            let token = token.trim();
            match token.parse::<u32>() {
                Ok(0) => Err(Error::InvalidInput(
                    "Error: isochrone times must be positive".into(),
                )),
                Ok(minutes) if minutes > u32::MAX / 60 => Err(Error::InvalidInput(format!(
                    "Error: isochrone time is too large: {minutes}"
                ))),
                Ok(minutes) => Ok(minutes),
                Err(e) => Err(Error::InvalidInput(format!(
                    "Error: invalid isochrone time '{token}': {e}"
                ))),
            }
        })
        .collect()
}
