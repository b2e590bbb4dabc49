use super::Query;
use crate::{Error, Result};
use geo::{BoundingRect, Coord, LineString, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

pub const CRS: &str = "EPSG:4326";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IsochroneResponse {
    pub features: Vec<Feature>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Isochrone {
    pub minutes: u32,
    pub polygon: Polygon<f64>,
}

/// Reachable areas in WGS84, in the order the routing service returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct IsochroneCollection {
    pub isochrones: Vec<Isochrone>,
}

impl IsochroneCollection {
    pub fn len(&self) -> usize {
        self.isochrones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.isochrones.is_empty()
    }

    pub fn crs(&self) -> &'static str {
        CRS
    }

    pub fn sort_longest_first(&mut self) {
        self.isochrones.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.isochrones
            .iter()
            .filter_map(|it| it.polygon.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
    }
}

pub fn location_point(query: &Query) -> Point<f64> {
    Point::new(query.lon, query.lat)
}

pub fn build_geometry(response: &IsochroneResponse, query: &Query) -> Result<IsochroneCollection> {
    if response.features.len() != query.minutes.len() {
        warn!(
            features = response.features.len(),
            requested = query.minutes.len(),
            "Feature count doesn't match requested ranges",
        );
    }
    let isochrones = response
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            Ok(Isochrone {
                minutes: feature_minutes(index, feature, query)?,
                polygon: feature_polygon(index, feature)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(IsochroneCollection { isochrones })
}

fn feature_polygon(index: usize, feature: &Feature) -> Result<Polygon<f64>> {
    let Some(geometry) = &feature.geometry else {
        return Err(Error::Geometry(format!("feature {index} has no geometry")));
    };
    let geometry: geojson::Geometry = serde_json::from_value(geometry.clone())
        .map_err(|e| Error::Geometry(format!("feature {index}: {e}")))?;
    let geojson::Value::Polygon(rings) = geometry.value else {
        return Err(Error::Geometry(format!(
            "feature {index} is not a polygon"
        )));
    };
    let Some(outer) = rings.first() else {
        return Err(Error::Geometry(format!("feature {index} has no rings")));
    };
    if outer.len() < 3 {
        return Err(Error::Geometry(format!(
            "feature {index} has {} coordinate pairs, at least 3 are required",
            outer.len()
        )));
    }
    let coords = outer
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Ok(Coord { x: *lon, y: *lat }),
            _ => Err(Error::Geometry(format!(
                "feature {index} has an invalid position: {position:?}"
            ))),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(LineString::from(coords), vec![]))
}

/// Prefers the range the service reports for the feature over its position.
fn feature_minutes(index: usize, feature: &Feature, query: &Query) -> Result<u32> {
    let value = feature
        .properties
        .as_ref()
        .and_then(|it| it.get("value"))
        .and_then(Value::as_f64);
    if let Some(seconds) = value {
        return Ok((seconds / 60.0).round() as u32);
    }
    query.minutes.get(index).copied().ok_or_else(|| {
        Error::Geometry(format!(
            "feature {index} has no range value and no matching requested time"
        ))
    })
}
