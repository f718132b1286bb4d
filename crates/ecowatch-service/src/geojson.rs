//! GeoJSON encoding of map features.
//!
//! Coordinates are `[lng, lat]` and polygon rings are closed by repeating
//! the first point.

use serde_json::{Value, json};

use ecowatch_store::{FeatureKind, Geometry, MapFeature};
use ecowatch_types::GeoPoint;

/// Encode features as a `FeatureCollection`, preserving their order.
pub fn feature_collection(features: &[MapFeature]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features.iter().map(feature).collect::<Vec<_>>(),
    })
}

fn feature(feature: &MapFeature) -> Value {
    json!({
        "type": "Feature",
        "geometry": geometry(&feature.geometry),
        "properties": properties(&feature.kind),
    })
}

fn position(point: &GeoPoint) -> Value {
    json!([point.lng, point.lat])
}

fn geometry(geometry: &Geometry) -> Value {
    match geometry {
        Geometry::Point(point) => json!({
            "type": "Point",
            "coordinates": position(point),
        }),
        Geometry::Polygon(outline) => {
            let mut ring: Vec<Value> = outline.iter().map(position).collect();
            if let Some(first) = outline.first() {
                ring.push(position(first));
            }
            json!({
                "type": "Polygon",
                "coordinates": [ring],
            })
        }
    }
}

fn properties(kind: &FeatureKind) -> Value {
    match kind {
        FeatureKind::Sensor {
            id,
            name,
            color,
            glowing,
            aqi,
        } => json!({
            "featureType": "sensor",
            "id": id,
            "name": name,
            "color": color,
            "glowing": glowing,
            "aqi": aqi,
        }),
        FeatureKind::Zone {
            id,
            name,
            color,
            avg_aqi,
        } => json!({
            "featureType": "zone",
            "id": id,
            "name": name,
            "color": color,
            "avgAqi": avg_aqi,
        }),
        FeatureKind::Hotspot(kind) => json!({
            "featureType": "hotspot",
            "hotspot": kind.as_str(),
        }),
    }
}
