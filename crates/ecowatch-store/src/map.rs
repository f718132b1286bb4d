//! Renderable map features.
//!
//! The store describes what belongs on the map as plain points and
//! polygons; how those are encoded (GeoJSON, tiles, a widget) is up to the
//! consumer.

use ecowatch_core::HotspotKind;
use ecowatch_types::GeoPoint;

/// Shape of a map feature.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(GeoPoint),
    /// Outline without the closing point.
    Polygon(Vec<GeoPoint>),
}

/// What a feature represents, with its display properties.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureKind {
    Sensor {
        id: u32,
        name: String,
        color: String,
        glowing: bool,
        aqi: Option<u32>,
    },
    Zone {
        id: String,
        name: String,
        color: String,
        avg_aqi: u32,
    },
    Hotspot(HotspotKind),
}

/// One renderable item.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    pub geometry: Geometry,
    pub kind: FeatureKind,
}

/// Anything that can list map features.
pub trait FeatureProvider {
    /// Features in drawing order: zones, hotspots, then sensors.
    fn map_features(&self) -> Vec<MapFeature>;
}

/// Hotspot points from the fixed tables.
pub fn hotspot_features() -> impl Iterator<Item = MapFeature> {
    HotspotKind::ALL.into_iter().flat_map(|kind| {
        kind.points().iter().map(move |point| MapFeature {
            geometry: Geometry::Point(*point),
            kind: FeatureKind::Hotspot(kind),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotspot_features() {
        let features: Vec<_> = hotspot_features().collect();
        assert_eq!(features.len(), 9);
        assert_eq!(
            features[0].kind,
            FeatureKind::Hotspot(HotspotKind::Pollution)
        );
        assert_eq!(features[8].kind, FeatureKind::Hotspot(HotspotKind::Crowd));
        assert!(matches!(features[0].geometry, Geometry::Point(_)));
    }
}
