//! Fixed Nashik location tables: sensors, zones and hotspots.

use ecowatch_types::{COLOR_GOOD, GeoPoint, Sensor, SensorKind, Zone};

/// One row of the sensor location table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorLocation {
    pub id: u32,
    pub name: &'static str,
    pub kind: SensorKind,
    pub position: GeoPoint,
}

impl SensorLocation {
    /// A fresh sensor with no history.
    pub fn to_sensor(&self) -> Sensor {
        Sensor::new(self.id, self.name, self.kind, self.position)
    }
}

/// The monitored sensor points, in id order.
pub const SENSOR_LOCATIONS: [SensorLocation; 8] = [
    SensorLocation {
        id: 1,
        name: "Nashik Road Station",
        kind: SensorKind::Campus,
        position: GeoPoint::new(20.0010, 73.7885),
    },
    SensorLocation {
        id: 2,
        name: "Panchavati Temple",
        kind: SensorKind::Campus,
        position: GeoPoint::new(20.0000, 73.7925),
    },
    SensorLocation {
        id: 3,
        name: "CIDCO Central",
        kind: SensorKind::Campus,
        position: GeoPoint::new(19.9950, 73.7885),
    },
    SensorLocation {
        id: 4,
        name: "College Road",
        kind: SensorKind::Campus,
        position: GeoPoint::new(19.9990, 73.7945),
    },
    SensorLocation {
        id: 5,
        name: "Gangapur Road",
        kind: SensorKind::Campus,
        position: GeoPoint::new(19.9945, 73.7925),
    },
    SensorLocation {
        id: 6,
        name: "Satpur Industrial",
        kind: SensorKind::Campus,
        position: GeoPoint::new(19.9960, 73.7965),
    },
    SensorLocation {
        id: 7,
        name: "Mumbai-Agra Highway",
        kind: SensorKind::Nearby,
        position: GeoPoint::new(20.0020, 73.7865),
    },
    SensorLocation {
        id: 8,
        name: "Trimbak Road",
        kind: SensorKind::Nearby,
        position: GeoPoint::new(19.9930, 73.7955),
    },
];

/// Static zone definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneSeed {
    pub id: &'static str,
    pub name: &'static str,
    pub polygon: [GeoPoint; 4],
    pub sensors: [u32; 2],
    pub avg_aqi: u32,
    pub avg_temp: f64,
    pub color: &'static str,
}

impl ZoneSeed {
    pub fn to_zone(&self) -> Zone {
        Zone {
            id: self.id.to_string(),
            name: self.name.to_string(),
            polygon: self.polygon.to_vec(),
            sensors: self.sensors.to_vec(),
            avg_aqi: self.avg_aqi,
            avg_temp: self.avg_temp,
            color: self.color.to_string(),
        }
    }
}

const fn rect(north: f64, south: f64, west: f64, east: f64) -> [GeoPoint; 4] {
    [
        GeoPoint::new(north, west),
        GeoPoint::new(north, east),
        GeoPoint::new(south, east),
        GeoPoint::new(south, west),
    ]
}

/// The four city zones.
pub const ZONE_SEEDS: [ZoneSeed; 4] = [
    ZoneSeed {
        id: "nashik_road",
        name: "Nashik Road",
        polygon: rect(20.0025, 19.9975, 73.78, 73.79),
        sensors: [1, 2],
        avg_aqi: 75,
        avg_temp: 28.5,
        color: "#4ade80",
    },
    ZoneSeed {
        id: "panchavati",
        name: "Panchavati",
        polygon: rect(20.0025, 19.9975, 73.79, 73.80),
        sensors: [3, 4],
        avg_aqi: 68,
        avg_temp: 28.2,
        color: COLOR_GOOD,
    },
    ZoneSeed {
        id: "cidco",
        name: "CIDCO",
        polygon: rect(19.9975, 19.9925, 73.78, 73.79),
        sensors: [5, 6],
        avg_aqi: 82,
        avg_temp: 29.0,
        color: "#facc15",
    },
    ZoneSeed {
        id: "industrial",
        name: "Industrial Area",
        polygon: rect(19.9975, 19.9925, 73.79, 73.80),
        sensors: [7, 8],
        avg_aqi: 95,
        avg_temp: 29.5,
        color: "#fb923c",
    },
];

/// Fresh sensors for every row of [`SENSOR_LOCATIONS`].
pub fn sensors() -> Vec<Sensor> {
    SENSOR_LOCATIONS.iter().map(SensorLocation::to_sensor).collect()
}

/// Owned zones for every row of [`ZONE_SEEDS`].
pub fn zones() -> Vec<Zone> {
    ZONE_SEEDS.iter().map(ZoneSeed::to_zone).collect()
}

/// Kind of hotspot marked on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotspotKind {
    Pollution,
    Traffic,
    Crowd,
}

impl HotspotKind {
    pub const ALL: [HotspotKind; 3] = [Self::Pollution, Self::Traffic, Self::Crowd];

    pub fn as_str(&self) -> &'static str {
        match self {
            HotspotKind::Pollution => "pollution",
            HotspotKind::Traffic => "traffic",
            HotspotKind::Crowd => "crowd",
        }
    }

    /// Fixed points of this kind.
    pub fn points(&self) -> &'static [GeoPoint] {
        match self {
            HotspotKind::Pollution => &POLLUTION_HOTSPOTS,
            HotspotKind::Traffic => &TRAFFIC_HOTSPOTS,
            HotspotKind::Crowd => &CROWD_HOTSPOTS,
        }
    }
}

pub const POLLUTION_HOTSPOTS: [GeoPoint; 3] = [
    GeoPoint::new(19.9965, 73.7895),
    GeoPoint::new(19.9945, 73.7955),
    GeoPoint::new(19.9985, 73.7975),
];

pub const TRAFFIC_HOTSPOTS: [GeoPoint; 3] = [
    GeoPoint::new(20.0015, 73.7885),
    GeoPoint::new(19.9955, 73.7925),
    GeoPoint::new(19.9995, 73.7965),
];

pub const CROWD_HOTSPOTS: [GeoPoint; 3] = [
    GeoPoint::new(20.0005, 73.7905),
    GeoPoint::new(19.9975, 73.7945),
    GeoPoint::new(19.9945, 73.7975),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_ids_are_unique_and_ordered() {
        let ids: Vec<u32> = SENSOR_LOCATIONS.iter().map(|l| l.id).collect();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_fresh_sensor_defaults() {
        let sensor = SENSOR_LOCATIONS[6].to_sensor();
        assert_eq!(sensor.name, "Mumbai-Agra Highway");
        assert_eq!(sensor.kind, SensorKind::Nearby);
        assert_eq!(sensor.color, COLOR_GOOD);
        assert!(!sensor.is_glowing);
        assert!(sensor.readings.is_empty());
        assert_eq!(sensor.predicted_aqi, 0);
    }

    #[test]
    fn test_zone_members_exist() {
        for zone in zones() {
            assert_eq!(zone.polygon.len(), 4);
            for id in &zone.sensors {
                assert!(SENSOR_LOCATIONS.iter().any(|l| l.id == *id), "{}", zone.id);
            }
        }
    }

    #[test]
    fn test_zone_rectangle_corners() {
        let zone = ZONE_SEEDS[0].to_zone();
        assert_eq!(zone.polygon[0], GeoPoint::new(20.0025, 73.78));
        assert_eq!(zone.polygon[1], GeoPoint::new(20.0025, 73.79));
        assert_eq!(zone.polygon[2], GeoPoint::new(19.9975, 73.79));
        assert_eq!(zone.polygon[3], GeoPoint::new(19.9975, 73.78));
    }

    #[test]
    fn test_hotspot_tables() {
        for kind in HotspotKind::ALL {
            assert_eq!(kind.points().len(), 3, "{}", kind.as_str());
        }
    }
}
