//! Static game data - planes, airfields and units
//!
//! The catalog is read-only during generation. Lookups of unknown ids
//! are configuration errors.

use ahash::AHashMap;
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SortieError};
use crate::core::types::{flat_distance, Coalition};
use crate::plan::TaskKind;

/// Plane model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaneData {
    pub id: String,
    pub name: String,
    /// Cruise speed (km/h)
    pub speed: f64,
    /// Maximum range (km)
    pub range: f64,
    #[serde(default)]
    pub size: PlaneSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaneSize {
    #[default]
    Small,
    Medium,
    Large,
}

/// Ground path from parking to the runway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxiRoute {
    pub id: u32,
    /// Ordered ground points, parking first
    pub points: Vec<DVec3>,
    pub runway_start: DVec3,
    pub runway_end: DVec3,
}

impl TaxiRoute {
    /// Ground distance from parking to the runway start (meters)
    pub fn length(&self) -> f64 {
        let mut total = 0.0;
        let mut last = None;
        for &point in self.points.iter().chain(std::iter::once(&self.runway_start)) {
            if let Some(prev) = last {
                total += flat_distance(prev, point);
            }
            last = Some(point);
        }
        total
    }

    /// Parking spot, first point of the route
    pub fn parking(&self) -> DVec3 {
        self.points.first().copied().unwrap_or(self.runway_start)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirfieldData {
    pub id: String,
    pub name: String,
    pub position: DVec3,
    #[serde(default)]
    pub taxi: Vec<TaxiRoute>,
}

/// Flying unit (squadron)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitData {
    pub id: String,
    pub name: String,
    pub country: u32,
    pub coalition: Coalition,
    pub airfield: String,
    /// Plane model ids available to the unit
    pub planes: Vec<String>,
    pub tasks: Vec<TaskKind>,
    pub callsign: String,
    /// Default number of planes per flight
    #[serde(default = "default_flight_size")]
    pub flight_size: usize,
}

fn default_flight_size() -> usize {
    2
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MapData {
    pub height: f64,
    pub width: f64,
}

/// Catalog of all static data used by a mission
#[derive(Debug, Clone)]
pub struct GameData {
    pub map: MapData,
    planes: AHashMap<String, PlaneData>,
    airfields: AHashMap<String, AirfieldData>,
    units: AHashMap<String, UnitData>,
}

impl GameData {
    pub fn new(map: MapData) -> Self {
        Self {
            map,
            planes: AHashMap::new(),
            airfields: AHashMap::new(),
            units: AHashMap::new(),
        }
    }

    /// The data set bundled with the crate
    pub fn sample() -> Result<Self> {
        Self::parse_toml(include_str!("../../data/sample_data.toml"))
    }

    pub fn add_plane(&mut self, plane: PlaneData) {
        self.planes.insert(plane.id.clone(), plane);
    }

    pub fn add_airfield(&mut self, airfield: AirfieldData) {
        self.airfields.insert(airfield.id.clone(), airfield);
    }

    pub fn add_unit(&mut self, unit: UnitData) {
        self.units.insert(unit.id.clone(), unit);
    }

    pub fn plane(&self, id: &str) -> Result<&PlaneData> {
        self.planes
            .get(id)
            .ok_or_else(|| SortieError::UnknownPlane(id.to_string()))
    }

    pub fn airfield(&self, id: &str) -> Result<&AirfieldData> {
        self.airfields
            .get(id)
            .ok_or_else(|| SortieError::UnknownAirfield(id.to_string()))
    }

    pub fn unit(&self, id: &str) -> Result<&UnitData> {
        self.units
            .get(id)
            .ok_or_else(|| SortieError::UnknownUnit(id.to_string()))
    }

    /// Units in id order
    pub fn units(&self) -> Vec<&UnitData> {
        let mut units: Vec<_> = self.units.values().collect();
        units.sort_by(|a, b| a.id.cmp(&b.id));
        units
    }

    /// Airfields of a coalition (by the units based there), id order
    pub fn airfields_of(&self, coalition: Coalition) -> Vec<&AirfieldData> {
        let mut ids: Vec<&str> = self
            .units
            .values()
            .filter(|u| u.coalition == coalition)
            .map(|u| u.airfield.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter()
            .filter_map(|id| self.airfields.get(id))
            .collect()
    }

    pub fn load_from_toml(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a data set and check unit references
    pub fn parse_toml(content: &str) -> Result<Self> {
        let toml_data: TomlData = toml::from_str(content)?;

        let mut data = Self::new(toml_data.map);
        for plane in toml_data.planes {
            data.add_plane(plane);
        }
        for airfield in toml_data.airfields {
            data.add_airfield(airfield);
        }
        for unit in toml_data.units {
            data.airfield(&unit.airfield)?;
            for plane in &unit.planes {
                data.plane(plane)?;
            }
            data.add_unit(unit);
        }
        Ok(data)
    }
}

#[derive(Debug, Deserialize)]
struct TomlData {
    map: MapData,
    #[serde(default)]
    planes: Vec<PlaneData>,
    #[serde(default)]
    airfields: Vec<AirfieldData>,
    #[serde(default)]
    units: Vec<UnitData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = r#"
        [map]
        height = 100000.0
        width = 100000.0

        [[planes]]
        id = "yak1"
        name = "Yak-1"
        speed = 450.0
        range = 650.0

        [[airfields]]
        id = "kalinin"
        name = "Kalinin"
        position = [50000.0, 0.0, 50000.0]

        [[airfields.taxi]]
        id = 1
        points = [[50000.0, 0.0, 50000.0], [50000.0, 0.0, 50300.0]]
        runway_start = [50000.0, 0.0, 50400.0]
        runway_end = [51000.0, 0.0, 50400.0]

        [[units]]
        id = "iap_29"
        name = "29 IAP"
        country = 101
        coalition = "allies"
        airfield = "kalinin"
        planes = ["yak1"]
        tasks = ["free", "patrol"]
        callsign = "Sokol"
    "#;

    #[test]
    fn test_parse_data() {
        let data = GameData::parse_toml(DATA).expect("Failed to parse TOML");
        let unit = data.unit("iap_29").unwrap();
        assert_eq!(unit.coalition, Coalition::Allies);
        assert_eq!(unit.flight_size, 2);
        assert_eq!(unit.tasks, vec![TaskKind::Free, TaskKind::Patrol]);

        let airfield = data.airfield("kalinin").unwrap();
        assert_eq!(airfield.taxi.len(), 1);
        assert!((airfield.taxi[0].length() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_ids() {
        let data = GameData::parse_toml(DATA).unwrap();
        assert!(matches!(data.unit("nope"), Err(SortieError::UnknownUnit(_))));
        assert!(matches!(data.plane("nope"), Err(SortieError::UnknownPlane(_))));
        assert!(matches!(
            data.airfield("nope"),
            Err(SortieError::UnknownAirfield(_))
        ));
    }

    #[test]
    fn test_unit_with_unknown_airfield_rejected() {
        let content = DATA.replace("airfield = \"kalinin\"", "airfield = \"moscow\"");
        assert!(matches!(
            GameData::parse_toml(&content),
            Err(SortieError::UnknownAirfield(_))
        ));
    }

    #[test]
    fn test_sample_data_loads() {
        let data = GameData::sample().unwrap();
        assert!(!data.units().is_empty());
        assert!(!data.airfields_of(Coalition::Axis).is_empty());
    }
}
