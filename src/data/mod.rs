//! Static data service (planes, airfields, units)

pub mod catalog;

pub use catalog::{AirfieldData, GameData, MapData, PlaneData, PlaneSize, TaxiRoute, UnitData};
