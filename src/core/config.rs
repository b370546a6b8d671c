//! Generator configuration with documented constants
//!
//! All tuning numbers used by the activity pipeline are collected here.
//! Distances are meters, times are seconds unless stated otherwise.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SortieError};

/// Configuration for flight generation
///
/// Owned by a `Mission` and passed explicitly; there is no process-wide copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    // === MAP BORDER ===
    /// Margin along every map edge that is not playable
    ///
    /// Routes crossing into this band are clipped at its inner edge.
    pub restricted_border: f64,

    /// Range of the inward push applied to a clipped player start point
    ///
    /// Keeps the game's own distance-to-border checks from firing right
    /// after spawn.
    pub border_push_min: f64,
    pub border_push_max: f64,

    /// Minimum distance a pushed player start must keep from the border plane
    pub min_border_distance: f64,

    // === START ===
    /// Delay between mission begin and flight begin for ground starts
    ///
    /// Works around engine-start glitches when planes spawn on the ground.
    pub engine_start_delay_min: f64,
    pub engine_start_delay_max: f64,

    /// Extra gate between flight begin and virtual checkpoint arming
    pub virtual_gate_delay: f64,

    // === TAKEOFF ===
    /// Random wait before a runway-state element starts its takeoff roll
    pub takeoff_wait_min: f64,
    pub takeoff_wait_max: f64,

    /// Wait used instead for trailing elements of a player flight
    pub player_takeoff_wait_min: f64,
    pub player_takeoff_wait_max: f64,

    /// Wait after the element leader reports being airborne
    pub post_takeoff_min: f64,
    pub post_takeoff_max: f64,

    /// Taxi speed used to estimate the takeoff time budget (m/s)
    pub taxi_speed: f64,

    /// Time budget for engine start, takeoff roll and initial climb
    pub takeoff_time: f64,

    /// Altitude reached when the takeoff activity is fully spent
    pub takeoff_altitude: f64,

    // === FORM ===
    /// Join timer used when several elements start on the ground
    pub join_delay_min: f64,
    pub join_delay_max: f64,

    // === WAIT ===
    /// Free-flight wait window (15 to 30 minutes)
    pub free_wait_min: f64,
    pub free_wait_max: f64,

    // === FLY ===
    /// Cruise altitude window for generated routes
    pub altitude_min: f64,
    pub altitude_max: f64,

    /// Distance window from the home airfield to the task area
    pub task_distance_min: f64,
    pub task_distance_max: f64,

    /// Time spent looping over a patrol area
    pub patrol_time_min: f64,
    pub patrol_time_max: f64,

    /// Radius of the orbit flown over a covered point
    pub cover_orbit_radius: f64,

    /// Distance between consecutive patrol waypoints
    pub patrol_leg_length: f64,

    // === FUEL ===
    /// Fuel fraction kept on top of the planned route requirement
    pub fuel_reserve: f64,

    /// Floor for fuel after distance consumption
    pub fuel_min: f64,

    // === VIRTUAL LOD ===
    /// Activity time covered by one virtual checkpoint
    ///
    /// An activity of 1800 s with a 600 s interval is split into 3
    /// checkpoints plus the final continuation.
    pub virtual_point_interval: f64,

    /// Primary check-zone radius that materializes a checkpoint
    pub zone_radius: f64,

    /// Outer re-arm zone radius (must be > zone_radius)
    pub zone_outer_radius: f64,

    /// Inner cancel zone radius (must be < zone_radius)
    pub zone_inner_radius: f64,

    /// Delay between arming a checkpoint and enabling its primary zone
    pub zone_arm_delay: f64,

    /// Distance watched by a live checkpoint before it is removed again
    pub proximity_distance: f64,

    /// Interval between proximity checks of a live checkpoint
    pub proximity_check: f64,

    /// Grace period after a failed proximity check before removal
    pub proximity_grace: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            // Border
            restricted_border: 5000.0,
            border_push_min: 3000.0,
            border_push_max: 4000.0,
            min_border_distance: 3000.0,

            // Start
            engine_start_delay_min: 2.0,
            engine_start_delay_max: 3.0,
            virtual_gate_delay: 1.0,

            // Takeoff
            takeoff_wait_min: 8.0,
            takeoff_wait_max: 30.0,
            player_takeoff_wait_min: 30.0,
            player_takeoff_wait_max: 60.0,
            post_takeoff_min: 12.0,
            post_takeoff_max: 18.0,
            taxi_speed: 5.0,
            takeoff_time: 90.0,
            takeoff_altitude: 300.0,

            // Form
            join_delay_min: 40.0,
            join_delay_max: 60.0,

            // Wait
            free_wait_min: 900.0,
            free_wait_max: 1800.0,

            // Fly
            altitude_min: 1500.0,
            altitude_max: 4000.0,
            task_distance_min: 20000.0,
            task_distance_max: 60000.0,
            patrol_time_min: 900.0,
            patrol_time_max: 1800.0,
            cover_orbit_radius: 4000.0,
            patrol_leg_length: 15000.0,

            // Fuel
            fuel_reserve: 0.25,
            fuel_min: 0.1,

            // Virtual
            virtual_point_interval: 600.0,
            zone_radius: 10000.0,
            zone_outer_radius: 10500.0,
            zone_inner_radius: 9500.0,
            zone_arm_delay: 2.0,
            proximity_distance: 11000.0,
            proximity_check: 10.0,
            proximity_grace: 5.0,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GeneratorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("border_push", self.border_push_min, self.border_push_max),
            ("engine_start_delay", self.engine_start_delay_min, self.engine_start_delay_max),
            ("takeoff_wait", self.takeoff_wait_min, self.takeoff_wait_max),
            ("player_takeoff_wait", self.player_takeoff_wait_min, self.player_takeoff_wait_max),
            ("post_takeoff", self.post_takeoff_min, self.post_takeoff_max),
            ("join_delay", self.join_delay_min, self.join_delay_max),
            ("free_wait", self.free_wait_min, self.free_wait_max),
            ("altitude", self.altitude_min, self.altitude_max),
            ("task_distance", self.task_distance_min, self.task_distance_max),
            ("patrol_time", self.patrol_time_min, self.patrol_time_max),
        ];

        for (name, min, max) in ranges {
            if min < 0.0 || min > max {
                return Err(SortieError::InvalidConfig(format!(
                    "{name} range is invalid ({min} > {max} or negative)"
                )));
            }
        }

        // Inner < primary < outer < proximity keeps the zones from overlapping
        if !(self.zone_inner_radius < self.zone_radius
            && self.zone_radius < self.zone_outer_radius
            && self.zone_outer_radius < self.proximity_distance)
        {
            return Err(SortieError::InvalidConfig(format!(
                "zone radii must be ordered inner ({}) < primary ({}) < outer ({}) < proximity ({})",
                self.zone_inner_radius,
                self.zone_radius,
                self.zone_outer_radius,
                self.proximity_distance
            )));
        }

        if self.virtual_point_interval <= 0.0 {
            return Err(SortieError::InvalidConfig(
                "virtual_point_interval must be positive".into(),
            ));
        }

        if !(0.0..1.0).contains(&self.fuel_min) || self.fuel_reserve < 0.0 {
            return Err(SortieError::InvalidConfig(format!(
                "fuel_min ({}) must be in [0, 1) and fuel_reserve ({}) non-negative",
                self.fuel_min, self.fuel_reserve
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GeneratorConfig::from_toml_str("zone_arm_delay = 4.0\n").unwrap();
        assert_eq!(config.zone_arm_delay, 4.0);
        assert_eq!(config.zone_radius, 10000.0);
    }

    #[test]
    fn test_unordered_zone_radii_rejected() {
        let config = GeneratorConfig {
            zone_inner_radius: 12000.0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SortieError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = GeneratorConfig::from_toml_str("free_wait_min = 2000.0\nfree_wait_max = 100.0\n");
        assert!(result.is_err());
    }
}
