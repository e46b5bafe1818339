use std::fmt;

use crate::error::{CoreError, Result};
use crate::params::Params;

/// Identifier of a playable map in the rotation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapId(pub String);

impl MapId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Toggles chosen on the settings screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSettings {
    pub shield_support: bool,
    pub fixed_spawn: bool,
    pub power_ups: bool,
    pub starting_power_ups: bool,
    pub sounds: bool,
    /// Score gap at which the trailing player is handed a shield
    pub shield_support_threshold: u32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            shield_support: false,
            fixed_spawn: false,
            power_ups: true,
            starting_power_ups: false,
            sounds: true,
            shield_support_threshold: Params::SHIELD_SUPPORT_THRESHOLD,
        }
    }
}

/// Game configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub win_score: u32,
    pub jet_speed: f32,
    pub jet_turn_deg: f32,
    pub basic_bullet_speed: f32,
    pub basic_fire_delay: f32,
    pub basic_pool_per_player: usize,
    pub basic_lifetime: f32,
    pub scatter_count: usize,
    pub scatter_speed: f32,
    pub scatter_lifetime: f32,
    pub saber_speed_multiplier: f32,
    pub turret_pool_size: usize,
    pub turret_lifetime: f32,
    pub reverse_interval: f32,
    pub max_wind_strength: f32,
    pub power_up_interval: f32,
    pub max_power_ups: usize,
    pub maps: Vec<MapId>,
    pub settings: MatchSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            win_score: Params::WIN_SCORE,
            jet_speed: Params::JET_SPEED,
            jet_turn_deg: Params::JET_TURN_DEG,
            basic_bullet_speed: Params::BASIC_BULLET_SPEED,
            basic_fire_delay: Params::BASIC_FIRE_DELAY,
            basic_pool_per_player: Params::BASIC_POOL_PER_PLAYER,
            basic_lifetime: Params::BASIC_LIFETIME,
            scatter_count: Params::SCATTER_COUNT,
            scatter_speed: Params::SCATTER_SPEED,
            scatter_lifetime: Params::SCATTER_LIFETIME,
            saber_speed_multiplier: Params::SABER_SPEED_MULTIPLIER,
            turret_pool_size: Params::TURRET_POOL_SIZE,
            turret_lifetime: Params::TURRET_LIFETIME,
            reverse_interval: Params::REVERSE_INTERVAL,
            max_wind_strength: Params::MAX_WIND_STRENGTH,
            power_up_interval: Params::POWER_UP_INTERVAL,
            max_power_ups: Params::MAX_POWER_UPS,
            maps: ["SampleScene", "Map1", "Map2", "Map4", "Map6"]
                .into_iter()
                .map(MapId::new)
                .collect(),
            settings: MatchSettings::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.win_score == 0 {
            return Err(CoreError::InvalidConfig("win_score must be at least 1"));
        }
        if self.maps.is_empty() {
            return Err(CoreError::InvalidConfig("map rotation is empty"));
        }
        if self.basic_pool_per_player == 0 {
            return Err(CoreError::InvalidConfig("basic pool capacity is zero"));
        }
        if self.reverse_interval <= 0.0 {
            return Err(CoreError::InvalidConfig("reverse interval must be positive"));
        }
        if self.max_wind_strength < 1.0 {
            return Err(CoreError::InvalidConfig("max wind strength below 1"));
        }
        if self.power_up_interval <= 0.0 {
            return Err(CoreError::InvalidConfig("power-up interval must be positive"));
        }
        Ok(())
    }
}
