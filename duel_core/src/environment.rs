//! Per-map modifiers: periodic steering reversal and wind.

use glam::Vec2;
use rand::Rng;

use crate::config::{Config, MapId};
use crate::resources::GameRng;

/// Steering inversion that flips every `interval` seconds of map time
#[derive(Debug, Clone)]
pub struct ReverseState {
    reversed: bool,
    map_start: f32,
    interval: f32,
    anchored_map: Option<MapId>,
}

impl ReverseState {
    pub fn new(interval: f32) -> Self {
        Self {
            reversed: false,
            map_start: 0.0,
            interval,
            anchored_map: None,
        }
    }

    /// Re-anchor at `now` and clear the flag
    pub fn reset(&mut self, now: f32, map: Option<&MapId>) {
        self.reversed = false;
        self.map_start = now;
        self.anchored_map = map.cloned();
    }

    /// Parity of whole intervals elapsed since the map started
    pub fn reversed_at(&self, now: f32) -> bool {
        if self.interval <= 0.0 {
            return false;
        }
        let elapsed = (now - self.map_start).max(0.0);
        let intervals = (elapsed / self.interval).floor() as u64;
        intervals % 2 == 1
    }

    /// Recompute the flag. Returns `true` only on a false to true transition.
    pub fn tick(&mut self, now: f32, map: Option<&MapId>) -> bool {
        if map != self.anchored_map.as_ref() {
            log::debug!("Map changed, re-anchoring auto-reverse at {now:.2}");
            self.reset(now, map);
            return false;
        }

        let was = self.reversed;
        self.reversed = self.reversed_at(now);
        if self.reversed && !was {
            log::info!("Steering reversed");
        }
        self.reversed && !was
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Multiplier for steering and dash direction
    pub fn sign(&self) -> f32 {
        if self.reversed {
            -1.0
        } else {
            1.0
        }
    }

    pub fn map_start(&self) -> f32 {
        self.map_start
    }
}

/// cos(45°) to three places
const FULL_STRENGTH_DOT: f32 = 0.707;

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Wind for the current map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindState {
    pub direction: Vec2,
    pub strength: f32,
    compass: usize,
}

impl WindState {
    pub fn calm() -> Self {
        Self {
            direction: Vec2::Y,
            strength: 0.0,
            compass: 0,
        }
    }

    /// Wind from compass point `index` (0 = N, clockwise in 45 degree steps)
    pub fn from_compass(index: usize, strength: f32) -> Self {
        let index = index % COMPASS.len();
        let angle = (index as f32 * 45.0).to_radians();
        Self {
            direction: Vec2::new(angle.sin(), angle.cos()),
            strength,
            compass: index,
        }
    }

    pub fn generate(rng: &mut GameRng, max_strength: f32) -> Self {
        let index = rng.0.gen_range(0..COMPASS.len());
        let strength = rng.0.gen_range(1.0..=max_strength.max(1.0));
        let wind = Self::from_compass(index, strength);
        log::info!("{}", wind.info());
        wind
    }

    /// Speed change for a jet flying along `heading`
    pub fn effect(&self, heading: Vec2) -> f32 {
        let dot = heading.normalize_or_zero().dot(self.direction);
        if dot >= FULL_STRENGTH_DOT {
            self.strength
        } else if dot >= 0.0 {
            self.strength * 0.5
        } else {
            -self.strength * 0.5
        }
    }

    pub fn compass_label(&self) -> &'static str {
        COMPASS[self.compass]
    }

    pub fn info(&self) -> String {
        format!("Wind: {} {:.1}", self.compass_label(), self.strength)
    }
}

impl Default for WindState {
    fn default() -> Self {
        Self::calm()
    }
}

/// Both modifiers together
#[derive(Debug, Clone)]
pub struct Environment {
    pub reverse: ReverseState,
    pub wind: WindState,
}

impl Environment {
    pub fn new(config: &Config) -> Self {
        Self {
            reverse: ReverseState::new(config.reverse_interval),
            wind: WindState::calm(),
        }
    }

    /// Fresh wind and an un-reversed clock for a new map
    pub fn begin_map(&mut self, now: f32, map: Option<&MapId>, rng: &mut GameRng, config: &Config) {
        self.reverse.reset(now, map);
        self.wind = WindState::generate(rng, config.max_wind_strength);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_parity() {
        let map = MapId::new("Map1");
        let mut reverse = ReverseState::new(20.0);
        reverse.reset(100.0, Some(&map));

        assert!(!reverse.reversed_at(100.0));
        assert!(!reverse.reversed_at(119.9));
        assert!(reverse.reversed_at(120.0), "Flips at the first boundary");
        assert!(reverse.reversed_at(139.9));
        assert!(!reverse.reversed_at(140.0));
        assert!(reverse.reversed_at(165.0));
    }

    #[test]
    fn test_reverse_notifies_only_on_rising_edge() {
        let map = MapId::new("Map1");
        let mut reverse = ReverseState::new(20.0);
        reverse.reset(0.0, Some(&map));

        assert!(!reverse.tick(10.0, Some(&map)));
        assert!(reverse.tick(20.0, Some(&map)));
        assert!(!reverse.tick(25.0, Some(&map)), "Stays reversed silently");
        assert!(!reverse.tick(40.0, Some(&map)), "Falling edge is silent");
        assert!(!reverse.is_reversed());
        assert!(reverse.tick(60.0, Some(&map)));
        assert_eq!(reverse.sign(), -1.0);
    }

    #[test]
    fn test_reverse_reanchors_on_map_change() {
        let first = MapId::new("Map1");
        let second = MapId::new("Map2");
        let mut reverse = ReverseState::new(20.0);
        reverse.reset(0.0, Some(&first));
        reverse.tick(25.0, Some(&first));
        assert!(reverse.is_reversed());

        assert!(!reverse.tick(30.0, Some(&second)));
        assert!(!reverse.is_reversed());
        assert_eq!(reverse.map_start(), 30.0);
        assert!(reverse.tick(50.0, Some(&second)));
    }

    #[test]
    fn test_wind_effect_bands() {
        let wind = WindState::from_compass(0, 4.0);
        assert_eq!(wind.effect(Vec2::Y), 4.0, "With the wind");
        assert_eq!(wind.effect(Vec2::new(1.0, 1.0)), 4.0, "45 degrees is full strength");
        assert_eq!(wind.effect(Vec2::new(1.0, 0.5)), 2.0);
        assert_eq!(wind.effect(Vec2::X), 2.0, "Crosswind counts as half");
        assert_eq!(wind.effect(Vec2::new(0.3, -1.0)), -2.0);
        assert_eq!(wind.effect(Vec2::NEG_Y), -2.0);
    }

    #[test]
    fn test_wind_compass() {
        let wind = WindState::from_compass(3, 2.5);
        assert_eq!(wind.compass_label(), "SE");
        assert!((wind.direction - Vec2::new(1.0, -1.0).normalize()).length() < 1e-5);
        assert_eq!(wind.info(), "Wind: SE 2.5");
    }

    #[test]
    fn test_generated_wind_in_range() {
        let mut rng = GameRng::new(9);
        for _ in 0..50 {
            let wind = WindState::generate(&mut rng, 5.0);
            assert!((1.0..=5.0).contains(&wind.strength));
            assert!((wind.direction.length() - 1.0).abs() < 1e-5);
        }
    }
}
