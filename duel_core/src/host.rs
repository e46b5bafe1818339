//! Collaborators supplied by the host engine

use std::fmt;

use glam::Vec2;
use rand::seq::SliceRandom;

use crate::components::{PlayerId, Transform2D};
use crate::error::{CoreError, Result};
use crate::resources::{AudioCue, GameRng, SceneId};

/// Loads scenes on request
pub trait SceneService {
    fn load_scene(&mut self, scene: &SceneId);
}

/// Plays sounds; never blocks the simulation
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Shows the "controls reversed" banner
pub trait ReverseIndicator {
    fn show_reversed(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnMode {
    Fixed,
    Random,
}

impl SpawnMode {
    pub fn from_fixed(fixed: bool) -> Self {
        if fixed {
            SpawnMode::Fixed
        } else {
            SpawnMode::Random
        }
    }
}

/// Places the two jets at map start
pub trait SpawnPointProvider {
    /// One transform per player, in `PlayerId::ALL` order
    fn placements(&mut self, mode: SpawnMode, rng: &mut GameRng) -> Result<[Transform2D; 2]>;
}

/// Spawn points of a map, with jets facing `centre`
#[derive(Debug, Clone)]
pub struct SpawnPoints {
    pub points: Vec<Vec2>,
    pub centre: Vec2,
}

impl SpawnPoints {
    pub fn new(points: Vec<Vec2>, centre: Vec2) -> Self {
        Self { points, centre }
    }

    fn facing_centre(&self, pos: Vec2) -> Transform2D {
        Transform2D::new(pos, Transform2D::heading_towards(pos, self.centre))
    }
}

impl SpawnPointProvider for SpawnPoints {
    fn placements(&mut self, mode: SpawnMode, rng: &mut GameRng) -> Result<[Transform2D; 2]> {
        let (a, b) = match mode {
            SpawnMode::Fixed => {
                // Opposite corners
                let (Some(a), Some(b)) = (self.points.first(), self.points.get(2)) else {
                    return Err(CoreError::NotEnoughSpawnPoints(self.points.len().min(2)));
                };
                (*a, *b)
            }
            SpawnMode::Random => {
                if self.points.len() < 2 {
                    return Err(CoreError::NotEnoughSpawnPoints(self.points.len()));
                }
                let mut picked: Vec<Vec2> = self
                    .points
                    .choose_multiple(&mut rng.0, 2)
                    .copied()
                    .collect();
                picked.shuffle(&mut rng.0);
                (picked[0], picked[1])
            }
        };
        Ok([self.facing_centre(a), self.facing_centre(b)])
    }
}

/// Appearance chosen for a player on the skin screen
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SkinId(pub String);

impl fmt::Display for SkinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only view of skin selection
pub trait SkinStore {
    fn current_skin(&self, player: PlayerId) -> SkinId;
}

/// What the winner screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerDisplay {
    pub winner: PlayerId,
    pub skin: SkinId,
    pub score: u32,
}

impl WinnerDisplay {
    pub fn new(winner: PlayerId, score: u32, skins: &dyn SkinStore) -> Self {
        Self {
            winner,
            skin: skins.current_skin(winner),
            score,
        }
    }

    pub fn title(&self) -> String {
        format!("Player {} wins!", self.winner.number())
    }
}
