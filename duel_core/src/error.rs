use thiserror::Error;

use crate::components::PlayerId;
use crate::weapons::WeaponKind;

/// Everything that can go wrong inside the core. None of these are fatal: systems log them
/// and move on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("{0} has no free projectile in its pool")]
    PoolExhausted(PlayerId),

    #[error("weapon still cooling down ({remaining:.3}s left)")]
    Cooldown { remaining: f32 },

    #[error("{0:?} has already been used")]
    WeaponExhausted(WeaponKind),

    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("spawn provider returned {0} usable points, need at least 2")]
    NotEnoughSpawnPoints(usize),

    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, CoreError>;
