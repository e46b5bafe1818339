use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::PlayerId;
use crate::config::{MapId, MatchSettings};
use crate::resources::GameRng;
use crate::weapons::WeaponKind;

/// Score counters for one player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerScore {
    pub score: u32,
    /// Value before the latest change, for the score screen animation
    pub previous: u32,
    pub turret_penalty: bool,
}

/// How the score screen should animate a player's counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorePresentation {
    Slide { from: u32, to: u32 },
    /// Penalty taken at zero: nothing to subtract, spin the counter instead
    SpinInPlace,
    Still,
}

/// Authoritative match scores
#[derive(Debug, Clone)]
pub struct MatchState {
    players: [PlayerScore; 2],
    pub current_map: Option<MapId>,
    pub win_score: u32,
}

impl MatchState {
    pub fn new(win_score: u32) -> Self {
        Self {
            players: [PlayerScore::default(); 2],
            current_map: None,
            win_score,
        }
    }

    pub fn player(&self, id: PlayerId) -> PlayerScore {
        self.players[id.index()]
    }

    pub fn score(&self, id: PlayerId) -> u32 {
        self.player(id).score
    }

    pub fn previous(&self, id: PlayerId) -> u32 {
        self.player(id).previous
    }

    pub fn turret_penalty(&self, id: PlayerId) -> bool {
        self.player(id).turret_penalty
    }

    pub fn add_score(&mut self, id: PlayerId) {
        let p = &mut self.players[id.index()];
        p.previous = p.score;
        p.score += 1;
        log::info!("{id} scores: {} -> {}", p.previous, p.score);
    }

    /// Returns whether the score changed. Does nothing at zero.
    pub fn subtract_score(&mut self, id: PlayerId) -> bool {
        let p = &mut self.players[id.index()];
        if p.score == 0 {
            log::debug!("{id} already at zero, nothing to subtract");
            return false;
        }
        p.previous = p.score;
        p.score -= 1;
        log::info!("{id} loses a point: {} -> {}", p.previous, p.score);
        true
    }

    /// Turret hit: lose a point if there is one, and flag the penalty either way
    pub fn apply_turret_penalty(&mut self, id: PlayerId) {
        let p = &mut self.players[id.index()];
        p.previous = p.score;
        p.score = p.score.saturating_sub(1);
        p.turret_penalty = true;
        log::info!("{id} hit by a turret: {} -> {}", p.previous, p.score);
    }

    pub fn has_winner(&self) -> bool {
        self.winner().is_some()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        PlayerId::ALL
            .into_iter()
            .find(|id| self.score(*id) >= self.win_score)
    }

    /// Lead of `id` over the opponent, zero when not ahead
    pub fn lead(&self, id: PlayerId) -> u32 {
        self.score(id).saturating_sub(self.score(id.opponent()))
    }

    pub fn reset_for_new_match(&mut self) {
        self.players = [PlayerScore::default(); 2];
        self.current_map = None;
    }

    /// Start of a map: settle the animation baseline and clear penalty flags
    pub fn begin_map(&mut self) {
        for p in &mut self.players {
            p.previous = p.score;
            p.turret_penalty = false;
        }
    }

    /// Uniform pick from `rotation`; repeats are allowed
    pub fn next_map(&mut self, rng: &mut GameRng, rotation: &[MapId]) -> Option<MapId> {
        let map = rotation.choose(&mut rng.0)?.clone();
        log::info!("Next map: {map}");
        self.current_map = Some(map.clone());
        Some(map)
    }

    pub fn presentation(&self, id: PlayerId) -> ScorePresentation {
        let p = self.player(id);
        if p.score != p.previous {
            ScorePresentation::Slide {
                from: p.previous,
                to: p.score,
            }
        } else if p.turret_penalty && p.score == 0 {
            ScorePresentation::SpinInPlace
        } else {
            ScorePresentation::Still
        }
    }

    /// Weapon handed to `id` when a map starts
    pub fn starting_weapon(
        &self,
        id: PlayerId,
        settings: &MatchSettings,
        rng: &mut GameRng,
    ) -> Option<WeaponKind> {
        if settings.shield_support && self.lead(id.opponent()) >= settings.shield_support_threshold
        {
            log::info!("{id} is trailing, starting with a shield");
            return Some(WeaponKind::Shield);
        }
        if settings.power_ups && settings.starting_power_ups {
            let i = rng.0.gen_range(0..WeaponKind::STARTING.len());
            return Some(WeaponKind::STARTING[i]);
        }
        None
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new(crate::params::Params::WIN_SCORE)
    }
}
