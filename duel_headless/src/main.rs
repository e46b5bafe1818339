use anyhow::{Context, Result};
use duel_core::*;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

const FRAME: f32 = 1.0 / 60.0;
const MAX_FRAMES: u32 = 60 * 60 * 20;
const SCORE_SCREEN_FRAMES: u32 = 90;

/// Engine stand-ins: scene loads and the reverse banner only get logged
struct SceneLog;

impl SceneService for SceneLog {
    fn load_scene(&mut self, scene: &SceneId) {
        log::info!("load scene {scene:?}");
    }
}

impl ReverseIndicator for SceneLog {
    fn show_reversed(&mut self) {
        log::info!("controls reversed");
    }
}

#[derive(Default)]
struct CueCounter(HashMap<AudioCue, u32>);

impl AudioSink for CueCounter {
    fn play(&mut self, cue: AudioCue) {
        *self.0.entry(cue).or_default() += 1;
    }
}

struct DefaultSkins;

impl SkinStore for DefaultSkins {
    fn current_skin(&self, player: PlayerId) -> SkinId {
        SkinId(format!("default-{}", player.number()))
    }
}

/// Turns until the opponent is roughly ahead, then shoots
struct Bot {
    id: PlayerId,
    rng: StdRng,
    last_tap: u32,
}

impl Bot {
    fn new(id: PlayerId, seed: u64) -> Self {
        Self {
            id,
            rng: StdRng::seed_from_u64(seed ^ u64::from(id.number())),
            last_tap: 0,
        }
    }

    fn think(&mut self, session: &Session, frame: u32) -> Option<JetInput> {
        let world = &session.world;
        let me = *world.get::<&Transform2D>(session.jet(self.id)).ok()?;
        let them = world
            .get::<&Transform2D>(session.jet(self.id.opponent()))
            .ok()?
            .pos;

        let to_target = (them - me.pos).normalize_or_zero();
        if me.forward().dot(to_target) > 0.95 || self.rng.gen_bool(0.02) {
            return Some(JetInput::fire());
        }

        // Single taps only; a quick second tap would dash
        if frame - self.last_tap > 25 && to_target != Vec2::ZERO {
            self.last_tap = frame;
            return Some(JetInput::steer());
        }
        None
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u64>()
            .with_context(|| format!("seed must be an integer, got '{arg}'"))?,
        None => 1,
    };

    let mut config = Config::new();
    config.settings.starting_power_ups = true;
    config.settings.shield_support = true;

    let mut session = Session::new(config, seed).context("invalid match config")?;
    let mut scenes = SceneLog;
    let mut indicator = SceneLog;
    let mut cues = CueCounter::default();
    let mut bots = PlayerId::ALL.map(|id| Bot::new(id, seed));

    session.new_match();
    let mut waited = 0;

    for frame in 0..MAX_FRAMES {
        session.dispatch(&mut scenes, &mut cues, &mut indicator);

        match session.phase() {
            Phase::Loading => {
                let arena = Arena::test_arena();
                let mut spawns = SpawnPoints::new(arena.spawn_points.clone(), arena.center());
                session.begin_map(arena, &mut spawns)?;
            }
            Phase::Playing => {
                for bot in &mut bots {
                    if let Some(input) = bot.think(&session, frame) {
                        session.push_input(bot.id, input);
                    }
                }
                session.tick(FRAME);
                waited = 0;
            }
            Phase::ScoreScreen => {
                waited += 1;
                if waited < SCORE_SCREEN_FRAMES {
                    continue;
                }
                if let Some(Advance::Winner(display)) = session.advance(&DefaultSkins) {
                    log::info!("{} ({}) after {frame} frames", display.title(), display.skin);
                }
            }
            Phase::WinnerScreen | Phase::MainMenu => break,
        }
    }
    session.dispatch(&mut scenes, &mut cues, &mut indicator);

    log::info!(
        "Final score P1 {} - P2 {}",
        session.match_state.score(PlayerId::One),
        session.match_state.score(PlayerId::Two),
    );
    let mut counts: Vec<_> = cues.0.into_iter().collect();
    counts.sort_by_key(|(_, n)| std::cmp::Reverse(*n));
    for (cue, n) in counts {
        log::debug!("{cue:?}: {n}");
    }
    Ok(())
}
