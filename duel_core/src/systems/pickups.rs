use glam::Vec2;
use hecs::World;
use rand::Rng;

use crate::components::*;
use crate::config::Config;
use crate::map::Arena;
use crate::params::Params;
use crate::resources::*;
use crate::weapons::{equip, WeaponKind};

/// Timer for dropping weapon power-ups into the arena
#[derive(Debug, Clone, Copy)]
pub struct PowerUpSpawner {
    pub last_spawn: f32,
}

impl PowerUpSpawner {
    pub fn new(now: f32) -> Self {
        Self { last_spawn: now }
    }

    pub fn reset(&mut self, now: f32) {
        self.last_spawn = now;
    }
}

fn find_spawn_spot(world: &World, arena: &Arena, rng: &mut GameRng) -> Option<Vec2> {
    let occupied: Vec<Vec2> = world
        .query::<&Transform2D>()
        .with::<&Jet>()
        .iter()
        .map(|(_, t)| t.pos)
        .chain(
            world
                .query::<&Transform2D>()
                .with::<&Pickup>()
                .iter()
                .map(|(_, t)| t.pos),
        )
        .collect();

    let b = arena.bounds;
    let inset = Vec2::splat(Params::POWER_UP_RADIUS);
    let (lo, hi) = (b.min + inset, (b.max - inset).max(b.min + inset));

    for _ in 0..Params::POWER_UP_SPAWN_ATTEMPTS {
        let pos = Vec2::new(
            rng.0.gen_range(lo.x..=hi.x),
            rng.0.gen_range(lo.y..=hi.y),
        );
        if arena.is_blocked(pos) {
            continue;
        }
        if occupied
            .iter()
            .any(|o| o.distance(pos) < Params::POWER_UP_RADIUS)
        {
            continue;
        }
        return Some(pos);
    }
    None
}

/// Drop a random power-up every interval while there is room
pub fn spawn_power_ups(
    world: &mut World,
    time: &Time,
    arena: &Arena,
    config: &Config,
    spawner: &mut PowerUpSpawner,
    rng: &mut GameRng,
) {
    if !config.settings.power_ups || time.now - spawner.last_spawn < config.power_up_interval {
        return;
    }
    spawner.last_spawn = time.now;

    let alive = world.query::<&Pickup>().iter().count();
    if alive >= config.max_power_ups {
        return;
    }

    let Some(pos) = find_spawn_spot(world, arena, rng) else {
        log::debug!("No free spot for a power-up this round");
        return;
    };
    let kind = WeaponKind::SPAWNABLE[rng.0.gen_range(0..WeaponKind::SPAWNABLE.len())];
    world.spawn((Pickup { kind }, Transform2D::new(pos, 0.0)));
    log::debug!("Spawned {kind:?} power-up at {pos}");
}

/// Equip power-ups touched by a jet
pub fn collect_pickups(world: &mut World, events: &mut Events) {
    // Collect pickups (deterministic: sort by entity ID)
    let mut pickups: Vec<_> = world
        .query::<(&Pickup, &Transform2D)>()
        .iter()
        .map(|(e, (p, t))| (e, p.kind, t.pos))
        .collect();
    pickups.sort_by_key(|(e, _, _)| e.id());

    let mut jets: Vec<_> = world
        .query::<(&Jet, &Transform2D)>()
        .iter()
        .map(|(e, (j, t))| (e, j.id, t.pos))
        .collect();
    jets.sort_by_key(|(e, _, _)| e.id());

    let reach = Params::JET_RADIUS + Params::POWER_UP_RADIUS;
    for (pickup, kind, pos) in pickups {
        let Some(&(jet, id, _)) = jets.iter().find(|(_, _, jpos)| jpos.distance(pos) <= reach)
        else {
            continue;
        };

        equip(world, events, jet, kind);
        let _ = world.despawn(pickup);
        events.play(AudioCue::PowerUpCollected);
        log::info!("{id} picked up {kind:?}");
    }
}

/// Remove every power-up (map reset)
pub fn clear_pickups(world: &mut World) {
    let pickups: Vec<_> = world.query::<&Pickup>().iter().map(|(e, _)| e).collect();
    for e in pickups {
        let _ = world.despawn(e);
    }
}
