pub mod components;
pub mod config;
pub mod environment;
pub mod error;
pub mod host;
pub mod map;
pub mod match_state;
pub mod params;
pub mod pool;
pub mod resources;
pub mod session;
pub mod systems;
pub mod terrain;
pub mod weapons;

pub use components::*;
pub use config::*;
pub use environment::{Environment, ReverseState, WindState};
pub use error::CoreError;
pub use host::*;
pub use map::*;
pub use match_state::{MatchState, PlayerScore, ScorePresentation};
pub use params::*;
pub use pool::{EntityPool, Overflow, ProjectilePools};
pub use resources::*;
pub use session::{Advance, Phase, Session};
pub use systems::PowerUpSpawner;
pub use terrain::{TerrainGrid, TileGrid, TileSearch};
pub use weapons::{Loadout, Weapon, WeaponKind};

use glam::Vec2;
use hecs::{Entity, World};
use systems::*;

/// Run the deterministic dogfight simulation for one frame. Returns `true` if a hit ended
/// the map; the remaining micro-steps of the frame are skipped in that case.
///
/// Events accumulate until the host dispatches them.
#[allow(clippy::too_many_arguments)]
pub fn step(
    world: &mut World,
    time: &mut Time,
    arena: &mut Arena,
    config: &Config,
    match_state: &mut MatchState,
    env: &mut Environment,
    pools: &mut ProjectilePools,
    spawner: &mut PowerUpSpawner,
    events: &mut Events,
    inputs: &mut InputQueue,
    contacts: &mut ContactQueue,
    rng: &mut GameRng,
) -> bool {
    // Clamp dt to prevent large jumps
    let clamped_dt = time.dt.min(Params::MAX_DT);
    let mut map_ended = false;

    // Fixed micro-steps for stable physics
    let mut remaining_dt = clamped_dt;
    while remaining_dt > 0.0 {
        let step_dt = remaining_dt.min(Params::FIXED_DT);
        remaining_dt -= step_dt;

        let step_time = Time {
            dt: step_dt,
            now: time.now + (clamped_dt - remaining_dt),
        };

        // 1. Auto-reverse
        if env
            .reverse
            .tick(step_time.now, match_state.current_map.as_ref())
        {
            events.reverse_started = true;
        }

        // 2. Ingest inputs (apply to jet intents)
        ingest_inputs(world, inputs);

        // 3. Steer, dash and fly
        update_jets(world, &step_time, arena, env, config);
        sync_hitboxes(world);

        // 4. Weapons and hazards
        fire_weapons(world, &step_time, pools, config, events);
        update_turrets(world, &step_time, pools, config, events);

        // 5. Projectile flight and lifetimes
        move_projectiles(world, &step_time);
        expire_projectiles(world, &step_time, arena, pools);

        // 6. Power-ups
        spawn_power_ups(world, &step_time, arena, config, spawner, rng);
        collect_pickups(world, events);

        // 7. Contacts, host-reported ones first
        detect_contacts(world, arena, contacts);
        if resolve_contacts(world, &step_time, arena, match_state, pools, events, contacts) {
            map_ended = true;
            break;
        }
    }

    // Update time
    time.now += clamped_dt;
    map_ended
}

/// Helper to create a jet together with its (inactive) saber and shield hitboxes
pub fn create_jet(
    world: &mut World,
    id: PlayerId,
    transform: Transform2D,
    config: &Config,
) -> Entity {
    let jet = world.reserve_entity();

    let hitbox = |kind: HitboxKind, offset: Vec2, radius: f32| Hitbox {
        jet,
        owner: id,
        kind,
        offset,
        radius,
        active: false,
    };
    let left = world.spawn((
        hitbox(
            HitboxKind::SaberLeft,
            Vec2::new(-Params::SABER_OFFSET, 0.0),
            Params::SABER_RADIUS,
        ),
        transform,
    ));
    let right = world.spawn((
        hitbox(
            HitboxKind::SaberRight,
            Vec2::new(Params::SABER_OFFSET, 0.0),
            Params::SABER_RADIUS,
        ),
        transform,
    ));
    let shield = world.spawn((
        hitbox(HitboxKind::Shield, Vec2::ZERO, Params::SHIELD_RADIUS),
        transform,
    ));

    let effects = JetEffects {
        saber: SaberEffect {
            hp: 0,
            active: false,
            left,
            right,
        },
        shield: ShieldEffect {
            blocks_left: 0,
            active: false,
            hitbox: shield,
        },
    };

    world.spawn_at(
        jet,
        (
            Jet::new(id, config.jet_speed),
            transform,
            JetMotion::default(),
            JetIntent::new(),
            Loadout::new(),
            effects,
        ),
    );
    jet
}

/// Helper to create a turret hazard
pub fn create_turret(world: &mut World, pos: Vec2, heading: f32) -> Entity {
    world.spawn((
        Turret {
            rotation_speed: Params::TURRET_ROTATION_DEG.to_radians(),
            fire_interval: 1.0 / Params::TURRET_FIRE_RATE,
            last_fire: 0.0,
            bullet_speed: Params::TURRET_BULLET_SPEED,
        },
        Transform2D::new(pos, heading),
    ))
}
