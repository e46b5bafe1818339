use glam::Vec2;
use hecs::World;

use crate::components::{Dash, Hitbox, Jet, JetIntent, JetMotion, Transform2D, Velocity2D};
use crate::config::Config;
use crate::environment::Environment;
use crate::map::Arena;
use crate::params::Params;
use crate::resources::Time;

/// Advance an in-progress dash: apply any rotation steps that are due and end it after
/// `DASH_DURATION`
fn progress_dash(dash: &mut Dash, transform: &mut Transform2D, now: f32) -> bool {
    let steps = Params::DASH_ROTATION_STEPS.max(1);
    let step_time = Params::DASH_DURATION / steps as f32;
    let arc = (Params::DASH_ARC_DEG * Params::DASH_ARC_INTENSITY).to_radians();
    let step_angle = arc / steps as f32;

    let elapsed = now - dash.started_at;
    let due = ((elapsed / step_time).floor() as u8).saturating_add(1).min(steps);
    while dash.steps_done < due {
        transform.heading += dash.sign * step_angle;
        dash.steps_done += 1;
    }

    elapsed < Params::DASH_DURATION
}

/// Steer, dash and move every jet
pub fn update_jets(
    world: &mut World,
    time: &Time,
    arena: &Arena,
    env: &Environment,
    config: &Config,
) {
    let sign = env.reverse.sign();
    let turn = config.jet_turn_deg.to_radians();

    for (_entity, (jet, transform, motion, intent)) in
        world.query_mut::<(&Jet, &mut Transform2D, &mut JetMotion, &mut JetIntent)>()
    {
        let taps = std::mem::take(&mut intent.steer_taps);

        // Steering input is ignored mid-dash
        if motion.dash.is_none() {
            for _ in 0..taps {
                let double_tap = motion
                    .last_tap
                    .is_some_and(|t| time.now - t <= Params::DOUBLE_TAP_WINDOW);
                if double_tap {
                    motion.last_tap = None;
                    motion.dash = Some(Dash {
                        started_at: time.now,
                        sign,
                        steps_done: 0,
                    });
                    break;
                }
                transform.heading += sign * turn;
                motion.last_tap = Some(time.now);
            }
        }

        let speed = if let Some(mut dash) = motion.dash {
            let still_dashing = progress_dash(&mut dash, transform, time.now);
            motion.dash = still_dashing.then_some(dash);
            Params::DASH_SPEED
        } else {
            jet.speed * jet.speed_multiplier
        };

        let forward = transform.forward();
        let speed = (speed + env.wind.effect(forward)).max(0.0);
        let next = transform.pos + forward * speed * time.dt;
        transform.pos = arena.bounds.clamp_circle(next, Params::JET_RADIUS);
    }
}

/// Move projectiles along their velocity
pub fn move_projectiles(world: &mut World, time: &Time) {
    for (_entity, (transform, vel)) in world.query_mut::<(&mut Transform2D, &Velocity2D)>() {
        if vel.vel != Vec2::ZERO {
            transform.pos += vel.vel * time.dt;
        }
    }
}

/// Keep saber and shield volumes attached to their jets
pub fn sync_hitboxes(world: &mut World) {
    let mut hitboxes: Vec<_> = world
        .query::<&Hitbox>()
        .iter()
        .map(|(e, h)| (e, h.jet, h.offset))
        .collect();
    hitboxes.sort_by_key(|(e, _, _)| e.id());

    for (entity, jet, offset) in hitboxes {
        let Ok(anchor) = world.get::<&Transform2D>(jet).map(|t| *t) else {
            continue;
        };
        if let Ok(mut t) = world.get::<&mut Transform2D>(entity) {
            *t = Transform2D::new(anchor.local_to_world(offset), anchor.heading);
        }
    }
}

/// Drop any dash in progress (map reset)
pub fn cancel_dashes(world: &mut World) {
    for (_entity, (motion, intent)) in world.query_mut::<(&mut JetMotion, &mut JetIntent)>() {
        motion.cancel();
        *intent = JetIntent::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::PlayerId;
    use crate::config::MapId;
    use crate::environment::WindState;
    use crate::map::Aabb;

    fn setup_world() -> (World, hecs::Entity, Arena, Environment, Config) {
        let mut world = World::new();
        let config = Config::new();
        let jet = world.spawn((
            Jet::new(PlayerId::One, config.jet_speed),
            Transform2D::new(Vec2::ZERO, 0.0),
            JetMotion::default(),
            JetIntent::new(),
        ));
        let arena = Arena::open(Aabb::new(Vec2::splat(-50.0), Vec2::splat(50.0)));
        let env = Environment::new(&config);
        (world, jet, arena, env, config)
    }

    fn heading(world: &World, jet: hecs::Entity) -> f32 {
        world.get::<&Transform2D>(jet).unwrap().heading
    }

    #[test]
    fn test_jet_flies_forward() {
        let (mut world, jet, arena, env, config) = setup_world();
        update_jets(&mut world, &Time::new(0.5, 0.5), &arena, &env, &config);

        let t = *world.get::<&Transform2D>(jet).unwrap();
        assert!((t.pos - Vec2::new(0.0, 1.0)).length() < 1e-5, "speed 2 for 0.5 s");
    }

    #[test]
    fn test_single_tap_turns() {
        let (mut world, jet, arena, env, config) = setup_world();
        world.get::<&mut JetIntent>(jet).unwrap().steer_taps = 1;
        update_jets(&mut world, &Time::new(0.01, 1.0), &arena, &env, &config);

        assert!((heading(&world, jet) - 20f32.to_radians()).abs() < 1e-5);
        assert!(!world.get::<&JetMotion>(jet).unwrap().is_dashing());
    }

    #[test]
    fn test_reverse_inverts_turn() {
        let (mut world, jet, arena, mut env, config) = setup_world();
        let map = MapId::new("Map1");
        env.reverse.reset(0.0, Some(&map));
        env.reverse.tick(config.reverse_interval + 0.5, Some(&map));
        assert!(env.reverse.is_reversed());

        world.get::<&mut JetIntent>(jet).unwrap().steer_taps = 1;
        update_jets(&mut world, &Time::new(0.01, 21.0), &arena, &env, &config);
        assert!((heading(&world, jet) + 20f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn test_double_tap_dashes_along_arc() {
        let (mut world, jet, arena, env, config) = setup_world();
        world.get::<&mut JetIntent>(jet).unwrap().steer_taps = 1;
        update_jets(&mut world, &Time::new(0.01, 1.0), &arena, &env, &config);

        world.get::<&mut JetIntent>(jet).unwrap().steer_taps = 1;
        update_jets(&mut world, &Time::new(0.01, 1.1), &arena, &env, &config);
        assert!(world.get::<&JetMotion>(jet).unwrap().is_dashing());

        let mut now = 1.1;
        while now < 1.5 {
            now += 0.01;
            update_jets(&mut world, &Time::new(0.01, now), &arena, &env, &config);
        }

        assert!(!world.get::<&JetMotion>(jet).unwrap().is_dashing());
        let expected = (20.0f32 + 45.0).to_radians();
        assert!(
            (heading(&world, jet) - expected).abs() < 1e-4,
            "Tap turn plus the full dash arc"
        );
    }

    #[test]
    fn test_taps_ignored_while_dashing() {
        let (mut world, jet, arena, env, config) = setup_world();
        world.get::<&mut JetMotion>(jet).unwrap().dash = Some(Dash {
            started_at: 1.0,
            sign: 1.0,
            steps_done: 0,
        });
        world.get::<&mut JetIntent>(jet).unwrap().steer_taps = 3;
        update_jets(&mut world, &Time::new(0.01, 1.0), &arena, &env, &config);

        let half_arc = 22.5f32.to_radians();
        assert!((heading(&world, jet) - half_arc).abs() < 1e-5);
        assert_eq!(world.get::<&JetIntent>(jet).unwrap().steer_taps, 0);
    }

    #[test]
    fn test_head_wind_cannot_push_backwards() {
        let (mut world, jet, arena, mut env, config) = setup_world();
        env.wind = WindState::from_compass(4, 10.0);
        update_jets(&mut world, &Time::new(0.5, 0.5), &arena, &env, &config);
        assert_eq!(world.get::<&Transform2D>(jet).unwrap().pos, Vec2::ZERO);
    }

    #[test]
    fn test_tail_wind_adds_speed() {
        let (mut world, jet, arena, mut env, config) = setup_world();
        env.wind = WindState::from_compass(0, 2.0);
        update_jets(&mut world, &Time::new(0.5, 0.5), &arena, &env, &config);
        let pos = world.get::<&Transform2D>(jet).unwrap().pos;
        assert!((pos.y - 2.0).abs() < 1e-5, "(2 + 2) * 0.5");
    }

    #[test]
    fn test_sync_hitboxes_follows_jet() {
        let (mut world, jet, _arena, _env, _config) = setup_world();
        world.get::<&mut Transform2D>(jet).unwrap().pos = Vec2::new(3.0, 4.0);
        let hitbox = world.spawn((
            Hitbox {
                jet,
                owner: PlayerId::One,
                kind: crate::components::HitboxKind::SaberRight,
                offset: Vec2::new(0.5, 0.0),
                radius: 0.25,
                active: true,
            },
            Transform2D::default(),
        ));

        sync_hitboxes(&mut world);
        let t = *world.get::<&Transform2D>(hitbox).unwrap();
        assert!((t.pos - Vec2::new(3.5, 4.0)).length() < 1e-5);
    }
}
