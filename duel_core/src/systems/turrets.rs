use hecs::World;

use crate::components::*;
use crate::config::Config;
use crate::params::Params;
use crate::pool::ProjectilePools;
use crate::resources::*;

/// Rotate turrets and fire from the shared turret pool
pub fn update_turrets(
    world: &mut World,
    time: &Time,
    pools: &mut ProjectilePools,
    config: &Config,
    events: &mut Events,
) {
    // Collect turret entities (deterministic: sort by entity ID)
    let mut turrets: Vec<_> = world.query::<&Turret>().iter().map(|(e, _)| e).collect();
    turrets.sort_by_key(|e| e.id());

    for entity in turrets {
        let Ok(mut turret) = world.get::<&Turret>(entity).map(|t| *t) else {
            continue;
        };
        let Ok(mut transform) = world.get::<&Transform2D>(entity).map(|t| *t) else {
            continue;
        };

        transform.heading += turret.rotation_speed * time.dt;

        if time.now - turret.last_fire >= turret.fire_interval {
            turret.last_fire = time.now;

            let forward = transform.forward();
            if let Some(bullet) = pools.acquire_turret(world) {
                if let Ok(mut p) = world.get::<&mut Projectile>(bullet) {
                    p.activate(Owner::Turret, time.now, config.turret_lifetime, 0.0);
                }
                if let Ok(mut t) = world.get::<&mut Transform2D>(bullet) {
                    *t = Transform2D::new(
                        transform.pos + forward * Params::TURRET_FIRE_OFFSET,
                        transform.heading,
                    );
                }
                if let Ok(mut v) = world.get::<&mut Velocity2D>(bullet) {
                    v.vel = forward * turret.bullet_speed;
                }
                events.play(AudioCue::TurretFire);
            }
        }

        if let Ok(mut t) = world.get::<&mut Turret>(entity) {
            *t = turret;
        }
        if let Ok(mut t) = world.get::<&mut Transform2D>(entity) {
            *t = transform;
        }
    }
}

/// Restart every turret's fire timer (map start)
pub fn reset_turrets(world: &mut World, now: f32) {
    for (_entity, turret) in world.query_mut::<&mut Turret>() {
        turret.last_fire = now;
    }
}
