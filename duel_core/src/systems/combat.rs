use hecs::World;

use crate::components::*;
use crate::config::Config;
use crate::map::Arena;
use crate::pool::ProjectilePools;
use crate::resources::*;
use crate::weapons::{fire_equipped, FireContext, Loadout};

/// Fire the equipped weapon of every jet that asked to
pub fn fire_weapons(
    world: &mut World,
    time: &Time,
    pools: &mut ProjectilePools,
    config: &Config,
    events: &mut Events,
) {
    // Collect jets with a fire intent (deterministic: sort by entity ID)
    let mut shooters: Vec<_> = world
        .query::<&JetIntent>()
        .iter()
        .filter(|(_, intent)| intent.fire)
        .map(|(e, _)| e)
        .collect();
    shooters.sort_by_key(|e| e.id());

    for jet in shooters {
        if let Ok(mut intent) = world.get::<&mut JetIntent>(jet) {
            intent.fire = false;
        }

        let ready = match (world.get::<&Jet>(jet), world.get::<&Loadout>(jet)) {
            (Ok(j), Ok(loadout)) => loadout.equipped().can_fire(time.now, config, pools, j.id),
            _ => false,
        };
        if !ready {
            log::debug!("{jet:?} not ready to fire");
            continue;
        }

        let mut ctx = FireContext {
            world: &mut *world,
            pools: &mut *pools,
            events: &mut *events,
            config,
            now: time.now,
        };
        // Denied shots are not errors for the caller
        if let Err(err) = fire_equipped(&mut ctx, jet) {
            log::debug!("Fire denied for {jet:?}: {err}");
        }
    }
}

/// Recycle projectiles whose lifetime ran out or that left the visible bounds
pub fn expire_projectiles(
    world: &mut World,
    time: &Time,
    arena: &Arena,
    pools: &mut ProjectilePools,
) {
    let mut expired: Vec<_> = world
        .query::<(&Projectile, &Transform2D)>()
        .iter()
        .filter(|(_, (p, t))| {
            p.active && (p.is_expired(time.now) || !arena.bounds.contains(t.pos))
        })
        .map(|(e, _)| e)
        .collect();
    expired.sort_by_key(|e| e.id());

    for e in expired {
        pools.release(world, e);
    }
}
