//! Recycling pools for short-lived projectiles.
//!
//! Pooled entities stay spawned in the world the whole time; activation and release only
//! rewrite component values. Whether a projectile is live is tracked by
//! [`Projectile::active`], never by queue membership.

use std::collections::{HashMap, VecDeque};

use hecs::{Entity, World};

use crate::components::{Owner, PlayerId, Projectile, ProjectileKind, Transform2D, Velocity2D};
use crate::config::Config;
use crate::error::{CoreError, Result};
use crate::params::Params;

/// What to do when a pool has no free entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Refuse the request
    Deny,
    /// Spawn a fresh entity that joins the pool once released
    Allocate,
}

/// FIFO free list of pre-spawned entities
#[derive(Debug, Clone)]
pub struct EntityPool {
    free: VecDeque<Entity>,
    capacity: usize,
    overflow: Overflow,
}

impl EntityPool {
    pub fn new(capacity: usize, overflow: Overflow) -> Self {
        Self {
            free: VecDeque::with_capacity(capacity),
            capacity,
            overflow,
        }
    }

    /// Pre-spawn `capacity` entities with `spawn`
    pub fn fill(&mut self, world: &mut World, mut spawn: impl FnMut(&mut World) -> Entity) {
        self.free.clear();
        for _ in 0..self.capacity {
            let e = spawn(world);
            self.free.push_back(e);
        }
    }

    pub fn push_free(&mut self, e: Entity) {
        self.free.push_back(e);
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn overflow(&self) -> Overflow {
        self.overflow
    }

    /// Take a free entity. An empty pool spawns a new one only under [`Overflow::Allocate`].
    pub fn acquire(
        &mut self,
        world: &mut World,
        spawn: impl FnOnce(&mut World) -> Entity,
    ) -> Option<Entity> {
        if let Some(e) = self.free.pop_front() {
            return Some(e);
        }
        match self.overflow {
            Overflow::Deny => None,
            Overflow::Allocate => {
                log::debug!("Pool of {} drained, allocating", self.capacity);
                Some(spawn(world))
            }
        }
    }
}

fn spawn_pooled(world: &mut World, kind: ProjectileKind, radius: f32) -> Entity {
    world.spawn((
        Projectile::pooled(kind, radius),
        Transform2D::default(),
        Velocity2D::default(),
    ))
}

/// Per-player basic bullet pools plus the shared turret pool
#[derive(Debug, Clone)]
pub struct ProjectilePools {
    basic: HashMap<PlayerId, EntityPool>,
    turret: EntityPool,
}

impl ProjectilePools {
    pub fn new(world: &mut World, config: &Config) -> Self {
        let mut basic = HashMap::new();
        for player in PlayerId::ALL {
            let mut pool = EntityPool::new(config.basic_pool_per_player, Overflow::Deny);
            pool.fill(world, |w| {
                spawn_pooled(w, ProjectileKind::Basic, Params::BASIC_RADIUS)
            });
            basic.insert(player, pool);
        }

        let mut turret = EntityPool::new(config.turret_pool_size, Overflow::Allocate);
        turret.fill(world, |w| {
            spawn_pooled(w, ProjectileKind::Turret, Params::TURRET_BULLET_RADIUS)
        });

        log::debug!(
            "Projectile pools ready: {} basic per player, {} turret",
            config.basic_pool_per_player,
            config.turret_pool_size
        );

        Self { basic, turret }
    }

    /// Free basic bullets for `player`
    pub fn available(&self, player: PlayerId) -> usize {
        self.basic.get(&player).map_or(0, EntityPool::available)
    }

    pub fn turret_available(&self) -> usize {
        self.turret.available()
    }

    /// Take a basic bullet from `player`'s pool
    pub fn acquire_basic(&mut self, world: &mut World, player: PlayerId) -> Result<Entity> {
        self.basic
            .get_mut(&player)
            .and_then(|pool| {
                pool.acquire(world, |w| {
                    spawn_pooled(w, ProjectileKind::Basic, Params::BASIC_RADIUS)
                })
            })
            .ok_or(CoreError::PoolExhausted(player))
    }

    /// Take a turret bullet; the turret pool grows when drained
    pub fn acquire_turret(&mut self, world: &mut World) -> Option<Entity> {
        self.turret.acquire(world, |w| {
            spawn_pooled(w, ProjectileKind::Turret, Params::TURRET_BULLET_RADIUS)
        })
    }

    /// Return a projectile to its pool. Returns `false` when the projectile was already
    /// inactive (or gone), so a second release is a no-op.
    pub fn release(&mut self, world: &mut World, e: Entity) -> bool {
        let (kind, owner) = {
            let Ok(mut projectile) = world.get::<&mut Projectile>(e) else {
                return false;
            };
            if !projectile.active {
                return false;
            }
            let snapshot = (projectile.kind, projectile.owner);
            projectile.clear();
            snapshot
        };

        if let Ok(mut vel) = world.get::<&mut Velocity2D>(e) {
            vel.vel = glam::Vec2::ZERO;
        }

        let pool = match (kind, owner) {
            (ProjectileKind::Basic, Owner::Player { id, .. }) => self.basic.get_mut(&id),
            (ProjectileKind::Turret, _) => Some(&mut self.turret),
            _ => None,
        };

        match pool {
            Some(pool) => pool.push_free(e),
            None => {
                if kind != ProjectileKind::Scatter {
                    log::warn!("Released {kind:?} projectile with no known pool, discarding");
                }
                let _ = world.despawn(e);
            }
        }
        true
    }

    /// Release every live projectile (map reset)
    pub fn release_all(&mut self, world: &mut World) {
        let mut live: Vec<Entity> = world
            .query::<&Projectile>()
            .iter()
            .filter(|(_, p)| p.active)
            .map(|(e, _)| e)
            .collect();
        live.sort_by_key(|e| e.id());

        for e in live {
            self.release(world, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (World, ProjectilePools) {
        let mut world = World::new();
        let config = Config::new();
        let pools = ProjectilePools::new(&mut world, &config);
        (world, pools)
    }

    fn fire(world: &mut World, e: Entity, owner: Owner) {
        let mut p = world.get::<&mut Projectile>(e).unwrap();
        p.activate(owner, 0.0, 5.0, 0.15);
    }

    #[test]
    fn test_basic_pool_denies_when_exhausted() {
        let (mut world, mut pools) = setup();
        let jet = world.spawn(());
        let owner = Owner::Player {
            id: PlayerId::One,
            jet,
        };

        for _ in 0..Params::BASIC_POOL_PER_PLAYER {
            let e = pools.acquire_basic(&mut world, PlayerId::One).expect("pool has room");
            fire(&mut world, e, owner);
        }

        assert_eq!(pools.available(PlayerId::One), 0);
        assert_eq!(
            pools.acquire_basic(&mut world, PlayerId::One),
            Err(CoreError::PoolExhausted(PlayerId::One))
        );
        // Other player's pool is untouched
        assert_eq!(pools.available(PlayerId::Two), Params::BASIC_POOL_PER_PLAYER);
    }

    #[test]
    fn test_release_returns_to_owner_pool() {
        let (mut world, mut pools) = setup();
        let jet = world.spawn(());
        let e = pools.acquire_basic(&mut world, PlayerId::Two).unwrap();
        fire(
            &mut world,
            e,
            Owner::Player {
                id: PlayerId::Two,
                jet,
            },
        );
        world.get::<&mut Velocity2D>(e).unwrap().vel = glam::Vec2::new(3.0, 4.0);

        assert!(pools.release(&mut world, e));
        assert_eq!(pools.available(PlayerId::Two), Params::BASIC_POOL_PER_PLAYER);

        let p = *world.get::<&Projectile>(e).unwrap();
        assert!(!p.active);
        assert_eq!(p.owner, Owner::Unset, "Pooled projectile has no owner");
        assert_eq!(world.get::<&Velocity2D>(e).unwrap().vel, glam::Vec2::ZERO);
    }

    #[test]
    fn test_double_release_is_noop() {
        let (mut world, mut pools) = setup();
        let jet = world.spawn(());
        let e = pools.acquire_basic(&mut world, PlayerId::One).unwrap();
        fire(
            &mut world,
            e,
            Owner::Player {
                id: PlayerId::One,
                jet,
            },
        );

        assert!(pools.release(&mut world, e));
        let after_first = pools.available(PlayerId::One);
        assert!(!pools.release(&mut world, e), "Second release does nothing");
        assert_eq!(pools.available(PlayerId::One), after_first);
    }

    #[test]
    fn test_turret_pool_allocates_on_overflow() {
        let (mut world, mut pools) = setup();
        let mut taken = Vec::new();
        for _ in 0..Params::TURRET_POOL_SIZE + 3 {
            let e = pools.acquire_turret(&mut world).unwrap();
            fire(&mut world, e, Owner::Turret);
            taken.push(e);
        }
        assert_eq!(taken.len(), Params::TURRET_POOL_SIZE + 3);
        assert_eq!(pools.turret_available(), 0);

        for e in taken {
            pools.release(&mut world, e);
        }
        assert_eq!(pools.turret_available(), Params::TURRET_POOL_SIZE + 3);
    }

    #[test]
    fn test_entity_pool_follows_overflow_policy() {
        let mut world = World::new();
        let mut deny = EntityPool::new(1, Overflow::Deny);
        let mut grow = EntityPool::new(1, Overflow::Allocate);
        deny.fill(&mut world, |w| w.spawn(()));
        grow.fill(&mut world, |w| w.spawn(()));

        assert!(deny.acquire(&mut world, |w| w.spawn(())).is_some());
        assert!(deny.acquire(&mut world, |w| w.spawn(())).is_none());
        assert_eq!(world.len(), 2, "Deny never spawns");

        assert!(grow.acquire(&mut world, |w| w.spawn(())).is_some());
        let extra = grow.acquire(&mut world, |w| w.spawn(())).unwrap();
        assert_eq!(world.len(), 3);

        grow.push_free(extra);
        assert_eq!(grow.available(), 1);
        assert_eq!(grow.capacity(), 1, "Capacity is the pre-spawned count");
        assert_eq!(grow.overflow(), Overflow::Allocate);
    }

    #[test]
    fn test_unowned_basic_bullet_is_discarded() {
        let (mut world, mut pools) = setup();
        let e = pools.acquire_basic(&mut world, PlayerId::One).unwrap();
        fire(&mut world, e, Owner::Unset);

        assert!(pools.release(&mut world, e));
        assert!(!world.contains(e), "Unknown ownership discards the instance");
        assert_eq!(
            pools.available(PlayerId::One),
            Params::BASIC_POOL_PER_PLAYER - 1
        );
    }

    #[test]
    fn test_release_all_recalls_live_projectiles() {
        let (mut world, mut pools) = setup();
        let jet = world.spawn(());
        for _ in 0..2 {
            let e = pools.acquire_basic(&mut world, PlayerId::One).unwrap();
            fire(
                &mut world,
                e,
                Owner::Player {
                    id: PlayerId::One,
                    jet,
                },
            );
        }
        let t = pools.acquire_turret(&mut world).unwrap();
        fire(&mut world, t, Owner::Turret);

        pools.release_all(&mut world);

        assert_eq!(pools.available(PlayerId::One), Params::BASIC_POOL_PER_PLAYER);
        assert_eq!(pools.turret_available(), Params::TURRET_POOL_SIZE);
    }
}
