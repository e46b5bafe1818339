//! Weapon state machines and the equip protocol.
//!
//! Every jet carries a [`Loadout`]: the basic gun, which is always there, and at most one
//! special weapon. Specials are single-use. Once one fires the jet falls back to the basic
//! gun, while any physical effect it started (saber, shield) keeps running on
//! [`JetEffects`] until it depletes or is cancelled.

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{
    Hitbox, Jet, JetEffects, Owner, PlayerId, Projectile, ProjectileKind, Transform2D,
    Velocity2D,
};
use crate::config::Config;
use crate::error::{CoreError, Result};
use crate::params::Params;
use crate::pool::ProjectilePools;
use crate::resources::{AudioCue, Events};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    Basic,
    Laser,
    Mine,
    Reverse,
    Saber,
    ScatterShot,
    Shield,
}

impl WeaponKind {
    /// Kinds the power-up spawner may drop
    pub const SPAWNABLE: [WeaponKind; 5] = [
        WeaponKind::Laser,
        WeaponKind::Mine,
        WeaponKind::Saber,
        WeaponKind::ScatterShot,
        WeaponKind::Shield,
    ];

    /// Kinds handed out as random starting power-ups
    pub const STARTING: [WeaponKind; 3] = [
        WeaponKind::Saber,
        WeaponKind::ScatterShot,
        WeaponKind::Shield,
    ];

    pub fn is_single_use(self) -> bool {
        self != WeaponKind::Basic
    }
}

/// Repeating gun, rate limited by a minimum interval between shots
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BasicGun {
    last_fire: Option<f32>,
}

impl BasicGun {
    pub fn cooldown_remaining(&self, now: f32, delay: f32) -> f32 {
        self.last_fire.map_or(0.0, |t| (t + delay - now).max(0.0))
    }
}

/// Use-once state of a special weapon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Charge {
    used: bool,
}

impl Charge {
    pub fn is_used(&self) -> bool {
        self.used
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Weapon {
    Basic(BasicGun),
    Laser(Charge),
    Mine(Charge),
    Reverse(Charge),
    Saber(Charge),
    ScatterShot(Charge),
    Shield(Charge),
}

/// Jet doing the firing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shooter {
    pub jet: Entity,
    pub id: PlayerId,
}

impl Shooter {
    pub fn owner(&self) -> Owner {
        Owner::Player {
            id: self.id,
            jet: self.jet,
        }
    }
}

/// Everything a weapon may touch while firing
pub struct FireContext<'a> {
    pub world: &'a mut World,
    pub pools: &'a mut ProjectilePools,
    pub events: &'a mut Events,
    pub config: &'a Config,
    pub now: f32,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        let charge = Charge::default();
        match kind {
            WeaponKind::Basic => Weapon::Basic(BasicGun::default()),
            WeaponKind::Laser => Weapon::Laser(charge),
            WeaponKind::Mine => Weapon::Mine(charge),
            WeaponKind::Reverse => Weapon::Reverse(charge),
            WeaponKind::Saber => Weapon::Saber(charge),
            WeaponKind::ScatterShot => Weapon::ScatterShot(charge),
            WeaponKind::Shield => Weapon::Shield(charge),
        }
    }

    pub fn kind(&self) -> WeaponKind {
        match self {
            Weapon::Basic(_) => WeaponKind::Basic,
            Weapon::Laser(_) => WeaponKind::Laser,
            Weapon::Mine(_) => WeaponKind::Mine,
            Weapon::Reverse(_) => WeaponKind::Reverse,
            Weapon::Saber(_) => WeaponKind::Saber,
            Weapon::ScatterShot(_) => WeaponKind::ScatterShot,
            Weapon::Shield(_) => WeaponKind::Shield,
        }
    }

    fn charge_mut(&mut self) -> Option<&mut Charge> {
        match self {
            Weapon::Basic(_) => None,
            Weapon::Laser(c)
            | Weapon::Mine(c)
            | Weapon::Reverse(c)
            | Weapon::Saber(c)
            | Weapon::ScatterShot(c)
            | Weapon::Shield(c) => Some(c),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        match self {
            Weapon::Basic(_) => false,
            Weapon::Laser(c)
            | Weapon::Mine(c)
            | Weapon::Reverse(c)
            | Weapon::Saber(c)
            | Weapon::ScatterShot(c)
            | Weapon::Shield(c) => c.is_used(),
        }
    }

    pub fn can_fire(
        &self,
        now: f32,
        config: &Config,
        pools: &ProjectilePools,
        player: PlayerId,
    ) -> bool {
        match self {
            Weapon::Basic(gun) => {
                gun.cooldown_remaining(now, config.basic_fire_delay) <= 0.0
                    && pools.available(player) > 0
            }
            _ => !self.is_exhausted(),
        }
    }

    /// Run the weapon's effect once. Denials come back as errors and leave state untouched.
    pub fn fire(
        &mut self,
        ctx: &mut FireContext<'_>,
        shooter: Shooter,
        origin: Vec2,
        direction: Vec2,
    ) -> Result<()> {
        let direction = direction.normalize_or_zero();
        let kind = self.kind();

        if let Weapon::Basic(gun) = self {
            let remaining = gun.cooldown_remaining(ctx.now, ctx.config.basic_fire_delay);
            if remaining > 0.0 {
                return Err(CoreError::Cooldown { remaining });
            }
            fire_basic(ctx, shooter, origin, direction)?;
            gun.last_fire = Some(ctx.now);
            return Ok(());
        }

        let Some(charge) = self.charge_mut() else {
            return Ok(());
        };
        if charge.used {
            return Err(CoreError::WeaponExhausted(kind));
        }

        match kind {
            WeaponKind::Saber => {
                activate_saber(ctx.world, ctx.events, shooter.jet, ctx.config)?;
            }
            WeaponKind::Shield => {
                activate_shield(ctx.world, ctx.events, shooter.jet)?;
            }
            WeaponKind::ScatterShot => fire_scatter(ctx, shooter, origin, direction),
            WeaponKind::Laser | WeaponKind::Mine | WeaponKind::Reverse => {
                log::info!("{} used {kind:?}", shooter.id);
            }
            WeaponKind::Basic => {}
        }
        charge.used = true;
        Ok(())
    }

    pub fn on_equip(&self, _world: &mut World, _events: &mut Events, jet: Entity) {
        log::debug!("Equipped {:?} on {jet:?}", self.kind());
    }

    /// Saber and shield tear down their physical effect; the rest only log
    pub fn on_unequip(&self, world: &mut World, events: &mut Events, jet: Entity) {
        match self {
            Weapon::Saber(_) => deactivate_saber(world, events, jet),
            Weapon::Shield(_) => deactivate_shield(world, events, jet),
            _ => log::debug!("Unequipped {:?} from {jet:?}", self.kind()),
        }
    }
}

fn fire_basic(
    ctx: &mut FireContext<'_>,
    shooter: Shooter,
    origin: Vec2,
    direction: Vec2,
) -> Result<()> {
    let e = ctx.pools.acquire_basic(ctx.world, shooter.id)?;
    let heading = Transform2D::heading_towards(Vec2::ZERO, direction);

    if let Ok(mut projectile) = ctx.world.get::<&mut Projectile>(e) {
        projectile.activate(
            shooter.owner(),
            ctx.now,
            ctx.config.basic_lifetime,
            Params::BASIC_OWNER_EXEMPTION,
        );
    }
    if let Ok(mut transform) = ctx.world.get::<&mut Transform2D>(e) {
        *transform = Transform2D::new(origin, heading);
    }
    if let Ok(mut vel) = ctx.world.get::<&mut Velocity2D>(e) {
        vel.vel = direction * ctx.config.basic_bullet_speed;
    }

    ctx.events.play(AudioCue::BasicFire);
    Ok(())
}

fn fire_scatter(ctx: &mut FireContext<'_>, shooter: Shooter, origin: Vec2, direction: Vec2) {
    let count = ctx.config.scatter_count.max(1);
    let step = std::f32::consts::TAU / count as f32;
    let base = if direction == Vec2::ZERO {
        Vec2::Y
    } else {
        direction
    };

    for i in 0..count {
        let dir = Vec2::from_angle(step * i as f32).rotate(base);
        let mut projectile = Projectile::pooled(ProjectileKind::Scatter, Params::SCATTER_RADIUS);
        projectile.activate(
            shooter.owner(),
            ctx.now,
            ctx.config.scatter_lifetime,
            Params::SCATTER_OWNER_EXEMPTION,
        );
        ctx.world.spawn((
            projectile,
            Transform2D::new(origin, Transform2D::heading_towards(Vec2::ZERO, dir)),
            Velocity2D::new(dir * ctx.config.scatter_speed),
        ));
    }

    log::info!("{} fired a scatter shot ({count} bullets)", shooter.id);
    ctx.events.play(AudioCue::ScatterFire);
}

fn set_hitbox_active(world: &mut World, hitbox: Entity, active: bool) {
    if let Ok(mut h) = world.get::<&mut Hitbox>(hitbox) {
        h.active = active;
    }
}

fn read_effects(world: &World, jet: Entity) -> Option<JetEffects> {
    world.get::<&JetEffects>(jet).map(|e| *e).ok()
}

fn write_effects(world: &mut World, jet: Entity, effects: JetEffects) {
    if let Ok(mut e) = world.get::<&mut JetEffects>(jet) {
        *e = effects;
    }
}

pub fn activate_saber(
    world: &mut World,
    events: &mut Events,
    jet: Entity,
    config: &Config,
) -> Result<()> {
    let mut effects =
        read_effects(world, jet).ok_or(CoreError::MissingCollaborator("saber hitboxes"))?;

    effects.saber.hp = Params::SABER_HP;
    effects.saber.active = true;
    set_hitbox_active(world, effects.saber.left, true);
    set_hitbox_active(world, effects.saber.right, true);
    write_effects(world, jet, effects);

    if let Ok(mut j) = world.get::<&mut Jet>(jet) {
        j.speed_multiplier = config.saber_speed_multiplier;
        log::info!("{} saber on", j.id);
    }
    events.play(AudioCue::SaberLoopStart);
    Ok(())
}

/// Switch the saber off and drop its speed boost. No-op when already off.
pub fn deactivate_saber(world: &mut World, events: &mut Events, jet: Entity) {
    let Some(mut effects) = read_effects(world, jet) else {
        return;
    };
    if !effects.saber.active {
        return;
    }

    effects.saber.active = false;
    effects.saber.hp = 0;
    set_hitbox_active(world, effects.saber.left, false);
    set_hitbox_active(world, effects.saber.right, false);
    write_effects(world, jet, effects);

    if let Ok(mut j) = world.get::<&mut Jet>(jet) {
        j.reset_speed_boost();
        log::info!("{} saber off", j.id);
    }
    events.play(AudioCue::SaberLoopStop);
}

/// Take `cost` hit points off the saber. Returns whether it is still active.
pub fn damage_saber(world: &mut World, events: &mut Events, jet: Entity, cost: u8) -> bool {
    let Some(mut effects) = read_effects(world, jet) else {
        return false;
    };
    if !effects.saber.active {
        return false;
    }

    effects.saber.hp = effects.saber.hp.saturating_sub(cost);
    write_effects(world, jet, effects);

    if effects.saber.hp == 0 {
        deactivate_saber(world, events, jet);
        return false;
    }
    true
}

pub fn activate_shield(world: &mut World, events: &mut Events, jet: Entity) -> Result<()> {
    let mut effects =
        read_effects(world, jet).ok_or(CoreError::MissingCollaborator("shield hitbox"))?;

    effects.shield.blocks_left = Params::SHIELD_BLOCKS;
    effects.shield.active = true;
    set_hitbox_active(world, effects.shield.hitbox, true);
    write_effects(world, jet, effects);

    events.play(AudioCue::ShieldUp);
    Ok(())
}

pub fn deactivate_shield(world: &mut World, events: &mut Events, jet: Entity) {
    let Some(mut effects) = read_effects(world, jet) else {
        return;
    };
    if !effects.shield.active {
        return;
    }

    effects.shield.active = false;
    effects.shield.blocks_left = 0;
    set_hitbox_active(world, effects.shield.hitbox, false);
    write_effects(world, jet, effects);

    events.play(AudioCue::ShieldDown);
}

/// Spend one shield block. Returns `false` if the shield was not up.
pub fn absorb_with_shield(world: &mut World, events: &mut Events, jet: Entity) -> bool {
    let Some(mut effects) = read_effects(world, jet) else {
        return false;
    };
    if !effects.shield.active || effects.shield.blocks_left == 0 {
        return false;
    }

    effects.shield.blocks_left -= 1;
    write_effects(world, jet, effects);
    events.play(AudioCue::ShieldBlock);

    if effects.shield.blocks_left == 0 {
        deactivate_shield(world, events, jet);
    }
    true
}

/// Basic gun plus at most one special weapon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Loadout {
    basic: Weapon,
    special: Option<Weapon>,
}

impl Default for Loadout {
    fn default() -> Self {
        Self::new()
    }
}

impl Loadout {
    pub fn new() -> Self {
        Self {
            basic: Weapon::Basic(BasicGun::default()),
            special: None,
        }
    }

    /// The weapon that fires next
    pub fn equipped(&self) -> &Weapon {
        self.special.as_ref().unwrap_or(&self.basic)
    }

    pub fn equipped_kind(&self) -> WeaponKind {
        self.equipped().kind()
    }

    pub fn special(&self) -> Option<&Weapon> {
        self.special.as_ref()
    }
}

fn read_loadout(world: &World, jet: Entity) -> Option<Loadout> {
    world.get::<&Loadout>(jet).map(|l| *l).ok()
}

fn write_loadout(world: &mut World, jet: Entity, loadout: Loadout) {
    if let Ok(mut l) = world.get::<&mut Loadout>(jet) {
        *l = loadout;
    }
}

/// Equip `kind` on `jet`. A new special replaces (and unequips) the previous one; equipping
/// `Basic` just drops the special without running its unequip hook.
pub fn equip(world: &mut World, events: &mut Events, jet: Entity, kind: WeaponKind) {
    let Some(mut loadout) = read_loadout(world, jet) else {
        log::warn!("Cannot equip {kind:?}: {jet:?} has no loadout");
        return;
    };

    if kind == WeaponKind::Basic {
        loadout.special = None;
    } else {
        if let Some(previous) = loadout.special.take() {
            previous.on_unequip(world, events, jet);
        }
        let weapon = Weapon::new(kind);
        weapon.on_equip(world, events, jet);
        loadout.special = Some(weapon);
    }

    write_loadout(world, jet, loadout);
}

/// Fire whatever `jet` has equipped. Single-use weapons revert the jet to the basic gun
/// as soon as they fire.
pub fn fire_equipped(ctx: &mut FireContext<'_>, jet: Entity) -> Result<WeaponKind> {
    let mut loadout =
        read_loadout(ctx.world, jet).ok_or(CoreError::MissingCollaborator("jet loadout"))?;
    let (id, transform) = {
        let j = ctx
            .world
            .get::<&Jet>(jet)
            .map_err(|_| CoreError::MissingCollaborator("jet"))?;
        let t = ctx
            .world
            .get::<&Transform2D>(jet)
            .map_err(|_| CoreError::MissingCollaborator("fire point"))?;
        (j.id, *t)
    };

    let shooter = Shooter { jet, id };
    let origin = transform.local_to_world(Vec2::new(0.0, Params::FIRE_POINT_OFFSET));
    let direction = transform.forward();

    let kind = match loadout.special.as_mut() {
        Some(weapon) => {
            weapon.fire(ctx, shooter, origin, direction)?;
            let kind = weapon.kind();
            if kind.is_single_use() {
                loadout.special = None;
            }
            kind
        }
        None => {
            loadout.basic.fire(ctx, shooter, origin, direction)?;
            WeaponKind::Basic
        }
    };

    write_loadout(ctx.world, jet, loadout);
    Ok(kind)
}

/// Cancel every effect and strip the special weapon (map reset)
pub fn reset_loadout(world: &mut World, events: &mut Events, jet: Entity) {
    if let Some(loadout) = read_loadout(world, jet) {
        if let Some(special) = loadout.special {
            special.on_unequip(world, events, jet);
        }
    }
    deactivate_saber(world, events, jet);
    deactivate_shield(world, events, jet);
    write_loadout(world, jet, Loadout::new());
}
