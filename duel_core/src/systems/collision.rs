//! Contact detection and the ownership rules that decide what a hit means.

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::*;
use crate::map::Arena;
use crate::match_state::MatchState;
use crate::params::Params;
use crate::pool::ProjectilePools;
use crate::resources::*;
use crate::terrain::{clear_tile_near, TileSearch};
use crate::weapons::{absorb_with_shield, damage_saber};

fn overlaps(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    (a - b).length_squared() <= r * r
}

/// Circle overlap pass for everything the core moves itself. Shield contacts for a
/// projectile are queued ahead of jet contacts so a shield gets to block first.
pub fn detect_contacts(world: &World, arena: &Arena, contacts: &mut ContactQueue) {
    // Collect data without holding borrows (deterministic: sort by entity ID)
    let mut projectiles: Vec<(Entity, Projectile, Vec2)> = world
        .query::<(&Projectile, &Transform2D)>()
        .iter()
        .filter(|(_, (p, _))| p.active)
        .map(|(e, (p, t))| (e, *p, t.pos))
        .collect();
    projectiles.sort_by_key(|(e, _, _)| e.id());

    let mut jets: Vec<(Entity, PlayerId, Vec2)> = world
        .query::<(&Jet, &Transform2D)>()
        .iter()
        .map(|(e, (j, t))| (e, j.id, t.pos))
        .collect();
    jets.sort_by_key(|(e, _, _)| e.id());

    let mut hitboxes: Vec<(Entity, Hitbox, Vec2)> = world
        .query::<(&Hitbox, &Transform2D)>()
        .iter()
        .filter(|(_, (h, _))| h.active)
        .map(|(e, (h, t))| (e, *h, t.pos))
        .collect();
    hitboxes.sort_by_key(|(e, _, _)| e.id());

    for (i, &(e, projectile, pos)) in projectiles.iter().enumerate() {
        let r = projectile.radius;

        for &(h, hitbox, hpos) in &hitboxes {
            if hitbox.kind == HitboxKind::Shield && overlaps(pos, r, hpos, hitbox.radius) {
                contacts.push(e, ContactTarget::Hitbox(h));
            }
        }

        for &(jet, _, jpos) in &jets {
            if overlaps(pos, r, jpos, Params::JET_RADIUS) {
                contacts.push(e, ContactTarget::Jet(jet));
            }
        }

        // Each pair once
        for &(other, other_p, opos) in &projectiles[i + 1..] {
            if overlaps(pos, r, opos, other_p.radius) {
                contacts.push(e, ContactTarget::Projectile(other));
            }
        }

        if arena.destructible.overlaps(pos, r) {
            contacts.push(e, ContactTarget::DestructibleTerrain);
        }
        if arena.indestructible.overlaps(pos, r) {
            contacts.push(e, ContactTarget::IndestructibleTerrain);
        }
    }

    // Sabers pass through shields and ignore projectiles
    for &(h, hitbox, hpos) in &hitboxes {
        if !hitbox.kind.is_saber() {
            continue;
        }
        for &(jet, id, jpos) in &jets {
            if id != hitbox.owner && overlaps(hpos, hitbox.radius, jpos, Params::JET_RADIUS) {
                contacts.push(h, ContactTarget::Jet(jet));
            }
        }
        if arena.destructible.overlaps(hpos, hitbox.radius) {
            contacts.push(h, ContactTarget::DestructibleTerrain);
        }
    }
}

struct Resolver<'a> {
    world: &'a mut World,
    arena: &'a mut Arena,
    score: &'a mut MatchState,
    pools: &'a mut ProjectilePools,
    events: &'a mut Events,
    now: f32,
    map_ended: bool,
}

impl Resolver<'_> {
    fn jet_id(&self, jet: Entity) -> Option<PlayerId> {
        self.world.get::<&Jet>(jet).map(|j| j.id).ok()
    }

    fn position(&self, e: Entity) -> Option<Vec2> {
        self.world.get::<&Transform2D>(e).map(|t| t.pos).ok()
    }

    fn release(&mut self, e: Entity) {
        self.pools.release(self.world, e);
    }

    fn end_map(&mut self) {
        self.map_ended = true;
        self.events.request_scene(SceneId::ScoreScreen);
    }

    fn resolve(&mut self, contact: Contact) {
        if let Ok(projectile) = self.world.get::<&Projectile>(contact.subject).map(|p| *p) {
            self.resolve_projectile(contact.subject, projectile, contact.target);
        } else if let Ok(hitbox) = self.world.get::<&Hitbox>(contact.subject).map(|h| *h) {
            self.resolve_hitbox(contact.subject, hitbox, contact.target);
        } else {
            log::debug!("Contact for unknown subject {:?}, ignoring", contact.subject);
        }
    }

    fn resolve_projectile(&mut self, e: Entity, projectile: Projectile, target: ContactTarget) {
        // Already recycled: duplicate or late contact
        if !projectile.active {
            return;
        }
        if projectile.owner == Owner::Unset {
            log::warn!("Projectile {e:?} has no owner, ignoring contact");
            return;
        }

        match target {
            ContactTarget::Jet(jet) => self.projectile_hits_jet(e, projectile, jet),
            ContactTarget::Projectile(other) => self.projectile_clash(e, projectile, other),
            ContactTarget::DestructibleTerrain => {
                let search = match projectile.kind {
                    ProjectileKind::Basic => TileSearch::Compass,
                    ProjectileKind::Scatter => TileSearch::Cardinal,
                    ProjectileKind::Turret => TileSearch::Neighborhood,
                };
                if let Some(pos) = self.position(e) {
                    let cleared = clear_tile_near(
                        self.arena.destructible.as_mut(),
                        pos,
                        search,
                        projectile.radius,
                    );
                    if cleared.is_some() {
                        self.events.play(AudioCue::TileBreak);
                    }
                }
                self.release(e);
            }
            ContactTarget::IndestructibleTerrain => self.release(e),
            ContactTarget::Hitbox(h) => {
                let Ok(hitbox) = self.world.get::<&Hitbox>(h).map(|h| *h) else {
                    return;
                };
                let hostile = projectile.owner.player() != Some(hitbox.owner);
                if hitbox.kind == HitboxKind::Shield
                    && hitbox.active
                    && hostile
                    && absorb_with_shield(self.world, self.events, hitbox.jet)
                {
                    log::info!("{}'s shield blocked a {:?} bullet", hitbox.owner, projectile.kind);
                    self.release(e);
                }
            }
            ContactTarget::Other => {}
        }
    }

    fn projectile_hits_jet(&mut self, e: Entity, projectile: Projectile, jet: Entity) {
        let Some(struck) = self.jet_id(jet) else {
            log::warn!("Struck entity {jet:?} is not a jet, ignoring");
            return;
        };

        match projectile.owner {
            Owner::Player { id, jet: owner_jet } => {
                if jet == owner_jet && projectile.is_exempt(self.now) {
                    return;
                }
                if struck != id {
                    self.score.add_score(id);
                } else {
                    self.score.subtract_score(id);
                }
                self.events.play(AudioCue::JetHit);
                self.release(e);
                self.end_map();
            }
            Owner::Turret => {
                self.score.apply_turret_penalty(struck);
                self.events.play(AudioCue::JetHit);
                self.release(e);
                self.end_map();
            }
            Owner::Unset => {}
        }
    }

    fn projectile_clash(&mut self, e: Entity, projectile: Projectile, other: Entity) {
        let Ok(other_p) = self.world.get::<&Projectile>(other).map(|p| *p) else {
            return;
        };
        if !other_p.active || other_p.owner == Owner::Unset {
            return;
        }
        let same_owner = match (projectile.owner, other_p.owner) {
            (Owner::Turret, Owner::Turret) => true,
            (a, b) => a.player().is_some() && a.player() == b.player(),
        };
        if same_owner {
            return;
        }

        log::debug!("Projectiles {e:?} and {other:?} cancelled out");
        self.release(e);
        self.release(other);
    }

    fn resolve_hitbox(&mut self, h: Entity, hitbox: Hitbox, target: ContactTarget) {
        if !hitbox.kind.is_saber() || !hitbox.active {
            return;
        }
        let saber_on = self
            .world
            .get::<&JetEffects>(hitbox.jet)
            .map(|fx| fx.saber.active)
            .unwrap_or(false);
        if !saber_on {
            return;
        }

        match target {
            ContactTarget::Jet(jet) => {
                let Some(struck) = self.jet_id(jet) else {
                    log::warn!("Saber touched {jet:?}, which is not a jet");
                    return;
                };
                if struck == hitbox.owner {
                    return;
                }
                self.score.add_score(hitbox.owner);
                self.events.play(AudioCue::JetHit);
                damage_saber(self.world, self.events, hitbox.jet, Params::SABER_JET_COST);
                self.end_map();
            }
            ContactTarget::DestructibleTerrain => {
                let Some(pos) = self.position(h) else {
                    return;
                };
                let cleared = clear_tile_near(
                    self.arena.destructible.as_mut(),
                    pos,
                    TileSearch::Cardinal,
                    hitbox.radius,
                );
                if cleared.is_some() {
                    self.events.play(AudioCue::TileBreak);
                    damage_saber(self.world, self.events, hitbox.jet, Params::SABER_TILE_COST);
                }
            }
            _ => {}
        }
    }
}

/// Apply the hit rules to every queued contact, in order. Returns `true` if a hit ended
/// the map.
pub fn resolve_contacts(
    world: &mut World,
    time: &Time,
    arena: &mut Arena,
    score: &mut MatchState,
    pools: &mut ProjectilePools,
    events: &mut Events,
    contacts: &mut ContactQueue,
) -> bool {
    let pending = contacts.drain();
    let mut resolver = Resolver {
        world,
        arena,
        score,
        pools,
        events,
        now: time.now,
        map_ended: false,
    };
    for contact in pending {
        resolver.resolve(contact);
    }
    resolver.map_ended
}
