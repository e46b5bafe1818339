use glam::Vec2;
use hecs::Entity;
use std::fmt;

use crate::weapons::WeaponKind;

/// One of the two seats in a hot-seat match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    /// 1 or 2, as shown to players
    pub fn number(self) -> u8 {
        match self {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(PlayerId::One),
            2 => Some(PlayerId::Two),
            _ => None,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    /// Diagnostic name stamped on projectiles
    pub fn jet_name(self) -> &'static str {
        match self {
            PlayerId::One => "P1_Jet",
            PlayerId::Two => "P2_Jet",
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.number())
    }
}

/// Position and heading. Heading is in radians, 0 faces +Y, positive turns counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub pos: Vec2,
    pub heading: f32,
}

impl Transform2D {
    pub fn new(pos: Vec2, heading: f32) -> Self {
        Self { pos, heading }
    }

    pub fn forward(&self) -> Vec2 {
        Vec2::new(-self.heading.sin(), self.heading.cos())
    }

    /// Map an offset in the local frame (x = right, y = forward) into world space
    pub fn local_to_world(&self, offset: Vec2) -> Vec2 {
        self.pos + Vec2::from_angle(self.heading).rotate(offset)
    }

    /// Heading that points from `from` toward `target`
    pub fn heading_towards(from: Vec2, target: Vec2) -> f32 {
        let dir = target - from;
        if dir.length_squared() <= f32::EPSILON {
            return 0.0;
        }
        (-dir.x).atan2(dir.y)
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity2D {
    pub vel: Vec2,
}

impl Velocity2D {
    pub fn new(vel: Vec2) -> Self {
        Self { vel }
    }
}

/// Player ship
#[derive(Debug, Clone, Copy)]
pub struct Jet {
    pub id: PlayerId,
    pub speed: f32,
    /// Saber boost; 1.0 when no boost is applied
    pub speed_multiplier: f32,
}

impl Jet {
    pub fn new(id: PlayerId, speed: f32) -> Self {
        Self {
            id,
            speed,
            speed_multiplier: 1.0,
        }
    }

    pub fn reset_speed_boost(&mut self) {
        self.speed_multiplier = 1.0;
    }
}

/// Tap/dash bookkeeping for a jet
#[derive(Debug, Clone, Copy, Default)]
pub struct JetMotion {
    pub last_tap: Option<f32>,
    pub dash: Option<Dash>,
}

impl JetMotion {
    pub fn is_dashing(&self) -> bool {
        self.dash.is_some()
    }

    pub fn cancel(&mut self) {
        self.last_tap = None;
        self.dash = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dash {
    pub started_at: f32,
    /// -1.0 while steering is reversed
    pub sign: f32,
    pub steps_done: u8,
}

/// Pending player commands, consumed by the movement and combat systems
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JetIntent {
    pub steer_taps: u8,
    pub fire: bool,
}

impl JetIntent {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Owner {
    /// Pooled projectiles carry no owner
    #[default]
    Unset,
    Player { id: PlayerId, jet: Entity },
    Turret,
}

impl Owner {
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Owner::Player { id, .. } => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    Basic,
    Scatter,
    Turret,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub owner: Owner,
    pub owner_name: &'static str,
    pub spawned_at: f32,
    pub expires_at: f32,
    pub exempt_until: f32,
    pub radius: f32,
    pub active: bool,
}

impl Projectile {
    /// Inactive projectile waiting in a pool
    pub fn pooled(kind: ProjectileKind, radius: f32) -> Self {
        Self {
            kind,
            owner: Owner::Unset,
            owner_name: "",
            spawned_at: 0.0,
            expires_at: 0.0,
            exempt_until: 0.0,
            radius,
            active: false,
        }
    }

    /// Stamp owner and timers; `lifetime` and `exemption` are durations from `now`
    pub fn activate(&mut self, owner: Owner, now: f32, lifetime: f32, exemption: f32) {
        self.owner = owner;
        self.owner_name = owner.player().map(PlayerId::jet_name).unwrap_or("Turret");
        self.spawned_at = now;
        self.expires_at = now + lifetime;
        self.exempt_until = now + exemption;
        self.active = true;
    }

    pub fn clear(&mut self) {
        self.owner = Owner::Unset;
        self.owner_name = "";
        self.active = false;
    }

    pub fn is_expired(&self, now: f32) -> bool {
        now >= self.expires_at
    }

    pub fn is_exempt(&self, now: f32) -> bool {
        now < self.exempt_until
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitboxKind {
    SaberLeft,
    SaberRight,
    Shield,
}

impl HitboxKind {
    pub fn is_saber(self) -> bool {
        matches!(self, HitboxKind::SaberLeft | HitboxKind::SaberRight)
    }
}

/// Melee or blocking volume attached to a jet. The component links the hitbox entity to
/// the effect that owns it.
#[derive(Debug, Clone, Copy)]
pub struct Hitbox {
    pub jet: Entity,
    pub owner: PlayerId,
    pub kind: HitboxKind,
    /// Offset in the jet's local frame
    pub offset: Vec2,
    pub radius: f32,
    pub active: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SaberEffect {
    pub hp: u8,
    pub active: bool,
    pub left: Entity,
    pub right: Entity,
}

#[derive(Debug, Clone, Copy)]
pub struct ShieldEffect {
    pub blocks_left: u8,
    pub active: bool,
    pub hitbox: Entity,
}

/// Physical effects a jet can carry independent of its equipped weapon
#[derive(Debug, Clone, Copy)]
pub struct JetEffects {
    pub saber: SaberEffect,
    pub shield: ShieldEffect,
}

/// Rotating hazard gun. Heading lives on the turret's `Transform2D`.
#[derive(Debug, Clone, Copy)]
pub struct Turret {
    /// Radians per second
    pub rotation_speed: f32,
    pub fire_interval: f32,
    pub last_fire: f32,
    pub bullet_speed: f32,
}

/// Weapon power-up lying in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pickup {
    pub kind: WeaponKind,
}
