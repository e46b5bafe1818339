/// Game tuning parameters for the dogfight
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Jet
    pub const JET_SPEED: f32 = 2.0;
    pub const JET_RADIUS: f32 = 0.35;
    pub const JET_TURN_DEG: f32 = 20.0;
    pub const FIRE_POINT_OFFSET: f32 = 0.5;

    // Dash
    pub const DASH_SPEED: f32 = 8.0;
    pub const DASH_DURATION: f32 = 0.2;
    pub const DOUBLE_TAP_WINDOW: f32 = 0.3;
    pub const DASH_ARC_DEG: f32 = 45.0;
    pub const DASH_ARC_INTENSITY: f32 = 1.0;
    pub const DASH_ROTATION_STEPS: u8 = 2;

    // Basic weapon
    pub const BASIC_BULLET_SPEED: f32 = 15.0;
    pub const BASIC_FIRE_DELAY: f32 = 0.08;
    pub const BASIC_POOL_PER_PLAYER: usize = 3;
    pub const BASIC_LIFETIME: f32 = 5.0;
    pub const BASIC_OWNER_EXEMPTION: f32 = 0.15;
    pub const BASIC_RADIUS: f32 = 0.1;

    // Scatter shot
    pub const SCATTER_COUNT: usize = 12;
    pub const SCATTER_SPEED: f32 = 10.0;
    pub const SCATTER_LIFETIME: f32 = 3.0;
    pub const SCATTER_OWNER_EXEMPTION: f32 = 0.1;
    pub const SCATTER_RADIUS: f32 = 0.1;

    // Saber
    pub const SABER_HP: u8 = 2;
    pub const SABER_SPEED_MULTIPLIER: f32 = 1.5;
    pub const SABER_OFFSET: f32 = 0.45;
    pub const SABER_RADIUS: f32 = 0.25;
    pub const SABER_TILE_COST: u8 = 1;
    pub const SABER_JET_COST: u8 = 2;

    // Shield
    pub const SHIELD_BLOCKS: u8 = 1;
    pub const SHIELD_RADIUS: f32 = 0.6;

    // Turret
    pub const TURRET_POOL_SIZE: usize = 10;
    pub const TURRET_ROTATION_DEG: f32 = 60.0;
    pub const TURRET_FIRE_RATE: f32 = 2.0;
    pub const TURRET_BULLET_SPEED: f32 = 8.0;
    pub const TURRET_LIFETIME: f32 = 8.0;
    pub const TURRET_FIRE_OFFSET: f32 = 0.5;
    pub const TURRET_BULLET_RADIUS: f32 = 0.15;

    // Terrain
    pub const TILE_SEARCH_OFFSET: f32 = 0.2;

    // Environment
    pub const REVERSE_INTERVAL: f32 = 20.0;
    pub const MAX_WIND_STRENGTH: f32 = 5.0;

    // Power-ups
    pub const POWER_UP_INTERVAL: f32 = 10.0;
    pub const MAX_POWER_UPS: usize = 5;
    pub const POWER_UP_RADIUS: f32 = 0.3;
    pub const POWER_UP_SPAWN_ATTEMPTS: usize = 20;

    // Score
    pub const WIN_SCORE: u32 = 5;
    pub const SHIELD_SUPPORT_THRESHOLD: u32 = 3;

    // Physics
    pub const FIXED_DT: f32 = 1.0 / 60.0;
    pub const MAX_DT: f32 = 0.1;
}
