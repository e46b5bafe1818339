use hecs::Entity;

use crate::components::PlayerId;
use crate::config::MapId;
use crate::host::{AudioSink, ReverseIndicator, SceneService};

/// Time resource for tracking simulation time
#[derive(Debug, Clone, Copy)]
pub struct Time {
    pub dt: f32,  // Delta time for this step
    pub now: f32, // Total elapsed time
}

impl Time {
    pub fn new(dt: f32, now: f32) -> Self {
        Self { dt, now }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self {
            dt: 0.016,
            now: 0.0,
        }
    }
}

/// Random number generator
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Scenes the core can ask the host to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneId {
    ScoreScreen,
    WinnerScreen,
    NextMap(MapId),
    MainMenu,
}

/// Fire-and-forget sound notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    BasicFire,
    ScatterFire,
    SaberLoopStart,
    SaberLoopStop,
    ShieldUp,
    ShieldBlock,
    ShieldDown,
    TileBreak,
    JetHit,
    TurretFire,
    PowerUpCollected,
}

/// Notifications buffered since the last dispatch
#[derive(Debug, Clone, Default)]
pub struct Events {
    pub audio: Vec<AudioCue>,
    /// Scene requests in order, each scene at most once
    pub scenes: Vec<SceneId>,
    pub reverse_started: bool,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.audio.clear();
        self.scenes.clear();
        self.reverse_started = false;
    }

    pub fn play(&mut self, cue: AudioCue) {
        self.audio.push(cue);
    }

    /// Returns `false` if `scene` is already the latest pending request
    pub fn request_scene(&mut self, scene: SceneId) -> bool {
        if self.scenes.last() == Some(&scene) {
            log::debug!("{scene:?} already requested");
            return false;
        }
        self.scenes.push(scene);
        true
    }

    /// Forward buffered notifications to the host and empty the buffer
    pub fn dispatch(
        &mut self,
        scenes: &mut dyn SceneService,
        audio: &mut dyn AudioSink,
        indicator: &mut dyn ReverseIndicator,
        sounds: bool,
    ) {
        if sounds {
            for cue in self.audio.drain(..) {
                audio.play(cue);
            }
        }
        if self.reverse_started {
            indicator.show_reversed();
        }
        for scene in self.scenes.drain(..) {
            scenes.load_scene(&scene);
        }
        self.clear();
    }
}

/// Discrete commands from a player for this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JetInput {
    pub steer: bool,
    pub fire: bool,
}

impl JetInput {
    pub fn steer() -> Self {
        Self {
            steer: true,
            fire: false,
        }
    }

    pub fn fire() -> Self {
        Self {
            steer: false,
            fire: true,
        }
    }
}

/// Input queue filled by the host between frames
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    pub inputs: Vec<(PlayerId, JetInput)>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    pub fn push_input(&mut self, player: PlayerId, input: JetInput) {
        self.inputs.push((player, input));
    }

    pub fn pop_inputs(&mut self) -> Vec<(PlayerId, JetInput)> {
        std::mem::take(&mut self.inputs)
    }
}

/// What a projectile or hitbox touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactTarget {
    DestructibleTerrain,
    IndestructibleTerrain,
    Jet(Entity),
    Projectile(Entity),
    Hitbox(Entity),
    Other,
}

/// One overlap reported for `subject` (a projectile or a hitbox entity)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub subject: Entity,
    pub target: ContactTarget,
}

/// Contacts waiting for the resolver, in arrival order
#[derive(Debug, Clone, Default)]
pub struct ContactQueue {
    pub contacts: Vec<Contact>,
}

impl ContactQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subject: Entity, target: ContactTarget) {
        self.contacts.push(Contact { subject, target });
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }

    pub fn drain(&mut self) -> Vec<Contact> {
        std::mem::take(&mut self.contacts)
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }
}
