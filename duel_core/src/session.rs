//! Match lifecycle around the per-frame `step`: map start, score screen, winner screen.

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::*;
use crate::config::{Config, MapId};
use crate::environment::Environment;
use crate::error::Result;
use crate::host::*;
use crate::map::{Aabb, Arena};
use crate::match_state::MatchState;
use crate::pool::ProjectilePools;
use crate::resources::*;
use crate::systems::*;
use crate::weapons::{equip, reset_loadout};

/// Where the session is in the match loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    MainMenu,
    /// Next map requested, waiting for the host to call `begin_map`
    Loading,
    Playing,
    ScoreScreen,
    WinnerScreen,
}

/// Outcome of leaving the score screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Winner(WinnerDisplay),
    NextMap(MapId),
}

/// Everything one local match needs, owned in one place
pub struct Session {
    pub world: World,
    pub time: Time,
    pub config: Config,
    pub arena: Arena,
    pub match_state: MatchState,
    pub env: Environment,
    pub pools: ProjectilePools,
    pub spawner: PowerUpSpawner,
    pub events: Events,
    pub inputs: InputQueue,
    pub contacts: ContactQueue,
    pub rng: GameRng,
    jets: [Entity; 2],
    phase: Phase,
}

impl Session {
    pub fn new(config: Config, seed: u64) -> Result<Self> {
        config.validate()?;

        let mut world = World::new();
        let pools = ProjectilePools::new(&mut world, &config);
        let jets = PlayerId::ALL
            .map(|id| crate::create_jet(&mut world, id, Transform2D::default(), &config));
        let time = Time::default();

        Ok(Self {
            arena: Arena::open(Aabb::from_center_size(Vec2::ZERO, Vec2::splat(20.0))),
            match_state: MatchState::new(config.win_score),
            env: Environment::new(&config),
            spawner: PowerUpSpawner::new(time.now),
            events: Events::new(),
            inputs: InputQueue::new(),
            contacts: ContactQueue::new(),
            rng: GameRng::new(seed),
            world,
            time,
            config,
            pools,
            jets,
            phase: Phase::MainMenu,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn jet(&self, id: PlayerId) -> Entity {
        self.jets[id.index()]
    }

    pub fn push_input(&mut self, id: PlayerId, input: JetInput) {
        self.inputs.push_input(id, input);
    }

    /// Zero the scores and pick the first map
    pub fn new_match(&mut self) -> Option<MapId> {
        self.match_state.reset_for_new_match();
        self.env.reverse.reset(self.time.now, None);
        log::info!("New match, first to {}", self.match_state.win_score);
        self.request_next_map()
    }

    /// Install a freshly loaded map and put both jets on the start line
    pub fn begin_map(&mut self, arena: Arena, spawns: &mut dyn SpawnPointProvider) -> Result<()> {
        let mode = SpawnMode::from_fixed(self.config.settings.fixed_spawn);
        let placements = spawns.placements(mode, &mut self.rng)?;

        let now = self.time.now;
        self.arena = arena;
        self.match_state.begin_map();
        self.env.begin_map(
            now,
            self.match_state.current_map.as_ref(),
            &mut self.rng,
            &self.config,
        );

        self.pools.release_all(&mut self.world);
        self.inputs.clear();
        self.contacts.clear();
        cancel_dashes(&mut self.world);
        for (jet, transform) in self.jets.into_iter().zip(placements) {
            reset_loadout(&mut self.world, &mut self.events, jet);
            if let Ok(mut t) = self.world.get::<&mut Transform2D>(jet) {
                *t = transform;
            }
        }
        sync_hitboxes(&mut self.world);

        self.respawn_turrets(now);
        clear_pickups(&mut self.world);
        self.spawner.reset(now);

        for id in PlayerId::ALL {
            let jet = self.jet(id);
            if let Some(kind) = self
                .match_state
                .starting_weapon(id, &self.config.settings, &mut self.rng)
            {
                equip(&mut self.world, &mut self.events, jet, kind);
            }
        }

        log::info!(
            "Map {} started ({})",
            self.match_state
                .current_map
                .as_ref()
                .map_or("<unnamed>", MapId::as_str),
            self.env.wind.info()
        );
        self.phase = Phase::Playing;
        Ok(())
    }

    fn respawn_turrets(&mut self, now: f32) {
        let old: Vec<Entity> = self
            .world
            .query::<&Turret>()
            .iter()
            .map(|(e, _)| e)
            .collect();
        for e in old {
            let _ = self.world.despawn(e);
        }
        for &mount in &self.arena.turret_mounts {
            crate::create_turret(&mut self.world, mount, 0.0);
        }
        reset_turrets(&mut self.world, now);
    }

    /// Advance one frame. Returns `true` on the frame a hit ends the map.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        self.time.dt = dt;
        let map_ended = crate::step(
            &mut self.world,
            &mut self.time,
            &mut self.arena,
            &self.config,
            &mut self.match_state,
            &mut self.env,
            &mut self.pools,
            &mut self.spawner,
            &mut self.events,
            &mut self.inputs,
            &mut self.contacts,
            &mut self.rng,
        );
        if map_ended {
            log::info!(
                "Map over: P1 {} - P2 {}",
                self.match_state.score(PlayerId::One),
                self.match_state.score(PlayerId::Two)
            );
            self.phase = Phase::ScoreScreen;
        }
        map_ended
    }

    /// Leave the score screen: winner screen if someone reached the win score, else a new map
    pub fn advance(&mut self, skins: &dyn SkinStore) -> Option<Advance> {
        if self.phase != Phase::ScoreScreen {
            log::debug!("advance ignored in {:?}", self.phase);
            return None;
        }

        if let Some(winner) = self.match_state.winner() {
            let display = WinnerDisplay::new(winner, self.match_state.score(winner), skins);
            log::info!("{} with skin {}", display.title(), display.skin);
            self.events.request_scene(SceneId::WinnerScreen);
            self.phase = Phase::WinnerScreen;
            return Some(Advance::Winner(display));
        }

        self.request_next_map().map(Advance::NextMap)
    }

    pub fn return_to_menu(&mut self) {
        self.pools.release_all(&mut self.world);
        clear_pickups(&mut self.world);
        self.events.request_scene(SceneId::MainMenu);
        self.phase = Phase::MainMenu;
    }

    /// Hand buffered notifications to the host, honouring the sound setting
    pub fn dispatch(
        &mut self,
        scenes: &mut dyn SceneService,
        audio: &mut dyn AudioSink,
        indicator: &mut dyn ReverseIndicator,
    ) {
        self.events
            .dispatch(scenes, audio, indicator, self.config.settings.sounds);
    }

    fn request_next_map(&mut self) -> Option<MapId> {
        let Some(map) = self.match_state.next_map(&mut self.rng, &self.config.maps) else {
            log::warn!("Map rotation is empty, staying put");
            return None;
        };
        self.events.request_scene(SceneId::NextMap(map.clone()));
        self.phase = Phase::Loading;
        Some(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weapons::{Loadout, WeaponKind};

    struct NamedSkins;

    impl SkinStore for NamedSkins {
        fn current_skin(&self, player: PlayerId) -> SkinId {
            SkinId(format!("{}-red", player.jet_name()))
        }
    }

    fn started_session(config: Config) -> Session {
        let mut session = Session::new(config, 42).unwrap();
        session.new_match();
        let arena = Arena::test_arena();
        let mut spawns = SpawnPoints::new(arena.spawn_points.clone(), arena.center());
        session.begin_map(arena, &mut spawns).unwrap();
        session
    }

    /// Put an active P1 bullet on top of P2 and report the contact
    fn score_for_p1(session: &mut Session) {
        let shooter = session.jet(PlayerId::One);
        let victim = session.jet(PlayerId::Two);
        let victim_pos = session.world.get::<&Transform2D>(victim).unwrap().pos;
        let bullet = session.pools.acquire_basic(&mut session.world, PlayerId::One).unwrap();
        session
            .world
            .get::<&mut Projectile>(bullet)
            .unwrap()
            .activate(
                Owner::Player {
                    id: PlayerId::One,
                    jet: shooter,
                },
                session.time.now,
                5.0,
                0.15,
            );
        session.world.get::<&mut Transform2D>(bullet).unwrap().pos = victim_pos;
        session.contacts.push(bullet, ContactTarget::Jet(victim));
    }

    #[test]
    fn test_new_session_waits_in_menu() {
        let mut session = Session::new(Config::new(), 1).unwrap();
        assert_eq!(session.phase(), Phase::MainMenu);
        assert!(!session.tick(0.016), "Nothing runs outside a map");
        assert_eq!(session.time.now, 0.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::new();
        config.win_score = 0;
        assert!(Session::new(config, 1).is_err());
    }

    #[test]
    fn test_new_match_requests_a_map() {
        let mut session = Session::new(Config::new(), 3).unwrap();
        let map = session.new_match().unwrap();
        assert!(session.config.maps.contains(&map));
        assert_eq!(session.phase(), Phase::Loading);
        assert_eq!(session.events.scenes, vec![SceneId::NextMap(map)]);
    }

    #[test]
    fn test_begin_map_places_jets_and_turrets() {
        let session = started_session(Config::new());
        assert_eq!(session.phase(), Phase::Playing);

        for id in PlayerId::ALL {
            let t = *session.world.get::<&Transform2D>(session.jet(id)).unwrap();
            assert!(
                session.arena.spawn_points.contains(&t.pos),
                "{id} on a spawn point"
            );
            let to_centre = (Vec2::ZERO - t.pos).normalize();
            assert!((t.forward() - to_centre).length() < 1e-4, "{id} faces centre");
        }

        let turrets = session.world.query::<&Turret>().iter().count();
        assert_eq!(turrets, 2);
    }

    #[test]
    fn test_begin_map_twice_keeps_turret_count() {
        let mut session = started_session(Config::new());
        let arena = Arena::test_arena();
        let mut spawns = SpawnPoints::new(arena.spawn_points.clone(), arena.center());
        session.begin_map(arena, &mut spawns).unwrap();
        assert_eq!(session.world.query::<&Turret>().iter().count(), 2);
    }

    #[test]
    fn test_shield_support_for_trailing_player() {
        let mut config = Config::new();
        config.settings.shield_support = true;
        let mut session = Session::new(config, 9).unwrap();
        session.new_match();
        for _ in 0..3 {
            session.match_state.add_score(PlayerId::One);
        }

        let arena = Arena::test_arena();
        let mut spawns = SpawnPoints::new(arena.spawn_points.clone(), arena.center());
        session.begin_map(arena, &mut spawns).unwrap();

        let kind = |id| {
            session
                .world
                .get::<&Loadout>(session.jet(id))
                .unwrap()
                .equipped_kind()
        };
        assert_eq!(kind(PlayerId::Two), WeaponKind::Shield);
        assert_eq!(kind(PlayerId::One), WeaponKind::Basic);
    }

    #[test]
    fn test_hit_moves_to_score_screen_then_next_map() {
        let mut session = started_session(Config::new());
        session.events.clear();

        score_for_p1(&mut session);
        assert!(session.tick(1.0 / 60.0));
        assert_eq!(session.phase(), Phase::ScoreScreen);
        assert_eq!(session.match_state.score(PlayerId::One), 1);
        assert!(!session.tick(1.0 / 60.0), "Frozen on the score screen");

        match session.advance(&NamedSkins) {
            Some(Advance::NextMap(map)) => {
                assert!(session.events.scenes.contains(&SceneId::NextMap(map)));
            }
            other => panic!("Expected another map, got {other:?}"),
        }
        assert_eq!(session.phase(), Phase::Loading);
        assert!(session.advance(&NamedSkins).is_none(), "Only once per score screen");
    }

    #[test]
    fn test_reaching_win_score_shows_winner() {
        let mut session = started_session(Config::new());
        for _ in 0..4 {
            session.match_state.add_score(PlayerId::One);
        }

        score_for_p1(&mut session);
        assert!(session.tick(1.0 / 60.0));

        let Some(Advance::Winner(display)) = session.advance(&NamedSkins) else {
            panic!("Expected the winner screen");
        };
        assert_eq!(display.winner, PlayerId::One);
        assert_eq!(display.score, 5);
        assert_eq!(display.skin, SkinId("P1_Jet-red".to_string()));
        assert_eq!(session.phase(), Phase::WinnerScreen);
        assert!(session.events.scenes.contains(&SceneId::WinnerScreen));

        session.return_to_menu();
        assert_eq!(session.phase(), Phase::MainMenu);
    }

    #[derive(Default)]
    struct Sink {
        scenes: Vec<SceneId>,
        cues: Vec<AudioCue>,
    }

    impl SceneService for Sink {
        fn load_scene(&mut self, scene: &SceneId) {
            self.scenes.push(scene.clone());
        }
    }

    impl AudioSink for Sink {
        fn play(&mut self, cue: AudioCue) {
            self.cues.push(cue);
        }
    }

    impl ReverseIndicator for Sink {
        fn show_reversed(&mut self) {}
    }

    #[test]
    fn test_dispatch_respects_sound_setting() {
        let mut config = Config::new();
        config.settings.sounds = false;
        let mut session = started_session(config);
        session.events.play(AudioCue::BasicFire);

        let mut scenes = Sink::default();
        let mut audio = Sink::default();
        let mut indicator = Sink::default();
        session.dispatch(&mut scenes, &mut audio, &mut indicator);

        assert!(audio.cues.is_empty());
        assert_eq!(scenes.scenes.len(), 1, "The first map request is still delivered");
    }
}
