// src/session.rs
//! Simulation session: owns the physics world, the level's static bodies and
//! the player, and drives them from the fixed-timestep clock.
//!
//! Loading a level drops the previous world as a unit before building the new
//! one, so no body or handle survives a reload.

use std::path::Path;

use log::{error, info, warn};
use rapier3d::prelude::RigidBodyHandle;

use crate::camera::CameraPose;
use crate::character::Character;
use crate::config::EngineConfig;
use crate::context::Context;
use crate::controller::{run_tick, TickReport};
use crate::error::{Error, Result};
use crate::input::{InputSnapshot, InputSource};
use crate::level::LevelData;
use crate::physics::PhysicsWorld;
use crate::time::FixedTimestep;
use crate::tmap;

/// Everything that lives exactly as long as one loaded level.
pub struct ActiveLevel {
    pub world: PhysicsWorld,
    pub static_bodies: Vec<RigidBodyHandle>,
    pub character: Character,
    pub data: LevelData,
    pub last_report: Option<TickReport>,
}

pub struct GameSession {
    config: EngineConfig,
    clock: FixedTimestep,
    active: Option<ActiveLevel>,
}

impl GameSession {
    pub fn new(config: EngineConfig) -> Self {
        let clock = FixedTimestep::new(config.tick_rate).with_max_catch_up(config.max_catch_up_ticks);
        Self {
            config,
            clock,
            active: None,
        }
    }

    /// Replace the current level. The old world is gone even if this fails.
    pub fn load_level(&mut self, data: LevelData) -> Result<()> {
        self.unload();
        self.install(data)
    }

    /// Unloads first, so a missing or malformed file also leaves nothing
    /// loaded.
    pub fn load_map_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.unload();
        let data = tmap::load_tmap(path)?;
        self.install(data)
            .with_context(|| format!("loading level {}", path.display()))
    }

    fn install(&mut self, data: LevelData) -> Result<()> {
        if data.triangle_count() == 0 {
            return Err(Error::EmptyLevel);
        }

        let mut world = PhysicsWorld::new(self.config.gravity);
        let static_bodies = data.build_static_bodies(&mut world);
        if static_bodies.is_empty() {
            return Err(Error::EmptyLevel);
        }

        let character = Character::spawn(
            &mut world,
            &self.config.player,
            &self.config.movement,
            data.spawn.position,
            data.spawn.rotation.y,
        );

        info!(
            "level loaded: {} meshes, {} triangles",
            data.meshes.len(),
            data.triangle_count()
        );

        self.clock.reset();
        self.active = Some(ActiveLevel {
            world,
            static_bodies,
            character,
            data,
            last_report: None,
        });
        Ok(())
    }

    /// Load a map file, logging any failure. Nothing is loaded afterwards on
    /// failure.
    pub fn set_map(&mut self, path: impl AsRef<Path>) -> bool {
        match self.load_map_file(path.as_ref()) {
            Ok(()) => true,
            Err(err) => {
                error!("failed to load map: {err}");
                false
            }
        }
    }

    pub fn unload(&mut self) {
        if let Some(level) = self.active.take() {
            info!("unloading level ({} bodies)", level.world.body_count());
        }
    }

    /// Step physics and run one movement tick. `None` when no level is loaded.
    pub fn tick(&mut self, input: &InputSnapshot) -> Option<CameraPose> {
        let dt = self.clock.tick_dt();
        let level = self.active.as_mut()?;
        level.world.step(dt);

        let character = &mut level.character;
        character.look.apply_mouse(input.mouse_delta, &self.config.look);
        character.look.apply_stick(input.analog.right_stick, &self.config.look, dt);
        let intent = input.intent(&character.look, &self.config.look);

        level.last_report = Some(run_tick(
            &mut level.world,
            character,
            &self.config.movement,
            &intent,
        ));

        Some(CameraPose::new(
            character.position,
            character.profile().eye_offset,
            character.look,
            character.horizontal_speed(&level.world),
            &self.config.movement,
        ))
    }

    /// Feed one frame of wall time, running as many ticks as it pays for.
    /// Returns the pose of the last tick run.
    pub fn advance(&mut self, elapsed: f64, input: &mut impl InputSource) -> Option<CameraPose> {
        self.clock.accumulate(elapsed);
        let owed = self.clock.ticks().count();
        if self.active.is_none() {
            if owed > 0 {
                warn!("advance: no level loaded, skipping {owed} ticks");
            }
            return None;
        }

        let mut pose = None;
        for _ in 0..owed {
            let snapshot = input.next_snapshot();
            pose = self.tick(&snapshot).or(pose);
        }
        pose
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &FixedTimestep {
        &self.clock
    }

    pub fn is_loaded(&self) -> bool {
        self.active.is_some()
    }

    pub fn level(&self) -> Option<&ActiveLevel> {
        self.active.as_ref()
    }

    pub fn world(&self) -> Option<&PhysicsWorld> {
        self.active.as_ref().map(|level| &level.world)
    }

    pub fn character(&self) -> Option<&Character> {
        self.active.as_ref().map(|level| &level.character)
    }

    pub fn last_report(&self) -> Option<TickReport> {
        self.active.as_ref().and_then(|level| level.last_report)
    }
}
