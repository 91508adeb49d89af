// src/lib.rs
//! First-person rigid-body movement on top of Rapier.
//!
//! A [`GameSession`] owns the physics world, the level and the player. Each
//! fixed tick it steps the world, probes the ground, applies movement forces,
//! runs the jump and slide rules and hands back a [`CameraPose`].
//!
//! ```ignore
//! let mut session = GameSession::new(EngineConfig::default());
//! session.load_level(LevelData::arena())?;
//! let pose = session.tick(&InputSnapshot::default());
//! ```

// -------------------------------
// Core movement
// -------------------------------
pub mod character;
pub mod controller;
pub mod jump;
pub mod movement;
pub mod physics;
pub mod probe;
pub mod slide;

// -------------------------------
// Session, input & presentation
// -------------------------------
pub mod camera;
pub mod input;
pub mod session;
pub mod time;

// -------------------------------
// Data, config & errors
// -------------------------------
pub mod config;
pub mod context;
pub mod error;
pub mod level;
pub mod tmap;

#[cfg(test)]
mod testing;

pub use camera::{CameraPose, LookAngles};
pub use character::Character;
pub use config::{CooldownPolicy, EngineConfig, GameMeta, MovementTuning, PlayerProfile};
pub use controller::{run_tick, TickReport};
pub use error::{Error, Result};
pub use input::{InputSnapshot, InputSource, MoveIntent, ScriptedInput};
pub use level::{LevelData, MapMesh, SpawnPoint};
pub use physics::{PhysicsWorld, RigidBodyWorld};
pub use session::GameSession;
pub use time::FixedTimestep;
