// src/config.rs
//! Engine, movement and player tuning.
//!
//! Everything is plain data, deserializable from camelCase JSON, and every
//! field has a default so a partial file only overrides what it names.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::Result;

/// Which jumps must respect the inter-jump cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CooldownPolicy {
    /// Only jumps taken inside the coyote window wait for the cooldown.
    #[default]
    CoyoteOnly,
    /// Every jump, grounded or not, waits for the cooldown.
    Always,
}

/// Movement and jump tuning. Read-only once the session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MovementTuning {
    /// Horizontal speed the integrator steers towards (m/s).
    pub target_speed: f32,
    /// Gain applied to the velocity error (1/s).
    pub acceleration: f32,
    /// Control factor used while airborne, in `[0, 1]`.
    pub air_control: f32,
    /// Hard cap on horizontal speed (m/s).
    pub max_speed: f32,
    /// Idle drag coefficient on the ground (1/s). Halved while sliding.
    pub drag: f32,
    /// Below this horizontal speed an idle grounded body is stopped outright.
    pub stop_speed: f32,
    /// Upward velocity change of a jump (m/s), scaled by mass into an impulse.
    pub jump_impulse: f32,
    /// Jump only fires while it has been held for fewer ticks than this.
    pub jump_held_max_ticks: u8,
    /// Ticks that must pass since the last jump.
    pub jump_cooldown_ticks: u8,
    /// Length of the coyote window in ticks.
    pub coyote_time_ticks: u8,
    /// A jump is refused while the body already rises faster than this (m/s).
    pub max_jump_vertical_velocity: f32,
    /// Minimum `normal.y` of a contact that counts as ground.
    pub ground_normal_threshold: f32,
    /// Length of the ceiling / floor clearance ray.
    pub clearance_cast_length: f32,
    /// Extra headroom required before standing back up.
    pub clearance_margin: f32,
    pub cooldown_policy: CooldownPolicy,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            target_speed: 6.0,
            acceleration: 20.0,
            air_control: 0.3,
            max_speed: 16.0,
            drag: 8.0,
            stop_speed: 0.1,
            jump_impulse: 5.0,
            jump_held_max_ticks: 10,
            jump_cooldown_ticks: 12,
            coyote_time_ticks: 6,
            max_jump_vertical_velocity: 0.5,
            ground_normal_threshold: 0.7,
            clearance_cast_length: 5.0,
            clearance_margin: 0.1,
            cooldown_policy: CooldownPolicy::CoyoteOnly,
        }
    }
}

/// Body and shape parameters of the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerProfile {
    /// Width, height, depth of the standing capsule. Radius is `width / 2`.
    pub standing_size: Vec3,
    /// Height of the crouch/slide capsule; width and depth are shared.
    pub crouch_height: f32,
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Camera height above the body origin.
    pub eye_offset: f32,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            standing_size: Vec3::new(0.8, 1.8, 0.8),
            crouch_height: 0.9,
            mass: 70.0,
            friction: 0.0,
            restitution: 0.0,
            linear_damping: 0.1,
            angular_damping: 0.95,
            eye_offset: 0.6,
        }
    }
}

impl PlayerProfile {
    pub fn radius(&self) -> f32 {
        self.standing_size.x * 0.5
    }

    pub fn crouching_size(&self) -> Vec3 {
        Vec3::new(self.standing_size.x, self.crouch_height, self.standing_size.z)
    }

    /// Half of the standing/crouching height difference.
    pub fn half_height_delta(&self) -> f32 {
        (self.standing_size.y - self.crouch_height) * 0.5
    }
}

/// Look sensitivity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LookTuning {
    /// Degrees per mouse count.
    pub mouse_sensitivity: f32,
    /// Right-stick turn rate at full deflection (degrees/s).
    pub stick_degrees_per_second: f32,
    /// Stick magnitude below which input is ignored.
    pub stick_deadzone: f32,
}

impl Default for LookTuning {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.1,
            stick_degrees_per_second: 180.0,
            stick_deadzone: 0.15,
        }
    }
}

/// `graphics.display` section of `engine_config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplaySettings {
    pub display_mode: String,
    pub display_index: u32,
    /// Width and height; `null` leaves the choice to the platform.
    pub resolution: [Option<u32>; 2],
    pub api: String,
    /// Frames per second; `null` means uncapped.
    pub frame_rate_limit: Option<u32>,
    pub vsync: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            display_mode: "windowed".to_string(),
            display_index: 0,
            resolution: [None, None],
            api: "openGL".to_string(),
            frame_rate_limit: Some(120),
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsSettings {
    pub display: DisplaySettings,
}

/// Top-level engine configuration (`engine_config.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Simulation ticks per second.
    pub tick_rate: f64,
    /// Vertical gravity (m/s²).
    pub gravity: f32,
    /// Ticks a single frame may run before lag is discarded.
    pub max_catch_up_ticks: u32,
    pub graphics: GraphicsSettings,
    pub look: LookTuning,
    pub movement: MovementTuning,
    pub player: PlayerProfile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            gravity: -9.81,
            max_catch_up_ticks: 8,
            graphics: GraphicsSettings::default(),
            look: LookTuning::default(),
            movement: MovementTuning::default(),
            player: PlayerProfile::default(),
        }
    }
}

impl EngineConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading engine config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing engine config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        crate::ensure!(
            config.tick_rate.is_finite() && config.tick_rate > 0.0,
            "tickRate must be positive, got {}",
            config.tick_rate
        );
        Ok(config)
    }

    pub fn frame_rate_limit(&self) -> Option<u32> {
        self.graphics.display.frame_rate_limit.filter(|&fps| fps > 0)
    }
}

/// Game metadata (`game_meta.json`): window title and content directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMeta {
    pub title: String,
    pub version: String,
    pub directory: String,
}

impl GameMeta {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading game metadata {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing game metadata {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let meta: Self = serde_json::from_str(text)?;
        crate::ensure!(!meta.directory.is_empty(), "game metadata has no content directory");
        Ok(meta)
    }

    /// `<root>/<directory>/maps/<name>`.
    pub fn map_path(&self, root: impl AsRef<Path>, name: &str) -> PathBuf {
        root.as_ref().join(&self.directory).join("maps").join(name)
    }
}
