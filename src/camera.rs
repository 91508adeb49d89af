// src/camera.rs
//! First-person look angles and the per-tick camera pose.
//!
//! Angles are in degrees. Yaw 0 looks down -Z, positive yaw turns towards +X.

use glam::{Mat4, Vec2, Vec3};

use crate::config::{LookTuning, MovementTuning};

/// Pitch is kept just short of straight up/down so the view basis never
/// degenerates.
pub const PITCH_LIMIT: f32 = 89.0;

/// Widest field-of-view multiplier, reached at the speed cap.
pub const MAX_FOV_MULTIPLIER: f32 = 1.25;

/// Yaw/pitch of the player's view (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LookAngles {
    pub yaw: f32,
    pub pitch: f32,
}

impl LookAngles {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        let mut look = Self { yaw, pitch };
        look.normalize();
        look
    }

    /// Mouse counts scaled by sensitivity. Moving the mouse up looks up.
    pub fn apply_mouse(&mut self, delta: Vec2, tuning: &LookTuning) {
        self.yaw += delta.x * tuning.mouse_sensitivity;
        self.pitch -= delta.y * tuning.mouse_sensitivity;
        self.normalize();
    }

    /// Right stick turns at a fixed rate; input inside the dead-zone is ignored.
    pub fn apply_stick(&mut self, stick: Vec2, tuning: &LookTuning, dt: f32) {
        if stick.length() < tuning.stick_deadzone {
            return;
        }
        let step = tuning.stick_degrees_per_second * dt;
        self.yaw += stick.x * step;
        self.pitch += stick.y * step;
        self.normalize();
    }

    /// Horizontal forward vector from yaw alone.
    pub fn forward(&self) -> Vec3 {
        let (sin, cos) = self.yaw.to_radians().sin_cos();
        Vec3::new(sin, 0.0, -cos)
    }

    /// Horizontal right vector, `forward × up`.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y)
    }

    /// Full view direction including pitch.
    pub fn view_direction(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        (self.forward() * cos_pitch + Vec3::Y * sin_pitch).normalize_or_zero()
    }

    fn normalize(&mut self) {
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw = self.yaw.rem_euclid(360.0);
    }
}

/// Where the renderer should put the camera this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_multiplier: f32,
}

impl CameraPose {
    pub fn new(body_position: Vec3, eye_offset: f32, look: LookAngles, horizontal_speed: f32, tuning: &MovementTuning) -> Self {
        Self {
            position: body_position + Vec3::new(0.0, eye_offset, 0.0),
            yaw: look.yaw,
            pitch: look.pitch,
            fov_multiplier: fov_multiplier(horizontal_speed, tuning),
        }
    }

    pub fn look(&self) -> LookAngles {
        LookAngles {
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }

    /// Right-handed, Y-up view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        let target = self.position + self.look().view_direction();
        Mat4::look_at_rh(self.position, target, Vec3::Y)
    }
}

/// 1.0 up to target speed, widening linearly to [`MAX_FOV_MULTIPLIER`] at the cap.
pub fn fov_multiplier(horizontal_speed: f32, tuning: &MovementTuning) -> f32 {
    let range = tuning.max_speed - tuning.target_speed;
    if range <= f32::EPSILON {
        return 1.0;
    }
    let t = ((horizontal_speed - tuning.target_speed) / range).clamp(0.0, 1.0);
    1.0 + (MAX_FOV_MULTIPLIER - 1.0) * t
}
