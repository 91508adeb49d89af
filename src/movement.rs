// src/movement.rs
//! Horizontal movement integrator.
//!
//! Turns a desired direction into a continuous force for the coming physics
//! step. The force is proportional to the velocity error, so the body settles
//! at `target_speed` instead of accelerating up to the cap. Vertical velocity
//! is left to gravity and the jump impulse.

use glam::Vec3;
use rapier3d::prelude::RigidBodyHandle;

use crate::config::MovementTuning;
use crate::physics::RigidBodyWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementMode {
    /// Steering towards the desired direction with full control.
    Accelerating,
    /// Steering with the reduced air-control factor.
    AirSteering,
    /// No input on the ground, drag force applied.
    Braking,
    /// No input on the ground and slow enough to stop outright.
    Stopped,
    /// No input in the air: momentum is kept.
    Coasting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementReport {
    pub mode: MovementMode,
    /// Horizontal velocity was rescaled down to the speed cap.
    pub clamped: bool,
}

#[inline(always)]
fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Apply this tick's movement force to `body`.
///
/// `desired` is a horizontal direction of length 0 or 1. Forces applied on
/// previous ticks are cleared first, so exactly one movement force is active
/// per step.
pub fn apply_movement(
    world: &mut impl RigidBodyWorld,
    body: RigidBodyHandle,
    tuning: &MovementTuning,
    desired: Vec3,
    on_ground: bool,
    sliding: bool,
) -> MovementReport {
    world.clear_forces(body);

    let velocity = world.linear_velocity(body);
    let flat = horizontal(velocity);
    let mass = world.mass(body);
    let desired = horizontal(desired);

    let mode = if desired != Vec3::ZERO {
        let control = if on_ground { 1.0 } else { tuning.air_control };
        let error = desired * tuning.target_speed - flat;
        world.apply_force(body, error * tuning.acceleration * control * mass);

        if on_ground {
            MovementMode::Accelerating
        } else {
            MovementMode::AirSteering
        }
    } else if on_ground {
        if flat.length() > tuning.stop_speed {
            let drag = if sliding { tuning.drag * 0.5 } else { tuning.drag };
            world.apply_force(body, -flat * drag * mass);
            MovementMode::Braking
        } else {
            world.set_linear_velocity(body, Vec3::new(0.0, velocity.y, 0.0));
            MovementMode::Stopped
        }
    } else {
        MovementMode::Coasting
    };

    MovementReport {
        mode,
        clamped: clamp_horizontal_speed(world, body, tuning.max_speed),
    }
}

/// Rescale horizontal velocity down to `max_speed`, keeping its direction
/// and the vertical component. Returns whether anything changed.
pub fn clamp_horizontal_speed(
    world: &mut impl RigidBodyWorld,
    body: RigidBodyHandle,
    max_speed: f32,
) -> bool {
    let velocity = world.linear_velocity(body);
    let flat = horizontal(velocity);
    let speed = flat.length();
    if speed <= max_speed {
        return false;
    }

    let capped = flat * (max_speed / speed);
    world.set_linear_velocity(body, Vec3::new(capped.x, velocity.y, capped.z));
    true
}
