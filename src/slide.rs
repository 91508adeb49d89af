// src/slide.rs
//! Crouch/slide shape controller.
//!
//! Sliding swaps the standing capsule for the shorter crouch capsule. Leaving
//! the slide needs enough headroom; when the ceiling is too low the character
//! stays crouched and the stand-up is retried on the next tick.

use glam::Vec3;
use log::debug;

use crate::character::Character;
use crate::config::MovementTuning;
use crate::physics::RigidBodyWorld;
use crate::probe::{GroundProbe, ProbeDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideOutcome {
    Unchanged,
    EnteredSlide,
    StoodUp,
    /// Slide released but the ceiling is too close to stand.
    BlockedByCeiling,
}

/// Advance the slide state for this tick's slide input.
pub fn update_slide(
    world: &mut impl RigidBodyWorld,
    character: &mut Character,
    tuning: &MovementTuning,
    slide_held: bool,
) -> SlideOutcome {
    let pressed_now = slide_held && !character.control.slide_was_held;
    character.control.slide_was_held = slide_held;

    if character.control.sliding {
        if slide_held {
            SlideOutcome::Unchanged
        } else if try_stand(world, character, tuning) {
            SlideOutcome::StoodUp
        } else {
            SlideOutcome::BlockedByCeiling
        }
    } else if pressed_now {
        enter_slide(world, character);
        SlideOutcome::EnteredSlide
    } else {
        SlideOutcome::Unchanged
    }
}

/// Swap to the crouch capsule. On the ground the body is lowered so its feet
/// stay where they were.
pub fn enter_slide(world: &mut impl RigidBodyWorld, character: &mut Character) {
    let half_delta = character.profile().half_height_delta();
    let offset = if character.control.on_ground {
        Vec3::new(0.0, -half_delta, 0.0)
    } else {
        Vec3::ZERO
    };

    let body = character.body();
    world.swap_shape(body, &character.shapes().crouching, offset);
    character.size = character.profile().crouching_size();
    character.control.sliding = true;
    debug!("slide: entered (grounded: {})", character.control.on_ground);
}

/// Try to swap back to the standing capsule. Returns `false`, leaving shape
/// and size untouched, when the ceiling is too close. Does nothing when the
/// character is not sliding.
pub fn try_stand(
    world: &mut impl RigidBodyWorld,
    character: &mut Character,
    tuning: &MovementTuning,
) -> bool {
    if !character.control.sliding {
        return true;
    }

    let probe = GroundProbe::new(tuning);
    let body = character.body();
    let half_delta = character.profile().half_height_delta();

    let ceiling = probe.vertical_clearance(&*world, body, ProbeDirection::Up);
    if ceiling <= half_delta + tuning.clearance_margin {
        return false;
    }

    let offset_y = if character.control.on_ground {
        half_delta
    } else {
        // Airborne: stay centred if possible, otherwise shift just enough to
        // keep the standing capsule between floor and ceiling.
        let standing_height = character.profile().standing_size.y;
        let half_height = standing_height * 0.5;
        let floor = probe.vertical_clearance(&*world, body, ProbeDirection::Down);
        if ceiling + floor < standing_height {
            return false;
        }
        0.0_f32
            .max(half_height - floor)
            .min(ceiling - half_height)
    };

    world.swap_shape(body, &character.shapes().standing, Vec3::new(0.0, offset_y, 0.0));
    character.size = character.profile().standing_size;
    character.control.sliding = false;
    debug!("slide: stood up (offset {offset_y:.2})");
    true
}
