// src/controller.rs
//! One movement tick: probe, integrate, jump, slide, read back.
//!
//! Runs after the physics step, so forces applied here are integrated by the
//! next step.

use rapier3d::prelude::RigidBodyHandle;

use crate::character::Character;
use crate::config::MovementTuning;
use crate::input::MoveIntent;
use crate::jump::{self, JumpOutcome};
use crate::movement::{apply_movement, MovementReport};
use crate::physics::RigidBodyWorld;
use crate::probe::GroundProbe;
use crate::slide::{self, SlideOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub on_ground: bool,
    pub movement: MovementReport,
    pub jump: JumpOutcome,
    pub slide: SlideOutcome,
}

pub fn run_tick(
    world: &mut impl RigidBodyWorld,
    character: &mut Character,
    tuning: &MovementTuning,
    intent: &MoveIntent,
) -> TickReport {
    let body = character.body();

    let on_ground = GroundProbe::new(tuning).is_on_ground(&*world, body);
    character.control.on_ground = on_ground;

    let movement = apply_movement(
        world,
        body,
        tuning,
        intent.direction,
        on_ground,
        character.control.sliding,
    );
    let jump = resolve_jump(world, body, character, tuning, intent.jump);
    let slide = slide::update_slide(world, character, tuning, intent.slide);

    character.sync_from_body(&*world);

    TickReport {
        on_ground,
        movement,
        jump,
        slide,
    }
}

fn resolve_jump(
    world: &mut impl RigidBodyWorld,
    body: RigidBodyHandle,
    character: &mut Character,
    tuning: &MovementTuning,
    pressed: bool,
) -> JumpOutcome {
    let on_ground = character.control.on_ground;
    character.control.jump.begin_tick(on_ground, tuning);

    let vertical_velocity = world.linear_velocity(body).y;
    let outcome = if !pressed {
        JumpOutcome::Idle
    } else if !character
        .control
        .jump
        .is_eligible(pressed, on_ground, vertical_velocity, tuning)
    {
        JumpOutcome::Ineligible
    } else if !slide::try_stand(world, character, tuning) {
        // Still crouched under something: no jump this tick, timers untouched.
        JumpOutcome::BlockedByCeiling
    } else {
        jump::launch(world, body, tuning, &mut character.control.jump);
        JumpOutcome::Jumped
    };

    character.control.jump.end_tick(pressed);
    outcome
}
