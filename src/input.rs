// src/input.rs
//! Per-tick input snapshot and its translation into a movement intent.
//!
//! The window layer fills an [`InputSnapshot`] once per tick; the simulation
//! never sees raw events. [`ScriptedInput`] replays a prepared timeline for
//! tests and the headless runner.

use std::collections::VecDeque;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::LookAngles;
use crate::config::LookTuning;

/// Left trigger beyond this counts as holding slide.
pub const TRIGGER_SLIDE_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Buttons {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub slide: bool,
    pub use_action: bool,
}

/// Sticks in `[-1, 1]` (y up = forward), triggers in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalogInputs {
    pub left_stick: Vec2,
    pub right_stick: Vec2,
    pub left_trigger: f32,
    pub right_trigger: f32,
}

/// Immutable view of the controls for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputSnapshot {
    pub buttons: Buttons,
    pub analog: AnalogInputs,
    /// Raw mouse motion since the previous tick, in counts.
    pub mouse_delta: Vec2,
}

impl InputSnapshot {
    pub fn slide_held(&self) -> bool {
        self.buttons.slide || self.analog.left_trigger > TRIGGER_SLIDE_THRESHOLD
    }

    /// Wish direction on the horizontal plane for the given view, unit length
    /// or zero. Keys and the left stick add up.
    pub fn wish_direction(&self, look: &LookAngles, tuning: &LookTuning) -> Vec3 {
        let b = &self.buttons;
        let mut axes = Vec2::ZERO;
        if b.move_forward {
            axes.y += 1.0;
        }
        if b.move_backward {
            axes.y -= 1.0;
        }
        if b.move_right {
            axes.x += 1.0;
        }
        if b.move_left {
            axes.x -= 1.0;
        }

        let stick = self.analog.left_stick;
        if stick.length() >= tuning.stick_deadzone {
            axes += stick;
        }

        (look.forward() * axes.y + look.right() * axes.x).normalize_or_zero()
    }

    pub fn intent(&self, look: &LookAngles, tuning: &LookTuning) -> MoveIntent {
        MoveIntent {
            direction: self.wish_direction(look, tuning),
            jump: self.buttons.jump,
            slide: self.slide_held(),
        }
    }
}

/// What the player asks the character to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveIntent {
    /// Horizontal, unit length or zero.
    pub direction: Vec3,
    pub jump: bool,
    pub slide: bool,
}

/// Produces one snapshot per simulation tick.
pub trait InputSource {
    fn next_snapshot(&mut self) -> InputSnapshot;
}

/// Replays queued snapshots, then idles.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: VecDeque<InputSnapshot>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `snapshot` for the next `ticks` ticks.
    pub fn hold(mut self, snapshot: InputSnapshot, ticks: usize) -> Self {
        self.queue.extend(std::iter::repeat(snapshot).take(ticks));
        self
    }

    pub fn idle(self, ticks: usize) -> Self {
        self.hold(InputSnapshot::default(), ticks)
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn next_snapshot(&mut self) -> InputSnapshot {
        self.queue.pop_front().unwrap_or_default()
    }
}

/// Shorthand for building timelines.
pub fn buttons(buttons: Buttons) -> InputSnapshot {
    InputSnapshot {
        buttons,
        ..InputSnapshot::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn keys_follow_the_view() {
        let tuning = LookTuning::default();
        let forward = buttons(Buttons { move_forward: true, ..Buttons::default() });
        assert!(close(forward.wish_direction(&LookAngles::default(), &tuning), Vec3::NEG_Z));
        assert!(close(
            forward.wish_direction(&LookAngles::new(90.0, 45.0), &tuning),
            Vec3::X
        ));
    }

    #[test]
    fn diagonals_are_normalized_and_opposites_cancel() {
        let tuning = LookTuning::default();
        let look = LookAngles::default();
        let diagonal = buttons(Buttons {
            move_forward: true,
            move_right: true,
            ..Buttons::default()
        });
        let dir = diagonal.wish_direction(&look, &tuning);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(close(dir, Vec3::new(1.0, 0.0, -1.0).normalize()));

        let both = buttons(Buttons {
            move_forward: true,
            move_backward: true,
            ..Buttons::default()
        });
        assert_eq!(both.wish_direction(&look, &tuning), Vec3::ZERO);
    }

    #[test]
    fn stick_inside_dead_zone_is_ignored() {
        let tuning = LookTuning::default();
        let mut snapshot = InputSnapshot::default();
        snapshot.analog.left_stick = Vec2::new(0.1, 0.05);
        assert_eq!(snapshot.wish_direction(&LookAngles::default(), &tuning), Vec3::ZERO);

        snapshot.analog.left_stick = Vec2::new(0.0, -0.6);
        assert!(close(
            snapshot.wish_direction(&LookAngles::default(), &tuning),
            Vec3::Z
        ));
    }

    #[test]
    fn trigger_counts_as_slide() {
        let mut snapshot = InputSnapshot::default();
        snapshot.analog.left_trigger = 0.5;
        assert!(!snapshot.slide_held());
        snapshot.analog.left_trigger = 0.8;
        assert!(snapshot.slide_held());
    }

    #[test]
    fn scripted_input_replays_then_idles() {
        let jump = buttons(Buttons { jump: true, ..Buttons::default() });
        let mut script = ScriptedInput::new().hold(jump, 2).idle(1);
        assert_eq!(script.remaining(), 3);
        assert!(script.next_snapshot().buttons.jump);
        assert!(script.next_snapshot().buttons.jump);
        assert!(!script.next_snapshot().buttons.jump);
        assert!(script.is_empty());
        assert_eq!(script.next_snapshot(), InputSnapshot::default());
    }

    #[test]
    fn snapshots_deserialize_from_partial_json() {
        let snapshot: InputSnapshot =
            serde_json::from_str(r#"{ "buttons": { "moveForward": true }, "mouseDelta": [4.0, 0.0] }"#)
                .unwrap();
        assert!(snapshot.buttons.move_forward);
        assert_eq!(snapshot.mouse_delta, Vec2::new(4.0, 0.0));
        assert_eq!(snapshot.analog, AnalogInputs::default());
    }
}
