// src/jump.rs
//! Jump timing: hold window, inter-jump cooldown and coyote time.
//!
//! All timing is counted in simulation ticks with saturating `u8` counters.
//! A tick is bracketed by [`JumpTimers::begin_tick`] and
//! [`JumpTimers::end_tick`]; eligibility is checked in between.

use glam::Vec3;
use log::debug;
use rapier3d::prelude::RigidBodyHandle;

use crate::config::{CooldownPolicy, MovementTuning};
use crate::physics::RigidBodyWorld;

/// What the jump logic did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    /// Jump not pressed.
    Idle,
    /// Pressed but a timing or velocity rule refused it.
    Ineligible,
    Jumped,
    /// Eligible while sliding, but there was no room to stand up.
    BlockedByCeiling,
}

/// Phase derived from the coyote counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpPhase {
    Grounded,
    AirborneWithinCoyote,
    AirborneExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTimers {
    /// Consecutive ticks the jump input has been held.
    pub ticks_jump_held: u8,
    /// Ticks since the last jump fired.
    pub ticks_since_last_jump: u8,
    /// Ticks since the body was last grounded, saturating at the window length.
    pub coyote_time_ticks: u8,
}

impl JumpTimers {
    /// Fresh timers: no jump on record and no coyote window open.
    pub fn new(tuning: &MovementTuning) -> Self {
        Self {
            ticks_jump_held: 0,
            ticks_since_last_jump: u8::MAX,
            coyote_time_ticks: tuning.coyote_time_ticks,
        }
    }

    pub fn begin_tick(&mut self, on_ground: bool, tuning: &MovementTuning) {
        self.coyote_time_ticks = if on_ground {
            0
        } else {
            self.coyote_time_ticks
                .saturating_add(1)
                .min(tuning.coyote_time_ticks)
        };
    }

    pub fn phase(&self, tuning: &MovementTuning) -> JumpPhase {
        if self.coyote_time_ticks == 0 {
            JumpPhase::Grounded
        } else if self.coyote_time_ticks < tuning.coyote_time_ticks {
            JumpPhase::AirborneWithinCoyote
        } else {
            JumpPhase::AirborneExpired
        }
    }

    /// Every rule except the sliding stand-up check.
    pub fn is_eligible(
        &self,
        pressed: bool,
        on_ground: bool,
        vertical_velocity: f32,
        tuning: &MovementTuning,
    ) -> bool {
        if !pressed || self.ticks_jump_held >= tuning.jump_held_max_ticks {
            return false;
        }

        let in_coyote = self.coyote_time_ticks < tuning.coyote_time_ticks;
        let cooled_down = self.ticks_since_last_jump > tuning.jump_cooldown_ticks;
        let timing = match tuning.cooldown_policy {
            CooldownPolicy::CoyoteOnly => on_ground || (in_coyote && cooled_down),
            CooldownPolicy::Always => cooled_down && (on_ground || in_coyote),
        };

        timing && vertical_velocity <= tuning.max_jump_vertical_velocity
    }

    /// Record a jump: restart the cooldown and close the coyote window.
    pub fn register_jump(&mut self, tuning: &MovementTuning) {
        self.ticks_since_last_jump = 0;
        self.coyote_time_ticks = tuning.coyote_time_ticks;
    }

    pub fn end_tick(&mut self, pressed: bool) {
        self.ticks_since_last_jump = self.ticks_since_last_jump.saturating_add(1);
        self.ticks_jump_held = if pressed {
            self.ticks_jump_held.saturating_add(1)
        } else {
            0
        };
    }
}

/// Apply the jump impulse and update the timers.
pub fn launch(
    world: &mut impl RigidBodyWorld,
    body: RigidBodyHandle,
    tuning: &MovementTuning,
    timers: &mut JumpTimers,
) {
    let impulse = tuning.jump_impulse * world.mass(body);
    world.apply_impulse(body, Vec3::new(0.0, impulse, 0.0));
    timers.register_jump(tuning);
    debug!("jump: impulse {impulse:.1}, coyote {}", timers.coyote_time_ticks);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{body, ScriptedWorld};

    fn tuning() -> MovementTuning {
        MovementTuning::default()
    }

    /// Timers for a body that has been standing around for a while.
    fn settled() -> JumpTimers {
        let t = tuning();
        let mut timers = JumpTimers::new(&t);
        for _ in 0..30 {
            timers.begin_tick(true, &t);
            timers.end_tick(false);
        }
        timers
    }

    #[test]
    fn spawns_without_coyote_window() {
        let t = tuning();
        let timers = JumpTimers::new(&t);
        assert_eq!(timers.phase(&t), JumpPhase::AirborneExpired);
        assert!(!timers.is_eligible(true, false, 0.0, &t));
    }

    #[test]
    fn grounded_jump_is_eligible() {
        let t = tuning();
        let mut timers = settled();
        timers.begin_tick(true, &t);
        assert_eq!(timers.phase(&t), JumpPhase::Grounded);
        assert!(timers.is_eligible(true, true, 0.0, &t));
        assert!(!timers.is_eligible(false, true, 0.0, &t));
    }

    #[test]
    fn held_too_long_is_refused() {
        let t = tuning();
        let mut timers = settled();
        timers.ticks_jump_held = t.jump_held_max_ticks - 1;
        assert!(timers.is_eligible(true, true, 0.0, &t));
        timers.ticks_jump_held = t.jump_held_max_ticks;
        assert!(!timers.is_eligible(true, true, 0.0, &t));
    }

    #[test]
    fn rising_body_is_refused() {
        let t = tuning();
        let timers = settled();
        assert!(timers.is_eligible(true, true, 0.5, &t));
        assert!(!timers.is_eligible(true, true, 0.51, &t));
    }

    #[test]
    fn coyote_window_is_open_for_fewer_than_max_ticks() {
        let t = tuning();
        for k in 1..=t.coyote_time_ticks + 2 {
            // grounded at tick T, jump pressed at tick T + k
            let mut timers = settled();
            timers.begin_tick(true, &t);
            timers.end_tick(false);
            for _ in 1..k {
                timers.begin_tick(false, &t);
                timers.end_tick(false);
            }
            timers.begin_tick(false, &t);
            assert_eq!(
                timers.is_eligible(true, false, -1.0, &t),
                k < t.coyote_time_ticks,
                "k = {k}"
            );
        }
    }

    #[test]
    fn coyote_only_policy_skips_cooldown_on_ground() {
        let t = tuning();
        let mut timers = settled();
        timers.register_jump(&t);
        timers.end_tick(false);
        timers.begin_tick(true, &t);
        assert!(timers.is_eligible(true, true, 0.0, &t));

        // same timers, but airborne inside the coyote window
        timers.begin_tick(false, &t);
        assert_eq!(timers.phase(&t), JumpPhase::AirborneWithinCoyote);
        assert!(!timers.is_eligible(true, false, 0.0, &t));
    }

    #[test]
    fn coyote_jump_waits_out_the_cooldown() {
        let t = tuning();
        let mut timers = settled();
        timers.begin_tick(false, &t);
        assert_eq!(timers.phase(&t), JumpPhase::AirborneWithinCoyote);

        timers.ticks_since_last_jump = t.jump_cooldown_ticks;
        assert!(!timers.is_eligible(true, false, 0.0, &t));

        timers.ticks_since_last_jump = t.jump_cooldown_ticks + 1;
        assert!(timers.is_eligible(true, false, 0.0, &t));
    }

    #[test]
    fn always_policy_applies_cooldown_on_ground() {
        let t = MovementTuning {
            cooldown_policy: CooldownPolicy::Always,
            ..tuning()
        };
        let mut timers = settled();
        timers.register_jump(&t);
        for _ in 0..t.jump_cooldown_ticks {
            timers.end_tick(false);
            timers.begin_tick(true, &t);
            assert!(!timers.is_eligible(true, true, 0.0, &t));
        }
        timers.end_tick(false);
        timers.begin_tick(true, &t);
        assert!(timers.is_eligible(true, true, 0.0, &t));
    }

    #[test]
    fn jump_closes_the_coyote_window() {
        let t = tuning();
        let mut timers = settled();
        timers.begin_tick(false, &t);
        timers.register_jump(&t);
        assert_eq!(timers.phase(&t), JumpPhase::AirborneExpired);
    }

    #[test]
    fn counters_saturate() {
        let mut timers = settled();
        timers.ticks_since_last_jump = u8::MAX;
        timers.ticks_jump_held = u8::MAX;
        timers.end_tick(true);
        assert_eq!(timers.ticks_since_last_jump, u8::MAX);
        assert_eq!(timers.ticks_jump_held, u8::MAX);
        timers.end_tick(false);
        assert_eq!(timers.ticks_jump_held, 0);
    }

    #[test]
    fn launch_scales_impulse_by_mass() {
        let t = tuning();
        let mut world = ScriptedWorld::grounded();
        let mut timers = settled();
        launch(&mut world, body(), &t, &mut timers);

        assert_eq!(world.impulses, vec![Vec3::new(0.0, 350.0, 0.0)]);
        assert_eq!(world.velocity.y, 5.0);
        assert_eq!(timers.ticks_since_last_jump, 0);
    }
}
