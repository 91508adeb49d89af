// src/probe.rs
//! Ground contact and vertical clearance queries around the player body.

use glam::Vec3;
use rapier3d::prelude::RigidBodyHandle;

use crate::config::MovementTuning;
use crate::physics::RigidBodyWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeDirection {
    Up,
    Down,
}

impl ProbeDirection {
    #[inline(always)]
    fn axis(self) -> Vec3 {
        match self {
            ProbeDirection::Up => Vec3::Y,
            ProbeDirection::Down => Vec3::NEG_Y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundProbe {
    /// Minimum `normal.y` for a contact to count as ground.
    pub normal_threshold: f32,
    /// Clearance rays stop after this distance.
    pub cast_length: f32,
}

impl GroundProbe {
    pub fn new(tuning: &MovementTuning) -> Self {
        Self {
            normal_threshold: tuning.ground_normal_threshold,
            cast_length: tuning.clearance_cast_length,
        }
    }

    /// True when any touching contact has a walkable normal.
    ///
    /// Walls (normal.y near 0) and ceilings (negative) never count.
    pub fn is_on_ground(&self, world: &impl RigidBodyWorld, body: RigidBodyHandle) -> bool {
        world
            .contacts(body)
            .iter()
            .any(|contact| contact.normal.y > self.normal_threshold)
    }

    /// Distance from the body origin to the nearest surface above or below,
    /// or `cast_length` when nothing is in reach. The body itself is ignored.
    pub fn vertical_clearance(
        &self,
        world: &impl RigidBodyWorld,
        body: RigidBodyHandle,
        direction: ProbeDirection,
    ) -> f32 {
        let from = world.translation(body);
        let to = from + direction.axis() * self.cast_length;
        world
            .raycast(from, to, Some(body))
            .map_or(self.cast_length, |hit| hit.min(self.cast_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ContactSample;
    use crate::testing::{body, ScriptedWorld};

    fn probe() -> GroundProbe {
        GroundProbe::new(&MovementTuning::default())
    }

    #[test]
    fn flat_floor_is_ground() {
        let world = ScriptedWorld::grounded();
        assert!(probe().is_on_ground(&world, body()));
    }

    #[test]
    fn walls_and_ceilings_are_not_ground() {
        let mut world = ScriptedWorld::default();
        world.contacts = vec![
            ContactSample { normal: Vec3::X, other: None },
            ContactSample { normal: Vec3::NEG_Y, other: None },
            // 50 degree slope: normal.y = cos(50°) ≈ 0.64
            ContactSample {
                normal: Vec3::new(0.766, 0.643, 0.0),
                other: None,
            },
        ];
        assert!(!probe().is_on_ground(&world, body()));

        world.contacts.push(ContactSample {
            normal: Vec3::new(0.5, 0.866, 0.0),
            other: None,
        });
        assert!(probe().is_on_ground(&world, body()));
    }

    #[test]
    fn no_contacts_means_airborne() {
        assert!(!probe().is_on_ground(&ScriptedWorld::default(), body()));
    }

    #[test]
    fn clearance_reports_hit_or_cast_length() {
        let mut world = ScriptedWorld::default();
        world.ceiling = Some(1.2);
        assert_eq!(probe().vertical_clearance(&world, body(), ProbeDirection::Up), 1.2);
        assert_eq!(probe().vertical_clearance(&world, body(), ProbeDirection::Down), 5.0);

        world.floor = Some(9.0);
        assert_eq!(probe().vertical_clearance(&world, body(), ProbeDirection::Down), 5.0);
    }
}
