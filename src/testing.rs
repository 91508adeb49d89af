// src/testing.rs
//! Scripted [`RigidBodyWorld`] for unit tests of the movement core.

use glam::Vec3;
use rapier3d::prelude::RigidBodyHandle;

use crate::physics::{CollisionShape, ContactSample, RigidBodyWorld};

pub fn body() -> RigidBodyHandle {
    RigidBodyHandle::from_raw_parts(0, 0)
}

/// Single-body world whose query answers are set by the test, recording every
/// write the code under test makes.
#[derive(Debug, Clone)]
pub struct ScriptedWorld {
    pub velocity: Vec3,
    pub mass: f32,
    pub position: Vec3,
    pub contacts: Vec<ContactSample>,
    /// Distance returned for upward rays; `None` means open sky.
    pub ceiling: Option<f32>,
    /// Distance returned for downward rays.
    pub floor: Option<f32>,
    pub forces: Vec<Vec3>,
    pub impulses: Vec<Vec3>,
    pub swaps: Vec<(f32, Vec3)>,
    pub clears: usize,
}

impl Default for ScriptedWorld {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            mass: 70.0,
            position: Vec3::ZERO,
            contacts: Vec::new(),
            ceiling: None,
            floor: None,
            forces: Vec::new(),
            impulses: Vec::new(),
            swaps: Vec::new(),
            clears: 0,
        }
    }
}

impl ScriptedWorld {
    pub fn grounded() -> Self {
        let mut world = Self::default();
        world.set_grounded(true);
        world
    }

    pub fn set_grounded(&mut self, grounded: bool) {
        self.contacts.clear();
        if grounded {
            self.contacts.push(ContactSample {
                normal: Vec3::Y,
                other: None,
            });
        }
    }

    /// Sum of the forces applied since the last clear.
    pub fn net_force(&self) -> Vec3 {
        self.forces.iter().copied().sum()
    }
}

impl RigidBodyWorld for ScriptedWorld {
    fn linear_velocity(&self, _body: RigidBodyHandle) -> Vec3 {
        self.velocity
    }

    fn set_linear_velocity(&mut self, _body: RigidBodyHandle, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn apply_force(&mut self, _body: RigidBodyHandle, force: Vec3) {
        self.forces.push(force);
    }

    fn clear_forces(&mut self, _body: RigidBodyHandle) {
        self.forces.clear();
        self.clears += 1;
    }

    fn apply_impulse(&mut self, _body: RigidBodyHandle, impulse: Vec3) {
        self.impulses.push(impulse);
        self.velocity += impulse / self.mass;
    }

    fn mass(&self, _body: RigidBodyHandle) -> f32 {
        self.mass
    }

    fn translation(&self, _body: RigidBodyHandle) -> Vec3 {
        self.position
    }

    fn contacts(&self, _body: RigidBodyHandle) -> Vec<ContactSample> {
        self.contacts.clone()
    }

    fn raycast(&self, from: Vec3, to: Vec3, _exclude: Option<RigidBodyHandle>) -> Option<f32> {
        let length = (to - from).length();
        let hit = if to.y > from.y { self.ceiling } else { self.floor };
        hit.filter(|distance| *distance <= length)
    }

    fn swap_shape(&mut self, _body: RigidBodyHandle, shape: &CollisionShape, offset: Vec3) {
        self.swaps.push((shape.height(), offset));
        self.position += offset;
    }
}
