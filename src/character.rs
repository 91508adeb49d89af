// src/character.rs
//! The player entity: one dynamic body, two prebuilt capsules and the
//! transient control state carried from tick to tick.

use glam::Vec3;
use log::info;
use rapier3d::prelude::RigidBodyHandle;

use crate::camera::LookAngles;
use crate::config::{MovementTuning, PlayerProfile};
use crate::jump::JumpTimers;
use crate::physics::{CapsuleDesc, CollisionShape, PhysicsMaterial, PhysicsWorld, RigidBodyWorld};

/// Standing and crouching capsules, built once and swapped, never rebuilt.
#[derive(Debug, Clone)]
pub struct CharacterShapes {
    pub standing: CollisionShape,
    pub crouching: CollisionShape,
}

impl CharacterShapes {
    pub fn new(profile: &PlayerProfile) -> Self {
        let radius = profile.radius();
        Self {
            standing: CollisionShape::capsule(radius, profile.standing_size.y),
            crouching: CollisionShape::capsule(radius, profile.crouch_height),
        }
    }
}

/// State the tick controller owns between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    /// Recomputed at the start of every tick.
    pub on_ground: bool,
    pub jump: JumpTimers,
    /// Crouch capsule active.
    pub sliding: bool,
    /// Slide input of the previous tick, for edge detection.
    pub slide_was_held: bool,
}

impl ControlState {
    pub fn new(tuning: &MovementTuning) -> Self {
        Self {
            on_ground: false,
            jump: JumpTimers::new(tuning),
            sliding: false,
            slide_was_held: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Character {
    /// Extents of the active capsule (width, height, depth).
    pub size: Vec3,
    /// Body translation as of the last sync. The body is authoritative.
    pub position: Vec3,
    pub look: LookAngles,
    pub control: ControlState,
    body: RigidBodyHandle,
    shapes: CharacterShapes,
    profile: PlayerProfile,
}

impl Character {
    /// Wrap an existing body. The body is expected to carry the standing shape.
    pub fn new(
        body: RigidBodyHandle,
        profile: PlayerProfile,
        tuning: &MovementTuning,
        position: Vec3,
        yaw: f32,
    ) -> Self {
        Self {
            size: profile.standing_size,
            position,
            look: LookAngles::new(yaw, 0.0),
            control: ControlState::new(tuning),
            body,
            shapes: CharacterShapes::new(&profile),
            profile,
        }
    }

    /// Create the player body at `position` and wrap it.
    pub fn spawn(
        world: &mut PhysicsWorld,
        profile: &PlayerProfile,
        tuning: &MovementTuning,
        position: Vec3,
        yaw: f32,
    ) -> Self {
        let desc = CapsuleDesc {
            position,
            mass: profile.mass,
            material: PhysicsMaterial::new(profile.friction, profile.restitution),
            linear_damping: profile.linear_damping,
            angular_damping: profile.angular_damping,
            yaw_only: true,
        };
        let body = world.create_capsule(&desc, &CharacterShapes::new(profile).standing);
        info!(
            "player spawned at ({:.2}, {:.2}, {:.2}), yaw {yaw:.1}",
            position.x, position.y, position.z
        );

        Self::new(body, profile.clone(), tuning, position, yaw)
    }

    #[inline(always)]
    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    #[inline(always)]
    pub fn shapes(&self) -> &CharacterShapes {
        &self.shapes
    }

    #[inline(always)]
    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    /// Pull the position back from the body.
    pub fn sync_from_body(&mut self, world: &impl RigidBodyWorld) {
        self.position = world.translation(self.body);
    }

    pub fn horizontal_speed(&self, world: &impl RigidBodyWorld) -> f32 {
        let v = world.linear_velocity(self.body);
        Vec3::new(v.x, 0.0, v.z).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_creates_a_standing_body_at_rest() {
        let mut world = PhysicsWorld::new(-9.81);
        let profile = PlayerProfile::default();
        let character = Character::spawn(
            &mut world,
            &profile,
            &MovementTuning::default(),
            Vec3::new(1.0, 2.0, 3.0),
            45.0,
        );

        assert_eq!(world.body_count(), 1);
        assert_eq!(world.translation(character.body()), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(world.linear_velocity(character.body()), Vec3::ZERO);
        assert!((world.mass(character.body()) - 70.0).abs() < 1e-3);
        assert_eq!(character.size, profile.standing_size);
        assert_eq!(character.look.yaw, 45.0);
        assert!(!character.control.sliding);
    }

    #[test]
    fn shapes_match_the_profile() {
        let shapes = CharacterShapes::new(&PlayerProfile::default());
        assert_eq!(shapes.standing.height(), 1.8);
        assert_eq!(shapes.crouching.height(), 0.9);
        assert_eq!(shapes.crouching.radius(), 0.4);
        assert!(!shapes.crouching.is_sphere());
    }
}
