// src/physics.rs
//! Rigid-body world service backed by Rapier 3D.
//!
//! The movement code never touches Rapier directly: it goes through the
//! [`RigidBodyWorld`] trait, which [`PhysicsWorld`] implements. Static level
//! meshes and the player capsule are created here; everything they own is
//! released when the world is dropped.

use std::fmt;

use glam::Vec3;
use nalgebra::{Point3, Vector3};
use rapier3d::prelude::*;

/// Contact points further apart than this are speculative, not touching.
const CONTACT_DISTANCE_TOLERANCE: f32 = 0.01;

// ---------------------------------------------------------------------------
// Conversions (glam at the API, nalgebra inside Rapier)
// ---------------------------------------------------------------------------

#[inline(always)]
fn to_vector(v: Vec3) -> Vector3<Real> {
    Vector3::new(v.x, v.y, v.z)
}

#[inline(always)]
fn to_point(v: Vec3) -> Point3<Real> {
    Point3::new(v.x, v.y, v.z)
}

#[inline(always)]
fn from_vector(v: &Vector3<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

// ---------------------------------------------------------------------------
// Shapes & materials
// ---------------------------------------------------------------------------

/// Surface response of a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsMaterial {
    /// Friction coefficient (0.0 = no friction)
    pub friction: f32,
    /// Restitution/bounciness (0.0 = no bounce)
    pub restitution: f32,
}

impl PhysicsMaterial {
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self { friction, restitution }
    }

    /// Level geometry: grippy, no bounce.
    pub fn ground() -> Self {
        Self::new(0.8, 0.0)
    }
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self::ground()
    }
}

/// An upright collision shape, built once and attached to bodies on demand.
///
/// Cloning is cheap: the geometry is shared.
#[derive(Clone)]
pub struct CollisionShape {
    shape: SharedShape,
    radius: f32,
    height: f32,
}

impl CollisionShape {
    /// Y-aligned capsule of total `height`; a sphere when `height <= 2 * radius`.
    pub fn capsule(radius: f32, height: f32) -> Self {
        let half_segment = height * 0.5 - radius;
        let shape = if half_segment > f32::EPSILON {
            SharedShape::capsule_y(half_segment, radius)
        } else {
            SharedShape::ball(radius)
        };

        Self {
            shape,
            radius,
            height: height.max(radius * 2.0),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_sphere(&self) -> bool {
        self.height <= self.radius * 2.0 + f32::EPSILON
    }

    fn shared(&self) -> SharedShape {
        self.shape.clone()
    }
}

impl fmt::Debug for CollisionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionShape")
            .field("radius", &self.radius)
            .field("height", &self.height)
            .field("sphere", &self.is_sphere())
            .finish()
    }
}

/// Parameters of a dynamic player body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleDesc {
    pub position: Vec3,
    pub mass: f32,
    pub material: PhysicsMaterial,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Only allow rotation around the vertical axis.
    pub yaw_only: bool,
}

/// One touching contact point as seen from a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactSample {
    /// Unit normal pointing from the touched surface towards the body.
    pub normal: Vec3,
    /// Body on the other side, if the collider has one.
    pub other: Option<RigidBodyHandle>,
}

// ---------------------------------------------------------------------------
// Service trait
// ---------------------------------------------------------------------------

/// Operations the movement core needs from the simulation.
///
/// Unknown handles are not an error: reads return zero / empty, writes are
/// ignored.
pub trait RigidBodyWorld {
    fn linear_velocity(&self, body: RigidBodyHandle) -> Vec3;
    fn set_linear_velocity(&mut self, body: RigidBodyHandle, velocity: Vec3);
    /// Adds a force integrated over the next step. Persists until cleared.
    fn apply_force(&mut self, body: RigidBodyHandle, force: Vec3);
    fn clear_forces(&mut self, body: RigidBodyHandle);
    fn apply_impulse(&mut self, body: RigidBodyHandle, impulse: Vec3);
    fn mass(&self, body: RigidBodyHandle) -> f32;
    fn translation(&self, body: RigidBodyHandle) -> Vec3;
    /// Touching contact points of every collider attached to `body`.
    fn contacts(&self, body: RigidBodyHandle) -> Vec<ContactSample>;
    /// Distance to the first hit along `from -> to`, ignoring `exclude`.
    fn raycast(&self, from: Vec3, to: Vec3, exclude: Option<RigidBodyHandle>) -> Option<f32>;
    /// Replace the body's collision shape in place and move it by `offset`.
    ///
    /// Velocities are kept, mass stays constant, inertia follows the new
    /// shape and the body is woken up.
    fn swap_shape(&mut self, body: RigidBodyHandle, shape: &CollisionShape, offset: Vec3);
}

// ---------------------------------------------------------------------------
// Rapier world
// ---------------------------------------------------------------------------

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    pipeline: PhysicsPipeline,
    integration_params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// World with gravity along Y.
    pub fn new(gravity_y: f32) -> Self {
        Self {
            gravity: vector![0.0, gravity_y, 0.0],
            pipeline: PhysicsPipeline::new(),
            integration_params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Advance the simulation by `dt` seconds. Queries see the new state.
    pub fn step(&mut self, dt: f32) {
        self.integration_params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Fixed triangle mesh from a vertex soup: every 3 consecutive vertices
    /// form a triangle, leftovers are ignored. `None` when there is no
    /// complete triangle.
    pub fn create_static_trimesh(
        &mut self,
        vertices: &[Vec3],
        offset: Vec3,
        material: PhysicsMaterial,
    ) -> Option<RigidBodyHandle> {
        let triangle_count = vertices.len() / 3;
        if triangle_count == 0 {
            return None;
        }

        let points: Vec<Point<Real>> = vertices[..triangle_count * 3]
            .iter()
            .map(|v| to_point(*v + offset))
            .collect();
        let indices: Vec<[u32; 3]> = (0..triangle_count as u32)
            .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
            .collect();

        let handle = self.bodies.insert(RigidBodyBuilder::fixed().build());
        let collider = ColliderBuilder::trimesh(points, indices)
            .friction(material.friction)
            .restitution(material.restitution)
            .build();
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        Some(handle)
    }

    /// Dynamic body carrying `shape`. Mass is fixed by `desc.mass` whatever
    /// shape is attached later.
    pub fn create_capsule(&mut self, desc: &CapsuleDesc, shape: &CollisionShape) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(desc.position))
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .enabled_rotations(!desc.yaw_only, true, !desc.yaw_only)
            .can_sleep(false)
            .ccd_enabled(true)
            .build();

        // Min combine keeps the player frictionless against any surface;
        // ground friction is handled by the movement integrator.
        let collider = ColliderBuilder::new(shape.shared())
            .mass(desc.mass)
            .friction(desc.material.friction)
            .restitution(desc.material.restitution)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .restitution_combine_rule(CoefficientCombineRule::Min)
            .build();

        let handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }
        handle
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl RigidBodyWorld for PhysicsWorld {
    fn linear_velocity(&self, body: RigidBodyHandle) -> Vec3 {
        self.bodies
            .get(body)
            .map(|rb| from_vector(rb.linvel()))
            .unwrap_or(Vec3::ZERO)
    }

    fn set_linear_velocity(&mut self, body: RigidBodyHandle, velocity: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.set_linvel(to_vector(velocity), true);
        }
    }

    fn apply_force(&mut self, body: RigidBodyHandle, force: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.add_force(to_vector(force), true);
        }
    }

    fn clear_forces(&mut self, body: RigidBodyHandle) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.reset_forces(false);
        }
    }

    fn apply_impulse(&mut self, body: RigidBodyHandle, impulse: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.apply_impulse(to_vector(impulse), true);
        }
    }

    fn mass(&self, body: RigidBodyHandle) -> f32 {
        self.bodies.get(body).map(|rb| rb.mass()).unwrap_or(0.0)
    }

    fn translation(&self, body: RigidBodyHandle) -> Vec3 {
        self.bodies
            .get(body)
            .map(|rb| from_vector(rb.translation()))
            .unwrap_or(Vec3::ZERO)
    }

    fn contacts(&self, body: RigidBodyHandle) -> Vec<ContactSample> {
        let mut samples = Vec::new();
        let Some(rb) = self.bodies.get(body) else {
            return samples;
        };

        for &own in rb.colliders() {
            let Some(own_collider) = self.colliders.get(own) else {
                continue;
            };
            let rotation = own_collider.position().rotation;

            for pair in self.narrow_phase.contacts_with(own) {
                if !pair.has_any_active_contact {
                    continue;
                }
                let own_is_first = pair.collider1 == own;
                let other_collider = if own_is_first { pair.collider2 } else { pair.collider1 };
                let other = self.colliders.get(other_collider).and_then(|c| c.parent());

                for manifold in &pair.manifolds {
                    // Local normals point outwards from their own shape; flip
                    // ours so it points from the surface back at the body.
                    let local = if own_is_first { manifold.local_n1 } else { manifold.local_n2 };
                    let normal = from_vector(&-(rotation * local));

                    for point in &manifold.points {
                        if point.dist <= CONTACT_DISTANCE_TOLERANCE {
                            samples.push(ContactSample { normal, other });
                        }
                    }
                }
            }
        }

        samples
    }

    fn raycast(&self, from: Vec3, to: Vec3, exclude: Option<RigidBodyHandle>) -> Option<f32> {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }

        let ray = Ray::new(to_point(from), to_vector(delta / length));
        let mut filter = QueryFilter::default();
        if let Some(body) = exclude {
            filter = filter.exclude_rigid_body(body);
        }

        self.query_pipeline
            .cast_ray(&self.bodies, &self.colliders, &ray, length, true, filter)
            .map(|(_, toi)| toi)
    }

    fn swap_shape(&mut self, body: RigidBodyHandle, shape: &CollisionShape, offset: Vec3) {
        let Some(rb) = self.bodies.get_mut(body) else {
            return;
        };

        for &handle in rb.colliders() {
            if let Some(collider) = self.colliders.get_mut(handle) {
                collider.set_shape(shape.shared());
            }
        }

        let translation = rb.translation() + to_vector(offset);
        rb.set_translation(translation, true);
        rb.recompute_mass_properties_from_colliders(&self.colliders);
        rb.wake_up(true);
    }
}
