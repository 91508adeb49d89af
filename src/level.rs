// src/level.rs
//! Level data: named triangle-soup meshes plus a spawn transform.

use glam::{Vec2, Vec3};
use log::{debug, info};
use rapier3d::prelude::RigidBodyHandle;

use crate::physics::{PhysicsMaterial, PhysicsWorld};

/// One mesh of a map. Every 3 consecutive positions form a triangle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub material: String,
}

impl MapMesh {
    /// Untextured mesh from raw triangles.
    pub fn from_triangles(name: impl Into<String>, triangles: &[[Vec3; 3]]) -> Self {
        let mut positions = Vec::with_capacity(triangles.len() * 3);
        let mut normals = Vec::with_capacity(triangles.len() * 3);
        for [a, b, c] in triangles {
            let normal = (*b - *a).cross(*c - *a).normalize_or_zero();
            positions.extend([*a, *b, *c]);
            normals.extend([normal; 3]);
        }

        Self {
            name: name.into(),
            uvs: vec![Vec2::ZERO; positions.len()],
            positions,
            normals,
            material: String::new(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Where the player appears. Rotation is Euler degrees; only yaw (`y`) is used.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpawnPoint {
    pub position: Vec3,
    pub rotation: Vec3,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LevelData {
    pub version: u32,
    pub meshes: Vec<MapMesh>,
    pub spawn: SpawnPoint,
    /// Added to every mesh vertex (not to the spawn point).
    pub offset: Vec3,
}

impl LevelData {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MapMesh::triangle_count).sum()
    }

    /// Create one static body per mesh that has at least one whole triangle.
    pub fn build_static_bodies(&self, world: &mut PhysicsWorld) -> Vec<RigidBodyHandle> {
        let mut handles = Vec::with_capacity(self.meshes.len());
        for mesh in &self.meshes {
            match world.create_static_trimesh(&mesh.positions, self.offset, PhysicsMaterial::ground()) {
                Some(handle) => {
                    debug!("level: mesh '{}' ({} triangles)", mesh.name, mesh.triangle_count());
                    handles.push(handle);
                }
                None => debug!("level: mesh '{}' has no triangles, skipped", mesh.name),
            }
        }
        info!(
            "level: {} static bodies from {} meshes",
            handles.len(),
            self.meshes.len()
        );
        handles
    }

    /// A flat open floor with the spawn point just above it, used when no map
    /// file is given.
    pub fn arena() -> Self {
        let floor = MapMesh::from_triangles(
            "floor",
            &[[
                Vec3::new(-100.0, 0.0, -100.0),
                Vec3::new(-100.0, 0.0, 300.0),
                Vec3::new(300.0, 0.0, -100.0),
            ]],
        );

        Self {
            version: 1,
            meshes: vec![floor],
            spawn: SpawnPoint {
                position: Vec3::new(0.0, 1.0, 0.0),
                rotation: Vec3::ZERO,
            },
            offset: Vec3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_floor_faces_up() {
        let arena = LevelData::arena();
        assert_eq!(arena.triangle_count(), 1);
        assert!((arena.meshes[0].normals[0] - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn meshes_without_triangles_are_skipped() {
        let mut level = LevelData::arena();
        level.meshes.push(MapMesh {
            name: "stray".into(),
            positions: vec![Vec3::ZERO, Vec3::X],
            ..MapMesh::default()
        });

        let mut world = PhysicsWorld::new(-9.81);
        let handles = level.build_static_bodies(&mut world);
        assert_eq!(handles.len(), 1);
        assert_eq!(world.body_count(), 1);
    }
}
