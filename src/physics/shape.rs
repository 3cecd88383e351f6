//! Collision-shape factory and ownership
//!
//! Shapes are baked with their scale at creation time and cached by
//! (geometry, scale), so two bodies asking for the same scaled primitive
//! share one shape instance while differently scaled instances can never
//! alias each other. The store owns every shape and mesh it creates; rigid
//! bodies only hold handles.

use glam::Vec3;
use rapier3d::prelude::*;
use rustc_hash::FxHashMap;

use crate::ecs::{Collider, ColliderKind};
use crate::physics::mesh::TriangleMesh;
use crate::physics::registry::{Handle, Registry};

/// Handle to a registered collision shape
pub type ShapeHandle = Handle<ShapeEntry>;

/// Handle to a registered triangle mesh
pub type MeshHandle = Handle<TriangleMesh>;

/// Cache key for primitive shapes: geometry and bake scale as exact bit
/// patterns. Mesh shapes are not cached here; their idempotency comes from
/// the handle cached on the collider itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ShapeKey {
    Box {
        half_extents: [u32; 3],
        scale: [u32; 3],
    },
    Sphere {
        radius: u32,
        scale: u32,
    },
    Capsule {
        radius: u32,
        length: u32,
        scale: u32,
    },
}

fn bits3(v: Vec3) -> [u32; 3] {
    [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()]
}

/// A registered collision shape: the baked native shape plus the scale it
/// was baked with
pub struct ShapeEntry {
    /// The native shape, shared by every body referencing this entry
    pub shape: SharedShape,
    /// Local scale baked into the geometry
    pub scale: Vec3,
    /// Cache key, present for primitives only
    key: Option<ShapeKey>,
    /// The triangle mesh a mesh shape was built from
    mesh: Option<MeshHandle>,
}

impl ShapeEntry {
    /// The triangle mesh backing this shape, for mesh shapes
    #[must_use]
    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }
}

/// Owns every collision shape and triangle mesh created for the world
#[derive(Default)]
pub struct ShapeStore {
    shapes: Registry<ShapeEntry>,
    meshes: Registry<TriangleMesh>,
    cache: FxHashMap<ShapeKey, ShapeHandle>,
}

impl ShapeStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build (or reuse) a collision shape for a collider at the given bake
    /// scale.
    ///
    /// Dispatches exhaustively on the collider kind. Boxes bake the full
    /// non-uniform scale; spheres and capsules bake the largest scale
    /// component, since they cannot be scaled non-uniformly and stay
    /// themselves. Mesh colliders first consolidate their buffers into a
    /// [`TriangleMesh`], which is registered independently of the shape.
    ///
    /// Returns `None` when no shape can be built (a mesh collider with no
    /// triangles, or a rejected trimesh build); callers treat that as "no
    /// physics participation possible".
    pub fn create_collision_shape(
        &mut self,
        collider: &mut Collider,
        scale: Vec3,
    ) -> Option<ShapeHandle> {
        if let Some(handle) = collider.cached_shape(scale)
            && self.shapes.contains(handle)
        {
            return Some(handle);
        }

        let handle = match collider.kind() {
            ColliderKind::Box { half_extents } => {
                let baked = *half_extents * scale;
                self.primitive(
                    ShapeKey::Box {
                        half_extents: bits3(*half_extents),
                        scale: bits3(scale),
                    },
                    scale,
                    || SharedShape::cuboid(baked.x, baked.y, baked.z),
                )
            }
            ColliderKind::Sphere { radius } => {
                let factor = scale.max_element();
                let baked = *radius * factor;
                self.primitive(
                    ShapeKey::Sphere {
                        radius: radius.to_bits(),
                        scale: factor.to_bits(),
                    },
                    scale,
                    || SharedShape::ball(baked),
                )
            }
            ColliderKind::Capsule { radius, length } => {
                let factor = scale.max_element();
                let half = length * factor / 2.0;
                let baked_radius = *radius * factor;
                self.primitive(
                    ShapeKey::Capsule {
                        radius: radius.to_bits(),
                        length: length.to_bits(),
                        scale: factor.to_bits(),
                    },
                    scale,
                    || {
                        SharedShape::capsule(
                            point![0.0, -half, 0.0],
                            point![0.0, half, 0.0],
                            baked_radius,
                        )
                    },
                )
            }
            ColliderKind::Mesh { buffers } => {
                let mesh = TriangleMesh::from_buffers(buffers);
                if mesh.is_empty() {
                    log::warn!("mesh collider has no triangles, no shape created");
                    return None;
                }
                let shape = match mesh.to_shape(scale) {
                    Ok(shape) => shape,
                    Err(e) => {
                        log::warn!("failed to build trimesh shape: {e}");
                        return None;
                    }
                };
                let mesh_handle = self.meshes.insert(mesh);
                self.shapes.insert(ShapeEntry {
                    shape,
                    scale,
                    key: None,
                    mesh: Some(mesh_handle),
                })
            }
        };

        collider.set_cached_shape(handle, scale);
        Some(handle)
    }

    fn primitive(
        &mut self,
        key: ShapeKey,
        scale: Vec3,
        build: impl FnOnce() -> SharedShape,
    ) -> ShapeHandle {
        if let Some(&handle) = self.cache.get(&key)
            && self.shapes.contains(handle)
        {
            return handle;
        }

        let handle = self.shapes.insert(ShapeEntry {
            shape: build(),
            scale,
            key: Some(key),
            mesh: None,
        });
        self.cache.insert(key, handle);
        handle
    }

    /// Look up a registered shape
    #[must_use]
    pub fn shape(&self, handle: ShapeHandle) -> Option<&ShapeEntry> {
        self.shapes.get(handle)
    }

    /// Look up a registered triangle mesh
    #[must_use]
    pub fn mesh(&self, handle: MeshHandle) -> Option<&TriangleMesh> {
        self.meshes.get(handle)
    }

    /// The scale a shape was baked with; identity for stale handles
    #[must_use]
    pub fn scale_of(&self, handle: ShapeHandle) -> Vec3 {
        self.shapes
            .get(handle)
            .map_or(Vec3::ONE, |entry| entry.scale)
    }

    /// Release a shape. The triangle mesh of a mesh shape is left
    /// registered; its lifetime is independent of the shape's.
    ///
    /// Returns false for stale handles (a tolerated no-op).
    pub fn delete_shape(&mut self, handle: ShapeHandle) -> bool {
        match self.shapes.remove(handle) {
            Some(entry) => {
                if let Some(key) = entry.key {
                    self.cache.remove(&key);
                }
                true
            }
            None => {
                log::debug!("delete of unknown or stale shape {handle:?}, ignoring");
                false
            }
        }
    }

    /// Release a triangle mesh. Any shape still referencing it keeps its
    /// own (native) copy of the geometry, so this is safe at any time.
    pub fn delete_mesh(&mut self, handle: MeshHandle) -> bool {
        self.meshes.remove(handle).is_some()
    }

    /// Number of registered shapes
    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Number of registered triangle meshes
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Release everything, invalidating all outstanding handles
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.meshes.clear();
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::MeshBuffers;

    #[test]
    fn test_every_collider_kind_builds_a_shape() {
        let mut store = ShapeStore::new();

        let mut colliders = [
            Collider::cuboid(Vec3::ONE),
            Collider::sphere(0.5),
            Collider::capsule(0.3, 1.2),
            Collider::mesh([MeshBuffers::cube()]),
        ];

        for collider in &mut colliders {
            let handle = store.create_collision_shape(collider, Vec3::ONE);
            assert!(handle.is_some());
        }

        assert_eq!(store.shape_count(), 4);
        assert_eq!(store.mesh_count(), 1);
    }

    #[test]
    fn test_repeated_request_reuses_cached_shape() {
        let mut store = ShapeStore::new();
        let mut collider = Collider::cuboid(Vec3::ONE);

        let first = store.create_collision_shape(&mut collider, Vec3::ONE).unwrap();
        let second = store.create_collision_shape(&mut collider, Vec3::ONE).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.shape_count(), 1);
    }

    #[test]
    fn test_identical_geometry_and_scale_share_one_shape() {
        let mut store = ShapeStore::new();
        let mut a = Collider::sphere(0.5);
        let mut b = Collider::sphere(0.5);

        let ha = store.create_collision_shape(&mut a, Vec3::splat(2.0)).unwrap();
        let hb = store.create_collision_shape(&mut b, Vec3::splat(2.0)).unwrap();

        assert_eq!(ha, hb);
        assert_eq!(store.shape_count(), 1);
    }

    #[test]
    fn test_distinct_scales_never_alias() {
        let mut store = ShapeStore::new();
        let mut collider = Collider::cuboid(Vec3::ONE);

        let small = store.create_collision_shape(&mut collider, Vec3::ONE).unwrap();
        let big = store
            .create_collision_shape(&mut collider, Vec3::splat(2.0))
            .unwrap();

        assert_ne!(small, big);
        assert_eq!(store.shape_count(), 2);
        assert_eq!(store.scale_of(small), Vec3::ONE);
        assert_eq!(store.scale_of(big), Vec3::splat(2.0));
    }

    #[test]
    fn test_box_scale_is_baked_into_half_extents() {
        let mut store = ShapeStore::new();
        let mut collider = Collider::cuboid(Vec3::new(1.0, 2.0, 3.0));

        let handle = store
            .create_collision_shape(&mut collider, Vec3::new(2.0, 1.0, 0.5))
            .unwrap();

        let entry = store.shape(handle).unwrap();
        let cuboid = entry.shape.as_cuboid().unwrap();
        assert_eq!(cuboid.half_extents.x, 2.0);
        assert_eq!(cuboid.half_extents.y, 2.0);
        assert_eq!(cuboid.half_extents.z, 1.5);
    }

    #[test]
    fn test_empty_mesh_collider_builds_nothing() {
        let mut store = ShapeStore::new();
        let mut collider = Collider::mesh([]);

        let handle = store.create_collision_shape(&mut collider, Vec3::ONE);
        assert!(handle.is_none());
        assert_eq!(store.shape_count(), 0);
        assert_eq!(store.mesh_count(), 0);
    }

    #[test]
    fn test_mesh_outlives_its_shape() {
        let mut store = ShapeStore::new();
        let mut collider = Collider::mesh([MeshBuffers::cube()]);

        let handle = store.create_collision_shape(&mut collider, Vec3::ONE).unwrap();
        let mesh_handle = store.shape(handle).unwrap().mesh().unwrap();

        assert!(store.delete_shape(handle));
        assert_eq!(store.shape_count(), 0);

        // The triangle mesh is tracked independently
        assert_eq!(store.mesh_count(), 1);
        assert!(store.mesh(mesh_handle).is_some());

        assert!(store.delete_mesh(mesh_handle));
        assert_eq!(store.mesh_count(), 0);
    }

    #[test]
    fn test_delete_is_identity_matched_and_idempotent() {
        let mut store = ShapeStore::new();
        let mut collider = Collider::sphere(1.0);

        let handle = store.create_collision_shape(&mut collider, Vec3::ONE).unwrap();
        assert!(store.delete_shape(handle));
        assert!(!store.delete_shape(handle));
        assert_eq!(store.shape_count(), 0);
    }

    #[test]
    fn test_deleted_shape_is_rebuilt_not_resurrected() {
        let mut store = ShapeStore::new();
        let mut collider = Collider::sphere(1.0);

        let first = store.create_collision_shape(&mut collider, Vec3::ONE).unwrap();
        store.delete_shape(first);

        // Collider still caches the dead handle; the factory must notice
        // and build a fresh shape
        let second = store.create_collision_shape(&mut collider, Vec3::ONE).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.shape_count(), 1);
    }
}
