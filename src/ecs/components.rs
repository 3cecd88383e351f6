//! Components consumed by the physics module
//!
//! This is the narrow, read-mostly surface the physics integration sees:
//! a transform, a rigid-body description (mass + motion type + collider)
//! and raw mesh buffers for mesh colliders. The ECS itself (hecs) stays
//! outside the physics module; only `Entity` ids cross the boundary.

use glam::{Mat4, Quat, Vec3};
use smallvec::SmallVec;

use crate::physics::ShapeHandle;

/// Transform component for position, rotation, and scale
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as a quaternion
    pub rotation: Quat,
    /// Scale factor
    pub scale: Vec3,
}

impl Transform {
    /// Create a new transform at the origin
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with just a position
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    #[must_use]
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Get the transformation matrix
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Classification of a physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionType {
    /// Immovable, infinite mass
    Static,
    /// Moved externally, not by forces
    Kinematic,
    /// Simulated under forces and mass
    Dynamic,
}

/// Raw geometry buffers of one renderable mesh.
///
/// Indices are a flat triangle list: three indices per triangle.
#[derive(Debug, Clone)]
pub struct MeshBuffers {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Create buffers from vertex positions and a flat triangle index list
    #[must_use]
    pub fn new(vertices: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of vertices
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of whole triangles the index buffer describes
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// A unit cube centered at the origin (12 triangles)
    #[must_use]
    pub fn cube() -> Self {
        let vertices = vec![
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
        ];

        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 4, 7, 0, 7, 3, // left
            1, 6, 5, 1, 2, 6, // right
            3, 7, 6, 3, 6, 2, // top
            0, 1, 5, 0, 5, 4, // bottom
        ];

        Self::new(vertices, indices)
    }
}

/// Collider geometry, a closed set of shapes.
///
/// The exhaustive `match` in the shape factory is what keeps this set and
/// the factory in sync; adding a variant without updating the factory is a
/// compile error.
#[derive(Debug, Clone)]
pub enum ColliderKind {
    /// Axis-aligned box given by half-extents
    Box { half_extents: Vec3 },
    /// Sphere given by radius
    Sphere { radius: f32 },
    /// Y-aligned capsule given by radius and segment length between the
    /// two cap centers
    Capsule { radius: f32, length: f32 },
    /// Static triangle mesh built from renderable mesh buffers
    Mesh {
        buffers: SmallVec<[MeshBuffers; 1]>,
    },
}

/// Shape handle cached on a collider, valid for one bake scale only
#[derive(Debug, Clone, Copy)]
struct CachedShape {
    handle: ShapeHandle,
    scale: Vec3,
}

/// Collider description attached to a rigid-body component.
///
/// Caches the handle of the collision shape built for it so that repeated
/// rigid-body requests do not re-invoke the shape factory.
#[derive(Debug, Clone)]
pub struct Collider {
    kind: ColliderKind,
    cached: Option<CachedShape>,
}

impl Collider {
    /// Create a collider from raw geometry
    #[must_use]
    pub fn new(kind: ColliderKind) -> Self {
        Self { kind, cached: None }
    }

    /// Box collider from half-extents
    #[must_use]
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::new(ColliderKind::Box { half_extents })
    }

    /// Sphere collider from radius
    #[must_use]
    pub fn sphere(radius: f32) -> Self {
        Self::new(ColliderKind::Sphere { radius })
    }

    /// Capsule collider from radius and segment length
    #[must_use]
    pub fn capsule(radius: f32, length: f32) -> Self {
        Self::new(ColliderKind::Capsule { radius, length })
    }

    /// Mesh collider over one or more mesh buffers
    #[must_use]
    pub fn mesh(buffers: impl IntoIterator<Item = MeshBuffers>) -> Self {
        Self::new(ColliderKind::Mesh {
            buffers: buffers.into_iter().collect(),
        })
    }

    /// The collider's geometry
    #[must_use]
    pub fn kind(&self) -> &ColliderKind {
        &self.kind
    }

    /// The cached shape handle, if one was baked at exactly this scale
    #[must_use]
    pub fn cached_shape(&self, scale: Vec3) -> Option<ShapeHandle> {
        self.cached
            .filter(|cached| cached.scale == scale)
            .map(|cached| cached.handle)
    }

    pub(crate) fn set_cached_shape(&mut self, handle: ShapeHandle, scale: Vec3) {
        self.cached = Some(CachedShape { handle, scale });
    }

    /// Forget the cached shape handle
    pub fn clear_cached_shape(&mut self) {
        self.cached = None;
    }
}

/// Rigid-body component: what the scene declares, before the physics
/// module turns it into a native body
#[derive(Debug, Clone)]
pub struct RigidBodyComponent {
    /// Declared mass; only participates when `motion` is Dynamic
    pub mass: f32,
    /// Static, kinematic or dynamic
    pub motion: MotionType,
    /// Collider geometry and cached shape
    pub collider: Collider,
}

impl RigidBodyComponent {
    /// A dynamic body with the given mass
    #[must_use]
    pub fn dynamic(mass: f32, collider: Collider) -> Self {
        Self {
            mass,
            motion: MotionType::Dynamic,
            collider,
        }
    }

    /// An immovable body
    #[must_use]
    pub fn fixed(collider: Collider) -> Self {
        Self {
            mass: 0.0,
            motion: MotionType::Static,
            collider,
        }
    }

    /// An externally driven body
    #[must_use]
    pub fn kinematic(collider: Collider) -> Self {
        Self {
            mass: 0.0,
            motion: MotionType::Kinematic,
            collider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_matrix_includes_position() {
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let matrix = transform.matrix();
        assert_eq!(matrix.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_cube_buffers_are_a_triangle_list() {
        let cube = MeshBuffers::cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.index_count(), 36);
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn test_collider_cache_starts_empty() {
        let collider = Collider::sphere(1.0);
        assert!(collider.cached_shape(Vec3::ONE).is_none());
        assert!(collider.cached_shape(Vec3::splat(2.0)).is_none());
    }

    #[test]
    fn test_component_constructors_pick_motion_type() {
        let dynamic = RigidBodyComponent::dynamic(5.0, Collider::sphere(0.5));
        assert_eq!(dynamic.motion, MotionType::Dynamic);
        assert_eq!(dynamic.mass, 5.0);

        let fixed = RigidBodyComponent::fixed(Collider::cuboid(Vec3::ONE));
        assert_eq!(fixed.motion, MotionType::Static);
        assert_eq!(fixed.mass, 0.0);

        let kinematic = RigidBodyComponent::kinematic(Collider::capsule(0.3, 1.0));
        assert_eq!(kinematic.motion, MotionType::Kinematic);
    }
}
