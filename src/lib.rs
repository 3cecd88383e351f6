//! A small 3D game engine built around its physics integration
//!
//! This crate provides:
//! - Physics simulation with rapier3d: world lifecycle, rigid-body and
//!   collision-shape management, triangle-mesh colliders, debug draw
//! - Component data (transforms, colliders, mesh buffers) shared with the
//!   scene through a narrow read-only surface
//! - Frame time tracking for the update loop

pub mod core;
pub mod ecs;
pub mod physics;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier3d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::Time;
    pub use crate::ecs::{
        Collider, ColliderKind, MeshBuffers, MotionType, RigidBodyComponent, Transform,
    };
    pub use crate::physics::{
        DebugLines, DebugVertex, MeshHandle, PhysicsWorld, RigidBodyHandle, ShapeHandle,
        TriangleMesh,
    };
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
}
