//! Physics integration module
//!
//! Owns the rapier3d dynamics world and the mapping between engine
//! components and native physics objects: shape factory, triangle-mesh
//! builder, generational shape/mesh registries, rigid-body lifecycle and
//! fixed-sub-step simulation stepping.

mod debug;
mod mesh;
mod registry;
mod shape;
mod world;

pub use debug::{DebugLines, DebugVertex};
pub use mesh::{MeshError, TriangleMesh};
pub use registry::{Handle, Registry};
pub use shape::{MeshHandle, ShapeEntry, ShapeHandle, ShapeStore};
pub use world::{PhysicsWorld, RigidBodyHandle};
