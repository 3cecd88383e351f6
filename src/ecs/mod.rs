//! Component data shared between the scene and the physics module

mod components;

pub use components::{
    Collider, ColliderKind, MeshBuffers, MotionType, RigidBodyComponent, Transform,
};
