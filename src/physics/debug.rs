//! Debug-draw backend for the physics world
//!
//! Collects the wireframe lines rapier's debug-render pipeline emits into
//! a flat vertex buffer the renderer can upload as a line list. Kept apart
//! from the main render pass; see [`PhysicsWorld::draw_debug`].
//!
//! [`PhysicsWorld::draw_debug`]: crate::physics::PhysicsWorld::draw_debug

use bytemuck::{Pod, Zeroable};
use rapier3d::pipeline::{DebugRenderBackend, DebugRenderObject};
use rapier3d::prelude::*;

/// One endpoint of a debug line, ready for GPU upload
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Line-list sink for physics debug rendering.
///
/// Vertices come in pairs; every two consecutive entries are one line.
#[derive(Debug, Default)]
pub struct DebugLines {
    vertices: Vec<DebugVertex>,
}

impl DebugLines {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all collected lines; call once per frame before drawing
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// The collected line-list vertices
    #[must_use]
    pub fn vertices(&self) -> &[DebugVertex] {
        &self.vertices
    }

    /// Number of collected lines
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.vertices.len() / 2
    }
}

impl DebugRenderBackend for DebugLines {
    fn draw_line(
        &mut self,
        _object: DebugRenderObject,
        a: Point<Real>,
        b: Point<Real>,
        color: [f32; 4],
    ) {
        self.vertices.push(DebugVertex {
            position: [a.x, a.y, a.z],
            color,
        });
        self.vertices.push(DebugVertex {
            position: [b.x, b.y, b.z],
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Collider, RigidBodyComponent, Transform};
    use crate::physics::PhysicsWorld;
    use glam::Vec3;
    use rapier3d::pipeline::DebugRenderMode;

    #[test]
    fn test_disabled_debug_draw_emits_nothing() {
        let mut world = PhysicsWorld::new();
        world.start();

        let entity = hecs::World::new().spawn(());
        let mut component = RigidBodyComponent::fixed(Collider::cuboid(Vec3::ONE));
        world
            .add_rigid_body(entity, &mut component, &Transform::default(), Vec3::ONE)
            .unwrap();

        let mut lines = DebugLines::new();
        world.draw_debug(&mut lines);
        assert_eq!(lines.line_count(), 0);
    }

    #[test]
    fn test_play_mode_emits_collider_wireframes() {
        let mut world = PhysicsWorld::new();
        world.start();
        world.set_debug_mode(DebugRenderMode::COLLIDER_SHAPES);
        world.on_play();

        let entity = hecs::World::new().spawn(());
        let mut component = RigidBodyComponent::fixed(Collider::cuboid(Vec3::ONE));
        world
            .add_rigid_body(entity, &mut component, &Transform::default(), Vec3::ONE)
            .unwrap();

        let mut lines = DebugLines::new();
        world.draw_debug(&mut lines);
        assert!(lines.line_count() > 0);

        // Stopping resets the mode without touching the world
        world.on_stop();
        lines.clear();
        world.draw_debug(&mut lines);
        assert_eq!(lines.line_count(), 0);
        assert!(world.is_running());
    }
}
