//! Triangle soup construction for mesh colliders
//!
//! Consolidates the vertex/index buffers of one or more renderable meshes
//! into a flat triangle list that a static trimesh collision shape can be
//! built from. Index buffers must already be flat triangle lists (stride 3);
//! fans and strips are not supported.

use glam::Vec3;
use rapier3d::prelude::*;

use crate::ecs::MeshBuffers;

/// Errors from building a native trimesh shape
#[derive(Debug, Clone)]
pub enum MeshError {
    /// The mesh has no triangles
    Empty,
    /// The native shape builder rejected the buffers
    Build(String),
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "triangle mesh is empty"),
            Self::Build(e) => write!(f, "trimesh build failed: {e}"),
        }
    }
}

impl std::error::Error for MeshError {}

/// An append-only triangle soup built from renderable mesh buffers.
///
/// Owned by the mesh registry independently of the collision shape that
/// references it; shapes come and go, the soup stays until world teardown
/// or explicit deletion.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create an empty mesh
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from every buffer of a mesh collider.
    ///
    /// Walks each index buffer with stride 3 and appends one triangle per
    /// index triple. Index triples pointing outside the vertex buffer are
    /// skipped with a warning rather than aborting the whole mesh.
    #[must_use]
    pub fn from_buffers(buffers: &[MeshBuffers]) -> Self {
        let mut mesh = Self::new();

        for buffer in buffers {
            let triangles = buffer.indices.len() / 3;
            for i in 0..triangles {
                let i0 = buffer.indices[3 * i] as usize;
                let i1 = buffer.indices[3 * i + 1] as usize;
                let i2 = buffer.indices[3 * i + 2] as usize;

                match (
                    buffer.vertices.get(i0),
                    buffer.vertices.get(i1),
                    buffer.vertices.get(i2),
                ) {
                    (Some(&a), Some(&b), Some(&c)) => mesh.add_triangle(a, b, c),
                    _ => log::warn!(
                        "mesh buffer index triple ({i0}, {i1}, {i2}) out of range for {} vertices, skipping triangle",
                        buffer.vertices.len()
                    ),
                }
            }
        }

        mesh
    }

    /// Append one triangle
    pub fn add_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let base = self.vertices.len() as u32;
        self.vertices.push(a);
        self.vertices.push(b);
        self.vertices.push(c);
        self.indices.push([base, base + 1, base + 2]);
    }

    /// Number of triangles
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Check if the mesh has no triangles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Get the corners of triangle `i`
    #[must_use]
    pub fn triangle(&self, i: usize) -> Option<[Vec3; 3]> {
        let [i0, i1, i2] = *self.indices.get(i)?;
        Some([
            self.vertices[i0 as usize],
            self.vertices[i1 as usize],
            self.vertices[i2 as usize],
        ])
    }

    /// Build a static (non-convex) trimesh collision shape from this soup,
    /// with `scale` baked into the vertex positions.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Empty`] for a mesh with no triangles, or
    /// [`MeshError::Build`] if the native builder rejects the buffers.
    pub fn to_shape(&self, scale: Vec3) -> Result<SharedShape, MeshError> {
        if self.is_empty() {
            return Err(MeshError::Empty);
        }

        let vertices: Vec<Point<Real>> = self
            .vertices
            .iter()
            .map(|v| {
                let s = *v * scale;
                point![s.x, s.y, s.z]
            })
            .collect();

        SharedShape::trimesh(vertices, self.indices.clone())
            .map_err(|e| MeshError::Build(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_buffer() -> MeshBuffers {
        // 4 unique vertices, 2 triangles
        MeshBuffers::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            vec![0, 1, 2, 2, 3, 0],
        )
    }

    #[test]
    fn test_empty_buffers_give_empty_mesh() {
        let mesh = TriangleMesh::from_buffers(&[]);
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_two_triangles_from_one_buffer() {
        let buffer = quad_buffer();
        let mesh = TriangleMesh::from_buffers(std::slice::from_ref(&buffer));

        assert_eq!(mesh.triangle_count(), 2);

        // Triangles match the indexed lookups
        let first = mesh.triangle(0).unwrap();
        assert_eq!(first[0], buffer.vertices[0]);
        assert_eq!(first[1], buffer.vertices[1]);
        assert_eq!(first[2], buffer.vertices[2]);

        let second = mesh.triangle(1).unwrap();
        assert_eq!(second[0], buffer.vertices[2]);
        assert_eq!(second[1], buffer.vertices[3]);
        assert_eq!(second[2], buffer.vertices[0]);
    }

    #[test]
    fn test_multiple_buffers_are_consolidated() {
        let mesh = TriangleMesh::from_buffers(&[quad_buffer(), quad_buffer()]);
        assert_eq!(mesh.triangle_count(), 4);
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let buffer = MeshBuffers::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Z],
            vec![0, 1, 2, 0, 1, 99],
        );
        let mesh = TriangleMesh::from_buffers(std::slice::from_ref(&buffer));
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_empty_mesh_has_no_shape() {
        let mesh = TriangleMesh::new();
        assert!(matches!(mesh.to_shape(glam::Vec3::ONE), Err(MeshError::Empty)));
    }

    #[test]
    fn test_shape_from_quad() {
        let mesh = TriangleMesh::from_buffers(&[quad_buffer()]);
        let shape = mesh.to_shape(Vec3::ONE);
        assert!(shape.is_ok());
    }
}
