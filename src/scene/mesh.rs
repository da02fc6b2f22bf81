use crate::core::geometry::Vertex;

/// A collection of vertices and indices representing part of a 3D object.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// Triangle list, 3 indices per triangle.
    pub indices: Vec<u32>,
    /// Index into the owning model's materials, if the mesh has one.
    pub material_id: Option<usize>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, material_id: Option<usize>) -> Self {
        Self {
            vertices,
            indices,
            material_id,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
