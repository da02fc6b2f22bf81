use crate::core::device::Device;
use crate::pipeline::program::Program;
use crate::pipeline::renderer::Renderer;
use crate::pipeline::shaders::phong::PhongShader;
use crate::scene::material::PhongMaterial;
use crate::scene::mesh::Mesh;

/// A complete 3D object: one or more meshes and the materials they reference.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<PhongMaterial>,
}

impl Model {
    pub fn new(meshes: Vec<Mesh>, materials: Vec<PhongMaterial>) -> Self {
        Self { meshes, materials }
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    /// Draws every mesh with the model-lighting program. The program must already be bound
    /// and hold this instance's transforms and the frame's lighting.
    pub fn draw(&self, renderer: &mut Renderer, device: &mut Device, program: &mut Program) {
        for mesh in &self.meshes {
            let material = mesh
                .material_id
                .and_then(|id| self.materials.get(id))
                .copied()
                .unwrap_or_default();
            material.bind(device, program);

            let shader = PhongShader::from_program(program, device);
            renderer.draw_mesh(device, program, mesh, &shader);
        }
    }
}
