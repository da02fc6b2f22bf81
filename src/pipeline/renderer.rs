use crate::core::device::{BufferHandle, Device, TEXTURE_UNITS, TextureHandle};
use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::{RasterStats, Rasterizer};
use crate::pipeline::program::{Program, ProgramKind, UniformSink};
use crate::scene::mesh::Mesh;
use log::warn;
use nalgebra::Vector3;

/// What one draw call saw when it was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub program: ProgramKind,
    /// Device buffer the vertices came from; `None` for CPU-side meshes.
    pub buffer: Option<BufferHandle>,
    pub vertex_count: usize,
    pub texture_units: [TextureHandle; TEXTURE_UNITS],
    /// Uniforms the program had not been given since it was bound.
    pub missing_uniforms: Vec<&'static str>,
    pub stats: RasterStats,
}

/// Owns the framebuffer and issues draws into it, keeping a log of the current frame's draws.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
    draws: Vec<DrawRecord>,
}

impl Renderer {
    /// `sample_count`: 1 for no AA, 2 for 2x2 SSAA, etc.
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height, sample_count),
            draws: Vec::new(),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.framebuffer.height == 0 {
            1.0
        } else {
            self.framebuffer.width as f32 / self.framebuffer.height as f32
        }
    }

    /// Reallocates the framebuffer when the output size changed.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.framebuffer.width || height != self.framebuffer.height {
            self.framebuffer = FrameBuffer::new(width, height, self.framebuffer.sample_count);
        }
    }

    /// Clears colour and depth and forgets the previous frame's draws.
    pub fn begin_frame(&mut self, clear_color: Vector3<f32>) {
        self.framebuffer.clear(clear_color);
        self.draws.clear();
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Draws `buffer` as a triangle list with `shader`, built from `program`.
    pub fn draw_arrays<S: Shader>(
        &mut self,
        device: &Device,
        program: &Program,
        buffer: BufferHandle,
        shader: &S,
    ) {
        let Some(vb) = device.buffer(buffer) else {
            warn!("Draw with unknown vertex buffer #{}", buffer.id());
            return;
        };

        let count = vb.vertex_count();
        let vertices = (0..count).filter_map(|i| vb.layout.fetch(&vb.data, i));
        let stats = self.submit(shader, vertices);
        self.record(device, program, Some(buffer), count, stats);
    }

    /// Draws an indexed CPU-side mesh.
    pub fn draw_mesh<S: Shader>(
        &mut self,
        device: &Device,
        program: &Program,
        mesh: &Mesh,
        shader: &S,
    ) {
        let vertices = mesh
            .indices
            .iter()
            .filter_map(|&i| mesh.vertices.get(i as usize).copied());
        let stats = self.submit(shader, vertices);
        self.record(device, program, None, mesh.indices.len(), stats);
    }

    fn submit<S: Shader>(
        &mut self,
        shader: &S,
        vertices: impl Iterator<Item = Vertex>,
    ) -> RasterStats {
        let mut stats = RasterStats::default();
        let mut clip = Vec::with_capacity(3);
        let mut varyings = Vec::with_capacity(3);

        for vertex in vertices {
            let (pos, var) = shader.vertex(&vertex);
            clip.push(pos);
            varyings.push(var);

            if clip.len() == 3 {
                let positions = [clip[0], clip[1], clip[2]];
                let vars = [varyings[0], varyings[1], varyings[2]];
                self.rasterizer.rasterize_triangle(
                    &mut self.framebuffer,
                    shader,
                    &positions,
                    &vars,
                    &mut stats,
                );
                clip.clear();
                varyings.clear();
            }
        }
        stats
    }

    fn record(
        &mut self,
        device: &Device,
        program: &Program,
        buffer: Option<BufferHandle>,
        vertex_count: usize,
        stats: RasterStats,
    ) {
        let missing = program.missing_uniforms();
        if !missing.is_empty() {
            warn!(
                "{:?} draw issued with {} uniform(s) not set since bind: {}",
                program.kind(),
                missing.len(),
                missing.join(", ")
            );
        }

        self.draws.push(DrawRecord {
            program: program.kind(),
            buffer,
            vertex_count,
            texture_units: device.bound_units(),
            missing_uniforms: missing,
            stats,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::VertexLayout;
    use crate::pipeline::shaders::skybox::{SKYBOX_VERTICES, SkyboxShader};
    use nalgebra::Matrix4;

    #[test]
    fn incomplete_program_is_recorded() {
        let mut device = Device::new();
        let buffer = device.create_vertex_buffer(&SKYBOX_VERTICES, VertexLayout::positions());
        let mut program = Program::new(ProgramKind::Skybox);
        program.use_program();
        program.set_mat4("projection", &Matrix4::identity());

        let mut renderer = Renderer::new(8, 8, 1);
        renderer.begin_frame(Vector3::zeros());
        let shader = SkyboxShader::from_program(&program, &device);
        renderer.draw_arrays(&device, &program, buffer, &shader);

        let draw = &renderer.draws()[0];
        assert_eq!(draw.vertex_count, 36);
        assert_eq!(draw.buffer, Some(buffer));
        assert_eq!(draw.missing_uniforms, vec!["view", "skybox"]);
        assert_eq!(draw.stats.triangles, 12);
    }

    #[test]
    fn begin_frame_forgets_previous_draws() {
        let mut device = Device::new();
        let buffer = device.create_vertex_buffer(&SKYBOX_VERTICES, VertexLayout::positions());
        let program = Program::new(ProgramKind::Skybox);
        let mut renderer = Renderer::new(4, 4, 1);

        let shader = SkyboxShader::from_program(&program, &device);
        renderer.draw_arrays(&device, &program, buffer, &shader);
        assert_eq!(renderer.draws().len(), 1);

        renderer.begin_frame(Vector3::zeros());
        assert!(renderer.draws().is_empty());
    }

    #[test]
    fn resize_keeps_the_sample_count() {
        let mut renderer = Renderer::new(4, 4, 2);
        renderer.resize(10, 5);
        assert_eq!(renderer.framebuffer.buffer_width, 20);
        assert_eq!(renderer.aspect_ratio(), 2.0);
    }
}
