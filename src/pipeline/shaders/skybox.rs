use crate::core::device::Device;
use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use crate::pipeline::program::Program;
use crate::scene::texture::Cubemap;
use nalgebra::{Matrix4, Vector3, Vector4};

/// Unit cube drawn from the inside, 36 positions.
#[rustfmt::skip]
pub const SKYBOX_VERTICES: [f32; 108] = [
    -1.0,  1.0, -1.0,  -1.0, -1.0, -1.0,   1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,   1.0,  1.0, -1.0,  -1.0,  1.0, -1.0,

    -1.0, -1.0,  1.0,  -1.0, -1.0, -1.0,  -1.0,  1.0, -1.0,
    -1.0,  1.0, -1.0,  -1.0,  1.0,  1.0,  -1.0, -1.0,  1.0,

     1.0, -1.0, -1.0,   1.0, -1.0,  1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,   1.0,  1.0, -1.0,   1.0, -1.0, -1.0,

    -1.0, -1.0,  1.0,  -1.0,  1.0,  1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,   1.0, -1.0,  1.0,  -1.0, -1.0,  1.0,

    -1.0,  1.0, -1.0,   1.0,  1.0, -1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,  -1.0,  1.0,  1.0,  -1.0,  1.0, -1.0,

    -1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,   1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,   1.0, -1.0,  1.0,
];

/// Environment cube centred on the eye. Positions are pushed to the far plane
/// (`z = w`), so the cube only shows where nothing else was drawn.
pub struct SkyboxShader<'a> {
    view_projection: Matrix4<f32>,
    cubemap: Option<&'a Cubemap>,
}

impl<'a> SkyboxShader<'a> {
    pub fn from_program(program: &Program, device: &'a Device) -> Self {
        Self {
            view_projection: program.mat4("projection") * program.mat4("view"),
            cubemap: device.cubemap_at_unit(program.int("skybox")),
        }
    }
}

impl Shader for SkyboxShader<'_> {
    type Varying = Vector3<f32>;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Vector3<f32>) {
        let clip = self.view_projection * vertex.position.to_homogeneous();
        (Vector4::new(clip.x, clip.y, clip.w, clip.w), vertex.position.coords)
    }

    fn fragment(&self, direction: &Vector3<f32>) -> Vector3<f32> {
        self.cubemap
            .map_or_else(Vector3::zeros, |cube| cube.sample(direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::program::{ProgramKind, UniformSink};
    use crate::scene::texture::Texture;
    use nalgebra::{Point3, Vector2};

    #[test]
    fn cube_has_thirty_six_vertices() {
        assert_eq!(SKYBOX_VERTICES.len() / 3, 36);
        assert!(SKYBOX_VERTICES.iter().all(|c| c.abs() == 1.0));
    }

    #[test]
    fn vertices_land_on_the_far_plane() {
        let device = Device::new();
        let mut program = Program::new(ProgramKind::Skybox);
        program.set_mat4("view", &Matrix4::identity());
        program.set_mat4("projection", &Matrix4::identity());
        let shader = SkyboxShader::from_program(&program, &device);

        let v = Vertex::new(Point3::new(1.0, -1.0, -1.0), Vector3::zeros(), Vector2::zeros());
        let (clip, dir) = shader.vertex(&v);
        assert_eq!(clip.z, clip.w);
        assert_eq!(dir, Vector3::new(1.0, -1.0, -1.0));
    }

    #[test]
    fn samples_the_cubemap_bound_at_its_unit() {
        let mut device = Device::new();
        let mut faces: [Option<Texture>; 6] = Default::default();
        faces[4] = Some(Texture::solid(Vector3::new(0.0, 0.0, 1.0)));
        let cube = device.upload_cubemap(Cubemap::new(faces));
        device.bind_texture(0, cube);

        let mut program = Program::new(ProgramKind::Skybox);
        program.set_int("skybox", 0);
        let shader = SkyboxShader::from_program(&program, &device);

        assert_eq!(shader.fragment(&Vector3::z()), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(shader.fragment(&Vector3::x()), Vector3::zeros());
    }
}
