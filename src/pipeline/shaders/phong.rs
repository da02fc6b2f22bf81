use crate::core::device::Device;
use crate::core::geometry::Vertex;
use crate::core::math::transform::TransformFactory;
use crate::core::pipeline::Shader;
use crate::pipeline::program::Program;
use crate::pipeline::shaders::lighting::{Surface, shade};
use crate::pipeline::uniforms::{LightingSnapshot, Transforms};
use crate::scene::texture::Texture;
use nalgebra::{Matrix3, Point3, Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Data interpolated across a model triangle.
#[derive(Clone, Copy, Debug)]
pub struct PhongVarying {
    /// Normal vector in world space.
    pub normal: Vector3<f32>,
    pub world_pos: Point3<f32>,
    pub uv: Vector2<f32>,
}

// Point3 has no Point + Point, so positions go through their coordinates.
impl Add for PhongVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            normal: self.normal + other.normal,
            world_pos: Point3::from(self.world_pos.coords + other.world_pos.coords),
            uv: self.uv + other.uv,
        }
    }
}

impl Mul<f32> for PhongVarying {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            normal: self.normal * scalar,
            world_pos: Point3::from(self.world_pos.coords * scalar),
            uv: self.uv * scalar,
        }
    }
}

/// Textured model shading: diffuse and specular maps lit by the three scene lights.
pub struct PhongShader<'a> {
    transforms: Transforms,
    normal_matrix: Matrix3<f32>,
    lighting: LightingSnapshot,
    diffuse_map: Option<&'a Texture>,
    specular_map: Option<&'a Texture>,
}

impl<'a> PhongShader<'a> {
    pub fn from_program(program: &Program, device: &'a Device) -> Self {
        let transforms = Transforms {
            model: program.mat4("model"),
            view: program.mat4("view"),
            projection: program.mat4("projection"),
        };

        Self {
            normal_matrix: TransformFactory::normal_matrix(&transforms.model),
            transforms,
            lighting: LightingSnapshot::read(program),
            diffuse_map: device.texture_at_unit(program.int("material.texture_diffuse1")),
            specular_map: device.texture_at_unit(program.int("material.texture_specular1")),
        }
    }
}

impl Shader for PhongShader<'_> {
    type Varying = PhongVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        let world = self.transforms.model * vertex.position.to_homogeneous();
        let clip = self.transforms.projection * self.transforms.view * world;

        let varying = PhongVarying {
            normal: self.normal_matrix * vertex.normal,
            world_pos: Point3::from(world.xyz()),
            uv: vertex.texcoord,
        };
        (clip, varying)
    }

    fn fragment(&self, varying: &Self::Varying) -> Vector3<f32> {
        let sample =
            |map: Option<&Texture>| map.map_or_else(Vector3::zeros, |t| t.sample(varying.uv));

        let surface = Surface {
            position: varying.world_pos,
            normal: varying.normal.try_normalize(1e-12).unwrap_or_else(Vector3::y),
            albedo: sample(self.diffuse_map),
            specular: sample(self.specular_map),
        };
        shade(&self.lighting, &surface)
    }
}
