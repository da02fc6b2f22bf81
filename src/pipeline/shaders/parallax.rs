use crate::core::device::Device;
use crate::core::geometry::Vertex;
use crate::core::math::transform::TransformFactory;
use crate::core::pipeline::Shader;
use crate::core::tangent::TangentFrame;
use crate::pipeline::program::Program;
use crate::pipeline::shaders::lighting::{Surface, shade};
use crate::pipeline::uniforms::{LightingSnapshot, Transforms};
use crate::scene::texture::Texture;
use nalgebra::{Matrix3, Point3, Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};

const MIN_LAYERS: f32 = 8.0;
const MAX_LAYERS: f32 = 32.0;

/// Fixed specular tint of the seabed.
const GROUND_SPECULAR: f32 = 0.2;

#[derive(Clone, Copy, Debug)]
pub struct ParallaxVarying {
    pub world_pos: Point3<f32>,
    pub uv: Vector2<f32>,
    pub normal: Vector3<f32>,
    pub tangent: Vector3<f32>,
    pub bitangent: Vector3<f32>,
}

impl Add for ParallaxVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            world_pos: Point3::from(self.world_pos.coords + other.world_pos.coords),
            uv: self.uv + other.uv,
            normal: self.normal + other.normal,
            tangent: self.tangent + other.tangent,
            bitangent: self.bitangent + other.bitangent,
        }
    }
}

impl Mul<f32> for ParallaxVarying {
    type Output = Self;

    fn mul(self, s: f32) -> Self {
        Self {
            world_pos: Point3::from(self.world_pos.coords * s),
            uv: self.uv * s,
            normal: self.normal * s,
            tangent: self.tangent * s,
            bitangent: self.bitangent * s,
        }
    }
}

/// Normal-mapped, parallax-occlusion-mapped surface lit by the scene lights.
///
/// Samples `diffuseMap`, `normalMap` and `depthMap` from the units their sampler uniforms
/// name. An unbound map samples black, which for the depth map means no offset at all.
pub struct ParallaxShader<'a> {
    transforms: Transforms,
    normal_matrix: Matrix3<f32>,
    lighting: LightingSnapshot,
    diffuse: Option<&'a Texture>,
    normal: Option<&'a Texture>,
    depth: Option<&'a Texture>,
}

impl<'a> ParallaxShader<'a> {
    /// Snapshots the program's current uniforms and resolves its samplers on `device`.
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
            diffuse: device.texture_at_unit(program.int("diffuseMap")),
            normal: device.texture_at_unit(program.int("normalMap")),
            depth: device.texture_at_unit(program.int("depthMap")),
        }
    }

    fn sample(texture: Option<&Texture>, uv: Vector2<f32>) -> Vector3<f32> {
        texture.map_or_else(Vector3::zeros, |t| t.sample(uv))
    }

    /// Steep parallax occlusion mapping: marches the depth map along the tangent-space view
    /// ray and interpolates between the last two layers.
    fn parallax_uv(&self, uv: Vector2<f32>, view_ts: &Vector3<f32>) -> Vector2<f32> {
        let height_scale = self.lighting.height_scale;
        if self.depth.is_none() || height_scale == 0.0 {
            return uv;
        }

        let cos_view = view_ts.z.abs().min(1.0);
        let layers = MAX_LAYERS + (MIN_LAYERS - MAX_LAYERS) * cos_view;
        let layer_depth = 1.0 / layers;

        // Grazing views would push the offset towards infinity.
        let z = view_ts.z.abs().max(0.05);
        let shift = view_ts.xy() / z * height_scale;
        let delta = shift / layers;

        let depth_at = |uv: Vector2<f32>| Self::sample(self.depth, uv).x;

        let mut current_uv = uv;
        let mut current_depth = depth_at(current_uv);
        let mut layer = 0.0;
        let mut steps = 0;
        while layer < current_depth && steps < MAX_LAYERS as usize {
            current_uv -= delta;
            current_depth = depth_at(current_uv);
            layer += layer_depth;
            steps += 1;
        }

        let prev_uv = current_uv + delta;
        let after = current_depth - layer;
        let before = depth_at(prev_uv) - layer + layer_depth;
        let denom = after - before;
        if denom.abs() < 1e-6 {
            return current_uv;
        }
        let weight = after / denom;
        prev_uv * weight + current_uv * (1.0 - weight)
    }
}

impl Shader for ParallaxShader<'_> {
    type Varying = ParallaxVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        let world = self.transforms.model * vertex.position.to_homogeneous();
        let clip = self.transforms.projection * self.transforms.view * world;

        let varying = ParallaxVarying {
            world_pos: Point3::from(world.xyz()),
            uv: vertex.texcoord,
            normal: self.normal_matrix * vertex.normal,
            tangent: self.normal_matrix * vertex.tangent,
            bitangent: self.normal_matrix * vertex.bitangent,
        };
        (clip, varying)
    }

    fn fragment(&self, v: &Self::Varying) -> Vector3<f32> {
        let n = v.normal.try_normalize(1e-12).unwrap_or_else(Vector3::y);
        let t = (v.tangent - n * n.dot(&v.tangent))
            .try_normalize(1e-12)
            .unwrap_or_else(|| TangentFrame::around_normal(&n).tangent);
        let mut b = n.cross(&t);
        if b.dot(&v.bitangent) < 0.0 {
            b = -b;
        }
        let tbn = Matrix3::from_columns(&[t, b, n]);

        let to_eye = (self.lighting.view_position - v.world_pos)
            .try_normalize(1e-12)
            .unwrap_or(n);
        let view_ts = tbn.transpose() * to_eye;

        let uv = self.parallax_uv(v.uv, &view_ts);

        let normal = match self.normal {
            Some(map) => {
                let texel = map.sample(uv) * 2.0 - Vector3::repeat(1.0);
                (tbn * texel).try_normalize(1e-12).unwrap_or(n)
            }
            None => n,
        };

        let surface = Surface {
            position: v.world_pos,
            normal,
            albedo: Self::sample(self.diffuse, uv),
            specular: Vector3::repeat(GROUND_SPECULAR),
        };
        shade(&self.lighting, &surface)
    }
}
