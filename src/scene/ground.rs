//! The seabed: a single large quad carrying a per-triangle tangent frame, uploaded once and
//! drawn with the parallax program every frame.

use crate::core::device::{BufferHandle, Device};
use crate::core::geometry::{FLOATS_PER_VERTEX, GpuVertex, Vertex, VertexLayout};
use crate::core::tangent::TangentFrame;
use crate::pipeline::program::Program;
use crate::pipeline::renderer::Renderer;
use crate::pipeline::shaders::parallax::ParallaxShader;
use bytemuck::Zeroable;
use log::{info, warn};
use nalgebra::{Point3, Vector2, Vector3};
use serde::Deserialize;

/// Vertices of the two triangles P1-P2-P3 and P1-P3-P4.
pub const GROUND_VERTEX_COUNT: usize = 6;
pub const GROUND_FLOAT_COUNT: usize = GROUND_VERTEX_COUNT * FLOATS_PER_VERTEX;

/// What to do when a triangle's UVs span no area and its tangent frame is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegenerateUvPolicy {
    /// Use the plain formula; the frame comes out inf/NaN.
    Reproduce,
    /// Warn and substitute an orthonormal frame around the normal.
    #[default]
    Guard,
}

/// Four corners, a shared normal and four texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundQuad {
    pub corners: [Point3<f32>; 4],
    pub normal: Vector3<f32>,
    pub uvs: [Vector2<f32>; 4],
}

impl Default for GroundQuad {
    fn default() -> Self {
        Self {
            corners: [
                Point3::new(60.0, -0.8, 60.0),
                Point3::new(60.0, -0.8, -60.0),
                Point3::new(-60.0, -0.8, -60.0),
                Point3::new(-60.0, -0.8, 60.0),
            ],
            normal: Vector3::y(),
            uvs: [
                Vector2::new(0.0, 1.0),
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 0.0),
                Vector2::new(1.0, 1.0),
            ],
        }
    }
}

impl GroundQuad {
    const TRIANGLES: [[usize; 3]; 2] = [[0, 1, 2], [0, 2, 3]];

    /// One frame per triangle, in draw order.
    pub fn tangent_frames(&self, policy: DegenerateUvPolicy) -> [TangentFrame; 2] {
        Self::TRIANGLES.map(|[a, b, c]| {
            let positions = [self.corners[a], self.corners[b], self.corners[c]];
            let uvs = [self.uvs[a], self.uvs[b], self.uvs[c]];

            match policy {
                DegenerateUvPolicy::Reproduce => {
                    TangentFrame::from_triangle_unguarded(positions, uvs)
                }
                DegenerateUvPolicy::Guard => TangentFrame::from_triangle(positions, uvs)
                    .unwrap_or_else(|e| {
                        warn!(
                            "Ground triangle P{}-P{}-P{}: {}, using a frame around the normal",
                            a + 1,
                            b + 1,
                            c + 1,
                            e
                        );
                        TangentFrame::around_normal(&self.normal)
                    }),
            }
        })
    }

    pub fn vertices(&self, policy: DegenerateUvPolicy) -> [GpuVertex; GROUND_VERTEX_COUNT] {
        let frames = self.tangent_frames(policy);
        let mut out = [GpuVertex::zeroed(); GROUND_VERTEX_COUNT];

        let corners = Self::TRIANGLES.iter().flatten();
        let frame_of_slot = [0, 0, 0, 1, 1, 1];
        for ((slot, &corner), frame) in out.iter_mut().zip(corners).zip(frame_of_slot) {
            let frame = &frames[frame];
            let vertex = Vertex::new(self.corners[corner], self.normal, self.uvs[corner])
                .with_tangent_frame(frame.tangent, frame.bitangent);
            *slot = GpuVertex::from(&vertex);
        }
        out
    }

    /// The interleaved float stream uploaded to the device.
    pub fn vertex_stream(&self, policy: DegenerateUvPolicy) -> Vec<f32> {
        let vertices = self.vertices(policy);
        bytemuck::cast_slice::<GpuVertex, f32>(&vertices).to_vec()
    }
}

/// The uploaded ground quad. Created once during setup and drawn every frame.
#[derive(Debug)]
pub struct GroundPlane {
    handle: BufferHandle,
    vertex_count: usize,
}

impl GroundPlane {
    pub fn create(device: &mut Device, quad: &GroundQuad, policy: DegenerateUvPolicy) -> Self {
        let stream = quad.vertex_stream(policy);
        debug_assert_eq!(stream.len(), GROUND_FLOAT_COUNT);
        let handle = device.create_vertex_buffer(&stream, VertexLayout::tangent_space());
        info!(
            "Ground plane uploaded: buffer #{}, {} vertices",
            handle.id(),
            GROUND_VERTEX_COUNT
        );

        Self {
            handle,
            vertex_count: GROUND_VERTEX_COUNT,
        }
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Issues the ground draw with `program`, which must be bound with its transforms,
    /// lighting and maps in place.
    pub fn draw(&self, renderer: &mut Renderer, device: &Device, program: &Program) {
        let shader = ParallaxShader::from_program(program, device);
        renderer.draw_arrays(device, program, self.handle, &shader);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::program::ProgramKind;

    #[test]
    fn stream_has_fourteen_floats_per_vertex() {
        let quad = GroundQuad::default();
        assert_eq!(quad.vertex_stream(DegenerateUvPolicy::Guard).len(), GROUND_FLOAT_COUNT);

        let flat = GroundQuad {
            uvs: [Vector2::zeros(); 4],
            ..quad
        };
        assert_eq!(flat.vertex_stream(DegenerateUvPolicy::Guard).len(), GROUND_FLOAT_COUNT);
        assert_eq!(
            flat.vertex_stream(DegenerateUvPolicy::Reproduce).len(),
            GROUND_FLOAT_COUNT
        );
    }

    #[test]
    fn first_triangle_tangent_runs_along_x() {
        let [first, _] = GroundQuad::default().tangent_frames(DegenerateUvPolicy::Guard);
        let t = first.tangent;
        assert!(t.x.abs() > t.y.abs() && t.x.abs() > t.z.abs());
    }

    #[test]
    fn triangles_are_laid_out_p1_p2_p3_p1_p3_p4() {
        let quad = GroundQuad::default();
        let verts = quad.vertices(DegenerateUvPolicy::Guard);
        let order = [0, 1, 2, 0, 2, 3];
        for (v, &corner) in verts.iter().zip(&order) {
            assert_eq!(v.position, <[f32; 3]>::from(quad.corners[corner].coords));
            assert_eq!(v.texcoord, <[f32; 2]>::from(quad.uvs[corner]));
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
        assert_eq!(verts[0].tangent, verts[2].tangent);
        assert_eq!(verts[3].tangent, verts[5].tangent);
    }

    #[test]
    fn guard_replaces_degenerate_frames_with_finite_ones() {
        let quad = GroundQuad {
            uvs: [Vector2::new(0.5, 0.5); 4],
            ..GroundQuad::default()
        };

        let guarded = quad.tangent_frames(DegenerateUvPolicy::Guard);
        assert!(guarded.iter().all(TangentFrame::is_finite));

        let raw = quad.tangent_frames(DegenerateUvPolicy::Reproduce);
        assert!(raw.iter().all(|f| !f.is_finite()));
    }

    #[test]
    fn repeated_draws_reuse_the_single_buffer() {
        let mut device = Device::new();
        let ground =
            GroundPlane::create(&mut device, &GroundQuad::default(), DegenerateUvPolicy::Guard);
        let program = Program::new(ProgramKind::Parallax);
        let mut renderer = Renderer::new(8, 8, 1);

        for _ in 0..5 {
            ground.draw(&mut renderer, &device, &program);
        }

        assert_eq!(device.buffer_count(), 1);
        assert_eq!(renderer.draws().len(), 5);
        assert!(renderer.draws().iter().all(|d| {
            d.buffer == Some(ground.handle()) && d.vertex_count == GROUND_VERTEX_COUNT
        }));
    }
}
