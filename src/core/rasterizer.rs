use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{
    barycentric_coordinates, edge_function, is_inside_triangle, perspective_correct_barycentric,
};
use crate::core::math::transform::{apply_perspective_division, ndc_to_screen};
use crate::core::pipeline::Shader;
use nalgebra::{Point2, Vector4};
use serde::Deserialize;

/// Which triangle facing is discarded before shading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CullMode {
    /// Drop clockwise (as seen on screen) triangles.
    Back,
    Front,
    None,
}

/// Plane `sign * p[axis] <= p.w` of the canonical view volume.
#[derive(Debug, Clone, Copy)]
struct ClipPlane {
    axis: usize,
    sign: f32,
}

impl ClipPlane {
    const FRUSTUM: [ClipPlane; 6] = [
        ClipPlane { axis: 0, sign: 1.0 },
        ClipPlane { axis: 0, sign: -1.0 },
        ClipPlane { axis: 1, sign: 1.0 },
        ClipPlane { axis: 1, sign: -1.0 },
        ClipPlane { axis: 2, sign: 1.0 },
        ClipPlane { axis: 2, sign: -1.0 },
    ];

    /// Positive inside the plane.
    #[inline(always)]
    fn distance(&self, p: &Vector4<f32>) -> f32 {
        p.w - self.sign * p[self.axis]
    }
}

/// Statistics of the triangles pushed through one draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub triangles: usize,
    pub culled: usize,
    pub clipped_away: usize,
    pub fragments: usize,
}

/// Draws clip-space triangles into a [`FrameBuffer`].
#[derive(Debug, Clone)]
pub struct Rasterizer {
    pub cull_mode: CullMode,
    /// Whether passing fragments overwrite depth.
    pub depth_write: bool,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            cull_mode: CullMode::Back,
            depth_write: true,
        }
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    /// Clips a triangle against the view volume (Sutherland-Hodgman in homogeneous space),
    /// fans the remaining polygon into triangles and shades their covered samples.
    pub fn rasterize_triangle<S: Shader>(
        &self,
        framebuffer: &mut FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        stats: &mut RasterStats,
    ) {
        stats.triangles += 1;

        let mut polygon: Vec<(Vector4<f32>, S::Varying)> = clip_coords
            .iter()
            .copied()
            .zip(varyings.iter().copied())
            .collect();
        let mut scratch = Vec::with_capacity(9);

        for plane in &ClipPlane::FRUSTUM {
            clip_against(&polygon, &mut scratch, plane);
            std::mem::swap(&mut polygon, &mut scratch);
            if polygon.len() < 3 {
                stats.clipped_away += 1;
                return;
            }
        }

        let (first, rest) = (polygon[0], &polygon[1..]);
        for pair in rest.windows(2) {
            self.fill_triangle(
                framebuffer,
                shader,
                &[first.0, pair[0].0, pair[1].0],
                &[first.1, pair[0].1, pair[1].1],
                stats,
            );
        }
    }

    fn fill_triangle<S: Shader>(
        &self,
        framebuffer: &mut FrameBuffer,
        shader: &S,
        clip: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        stats: &mut RasterStats,
    ) {
        let width = framebuffer.buffer_width as f32;
        let height = framebuffer.buffer_height as f32;

        let mut screen = [Point2::origin(); 3];
        let mut ndc_z = [0.0; 3];
        let mut w = [0.0; 3];
        for i in 0..3 {
            if clip[i].w.abs() < 1e-6 {
                return;
            }
            let ndc = apply_perspective_division(&clip[i]);
            screen[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
            ndc_z[i] = ndc.z;
            w[i] = clip[i].w;
        }

        let area = edge_function(screen[0], screen[1], screen[2]);
        let culled = match self.cull_mode {
            CullMode::Back => area >= 0.0,
            CullMode::Front => area <= 0.0,
            CullMode::None => false,
        };
        if culled {
            stats.culled += 1;
            return;
        }

        let Some((x0, y0, x1, y1)) = bounding_box(&screen, framebuffer) else {
            return;
        };

        for y in y0..=y1 {
            for x in x0..=x1 {
                let centre = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some(bary) = barycentric_coordinates(centre, screen[0], screen[1], screen[2])
                else {
                    return;
                };
                if !is_inside_triangle(bary) {
                    continue;
                }

                // NDC depth is affine in screen space; attributes are not.
                let z = bary.x * ndc_z[0] + bary.y * ndc_z[1] + bary.z * ndc_z[2];
                let depth = z * 0.5 + 0.5;
                if !self.depth_passes(framebuffer, x, y, depth) {
                    continue;
                }

                let Some(pc) = perspective_correct_barycentric(bary, w) else {
                    continue;
                };
                let varying = varyings[0] * pc.x + varyings[1] * pc.y + varyings[2] * pc.z;
                framebuffer.set_sample(x, y, shader.fragment(&varying));
                stats.fragments += 1;
            }
        }
    }

    fn depth_passes(&self, framebuffer: &mut FrameBuffer, x: usize, y: usize, depth: f32) -> bool {
        if self.depth_write {
            framebuffer.depth_test_and_update(x, y, depth)
        } else {
            framebuffer
                .sample_depth(x, y)
                .is_some_and(|stored| depth < stored)
        }
    }
}

fn clip_against<V: Copy + std::ops::Add<Output = V> + std::ops::Mul<f32, Output = V>>(
    input: &[(Vector4<f32>, V)],
    output: &mut Vec<(Vector4<f32>, V)>,
    plane: &ClipPlane,
) {
    output.clear();
    let Some(&last) = input.last() else {
        return;
    };

    let mut prev = last;
    let mut prev_d = plane.distance(&prev.0);
    for &curr in input {
        let curr_d = plane.distance(&curr.0);
        if (prev_d >= 0.0) != (curr_d >= 0.0) {
            let t = prev_d / (prev_d - curr_d);
            output.push((
                prev.0 + (curr.0 - prev.0) * t,
                prev.1 * (1.0 - t) + curr.1 * t,
            ));
        }
        if curr_d >= 0.0 {
            output.push(curr);
        }
        prev = curr;
        prev_d = curr_d;
    }
}

/// Inclusive sample range covered by the triangle, or `None` when it lies off-screen.
fn bounding_box(
    points: &[Point2<f32>; 3],
    framebuffer: &FrameBuffer,
) -> Option<(usize, usize, usize, usize)> {
    let min_x = points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor();
    let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor();
    let max_x = points.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil();
    let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil();

    let (bw, bh) = (framebuffer.buffer_width as f32, framebuffer.buffer_height as f32);
    if max_x < 0.0 || max_y < 0.0 || min_x >= bw || min_y >= bh || bw == 0.0 || bh == 0.0 {
        return None;
    }

    Some((
        min_x.max(0.0) as usize,
        min_y.max(0.0) as usize,
        max_x.min(bw - 1.0) as usize,
        max_y.min(bh - 1.0) as usize,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vertex;
    use nalgebra::Vector3;

    /// Passes clip positions through and paints a constant colour.
    struct Flat(Vector3<f32>);

    impl Shader for Flat {
        type Varying = f32;

        fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, f32) {
            (vertex.position.to_homogeneous(), 0.0)
        }

        fn fragment(&self, _varying: &f32) -> Vector3<f32> {
            self.0
        }
    }

    fn ccw_triangle(z: f32) -> [Vector4<f32>; 3] {
        [
            Vector4::new(-0.5, -0.5, z, 1.0),
            Vector4::new(0.5, -0.5, z, 1.0),
            Vector4::new(0.0, 0.5, z, 1.0),
        ]
    }

    #[test]
    fn front_facing_triangle_covers_the_centre() {
        let mut fb = FrameBuffer::new(16, 16, 1);
        let mut stats = RasterStats::default();
        let raster = Rasterizer::new();
        let red = Flat(Vector3::new(1.0, 0.0, 0.0));

        raster.rasterize_triangle(&mut fb, &red, &ccw_triangle(0.0), &[0.0; 3], &mut stats);

        assert_eq!(fb.get_pixel(8, 8), Some(Vector3::new(1.0, 0.0, 0.0)));
        assert_eq!(fb.depth_at(8, 8), Some(0.5));
        assert_eq!(fb.depth_at(0, 0), Some(f32::INFINITY));
        assert!(stats.fragments > 0);
    }

    #[test]
    fn back_faces_are_culled_unless_disabled() {
        let mut tri = ccw_triangle(0.0);
        tri.swap(1, 2);
        let shader = Flat(Vector3::new(0.0, 1.0, 0.0));
        let mut fb = FrameBuffer::new(16, 16, 1);
        let mut stats = RasterStats::default();

        let mut raster = Rasterizer::new();
        raster.rasterize_triangle(&mut fb, &shader, &tri, &[0.0; 3], &mut stats);
        assert_eq!(stats.culled, 1);
        assert_eq!(fb.depth_at(8, 8), Some(f32::INFINITY));

        raster.set_cull_mode(CullMode::None);
        raster.rasterize_triangle(&mut fb, &shader, &tri, &[0.0; 3], &mut stats);
        assert_eq!(fb.get_pixel(8, 8), Some(Vector3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn nearer_triangle_wins() {
        let mut fb = FrameBuffer::new(16, 16, 1);
        let mut stats = RasterStats::default();
        let raster = Rasterizer::new();
        let near = Flat(Vector3::new(1.0, 1.0, 1.0));
        let far = Flat(Vector3::new(0.0, 0.0, 1.0));

        raster.rasterize_triangle(&mut fb, &near, &ccw_triangle(-0.5), &[0.0; 3], &mut stats);
        raster.rasterize_triangle(&mut fb, &far, &ccw_triangle(0.5), &[0.0; 3], &mut stats);

        assert_eq!(fb.get_pixel(8, 8), Some(Vector3::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn triangle_behind_the_camera_is_clipped_away() {
        let mut fb = FrameBuffer::new(8, 8, 1);
        let mut stats = RasterStats::default();
        let tri = [
            Vector4::new(-0.5, -0.5, 0.0, -1.0),
            Vector4::new(0.5, -0.5, 0.0, -1.0),
            Vector4::new(0.0, 0.5, 0.0, -1.0),
        ];

        Rasterizer::new().rasterize_triangle(
            &mut fb,
            &Flat(Vector3::zeros()),
            &tri,
            &[0.0; 3],
            &mut stats,
        );
        assert_eq!(stats.clipped_away, 1);
        assert_eq!(stats.fragments, 0);
    }

    #[test]
    fn partially_visible_triangle_is_clipped_not_dropped() {
        let mut fb = FrameBuffer::new(16, 16, 1);
        let mut stats = RasterStats::default();
        let tri = [
            Vector4::new(-3.0, -0.5, 0.0, 1.0),
            Vector4::new(3.0, -0.5, 0.0, 1.0),
            Vector4::new(0.0, 0.8, 0.0, 1.0),
        ];

        Rasterizer::new().rasterize_triangle(
            &mut fb,
            &Flat(Vector3::x()),
            &tri,
            &[0.0; 3],
            &mut stats,
        );
        assert_eq!(fb.get_pixel(1, 10), Some(Vector3::x()));
        assert_eq!(fb.get_pixel(14, 10), Some(Vector3::x()));
    }
}
