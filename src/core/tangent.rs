use crate::error::{ReefError, Result};
use nalgebra::{Point3, Vector2, Vector3};

/// Below this UV determinant a triangle's texture mapping is treated as degenerate.
pub const DEGENERATE_UV_EPSILON: f32 = 1e-8;

/// Per-triangle tangent and bitangent, shared by the triangle's three vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentFrame {
    pub tangent: Vector3<f32>,
    pub bitangent: Vector3<f32>,
}

impl TangentFrame {
    /// Solves `E1 = ΔUV1.x·T + ΔUV1.y·B`, `E2 = ΔUV2.x·T + ΔUV2.y·B` for T and B.
    ///
    /// Fails when the UV parallelogram has no area, i.e. the 2x2 system is singular.
    pub fn from_triangle(positions: [Point3<f32>; 3], uvs: [Vector2<f32>; 3]) -> Result<Self> {
        let (edge1, edge2, delta_uv1, delta_uv2) = triangle_deltas(positions, uvs);
        let determinant = uv_determinant(delta_uv1, delta_uv2);

        if !determinant.is_finite() || determinant.abs() < DEGENERATE_UV_EPSILON {
            return Err(ReefError::DegenerateUv { determinant });
        }

        Ok(solve(edge1, edge2, delta_uv1, delta_uv2, 1.0 / determinant))
    }

    /// Same system without the singularity check. A zero determinant yields inf/NaN
    /// components, exactly like the textbook formula.
    pub fn from_triangle_unguarded(positions: [Point3<f32>; 3], uvs: [Vector2<f32>; 3]) -> Self {
        let (edge1, edge2, delta_uv1, delta_uv2) = triangle_deltas(positions, uvs);
        let f = 1.0 / uv_determinant(delta_uv1, delta_uv2);
        solve(edge1, edge2, delta_uv1, delta_uv2, f)
    }

    /// An arbitrary orthonormal frame around `normal`, used in place of a degenerate one.
    pub fn around_normal(normal: &Vector3<f32>) -> Self {
        let n = normal.try_normalize(1e-12).unwrap_or_else(Vector3::y);
        let helper = if n.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::z()
        };
        let tangent = (helper - n * n.dot(&helper)).normalize();
        let bitangent = n.cross(&tangent);
        Self { tangent, bitangent }
    }

    pub fn is_finite(&self) -> bool {
        self.tangent.iter().chain(self.bitangent.iter()).all(|c| c.is_finite())
    }
}

fn triangle_deltas(
    p: [Point3<f32>; 3],
    uv: [Vector2<f32>; 3],
) -> (Vector3<f32>, Vector3<f32>, Vector2<f32>, Vector2<f32>) {
    (p[1] - p[0], p[2] - p[0], uv[1] - uv[0], uv[2] - uv[0])
}

#[inline]
fn uv_determinant(delta_uv1: Vector2<f32>, delta_uv2: Vector2<f32>) -> f32 {
    delta_uv1.x * delta_uv2.y - delta_uv2.x * delta_uv1.y
}

#[inline]
fn solve(
    edge1: Vector3<f32>,
    edge2: Vector3<f32>,
    delta_uv1: Vector2<f32>,
    delta_uv2: Vector2<f32>,
    f: f32,
) -> TangentFrame {
    TangentFrame {
        tangent: (edge1 * delta_uv2.y - edge2 * delta_uv1.y) * f,
        bitangent: (edge1 * -delta_uv2.x + edge2 * delta_uv1.x) * f,
    }
}
