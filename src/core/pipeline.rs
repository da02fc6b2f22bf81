use crate::core::geometry::Vertex;
use nalgebra::{Vector3, Vector4};
use std::ops::{Add, Mul};

/// Types that can be linearly combined across a triangle's surface.
///
/// Barycentric interpolation only ever needs `a * wa + b * wb + c * wc`.
pub trait Interpolatable: Copy + Add<Output = Self> + Mul<f32, Output = Self> {}

impl<T> Interpolatable for T where T: Copy + Add<Output = T> + Mul<f32, Output = T> {}

/// The programmable stages of a draw.
///
/// A shader is built from a program's current uniform values right before the draw, so it
/// holds everything it needs by value or by borrow and has no other inputs.
pub trait Shader {
    /// Per-vertex outputs interpolated for each fragment.
    type Varying: Interpolatable;

    /// Transforms a vertex into homogeneous clip space and emits its varying.
    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying);

    /// Linear RGB of the fragment. Values above 1.0 are clamped on output.
    fn fragment(&self, varying: &Self::Varying) -> Vector3<f32>;
}
