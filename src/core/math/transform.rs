use nalgebra::{Matrix3, Matrix4, Point2, Point3, Unit, Vector3, Vector4};

/// Builds the transformation matrices the scene needs. Right-handed, camera looking down -Z,
/// NDC depth in [-1, 1].
pub struct TransformFactory;

impl TransformFactory {
    pub fn translation(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    /// Rotation of `angle_rad` around `axis`. A zero axis gives the identity.
    pub fn rotation(axis: &Vector3<f32>, angle_rad: f32) -> Matrix4<f32> {
        match Unit::try_new(*axis, 1e-12) {
            Some(axis) => Matrix4::from_axis_angle(&axis, angle_rad),
            None => Matrix4::identity(),
        }
    }

    pub fn scaling(factor: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(factor)
    }

    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(scale)
    }

    /// World-to-view matrix for an eye at `eye` looking at `target`.
    pub fn look_at(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::look_at_rh(eye, target, up)
    }

    /// OpenGL-style perspective projection. `fov_y_rad` is the full vertical angle.
    pub fn perspective(aspect_ratio: f32, fov_y_rad: f32, near: f32, far: f32) -> Matrix4<f32> {
        Matrix4::new_perspective(aspect_ratio, fov_y_rad, near, far)
    }

    /// Keeps the rotational 3x3 block of a view matrix and drops its translation.
    pub fn rotation_only(view: &Matrix4<f32>) -> Matrix4<f32> {
        let rotation: Matrix3<f32> = view.fixed_view::<3, 3>(0, 0).into_owned();
        rotation.to_homogeneous()
    }

    /// Matrix that brings normals from object to world space.
    pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
        let linear: Matrix3<f32> = model.fixed_view::<3, 3>(0, 0).into_owned();
        linear
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or(linear)
    }
}

/// Clip space to NDC. A vanishing `w` collapses to the origin.
#[inline]
pub fn apply_perspective_division(clip: &Vector4<f32>) -> Point3<f32> {
    if clip.w.abs() > 1e-6 {
        Point3::from(clip.xyz() / clip.w)
    } else {
        Point3::origin()
    }
}

/// Viewport transform. NDC +Y is up while screen rows grow downwards.
#[inline]
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> Point2<f32> {
    Point2::new((ndc_x + 1.0) * 0.5 * width, (1.0 - ndc_y) * 0.5 * height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_only_discards_translation() {
        let view = TransformFactory::look_at(
            &Point3::new(3.0, 1.0, 5.0),
            &Point3::new(3.0, 1.0, 4.0),
            &Vector3::y(),
        );
        let rot = TransformFactory::rotation_only(&view);

        assert_eq!(rot.column(3).into_owned(), Vector4::new(0.0, 0.0, 0.0, 1.0));
        let d = rot.transform_vector(&Vector3::new(0.0, 0.0, -1.0));
        assert!((d - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-6);
    }

    #[test]
    fn perspective_maps_near_and_far_to_ndc_bounds() {
        let proj = TransformFactory::perspective(1.0, 45f32.to_radians(), 0.1, 100.0);
        let near = apply_perspective_division(&(proj * Vector4::new(0.0, 0.0, -0.1, 1.0)));
        let far = apply_perspective_division(&(proj * Vector4::new(0.0, 0.0, -100.0, 1.0)));

        assert!((near.z + 1.0).abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_axis_rotates_nothing() {
        assert_eq!(
            TransformFactory::rotation(&Vector3::zeros(), 1.0),
            Matrix4::identity()
        );
    }

    #[test]
    fn screen_origin_is_top_left() {
        let p = ndc_to_screen(-1.0, 1.0, 64.0, 48.0);
        assert_eq!(p, Point2::new(0.0, 0.0));
        let q = ndc_to_screen(1.0, -1.0, 64.0, 48.0);
        assert_eq!(q, Point2::new(64.0, 48.0));
    }
}
