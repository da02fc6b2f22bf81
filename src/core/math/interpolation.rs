use nalgebra::{Point2, Vector3};

const EPSILON: f32 = 1e-5;

/// Twice the signed area of (a, b, c). Positive when the points wind clockwise on a y-down
/// screen.
#[inline(always)]
pub fn edge_function(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Screen-space barycentric weights of `p` in triangle (v0, v1, v2).
///
/// Returns `None` for a triangle with no area.
pub fn barycentric_coordinates(
    p: Point2<f32>,
    v0: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
) -> Option<Vector3<f32>> {
    let area = edge_function(v0, v1, v2);
    if area.abs() < EPSILON {
        return None;
    }

    let w0 = edge_function(v1, v2, p) / area;
    let w1 = edge_function(v2, v0, p) / area;
    Some(Vector3::new(w0, w1, 1.0 - w0 - w1))
}

#[inline(always)]
pub fn is_inside_triangle(bary: Vector3<f32>) -> bool {
    bary.iter().all(|&w| w >= -EPSILON)
}

/// Reweights screen-space barycentrics by 1/w so that attributes interpolate linearly in
/// view space rather than on screen.
pub fn perspective_correct_barycentric(bary: Vector3<f32>, w: [f32; 3]) -> Option<Vector3<f32>> {
    let mut weighted = Vector3::zeros();
    for i in 0..3 {
        if w[i].abs() <= EPSILON {
            return None;
        }
        weighted[i] = bary[i] / w[i];
    }

    let sum = weighted.sum();
    if sum.abs() < EPSILON {
        return None;
    }
    Some(weighted / sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertices_get_unit_weights() {
        let (a, b, c) = (
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 4.0),
        );
        let at_b = barycentric_coordinates(b, a, b, c).unwrap();
        assert!((at_b - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-6);

        let centroid = Point2::new(4.0 / 3.0, 4.0 / 3.0);
        let w = barycentric_coordinates(centroid, a, b, c).unwrap();
        assert!(is_inside_triangle(w));
        assert!((w.sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn outside_points_have_a_negative_weight() {
        let w = barycentric_coordinates(
            Point2::new(5.0, 5.0),
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 4.0),
        )
        .unwrap();
        assert!(!is_inside_triangle(w));
    }

    #[test]
    fn equal_depths_leave_weights_unchanged() {
        let bary = Vector3::new(0.2, 0.3, 0.5);
        let corrected = perspective_correct_barycentric(bary, [2.0, 2.0, 2.0]).unwrap();
        assert!((corrected - bary).norm() < 1e-6);
    }

    #[test]
    fn nearer_vertices_gain_weight() {
        let bary = Vector3::new(0.5, 0.5, 0.0);
        let corrected = perspective_correct_barycentric(bary, [1.0, 3.0, 1.0]).unwrap();
        assert!(corrected.x > corrected.y);
        assert!((corrected.x - 0.75).abs() < 1e-6);
    }
}
