use nalgebra::{Point3, Vector3};

/// Ambient, diffuse and specular contributions of a light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightColors {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl LightColors {
    /// Grey triples from three scalars.
    pub fn grey(ambient: f32, diffuse: f32, specular: f32) -> Self {
        Self {
            ambient: Vector3::repeat(ambient),
            diffuse: Vector3::repeat(diffuse),
            specular: Vector3::repeat(specular),
        }
    }
}

/// Coefficients of `1 / (constant + linear·d + quadratic·d²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

impl Attenuation {
    pub fn factor(&self, distance: f32) -> f32 {
        let denom = self.constant + self.linear * distance + self.quadratic * distance * distance;
        if denom > 0.0 { 1.0 / denom } else { 0.0 }
    }
}

/// Light infinitely far away; `direction` is the direction the light travels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirLight {
    pub direction: Vector3<f32>,
    pub colors: LightColors,
}

impl Default for DirLight {
    fn default() -> Self {
        Self {
            direction: Vector3::new(-5.0, 5.0, 5.0),
            colors: LightColors::grey(0.5, 0.3, 0.2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Point3<f32>,
    pub colors: LightColors,
    pub attenuation: Attenuation,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Point3::new(-4.0, 4.0, 0.0),
            colors: LightColors::grey(0.1, 0.6, 1.0),
            attenuation: Attenuation::default(),
        }
    }
}

impl PointLight {
    pub fn moved_to(mut self, position: Point3<f32>) -> Self {
        self.position = position;
        self
    }
}

/// Cone light. The cut-offs are cosines of the inner and outer half-angles, so
/// `outer_cut_off <= cut_off`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    pub colors: LightColors,
    pub attenuation: Attenuation,
    pub cut_off: f32,
    pub outer_cut_off: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self::from_degrees(
            Point3::origin(),
            -Vector3::z(),
            LightColors::grey(2.0, 2.1, 2.0),
            12.5,
            15.0,
        )
    }
}

impl SpotLight {
    pub fn from_degrees(
        position: Point3<f32>,
        direction: Vector3<f32>,
        colors: LightColors,
        inner_deg: f32,
        outer_deg: f32,
    ) -> Self {
        let (inner, outer) = if inner_deg <= outer_deg {
            (inner_deg, outer_deg)
        } else {
            (outer_deg, inner_deg)
        };
        Self {
            position,
            direction,
            colors,
            attenuation: Attenuation::default(),
            cut_off: inner.to_radians().cos(),
            outer_cut_off: outer.to_radians().cos(),
        }
    }

    /// Follows a camera: the light sits at the eye and points where it looks.
    pub fn attach_to(&mut self, position: Point3<f32>, front: Vector3<f32>) {
        self.position = position;
        self.direction = front;
    }

    /// Smooth cone falloff for `theta`, the cosine between the light-to-fragment direction
    /// and the spot axis.
    pub fn cone_intensity(&self, theta: f32) -> f32 {
        let epsilon = self.cut_off - self.outer_cut_off;
        if epsilon <= f32::EPSILON {
            return if theta >= self.cut_off { 1.0 } else { 0.0 };
        }
        ((theta - self.outer_cut_off) / epsilon).clamp(0.0, 1.0)
    }
}

/// The three lights of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneLights {
    pub dir: DirLight,
    pub point: PointLight,
    pub spot: SpotLight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_cone_is_wider_than_inner() {
        let spot = SpotLight::default();
        assert!(spot.outer_cut_off <= spot.cut_off);
        assert!((spot.cut_off - 12.5f32.to_radians().cos()).abs() < 1e-6);
        assert!((spot.outer_cut_off - 15f32.to_radians().cos()).abs() < 1e-6);
    }

    #[test]
    fn swapped_degrees_still_order_the_cone() {
        let spot = SpotLight::from_degrees(
            Point3::origin(),
            Vector3::z(),
            LightColors::grey(1.0, 1.0, 1.0),
            20.0,
            10.0,
        );
        assert!(spot.outer_cut_off <= spot.cut_off);
    }

    #[test]
    fn cone_falloff_is_clamped() {
        let spot = SpotLight::default();
        assert_eq!(spot.cone_intensity(1.0), 1.0);
        assert_eq!(spot.cone_intensity(0.0), 0.0);

        let mid = (spot.cut_off + spot.outer_cut_off) * 0.5;
        assert!((spot.cone_intensity(mid) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn attenuation_is_one_at_the_light() {
        let att = Attenuation::default();
        assert_eq!(att.factor(0.0), 1.0);
        assert!(att.factor(10.0) < att.factor(1.0));
    }

    #[test]
    fn spot_follows_the_camera() {
        let mut spot = SpotLight::default();
        spot.attach_to(Point3::new(1.0, 2.0, 3.0), Vector3::x());
        assert_eq!(spot.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(spot.direction, Vector3::x());
    }
}
