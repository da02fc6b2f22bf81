use crate::pipeline::uniforms::LightingSnapshot;
use crate::scene::light::LightColors;
use nalgebra::{Point3, Vector3};

/// Specular highlight model, chosen by the `blinn` uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecularModel {
    Phong,
    Blinn,
}

impl SpecularModel {
    pub fn from_blinn(blinn: bool) -> Self {
        if blinn { Self::Blinn } else { Self::Phong }
    }

    /// Specular term for unit vectors `normal`, `to_light` and `to_eye`.
    pub fn term(
        self,
        normal: &Vector3<f32>,
        to_light: &Vector3<f32>,
        to_eye: &Vector3<f32>,
        shininess: f32,
    ) -> f32 {
        let base = match self {
            Self::Phong => to_eye.dot(&reflect(&-to_light, normal)).max(0.0),
            Self::Blinn => match (to_light + to_eye).try_normalize(1e-12) {
                Some(halfway) => normal.dot(&halfway).max(0.0),
                None => 0.0,
            },
        };
        base.powf(shininess.max(0.0))
    }
}

/// GLSL `reflect`: `incident` mirrored about `normal`.
#[inline]
pub fn reflect(incident: &Vector3<f32>, normal: &Vector3<f32>) -> Vector3<f32> {
    incident - normal * (2.0 * normal.dot(incident))
}

/// What the fragment stage knows about the surface point being lit.
#[derive(Debug, Clone, Copy)]
pub struct Surface {
    pub position: Point3<f32>,
    /// Unit normal in world space.
    pub normal: Vector3<f32>,
    pub albedo: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl Surface {
    fn contribution(
        &self,
        colors: &LightColors,
        to_light: &Vector3<f32>,
        to_eye: &Vector3<f32>,
        snapshot: &LightingSnapshot,
    ) -> Vector3<f32> {
        let model = SpecularModel::from_blinn(snapshot.blinn);
        let diff = self.normal.dot(to_light).max(0.0);
        let spec = model.term(&self.normal, to_light, to_eye, snapshot.shininess);

        colors.ambient.component_mul(&self.albedo)
            + colors.diffuse.component_mul(&self.albedo) * diff
            + colors.specular.component_mul(&self.specular) * spec
    }
}

/// Sum of the directional, point and spot contributions at `surface`.
pub fn shade(snapshot: &LightingSnapshot, surface: &Surface) -> Vector3<f32> {
    let to_eye = (snapshot.view_position - surface.position)
        .try_normalize(1e-12)
        .unwrap_or(surface.normal);

    let mut color = Vector3::zeros();

    let dir = &snapshot.dir_light;
    if let Some(to_light) = (-dir.direction).try_normalize(1e-12) {
        color += surface.contribution(&dir.colors, &to_light, &to_eye, snapshot);
    }

    let point = &snapshot.point_light;
    let offset = point.position - surface.position;
    if let Some(to_light) = offset.try_normalize(1e-12) {
        let att = point.attenuation.factor(offset.norm());
        color += surface.contribution(&point.colors, &to_light, &to_eye, snapshot) * att;
    }

    let spot = &snapshot.spot_light;
    let offset = spot.position - surface.position;
    if let (Some(to_light), Some(axis)) = (
        offset.try_normalize(1e-12),
        spot.direction.try_normalize(1e-12),
    ) {
        let theta = to_light.dot(&-axis);
        let intensity = spot.cone_intensity(theta);
        let att = spot.attenuation.factor(offset.norm());
        color +=
            surface.contribution(&spot.colors, &to_light, &to_eye, snapshot) * (att * intensity);
    }

    color
}
