use crate::core::math::transform::TransformFactory;
use crate::core::rasterizer::CullMode;
use crate::error::{ReefError, Result};
use crate::scene::ground::{DegenerateUvPolicy, GroundQuad};
use crate::scene::light::{Attenuation, DirLight, LightColors, PointLight, SceneLights, SpotLight};
use log::info;
use nalgebra::{Matrix4, Point3, Vector2, Vector3};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Scene description. Every section is optional; missing values fall back to the built-in
/// underwater scene.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub camera: CameraConfig,
    pub lights: LightsConfig,
    pub material: MaterialConfig,
    pub ground: GroundConfig,
    pub skybox: SkyboxConfig,
    pub models: Vec<ModelConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
            lights: LightsConfig::default(),
            material: MaterialConfig::default(),
            ground: GroundConfig::default(),
            skybox: SkyboxConfig::default(),
            models: default_models(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ReefError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    // --- Output & Quality ---
    pub width: usize,
    pub height: usize,
    /// 1 = no AA, 2 = 2x2 SSAA.
    pub samples: usize,
    pub output: String,
    pub state_file: String,

    // --- Pipeline ---
    /// Culling for the model pass; the ground always draws both faces.
    pub cull_mode: CullMode,
    pub clear_color: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            samples: 1,
            output: "output.png".to_string(),
            state_file: "resources/program_state.txt".to_string(),
            cull_mode: CullMode::None,
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub front: [f32; 3],
    pub speed: f32,
    pub sensitivity: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            front: [0.0, 0.0, -1.0],
            speed: 2.5,
            sensitivity: 0.1,
            zoom: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

fn colors(ambient: [f32; 3], diffuse: [f32; 3], specular: [f32; 3]) -> LightColors {
    LightColors {
        ambient: Vector3::from(ambient),
        diffuse: Vector3::from(diffuse),
        specular: Vector3::from(specular),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PointLightConfig {
    pub position: [f32; 3],
    /// Where the model pass moves the point light to.
    pub model_pass_position: [f32; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    /// constant, linear, quadratic
    pub attenuation: [f32; 3],
}

impl Default for PointLightConfig {
    fn default() -> Self {
        Self {
            position: [-4.0, 4.0, 0.0],
            model_pass_position: [-22.0, -5.0, 0.0],
            ambient: [0.1; 3],
            diffuse: [0.6; 3],
            specular: [1.0; 3],
            attenuation: [1.0, 0.09, 0.032],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpotLightConfig {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub attenuation: [f32; 3],
    pub inner_degrees: f32,
    pub outer_degrees: f32,
}

impl Default for SpotLightConfig {
    fn default() -> Self {
        Self {
            ambient: [2.0; 3],
            diffuse: [2.1; 3],
            specular: [2.0; 3],
            attenuation: [1.0, 0.09, 0.032],
            inner_degrees: 12.5,
            outer_degrees: 15.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirLightConfig {
    pub direction: [f32; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

impl Default for DirLightConfig {
    fn default() -> Self {
        Self {
            direction: [-5.0, 5.0, 5.0],
            ambient: [0.5; 3],
            diffuse: [0.3; 3],
            specular: [0.2; 3],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    pub point: PointLightConfig,
    pub spot: SpotLightConfig,
    pub directional: DirLightConfig,
}

fn attenuation(a: [f32; 3]) -> Attenuation {
    Attenuation {
        constant: a[0],
        linear: a[1],
        quadratic: a[2],
    }
}

impl LightsConfig {
    /// Lights as the ground pass sees them. The spotlight is re-attached to the camera every
    /// frame, so its position and direction here are placeholders.
    pub fn scene_lights(&self) -> SceneLights {
        let mut spot = SpotLight::from_degrees(
            Point3::origin(),
            -Vector3::z(),
            colors(self.spot.ambient, self.spot.diffuse, self.spot.specular),
            self.spot.inner_degrees,
            self.spot.outer_degrees,
        );
        spot.attenuation = attenuation(self.spot.attenuation);

        SceneLights {
            dir: DirLight {
                direction: Vector3::from(self.directional.direction),
                colors: colors(
                    self.directional.ambient,
                    self.directional.diffuse,
                    self.directional.specular,
                ),
            },
            point: PointLight {
                position: Point3::from(self.point.position),
                colors: colors(self.point.ambient, self.point.diffuse, self.point.specular),
                attenuation: attenuation(self.point.attenuation),
            },
            spot,
        }
    }

    pub fn model_pass_point_position(&self) -> Point3<f32> {
        Point3::from(self.point.model_pass_position)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub blinn: bool,
    pub height_scale: f32,
    /// Exponent used by the ground program.
    pub ground_shininess: f32,
    /// Exponent used by the model program.
    pub model_shininess: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            blinn: false,
            height_scale: 0.1,
            ground_shininess: 32.0,
            model_shininess: 32.0,
        }
    }
}

/// One rotation step: `radians` around `axis`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RotationConfig {
    pub axis: [f32; 3],
    pub radians: f32,
}

/// translate · rotations (in order) · scale
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub translation: [f32; 3],
    pub rotations: Vec<RotationConfig>,
    pub scale: [f32; 3],
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotations: Vec::new(),
            scale: [1.0; 3],
        }
    }
}

impl TransformConfig {
    fn placed(translation: [f32; 3], scale: f32) -> Self {
        Self {
            translation,
            rotations: Vec::new(),
            scale: [scale; 3],
        }
    }

    fn rotated(mut self, axis: [f32; 3], radians: f32) -> Self {
        self.rotations.push(RotationConfig { axis, radians });
        self
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        let rotation = self
            .rotations
            .iter()
            .fold(Matrix4::identity(), |acc, r| {
                acc * TransformFactory::rotation(&Vector3::from(r.axis), r.radians)
            });
        TransformFactory::translation(&Vector3::from(self.translation))
            * rotation
            * TransformFactory::scaling_nonuniform(&Vector3::from(self.scale))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// P1..P4
    pub corners: [[f32; 3]; 4],
    pub normal: [f32; 3],
    pub uvs: [[f32; 2]; 4],
    pub diffuse_map: String,
    pub normal_map: String,
    pub depth_map: String,
    pub transform: TransformConfig,
    pub degenerate_uv: DegenerateUvPolicy,
}

impl Default for GroundConfig {
    fn default() -> Self {
        let quad = GroundQuad::default();
        Self {
            corners: quad.corners.map(|p| p.coords.into()),
            normal: quad.normal.into(),
            uvs: quad.uvs.map(Into::into),
            diffuse_map: "resources/textures/Sand_basecolor.png".to_string(),
            normal_map: "resources/textures/Sand_normal.png".to_string(),
            depth_map: "resources/textures/Sand_height.png".to_string(),
            transform: TransformConfig::default(),
            degenerate_uv: DegenerateUvPolicy::default(),
        }
    }
}

impl GroundConfig {
    pub fn quad(&self) -> GroundQuad {
        GroundQuad {
            corners: self.corners.map(Point3::from),
            normal: Vector3::from(self.normal),
            uvs: self.uvs.map(Vector2::from),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkyboxConfig {
    /// Faces bound to +X, -X, +Y, -Y, +Z, -Z.
    pub faces: [String; 6],
}

impl Default for SkyboxConfig {
    fn default() -> Self {
        let face = |name: &str| format!("resources/textures/skybox/{name}.png");
        Self {
            faces: [
                face("left"),
                face("right"),
                face("top"),
                face("bottom"),
                face("front"),
                face("back"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub transform: TransformConfig,
}

impl ModelConfig {
    fn new(name: &str, path: &str, transform: TransformConfig) -> Self {
        Self {
            name: name.to_string(),
            path: PathBuf::from(path),
            transform,
        }
    }
}

fn default_models() -> Vec<ModelConfig> {
    let mut models = vec![
        ModelConfig::new(
            "sponge",
            "resources/objects/spongebob/spongebob.obj",
            TransformConfig::placed([0.0, 0.0, 0.0], 2.0),
        ),
        ModelConfig::new(
            "net",
            "resources/objects/net/net.obj",
            TransformConfig::placed([-4.2, 1.6, -0.3], 0.3)
                .rotated([-1.0, 0.0, 0.0], 1.57)
                .rotated([0.0, 0.0, -1.0], 0.87)
                .rotated([0.0, 1.0, 0.0], 0.07)
                .rotated([-1.0, 0.0, 0.0], 0.47),
        ),
    ];

    let jellyfish = [
        [-6.0, 5.0, 0.0],
        [6.0, 4.0, -0.75],
        [2.5, 7.0, -2.0],
        [0.0, 5.0, -3.0],
    ];
    models.extend(jellyfish.iter().enumerate().map(|(i, &at)| {
        ModelConfig::new(
            &format!("jellyfish-{}", i + 1),
            "resources/objects/jellyfish/jellyfish.obj",
            TransformConfig::placed(at, 2.0),
        )
    }));

    models.extend([
        ModelConfig::new(
            "starfish",
            "resources/objects/patrick/patrick.obj",
            TransformConfig::placed([-10.0, -5.0, 0.0], 2.5),
        ),
        ModelConfig::new(
            "wagon",
            "resources/objects/krusty_krab_patty_wagon/wagon.obj",
            TransformConfig::placed([12.0, 0.0, -2.0], 3.5),
        ),
        ModelConfig::new(
            "bus-stop",
            "resources/objects/bus_stop/bus_stop.obj",
            TransformConfig::placed([-22.0, -5.0, 0.0], 3.5).rotated([-1.0, 0.0, 0.0], 1.57),
        ),
    ]);
    models
}
