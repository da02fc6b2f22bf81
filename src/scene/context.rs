use crate::core::device::{BufferHandle, Device, TextureHandle};
use crate::core::rasterizer::CullMode;
use crate::io::state::ProgramState;
use crate::pipeline::program::ProgramSet;
use crate::pipeline::uniforms::LightingSnapshot;
use crate::scene::camera::Camera;
use crate::scene::ground::GroundPlane;
use crate::scene::light::SceneLights;
use crate::scene::scene_object::SceneObject;
use nalgebra::{Matrix4, Point3, Vector3};

/// Step the height-scale toggle moves by.
pub const HEIGHT_SCALE_STEP: f32 = 0.1;

/// Values the overlay and keyboard can change at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    pub clear_color: Vector3<f32>,
    pub overlay_enabled: bool,
    /// Whether mouse motion turns the camera.
    pub mouse_look: bool,
    pub blinn: bool,
    pub height_scale: f32,
    pub ground_shininess: f32,
    pub model_shininess: f32,
    pub model_cull_mode: CullMode,
}

/// Ground maps, bound to units 0, 1 and 2 for the ground draw.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroundMaps {
    pub diffuse: TextureHandle,
    pub normal: TextureHandle,
    pub depth: TextureHandle,
}

impl GroundMaps {
    pub fn units(&self) -> [TextureHandle; 3] {
        [self.diffuse, self.normal, self.depth]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skybox {
    pub buffer: BufferHandle,
    pub cubemap: TextureHandle,
}

/// Holds all scene resources required for rendering. Built once by the loader and owned by
/// the render loop.
pub struct RenderContext {
    pub camera: Camera,
    pub lights: SceneLights,
    /// Where the point light sits while models are drawn.
    pub model_point_position: Point3<f32>,
    pub settings: SceneSettings,

    pub device: Device,
    pub programs: ProgramSet,

    pub ground: GroundPlane,
    pub ground_maps: GroundMaps,
    pub ground_transform: Matrix4<f32>,
    pub objects: Vec<SceneObject>,
    pub skybox: Skybox,
}

impl RenderContext {
    /// Lighting of the ground pass: the spotlight follows the camera.
    pub fn ground_lighting(&self) -> LightingSnapshot {
        let mut spot = self.lights.spot;
        spot.attach_to(self.camera.position, self.camera.front());

        LightingSnapshot {
            view_position: self.camera.position,
            dir_light: self.lights.dir,
            point_light: self.lights.point,
            spot_light: spot,
            shininess: self.settings.ground_shininess,
            blinn: self.settings.blinn,
            height_scale: self.settings.height_scale,
        }
    }

    /// Lighting of the model pass: the ground lighting with the point light moved to the lamp.
    pub fn model_lighting(&self) -> LightingSnapshot {
        let ground = self.ground_lighting();
        LightingSnapshot {
            point_light: ground.point_light.moved_to(self.model_point_position),
            shininess: self.settings.model_shininess,
            ..ground
        }
    }

    /// Toggles parallax between the configured depth and none.
    pub fn cycle_height_scale(&mut self) {
        let scale = &mut self.settings.height_scale;
        if *scale > 0.0 {
            *scale -= HEIGHT_SCALE_STEP;
        } else {
            *scale += HEIGHT_SCALE_STEP;
        }
    }

    /// F1: showing the overlay frees the cursor and stops mouse look. Hiding it again leaves
    /// mouse look off until the overlay checkbox turns it back on.
    pub fn toggle_overlay(&mut self) {
        self.settings.overlay_enabled = !self.settings.overlay_enabled;
        if self.settings.overlay_enabled {
            self.settings.mouse_look = false;
        }
    }

    pub fn apply_state(&mut self, state: &ProgramState) {
        self.settings.clear_color = state.clear_color;
        self.settings.overlay_enabled = state.overlay_enabled;
        self.settings.mouse_look = !state.overlay_enabled;
        self.camera.position = state.camera_position;
        self.camera.set_front(state.camera_front);
    }

    pub fn program_state(&self) -> ProgramState {
        ProgramState {
            clear_color: self.settings.clear_color,
            overlay_enabled: self.settings.overlay_enabled,
            camera_position: self.camera.position,
            camera_front: self.camera.front(),
        }
    }
}
