use crate::core::device::{Device, TextureHandle};
use crate::core::geometry::VertexLayout;
use crate::io::config::{Config, ModelConfig};
use crate::io::obj_loader::load_obj;
use crate::pipeline::program::{ProgramSet, UniformSink};
use crate::pipeline::shaders::skybox::SKYBOX_VERTICES;
use crate::scene::camera::Camera;
use crate::scene::context::{GroundMaps, RenderContext, SceneSettings, Skybox};
use crate::scene::ground::GroundPlane;
use crate::scene::model::Model;
use crate::scene::scene_object::SceneObject;
use log::{info, warn};
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Ground map units, as the parallax program's samplers are set up.
pub const GROUND_DIFFUSE_UNIT: usize = 0;
pub const GROUND_NORMAL_UNIT: usize = 1;
pub const GROUND_DEPTH_UNIT: usize = 2;
pub const SKYBOX_UNIT: usize = 0;

/// Initial resource loading (heavy I/O). Missing textures and models are logged and
/// skipped, so this always yields a renderable context.
pub fn build_context(config: &Config) -> RenderContext {
    let mut device = Device::new();

    let camera = build_camera(config);
    let programs = build_programs();

    // 1. Ground
    let ground_maps = GroundMaps {
        diffuse: device.load_texture(&config.ground.diffuse_map),
        normal: device.load_texture(&config.ground.normal_map),
        depth: device.load_texture(&config.ground.depth_map),
    };
    let ground =
        GroundPlane::create(&mut device, &config.ground.quad(), config.ground.degenerate_uv);

    // 2. Skybox
    let skybox = Skybox {
        buffer: device.create_vertex_buffer(&SKYBOX_VERTICES, VertexLayout::positions()),
        cubemap: device.load_cubemap(&config.skybox.faces),
    };

    // 3. Models
    let objects = load_objects(&mut device, &config.models);

    let settings = SceneSettings {
        clear_color: Vector3::from(config.render.clear_color),
        overlay_enabled: false,
        mouse_look: true,
        blinn: config.material.blinn,
        height_scale: config.material.height_scale,
        ground_shininess: config.material.ground_shininess,
        model_shininess: config.material.model_shininess,
        model_cull_mode: config.render.cull_mode,
    };

    info!(
        "Scene ready: {} objects, {} buffers",
        objects.len(),
        device.buffer_count()
    );

    RenderContext {
        camera,
        lights: config.lights.scene_lights(),
        model_point_position: config.lights.model_pass_point_position(),
        settings,
        device,
        programs,
        ground,
        ground_maps,
        ground_transform: config.ground.transform.matrix(),
        objects,
        skybox,
    }
}

fn build_camera(config: &Config) -> Camera {
    let c = &config.camera;
    let mut camera = Camera::new(Point3::from(c.position));
    camera.set_front(Vector3::from(c.front));
    camera.movement_speed = c.speed;
    camera.mouse_sensitivity = c.sensitivity;
    camera.zoom = c.zoom;
    camera.near = c.near;
    camera.far = c.far;
    camera
}

/// Sampler units never change, so they are written once here.
fn build_programs() -> ProgramSet {
    let mut programs = ProgramSet::new();

    let parallax = &mut programs.parallax;
    parallax.set_int("diffuseMap", GROUND_DIFFUSE_UNIT as i32);
    parallax.set_int("normalMap", GROUND_NORMAL_UNIT as i32);
    parallax.set_int("depthMap", GROUND_DEPTH_UNIT as i32);

    programs.skybox.set_int("skybox", SKYBOX_UNIT as i32);
    programs
}

/// Loads each distinct file once; instances of the same path share the model.
fn load_objects(device: &mut Device, models: &[ModelConfig]) -> Vec<SceneObject> {
    let mut cache: HashMap<PathBuf, Option<Arc<Model>>> = HashMap::new();
    let mut objects = Vec::with_capacity(models.len());

    for entry in models {
        let model = cache
            .entry(entry.path.clone())
            .or_insert_with(|| match load_obj(device, &entry.path) {
                Ok(model) => Some(Arc::new(model)),
                Err(e) => {
                    warn!("Skipping model '{}': {}", entry.name, e);
                    None
                }
            })
            .clone();

        if let Some(model) = model {
            objects.push(SceneObject::new(&entry.name, model, entry.transform.matrix()));
        }
    }
    objects
}

/// Binds the ground maps to their units ahead of the ground draw.
pub fn bind_ground_maps(device: &mut Device, maps: &GroundMaps) {
    let units = [GROUND_DIFFUSE_UNIT, GROUND_NORMAL_UNIT, GROUND_DEPTH_UNIT];
    for (unit, handle) in units.into_iter().zip(maps.units()) {
        device.bind_texture(unit, handle);
    }
}

pub fn bind_skybox(device: &mut Device, cubemap: TextureHandle) {
    device.bind_texture(SKYBOX_UNIT, cubemap);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::TransformConfig;
    use crate::io::state::ProgramState;
    use std::fs;

    fn offline_config() -> Config {
        let mut config = Config::default();
        config.models.clear();
        config.ground.diffuse_map = "missing/diffuse.png".into();
        config.ground.normal_map = "missing/normal.png".into();
        config.ground.depth_map = "missing/depth.png".into();
        config.skybox.faces = Default::default();
        config
    }

    #[test]
    fn missing_assets_still_build_a_context() {
        let ctx = build_context(&offline_config());

        assert_eq!(ctx.device.buffer_count(), 2);
        assert_eq!(ctx.ground_maps, GroundMaps::default());
        assert!(ctx.objects.is_empty());
        assert_eq!(ctx.programs.parallax.int("depthMap"), 2);
        assert_eq!(ctx.programs.skybox.int("skybox"), 0);
        assert_eq!(ctx.ground.vertex_count(), 6);
    }

    #[test]
    fn model_pass_moves_only_the_point_light() {
        let ctx = build_context(&offline_config());
        let ground = ctx.ground_lighting();
        let model = ctx.model_lighting();

        assert_eq!(ground.point_light.position, Point3::new(-4.0, 4.0, 0.0));
        assert_eq!(model.point_light.position, Point3::new(-22.0, -5.0, 0.0));
        assert_eq!(model.spot_light, ground.spot_light);
        assert_eq!(ground.spot_light.position, ctx.camera.position);
        assert_eq!(ground.spot_light.direction, ctx.camera.front());
        assert!(ground.spot_light.outer_cut_off <= ground.spot_light.cut_off);
    }

    #[test]
    fn height_scale_toggles_between_depth_and_flat() {
        let mut ctx = build_context(&offline_config());
        assert_eq!(ctx.settings.height_scale, 0.1);
        ctx.cycle_height_scale();
        assert_eq!(ctx.settings.height_scale, 0.0);
        ctx.cycle_height_scale();
        assert_eq!(ctx.settings.height_scale, 0.1);
    }

    #[test]
    fn mouse_look_stays_off_after_the_overlay_closes() {
        let mut ctx = build_context(&offline_config());
        ctx.toggle_overlay();
        assert!(ctx.settings.overlay_enabled && !ctx.settings.mouse_look);
        ctx.toggle_overlay();
        assert!(!ctx.settings.overlay_enabled && !ctx.settings.mouse_look);

        ctx.toggle_overlay();
        ctx.settings.mouse_look = true;
        ctx.toggle_overlay();
        assert!(!ctx.settings.overlay_enabled && ctx.settings.mouse_look);
    }

    #[test]
    fn program_state_round_trips_through_the_context() {
        let mut ctx = build_context(&offline_config());
        let state = ProgramState {
            clear_color: Vector3::new(0.1, 0.2, 0.3),
            overlay_enabled: true,
            camera_position: Point3::new(1.0, 2.0, 3.0),
            camera_front: Vector3::x(),
        };
        ctx.apply_state(&state);
        let back = ctx.program_state();

        assert_eq!(back.clear_color, state.clear_color);
        assert!(back.overlay_enabled);
        assert_eq!(back.camera_position, state.camera_position);
        assert!((back.camera_front - Vector3::x()).norm() < 1e-5);
    }

    #[test]
    fn shared_paths_load_once() {
        let dir = std::env::temp_dir().join(format!("reef-loader-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let obj = dir.join("tri.obj");
        fs::write(&obj, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let entry = |name: &str| ModelConfig {
            name: name.to_string(),
            path: obj.clone(),
            transform: TransformConfig::default(),
        };
        let mut device = Device::new();
        let objects = load_objects(&mut device, &[entry("a"), entry("b")]);

        assert_eq!(objects.len(), 2);
        assert!(Arc::ptr_eq(&objects[0].model, &objects[1].model));
        let _ = fs::remove_dir_all(&dir);
    }
}
