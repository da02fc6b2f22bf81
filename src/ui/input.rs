use crate::scene::camera::Movement;
use crate::scene::context::RenderContext;
use egui::{Event, Key};

/// egui reports wheel motion in points; one wheel notch is roughly this many.
const POINTS_PER_SCROLL_NOTCH: f32 = 50.0;

/// Longest step a single frame may move the camera, so a stall doesn't teleport it.
const MAX_FRAME_DT: f32 = 0.1;

/// Everything the scene reacts to in one frame, in window-independent form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub dt: f32,
    pub movement: Vec<Movement>,
    /// Pointer motion in points, y down.
    pub mouse_delta: (f32, f32),
    /// Wheel notches, positive away from the user.
    pub scroll: f32,
    pub toggle_overlay: bool,
    pub cycle_height_scale: bool,
    pub quit: bool,
}

impl FrameInput {
    pub fn gather(ctx: &egui::Context) -> Self {
        let wants_keyboard = ctx.wants_keyboard_input();

        ctx.input(|i| {
            let mut movement = Vec::new();
            if !wants_keyboard {
                for (key, dir) in [
                    (Key::W, Movement::Forward),
                    (Key::S, Movement::Backward),
                    (Key::A, Movement::Left),
                    (Key::D, Movement::Right),
                ] {
                    if i.key_down(key) {
                        movement.push(dir);
                    }
                }
            }

            // Raw motion keeps working while the cursor is grabbed; fall back to pointer
            // deltas on platforms that don't report it.
            let raw = i.raw.events.iter().fold(None, |acc: Option<egui::Vec2>, e| match e {
                Event::MouseMoved(d) => Some(acc.unwrap_or_default() + *d),
                _ => acc,
            });
            let delta = raw.unwrap_or_else(|| i.pointer.delta());

            Self {
                dt: i.stable_dt.min(MAX_FRAME_DT),
                movement,
                mouse_delta: (delta.x, delta.y),
                scroll: i.raw_scroll_delta.y / POINTS_PER_SCROLL_NOTCH,
                toggle_overlay: i.key_pressed(Key::F1),
                cycle_height_scale: !wants_keyboard && i.key_pressed(Key::Q),
                quit: i.key_pressed(Key::Escape),
            }
        })
    }
}

/// Applies a frame's input to the camera and scene settings.
#[derive(Debug, Default)]
pub struct CameraController;

impl CameraController {
    pub fn new() -> Self {
        Self
    }

    /// Returns true when the user asked to quit.
    pub fn apply(&self, input: &FrameInput, scene: &mut RenderContext) -> bool {
        if input.toggle_overlay {
            scene.toggle_overlay();
        }
        if input.cycle_height_scale {
            scene.cycle_height_scale();
        }

        for &dir in &input.movement {
            scene.camera.process_keyboard(dir, input.dt);
        }

        if scene.settings.mouse_look {
            let (dx, dy) = input.mouse_delta;
            if dx != 0.0 || dy != 0.0 {
                // Screen y grows downwards; pitch grows upwards.
                scene.camera.process_mouse_movement(dx, -dy, true);
            }
        }

        if input.scroll != 0.0 {
            scene.camera.process_mouse_scroll(input.scroll);
        }

        input.quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::Config;
    use crate::scene::loader::build_context;
    use nalgebra::Point3;

    fn scene() -> RenderContext {
        let mut config = Config::default();
        config.models.clear();
        config.ground.diffuse_map = String::new();
        config.ground.normal_map = String::new();
        config.ground.depth_map = String::new();
        config.skybox.faces = Default::default();
        build_context(&config)
    }

    #[test]
    fn wasd_moves_the_camera_by_speed_times_dt() {
        let mut ctx = scene();
        let input = FrameInput {
            dt: 0.1,
            movement: vec![Movement::Forward, Movement::Forward],
            ..Default::default()
        };
        CameraController::new().apply(&input, &mut ctx);
        assert!((ctx.camera.position - Point3::new(0.0, 0.0, 2.5)).norm() < 1e-4);
    }

    #[test]
    fn moving_the_mouse_up_pitches_up() {
        let mut ctx = scene();
        let input = FrameInput {
            mouse_delta: (0.0, -100.0),
            ..Default::default()
        };
        CameraController::new().apply(&input, &mut ctx);
        assert!((ctx.camera.pitch - 10.0).abs() < 1e-4);
    }

    #[test]
    fn overlay_blocks_mouse_look_but_not_scroll() {
        let mut ctx = scene();
        let controller = CameraController::new();
        controller.apply(
            &FrameInput {
                toggle_overlay: true,
                ..Default::default()
            },
            &mut ctx,
        );

        let yaw = ctx.camera.yaw;
        controller.apply(
            &FrameInput {
                mouse_delta: (40.0, 0.0),
                scroll: 5.0,
                ..Default::default()
            },
            &mut ctx,
        );
        assert_eq!(ctx.camera.yaw, yaw);
        assert_eq!(ctx.camera.zoom, 40.0);
    }

    #[test]
    fn q_and_escape_reach_the_scene() {
        let mut ctx = scene();
        let quit = CameraController::new().apply(
            &FrameInput {
                cycle_height_scale: true,
                quit: true,
                ..Default::default()
            },
            &mut ctx,
        );
        assert!(quit);
        assert_eq!(ctx.settings.height_scale, 0.0);
    }
}
