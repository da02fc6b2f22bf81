use crate::error::{ReefError, Result};
use crate::io::config::Config;
use crate::io::image::{resolve_rgba, save_framebuffer};
use crate::io::state::ProgramState;
use crate::pipeline::passes::render_frame;
use crate::pipeline::renderer::Renderer;
use crate::scene::context::RenderContext;
use crate::scene::loader::build_context;
use crate::ui::input::{CameraController, FrameInput};
use crate::ui::overlay::{FrameStats, draw_overlay};
use egui::viewport::CursorGrab;
use egui::{ColorImage, TextureOptions, ViewportCommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Interactive viewer: renders the scene every frame and shows it in the window.
pub struct ReefApp {
    scene: RenderContext,
    renderer: Renderer,
    controller: CameraController,
    frame_texture: Option<egui::TextureHandle>,
    stats: FrameStats,
    state_file: PathBuf,
    cursor_grabbed: Option<bool>,

    frame_count: u32,
    last_fps_update: Instant,
}

impl ReefApp {
    pub fn new(config: &Config) -> Self {
        let mut scene = build_context(config);
        let state_file = PathBuf::from(&config.render.state_file);
        scene.apply_state(&ProgramState::load_or_default(&state_file));

        Self {
            scene,
            renderer: Renderer::new(
                config.render.width,
                config.render.height,
                config.render.samples,
            ),
            controller: CameraController::new(),
            frame_texture: None,
            stats: FrameStats::default(),
            state_file,
            cursor_grabbed: None,
            frame_count: 0,
            last_fps_update: Instant::now(),
        }
    }

    /// Grabs the cursor whenever the overlay is hidden, like a first-person game.
    fn sync_cursor(&mut self, ctx: &egui::Context) {
        let grab = !self.scene.settings.overlay_enabled;
        if self.cursor_grabbed == Some(grab) {
            return;
        }
        let mode = if grab {
            CursorGrab::Locked
        } else {
            CursorGrab::None
        };
        ctx.send_viewport_cmd(ViewportCommand::CursorGrab(mode));
        ctx.send_viewport_cmd(ViewportCommand::CursorVisible(!grab));
        self.cursor_grabbed = Some(grab);
    }

    fn upload_frame(&mut self, ctx: &egui::Context) {
        let fb = &self.renderer.framebuffer;
        let image = ColorImage::from_rgba_unmultiplied([fb.width, fb.height], &resolve_rgba(fb));
        match &mut self.frame_texture {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => {
                self.frame_texture = Some(ctx.load_texture("frame", image, TextureOptions::LINEAR))
            }
        }
    }

    fn update_fps(&mut self) {
        self.frame_count += 1;
        let elapsed = self.last_fps_update.elapsed().as_secs_f32();
        if elapsed >= 2.0 {
            info!("Average FPS: {:.1}", self.frame_count as f32 / elapsed);
            self.frame_count = 0;
            self.last_fps_update = Instant::now();
        }
    }

    fn save_state(&self) {
        if let Err(e) = self.scene.program_state().save(&self.state_file) {
            warn!("Program state not saved: {}", e);
        }
    }
}

impl eframe::App for ReefApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let input = FrameInput::gather(ctx);
        if self.controller.apply(&input, &mut self.scene) {
            ctx.send_viewport_cmd(ViewportCommand::Close);
        }
        self.sync_cursor(ctx);

        let (width, height) = frame_extent(ctx.screen_rect().size());
        self.renderer.resize(width, height);

        let start = Instant::now();
        render_frame(&mut self.scene, &mut self.renderer);
        let frame_ms = start.elapsed().as_secs_f32() * 1000.0;
        self.stats = FrameStats::from_draws(frame_ms, self.renderer.draws());
        self.upload_frame(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if let Some(texture) = &self.frame_texture {
                    ui.add(egui::Image::new(texture).fit_to_exact_size(ui.available_size()));
                }
            });

        if self.scene.settings.overlay_enabled {
            draw_overlay(ctx, &mut self.scene, &self.stats);
        }

        self.update_fps();
        ctx.request_repaint();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.save_state();
    }
}

/// Framebuffer size for a window area in points, never smaller than one pixel.
fn frame_extent(size: egui::Vec2) -> (usize, usize) {
    let side = |v: f32| if v.is_finite() { v.round().max(1.0) as usize } else { 1 };
    (side(size.x), side(size.y))
}

/// Opens the window and runs until it is closed.
pub fn run_gui(config: Config) -> Result<()> {
    let (width, height) = (config.render.width as f32, config.render.height as f32);
    info!("Starting GUI mode ({}x{})...", width, height);
    info!("Controls: WASD=Move, Mouse=Look, Scroll=Zoom, F1=Overlay, Q=Parallax, Esc=Quit");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Reef",
        options,
        Box::new(move |_cc| Ok(Box::new(ReefApp::new(&config)))),
    )
    .map_err(|e| ReefError::Gui(e.to_string()))
}

/// Renders a single frame from the configured camera and writes it to `output`.
pub fn run_headless(config: &Config, output: &Path) -> Result<()> {
    info!("Starting headless render...");
    let start = Instant::now();

    let mut scene = build_context(config);
    let mut renderer = Renderer::new(
        config.render.width,
        config.render.height,
        config.render.samples,
    );
    render_frame(&mut scene, &mut renderer);

    let frame_ms = start.elapsed().as_secs_f32() * 1000.0;
    let stats = FrameStats::from_draws(frame_ms, renderer.draws());
    info!(
        "Render completed in {:.2?}: {} draws, {} fragments",
        start.elapsed(),
        stats.draws,
        stats.fragments
    );
    if stats.incomplete_draws > 0 {
        warn!("{} draw(s) ran with unset uniforms", stats.incomplete_draws);
    }

    save_framebuffer(&renderer.framebuffer, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::App;

    #[test]
    fn frame_extent_follows_the_window() {
        assert_eq!(frame_extent(egui::vec2(640.4, 359.6)), (640, 360));
        assert_eq!(frame_extent(egui::vec2(0.0, -3.0)), (1, 1));
        assert_eq!(frame_extent(egui::vec2(f32::NAN, f32::INFINITY)), (1, 1));
    }

    #[test]
    fn exit_writes_the_program_state() {
        let dir = std::env::temp_dir().join(format!("reef-app-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let state_file = dir.join("program_state.txt");

        let mut config = Config::default();
        config.models.clear();
        config.render.width = 16;
        config.render.height = 12;
        config.render.state_file = state_file.to_string_lossy().into_owned();

        let mut app = ReefApp::new(&config);
        app.scene.settings.clear_color = nalgebra::Vector3::new(0.2, 0.3, 0.4);
        app.scene.toggle_overlay();
        app.on_exit(None);

        let saved = ProgramState::load(&state_file).unwrap();
        assert_eq!(saved, app.scene.program_state());
        assert!(saved.overlay_enabled);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
