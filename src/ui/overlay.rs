use crate::core::rasterizer::CullMode;
use crate::pipeline::renderer::DrawRecord;
use crate::scene::context::RenderContext;
use egui::{ComboBox, DragValue, Slider};

/// Timing and draw statistics of the last frame, shown in the overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub frame_ms: f32,
    pub draws: usize,
    pub fragments: usize,
    pub incomplete_draws: usize,
}

impl FrameStats {
    pub fn from_draws(frame_ms: f32, draws: &[DrawRecord]) -> Self {
        Self {
            frame_ms,
            draws: draws.len(),
            fragments: draws.iter().map(|d| d.stats.fragments).sum(),
            incomplete_draws: draws.iter().filter(|d| !d.missing_uniforms.is_empty()).count(),
        }
    }
}

/// Debug windows toggled with F1.
pub fn draw_overlay(ctx: &egui::Context, scene: &mut RenderContext, stats: &FrameStats) {
    egui::Window::new("Scene")
        .default_pos([10.0, 10.0])
        .show(ctx, |ui| {
            let mut clear: [f32; 3] = scene.settings.clear_color.into();
            ui.horizontal(|ui| {
                ui.label("Background color");
                if ui.color_edit_button_rgb(&mut clear).changed() {
                    scene.settings.clear_color = clear.into();
                }
            });

            ui.separator();
            let att = &mut scene.lights.point.attenuation;
            drag(ui, "pointLight.constant", &mut att.constant);
            drag(ui, "pointLight.linear", &mut att.linear);
            drag(ui, "pointLight.quadratic", &mut att.quadratic);

            ui.separator();
            ui.checkbox(&mut scene.settings.blinn, "Blinn-Phong specular");
            ui.add(Slider::new(&mut scene.settings.height_scale, 0.0..=0.3).text("heightScale"));

            ComboBox::from_label("Model culling")
                .selected_text(format!("{:?}", scene.settings.model_cull_mode))
                .show_ui(ui, |ui| {
                    for mode in [CullMode::None, CullMode::Back, CullMode::Front] {
                        ui.selectable_value(
                            &mut scene.settings.model_cull_mode,
                            mode,
                            format!("{mode:?}"),
                        );
                    }
                });

            ui.separator();
            ui.label(format!(
                "{:.1} ms, {} draws, {} fragments",
                stats.frame_ms, stats.draws, stats.fragments
            ));
            if stats.incomplete_draws > 0 {
                ui.colored_label(
                    egui::Color32::YELLOW,
                    format!("{} draw(s) with unset uniforms", stats.incomplete_draws),
                );
            }
        });

    egui::Window::new("Camera info")
        .default_pos([10.0, 330.0])
        .show(ctx, |ui| {
            let c = &scene.camera;
            let (p, f) = (c.position, c.front());
            ui.label(format!("Camera position: ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z));
            ui.label(format!("(Yaw, Pitch): ({:.3}, {:.3})", c.yaw, c.pitch));
            ui.label(format!("Camera front: ({:.3}, {:.3}, {:.3})", f.x, f.y, f.z));
            ui.checkbox(&mut scene.settings.mouse_look, "Camera mouse update");
        });
}

fn drag(ui: &mut egui::Ui, label: &str, value: &mut f32) {
    ui.horizontal(|ui| {
        ui.add(DragValue::new(value).speed(0.05).range(0.0..=1.0));
        ui.label(label);
    });
}
