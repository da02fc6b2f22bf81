use image::{Rgba, RgbaImage};
use nalgebra::Point3;
use reef::core::device::TextureHandle;
use reef::io::config::Config;
use reef::pipeline::passes::render_frame;
use reef::pipeline::program::ProgramKind;
use reef::pipeline::renderer::Renderer;
use reef::pipeline::uniforms::LightingSnapshot;
use reef::scene::context::RenderContext;
use reef::scene::loader::build_context;
use std::path::PathBuf;

/// Writes small diffuse and normal maps and points the depth map at a file that doesn't
/// exist.
fn scene_without_depth_map(tag: &str) -> (RenderContext, PathBuf) {
    let dir = std::env::temp_dir().join(format!("reef-frame-{}-{}", std::process::id(), tag));
    std::fs::create_dir_all(&dir).unwrap();

    let diffuse = dir.join("sand.png");
    let normal = dir.join("sand_normal.png");
    RgbaImage::from_pixel(4, 4, Rgba([200, 180, 120, 255]))
        .save(&diffuse)
        .unwrap();
    RgbaImage::from_pixel(4, 4, Rgba([128, 128, 255, 255]))
        .save(&normal)
        .unwrap();

    let mut config = Config::default();
    config.models.clear();
    config.skybox.faces = Default::default();
    config.material.blinn = false;
    config.material.height_scale = 0.1;
    config.ground.diffuse_map = diffuse.to_string_lossy().into_owned();
    config.ground.normal_map = normal.to_string_lossy().into_owned();
    config.ground.depth_map = dir.join("missing_height.png").to_string_lossy().into_owned();

    (build_context(&config), dir)
}

#[test]
fn frame_renders_ground_without_a_depth_map() {
    let (mut ctx, dir) = scene_without_depth_map("ground");
    assert!(!ctx.ground_maps.diffuse.is_none());
    assert!(!ctx.ground_maps.normal.is_none());
    assert!(ctx.ground_maps.depth.is_none());

    let mut renderer = Renderer::new(64, 48, 1);
    render_frame(&mut ctx, &mut renderer);

    let ground = renderer
        .draws()
        .iter()
        .find(|d| d.program == ProgramKind::Parallax)
        .expect("ground draw");
    assert_eq!(
        ground.texture_units[..3],
        [ctx.ground_maps.diffuse, ctx.ground_maps.normal, TextureHandle::NONE]
    );
    assert_eq!(ground.buffer, Some(ctx.ground.handle()));
    assert_eq!(ground.vertex_count, 6);
    assert!(ground.stats.fragments > 0);

    for draw in renderer.draws() {
        assert!(
            draw.missing_uniforms.is_empty(),
            "{:?} missing {:?}",
            draw.program,
            draw.missing_uniforms
        );
    }

    // Ground fills the lower edge; nothing but the skybox reaches the top one.
    let fb = &renderer.framebuffer;
    assert!(fb.depth_at(32, 47).unwrap() < f32::INFINITY);
    assert_eq!(fb.depth_at(32, 0), Some(f32::INFINITY));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn parallax_program_holds_the_frame_lighting() {
    let (mut ctx, dir) = scene_without_depth_map("lighting");
    let mut renderer = Renderer::new(64, 48, 1);
    render_frame(&mut ctx, &mut renderer);

    let written = LightingSnapshot::read(ctx.programs.get(ProgramKind::Parallax));
    assert_eq!(written, ctx.ground_lighting());
    assert!(!written.blinn);
    assert_eq!(written.height_scale, 0.1);
    assert_eq!(written.point_light.position, Point3::new(-4.0, 4.0, 0.0));

    let model = LightingSnapshot::read(ctx.programs.get(ProgramKind::ModelLighting));
    assert_eq!(model.point_light.position, Point3::new(-22.0, -5.0, 0.0));
    assert_eq!(model.shininess, 32.0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn repeated_frames_reuse_the_ground_buffer() {
    let (mut ctx, dir) = scene_without_depth_map("reuse");
    let mut renderer = Renderer::new(32, 24, 2);
    let buffers = ctx.device.buffer_count();

    for _ in 0..3 {
        render_frame(&mut ctx, &mut renderer);
        assert_eq!(renderer.draws().len(), 2);
    }
    assert_eq!(ctx.device.buffer_count(), buffers);
    assert_eq!(ctx.programs.get(ProgramKind::Parallax).bind_count(), 3);

    let _ = std::fs::remove_dir_all(&dir);
}
