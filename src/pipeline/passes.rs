use crate::core::math::transform::TransformFactory;
use crate::core::rasterizer::CullMode;
use crate::pipeline::program::{ProgramKind, UniformSink};
use crate::pipeline::renderer::Renderer;
use crate::pipeline::shaders::skybox::SkyboxShader;
use crate::pipeline::uniforms::{Transforms, apply_lighting, apply_transforms};
use crate::scene::context::RenderContext;
use crate::scene::loader::{bind_ground_maps, bind_skybox};
use log::trace;
use nalgebra::Matrix4;

/// Renders one frame: clear, ground, models, skybox.
pub fn render_frame(ctx: &mut RenderContext, renderer: &mut Renderer) {
    renderer.begin_frame(ctx.settings.clear_color);

    let transforms = Transforms {
        model: Matrix4::identity(),
        view: ctx.camera.view_matrix(),
        projection: ctx.camera.projection_matrix(renderer.aspect_ratio()),
    };

    render_ground_pass(ctx, renderer, &transforms);
    render_model_pass(ctx, renderer, &transforms);
    render_skybox_pass(ctx, renderer, &transforms);

    trace!("Frame issued {} draws", renderer.draws().len());
}

/// Parallax-mapped seabed. Both faces are drawn.
pub fn render_ground_pass(
    ctx: &mut RenderContext,
    renderer: &mut Renderer,
    transforms: &Transforms,
) {
    let lighting = ctx.ground_lighting();
    let RenderContext {
        device,
        programs,
        ground,
        ground_maps,
        ground_transform,
        ..
    } = ctx;

    let program = programs.use_program(ProgramKind::Parallax);
    apply_transforms(program, &transforms.with_model(*ground_transform));
    apply_lighting(program, &lighting);
    bind_ground_maps(device, ground_maps);

    renderer.rasterizer.set_cull_mode(CullMode::None);
    ground.draw(renderer, device, program);
}

/// Every scene object with the model-lighting program. View, projection and lighting are
/// written once; each object only replaces `model`.
pub fn render_model_pass(
    ctx: &mut RenderContext,
    renderer: &mut Renderer,
    transforms: &Transforms,
) {
    let lighting = ctx.model_lighting();
    let RenderContext {
        device,
        programs,
        objects,
        settings,
        ..
    } = ctx;

    let program = programs.use_program(ProgramKind::ModelLighting);
    apply_transforms(program, transforms);
    apply_lighting(program, &lighting);

    renderer.rasterizer.set_cull_mode(settings.model_cull_mode);
    for object in objects.iter() {
        program.set_mat4("model", &object.transform);
        object.model.draw(renderer, device, program);
    }
}

/// Environment cube behind everything: view translation stripped, depth left untouched.
pub fn render_skybox_pass(
    ctx: &mut RenderContext,
    renderer: &mut Renderer,
    transforms: &Transforms,
) {
    let RenderContext {
        device,
        programs,
        skybox,
        ..
    } = ctx;

    let program = programs.use_program(ProgramKind::Skybox);
    program.set_mat4("view", &TransformFactory::rotation_only(&transforms.view));
    program.set_mat4("projection", &transforms.projection);
    bind_skybox(device, skybox.cubemap);

    let shader = SkyboxShader::from_program(program, device);
    renderer.rasterizer.set_cull_mode(CullMode::None);
    renderer.rasterizer.depth_write = false;
    renderer.draw_arrays(device, program, skybox.buffer, &shader);
    renderer.rasterizer.depth_write = true;
}
