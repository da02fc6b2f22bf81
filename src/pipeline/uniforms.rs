//! Per-draw uniform values and the code that writes them into a program.

use crate::pipeline::program::{Program, UniformSink};
use crate::scene::light::{Attenuation, DirLight, LightColors, PointLight, SpotLight};
use nalgebra::{Matrix4, Point3};

/// clip = projection · view · model · position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub model: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

impl Transforms {
    pub fn with_model(mut self, model: Matrix4<f32>) -> Self {
        self.model = model;
        self
    }
}

pub fn apply_transforms<U: UniformSink + ?Sized>(sink: &mut U, transforms: &Transforms) {
    sink.set_mat4("model", &transforms.model);
    sink.set_mat4("view", &transforms.view);
    sink.set_mat4("projection", &transforms.projection);
}

/// Every lighting input of a draw, captured once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingSnapshot {
    pub view_position: Point3<f32>,
    pub dir_light: DirLight,
    pub point_light: PointLight,
    pub spot_light: SpotLight,
    pub shininess: f32,
    pub blinn: bool,
    pub height_scale: f32,
}

impl LightingSnapshot {
    /// Reads the snapshot back from a program's current values. Missing values read as zero.
    pub fn read(program: &Program) -> Self {
        let kind = program.kind();
        let view_position = kind
            .view_position_uniform()
            .map(|name| Point3::from(program.vec3(name)))
            .unwrap_or_else(Point3::origin);
        let shininess = kind
            .shininess_uniform()
            .map(|name| program.float(name))
            .unwrap_or(0.0);

        Self {
            view_position,
            dir_light: DirLight {
                direction: program.vec3("dirLight.direction"),
                colors: read_colors(program, "dirLight"),
            },
            point_light: PointLight {
                position: Point3::from(program.vec3("pointLight.position")),
                colors: read_colors(program, "pointLight"),
                attenuation: read_attenuation(program, "pointLight"),
            },
            spot_light: SpotLight {
                position: Point3::from(program.vec3("spotLight.position")),
                direction: program.vec3("spotLight.direction"),
                colors: read_colors(program, "spotLight"),
                attenuation: read_attenuation(program, "spotLight"),
                cut_off: program.float("spotLight.cutOff"),
                outer_cut_off: program.float("spotLight.outerCutOff"),
            },
            shininess,
            blinn: program.bool("blinn"),
            height_scale: program.float("heightScale"),
        }
    }
}

/// Writes every field of `snapshot` under the sink's own uniform names.
pub fn apply_lighting<U: UniformSink + ?Sized>(sink: &mut U, snapshot: &LightingSnapshot) {
    let kind = sink.kind();
    if let Some(name) = kind.view_position_uniform() {
        sink.set_vec3(name, &snapshot.view_position.coords);
    }

    let dir = &snapshot.dir_light;
    sink.set_vec3("dirLight.direction", &dir.direction);
    write_colors(sink, "dirLight", &dir.colors);

    let point = &snapshot.point_light;
    sink.set_vec3("pointLight.position", &point.position.coords);
    write_colors(sink, "pointLight", &point.colors);
    write_attenuation(sink, "pointLight", &point.attenuation);

    let spot = &snapshot.spot_light;
    sink.set_vec3("spotLight.position", &spot.position.coords);
    sink.set_vec3("spotLight.direction", &spot.direction);
    write_colors(sink, "spotLight", &spot.colors);
    write_attenuation(sink, "spotLight", &spot.attenuation);
    sink.set_float("spotLight.cutOff", spot.cut_off);
    sink.set_float("spotLight.outerCutOff", spot.outer_cut_off);

    if let Some(name) = kind.shininess_uniform() {
        sink.set_float(name, snapshot.shininess);
    }
    sink.set_bool("blinn", snapshot.blinn);
    // Ignored by programs without parallax.
    sink.set_float("heightScale", snapshot.height_scale);
}

fn write_colors<U: UniformSink + ?Sized>(sink: &mut U, light: &str, colors: &LightColors) {
    sink.set_vec3(&format!("{light}.ambient"), &colors.ambient);
    sink.set_vec3(&format!("{light}.diffuse"), &colors.diffuse);
    sink.set_vec3(&format!("{light}.specular"), &colors.specular);
}

fn write_attenuation<U: UniformSink + ?Sized>(sink: &mut U, light: &str, att: &Attenuation) {
    sink.set_float(&format!("{light}.constant"), att.constant);
    sink.set_float(&format!("{light}.linear"), att.linear);
    sink.set_float(&format!("{light}.quadratic"), att.quadratic);
}

fn read_colors(program: &Program, light: &str) -> LightColors {
    LightColors {
        ambient: program.vec3(&format!("{light}.ambient")),
        diffuse: program.vec3(&format!("{light}.diffuse")),
        specular: program.vec3(&format!("{light}.specular")),
    }
}

fn read_attenuation(program: &Program, light: &str) -> Attenuation {
    Attenuation {
        constant: program.float(&format!("{light}.constant")),
        linear: program.float(&format!("{light}.linear")),
        quadratic: program.float(&format!("{light}.quadratic")),
    }
}
