use log::{debug, warn};
use nalgebra::{Matrix4, Vector3};
use std::collections::HashMap;

/// Type of a declared uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Mat4,
    Vec3,
    Float,
    Bool,
    Int,
}

/// How often a uniform must be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformRate {
    /// Must be written after every bind, before the draw.
    PerDraw,
    /// Written once (sampler units); keeps its value for the program's lifetime.
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformDecl {
    pub name: &'static str,
    pub ty: UniformType,
    pub rate: UniformRate,
}

const fn per_draw(name: &'static str, ty: UniformType) -> UniformDecl {
    UniformDecl {
        name,
        ty,
        rate: UniformRate::PerDraw,
    }
}

const fn sampler(name: &'static str) -> UniformDecl {
    UniformDecl {
        name,
        ty: UniformType::Int,
        rate: UniformRate::Static,
    }
}

macro_rules! light_block {
    ($($extra:expr),* $(,)?) => {
        [
            per_draw("model", UniformType::Mat4),
            per_draw("view", UniformType::Mat4),
            per_draw("projection", UniformType::Mat4),
            per_draw("dirLight.direction", UniformType::Vec3),
            per_draw("dirLight.ambient", UniformType::Vec3),
            per_draw("dirLight.diffuse", UniformType::Vec3),
            per_draw("dirLight.specular", UniformType::Vec3),
            per_draw("pointLight.position", UniformType::Vec3),
            per_draw("pointLight.ambient", UniformType::Vec3),
            per_draw("pointLight.diffuse", UniformType::Vec3),
            per_draw("pointLight.specular", UniformType::Vec3),
            per_draw("pointLight.constant", UniformType::Float),
            per_draw("pointLight.linear", UniformType::Float),
            per_draw("pointLight.quadratic", UniformType::Float),
            per_draw("spotLight.position", UniformType::Vec3),
            per_draw("spotLight.direction", UniformType::Vec3),
            per_draw("spotLight.ambient", UniformType::Vec3),
            per_draw("spotLight.diffuse", UniformType::Vec3),
            per_draw("spotLight.specular", UniformType::Vec3),
            per_draw("spotLight.constant", UniformType::Float),
            per_draw("spotLight.linear", UniformType::Float),
            per_draw("spotLight.quadratic", UniformType::Float),
            per_draw("spotLight.cutOff", UniformType::Float),
            per_draw("spotLight.outerCutOff", UniformType::Float),
            per_draw("blinn", UniformType::Bool),
            $($extra),*
        ]
    };
}

const PARALLAX_UNIFORMS: [UniformDecl; 31] = light_block![
    per_draw("viewPos", UniformType::Vec3),
    per_draw("shininess", UniformType::Float),
    per_draw("heightScale", UniformType::Float),
    sampler("diffuseMap"),
    sampler("normalMap"),
    sampler("depthMap"),
];

const MODEL_UNIFORMS: [UniformDecl; 29] = light_block![
    per_draw("viewPosition", UniformType::Vec3),
    per_draw("material.shininess", UniformType::Float),
    sampler("material.texture_diffuse1"),
    sampler("material.texture_specular1"),
];

const SKYBOX_UNIFORMS: [UniformDecl; 3] = [
    per_draw("view", UniformType::Mat4),
    per_draw("projection", UniformType::Mat4),
    sampler("skybox"),
];

/// The built-in shader programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Normal + parallax mapped seabed.
    Parallax,
    /// Textured models lit by the shared light block.
    ModelLighting,
    Skybox,
}

impl ProgramKind {
    pub const ALL: [ProgramKind; 3] = [Self::Parallax, Self::ModelLighting, Self::Skybox];

    pub fn uniforms(self) -> &'static [UniformDecl] {
        match self {
            Self::Parallax => &PARALLAX_UNIFORMS,
            Self::ModelLighting => &MODEL_UNIFORMS,
            Self::Skybox => &SKYBOX_UNIFORMS,
        }
    }

    /// Name under which this program expects the camera position.
    pub fn view_position_uniform(self) -> Option<&'static str> {
        match self {
            Self::Parallax => Some("viewPos"),
            Self::ModelLighting => Some("viewPosition"),
            Self::Skybox => None,
        }
    }

    pub fn shininess_uniform(self) -> Option<&'static str> {
        match self {
            Self::Parallax => Some("shininess"),
            Self::ModelLighting => Some("material.shininess"),
            Self::Skybox => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Mat4(Matrix4<f32>),
    Vec3(Vector3<f32>),
    Float(f32),
    Bool(bool),
    Int(i32),
}

impl UniformValue {
    pub fn ty(&self) -> UniformType {
        match self {
            Self::Mat4(_) => UniformType::Mat4,
            Self::Vec3(_) => UniformType::Vec3,
            Self::Float(_) => UniformType::Float,
            Self::Bool(_) => UniformType::Bool,
            Self::Int(_) => UniformType::Int,
        }
    }
}

/// Index of a uniform inside its program, resolved from the name once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation(usize);

/// Receiver of named uniform writes: the seam between the frame code and a shader program.
pub trait UniformSink {
    fn kind(&self) -> ProgramKind;

    /// Makes this program the target of subsequent draws.
    fn use_program(&mut self);

    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        self.set_uniform(name, UniformValue::Mat4(*value));
    }

    fn set_vec3(&mut self, name: &str, value: &Vector3<f32>) {
        self.set_uniform(name, UniformValue::Vec3(*value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Bool(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }
}

/// A linked shader program with persistent uniform storage.
///
/// Values survive across binds and frames until overwritten; reading a uniform that was
/// never written yields zero.
#[derive(Debug, Clone)]
pub struct Program {
    kind: ProgramKind,
    locations: HashMap<&'static str, UniformLocation>,
    values: Vec<Option<UniformValue>>,
    written_since_bind: Vec<bool>,
    binds: u64,
}

impl Program {
    pub fn new(kind: ProgramKind) -> Self {
        let decls = kind.uniforms();
        let locations = decls
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name, UniformLocation(i)))
            .collect();

        Self {
            kind,
            locations,
            values: vec![None; decls.len()],
            written_since_bind: vec![false; decls.len()],
            binds: 0,
        }
    }

    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied()
    }

    pub fn value(&self, name: &str) -> Option<UniformValue> {
        self.location(name).and_then(|loc| self.values[loc.0])
    }

    pub fn mat4(&self, name: &str) -> Matrix4<f32> {
        match self.value(name) {
            Some(UniformValue::Mat4(m)) => m,
            _ => Matrix4::zeros(),
        }
    }

    pub fn vec3(&self, name: &str) -> Vector3<f32> {
        match self.value(name) {
            Some(UniformValue::Vec3(v)) => v,
            _ => Vector3::zeros(),
        }
    }

    pub fn float(&self, name: &str) -> f32 {
        match self.value(name) {
            Some(UniformValue::Float(f)) => f,
            _ => 0.0,
        }
    }

    pub fn bool(&self, name: &str) -> bool {
        matches!(self.value(name), Some(UniformValue::Bool(true)))
    }

    pub fn int(&self, name: &str) -> i32 {
        match self.value(name) {
            Some(UniformValue::Int(i)) => i,
            _ => 0,
        }
    }

    /// How many times the program has been bound.
    pub fn bind_count(&self) -> u64 {
        self.binds
    }

    /// Uniforms a draw issued now would read stale or zero: per-draw ones not written
    /// since the last bind, and static ones never written at all.
    pub fn missing_uniforms(&self) -> Vec<&'static str> {
        self.kind
            .uniforms()
            .iter()
            .enumerate()
            .filter(|(i, decl)| match decl.rate {
                UniformRate::PerDraw => !self.written_since_bind[*i],
                UniformRate::Static => self.values[*i].is_none(),
            })
            .map(|(_, decl)| decl.name)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_uniforms().is_empty()
    }
}

impl UniformSink for Program {
    fn kind(&self) -> ProgramKind {
        self.kind
    }

    fn use_program(&mut self) {
        self.binds += 1;
        self.written_since_bind.fill(false);
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        let Some(loc) = self.location(name) else {
            debug!("{:?}: no active uniform '{}', write ignored", self.kind, name);
            return;
        };

        let declared = self.kind.uniforms()[loc.0].ty;
        if declared != value.ty() {
            warn!(
                "{:?}: uniform '{}' is {:?}, refusing {:?} write",
                self.kind,
                name,
                declared,
                value.ty()
            );
            return;
        }

        self.values[loc.0] = Some(value);
        self.written_since_bind[loc.0] = true;
    }
}

/// The three programs of the scene. Binding one through [`ProgramSet::use_program`] rebinds
/// it, which resets its per-draw tracking.
#[derive(Debug, Clone)]
pub struct ProgramSet {
    pub parallax: Program,
    pub model: Program,
    pub skybox: Program,
    active: Option<ProgramKind>,
}

impl Default for ProgramSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramSet {
    pub fn new() -> Self {
        Self {
            parallax: Program::new(ProgramKind::Parallax),
            model: Program::new(ProgramKind::ModelLighting),
            skybox: Program::new(ProgramKind::Skybox),
            active: None,
        }
    }

    pub fn get(&self, kind: ProgramKind) -> &Program {
        match kind {
            ProgramKind::Parallax => &self.parallax,
            ProgramKind::ModelLighting => &self.model,
            ProgramKind::Skybox => &self.skybox,
        }
    }

    pub fn get_mut(&mut self, kind: ProgramKind) -> &mut Program {
        match kind {
            ProgramKind::Parallax => &mut self.parallax,
            ProgramKind::ModelLighting => &mut self.model,
            ProgramKind::Skybox => &mut self.skybox,
        }
    }

    pub fn use_program(&mut self, kind: ProgramKind) -> &mut Program {
        self.active = Some(kind);
        let program = self.get_mut(kind);
        program.use_program();
        program
    }

    pub fn active(&self) -> Option<ProgramKind> {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_have_unique_names() {
        for kind in ProgramKind::ALL {
            let program = Program::new(kind);
            assert_eq!(program.locations.len(), kind.uniforms().len(), "{:?}", kind);
        }
    }

    #[test]
    fn unwritten_uniforms_read_as_zero() {
        let program = Program::new(ProgramKind::Parallax);
        assert_eq!(program.mat4("model"), Matrix4::zeros());
        assert_eq!(program.vec3("viewPos"), Vector3::zeros());
        assert_eq!(program.float("heightScale"), 0.0);
        assert!(!program.bool("blinn"));
    }

    #[test]
    fn unknown_names_and_wrong_types_are_ignored() {
        let mut program = Program::new(ProgramKind::Skybox);
        program.use_program();
        program.set_float("heightScale", 0.1);
        program.set_float("view", 1.0);

        assert!(program.value("heightScale").is_none());
        assert!(program.value("view").is_none());
        assert!(program.missing_uniforms().contains(&"view"));
    }

    #[test]
    fn bind_resets_per_draw_tracking_but_keeps_values() {
        let mut program = Program::new(ProgramKind::Skybox);
        program.use_program();
        program.set_mat4("view", &Matrix4::identity());
        program.set_mat4("projection", &Matrix4::identity());
        program.set_int("skybox", 0);
        assert!(program.is_complete());

        program.use_program();
        assert_eq!(program.missing_uniforms(), vec!["view", "projection"]);
        assert_eq!(program.mat4("view"), Matrix4::identity());
        assert_eq!(program.bind_count(), 2);
    }

    #[test]
    fn static_samplers_survive_rebinds() {
        let mut program = Program::new(ProgramKind::Parallax);
        program.set_int("diffuseMap", 0);
        program.set_int("normalMap", 1);
        program.set_int("depthMap", 2);
        program.use_program();

        let missing = program.missing_uniforms();
        assert!(!missing.contains(&"depthMap"));
        assert!(missing.contains(&"heightScale"));
    }

    #[test]
    fn program_set_tracks_the_active_kind() {
        let mut set = ProgramSet::new();
        assert_eq!(set.active(), None);

        set.use_program(ProgramKind::ModelLighting);
        set.use_program(ProgramKind::Parallax);
        assert_eq!(set.active(), Some(ProgramKind::Parallax));
        assert_eq!(set.parallax.bind_count(), 1);
        assert_eq!(set.model.bind_count(), 1);
    }
}
