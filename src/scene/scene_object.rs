use crate::scene::model::Model;
use nalgebra::Matrix4;
use std::sync::Arc;

/// An instance of a model placed in the scene. Instances of the same file share one model.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub model: Arc<Model>,
    pub transform: Matrix4<f32>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, model: Arc<Model>, transform: Matrix4<f32>) -> Self {
        Self {
            name: name.into(),
            model,
            transform,
        }
    }
}
