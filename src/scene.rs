pub mod camera;
pub mod context;
pub mod ground;
pub mod light;
pub mod loader;
pub mod material;
pub mod mesh;
pub mod model;
pub mod scene_object;
pub mod texture;
