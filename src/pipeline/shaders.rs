pub mod lighting;
pub mod parallax;
pub mod phong;
pub mod skybox;
