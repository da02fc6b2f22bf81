pub mod color;
pub mod device;
pub mod framebuffer;
pub mod geometry;
pub mod math;
pub mod pipeline;
pub mod rasterizer;
pub mod tangent;
