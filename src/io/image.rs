use crate::core::color::to_rgba8;
use crate::core::framebuffer::FrameBuffer;
use crate::error::{ReefError, Result};
use image::RgbaImage;
use log::{error, info};
use std::path::Path;

/// Resolves the framebuffer to tightly packed RGBA8, row 0 at the top.
pub fn resolve_rgba(framebuffer: &FrameBuffer) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(framebuffer.width * framebuffer.height * 4);
    for y in 0..framebuffer.height {
        for x in 0..framebuffer.width {
            let color = framebuffer.get_pixel(x, y).unwrap_or_default();
            pixels.extend_from_slice(&to_rgba8(color));
        }
    }
    pixels
}

pub fn to_image(framebuffer: &FrameBuffer) -> Option<RgbaImage> {
    RgbaImage::from_raw(
        framebuffer.width as u32,
        framebuffer.height as u32,
        resolve_rgba(framebuffer),
    )
}

/// Writes the resolved framebuffer; the format follows the file extension.
pub fn save_framebuffer<P: AsRef<Path>>(framebuffer: &FrameBuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    let Some(img) = to_image(framebuffer) else {
        // from_raw only fails on a size mismatch, which resolve_rgba rules out
        return Ok(());
    };

    img.save(path).map_err(|source| {
        error!("Failed to save image to {:?}: {}", path, source);
        ReefError::ImageSave {
            path: path.to_path_buf(),
            source,
        }
    })?;
    info!("Saved {}x{} frame to {:?}", img.width(), img.height(), path);
    Ok(())
}
