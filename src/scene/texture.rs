use crate::error::{ReefError, Result};
use image::RgbaImage;
use log::info;
use nalgebra::{Vector2, Vector3};
use std::path::Path;

/// Represents a 2D texture map.
///
/// Rows are kept in file order; v = 0 addresses the first row, as when an image is uploaded
/// to a GPU without flipping.
#[derive(Debug, Clone)]
pub struct Texture {
    pub image: RgbaImage,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let img = image::open(path_ref).map_err(|source| ReefError::Texture {
            path: path_ref.to_path_buf(),
            source,
        })?;

        let texture = Self::from_image(img.to_rgba8());
        info!(
            "Loaded texture: {:?} ({}x{})",
            path_ref, texture.width, texture.height
        );
        Ok(texture)
    }

    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            image,
            width,
            height,
        }
    }

    /// A 1x1 texture of the given colour.
    pub fn solid(color: Vector3<f32>) -> Self {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        let pixel = image::Rgba([to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]);
        Self::from_image(RgbaImage::from_pixel(1, 1, pixel))
    }

    /// Bilinear sample with repeat wrapping.
    pub fn sample(&self, uv: Vector2<f32>) -> Vector3<f32> {
        self.sample_with(uv, Wrap::Repeat)
    }

    /// Bilinear sample with clamp-to-edge addressing.
    pub fn sample_clamped(&self, uv: Vector2<f32>) -> Vector3<f32> {
        self.sample_with(uv, Wrap::ClampToEdge)
    }

    fn sample_with(&self, uv: Vector2<f32>, wrap: Wrap) -> Vector3<f32> {
        if self.width == 0 || self.height == 0 {
            return Vector3::zeros();
        }

        // Texel centres sit at half-integer coordinates.
        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let wx = x - x0;
        let wy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let c00 = self.texel(x0, y0, wrap);
        let c10 = self.texel(x0 + 1, y0, wrap);
        let c01 = self.texel(x0, y0 + 1, wrap);
        let c11 = self.texel(x0 + 1, y0 + 1, wrap);

        let top = c00.lerp(&c10, wx);
        let bottom = c01.lerp(&c11, wx);
        top.lerp(&bottom, wy)
    }

    fn texel(&self, x: i64, y: i64, wrap: Wrap) -> Vector3<f32> {
        let (w, h) = (self.width as i64, self.height as i64);
        let (x, y) = match wrap {
            Wrap::Repeat => (x.rem_euclid(w), y.rem_euclid(h)),
            Wrap::ClampToEdge => (x.clamp(0, w - 1), y.clamp(0, h - 1)),
        };

        let p = self.image.get_pixel(x as u32, y as u32);
        Vector3::new(
            p[0] as f32 / 255.0,
            p[1] as f32 / 255.0,
            p[2] as f32 / 255.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wrap {
    Repeat,
    ClampToEdge,
}

/// Six-face environment map in +X, -X, +Y, -Y, +Z, -Z order.
///
/// A face that failed to load samples black.
#[derive(Debug, Clone, Default)]
pub struct Cubemap {
    pub faces: [Option<Texture>; 6],
}

impl Cubemap {
    pub fn new(faces: [Option<Texture>; 6]) -> Self {
        Self { faces }
    }

    /// Samples along `direction` using the usual major-axis face selection.
    pub fn sample(&self, direction: &Vector3<f32>) -> Vector3<f32> {
        let (face, uv) = Self::face_coords(direction);
        match &self.faces[face] {
            Some(texture) => texture.sample_clamped(uv),
            None => Vector3::zeros(),
        }
    }

    /// Returns the face index and the [0, 1] coordinates on that face.
    pub fn face_coords(d: &Vector3<f32>) -> (usize, Vector2<f32>) {
        let (ax, ay, az) = (d.x.abs(), d.y.abs(), d.z.abs());

        let (face, sc, tc, ma) = if ax >= ay && ax >= az {
            if d.x >= 0.0 {
                (0, -d.z, -d.y, ax)
            } else {
                (1, d.z, -d.y, ax)
            }
        } else if ay >= az {
            if d.y >= 0.0 {
                (2, d.x, d.z, ay)
            } else {
                (3, d.x, -d.z, ay)
            }
        } else if d.z >= 0.0 {
            (4, d.x, -d.y, az)
        } else {
            (5, -d.x, -d.y, az)
        };

        if ma <= 0.0 {
            return (face, Vector2::new(0.5, 0.5));
        }

        let uv = Vector2::new((sc / ma + 1.0) * 0.5, (tc / ma + 1.0) * 0.5);
        (face, uv)
    }
}
