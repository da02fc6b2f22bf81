use crate::core::geometry::VertexLayout;
use crate::scene::texture::{Cubemap, Texture};
use log::{debug, warn};
use std::num::NonZeroU32;
use std::path::Path;

/// Number of texture units a draw can sample from.
pub const TEXTURE_UNITS: usize = 8;

/// Opaque handle to a vertex buffer. Always valid for the device that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(NonZeroU32);

impl BufferHandle {
    pub fn id(self) -> u32 {
        self.0.get()
    }
}

/// Opaque handle to a texture. `TextureHandle::NONE` means "nothing bound"; sampling it
/// yields black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub const NONE: Self = Self(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

/// Static vertex data uploaded once.
#[derive(Debug, Clone)]
pub struct VertexBuffer {
    pub data: Vec<f32>,
    pub layout: VertexLayout,
}

impl VertexBuffer {
    pub fn vertex_count(&self) -> usize {
        self.layout.vertex_count(&self.data)
    }
}

#[derive(Debug, Clone)]
enum TextureData {
    Flat(Texture),
    Cube(Cubemap),
}

/// Software stand-in for a GPU: owns buffers and textures and tracks which texture is
/// bound to each unit.
#[derive(Debug, Default)]
pub struct Device {
    buffers: Vec<VertexBuffer>,
    textures: Vec<TextureData>,
    units: [TextureHandle; TEXTURE_UNITS],
}

impl Device {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_vertex_buffer(&mut self, data: &[f32], layout: VertexLayout) -> BufferHandle {
        self.buffers.push(VertexBuffer {
            data: data.to_vec(),
            layout,
        });
        let id = u32::try_from(self.buffers.len())
            .ok()
            .and_then(NonZeroU32::new)
            .unwrap_or(NonZeroU32::MAX);
        debug!("Created vertex buffer #{} ({} floats)", id, data.len());
        BufferHandle(id)
    }

    pub fn buffer(&self, handle: BufferHandle) -> Option<&VertexBuffer> {
        self.buffers.get(handle.id() as usize - 1)
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn upload_texture(&mut self, texture: Texture) -> TextureHandle {
        self.push_texture(TextureData::Flat(texture))
    }

    pub fn upload_cubemap(&mut self, cubemap: Cubemap) -> TextureHandle {
        self.push_texture(TextureData::Cube(cubemap))
    }

    /// Loads and uploads an image. On failure the problem is logged and `NONE` is returned,
    /// so the caller keeps going with an unbound texture.
    pub fn load_texture<P: AsRef<Path>>(&mut self, path: P) -> TextureHandle {
        match Texture::load(path.as_ref()) {
            Ok(texture) => self.upload_texture(texture),
            Err(e) => {
                warn!("{}", e);
                TextureHandle::NONE
            }
        }
    }

    /// Loads six faces into one cubemap. Faces that fail to load are logged and left black.
    pub fn load_cubemap<P: AsRef<Path>>(&mut self, faces: &[P; 6]) -> TextureHandle {
        let mut loaded: [Option<Texture>; 6] = Default::default();
        for (slot, path) in loaded.iter_mut().zip(faces.iter()) {
            match Texture::load(path.as_ref()) {
                Ok(texture) => *slot = Some(texture),
                Err(e) => warn!("Cubemap face failed to load: {}", e),
            }
        }
        self.upload_cubemap(Cubemap::new(loaded))
    }

    fn push_texture(&mut self, data: TextureData) -> TextureHandle {
        self.textures.push(data);
        TextureHandle(self.textures.len() as u32)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        match self.texture_data(handle)? {
            TextureData::Flat(t) => Some(t),
            TextureData::Cube(_) => None,
        }
    }

    pub fn cubemap(&self, handle: TextureHandle) -> Option<&Cubemap> {
        match self.texture_data(handle)? {
            TextureData::Cube(c) => Some(c),
            TextureData::Flat(_) => None,
        }
    }

    fn texture_data(&self, handle: TextureHandle) -> Option<&TextureData> {
        if handle.is_none() {
            return None;
        }
        self.textures.get(handle.0 as usize - 1)
    }

    /// Binds `handle` to `unit`. Out-of-range units are ignored with a warning.
    pub fn bind_texture(&mut self, unit: usize, handle: TextureHandle) {
        match self.units.get_mut(unit) {
            Some(slot) => *slot = handle,
            None => warn!("Texture unit {} out of range (max {})", unit, TEXTURE_UNITS - 1),
        }
    }

    pub fn bound_texture(&self, unit: usize) -> TextureHandle {
        self.units.get(unit).copied().unwrap_or(TextureHandle::NONE)
    }

    pub fn bound_units(&self) -> [TextureHandle; TEXTURE_UNITS] {
        self.units
    }

    /// The 2D texture bound at `unit`, if any. Negative units come from unset sampler
    /// uniforms and resolve to nothing.
    pub fn texture_at_unit(&self, unit: i32) -> Option<&Texture> {
        usize::try_from(unit)
            .ok()
            .and_then(|u| self.texture(self.bound_texture(u)))
    }

    pub fn cubemap_at_unit(&self, unit: i32) -> Option<&Cubemap> {
        usize::try_from(unit)
            .ok()
            .and_then(|u| self.cubemap(self.bound_texture(u)))
    }
}
