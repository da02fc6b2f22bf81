use crate::core::device::{Device, TextureHandle};
use crate::pipeline::program::UniformSink;

/// Texture unit of the diffuse map; the specular map uses the next one.
pub const DIFFUSE_UNIT: usize = 0;
pub const SPECULAR_UNIT: usize = 1;

/// Textures of a model mesh, addressed by device handle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhongMaterial {
    pub diffuse: TextureHandle,
    pub specular: TextureHandle,
}

impl PhongMaterial {
    /// Binds both maps and points the program's material samplers at them.
    pub fn bind<U: UniformSink + ?Sized>(&self, device: &mut Device, program: &mut U) {
        device.bind_texture(DIFFUSE_UNIT, self.diffuse);
        device.bind_texture(SPECULAR_UNIT, self.specular);
        program.set_int("material.texture_diffuse1", DIFFUSE_UNIT as i32);
        program.set_int("material.texture_specular1", SPECULAR_UNIT as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::program::{Program, ProgramKind};
    use crate::scene::texture::Texture;
    use nalgebra::Vector3;

    #[test]
    fn bind_fills_the_material_units() {
        let mut device = Device::new();
        let material = PhongMaterial {
            diffuse: device.upload_texture(Texture::solid(Vector3::x())),
            specular: device.upload_texture(Texture::solid(Vector3::y())),
        };
        let mut program = Program::new(ProgramKind::ModelLighting);
        material.bind(&mut device, &mut program);

        assert_eq!(device.bound_texture(0), material.diffuse);
        assert_eq!(device.bound_texture(1), material.specular);
        assert_eq!(program.int("material.texture_specular1"), 1);
    }
}
