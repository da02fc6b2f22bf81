use crate::core::device::{Device, TextureHandle};
use crate::core::geometry::Vertex;
use crate::error::{ReefError, Result};
use crate::scene::material::PhongMaterial;
use crate::scene::mesh::Mesh;
use crate::scene::model::Model;
use crate::scene::texture::Texture;
use log::{debug, info, warn};
use nalgebra::{Point3, Vector2, Vector3};
use std::path::Path;

/// Loads an OBJ file into a [`Model`], one mesh per OBJ object/group.
///
/// Materials come from the referenced MTL file. Map paths are resolved relative to the OBJ;
/// a material without a map gets a 1x1 texture of its `Kd` / `Ks` colour. A missing or
/// broken MTL only costs the materials: meshes then render with unbound (black) maps.
pub fn load_obj<P: AsRef<Path>>(device: &mut Device, path: P) -> Result<Model> {
    let path = path.as_ref();
    info!("Loading OBJ file: {:?}", path);

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true, // Unifies indices for position/normal/uv
        ..Default::default()
    };

    let (models, materials) =
        tobj::load_obj(path, &load_options).map_err(|source| ReefError::Obj {
            path: path.to_path_buf(),
            source,
        })?;

    let materials = materials.unwrap_or_else(|e| {
        warn!("Materials of {:?} unavailable: {}", path, e);
        Vec::new()
    });
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let materials: Vec<PhongMaterial> = materials
        .iter()
        .map(|m| load_material(device, base_dir, m))
        .collect();

    let meshes: Vec<Mesh> = models.iter().map(convert_mesh).collect();

    let model = Model::new(meshes, materials);
    info!(
        "OBJ loaded: {} meshes, {} materials, {} triangles",
        model.meshes.len(),
        model.materials.len(),
        model.triangle_count()
    );
    Ok(model)
}

fn convert_mesh(model: &tobj::Model) -> Mesh {
    let mesh = &model.mesh;
    let num_vertices = mesh.positions.len() / 3;

    let has_normals = mesh.normals.len() == mesh.positions.len();
    let has_texcoords = mesh.texcoords.len() / 2 == num_vertices;
    if !has_normals {
        warn!("Mesh '{}' is missing normals. Using (0, 1, 0).", model.name);
    }

    let vertices = (0..num_vertices)
        .map(|i| {
            let position = Point3::new(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            );
            let normal = if has_normals {
                Vector3::new(
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                )
            } else {
                Vector3::y()
            };
            let texcoord = if has_texcoords {
                Vector2::new(mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1])
            } else {
                Vector2::zeros()
            };
            Vertex::new(position, normal, texcoord)
        })
        .collect();

    debug!(
        "Mesh '{}': {} vertices, {} indices, material {:?}",
        model.name,
        num_vertices,
        mesh.indices.len(),
        mesh.material_id
    );
    Mesh::new(vertices, mesh.indices.clone(), mesh.material_id)
}

fn load_material(device: &mut Device, base_dir: &Path, material: &tobj::Material) -> PhongMaterial {
    let map = |device: &mut Device, file: Option<&String>, color: Option<[f32; 3]>| {
        match (file, color) {
            (Some(file), _) => device.load_texture(base_dir.join(file)),
            (None, Some(rgb)) => device.upload_texture(Texture::solid(Vector3::from(rgb))),
            (None, None) => TextureHandle::NONE,
        }
    };

    let diffuse = map(device, material.diffuse_texture.as_ref(), material.diffuse);
    let specular = map(device, material.specular_texture.as_ref(), material.specular);
    debug!(
        "Material '{}': diffuse #{}, specular #{}",
        material.name,
        diffuse.id(),
        specular.id()
    );
    PhongMaterial { diffuse, specular }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("reef-obj-{}-{}", std::process::id(), name));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl red
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    const QUAD_MTL: &str = "\
newmtl red
Kd 1 0 0
Ks 0.5 0.5 0.5
";

    #[test]
    fn loads_a_quad_with_solid_colour_materials() {
        let dir = temp_dir("quad");
        fs::write(dir.join("quad.obj"), QUAD_OBJ).unwrap();
        fs::write(dir.join("quad.mtl"), QUAD_MTL).unwrap();

        let mut device = Device::new();
        let model = load_obj(&mut device, dir.join("quad.obj")).unwrap();

        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.triangle_count(), 2);
        assert_eq!(model.meshes[0].material_id, Some(0));
        assert_eq!(model.meshes[0].vertices[0].normal, Vector3::z());

        let red = device.texture(model.materials[0].diffuse).unwrap();
        assert_eq!(red.sample(Vector2::new(0.5, 0.5)), Vector3::new(1.0, 0.0, 0.0));
        assert!(device.texture(model.materials[0].specular).is_some());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_mtl_keeps_the_geometry() {
        let dir = temp_dir("no-mtl");
        fs::write(dir.join("quad.obj"), QUAD_OBJ).unwrap();

        let mut device = Device::new();
        let model = load_obj(&mut device, dir.join("quad.obj")).unwrap();
        assert_eq!(model.triangle_count(), 2);
        assert!(model.materials.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_an_obj_error() {
        let mut device = Device::new();
        let err = load_obj(&mut device, "no/such/model.obj").unwrap_err();
        assert!(matches!(err, ReefError::Obj { .. }));
    }
}
