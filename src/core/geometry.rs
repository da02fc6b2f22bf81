use bytemuck::{Pod, Zeroable};
use nalgebra::{Point3, Vector2, Vector3};

/// Number of floats one vertex occupies in a device vertex buffer.
pub const FLOATS_PER_VERTEX: usize = 14;

/// Represents a single vertex in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in local object space.
    pub position: Point3<f32>,
    /// Normal vector for lighting calculations.
    pub normal: Vector3<f32>,
    /// Texture coordinates (UV).
    pub texcoord: Vector2<f32>,
    /// Tangent for normal mapping. Not normalized; shaders normalize after transforming.
    pub tangent: Vector3<f32>,
    pub bitangent: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, texcoord: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            texcoord,
            tangent: Vector3::zeros(),
            bitangent: Vector3::zeros(),
        }
    }

    pub fn with_tangent_frame(mut self, tangent: Vector3<f32>, bitangent: Vector3<f32>) -> Self {
        self.tangent = tangent;
        self.bitangent = bitangent;
        self
    }
}

/// Packed vertex as it is uploaded into a device buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl From<&Vertex> for GpuVertex {
    fn from(v: &Vertex) -> Self {
        Self {
            position: v.position.coords.into(),
            normal: v.normal.into(),
            texcoord: v.texcoord.into(),
            tangent: v.tangent.into(),
            bitangent: v.bitangent.into(),
        }
    }
}

/// Semantic slot of a vertex attribute, numbered like shader input locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Position = 0,
    Normal = 1,
    TexCoord = 2,
    Tangent = 3,
    Bitangent = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub attribute: Attribute,
    /// Float count of the attribute.
    pub components: usize,
    /// Offset in floats from the start of the vertex.
    pub offset: usize,
}

/// Describes how vertices are laid out inside a flat float buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    /// Distance in floats between two consecutive vertices.
    pub stride: usize,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// pos(3) | normal(3) | uv(2) | tangent(3) | bitangent(3)
    pub fn tangent_space() -> Self {
        let attrs = [
            (Attribute::Position, 3),
            (Attribute::Normal, 3),
            (Attribute::TexCoord, 2),
            (Attribute::Tangent, 3),
            (Attribute::Bitangent, 3),
        ];

        let mut offset = 0;
        let attributes = attrs
            .iter()
            .map(|&(attribute, components)| {
                let attr = VertexAttribute {
                    attribute,
                    components,
                    offset,
                };
                offset += components;
                attr
            })
            .collect();

        Self {
            stride: offset,
            attributes,
        }
    }

    /// Bare positions, 3 floats per vertex.
    pub fn positions() -> Self {
        Self {
            stride: 3,
            attributes: vec![VertexAttribute {
                attribute: Attribute::Position,
                components: 3,
                offset: 0,
            }],
        }
    }

    /// Number of whole vertices stored in `data`.
    pub fn vertex_count(&self, data: &[f32]) -> usize {
        if self.stride == 0 {
            0
        } else {
            data.len() / self.stride
        }
    }

    /// Decodes vertex `index` out of a flat buffer. Attributes absent from the layout stay zero.
    pub fn fetch(&self, data: &[f32], index: usize) -> Option<Vertex> {
        let base = index * self.stride;
        let raw = data.get(base..base + self.stride)?;

        let mut vertex = Vertex::new(Point3::origin(), Vector3::zeros(), Vector2::zeros());
        for attr in &self.attributes {
            let src = raw.get(attr.offset..attr.offset + attr.components)?;
            match attr.attribute {
                Attribute::Position => vertex.position = Point3::new(src[0], src[1], src[2]),
                Attribute::Normal => vertex.normal = Vector3::new(src[0], src[1], src[2]),
                Attribute::TexCoord => vertex.texcoord = Vector2::new(src[0], src[1]),
                Attribute::Tangent => vertex.tangent = Vector3::new(src[0], src[1], src[2]),
                Attribute::Bitangent => vertex.bitangent = Vector3::new(src[0], src[1], src[2]),
            }
        }
        Some(vertex)
    }
}
