use thiserror::Error;

use crate::context::{BufferTarget, Gl};

pub struct GeometryBuilder<'a> {
    attributes: Vec<VertexAttribute>,
    data: &'a [f32],
    indices: Option<&'a [u32]>,
}

impl<'a> GeometryBuilder<'a> {
    pub fn new(data: &'a [f32]) -> Self {
        Self {
            data,
            attributes: Vec::new(),
            indices: None,
        }
    }

    pub fn with_attribute(mut self, attr: VertexAttribute) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn with_indices(mut self, indices: &'a [u32]) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Uploads the data and records the attribute layout in a new vertex array.
    ///
    /// The vertex array is left bound, with the vertex buffer on the array
    /// target and the index buffer (if any) on the element target.
    pub fn build(self, gl: &mut impl Gl) -> Result<Geometry, GBError> {
        let total_len: usize = self.attributes.iter().map(|a| a.size()).sum();

        if total_len == 0 {
            return Err(GBError::NoAttributes);
        }

        if self.data.len() % total_len != 0 {
            return Err(GBError::InvalidDataLength);
        }

        let vertices = self.data.len() / total_len;

        if let Some(indices) = self.indices {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices) {
                return Err(GBError::IndexOutOfRange { index, vertices });
            }
        }

        let vao = gl.gen_vertex_array();
        gl.bind_vertex_array(vao);

        let vbo = gl.gen_buffer();
        gl.bind_buffer(BufferTarget::Array, vbo);
        gl.buffer_data_static(BufferTarget::Array, bytemuck::cast_slice(self.data));

        let ebo = self.indices.map(|indices| {
            let ebo = gl.gen_buffer();
            gl.bind_buffer(BufferTarget::ElementArray, ebo);
            gl.buffer_data_static(BufferTarget::ElementArray, bytemuck::cast_slice(indices));
            ebo
        });

        let stride = (total_len * std::mem::size_of::<f32>()) as i32;
        let mut offset = 0;

        for (i, attr) in self.attributes.iter().enumerate() {
            gl.vertex_attrib_pointer(
                i as u32,
                attr.size() as i32,
                stride,
                offset * std::mem::size_of::<f32>(),
            );
            offset += attr.size();
            gl.enable_vertex_attrib_array(i as u32);
        }

        let count = self.indices.map_or(vertices, <[u32]>::len);

        Ok(Geometry {
            vao,
            vbo,
            ebo,
            count,
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GBError {
    #[error("Invalid data length for given attributes")]
    InvalidDataLength,
    #[error("No vertex attributes given")]
    NoAttributes,
    #[error("Index {index} is out of range for {vertices} vertices")]
    IndexOutOfRange { index: u32, vertices: usize },
}

#[derive(Copy, Clone, Debug)]
pub enum VertexAttribute {
    Float,
    Vec2,
    Vec3,
}

impl VertexAttribute {
    pub fn size(&self) -> usize {
        match self {
            VertexAttribute::Float => 1,
            VertexAttribute::Vec2 => 2,
            VertexAttribute::Vec3 => 3,
        }
    }
}

/// GPU side geometry. The objects are never released; they live as long as
/// the context does.
#[derive(Debug)]
pub struct Geometry {
    vao: u32,
    vbo: u32,
    ebo: Option<u32>,
    count: usize,
}

impl Geometry {
    pub fn vao(&self) -> u32 {
        self.vao
    }
    pub fn vbo(&self) -> u32 {
        self.vbo
    }
    pub fn ebo(&self) -> Option<u32> {
        self.ebo
    }
    /// Number of vertices, or of indices for indexed geometry.
    pub fn count(&self) -> usize {
        self.count
    }
    pub fn is_indexed(&self) -> bool {
        self.ebo.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessGl;

    const TRI: [f32; 9] = [-0.5, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0];

    #[test]
    fn layout_matches_tightly_packed_positions() {
        let mut gl = HeadlessGl::default();
        let geometry = GeometryBuilder::new(&TRI)
            .with_attribute(VertexAttribute::Vec3)
            .build(&mut gl)
            .unwrap();

        assert_eq!(geometry.count(), 3);
        assert!(!geometry.is_indexed());
        assert_eq!(gl.bound_vertex_array(), geometry.vao());
        assert_eq!(gl.bound_buffer(BufferTarget::Array), geometry.vbo());

        let attr = gl.attribute(geometry.vao(), 0).unwrap();
        assert_eq!(attr.components, 3);
        assert_eq!(attr.stride, 12);
        assert_eq!(attr.offset, 0);
        assert!(attr.enabled);
        assert_eq!(attr.buffer, geometry.vbo());

        let uploaded = gl.buffer_contents(geometry.vbo()).unwrap();
        assert_eq!(uploaded, bytemuck::cast_slice::<f32, u8>(&TRI));
    }

    #[test]
    fn interleaved_attributes_get_byte_offsets() {
        let data = [0.0_f32; 12];
        let mut gl = HeadlessGl::default();
        let geometry = GeometryBuilder::new(&data)
            .with_attribute(VertexAttribute::Vec2)
            .with_attribute(VertexAttribute::Float)
            .with_attribute(VertexAttribute::Vec3)
            .build(&mut gl)
            .unwrap();

        assert_eq!(geometry.count(), 2);
        let second = gl.attribute(geometry.vao(), 1).unwrap();
        assert_eq!(second.components, 1);
        assert_eq!(second.offset, 8);
        assert_eq!(second.stride, 24);
        let third = gl.attribute(geometry.vao(), 2).unwrap();
        assert_eq!(third.offset, 12);
    }

    #[test]
    fn index_buffer_is_recorded_in_vertex_array() {
        let quad = [0.0_f32; 12];
        let indices = [0, 1, 3, 1, 2, 3];
        let mut gl = HeadlessGl::default();
        let geometry = GeometryBuilder::new(&quad)
            .with_attribute(VertexAttribute::Vec3)
            .with_indices(&indices)
            .build(&mut gl)
            .unwrap();

        assert_eq!(geometry.count(), 6);
        assert_eq!(gl.bound_buffer(BufferTarget::ElementArray), geometry.ebo().unwrap());
    }

    #[test]
    fn rejects_bad_input() {
        let mut gl = HeadlessGl::default();

        let res = GeometryBuilder::new(&TRI[..8])
            .with_attribute(VertexAttribute::Vec3)
            .build(&mut gl);
        assert_eq!(res.unwrap_err(), GBError::InvalidDataLength);

        let res = GeometryBuilder::new(&TRI).build(&mut gl);
        assert_eq!(res.unwrap_err(), GBError::NoAttributes);

        let res = GeometryBuilder::new(&TRI)
            .with_attribute(VertexAttribute::Vec3)
            .with_indices(&[0, 1, 3])
            .build(&mut gl);
        assert_eq!(
            res.unwrap_err(),
            GBError::IndexOutOfRange {
                index: 3,
                vertices: 3
            }
        );

        assert!(gl.commands().is_empty());
        assert_eq!(gl.bound_vertex_array(), 0);
    }
}
