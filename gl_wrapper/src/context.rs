/// Explicit handle to an OpenGL context.
///
/// GL keeps its binding state globally inside the driver. Every setup and draw
/// routine takes `&mut impl Gl` instead, so the order in which bindings are
/// made is visible at the call site.
pub trait Gl {
    fn gen_vertex_array(&mut self) -> u32;
    fn bind_vertex_array(&mut self, vao: u32);

    fn gen_buffer(&mut self) -> u32;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32);
    /// Uploads `data` into the buffer currently bound to `target` with static usage.
    fn buffer_data_static(&mut self, target: BufferTarget, data: &[u8]);

    /// Describes a float attribute of the currently bound array buffer.
    /// `stride` and `offset` are in bytes.
    fn vertex_attrib_pointer(&mut self, index: u32, components: i32, stride: i32, offset: usize);
    fn enable_vertex_attrib_array(&mut self, index: u32);

    fn create_shader(&mut self, stage: ShaderStage) -> u32;
    fn shader_source(&mut self, shader: u32, source: &str);
    fn compile_shader(&mut self, shader: u32);
    fn shader_compile_status(&self, shader: u32) -> bool;
    /// Reads at most `max_len - 1` bytes of the info log.
    fn shader_info_log(&self, shader: u32, max_len: usize) -> String;
    fn delete_shader(&mut self, shader: u32);

    fn create_program(&mut self) -> u32;
    fn attach_shader(&mut self, program: u32, shader: u32);
    fn link_program(&mut self, program: u32);
    fn program_link_status(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32, max_len: usize) -> String;
    fn use_program(&mut self, program: u32);

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32);
    fn clear_color_buffer(&mut self);
    fn polygon_mode(&mut self, mode: PolygonMode);

    fn draw_arrays(&mut self, primitive: Primitive, first: i32, count: i32);
    /// Draws `count` `u32` indices from the bound element buffer.
    fn draw_elements(&mut self, primitive: Primitive, count: i32);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Rasterization mode, always applied to both faces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PolygonMode {
    Fill,
    Line,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
}
