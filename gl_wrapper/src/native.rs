use std::ffi::{c_char, c_void, CString};

use gl::types::{GLenum, GLint, GLsizei};

use crate::context::{BufferTarget, Gl, PolygonMode, Primitive, ShaderStage};

/// [`Gl`] backed by the function table loaded through [`load_with`].
///
/// Holds no state of its own; the context that was current when the table
/// was loaded is the one receiving the commands.
pub struct NativeGl {
    _private: (),
}

/// Loads the GL function table using `loader` to resolve symbol names.
pub fn load_with<F>(loader: F)
where
    F: FnMut(&'static str) -> *const c_void,
{
    gl::load_with(loader);
}

/// Checks the entry points the bootstrap relies on actually resolved.
pub fn is_loaded() -> bool {
    gl::Viewport::is_loaded()
        && gl::ClearColor::is_loaded()
        && gl::GenVertexArrays::is_loaded()
        && gl::GenBuffers::is_loaded()
        && gl::CreateShader::is_loaded()
        && gl::CreateProgram::is_loaded()
        && gl::DrawArrays::is_loaded()
        && gl::DrawElements::is_loaded()
}

impl NativeGl {
    /// Returns `None` when the function table is not loaded.
    pub fn new() -> Option<Self> {
        is_loaded().then_some(Self { _private: () })
    }
}

fn target(target: BufferTarget) -> GLenum {
    match target {
        BufferTarget::Array => gl::ARRAY_BUFFER,
        BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
    }
}

fn primitive(primitive: Primitive) -> GLenum {
    match primitive {
        Primitive::Triangles => gl::TRIANGLES,
    }
}

fn log_to_string(buf: &[u8], written: GLsizei) -> String {
    let len = (written.max(0) as usize).min(buf.len());
    String::from_utf8_lossy(&buf[..len]).into_owned()
}

impl Gl for NativeGl {
    fn gen_vertex_array(&mut self) -> u32 {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, &mut vao) };
        vao
    }

    fn bind_vertex_array(&mut self, vao: u32) {
        unsafe { gl::BindVertexArray(vao) }
    }

    fn gen_buffer(&mut self) -> u32 {
        let mut buffer = 0;
        unsafe { gl::GenBuffers(1, &mut buffer) };
        buffer
    }

    fn bind_buffer(&mut self, t: BufferTarget, buffer: u32) {
        unsafe { gl::BindBuffer(target(t), buffer) }
    }

    fn buffer_data_static(&mut self, t: BufferTarget, data: &[u8]) {
        unsafe {
            gl::BufferData(
                target(t),
                data.len() as isize,
                data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );
        }
    }

    fn vertex_attrib_pointer(&mut self, index: u32, components: i32, stride: i32, offset: usize) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const c_void,
            );
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { gl::EnableVertexAttribArray(index) }
    }

    fn create_shader(&mut self, stage: ShaderStage) -> u32 {
        let kind = match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        };
        unsafe { gl::CreateShader(kind) }
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        // Interior nul bytes cannot be passed through; the driver sees the
        // source up to the first one, which then fails to compile.
        let source = match CString::new(source) {
            Ok(s) => s,
            Err(e) => {
                let pos = e.nul_position();
                let mut bytes = e.into_vec();
                bytes.truncate(pos);
                CString::new(bytes).unwrap_or_default()
            }
        };

        unsafe {
            gl::ShaderSource(
                shader,
                1,
                (&source.as_ptr()) as *const *const c_char,
                std::ptr::null(),
            );
        }
    }

    fn compile_shader(&mut self, shader: u32) {
        unsafe { gl::CompileShader(shader) }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        let mut success: GLint = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success) };
        success == gl::TRUE as GLint
    }

    fn shader_info_log(&self, shader: u32, max_len: usize) -> String {
        let mut buf = vec![0_u8; max_len];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetShaderInfoLog(
                shader,
                max_len as GLsizei,
                &mut written,
                buf.as_mut_ptr() as *mut c_char,
            );
        }
        log_to_string(&buf, written)
    }

    fn delete_shader(&mut self, shader: u32) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&mut self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&mut self, program: u32) {
        unsafe { gl::LinkProgram(program) }
    }

    fn program_link_status(&self, program: u32) -> bool {
        let mut success: GLint = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut success) };
        success == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: u32, max_len: usize) -> String {
        let mut buf = vec![0_u8; max_len];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetProgramInfoLog(
                program,
                max_len as GLsizei,
                &mut written,
                buf.as_mut_ptr() as *mut c_char,
            );
        }
        log_to_string(&buf, written)
    }

    fn use_program(&mut self, program: u32) {
        unsafe { gl::UseProgram(program) }
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { gl::Viewport(x, y, width, height) }
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { gl::ClearColor(r, g, b, a) }
    }

    fn clear_color_buffer(&mut self) {
        unsafe { gl::Clear(gl::COLOR_BUFFER_BIT) }
    }

    fn polygon_mode(&mut self, mode: PolygonMode) {
        let mode = match mode {
            PolygonMode::Fill => gl::FILL,
            PolygonMode::Line => gl::LINE,
        };
        unsafe { gl::PolygonMode(gl::FRONT_AND_BACK, mode) }
    }

    fn draw_arrays(&mut self, p: Primitive, first: i32, count: i32) {
        unsafe { gl::DrawArrays(primitive(p), first, count) }
    }

    fn draw_elements(&mut self, p: Primitive, count: i32) {
        unsafe {
            gl::DrawElements(primitive(p), count, gl::UNSIGNED_INT, std::ptr::null());
        }
    }
}
