use std::collections::{BTreeMap, HashMap};

use crate::context::{BufferTarget, Gl, PolygonMode, Primitive, ShaderStage};

/// In-memory [`Gl`] that follows the binding rules of a core profile context
/// without touching a driver.
///
/// Buffer contents, vertex array layouts, shaders and programs are tracked
/// so that every draw can be recorded together with the data it would read.
/// A shader fails to compile when its source is empty or contains an
/// `#error` directive, mirroring what a GLSL compiler reports for it.
pub struct HeadlessGl {
    next_id: u32,
    buffers: HashMap<u32, Vec<u8>>,
    vertex_arrays: HashMap<u32, VertexArrayState>,
    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, ProgramObject>,
    array_buffer: u32,
    vertex_array: u32,
    current_program: u32,
    viewport: [i32; 4],
    clear_color: [f32; 4],
    polygon_mode: PolygonMode,
    commands: Vec<Command>,
}

#[derive(Default, Clone, Debug)]
struct VertexArrayState {
    element_buffer: u32,
    attributes: BTreeMap<u32, Attribute>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub buffer: u32,
    pub components: i32,
    pub stride: i32,
    pub offset: usize,
    pub enabled: bool,
}

#[derive(Debug)]
struct ShaderObject {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
    delete_pending: bool,
}

#[derive(Default, Debug)]
struct ProgramObject {
    attached: Vec<u32>,
    linked: bool,
    log: String,
}

/// State-changing commands that reach the framebuffer, in issue order.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Viewport([i32; 4]),
    Clear { color: [f32; 4] },
    PolygonMode(PolygonMode),
    Draw(DrawCall),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub primitive: Primitive,
    pub kind: DrawKind,
    pub program: u32,
    pub vertex_array: u32,
    /// Floats of the buffer feeding attribute slot 0.
    pub positions: Vec<f32>,
    pub polygon_mode: PolygonMode,
    pub viewport: [i32; 4],
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawKind {
    Arrays { first: i32, count: i32 },
    Elements { indices: Vec<u32> },
}

impl Default for HeadlessGl {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl HeadlessGl {
    /// Creates a context whose default framebuffer is `width` x `height`.
    pub fn new(width: i32, height: i32) -> Self {
        let mut vertex_arrays = HashMap::new();
        vertex_arrays.insert(0, VertexArrayState::default());

        Self {
            next_id: 1,
            buffers: HashMap::new(),
            vertex_arrays,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            array_buffer: 0,
            vertex_array: 0,
            current_program: 0,
            viewport: [0, 0, width, height],
            clear_color: [0.0; 4],
            polygon_mode: PolygonMode::Fill,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drains the command log, leaving the context state untouched.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn draw_calls(&self) -> impl Iterator<Item = &DrawCall> {
        self.commands.iter().filter_map(|c| match c {
            Command::Draw(d) => Some(d),
            _ => None,
        })
    }

    pub fn viewport_rect(&self) -> [i32; 4] {
        self.viewport
    }

    pub fn current_polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    pub fn current_program(&self) -> u32 {
        self.current_program
    }

    pub fn bound_vertex_array(&self) -> u32 {
        self.vertex_array
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> u32 {
        match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => self.vao().element_buffer,
        }
    }

    pub fn buffer_contents(&self, buffer: u32) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    pub fn attribute(&self, vao: u32, index: u32) -> Option<&Attribute> {
        self.vertex_arrays.get(&vao)?.attributes.get(&index)
    }

    /// Whether `DeleteShader` was issued for `shader`.
    pub fn is_shader_deleted(&self, shader: u32) -> bool {
        self.shaders.get(&shader).map_or(false, |s| s.delete_pending)
    }

    pub fn attached_shaders(&self, program: u32) -> &[u32] {
        self.programs
            .get(&program)
            .map(|p| p.attached.as_slice())
            .unwrap_or_default()
    }

    fn gen_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn vao(&self) -> &VertexArrayState {
        // The bound vertex array is always one that was generated (or 0).
        &self.vertex_arrays[&self.vertex_array]
    }

    fn vao_mut(&mut self) -> &mut VertexArrayState {
        self.vertex_arrays.entry(self.vertex_array).or_default()
    }

    fn floats_of(&self, buffer: u32) -> Vec<f32> {
        self.buffers
            .get(&buffer)
            .map(|b| bytemuck::pod_collect_to_vec(&b[..b.len() - b.len() % 4]))
            .unwrap_or_default()
    }

    fn record_draw(&mut self, primitive: Primitive, kind: DrawKind) {
        let positions = match self.vao().attributes.get(&0) {
            Some(attr) if attr.enabled => self.floats_of(attr.buffer),
            _ => Vec::new(),
        };

        self.commands.push(Command::Draw(DrawCall {
            primitive,
            kind,
            program: self.current_program,
            vertex_array: self.vertex_array,
            positions,
            polygon_mode: self.polygon_mode,
            viewport: self.viewport,
        }));
    }
}

fn compile(source: &str) -> Result<(), String> {
    if source.trim().is_empty() {
        return Err("0:1(1): error: syntax error, unexpected end of file\n".to_owned());
    }

    let errors: String = source
        .lines()
        .enumerate()
        .filter_map(|(line, text)| {
            let msg = text.trim_start().strip_prefix("#error")?;
            Some(format!("0:{}(1): error: {}\n", line + 1, msg.trim()))
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn truncate_log(log: &str, max_len: usize) -> String {
    let bytes = log.as_bytes();
    let len = bytes.len().min(max_len.saturating_sub(1));
    String::from_utf8_lossy(&bytes[..len]).into_owned()
}

impl Gl for HeadlessGl {
    fn gen_vertex_array(&mut self) -> u32 {
        let id = self.gen_id();
        self.vertex_arrays.insert(id, VertexArrayState::default());
        id
    }

    fn bind_vertex_array(&mut self, vao: u32) {
        if self.vertex_arrays.contains_key(&vao) {
            self.vertex_array = vao;
        }
    }

    fn gen_buffer(&mut self) -> u32 {
        let id = self.gen_id();
        self.buffers.insert(id, Vec::new());
        id
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32) {
        match target {
            BufferTarget::Array => self.array_buffer = buffer,
            BufferTarget::ElementArray => self.vao_mut().element_buffer = buffer,
        }
    }

    fn buffer_data_static(&mut self, target: BufferTarget, data: &[u8]) {
        let bound = self.bound_buffer(target);
        if let Some(store) = self.buffers.get_mut(&bound) {
            *store = data.to_vec();
        }
    }

    fn vertex_attrib_pointer(&mut self, index: u32, components: i32, stride: i32, offset: usize) {
        let buffer = self.array_buffer;
        let attrs = &mut self.vao_mut().attributes;
        let enabled = attrs.get(&index).map_or(false, |a| a.enabled);
        attrs.insert(
            index,
            Attribute {
                buffer,
                components,
                stride,
                offset,
                enabled,
            },
        );
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        let attr = self
            .vao_mut()
            .attributes
            .entry(index)
            .or_insert(Attribute {
                buffer: 0,
                components: 4,
                stride: 0,
                offset: 0,
                enabled: false,
            });
        attr.enabled = true;
    }

    fn create_shader(&mut self, stage: ShaderStage) -> u32 {
        let id = self.gen_id();
        self.shaders.insert(
            id,
            ShaderObject {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
                delete_pending: false,
            },
        );
        id
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        if let Some(s) = self.shaders.get_mut(&shader) {
            s.source = source.to_owned();
        }
    }

    fn compile_shader(&mut self, shader: u32) {
        if let Some(s) = self.shaders.get_mut(&shader) {
            match compile(&s.source) {
                Ok(()) => {
                    s.compiled = true;
                    s.log.clear();
                }
                Err(log) => {
                    s.compiled = false;
                    s.log = log;
                }
            }
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.shaders.get(&shader).map_or(false, |s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32, max_len: usize) -> String {
        self.shaders
            .get(&shader)
            .map(|s| truncate_log(&s.log, max_len))
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: u32) {
        if let Some(s) = self.shaders.get_mut(&shader) {
            s.delete_pending = true;
        }
    }

    fn create_program(&mut self) -> u32 {
        let id = self.gen_id();
        self.programs.insert(id, ProgramObject::default());
        id
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        if let Some(p) = self.programs.get_mut(&program) {
            if !p.attached.contains(&shader) {
                p.attached.push(shader);
            }
        }
    }

    fn link_program(&mut self, program: u32) {
        let Some(p) = self.programs.get(&program) else {
            return;
        };

        let stages: Vec<_> = p
            .attached
            .iter()
            .filter_map(|id| self.shaders.get(id))
            .collect();

        let log = if stages.iter().any(|s| !s.compiled) {
            Some("error: linking with uncompiled/unspecialized shader")
        } else if !stages.iter().any(|s| s.stage == ShaderStage::Vertex) {
            Some("error: program lacks a vertex shader")
        } else if !stages.iter().any(|s| s.stage == ShaderStage::Fragment) {
            Some("error: program lacks a fragment shader")
        } else {
            None
        };

        if let Some(p) = self.programs.get_mut(&program) {
            p.linked = log.is_none();
            p.log = log.map(str::to_owned).unwrap_or_default();
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.programs.get(&program).map_or(false, |p| p.linked)
    }

    fn program_info_log(&self, program: u32, max_len: usize) -> String {
        self.programs
            .get(&program)
            .map(|p| truncate_log(&p.log, max_len))
            .unwrap_or_default()
    }

    fn use_program(&mut self, program: u32) {
        self.current_program = program;
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport = [x, y, width, height];
        self.commands.push(Command::Viewport(self.viewport));
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.clear_color = [r, g, b, a];
    }

    fn clear_color_buffer(&mut self) {
        self.commands.push(Command::Clear {
            color: self.clear_color,
        });
    }

    fn polygon_mode(&mut self, mode: PolygonMode) {
        self.polygon_mode = mode;
        self.commands.push(Command::PolygonMode(mode));
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: i32, count: i32) {
        self.record_draw(primitive, DrawKind::Arrays { first, count });
    }

    fn draw_elements(&mut self, primitive: Primitive, count: i32) {
        let element_buffer = self.vao().element_buffer;
        let bytes = self
            .buffers
            .get(&element_buffer)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let whole = bytes.len() - bytes.len() % 4;

        let mut indices: Vec<u32> = bytemuck::pod_collect_to_vec(&bytes[..whole]);
        indices.truncate(count.max(0) as usize);

        self.record_draw(primitive, DrawKind::Elements { indices });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_binding_belongs_to_vertex_array() {
        let mut gl = HeadlessGl::default();
        let a = gl.gen_vertex_array();
        let b = gl.gen_vertex_array();
        let ebo = gl.gen_buffer();

        gl.bind_vertex_array(a);
        gl.bind_buffer(BufferTarget::ElementArray, ebo);
        gl.bind_vertex_array(b);
        assert_eq!(gl.bound_buffer(BufferTarget::ElementArray), 0);
        gl.bind_vertex_array(a);
        assert_eq!(gl.bound_buffer(BufferTarget::ElementArray), ebo);
    }

    #[test]
    fn error_directive_fails_compilation_with_line_number() {
        let mut gl = HeadlessGl::default();
        let s = gl.create_shader(ShaderStage::Vertex);
        gl.shader_source(s, "#version 330 core\n#error broken on purpose\n");
        gl.compile_shader(s);

        assert!(!gl.shader_compile_status(s));
        assert_eq!(
            gl.shader_info_log(s, 512),
            "0:2(1): error: broken on purpose\n"
        );
    }

    #[test]
    fn info_log_keeps_room_for_terminator() {
        let mut gl = HeadlessGl::default();
        let s = gl.create_shader(ShaderStage::Fragment);
        let long = format!("#error {}", "x".repeat(2000));
        gl.shader_source(s, &long);
        gl.compile_shader(s);

        assert_eq!(gl.shader_info_log(s, 512).len(), 511);
        assert_eq!(gl.shader_info_log(s, 0), "");
    }

    #[test]
    fn link_fails_when_a_stage_did_not_compile() {
        let mut gl = HeadlessGl::default();
        let vs = gl.create_shader(ShaderStage::Vertex);
        let fs = gl.create_shader(ShaderStage::Fragment);
        gl.shader_source(vs, "");
        gl.shader_source(fs, "void main() {}");
        gl.compile_shader(vs);
        gl.compile_shader(fs);

        let p = gl.create_program();
        gl.attach_shader(p, vs);
        gl.attach_shader(p, fs);
        gl.link_program(p);

        assert!(!gl.program_link_status(p));
        assert!(gl.program_info_log(p, 512).contains("uncompiled"));
    }

    #[test]
    fn draw_reads_attribute_buffer_not_current_binding() {
        let mut gl = HeadlessGl::default();
        let vao = gl.gen_vertex_array();
        let vbo = gl.gen_buffer();
        gl.bind_vertex_array(vao);
        gl.bind_buffer(BufferTarget::Array, vbo);
        let data = [1.0_f32, 2.0, 3.0];
        gl.buffer_data_static(BufferTarget::Array, bytemuck::cast_slice(&data));
        gl.vertex_attrib_pointer(0, 3, 12, 0);
        gl.enable_vertex_attrib_array(0);
        gl.bind_buffer(BufferTarget::Array, 0);

        gl.draw_arrays(Primitive::Triangles, 0, 1);

        let draw = gl.draw_calls().next().unwrap();
        assert_eq!(draw.positions, vec![1.0, 2.0, 3.0]);
        assert_eq!(draw.vertex_array, vao);
    }
}
