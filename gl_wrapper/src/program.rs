use thiserror::Error;

use crate::context::{Gl, ShaderStage};

/// Size of the buffer info logs are read into, terminator included.
pub const INFO_LOG_LEN: usize = 512;

pub struct ProgramBuilder<'a> {
    vert: &'a str,
    frag: &'a str,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(vert_src: &'a str, frag_src: &'a str) -> Self {
        Self {
            vert: vert_src,
            frag: frag_src,
        }
    }

    /// Compiles and links, failing on the first stage that does not compile
    /// or when the program does not link.
    pub fn build(self, gl: &mut impl Gl) -> Result<Program, ProgramError> {
        let vert = compile_stage(gl, ShaderStage::Vertex, self.vert);
        if let Err(log) = vert.1 {
            gl.delete_shader(vert.0);
            return Err(ProgramError::Compilation {
                stage: ShaderStage::Vertex,
                log,
            });
        }

        let frag = compile_stage(gl, ShaderStage::Fragment, self.frag);
        if let Err(log) = frag.1 {
            gl.delete_shader(vert.0);
            gl.delete_shader(frag.0);
            return Err(ProgramError::Compilation {
                stage: ShaderStage::Fragment,
                log,
            });
        }

        let program = link(gl, vert.0, frag.0);

        if !gl.program_link_status(program) {
            return Err(ProgramError::Linking(
                gl.program_info_log(program, INFO_LOG_LEN),
            ));
        }

        Ok(Program { id: program })
    }

    /// Compiles and links without ever failing.
    ///
    /// A stage that does not compile is reported through `log` and returned
    /// as a diagnostic, then attached anyway. Link status is not checked, so
    /// the resulting program may be unusable.
    pub fn build_lenient<G: Gl>(self, gl: &mut G) -> (Program, Vec<ShaderDiagnostic>) {
        let mut diagnostics = Vec::new();

        let mut compile = |gl: &mut G, stage: ShaderStage, src: &str| {
            let (id, res) = compile_stage(gl, stage, src);
            if let Err(log) = res {
                log::error!("{stage} shader compilation failed:\n{log}");
                diagnostics.push(ShaderDiagnostic { stage, log });
            }
            id
        };

        let vert = compile(gl, ShaderStage::Vertex, self.vert);
        let frag = compile(gl, ShaderStage::Fragment, self.frag);

        let program = link(gl, vert, frag);

        (Program { id: program }, diagnostics)
    }
}

fn compile_stage<G: Gl>(gl: &mut G, stage: ShaderStage, src: &str) -> (u32, Result<(), String>) {
    let shader = gl.create_shader(stage);
    gl.shader_source(shader, src);
    gl.compile_shader(shader);

    if gl.shader_compile_status(shader) {
        (shader, Ok(()))
    } else {
        (shader, Err(gl.shader_info_log(shader, INFO_LOG_LEN)))
    }
}

/// Links both stages into a new program and releases the stage objects,
/// which stay alive inside the program.
fn link(gl: &mut impl Gl, vert: u32, frag: u32) -> u32 {
    let program = gl.create_program();
    gl.attach_shader(program, vert);
    gl.attach_shader(program, frag);
    gl.link_program(program);

    gl.delete_shader(vert);
    gl.delete_shader(frag);

    program
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderDiagnostic {
    pub stage: ShaderStage,
    pub log: String,
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("{stage} shader compilation failed:\n{log}")]
    Compilation { stage: ShaderStage, log: String },
    #[error("shader program linking failed:\n{0}")]
    Linking(String),
}

/// Linked shader program. Like [`crate::geometry::Geometry`] it is never
/// released explicitly.
#[derive(Debug)]
pub struct Program {
    id: u32,
}

impl Program {
    pub fn get_id(&self) -> u32 {
        self.id
    }
}
