use thiserror::Error;

use gl_wrapper::context::{Gl, PolygonMode};
use gl_wrapper::geometry::{GBError, Geometry, GeometryBuilder, VertexAttribute};
use gl_wrapper::program::{Program, ProgramBuilder, ProgramError, ShaderDiagnostic};

use crate::scene::{SceneKind, FRAGMENT_SHADER, VERTEX_SHADER, WINDOW_HEIGHT, WINDOW_WIDTH};

#[derive(Clone, Debug)]
pub struct Options<'a> {
    pub vertex_shader: &'a str,
    pub fragment_shader: &'a str,
    /// Fail on compile and link errors instead of reporting and continuing.
    pub strict: bool,
    /// Rasterization mode of the indexed scene.
    pub quad_mode: PolygonMode,
    /// Framebuffer size the viewport starts with.
    pub framebuffer: (u32, u32),
}

impl Default for Options<'_> {
    fn default() -> Self {
        Self {
            vertex_shader: VERTEX_SHADER,
            fragment_shader: FRAGMENT_SHADER,
            strict: false,
            quad_mode: PolygonMode::Line,
            framebuffer: (WINDOW_WIDTH, WINDOW_HEIGHT),
        }
    }
}

/// Everything the frame loop draws with. Built once, read only afterwards.
#[derive(Debug)]
pub struct Bootstrap {
    pub kind: SceneKind,
    pub geometry: Geometry,
    pub program: Program,
    pub polygon_mode: PolygonMode,
    /// Compile failures that were reported but not acted upon.
    pub diagnostics: Vec<ShaderDiagnostic>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Could not upload geometry: {0}")]
    Geometry(#[from] GBError),
    #[error(transparent)]
    Program(#[from] ProgramError),
}

/// Uploads the geometry of `kind` and builds the shader program.
///
/// Leaves the scene's vertex array bound. Nothing is rolled back when a later
/// step fails.
pub fn setup(
    gl: &mut impl Gl,
    kind: SceneKind,
    options: &Options<'_>,
) -> Result<Bootstrap, BootstrapError> {
    let (width, height) = options.framebuffer;
    gl.viewport(0, 0, width as i32, height as i32);

    let mut builder =
        GeometryBuilder::new(kind.positions()).with_attribute(VertexAttribute::Vec3);
    if let Some(indices) = kind.indices() {
        builder = builder.with_indices(indices);
    }
    let geometry = builder.build(gl)?;

    log::debug!(
        "Uploaded {:?} geometry: vao {}, {} elements",
        kind,
        geometry.vao(),
        geometry.count()
    );

    let shaders = ProgramBuilder::new(options.vertex_shader, options.fragment_shader);

    let (program, diagnostics) = if options.strict {
        (shaders.build(gl)?, Vec::new())
    } else {
        shaders.build_lenient(gl)
    };

    let polygon_mode = match kind {
        SceneKind::Triangle => PolygonMode::Fill,
        SceneKind::WireframeQuad => options.quad_mode,
    };

    Ok(Bootstrap {
        kind,
        geometry,
        program,
        polygon_mode,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_wrapper::context::{BufferTarget, ShaderStage};
    use gl_wrapper::headless::{Command, HeadlessGl};

    const BROKEN_VERTEX: &str = "#version 330 core\n#error aPos is not declared\n";

    #[test]
    fn triangle_setup_uploads_nine_floats() {
        let mut gl = HeadlessGl::default();
        let boot = setup(&mut gl, SceneKind::Triangle, &Options::default()).unwrap();

        assert_eq!(boot.geometry.count(), 3);
        assert!(boot.geometry.ebo().is_none());
        assert!(boot.diagnostics.is_empty());
        assert_eq!(boot.polygon_mode, PolygonMode::Fill);

        let bytes = gl.buffer_contents(boot.geometry.vbo()).unwrap();
        let floats: Vec<f32> = bytemuck::pod_collect_to_vec(bytes);
        assert_eq!(floats, [-0.5_f32, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0]);
    }

    #[test]
    fn quad_setup_uploads_index_buffer() {
        let mut gl = HeadlessGl::default();
        let boot = setup(&mut gl, SceneKind::WireframeQuad, &Options::default()).unwrap();

        let ebo = boot.geometry.ebo().unwrap();
        assert_eq!(gl.bound_buffer(BufferTarget::ElementArray), ebo);
        let indices: Vec<u32> = bytemuck::pod_collect_to_vec(gl.buffer_contents(ebo).unwrap());
        assert_eq!(indices, [0_u32, 1, 3, 1, 2, 3]);
        assert_eq!(boot.polygon_mode, PolygonMode::Line);
    }

    #[test]
    fn initial_viewport_covers_framebuffer() {
        let mut gl = HeadlessGl::default();
        let options = Options {
            framebuffer: (1024, 768),
            ..Default::default()
        };
        setup(&mut gl, SceneKind::Triangle, &options).unwrap();

        assert_eq!(gl.commands().first(), Some(&Command::Viewport([0, 0, 1024, 768])));
    }

    #[test]
    fn shader_stages_are_released_after_linking() {
        let mut gl = HeadlessGl::default();
        let boot = setup(&mut gl, SceneKind::Triangle, &Options::default()).unwrap();

        let stages = gl.attached_shaders(boot.program.get_id()).to_vec();
        assert_eq!(stages.len(), 2);
        assert!(stages.iter().all(|&s| gl.is_shader_deleted(s)));
        assert!(gl.program_link_status(boot.program.get_id()));
    }

    #[test]
    fn broken_vertex_shader_is_reported_but_not_fatal() {
        let mut gl = HeadlessGl::default();
        let options = Options {
            vertex_shader: BROKEN_VERTEX,
            ..Default::default()
        };
        let boot = setup(&mut gl, SceneKind::Triangle, &options).unwrap();

        assert_eq!(boot.diagnostics.len(), 1);
        assert_eq!(boot.diagnostics[0].stage, ShaderStage::Vertex);
        assert!(boot.diagnostics[0].log.contains("aPos is not declared"));
    }

    #[test]
    fn strict_mode_surfaces_compile_error() {
        let mut gl = HeadlessGl::default();
        let options = Options {
            vertex_shader: BROKEN_VERTEX,
            strict: true,
            ..Default::default()
        };
        let err = setup(&mut gl, SceneKind::Triangle, &options).unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::Program(ProgramError::Compilation {
                stage: ShaderStage::Vertex,
                ..
            })
        ));
        assert!(err.to_string().contains("aPos is not declared"));
    }

    #[test]
    fn fill_override_only_applies_to_quad() {
        let options = Options {
            quad_mode: PolygonMode::Fill,
            ..Default::default()
        };

        let mut gl = HeadlessGl::default();
        let quad = setup(&mut gl, SceneKind::WireframeQuad, &options).unwrap();
        assert_eq!(quad.polygon_mode, PolygonMode::Fill);
    }
}
