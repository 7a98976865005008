pub const WINDOW_TITLE: &str = "LearnOpenGL";
pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;

/// Requested context version, always with the core profile.
pub const GL_VERSION: (u8, u8) = (3, 3);

pub const CLEAR_COLOR: [f32; 4] = [0.2, 0.3, 0.3, 1.0];

pub const VERTEX_SHADER: &str = include_str!("gl_shaders/position.vert.glsl");
pub const FRAGMENT_SHADER: &str = include_str!("gl_shaders/orange.frag.glsl");

#[rustfmt::skip]
pub const TRIANGLE: [[f32; 3]; 3] = [
    [-0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
    [0.0, 0.5, 0.0],
];

#[rustfmt::skip]
pub const QUAD: [[f32; 3]; 4] = [
    [0.5, 0.5, 0.0],   // top right
    [0.5, -0.5, 0.0],  // bottom right
    [-0.5, -0.5, 0.0], // bottom left
    [-0.5, 0.5, 0.0],  // top left
];

/// Two triangles sharing the top right to bottom left edge.
pub const QUAD_INDICES: [[u32; 3]; 2] = [[0, 1, 3], [1, 2, 3]];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SceneKind {
    /// Three vertices drawn as one triangle.
    Triangle,
    /// Four vertices and six indices drawn as two triangles in wireframe.
    WireframeQuad,
}

impl SceneKind {
    pub fn positions(&self) -> &'static [f32] {
        match self {
            SceneKind::Triangle => bytemuck::cast_slice(&TRIANGLE),
            SceneKind::WireframeQuad => bytemuck::cast_slice(&QUAD),
        }
    }

    pub fn indices(&self) -> Option<&'static [u32]> {
        match self {
            SceneKind::Triangle => None,
            SceneKind::WireframeQuad => Some(bytemuck::cast_slice(&QUAD_INDICES)),
        }
    }

    /// Whether program and vertex array are bound once before the loop
    /// instead of on every frame.
    pub fn binds_once(&self) -> bool {
        matches!(self, SceneKind::WireframeQuad)
    }
}
