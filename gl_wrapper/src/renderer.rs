use crate::context::{Gl, PolygonMode, Primitive};
use crate::geometry::Geometry;
use crate::program::Program;

pub struct GlRenderer {
    current_program: u32,
}

impl Default for GlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GlRenderer {
    pub fn new() -> Self {
        Self { current_program: 0 }
    }

    /// Binds `program` and `geometry`, then draws it.
    pub fn draw(&mut self, gl: &mut impl Gl, geometry: &Geometry, program: &Program) {
        self.bind(gl, geometry, program);
        self.draw_bound(gl, geometry);
    }

    /// Makes `program` current and binds the vertex array of `geometry`
    /// without drawing.
    pub fn bind(&mut self, gl: &mut impl Gl, geometry: &Geometry, program: &Program) {
        let p_id = program.get_id();
        if self.current_program != p_id {
            gl.use_program(p_id);
            self.current_program = p_id;
        }

        gl.bind_vertex_array(geometry.vao());
    }

    /// Draws `geometry` assuming its vertex array and a program are already bound.
    pub fn draw_bound(&self, gl: &mut impl Gl, geometry: &Geometry) {
        let count = geometry.count() as i32;

        if geometry.is_indexed() {
            gl.draw_elements(Primitive::Triangles, count);
        } else {
            gl.draw_arrays(Primitive::Triangles, 0, count);
        }
    }

    pub fn polygon_mode(&self, gl: &mut impl Gl, mode: PolygonMode) {
        gl.polygon_mode(mode);
    }

    pub fn resize(&self, gl: &mut impl Gl, width: u32, height: u32) {
        gl.viewport(0, 0, width as i32, height as i32);
    }

    pub fn clear_color(&self, gl: &mut impl Gl, [r, g, b, a]: [f32; 4]) {
        gl.clear_color(r, g, b, a);
        gl.clear_color_buffer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeometryBuilder, VertexAttribute};
    use crate::headless::{Command, DrawKind, HeadlessGl};
    use crate::program::ProgramBuilder;

    const VERT: &str = "void main() {}";
    const FRAG: &str = "void main() {}";

    #[test]
    fn draw_picks_indexed_path_for_indexed_geometry() {
        let mut gl = HeadlessGl::default();
        let vertices = [0.0_f32; 12];
        let geometry = GeometryBuilder::new(&vertices)
            .with_attribute(VertexAttribute::Vec3)
            .with_indices(&[0, 1, 2, 2, 3, 0])
            .build(&mut gl)
            .unwrap();
        let program = ProgramBuilder::new(VERT, FRAG).build(&mut gl).unwrap();

        let mut renderer = GlRenderer::new();
        renderer.draw(&mut gl, &geometry, &program);

        let draw = gl.draw_calls().next().unwrap();
        assert_eq!(
            draw.kind,
            DrawKind::Elements {
                indices: vec![0, 1, 2, 2, 3, 0]
            }
        );
        assert_eq!(draw.program, program.get_id());
    }

    #[test]
    fn clear_then_resize_are_recorded_in_order() {
        let mut gl = HeadlessGl::default();
        let renderer = GlRenderer::new();

        renderer.clear_color(&mut gl, [0.2, 0.3, 0.3, 1.0]);
        renderer.resize(&mut gl, 400, 300);

        assert_eq!(
            gl.commands(),
            &[
                Command::Clear {
                    color: [0.2, 0.3, 0.3, 1.0]
                },
                Command::Viewport([0, 0, 400, 300]),
            ]
        );
    }
}
