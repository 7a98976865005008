use clap::{Parser, ValueEnum};

use gl_wrapper::context::PolygonMode;

use learngl::bootstrap::Options;
use learngl::scene::{SceneKind, GL_VERSION};

#[derive(Debug, Parser)]
pub struct Args {
    /// Scene to draw
    #[arg(value_enum, default_value_t = SceneArg::Triangle)]
    pub scene: SceneArg,
    /// Exit when a shader fails to compile or the program fails to link
    #[arg(long)]
    pub strict: bool,
    /// Draw the quad filled instead of as wireframe
    #[arg(long)]
    pub fill: bool,
    /// Requested OpenGL major version (core profile)
    #[arg(long, default_value_t = GL_VERSION.0)]
    pub gl_major: u8,
    /// Requested OpenGL minor version
    #[arg(long, default_value_t = GL_VERSION.1)]
    pub gl_minor: u8,
}

impl Args {
    pub fn options(&self, framebuffer: (u32, u32)) -> Options<'static> {
        Options {
            strict: self.strict,
            quad_mode: if self.fill {
                PolygonMode::Fill
            } else {
                PolygonMode::Line
            },
            framebuffer,
            ..Default::default()
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum SceneArg {
    Triangle,
    Quad,
}

impl From<SceneArg> for SceneKind {
    fn from(s: SceneArg) -> Self {
        match s {
            SceneArg::Triangle => Self::Triangle,
            SceneArg::Quad => Self::WireframeQuad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tutorial_setup() {
        let args = Args::try_parse_from(["learngl"]).unwrap();

        assert!(matches!(args.scene, SceneArg::Triangle));
        assert!(!args.strict);
        assert_eq!((args.gl_major, args.gl_minor), (3, 3));

        let options = args.options((800, 600));
        assert_eq!(options.quad_mode, PolygonMode::Line);
        assert_eq!(options.framebuffer, (800, 600));
    }

    #[test]
    fn quad_with_overrides() {
        let args = Args::try_parse_from([
            "learngl", "quad", "--strict", "--fill", "--gl-major", "4", "--gl-minor", "6",
        ])
        .unwrap();

        assert_eq!(SceneKind::from(args.scene), SceneKind::WireframeQuad);
        assert!(args.strict);
        assert_eq!((args.gl_major, args.gl_minor), (4, 6));
        assert_eq!(args.options((1, 1)).quad_mode, PolygonMode::Fill);
    }

    #[test]
    fn unknown_scene_is_rejected() {
        assert!(Args::try_parse_from(["learngl", "cube"]).is_err());
    }
}
