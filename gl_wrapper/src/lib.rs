pub mod context;
pub mod geometry;
pub mod headless;
pub mod native;
pub mod program;
pub mod renderer;

pub use context::Gl;
