pub mod bootstrap;
pub mod frame_loop;
pub mod scene;
