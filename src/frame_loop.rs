use gl_wrapper::context::Gl;
use gl_wrapper::renderer::GlRenderer;

use crate::bootstrap::Bootstrap;
use crate::scene::{SceneKind, CLEAR_COLOR};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Initializing,
    Running,
    /// Terminal.
    CloseRequested,
}

/// The only key the loop reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
}

/// Window system notifications, already stripped of backend types.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopEvent {
    /// New framebuffer size in physical pixels.
    Resized { width: u32, height: u32 },
    CloseRequested,
    KeyPressed(Key),
    KeyReleased(Key),
}

pub struct FrameLoop {
    state: LoopState,
    scene: Bootstrap,
    renderer: GlRenderer,
    escape_held: bool,
    frames: u64,
}

impl FrameLoop {
    pub fn new(scene: Bootstrap) -> Self {
        Self {
            state: LoopState::Initializing,
            scene,
            renderer: GlRenderer::new(),
            escape_held: false,
            frames: 0,
        }
    }

    /// Finishes setup and enters `Running`. Scenes whose bindings never change
    /// bind program and vertex array here, once.
    pub fn start(&mut self, gl: &mut impl Gl) {
        if self.state != LoopState::Initializing {
            return;
        }

        if self.scene.kind.binds_once() {
            self.renderer
                .bind(gl, &self.scene.geometry, &self.scene.program);
        }

        self.state = LoopState::Running;
        log::info!("Entering frame loop ({:?})", self.scene.kind);
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn should_close(&self) -> bool {
        self.state == LoopState::CloseRequested
    }

    /// Number of frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scene(&self) -> &Bootstrap {
        &self.scene
    }

    pub fn handle_event(&mut self, gl: &mut impl Gl, event: LoopEvent) {
        match event {
            LoopEvent::Resized { width, height } => {
                // Minimized windows report a zero sized framebuffer.
                if width != 0 && height != 0 {
                    log::debug!("Framebuffer resized to {width}x{height}");
                    self.renderer.resize(gl, width, height);
                }
            }
            LoopEvent::CloseRequested => self.request_close("window close requested"),
            LoopEvent::KeyPressed(Key::Escape) => self.escape_held = true,
            LoopEvent::KeyReleased(Key::Escape) => self.escape_held = false,
        }
    }

    /// Checks held keys. Holding escape is enough, no fresh press is needed.
    pub fn process_input(&mut self) {
        if self.escape_held {
            self.request_close("escape pressed");
        }
    }

    /// Clears and draws one frame. Presenting is left to the caller.
    pub fn render(&mut self, gl: &mut impl Gl) {
        self.renderer.clear_color(gl, CLEAR_COLOR);

        match self.scene.kind {
            SceneKind::Triangle => {
                self.renderer
                    .draw(gl, &self.scene.geometry, &self.scene.program);
            }
            SceneKind::WireframeQuad => {
                self.renderer.polygon_mode(gl, self.scene.polygon_mode);
                self.renderer.draw_bound(gl, &self.scene.geometry);
            }
        }

        self.frames += 1;
    }

    /// One loop iteration up to, but not including, the buffer swap.
    ///
    /// Returns `false` without doing anything once close was requested
    /// before the iteration started.
    pub fn iterate(&mut self, gl: &mut impl Gl) -> bool {
        match self.state {
            LoopState::Initializing => self.start(gl),
            LoopState::CloseRequested => return false,
            LoopState::Running => {}
        }

        self.process_input();
        self.render(gl);

        true
    }

    fn request_close(&mut self, reason: &str) {
        if self.state != LoopState::CloseRequested {
            log::info!("Closing after {} frames: {reason}", self.frames);
            self.state = LoopState::CloseRequested;
        }
    }
}
