use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};

use glutin_winit::DisplayBuilder;

use raw_window_handle::HasRawWindowHandle;

use std::ffi::CString;
use std::num::NonZeroU32;

use thiserror::Error;

use winit::dpi::{PhysicalSize, Size};
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

use gl_wrapper::native::{self, NativeGl};

use learngl::bootstrap::{self, BootstrapError};
use learngl::frame_loop::{FrameLoop, Key, LoopEvent};
use learngl::scene::{SceneKind, WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH};

use crate::args::Args;

pub struct App {
    event_loop: EventLoop<()>,
    gl_context: PossiblyCurrentContext,
    gl_window: GlWindow,
    gl: NativeGl,
    frame_loop: FrameLoop,
}

impl App {
    pub fn new(args: &Args) -> Result<Self, AppError> {
        let event_loop = EventLoop::new();
        let window_builder = WindowBuilder::new()
            .with_inner_size(Size::Physical(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT)))
            .with_title(WINDOW_TITLE);
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let template = ConfigTemplateBuilder::new();

        let (window, gl_config) = display_builder
            .build(&event_loop, template, |configs| {
                // glutin's find_configs fails with BadConfig when nothing
                // matches, so the picker never sees an empty iterator.
                most_samples(configs, |c| c.num_samples())
                    .expect("find_configs yielded an empty config set")
            })
            .map_err(|e| AppError::WindowCreation(e.to_string()))?;

        let window = window
            .ok_or_else(|| AppError::WindowCreation("no window was created".to_owned()))?;

        let gl_display = gl_config.display();

        let context_attr = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(
                args.gl_major,
                args.gl_minor,
            ))))
            .with_profile(GlProfile::Core)
            .build(Some(window.raw_window_handle()));

        let gl_window = GlWindow::new(window, &gl_config)?;

        let gl_context = unsafe { gl_display.create_context(&gl_config, &context_attr) }
            .map_err(|e| {
                AppError::WindowCreation(format!(
                    "OpenGL {}.{} core context: {e}",
                    args.gl_major, args.gl_minor
                ))
            })?
            .make_current(&gl_window.surface)
            .map_err(|e| AppError::WindowCreation(e.to_string()))?;

        native::load_with(|s| match CString::new(s) {
            Ok(symbol) => gl_display.get_proc_address(symbol.as_c_str()).cast(),
            Err(_) => std::ptr::null(),
        });

        let mut gl = NativeGl::new().ok_or(AppError::GlLoad)?;

        let framebuffer: (u32, u32) = gl_window.window.inner_size().into();
        let kind = SceneKind::from(args.scene);
        let scene = bootstrap::setup(&mut gl, kind, &args.options(framebuffer))?;

        Ok(Self {
            event_loop,
            gl_context,
            gl_window,
            gl,
            frame_loop: FrameLoop::new(scene),
        })
    }

    pub fn run(self) -> ! {
        let Self {
            event_loop,
            gl_context,
            gl_window,
            mut gl,
            mut frame_loop,
        } = self;

        frame_loop.start(&mut gl);

        event_loop.run(move |event, _window_target, control_flow| {
            control_flow.set_poll();

            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::Resized(size) => {
                        if let (Some(w), Some(h)) =
                            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                        {
                            gl_window.surface.resize(&gl_context, w, h);
                        }
                        frame_loop.handle_event(
                            &mut gl,
                            LoopEvent::Resized {
                                width: size.width,
                                height: size.height,
                            },
                        );
                    }
                    WindowEvent::CloseRequested => {
                        frame_loop.handle_event(&mut gl, LoopEvent::CloseRequested);
                    }
                    WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                virtual_keycode: Some(VirtualKeyCode::Escape),
                                state,
                                ..
                            },
                        ..
                    } => {
                        let event = match state {
                            ElementState::Pressed => LoopEvent::KeyPressed(Key::Escape),
                            ElementState::Released => LoopEvent::KeyReleased(Key::Escape),
                        };
                        frame_loop.handle_event(&mut gl, event);
                    }
                    _ => (),
                },
                Event::MainEventsCleared => {
                    if !frame_loop.iterate(&mut gl) {
                        control_flow.set_exit();
                        return;
                    }

                    if let Err(e) = gl_window.surface.swap_buffers(&gl_context) {
                        log::error!("Could not present frame: {e}");
                    }
                }
                Event::LoopDestroyed => {
                    log::info!("Rendered {} frames", frame_loop.frames());
                }
                _ => (),
            }
        })
    }
}

/// Picks the item with the highest sample count, the first one on ties.
fn most_samples<T>(items: impl Iterator<Item = T>, samples: impl Fn(&T) -> u8) -> Option<T> {
    items.reduce(|best, item| {
        if samples(&item) > samples(&best) {
            item
        } else {
            best
        }
    })
}

pub struct GlWindow {
    // XXX the surface must be dropped before the window.
    pub surface: Surface<WindowSurface>,
    pub window: Window,
}

impl GlWindow {
    pub fn new(window: Window, config: &Config) -> Result<Self, AppError> {
        let (width, height): (u32, u32) = window.inner_size().into();
        let size = NonZeroU32::new(width).zip(NonZeroU32::new(height));
        let (width, height) = size.ok_or_else(|| {
            AppError::WindowCreation(format!("window has no area ({width}x{height})"))
        })?;

        let raw_window_handle = window.raw_window_handle();
        let attrs =
            SurfaceAttributesBuilder::<WindowSurface>::new().build(raw_window_handle, width, height);

        let surface = unsafe { config.display().create_window_surface(config, &attrs) }
            .map_err(|e| AppError::WindowCreation(e.to_string()))?;

        Ok(Self { window, surface })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to create window: {0}")]
    WindowCreation(String),
    #[error("Failed to load the OpenGL function table")]
    GlLoad,
    #[error(transparent)]
    Setup(#[from] BootstrapError),
}

impl AppError {
    /// Process status reported for the error. Every startup failure is fatal.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::WindowCreation(_) | AppError::GlLoad | AppError::Setup(_) => -1,
        }
    }
}
