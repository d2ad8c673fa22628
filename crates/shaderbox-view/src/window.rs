//! Native window surface: a winit window with a glutin GL context.
//!
//! The context is created (not current) alongside the window so the GLSL
//! dialect is known before any shader is compiled; [`Surface::acquire_context`]
//! then creates the window surface, makes the context current and hands a
//! `glow` context to the host.

use std::num::NonZeroU32;

use anyhow::{anyhow, Context as _, Result};
use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::display::{Display, DisplayApiPreference, GetGlDisplay};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentContext, PossiblyCurrentContext,
    Version,
};
use glutin::prelude::*;
use glutin::surface::{Surface as GlutinSurface, SwapInterval, WindowSurface};
use glutin_winit::GlWindow;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle, RawWindowHandle};
use shaderbox::{ContextAttributes, GlowGpu, LogicalSize, PhysicalSize, ShaderBoxError, Surface};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

use crate::shaders::GlslFlavor;

/// Fields drop in order: the GL surface and context go before the window.
pub struct GlWindowSurface {
    current: Option<(GlutinSurface<WindowSurface>, PossiblyCurrentContext)>,
    pending: Option<NotCurrentContext>,
    window: Window,
    gl_config: Config,
    flavor: GlslFlavor,
    antialias: bool,
    buffer: PhysicalSize,
}

impl GlWindowSurface {
    /// Opens the window and creates its GL context.
    ///
    /// OpenGL 3.3 core is preferred; GLES 3.0 is the fallback. With
    /// `antialias` the config with the most samples is picked, otherwise the
    /// one with the fewest.
    pub fn new(
        event_loop: &EventLoop<()>,
        title: &str,
        width: u32,
        height: u32,
        antialias: bool,
    ) -> Result<Self> {
        let window_builder = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));
        let (window, gl_config) = open_window(event_loop, window_builder, antialias)?;
        tracing::debug!(
            samples = gl_config.num_samples(),
            antialias,
            "selected GL config"
        );

        let raw_handle = Some(window.raw_window_handle());
        let display = gl_config.display();
        let desktop = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(raw_handle);
        let embedded = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(Some(Version::new(3, 0))))
            .build(raw_handle);

        // SAFETY: the raw window handle belongs to `window`, which outlives the
        // context because both are owned by the returned surface.
        let (pending, flavor) = match unsafe { display.create_context(&gl_config, &desktop) } {
            Ok(context) => (context, GlslFlavor::Desktop),
            Err(desktop_err) => {
                tracing::info!(error = %desktop_err, "OpenGL 3.3 core unavailable, trying GLES 3.0");
                let context = unsafe { display.create_context(&gl_config, &embedded) }
                    .context("failed to create an OpenGL 3.3 or GLES 3.0 context")?;
                (context, GlslFlavor::Embedded)
            }
        };

        Ok(Self {
            window,
            gl_config,
            pending: Some(pending),
            current: None,
            flavor,
            antialias,
            buffer: PhysicalSize::default(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn glsl_flavor(&self) -> GlslFlavor {
        self.flavor
    }

    /// Swaps the back buffer onto the window.
    pub fn present(&self) -> Result<()> {
        let (surface, context) = self
            .current
            .as_ref()
            .context("GL context has not been acquired")?;
        surface
            .swap_buffers(context)
            .context("failed to swap buffers")
    }
}

fn config_template() -> ConfigTemplateBuilder {
    ConfigTemplateBuilder::new().with_alpha_size(8)
}

#[cfg(not(windows))]
fn open_window(
    event_loop: &EventLoop<()>,
    builder: WindowBuilder,
    antialias: bool,
) -> Result<(Window, Config)> {
    let display = open_display(event_loop, None)?;
    let gl_config = pick_config(&display, config_template(), antialias)?;
    let window = glutin_winit::finalize_window(event_loop, builder, &gl_config)
        .context("failed to create window")?;
    Ok((window, gl_config))
}

/// WGL only offers modern configs for a window that already exists.
#[cfg(windows)]
fn open_window(
    event_loop: &EventLoop<()>,
    builder: WindowBuilder,
    antialias: bool,
) -> Result<(Window, Config)> {
    let window = builder
        .build(event_loop)
        .context("failed to create window")?;
    let handle = window.raw_window_handle();
    let display = open_display(event_loop, Some(handle))?;
    let template = config_template().compatible_with_native_window(handle);
    let gl_config = pick_config(&display, template, antialias)?;
    Ok((window, gl_config))
}

#[cfg_attr(not(windows), allow(unused_variables))]
fn open_display(event_loop: &EventLoop<()>, window: Option<RawWindowHandle>) -> Result<Display> {
    #[cfg(windows)]
    let preference = DisplayApiPreference::WglThenEgl(window);
    #[cfg(target_os = "macos")]
    let preference = DisplayApiPreference::Cgl;
    #[cfg(target_os = "android")]
    let preference = DisplayApiPreference::Egl;
    #[cfg(all(unix, not(any(target_os = "macos", target_os = "ios", target_os = "android"))))]
    let preference = DisplayApiPreference::EglThenGlx(Box::new(
        winit::platform::x11::register_xlib_error_hook,
    ));

    // SAFETY: the display handle comes from the live event loop that also
    // owns every window created on it.
    unsafe { Display::new(event_loop.raw_display_handle(), preference) }
        .map_err(|err| anyhow!("failed to create GL display: {err}"))
}

/// With `antialias` the config with the most samples wins, otherwise the one
/// with the fewest. An empty config list is an error.
fn pick_config(display: &Display, template: ConfigTemplateBuilder, antialias: bool) -> Result<Config> {
    // SAFETY: the template carries no native window on most platforms; on
    // WGL it names the window passed to `open_display`, which is still alive.
    let configs = unsafe { display.find_configs(template.build()) }
        .map_err(|err| anyhow!("failed to query GL configs: {err}"))?;
    configs
        .reduce(|best, config| {
            if prefers_samples(config.num_samples(), best.num_samples(), antialias) {
                config
            } else {
                best
            }
        })
        .context("display offered no GL configs")
}

fn prefers_samples(candidate: u8, best: u8, antialias: bool) -> bool {
    if antialias {
        candidate > best
    } else {
        candidate < best
    }
}

impl Surface for GlWindowSurface {
    type Gpu = GlowGpu;

    fn create_default() -> Result<Self, ShaderBoxError> {
        Err(ShaderBoxError::SurfaceCreation {
            reason: "a native window needs an event loop; construct GlWindowSurface explicitly"
                .to_string(),
        })
    }

    fn acquire_context(&mut self, attributes: ContextAttributes) -> Result<GlowGpu, ShaderBoxError> {
        if attributes.antialias != self.antialias {
            tracing::warn!(
                requested = attributes.antialias,
                configured = self.antialias,
                "antialias is fixed when the window is created; keeping the window's setting"
            );
        }
        let pending = self
            .pending
            .take()
            .ok_or_else(|| ShaderBoxError::ContextAcquisition {
                reason: "GL context already acquired".to_string(),
            })?;

        let surface_attributes = self.window.build_surface_attributes(Default::default());
        let display = self.gl_config.display();
        // SAFETY: the surface is created for the window this value owns.
        let surface = unsafe { display.create_window_surface(&self.gl_config, &surface_attributes) }
            .map_err(|err| ShaderBoxError::ContextAcquisition {
                reason: err.to_string(),
            })?;
        let context = pending
            .make_current(&surface)
            .map_err(|err| ShaderBoxError::ContextAcquisition {
                reason: err.to_string(),
            })?;
        if let Err(err) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
            tracing::debug!(error = %err, "vsync unavailable");
        }

        // SAFETY: the context was just made current on this thread and stays
        // current for as long as the surface lives.
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| display.get_proc_address(symbol))
        };
        self.current = Some((surface, context));
        Ok(GlowGpu::new(gl))
    }

    fn display_size(&self) -> LogicalSize {
        let size = self
            .window
            .inner_size()
            .to_logical::<f64>(self.window.scale_factor());
        LogicalSize::new(size.width, size.height)
    }

    fn set_buffer_size(&mut self, size: PhysicalSize) {
        self.buffer = size;
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return;
        };
        if let Some((surface, context)) = &self.current {
            surface.resize(context, width, height);
        }
    }

    fn buffer_size(&self) -> PhysicalSize {
        self.buffer
    }

    fn pixel_density(&self) -> f64 {
        self.window.scale_factor()
    }
}
