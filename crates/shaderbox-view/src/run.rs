use anyhow::{anyhow, Context, Result};
use shaderbox::{ShaderBox, ShaderBoxConfig};
use tracing_subscriber::EnvFilter;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};

use crate::config::ViewerConfig;
use crate::shaders::{self, BUNDLED_FRAGMENT, BUNDLED_VERTEX};
use crate::timing::{self, FrameClock};
use crate::window::GlWindowSurface;

const TIME_UNIFORM: &str = "iTime";

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Opens the preview window and drives the `winit` event loop until the
/// window is closed or Escape is pressed.
pub fn run(config: ViewerConfig) -> Result<()> {
    let vertex = shaders::load(config.render.vertex.as_deref(), BUNDLED_VERTEX)?;
    let fragment = shaders::load(config.render.fragment.as_deref(), BUNDLED_FRAGMENT)?;

    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let surface = GlWindowSurface::new(
        &event_loop,
        &config.window.title,
        config.window.width,
        config.window.height,
        config.render.antialias,
    )?;
    let flavor = surface.glsl_flavor();

    let mut host_config = ShaderBoxConfig::new()
        .with_surface(surface)
        .with_uniforms(config.render.uniforms.iter().cloned())
        .with_antialias(config.render.antialias)
        .with_timing(timing::remap(config.motion.time_scale, config.motion.reduced));
    if let Some(scale) = config.render.scale {
        host_config = host_config.with_scaling(scale);
    }
    let mut host = ShaderBox::new(
        &flavor.prepare(&vertex),
        &flavor.prepare(&fragment),
        host_config,
    )
    .context("failed to build shader program")?;
    host.resize();

    tracing::info!(
        ?flavor,
        scaling = host.scaling(),
        uniforms = ?host.uniform_names(),
        reduced_motion = config.motion.reduced,
        "preview running"
    );
    let clock = FrameClock::start();
    host.surface().window().request_redraw();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event }
                    if window_id == host.surface().window().id() =>
                {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            host.release();
                            elwt.exit();
                        }
                        WindowEvent::KeyboardInput { event, .. }
                            if event.state == ElementState::Pressed
                                && event.logical_key == Key::Named(NamedKey::Escape) =>
                        {
                            host.release();
                            elwt.exit();
                        }
                        WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                            host.resize();
                        }
                        WindowEvent::RedrawRequested => {
                            let seconds = host.remap_time(clock.elapsed_ms());
                            host.set_uniform_1f(TIME_UNIFORM, seconds as f32);
                            host.draw();
                            if let Err(err) = host.surface().present() {
                                tracing::error!(error = %err, "failed to present frame");
                                host.release();
                                elwt.exit();
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    if !host.is_released() {
                        host.surface().window().request_redraw();
                    }
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}
