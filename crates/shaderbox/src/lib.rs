//! Host for a single GLSL vertex/fragment program drawn over a full-viewport
//! quad.
//!
//! The flow mirrors how a fragment-shader toy is driven:
//!
//! ```text
//!   ShaderBoxConfig ──▶ ShaderBox::new ──▶ ProgramBuilder (compile, link, quad)
//!                              │
//!   owner frame loop ──▶ resize() / set_uniform_*() / draw()
//! ```
//!
//! `ShaderBox` owns the surface, the GPU context acquired from it and every GPU
//! object it creates. GPU access goes through the [`gpu::GpuApi`] seam so the
//! same host drives desktop GL, GLES and WebGL through `glow`. On `wasm32` the
//! [`CanvasSurface`] renders into an HTML canvas.

mod builder;
mod config;
mod error;
pub mod gpu;
mod host;
mod quad;
mod surface;
mod uniforms;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(test)]
mod testing;

pub use config::{ShaderBoxConfig, TimingFn};
pub use error::{ShaderBoxError, ShaderStage};
pub use gpu::{GlowGpu, GpuApi};
pub use host::ShaderBox;
pub use quad::{QUAD_VERTEX_COUNT, QUAD_VERTICES};
pub use surface::{ContextAttributes, LogicalSize, PhysicalSize, Surface};
pub use uniforms::{UniformValue, RESOLUTION_UNIFORM};

#[cfg(target_arch = "wasm32")]
pub use web::CanvasSurface;
