//! GPU seam used by the program host.
//!
//! `GpuApi` narrows OpenGL/WebGL down to the calls a single full-viewport
//! program needs. Every acquisition returns a `Result` so the builder can tell
//! exactly which step failed; the `delete_*` calls are infallible because GL
//! silently ignores deleting objects that are already gone.
//!
//! - `glow_backend` provides [`GlowGpu`], the implementation used on desktop
//!   GL, GLES and WebGL.

mod glow_backend;

pub use glow_backend::GlowGpu;

use std::fmt::Debug;

use crate::error::ShaderStage;

/// Operations the host issues against a current GPU context.
///
/// Implementations assume the context stays current on the calling thread for
/// as long as the value lives.
pub trait GpuApi {
    type Program: Copy + Debug;
    type Shader: Copy + Debug;
    type Buffer: Copy + Debug;
    type VertexArray: Copy + Debug;
    type UniformLocation: Clone + Debug;

    fn create_program(&self) -> Result<Self::Program, String>;
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Uploads `source` and compiles it. `Err` carries the compiler info log.
    fn compile_shader(&self, shader: Self::Shader, source: &str) -> Result<(), String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// `Err` carries the linker info log.
    fn link_program(&self, program: Self::Program) -> Result<(), String>;
    /// `Err` carries the validator info log.
    fn validate_program(&self, program: Self::Program) -> Result<(), String>;
    fn use_program(&self, program: Option<Self::Program>);
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    fn supports_vertex_arrays(&self) -> bool;
    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    /// Binds `buffer` to `ARRAY_BUFFER` and fills it with `data` as `STATIC_DRAW`.
    fn upload_static_vertices(&self, buffer: Self::Buffer, data: &[f32]);
    /// Points attribute `slot` at the bound array buffer as tightly packed
    /// `f32` tuples of `components` and enables it.
    fn enable_float_attribute(&self, slot: u32, components: i32);

    fn set_clear_color(&self, rgba: [f32; 4]);
    fn set_viewport(&self, width: u32, height: u32);
    fn clear_color_and_depth(&self);
    fn draw_triangles(&self, first: i32, count: i32);

    fn uniform_1f(&self, location: &Self::UniformLocation, value: f32);
    fn uniform_2f(&self, location: &Self::UniformLocation, value: [f32; 2]);
    fn uniform_3f(&self, location: &Self::UniformLocation, value: [f32; 3]);
    fn uniform_4f(&self, location: &Self::UniformLocation, value: [f32; 4]);

    fn delete_shader(&self, shader: Self::Shader);
    fn delete_program(&self, program: Self::Program);
    fn delete_buffer(&self, buffer: Self::Buffer);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
}
