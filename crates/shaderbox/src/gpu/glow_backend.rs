//! The `glow` backend. Host behaviour is tested against the recording GPU in
//! `testing`; this file is only exercised end to end with a real context
//! (the desktop viewer or a browser canvas).

use std::collections::HashSet;

use glow::HasContext;

use crate::error::ShaderStage;

use super::GpuApi;

/// Extension strings that expose vertex-array objects on pre-3.0 contexts.
/// WebGL reports names without the `GL_` prefix.
const VERTEX_ARRAY_EXTENSIONS: [&str; 4] = [
    "OES_vertex_array_object",
    "GL_OES_vertex_array_object",
    "GL_ARB_vertex_array_object",
    "GL_APPLE_vertex_array_object",
];

/// [`GpuApi`] over a `glow` context.
///
/// All glow calls are `unsafe` because they issue raw GL commands; the
/// constructor's contract (context current on this thread for the lifetime of
/// the value) is what makes each call below sound.
pub struct GlowGpu {
    gl: glow::Context,
    vertex_arrays: bool,
}

impl GlowGpu {
    /// Wraps a context that is current on the calling thread and stays current
    /// while this value is alive.
    pub fn new(gl: glow::Context) -> Self {
        let vertex_arrays = context_supports_vertex_arrays(&gl);
        let version = gl.version();
        tracing::debug!(
            major = version.major,
            minor = version.minor,
            embedded = version.is_embedded,
            vendor = %version.vendor_info,
            vertex_arrays,
            "wrapped GL context"
        );
        Self { gl, vertex_arrays }
    }

    /// Raw context for callers that need calls outside the host's surface.
    pub fn context(&self) -> &glow::Context {
        &self.gl
    }
}

fn context_supports_vertex_arrays(gl: &glow::Context) -> bool {
    vertex_arrays_available(gl.version().major, gl.supported_extensions())
}

fn vertex_arrays_available(major_version: u32, extensions: &HashSet<String>) -> bool {
    major_version >= 3
        || VERTEX_ARRAY_EXTENSIONS
            .iter()
            .any(|name| extensions.contains(*name))
}

impl GpuApi for GlowGpu {
    type Program = glow::Program;
    type Shader = glow::Shader;
    type Buffer = glow::Buffer;
    type VertexArray = glow::VertexArray;
    type UniformLocation = glow::UniformLocation;

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { self.gl.create_shader(stage.gl_enum()) }
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) -> Result<(), String> {
        unsafe {
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if self.gl.get_shader_compile_status(shader) {
                Ok(())
            } else {
                Err(self.gl.get_shader_info_log(shader))
            }
        }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.detach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) -> Result<(), String> {
        unsafe {
            self.gl.link_program(program);
            if self.gl.get_program_link_status(program) {
                Ok(())
            } else {
                Err(self.gl.get_program_info_log(program))
            }
        }
    }

    fn validate_program(&self, program: Self::Program) -> Result<(), String> {
        unsafe {
            self.gl.validate_program(program);
            if self.gl.get_program_validate_status(program) {
                Ok(())
            } else {
                Err(self.gl.get_program_info_log(program))
            }
        }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn supports_vertex_arrays(&self) -> bool {
        self.vertex_arrays
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        if !self.vertex_arrays {
            return Err("vertex array objects are not supported".to_string());
        }
        unsafe { self.gl.create_vertex_array() }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.gl.bind_vertex_array(vertex_array) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { self.gl.create_buffer() }
    }

    fn upload_static_vertices(&self, buffer: Self::Buffer, data: &[f32]) {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(data),
                glow::STATIC_DRAW,
            );
        }
    }

    fn enable_float_attribute(&self, slot: u32, components: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(slot, components, glow::FLOAT, false, 0, 0);
            self.gl.enable_vertex_attrib_array(slot);
        }
    }

    fn set_clear_color(&self, rgba: [f32; 4]) {
        unsafe { self.gl.clear_color(rgba[0], rgba[1], rgba[2], rgba[3]) }
    }

    fn set_viewport(&self, width: u32, height: u32) {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        unsafe { self.gl.viewport(0, 0, width, height) }
    }

    fn clear_color_and_depth(&self) {
        unsafe {
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT)
        }
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(glow::TRIANGLES, first, count) }
    }

    fn uniform_1f(&self, location: &Self::UniformLocation, value: f32) {
        unsafe { self.gl.uniform_1_f32(Some(location), value) }
    }

    fn uniform_2f(&self, location: &Self::UniformLocation, value: [f32; 2]) {
        unsafe { self.gl.uniform_2_f32_slice(Some(location), &value) }
    }

    fn uniform_3f(&self, location: &Self::UniformLocation, value: [f32; 3]) {
        unsafe { self.gl.uniform_3_f32_slice(Some(location), &value) }
    }

    fn uniform_4f(&self, location: &Self::UniformLocation, value: [f32; 4]) {
        unsafe { self.gl.uniform_4_f32_slice(Some(location), &value) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.gl.delete_vertex_array(vertex_array) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extensions(names: &[&str]) -> HashSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn version_three_always_has_vertex_arrays() {
        assert!(vertex_arrays_available(3, &HashSet::new()));
        assert!(vertex_arrays_available(4, &HashSet::new()));
    }

    #[test]
    fn older_contexts_need_an_extension() {
        assert!(!vertex_arrays_available(2, &HashSet::new()));
        assert!(!vertex_arrays_available(
            2,
            &extensions(&["GL_EXT_texture_filter_anisotropic"])
        ));
        assert!(vertex_arrays_available(2, &extensions(&["OES_vertex_array_object"])));
        assert!(vertex_arrays_available(
            2,
            &extensions(&["GL_ARB_vertex_array_object"])
        ));
    }
}
