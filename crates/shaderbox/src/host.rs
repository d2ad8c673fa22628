use crate::builder::{ProgramBuilder, ProgramResources};
use crate::config::{ShaderBoxConfig, TimingFn};
use crate::error::{ShaderBoxError, ShaderStage};
use crate::gpu::GpuApi;
use crate::quad::QUAD_VERTEX_COUNT;
use crate::surface::{ContextAttributes, Surface};
use crate::uniforms::{UniformRegistry, UniformValue, RESOLUTION_UNIFORM};

/// Opaque black.
const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

type Location<S> = <<S as Surface>::Gpu as GpuApi>::UniformLocation;

/// A linked vertex/fragment program drawn over a full-viewport quad.
///
/// The host owns its surface, the GPU context acquired from it, and every GPU
/// object it created. Construction either succeeds completely or releases
/// whatever it managed to create before returning the error.
pub struct ShaderBox<S: Surface> {
    surface: S,
    gpu: S::Gpu,
    resources: Option<ProgramResources<S::Gpu>>,
    uniforms: UniformRegistry<Location<S>>,
    scaling: f64,
    antialias: bool,
    timing: TimingFn,
}

impl<S: Surface> ShaderBox<S> {
    /// Compiles and links the two stages and prepares the quad.
    ///
    /// The drawing buffer is left at whatever size the surface had; call
    /// [`ShaderBox::resize`] once the surface is laid out.
    pub fn new(
        vertex_source: &str,
        fragment_source: &str,
        config: ShaderBoxConfig<S>,
    ) -> Result<Self, ShaderBoxError> {
        let ShaderBoxConfig {
            surface,
            scaling,
            timing,
            uniforms: requested,
            antialias,
        } = config;

        let mut surface = match surface {
            Some(surface) => surface,
            None => S::create_default()?,
        };
        let gpu = surface.acquire_context(ContextAttributes { antialias })?;
        let scaling = scaling.unwrap_or_else(|| surface.pixel_density());
        if !(scaling.is_finite() && scaling > 0.0) {
            tracing::warn!(scaling, "scaling is not a positive number, drawing buffer will be empty");
        }

        let (resources, uniforms) = {
            let mut builder = ProgramBuilder::new(&gpu)?;
            builder.compile(ShaderStage::Vertex, vertex_source)?;
            builder.compile(ShaderStage::Fragment, fragment_source)?;
            builder.link()?;
            builder.activate();
            let uniforms = builder.declare_uniforms(&requested);
            (builder.build_quad()?, uniforms)
        };
        gpu.set_clear_color(CLEAR_COLOR);

        tracing::info!(
            scaling,
            antialias,
            uniforms = uniforms.len(),
            "shader program ready"
        );
        Ok(Self {
            surface,
            gpu,
            resources: Some(resources),
            uniforms,
            scaling,
            antialias,
            timing,
        })
    }

    /// Matches the drawing buffer to the surface's displayed size times the
    /// scaling factor, then updates the viewport and `iResolution`.
    pub fn resize(&mut self) {
        let size = self.surface.display_size().to_physical(self.scaling);
        self.surface.set_buffer_size(size);
        if self.is_released() {
            return;
        }
        let size = self.surface.buffer_size();
        self.gpu.set_viewport(size.width, size.height);
        self.set_uniform_2f(RESOLUTION_UNIFORM, size.as_uniform());
        tracing::debug!(width = size.width, height = size.height, "resized drawing buffer");
    }

    /// Clears to opaque black and draws the quad. No-op after release.
    pub fn draw(&self) {
        if self.is_released() {
            return;
        }
        self.gpu.clear_color_and_depth();
        self.gpu.draw_triangles(0, QUAD_VERTEX_COUNT);
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains(name)
    }

    /// Declared uniform names in declaration order.
    pub fn uniforms(&self) -> impl Iterator<Item = &str> + '_ {
        self.uniforms.names()
    }

    pub fn uniform_names(&self) -> Vec<String> {
        self.uniforms().map(str::to_string).collect()
    }

    /// Last value set for `name`; `Ok(None)` when declared but never set.
    pub fn get_uniform(&self, name: &str) -> Result<Option<&UniformValue>, ShaderBoxError> {
        if !self.uniforms.contains(name) {
            return Err(ShaderBoxError::UnknownUniform {
                name: name.to_string(),
            });
        }
        Ok(self.uniforms.value(name))
    }

    pub fn set_uniform_1f(&mut self, name: &str, value: f32) {
        self.set_uniform(name, value);
    }

    pub fn set_uniform_2f(&mut self, name: &str, value: [f32; 2]) {
        self.set_uniform(name, value);
    }

    pub fn set_uniform_3f(&mut self, name: &str, value: [f32; 3]) {
        self.set_uniform(name, value);
    }

    pub fn set_uniform_4f(&mut self, name: &str, value: [f32; 4]) {
        self.set_uniform(name, value);
    }

    /// Pushes `value` to the GPU and caches it. Undeclared names are ignored.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) {
        let value = value.into();
        let Some(location) = self.uniforms.location(name) else {
            tracing::trace!(name, "ignoring write to undeclared uniform");
            return;
        };
        if let Some(location) = location {
            match value {
                UniformValue::Float(v) => self.gpu.uniform_1f(location, v),
                UniformValue::Vec2(v) => self.gpu.uniform_2f(location, v),
                UniformValue::Vec3(v) => self.gpu.uniform_3f(location, v),
                UniformValue::Vec4(v) => self.gpu.uniform_4f(location, v),
            }
        }
        self.uniforms.store(name, value);
    }

    /// Deletes the program, quad buffer and vertex array and forgets every
    /// uniform. Safe to call more than once.
    pub fn release(&mut self) {
        let Some(resources) = self.resources.take() else {
            return;
        };
        resources.release(&self.gpu);
        self.uniforms.clear();
        tracing::debug!("released shader program");
    }

    pub fn is_released(&self) -> bool {
        self.resources.is_none()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn gpu(&self) -> &S::Gpu {
        &self.gpu
    }

    pub fn scaling(&self) -> f64 {
        self.scaling
    }

    pub fn antialias(&self) -> bool {
        self.antialias
    }

    /// Applies the configured timing function to a frame timestamp.
    pub fn remap_time(&self, timestamp: f64) -> f64 {
        (self.timing)(timestamp)
    }
}

impl<S: Surface> Drop for ShaderBox<S> {
    fn drop(&mut self) {
        self.release();
    }
}
