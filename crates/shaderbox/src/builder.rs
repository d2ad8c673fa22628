use crate::error::{ShaderBoxError, ShaderStage};
use crate::gpu::GpuApi;
use crate::quad::{POSITION_ATTRIBUTE, QUAD_COMPONENTS, QUAD_VERTICES};
use crate::uniforms::{declaration_order, UniformRegistry, RESOLUTION_UNIFORM};

/// Extension reported when vertex-array objects are missing.
pub(crate) const VERTEX_ARRAY_EXTENSION: &str = "OES_vertex_array_object";

const EMPTY_LOG: &str = "no diagnostic output";

/// GPU objects owned by a fully constructed host.
#[derive(Debug)]
pub(crate) struct ProgramResources<G: GpuApi> {
    pub program: G::Program,
    pub vertex_array: G::VertexArray,
    pub buffer: G::Buffer,
}

impl<G: GpuApi> ProgramResources<G> {
    pub fn release(self, gpu: &G) {
        gpu.bind_vertex_array(None);
        gpu.use_program(None);
        gpu.delete_buffer(self.buffer);
        gpu.delete_vertex_array(self.vertex_array);
        gpu.delete_program(self.program);
    }
}

#[derive(Debug, Clone, Copy)]
struct TrackedShader<S> {
    shader: S,
    attached: bool,
}

/// Walks a program through compile, link, validate and quad setup.
///
/// Every object is recorded the moment it exists. Dropping the builder before
/// [`ProgramBuilder::build_quad`] succeeds deletes all of them, so an aborted
/// construction leaves nothing behind on the GPU.
pub(crate) struct ProgramBuilder<'g, G: GpuApi> {
    gpu: &'g G,
    program: G::Program,
    shaders: Vec<TrackedShader<G::Shader>>,
    vertex_array: Option<G::VertexArray>,
    buffer: Option<G::Buffer>,
    active: bool,
    finished: bool,
}

impl<'g, G: GpuApi> ProgramBuilder<'g, G> {
    pub fn new(gpu: &'g G) -> Result<Self, ShaderBoxError> {
        let program = gpu
            .create_program()
            .map_err(|reason| ShaderBoxError::ProgramCreation { reason })?;
        Ok(Self {
            gpu,
            program,
            shaders: Vec::with_capacity(2),
            vertex_array: None,
            buffer: None,
            active: false,
            finished: false,
        })
    }

    pub fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<(), ShaderBoxError> {
        let shader = self
            .gpu
            .create_shader(stage)
            .map_err(|reason| ShaderBoxError::ShaderCompile {
                stage,
                diagnostic: non_empty(reason),
            })?;
        self.shaders.push(TrackedShader {
            shader,
            attached: false,
        });

        self.gpu
            .compile_shader(shader, source)
            .map_err(|log| ShaderBoxError::ShaderCompile {
                stage,
                diagnostic: non_empty(log),
            })?;

        self.gpu.attach_shader(self.program, shader);
        if let Some(tracked) = self.shaders.last_mut() {
            tracked.attached = true;
        }
        tracing::trace!(%stage, "compiled shader");
        Ok(())
    }

    /// Links and validates. The shader objects are no longer needed once the
    /// program is linked and are deleted here.
    pub fn link(&mut self) -> Result<(), ShaderBoxError> {
        self.gpu
            .link_program(self.program)
            .map_err(|log| ShaderBoxError::ProgramLink {
                diagnostic: non_empty(log),
            })?;
        self.gpu
            .validate_program(self.program)
            .map_err(|log| ShaderBoxError::ProgramValidate {
                diagnostic: non_empty(log),
            })?;
        self.release_shaders();
        Ok(())
    }

    pub fn activate(&mut self) {
        self.gpu.use_program(Some(self.program));
        self.active = true;
    }

    /// Resolves locations for the requested names plus `iResolution`.
    ///
    /// Names the linked program does not expose are skipped with a warning,
    /// except `iResolution`, which stays declared so the host can always track
    /// it.
    pub fn declare_uniforms(&self, requested: &[String]) -> UniformRegistry<G::UniformLocation> {
        let mut registry = UniformRegistry::new();
        for name in declaration_order(requested) {
            match self.gpu.uniform_location(self.program, name) {
                Some(location) => registry.declare(name, Some(location)),
                None if name == RESOLUTION_UNIFORM => {
                    tracing::debug!(name, "program does not use the resolution uniform");
                    registry.declare(name, None);
                }
                None => tracing::warn!(name, "uniform not found in program, ignoring"),
            }
        }
        registry
    }

    /// Uploads the full-viewport quad and hands the finished objects over.
    pub fn build_quad(mut self) -> Result<ProgramResources<G>, ShaderBoxError> {
        if !self.gpu.supports_vertex_arrays() {
            return Err(ShaderBoxError::ExtensionUnavailable {
                extension: VERTEX_ARRAY_EXTENSION.to_string(),
            });
        }
        let vertex_array = self.gpu.create_vertex_array().map_err(|reason| {
            tracing::debug!(%reason, "vertex array creation failed");
            ShaderBoxError::ExtensionUnavailable {
                extension: VERTEX_ARRAY_EXTENSION.to_string(),
            }
        })?;
        self.vertex_array = Some(vertex_array);
        self.gpu.bind_vertex_array(Some(vertex_array));

        let buffer = self
            .gpu
            .create_buffer()
            .map_err(|reason| ShaderBoxError::ProgramCreation { reason })?;
        self.buffer = Some(buffer);
        self.gpu.upload_static_vertices(buffer, &QUAD_VERTICES);
        self.gpu
            .enable_float_attribute(POSITION_ATTRIBUTE, QUAD_COMPONENTS);

        self.finished = true;
        Ok(ProgramResources {
            program: self.program,
            vertex_array,
            buffer,
        })
    }

    fn release_shaders(&mut self) {
        for tracked in self.shaders.drain(..) {
            if tracked.attached {
                self.gpu.detach_shader(self.program, tracked.shader);
            }
            self.gpu.delete_shader(tracked.shader);
        }
    }
}

impl<G: GpuApi> Drop for ProgramBuilder<'_, G> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if self.vertex_array.is_some() {
            self.gpu.bind_vertex_array(None);
        }
        if let Some(buffer) = self.buffer.take() {
            self.gpu.delete_buffer(buffer);
        }
        if let Some(vertex_array) = self.vertex_array.take() {
            self.gpu.delete_vertex_array(vertex_array);
        }
        self.release_shaders();
        if self.active {
            self.gpu.use_program(None);
        }
        self.gpu.delete_program(self.program);
        tracing::debug!("discarded partially built program");
    }
}

fn non_empty(log: String) -> String {
    let trimmed = log.trim();
    if trimmed.is_empty() {
        EMPTY_LOG.to_string()
    } else {
        trimmed.to_string()
    }
}
