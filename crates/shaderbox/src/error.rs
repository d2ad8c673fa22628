use std::fmt;

/// Programmable pipeline stage a shader object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// GL enum passed to `glCreateShader`.
    pub fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Failures surfaced by [`crate::ShaderBox`].
///
/// Everything except [`ShaderBoxError::UnknownUniform`] is a construction
/// error: the attempt is abandoned and every GPU object it created has already
/// been released when the caller sees it.
#[derive(Debug, thiserror::Error)]
pub enum ShaderBoxError {
    #[error("no rendering surface supplied and none could be created: {reason}")]
    SurfaceCreation { reason: String },
    #[error("no support for a GPU context on this surface: {reason}")]
    ContextAcquisition { reason: String },
    #[error("could not create program: {reason}")]
    ProgramCreation { reason: String },
    #[error("error compiling {stage} shader: {diagnostic}")]
    ShaderCompile {
        stage: ShaderStage,
        diagnostic: String,
    },
    #[error("couldn't link program: {diagnostic}")]
    ProgramLink { diagnostic: String },
    #[error("couldn't validate program: {diagnostic}")]
    ProgramValidate { diagnostic: String },
    #[error("required GPU capability unavailable: {extension}")]
    ExtensionUnavailable { extension: String },
    #[error("unknown uniform {name}")]
    UnknownUniform { name: String },
}

impl ShaderBoxError {
    /// Returns the stage for compile errors.
    pub fn stage(&self) -> Option<ShaderStage> {
        match self {
            ShaderBoxError::ShaderCompile { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Compiler, linker or validator output carried by the error, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            ShaderBoxError::ShaderCompile { diagnostic, .. }
            | ShaderBoxError::ProgramLink { diagnostic }
            | ShaderBoxError::ProgramValidate { diagnostic } => Some(diagnostic),
            _ => None,
        }
    }
}
