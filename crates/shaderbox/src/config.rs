use std::fmt;

/// Remaps a frame timestamp before the owner feeds it to a uniform.
///
/// The host never calls it; it is carried so the frame loop and the host agree
/// on one timing policy.
pub type TimingFn = Box<dyn Fn(f64) -> f64>;

/// Construction options for [`crate::ShaderBox`].
pub struct ShaderBoxConfig<S> {
    /// Surface to render into; `None` asks the surface type for a default one.
    pub surface: Option<S>,
    /// Drawing-buffer pixels per displayed unit; `None` uses the surface's
    /// native pixel density.
    pub scaling: Option<f64>,
    pub timing: TimingFn,
    /// Uniform names to declare, in order. `iResolution` is added when absent.
    pub uniforms: Vec<String>,
    pub antialias: bool,
}

impl<S> ShaderBoxConfig<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surface(mut self, surface: S) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn with_scaling(mut self, scaling: f64) -> Self {
        self.scaling = Some(scaling);
        self
    }

    pub fn with_timing(mut self, timing: impl Fn(f64) -> f64 + 'static) -> Self {
        self.timing = Box::new(timing);
        self
    }

    pub fn with_uniforms<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.uniforms = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_antialias(mut self, antialias: bool) -> Self {
        self.antialias = antialias;
        self
    }
}

impl<S> Default for ShaderBoxConfig<S> {
    /// Antialiased, native pixel density, identity timing, no extra uniforms.
    fn default() -> Self {
        Self {
            surface: None,
            scaling: None,
            timing: Box::new(|ts: f64| ts),
            uniforms: Vec::new(),
            antialias: true,
        }
    }
}

impl<S> fmt::Debug for ShaderBoxConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderBoxConfig")
            .field("surface", &self.surface.as_ref().map(|_| ".."))
            .field("scaling", &self.scaling)
            .field("uniforms", &self.uniforms)
            .field("antialias", &self.antialias)
            .finish_non_exhaustive()
    }
}
