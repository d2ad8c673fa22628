use crate::error::ShaderBoxError;
use crate::gpu::GpuApi;

/// Size as laid out on screen, in logical (CSS / density-independent) units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

impl LogicalSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Converts to drawing-buffer pixels, truncating like a canvas does when a
    /// fractional width is assigned. The product is taken in `f64` so sizes
    /// such as `90 × 1.3` land on whole pixels.
    pub fn to_physical(self, scaling: f64) -> PhysicalSize {
        PhysicalSize {
            width: scale_dimension(self.width, scaling),
            height: scale_dimension(self.height, scaling),
        }
    }
}

fn scale_dimension(value: f64, scaling: f64) -> u32 {
    let scaled = value * scaling;
    if scaled.is_finite() && scaled > 0.0 {
        scaled.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Size of the drawing buffer in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `[width, height]` as pushed into `iResolution`.
    pub fn as_uniform(self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

/// Attributes requested when a GPU context is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextAttributes {
    pub antialias: bool,
}

impl Default for ContextAttributes {
    fn default() -> Self {
        Self { antialias: true }
    }
}

/// A rendering target the host can size and draw into.
///
/// The surface reports how large it appears on screen; the host decides the
/// drawing-buffer size from that and the scaling factor. Mounting the surface
/// in a visible tree (DOM, window manager) is the owner's business.
pub trait Surface {
    type Gpu: GpuApi;

    /// Creates a surface with the platform's default size.
    fn create_default() -> Result<Self, ShaderBoxError>
    where
        Self: Sized;

    /// Acquires a GPU context bound to this surface.
    fn acquire_context(&mut self, attributes: ContextAttributes)
        -> Result<Self::Gpu, ShaderBoxError>;

    /// Current displayed size.
    fn display_size(&self) -> LogicalSize;

    /// Allocates the drawing buffer at `size`.
    fn set_buffer_size(&mut self, size: PhysicalSize);

    /// Current drawing-buffer size.
    fn buffer_size(&self) -> PhysicalSize;

    /// Device pixels per logical unit, used when no scaling is configured.
    fn pixel_density(&self) -> f64;
}
