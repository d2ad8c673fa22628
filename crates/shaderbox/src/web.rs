//! Browser canvas surface backed by WebGL 1.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, WebGlRenderingContext};

use crate::error::ShaderBoxError;
use crate::gpu::GlowGpu;
use crate::surface::{ContextAttributes, LogicalSize, PhysicalSize, Surface};

/// An `HtmlCanvasElement` the host sizes and draws into.
///
/// A canvas created by [`Surface::create_default`] is detached; the owner must
/// insert [`CanvasSurface::canvas`] into the document before it is visible.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

fn js_reason(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

impl Surface for CanvasSurface {
    type Gpu = GlowGpu;

    fn create_default() -> Result<Self, ShaderBoxError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| ShaderBoxError::SurfaceCreation {
                reason: "no document available".to_string(),
            })?;
        let canvas = document
            .create_element("canvas")
            .map_err(|err| ShaderBoxError::SurfaceCreation {
                reason: js_reason(err),
            })?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ShaderBoxError::SurfaceCreation {
                reason: "created element is not a canvas".to_string(),
            })?;
        Ok(Self::new(canvas))
    }

    fn acquire_context(&mut self, attributes: ContextAttributes) -> Result<GlowGpu, ShaderBoxError> {
        let options = js_sys::Object::new();
        js_sys::Reflect::set(
            &options,
            &JsValue::from_str("antialias"),
            &JsValue::from_bool(attributes.antialias),
        )
        .map_err(|err| ShaderBoxError::ContextAcquisition {
            reason: js_reason(err),
        })?;

        let context = self
            .canvas
            .get_context_with_context_options("webgl", &options)
            .map_err(|err| ShaderBoxError::ContextAcquisition {
                reason: js_reason(err),
            })?
            .ok_or_else(|| ShaderBoxError::ContextAcquisition {
                reason: "WebGL is not available".to_string(),
            })?
            .dyn_into::<WebGlRenderingContext>()
            .map_err(|_| ShaderBoxError::ContextAcquisition {
                reason: "context is not a WebGL rendering context".to_string(),
            })?;

        Ok(GlowGpu::new(glow::Context::from_webgl1_context(context)))
    }

    fn display_size(&self) -> LogicalSize {
        let rect = self.canvas.get_bounding_client_rect();
        LogicalSize::new(rect.width(), rect.height())
    }

    fn set_buffer_size(&mut self, size: PhysicalSize) {
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
    }

    fn buffer_size(&self) -> PhysicalSize {
        PhysicalSize::new(self.canvas.width(), self.canvas.height())
    }

    fn pixel_density(&self) -> f64 {
        web_sys::window()
            .map(|window| window.device_pixel_ratio())
            .unwrap_or(1.0)
    }
}
