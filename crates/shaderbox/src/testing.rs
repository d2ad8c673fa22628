//! Recording GPU and in-memory surface used by the host tests.
//!
//! The fake compiler rejects sources with unbalanced brackets and the fake
//! linker rejects fragment varyings the vertex stage does not declare with the
//! same type, which is enough to exercise every failure path.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::error::{ShaderBoxError, ShaderStage};
use crate::gpu::GpuApi;
use crate::surface::{ContextAttributes, LogicalSize, PhysicalSize, Surface};

pub const VERTEX: &str = "\
attribute vec2 position;
varying vec2 uv;
void main() {
    uv = position * 0.5 + 0.5;
    gl_Position = vec4(position, 0.0, 1.0);
}
";

pub const FRAGMENT: &str = "\
precision mediump float;
uniform vec2 iResolution;
uniform float iTime;
uniform vec3 color;
uniform vec4 iMouse;
varying vec2 uv;
void main() {
    gl_FragColor = vec4(color * uv.x, 1.0);
}
";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateProgram(u32),
    CreateShader(ShaderStage, u32),
    Compile(u32),
    Attach(u32, u32),
    Detach(u32, u32),
    Link(u32),
    Validate(u32),
    UseProgram(Option<u32>),
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    CreateBuffer(u32),
    Upload(u32, Vec<f32>),
    EnableAttribute(u32, i32),
    ClearColor([f32; 4]),
    Viewport(u32, u32),
    Clear,
    Draw(i32, i32),
    Uniform(u32, Vec<f32>),
    DeleteShader(u32),
    DeleteProgram(u32),
    DeleteBuffer(u32),
    DeleteVertexArray(u32),
}

/// Failures the recording GPU should simulate.
#[derive(Debug, Clone)]
pub struct GpuScript {
    pub fail_program: bool,
    /// `Some(log)` makes validation fail with `log`.
    pub validate_log: Option<String>,
    pub vertex_arrays: bool,
    pub fail_buffer: bool,
}

impl Default for GpuScript {
    fn default() -> Self {
        Self {
            fail_program: false,
            validate_log: None,
            vertex_arrays: true,
            fail_buffer: false,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    live: BTreeSet<u32>,
    next_id: u32,
    stages: HashMap<u32, ShaderStage>,
    sources: HashMap<u32, String>,
    attached: HashMap<u32, Vec<u32>>,
    active_uniforms: HashMap<u32, Vec<String>>,
    context_attributes: Option<ContextAttributes>,
}

/// Shared view of everything the recording GPU did.
#[derive(Debug, Clone, Default)]
pub struct GpuLog(Rc<RefCell<State>>);

impl GpuLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    /// Ids of GPU objects created and not yet deleted.
    pub fn live_objects(&self) -> BTreeSet<u32> {
        self.0.borrow().live.clone()
    }

    pub fn context_attributes(&self) -> Option<ContextAttributes> {
        self.0.borrow().context_attributes
    }

    fn record(&self, call: Call) {
        self.0.borrow_mut().calls.push(call);
    }

    fn allocate(&self) -> u32 {
        let mut state = self.0.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.live.insert(id);
        id
    }

    fn free(&self, id: u32) {
        self.0.borrow_mut().live.remove(&id);
    }
}

pub struct RecordingGpu {
    script: GpuScript,
    log: GpuLog,
}

impl GpuApi for RecordingGpu {
    type Program = u32;
    type Shader = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type UniformLocation = u32;

    fn create_program(&self) -> Result<u32, String> {
        if self.script.fail_program {
            return Err("context lost".to_string());
        }
        let id = self.log.allocate();
        self.log.record(Call::CreateProgram(id));
        Ok(id)
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let id = self.log.allocate();
        self.log.0.borrow_mut().stages.insert(id, stage);
        self.log.record(Call::CreateShader(stage, id));
        Ok(id)
    }

    fn compile_shader(&self, shader: u32, source: &str) -> Result<(), String> {
        self.log.record(Call::Compile(shader));
        self.log
            .0
            .borrow_mut()
            .sources
            .insert(shader, source.to_string());
        if balanced(source) {
            Ok(())
        } else {
            let line = source.lines().count();
            Err(format!(
                "ERROR: 0:{line}: '' : syntax error: unexpected end of file\n"
            ))
        }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.log.record(Call::Attach(program, shader));
        self.log
            .0
            .borrow_mut()
            .attached
            .entry(program)
            .or_default()
            .push(shader);
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.log.record(Call::Detach(program, shader));
        if let Some(shaders) = self.log.0.borrow_mut().attached.get_mut(&program) {
            shaders.retain(|attached| *attached != shader);
        }
    }

    fn link_program(&self, program: u32) -> Result<(), String> {
        self.log.record(Call::Link(program));
        let mut state = self.log.0.borrow_mut();
        let shaders = state.attached.get(&program).cloned().unwrap_or_default();

        let mut vertex = Vec::new();
        let mut fragment = Vec::new();
        let mut uniforms = Vec::new();
        for shader in shaders {
            let source = state.sources.get(&shader).cloned().unwrap_or_default();
            match state.stages.get(&shader) {
                Some(ShaderStage::Vertex) => vertex.extend(declarations(&source, "varying")),
                Some(ShaderStage::Fragment) => fragment.extend(declarations(&source, "varying")),
                None => {}
            }
            for (_, name) in declarations(&source, "uniform") {
                if !uniforms.contains(&name) {
                    uniforms.push(name);
                }
            }
        }

        for (ty, name) in &fragment {
            if !vertex.iter().any(|(vty, vname)| vname == name && vty == ty) {
                return Err(format!(
                    "ERROR: Linking: varying '{name}' of type {ty} is read by the fragment \
                     shader but not written by the vertex shader\n"
                ));
            }
        }
        state.active_uniforms.insert(program, uniforms);
        Ok(())
    }

    fn validate_program(&self, program: u32) -> Result<(), String> {
        self.log.record(Call::Validate(program));
        match &self.script.validate_log {
            Some(log) => Err(log.clone()),
            None => Ok(()),
        }
    }

    fn use_program(&self, program: Option<u32>) {
        self.log.record(Call::UseProgram(program));
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.log.0.borrow();
        let active = state.active_uniforms.get(&program)?;
        active
            .iter()
            .position(|uniform| uniform == name)
            .map(|index| index as u32)
    }

    fn supports_vertex_arrays(&self) -> bool {
        self.script.vertex_arrays
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let id = self.log.allocate();
        self.log.record(Call::CreateVertexArray(id));
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.log.record(Call::BindVertexArray(vertex_array));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        if self.script.fail_buffer {
            return Err("out of memory".to_string());
        }
        let id = self.log.allocate();
        self.log.record(Call::CreateBuffer(id));
        Ok(id)
    }

    fn upload_static_vertices(&self, buffer: u32, data: &[f32]) {
        self.log.record(Call::Upload(buffer, data.to_vec()));
    }

    fn enable_float_attribute(&self, slot: u32, components: i32) {
        self.log.record(Call::EnableAttribute(slot, components));
    }

    fn set_clear_color(&self, rgba: [f32; 4]) {
        self.log.record(Call::ClearColor(rgba));
    }

    fn set_viewport(&self, width: u32, height: u32) {
        self.log.record(Call::Viewport(width, height));
    }

    fn clear_color_and_depth(&self) {
        self.log.record(Call::Clear);
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.log.record(Call::Draw(first, count));
    }

    fn uniform_1f(&self, location: &u32, value: f32) {
        self.log.record(Call::Uniform(*location, vec![value]));
    }

    fn uniform_2f(&self, location: &u32, value: [f32; 2]) {
        self.log.record(Call::Uniform(*location, value.to_vec()));
    }

    fn uniform_3f(&self, location: &u32, value: [f32; 3]) {
        self.log.record(Call::Uniform(*location, value.to_vec()));
    }

    fn uniform_4f(&self, location: &u32, value: [f32; 4]) {
        self.log.record(Call::Uniform(*location, value.to_vec()));
    }

    fn delete_shader(&self, shader: u32) {
        self.log.record(Call::DeleteShader(shader));
        self.log.free(shader);
    }

    fn delete_program(&self, program: u32) {
        self.log.record(Call::DeleteProgram(program));
        self.log.free(program);
    }

    fn delete_buffer(&self, buffer: u32) {
        self.log.record(Call::DeleteBuffer(buffer));
        self.log.free(buffer);
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.log.record(Call::DeleteVertexArray(vertex_array));
        self.log.free(vertex_array);
    }
}

/// Surface with a settable displayed size and no real pixels.
pub struct MockSurface {
    display: LogicalSize,
    density: f64,
    buffer: PhysicalSize,
    script: GpuScript,
    log: GpuLog,
    context: bool,
}

impl MockSurface {
    pub fn new(display: LogicalSize, density: f64) -> Self {
        Self {
            display,
            density,
            buffer: PhysicalSize::default(),
            script: GpuScript::default(),
            log: GpuLog::default(),
            context: true,
        }
    }

    pub fn with_script(mut self, script: GpuScript) -> Self {
        self.script = script;
        self
    }

    pub fn without_context(mut self) -> Self {
        self.context = false;
        self
    }

    pub fn set_display_size(&mut self, size: LogicalSize) {
        self.display = size;
    }

    pub fn log(&self) -> GpuLog {
        self.log.clone()
    }
}

impl Surface for MockSurface {
    type Gpu = RecordingGpu;

    fn create_default() -> Result<Self, ShaderBoxError> {
        Ok(Self::new(LogicalSize::new(300.0, 150.0), 1.0))
    }

    fn acquire_context(
        &mut self,
        attributes: ContextAttributes,
    ) -> Result<RecordingGpu, ShaderBoxError> {
        if !self.context {
            return Err(ShaderBoxError::ContextAcquisition {
                reason: "surface has no GPU context".to_string(),
            });
        }
        self.log.0.borrow_mut().context_attributes = Some(attributes);
        Ok(RecordingGpu {
            script: self.script.clone(),
            log: self.log.clone(),
        })
    }

    fn display_size(&self) -> LogicalSize {
        self.display
    }

    fn set_buffer_size(&mut self, size: PhysicalSize) {
        self.buffer = size;
    }

    fn buffer_size(&self) -> PhysicalSize {
        self.buffer
    }

    fn pixel_density(&self) -> f64 {
        self.density
    }
}

fn balanced(source: &str) -> bool {
    let mut open = Vec::new();
    for ch in source.chars() {
        match ch {
            '{' | '(' | '[' => open.push(ch),
            '}' | ')' | ']' => {
                let expected = match ch {
                    '}' => '{',
                    ')' => '(',
                    _ => '[',
                };
                if open.pop() != Some(expected) {
                    return false;
                }
            }
            _ => {}
        }
    }
    open.is_empty()
}

/// `(type, name)` pairs declared with `qualifier` at the start of a line.
fn declarations(source: &str, qualifier: &str) -> Vec<(String, String)> {
    source
        .lines()
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 3 || tokens[0] != qualifier {
                return None;
            }
            let name = tokens[tokens.len() - 1].trim_end_matches(';');
            let ty = tokens[tokens.len() - 2];
            Some((ty.to_string(), name.to_string()))
        })
        .collect()
}
