//! Driver-free `GraphicsDevice` for tests.
//!
//! `RecordingDevice` hands out non-zero integer handles, records every call in
//! order and mimics just enough GL semantics to exercise the shader builder
//! and the frame loop:
//! - a stage compiles iff its source contains a `void main(` entry point
//! - a program links iff it has attached stages and all of them compiled
//! - uniform locations exist for `uniform <type> <name>;` declarations of the
//!   stages attached at link time

use std::cell::RefCell;
use std::collections::HashMap;

use crate::device::{ClearColor, ClearMask, DeviceError, GraphicsDevice, ShaderStage};

/// One recorded device call. Handles are the integers returned by `create_*`.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader { stage: ShaderStage, shader: u32 },
    ShaderSource { shader: u32 },
    CompileShader { shader: u32 },
    DeleteShader { shader: u32 },
    CreateProgram { program: u32 },
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    LinkProgram { program: u32 },
    UseProgram { program: Option<u32> },
    DeleteProgram { program: u32 },
    UniformMatrix4 { location: i32 },
    CreateVertexArray { vertex_array: u32 },
    BindVertexArray { vertex_array: Option<u32> },
    DeleteVertexArray { vertex_array: u32 },
    CreateBuffer { buffer: u32 },
    BindArrayBuffer { buffer: Option<u32> },
    ArrayBufferData { bytes: usize },
    DeleteBuffer { buffer: u32 },
    EnableVertexAttrib { index: u32 },
    DisableVertexAttrib { index: u32 },
    VertexAttrib { index: u32, components: i32 },
    SetClearColor(ClearColor),
    Clear(ClearMask),
    EnableDepthTest,
    Viewport { width: i32, height: i32 },
    DrawTriangles { first: i32, count: i32 },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Kind {
    Shader,
    Program,
    VertexArray,
    Buffer,
}

#[derive(Debug, Default)]
struct FakeShader {
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    calls: Vec<Call>,
    live: HashMap<u32, Kind>,
    shaders: HashMap<u32, FakeShader>,
    programs: HashMap<u32, FakeProgram>,
    fail_creation: Option<Kind>,
}

impl State {
    fn allocate(&mut self, kind: Kind) -> Result<u32, DeviceError> {
        if self.fail_creation == Some(kind) {
            return Err(DeviceError::create(kind.label(), "out of handles"));
        }
        self.next_id += 1;
        self.live.insert(self.next_id, kind);
        Ok(self.next_id)
    }

    fn release(&mut self, id: u32) {
        self.live.remove(&id);
    }
}

impl Kind {
    fn label(self) -> &'static str {
        match self {
            Kind::Shader => "shader",
            Kind::Program => "program",
            Kind::VertexArray => "vertex array",
            Kind::Buffer => "buffer",
        }
    }
}

/// Recording fake device; see the module docs for the semantics it mimics.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    state: RefCell<State>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `create_program` call fail.
    pub fn fail_program_creation(&self) {
        self.state.borrow_mut().fail_creation = Some(Kind::Program);
    }

    /// Makes every subsequent `create_buffer` call fail.
    pub fn fail_buffer_creation(&self) {
        self.state.borrow_mut().fail_creation = Some(Kind::Buffer);
    }

    /// All calls recorded so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Forgets the recorded calls; object state is kept.
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// `(first, count)` of every draw call, in order.
    pub fn draw_calls(&self) -> Vec<(i32, i32)> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::DrawTriangles { first, count } => Some((*first, *count)),
                _ => None,
            })
            .collect()
    }

    pub fn live_shaders(&self) -> usize {
        self.live_of(Kind::Shader)
    }

    pub fn live_programs(&self) -> usize {
        self.live_of(Kind::Program)
    }

    pub fn live_buffers(&self) -> usize {
        self.live_of(Kind::Buffer)
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.live_of(Kind::VertexArray)
    }

    /// Whether `program` was linked successfully.
    pub fn is_linked(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn live_of(&self, kind: Kind) -> usize {
        self.state.borrow().live.values().filter(|k| **k == kind).count()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

fn declared_uniforms(source: &str) -> impl Iterator<Item = String> + '_ {
    source.lines().filter_map(|line| {
        let rest = line.trim().strip_prefix("uniform ")?;
        let name = rest.trim_end().trim_end_matches(';').split_whitespace().last()?;
        Some(name.to_string())
    })
}

impl GraphicsDevice for RecordingDevice {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type UniformLocation = i32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, DeviceError> {
        let mut st = self.state.borrow_mut();
        let shader = st.allocate(Kind::Shader)?;
        st.shaders.insert(shader, FakeShader::default());
        st.calls.push(Call::CreateShader { stage, shader });
        Ok(shader)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut st = self.state.borrow_mut();
        if let Some(s) = st.shaders.get_mut(&shader) {
            s.source = source.to_string();
        }
        st.calls.push(Call::ShaderSource { shader });
    }

    fn compile_shader(&self, shader: u32) {
        let mut st = self.state.borrow_mut();
        if let Some(s) = st.shaders.get_mut(&shader) {
            s.compiled = s.source.contains("void main(");
            s.log = if s.compiled {
                String::new()
            } else {
                "ERROR: 0:1: 'main' : function not found\n".to_string()
            };
        }
        st.calls.push(Call::CompileShader { shader });
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        let mut st = self.state.borrow_mut();
        st.release(shader);
        st.calls.push(Call::DeleteShader { shader });
    }

    fn create_program(&self) -> Result<u32, DeviceError> {
        let mut st = self.state.borrow_mut();
        let program = st.allocate(Kind::Program)?;
        st.programs.insert(program, FakeProgram::default());
        st.calls.push(Call::CreateProgram { program });
        Ok(program)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut st = self.state.borrow_mut();
        if let Some(p) = st.programs.get_mut(&program) {
            p.attached.push(shader);
        }
        st.calls.push(Call::AttachShader { program, shader });
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut st = self.state.borrow_mut();
        if let Some(p) = st.programs.get_mut(&program) {
            p.attached.retain(|s| *s != shader);
        }
        st.calls.push(Call::DetachShader { program, shader });
    }

    fn link_program(&self, program: u32) {
        let mut st = self.state.borrow_mut();
        let attached = st
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default();

        let all_compiled = !attached.is_empty()
            && attached
                .iter()
                .all(|s| st.shaders.get(s).is_some_and(|s| s.compiled));
        let uniforms: Vec<String> = attached
            .iter()
            .filter_map(|s| st.shaders.get(s))
            .flat_map(|s| declared_uniforms(&s.source).collect::<Vec<_>>())
            .collect();

        if let Some(p) = st.programs.get_mut(&program) {
            p.linked = all_compiled;
            p.uniforms = if all_compiled { uniforms } else { Vec::new() };
            p.log = if all_compiled {
                String::new()
            } else {
                "ERROR: One or more attached shaders not successfully compiled\n".to_string()
            };
        }
        st.calls.push(Call::LinkProgram { program });
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.is_linked(program)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(Call::UseProgram { program });
    }

    fn delete_program(&self, program: u32) {
        let mut st = self.state.borrow_mut();
        st.release(program);
        st.calls.push(Call::DeleteProgram { program });
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<i32> {
        let st = self.state.borrow();
        let p = st.programs.get(&program)?;
        p.uniforms
            .iter()
            .position(|u| u == name)
            .map(|i| i as i32)
    }

    fn uniform_matrix4(&self, location: &i32, _columns: &[f32; 16]) {
        self.record(Call::UniformMatrix4 { location: *location });
    }

    fn create_vertex_array(&self) -> Result<u32, DeviceError> {
        let mut st = self.state.borrow_mut();
        let vertex_array = st.allocate(Kind::VertexArray)?;
        st.calls.push(Call::CreateVertexArray { vertex_array });
        Ok(vertex_array)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.record(Call::BindVertexArray { vertex_array });
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let mut st = self.state.borrow_mut();
        st.release(vertex_array);
        st.calls.push(Call::DeleteVertexArray { vertex_array });
    }

    fn create_buffer(&self) -> Result<u32, DeviceError> {
        let mut st = self.state.borrow_mut();
        let buffer = st.allocate(Kind::Buffer)?;
        st.calls.push(Call::CreateBuffer { buffer });
        Ok(buffer)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.record(Call::BindArrayBuffer { buffer });
    }

    fn array_buffer_data_static(&self, data: &[u8]) {
        self.record(Call::ArrayBufferData { bytes: data.len() });
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut st = self.state.borrow_mut();
        st.release(buffer);
        st.calls.push(Call::DeleteBuffer { buffer });
    }

    fn enable_vertex_attrib(&self, index: u32) {
        self.record(Call::EnableVertexAttrib { index });
    }

    fn disable_vertex_attrib(&self, index: u32) {
        self.record(Call::DisableVertexAttrib { index });
    }

    fn vertex_attrib_f32(&self, index: u32, components: i32) {
        self.record(Call::VertexAttrib { index, components });
    }

    fn set_clear_color(&self, color: ClearColor) {
        self.record(Call::SetClearColor(color));
    }

    fn clear(&self, mask: ClearMask) {
        self.record(Call::Clear(mask));
    }

    fn enable_depth_test(&self) {
        self.record(Call::EnableDepthTest);
    }

    fn viewport(&self, width: i32, height: i32) {
        self.record(Call::Viewport { width, height });
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.record(Call::DrawTriangles { first, count });
    }
}
