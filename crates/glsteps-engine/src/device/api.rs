use std::fmt;

use super::DeviceError;

/// Programmable pipeline stage a shader object is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// RGBA clear color, straight alpha.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ClearColor {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Background used by every lesson.
    pub const DARK_BLUE: Self = Self::new(0.0, 0.0, 0.4, 0.0);
}

/// Buffers touched by a frame clear.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR: Self = Self { color: true, depth: false };
    pub const COLOR_DEPTH: Self = Self { color: true, depth: true };
}

/// The slice of the OpenGL 3.3 core API the engine relies on.
///
/// Every call is issued on the thread that owns the current context. The
/// associated handle types are opaque; a valid handle is only obtained from
/// the matching `create_*` call, so there is no "zero means invalid" value.
///
/// The production implementation is [`GlDevice`](super::GlDevice); tests use
/// a recording implementation that never touches a driver.
pub trait GraphicsDevice {
    type Shader: Copy + Eq + fmt::Debug;
    type Program: Copy + Eq + fmt::Debug;
    type Buffer: Copy + Eq + fmt::Debug;
    type VertexArray: Copy + Eq + fmt::Debug;
    type UniformLocation: Clone + fmt::Debug;

    // ── shader stages ────────────────────────────────────────────────────

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, DeviceError>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    /// Returns the driver's info log; empty when the driver reported nothing.
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    // ── programs ─────────────────────────────────────────────────────────

    fn create_program(&self) -> Result<Self::Program, DeviceError>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;
    /// Uploads a column-major 4x4 matrix to the bound program.
    fn uniform_matrix4(&self, location: &Self::UniformLocation, columns: &[f32; 16]);

    // ── geometry ─────────────────────────────────────────────────────────

    fn create_vertex_array(&self) -> Result<Self::VertexArray, DeviceError>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    fn create_buffer(&self) -> Result<Self::Buffer, DeviceError>;
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);
    /// Uploads `data` into the bound array buffer with a static usage hint.
    fn array_buffer_data_static(&self, data: &[u8]);
    fn delete_buffer(&self, buffer: Self::Buffer);

    fn enable_vertex_attrib(&self, index: u32);
    fn disable_vertex_attrib(&self, index: u32);
    /// Describes attribute `index` as `components` tightly packed, non-normalized
    /// floats starting at offset 0 of the bound array buffer.
    fn vertex_attrib_f32(&self, index: u32, components: i32);

    // ── frame ────────────────────────────────────────────────────────────

    fn set_clear_color(&self, color: ClearColor);
    fn clear(&self, mask: ClearMask);
    /// Enables depth testing with "closer fragment wins".
    fn enable_depth_test(&self);
    fn viewport(&self, width: i32, height: i32);
    fn draw_triangles(&self, first: i32, count: i32);
}
