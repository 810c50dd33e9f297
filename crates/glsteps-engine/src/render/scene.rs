use anyhow::{Context, Result};
use glam::Mat4;

use crate::device::{ClearColor, ClearMask, GraphicsDevice};
use crate::geometry::Mesh;
use crate::shader::{load_program, ShaderError, ShaderPaths, ShaderPolicy};
use crate::transform::Camera;

use super::GpuMesh;

/// Fixed model-view-projection fed to one `mat4` uniform.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformDesc {
    /// Uniform the matrix is uploaded to.
    pub uniform: &'static str,
    pub camera: Camera,
    pub model: Mat4,
}

impl Default for TransformDesc {
    fn default() -> Self {
        Self {
            uniform: "MVP",
            camera: Camera::default(),
            model: Mat4::IDENTITY,
        }
    }
}

/// Everything a static scene needs; computed once, never changed per frame.
#[derive(Debug, Clone)]
pub struct SceneDesc {
    pub mesh: Mesh,
    /// `None` draws without a program.
    pub shaders: Option<ShaderPaths>,
    pub shader_policy: ShaderPolicy,
    pub transform: Option<TransformDesc>,
    pub depth_test: bool,
    pub clear_color: ClearColor,
}

impl SceneDesc {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            shaders: None,
            shader_policy: ShaderPolicy::default(),
            transform: None,
            depth_test: false,
            clear_color: ClearColor::DARK_BLUE,
        }
    }

    pub fn shaders(mut self, vertex: &str, fragment: &str) -> Self {
        self.shaders = Some(ShaderPaths::new(vertex, fragment));
        self
    }

    pub fn shader_policy(mut self, policy: ShaderPolicy) -> Self {
        self.shader_policy = policy;
        self
    }

    pub fn transform(mut self, transform: TransformDesc) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = enabled;
        self
    }
}

/// Device objects of one static scene: a vertex array, the uploaded mesh,
/// the program and its transform.
///
/// Per frame it clears, binds and submits exactly one draw call; nothing
/// changes between frames.
pub struct StaticScene<D: GraphicsDevice> {
    vertex_array: D::VertexArray,
    mesh: GpuMesh<D>,
    program: Option<D::Program>,
    mvp: Option<(D::UniformLocation, [f32; 16])>,
    clear: ClearMask,
}

impl<D: GraphicsDevice> StaticScene<D> {
    /// Uploads geometry, builds the program and computes the transform.
    ///
    /// Shader problems that the policy tolerates are logged and the scene is
    /// still built; a vertex file that cannot be opened leaves the scene
    /// without a program.
    pub fn build(device: &D, desc: &SceneDesc) -> Result<Self> {
        device.set_clear_color(desc.clear_color);
        if desc.depth_test {
            device.enable_depth_test();
        }

        let vertex_array = device
            .create_vertex_array()
            .context("failed to create the vertex array")?;
        device.bind_vertex_array(Some(vertex_array));

        let mesh = match GpuMesh::upload(device, &desc.mesh) {
            Ok(mesh) => mesh,
            Err(e) => {
                device.delete_vertex_array(vertex_array);
                return Err(e);
            }
        };

        let loaded = desc
            .shaders
            .as_ref()
            .map(|paths| load_program(device, paths, desc.shader_policy));
        let program = match loaded {
            None => None,
            Some(Ok(build)) => {
                if !build.is_clean() {
                    log::warn!("shader program built with errors; frames may render incorrectly");
                }
                Some(build.program)
            }
            Some(Err(ShaderError::Open { .. } | ShaderError::Encoding { .. }))
                if desc.shader_policy == ShaderPolicy::Lenient =>
            {
                log::warn!("drawing without a shader program");
                None
            }
            Some(Err(e)) => {
                mesh.release(device);
                device.delete_vertex_array(vertex_array);
                return Err(e).context("failed to build the shader program");
            }
        };

        let mvp = match (&desc.transform, program) {
            (Some(transform), Some(program)) => {
                let location = device.uniform_location(program, transform.uniform);
                if location.is_none() {
                    log::warn!("uniform '{}' not found in program", transform.uniform);
                }
                let matrix = transform
                    .camera
                    .model_view_projection(transform.model)
                    .to_cols_array();
                location.map(|l| (l, matrix))
            }
            _ => None,
        };

        let clear = if desc.depth_test {
            ClearMask::COLOR_DEPTH
        } else {
            ClearMask::COLOR
        };

        Ok(Self {
            vertex_array,
            mesh,
            program,
            mvp,
            clear,
        })
    }

    /// Number of vertices submitted per frame.
    pub fn vertex_count(&self) -> i32 {
        self.mesh.vertex_count()
    }

    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    /// Records one frame: clear, bind, one draw call.
    pub fn draw(&self, device: &D) {
        device.clear(self.clear);
        device.use_program(self.program);
        if let Some((location, matrix)) = &self.mvp {
            device.uniform_matrix4(location, matrix);
        }
        self.mesh.draw(device);
    }

    /// Deletes the buffers, then the program, then the vertex array.
    pub fn release(self, device: &D) {
        self.mesh.release(device);
        if let Some(program) = self.program {
            device.delete_program(program);
        }
        device.delete_vertex_array(self.vertex_array);
    }
}
