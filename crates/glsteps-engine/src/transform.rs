//! Model-view-projection transform.
//!
//! Right-handed world space, OpenGL clip space (depth in `[-1, 1]`).

use glam::{Mat4, Vec3, Vec4};

/// Perspective camera looking at a fixed point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Viewport width / height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Which way is up; `-Y` looks upside-down.
    pub up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            aspect: 4.0 / 3.0,
            near: 0.1,
            far: 100.0,
            eye: Vec3::new(4.0, 3.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl Camera {
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// `projection * view * model`: applied right to left to a model-space vertex.
    pub fn model_view_projection(&self, model: Mat4) -> Mat4 {
        self.projection() * self.view() * model
    }
}

/// Projects a model-space point to normalized device coordinates.
pub fn project(mvp: Mat4, point: Vec3) -> Vec3 {
    let clip: Vec4 = mvp * point.extend(1.0);
    clip.truncate() / clip.w
}
