//! glsteps engine crate.
//!
//! Owns the window + OpenGL runtime pieces and the small amount of reusable
//! rendering logic (shader programs, static meshes, the MVP transform) the
//! lessons are built from.

pub mod core;
pub mod device;
pub mod geometry;
pub mod input;
pub mod render;
pub mod shader;
pub mod transform;
pub mod window;

pub mod logging;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
