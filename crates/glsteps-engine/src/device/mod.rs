//! OpenGL device + context management.
//!
//! This module is responsible for:
//! - describing the GL calls the engine issues (`GraphicsDevice`)
//! - creating the window, display, surface and core-profile context (`GlContext`)
//! - presenting frames and reacting to resizes

mod api;
mod context;
mod error;
mod gl;
mod init;

pub use api::{ClearColor, ClearMask, GraphicsDevice, ShaderStage};
pub use context::GlContext;
pub use error::DeviceError;
pub use gl::GlDevice;
pub use init::GlInit;
