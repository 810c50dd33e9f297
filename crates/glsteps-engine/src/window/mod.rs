//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and drives the GL context and the app through
//! bootstrap, the frame loop and teardown.

mod runtime;

pub use runtime::{RunError, Runtime, RuntimeConfig};
