//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events and feeds them into `InputState`.

mod state;
mod types;
mod platform;

pub use state::InputState;
pub use types::{Key, KeyState};

pub(crate) use platform::translate_key_event;
