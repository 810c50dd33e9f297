use crate::device::GraphicsDevice;
use crate::input::InputState;

/// Per-frame context passed to `core::App::on_frame`.
pub struct FrameCtx<'a, D: GraphicsDevice> {
    pub device: &'a D,
    pub input: &'a InputState,
    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
}
