use anyhow::Result;

use crate::device::GraphicsDevice;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the lessons.
///
/// The runtime calls `init` once the context is current, `on_frame` once per
/// presented frame, and `teardown` before the context is destroyed.
pub trait App<D: GraphicsDevice> {
    /// Creates device objects. An error here aborts the run.
    fn init(&mut self, device: &D) -> Result<()>;

    /// Records one frame. Presentation is done by the runtime afterwards.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, D>) -> AppControl;

    /// Releases every device object created in `init`.
    fn teardown(&mut self, device: &D);
}
