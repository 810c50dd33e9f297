use anyhow::{Context, Result};
use thiserror::Error;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{GlContext, GlDevice, GlInit};
use crate::input::{translate_key_event, InputState, Key, KeyState};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Key that ends the loop when observed pressed.
    pub exit_key: Key,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "glsteps".to_string(),
            initial_size: LogicalSize::new(1024.0, 768.0),
            exit_key: Key::Escape,
        }
    }
}

impl RuntimeConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Why [`Runtime::run`] stopped early.
#[derive(Debug, Error)]
pub enum RunError {
    /// The event loop, the window, the GL context or the app's `init` could not be set up.
    #[error(transparent)]
    Bootstrap(anyhow::Error),

    /// A failure after setup, while presenting or inside the event loop.
    #[error(transparent)]
    Frame(anyhow::Error),
}

/// Entry point for the runtime.
///
/// Runs one window with one GL context on the calling thread until the exit
/// key is pressed, the window is closed or the app asks to exit.
pub struct Runtime;

impl Runtime {
    /// Returns [`RunError::Bootstrap`] if the window or context could not be
    /// created or `App::init` failed. The app is torn down before the context
    /// is destroyed.
    pub fn run<A>(config: RuntimeConfig, gl_init: GlInit, app: A) -> Result<(), RunError>
    where
        A: App<GlDevice>,
    {
        let event_loop = EventLoop::new()
            .context("failed to create winit EventLoop")
            .map_err(RunError::Bootstrap)?;
        let mut state = AppState::new(config, gl_init, app);

        let looped = event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error");

        let finished = state.finish();
        looped.map_err(RunError::Frame)?;
        finished
    }
}

struct AppState<A> {
    config: RuntimeConfig,
    gl_init: GlInit,
    app: A,

    context: Option<GlContext>,
    input: InputState,
    frame_index: u64,

    close_requested: bool,
    exit_requested: bool,
    fatal: Option<RunError>,
}

impl<A> AppState<A>
where
    A: App<GlDevice>,
{
    fn new(config: RuntimeConfig, gl_init: GlInit, app: A) -> Self {
        Self {
            config,
            gl_init,
            app,
            context: None,
            input: InputState::default(),
            frame_index: 0,
            close_requested: false,
            exit_requested: false,
            fatal: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: RunError) {
        // Keep the first failure; later ones are usually consequences.
        self.fatal.get_or_insert(err);
        self.request_exit(event_loop);
    }

    fn bootstrap(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let context = GlContext::new(event_loop, attrs, &self.gl_init)
            .context("failed to initialize the OpenGL window")?;

        self.app
            .init(context.device())
            .context("failed to set up the scene")?;

        context.window().request_redraw();
        self.context = Some(context);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(context) = self.context.as_ref() else {
            return;
        };

        let control = {
            let mut ctx = FrameCtx {
                device: context.device(),
                input: &self.input,
                frame_index: self.frame_index,
            };
            self.app.on_frame(&mut ctx)
        };

        context.window().pre_present_notify();
        if let Err(e) = context.swap_buffers() {
            self.fail(event_loop, RunError::Frame(e));
            return;
        }
        self.frame_index = self.frame_index.wrapping_add(1);

        let exit_key = self.config.exit_key;
        if should_exit(control, &mut self.input, exit_key, self.close_requested) {
            log::debug!(
                "leaving the frame loop (app: {:?}, close requested: {})",
                control,
                self.close_requested
            );
            self.request_exit(event_loop);
        }
    }

    fn teardown(&mut self) {
        if let Some(context) = self.context.take() {
            self.app.teardown(context.device());
            // Context and window go away here, after the app released its objects.
            drop(context);
            log::debug!("context destroyed");
        }
    }

    fn finish(mut self) -> Result<(), RunError> {
        self.teardown();
        log::info!("rendered {} frames", self.frame_index);
        match self.fatal {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Whether the frame loop ends after the frame just presented.
///
/// Polls `exit_key` every time, so a sticky press is consumed even when
/// another condition already ends the loop.
fn should_exit(
    control: AppControl,
    input: &mut InputState,
    exit_key: Key,
    close_requested: bool,
) -> bool {
    let exit_key_pressed = input.poll_key(exit_key) == KeyState::Pressed;
    control == AppControl::Exit || exit_key_pressed || close_requested
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App<GlDevice>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.context.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.bootstrap(event_loop) {
            self.fail(event_loop, RunError::Bootstrap(e));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: the scene is static but the loop presents every refresh.
        if let Some(context) = &self.context {
            context.window().request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
                self.request_exit(event_loop);
            }

            WindowEvent::Focused(focused) => self.input.set_focused(focused),

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some((key, state)) = translate_key_event(&event) {
                    self.input.apply_key(key, state);
                }
            }

            WindowEvent::Resized(new_size) => {
                if let Some(context) = self.context.as_mut() {
                    context.resize(new_size);
                    context.window().request_redraw();
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_running_without_a_trigger() {
        let mut input = InputState::default();
        assert!(!should_exit(AppControl::Continue, &mut input, Key::Escape, false));
    }

    #[test]
    fn exit_key_ends_the_loop() {
        let mut input = InputState::default();
        input.apply_key(Key::Escape, KeyState::Pressed);
        assert!(should_exit(AppControl::Continue, &mut input, Key::Escape, false));
    }

    #[test]
    fn close_request_ends_the_loop() {
        let mut input = InputState::default();
        assert!(should_exit(AppControl::Continue, &mut input, Key::Escape, true));
    }

    #[test]
    fn app_exit_ends_the_loop() {
        let mut input = InputState::default();
        assert!(should_exit(AppControl::Exit, &mut input, Key::Escape, false));
    }

    #[test]
    fn tap_between_frames_ends_the_loop() {
        let mut input = InputState::default();
        input.apply_key(Key::Escape, KeyState::Pressed);
        input.apply_key(Key::Escape, KeyState::Released);
        assert!(should_exit(AppControl::Continue, &mut input, Key::Escape, false));
    }

    #[test]
    fn other_keys_do_not_end_the_loop() {
        let mut input = InputState::default();
        input.apply_key(Key::Space, KeyState::Pressed);
        assert!(!should_exit(AppControl::Continue, &mut input, Key::Escape, false));
    }

    #[test]
    fn bootstrap_and_frame_errors_keep_their_message() {
        let cause = anyhow::anyhow!("no display").context("failed to initialize");
        let err = RunError::Bootstrap(cause);
        assert_eq!(format!("{err:#}"), "failed to initialize: no display");
        let err = RunError::Frame(anyhow::anyhow!("surface lost"));
        assert_eq!(err.to_string(), "surface lost");
    }
}
