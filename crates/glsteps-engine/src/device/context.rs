use std::num::NonZeroU32;
use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Context, Result};
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use super::{GlDevice, GlInit, GraphicsDevice};

/// Owns the window and its OpenGL context.
///
/// This type is the low-level rendering context:
/// - creates the window together with a matching GL display config
/// - creates the core-profile context and the window surface, makes it current
/// - loads GL entry points into a [`GlDevice`]
/// - presents frames and tracks the drawable size
///
/// Fields drop in declaration order: GL bindings, surface, context, then the window.
pub struct GlContext {
    /// Loaded GL entry points.
    device: GlDevice,

    /// Window surface the context renders into.
    surface: Surface<WindowSurface>,

    /// Context, current on the thread that created it.
    context: PossiblyCurrentContext,

    /// Native window.
    window: Window,
}

impl GlContext {
    /// Creates a window and a current OpenGL context for it.
    ///
    /// Every failure here is a bootstrap failure and is reported with context.
    pub fn new(
        event_loop: &ActiveEventLoop,
        attributes: WindowAttributes,
        init: &GlInit,
    ) -> Result<Self> {
        // Multisampling is ranked by `pick_config`, not filtered by the template.
        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24);

        let samples = init.samples;
        let (window, gl_config) =
            find_window_config(event_loop, attributes, template, samples)?;

        let window = window.context("GL display did not create a window")?;
        log::debug!(
            "picked GL config: {} samples (requested {})",
            gl_config.num_samples(),
            samples
        );

        let raw_window_handle = window
            .window_handle()
            .context("window has no native handle")?
            .as_raw();

        let (major, minor) = init.version;
        let mut attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))));
        if init.core_profile {
            attributes = attributes.with_profile(GlProfile::Core);
        }
        let attributes = attributes.build(Some(raw_window_handle));

        let gl_display = gl_config.display();

        // The raw window handle passed above belongs to `window`, which outlives the context.
        let not_current = unsafe { gl_display.create_context(&gl_config, &attributes) }
            .with_context(|| format!("failed to create an OpenGL {major}.{minor} context"))?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .context("failed to describe the window surface")?;
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .context("failed to create the window surface")?;

        let context = not_current
            .make_current(&surface)
            .context("failed to make the OpenGL context current")?;

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| gl_display.get_proc_address(symbol))
        };
        {
            use glow::HasContext;
            let version = gl.version();
            log::info!(
                "OpenGL {}.{} ({})",
                version.major,
                version.minor,
                version.vendor_info
            );
        }

        let interval = if init.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            log::warn!("could not set swap interval: {e}");
        }

        Ok(Self {
            device: GlDevice::new(gl),
            surface,
            context,
            window,
        })
    }

    /// Returns the GL device bound to this context.
    pub fn device(&self) -> &GlDevice {
        &self.device
    }

    /// Returns the native window.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Presents the back buffer.
    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to present frame")
    }

    /// Resizes the surface and the viewport after a window resize.
    ///
    /// A zero-sized surface cannot be configured and is skipped.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let (Some(width), Some(height)) = (
            NonZeroU32::new(new_size.width),
            NonZeroU32::new(new_size.height),
        ) else {
            return;
        };

        self.surface.resize(&self.context, width, height);
        self.device
            .viewport(new_size.width as i32, new_size.height as i32);
    }
}

/// Unwind payload used to leave the config picker when nothing matched.
struct NoMatchingConfig;

/// Opens the window together with the best GL config for it.
///
/// glutin-winit requires the picker to return a config even when the display
/// offered none; that case is unwound out of the picker and reported as an error.
fn find_window_config(
    event_loop: &ActiveEventLoop,
    attributes: WindowAttributes,
    template: ConfigTemplateBuilder,
    samples: u8,
) -> Result<(Option<Window>, Config)> {
    let built = panic::catch_unwind(AssertUnwindSafe(|| {
        DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, |configs| {
                pick_config(configs, samples)
                    .unwrap_or_else(|| panic::resume_unwind(Box::new(NoMatchingConfig)))
            })
    }));

    match built {
        Ok(result) => {
            result.map_err(|e| anyhow!("failed to open a window with a matching GL config: {e}"))
        }
        Err(payload) if payload.is::<NoMatchingConfig>() => Err(anyhow!(
            "the display offers no GL config with 8-bit alpha and a 24-bit depth buffer"
        )),
        Err(payload) => panic::resume_unwind(payload),
    }
}

/// Picks the config whose sample count matches `requested`, else the one with the most samples.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>, requested: u8) -> Option<Config> {
    best_by_samples(configs, requested, |config| config.num_samples())
}

fn best_by_samples<T>(
    candidates: impl Iterator<Item = T>,
    requested: u8,
    samples: impl Fn(&T) -> u8,
) -> Option<T> {
    candidates.reduce(|best, candidate| {
        if sample_score(requested, samples(&candidate)) > sample_score(requested, samples(&best)) {
            candidate
        } else {
            best
        }
    })
}

/// Ordering key for configs: exact sample match first, then more samples.
fn sample_score(requested: u8, offered: u8) -> (bool, u8) {
    (offered == requested, offered)
}

#[cfg(test)]
mod tests {
    use super::{best_by_samples, pick_config, sample_score};

    #[test]
    fn exact_sample_count_beats_higher() {
        assert!(sample_score(4, 4) > sample_score(4, 8));
    }

    #[test]
    fn higher_sample_count_wins_without_exact_match() {
        assert!(sample_score(4, 8) > sample_score(4, 2));
        assert!(sample_score(4, 2) > sample_score(4, 0));
    }

    #[test]
    fn falls_back_to_fewer_samples_than_requested() {
        let offered = [0u8, 2, 1];
        assert_eq!(best_by_samples(offered.into_iter(), 4, |s| *s), Some(2));
    }

    #[test]
    fn exact_match_is_picked_among_others() {
        let offered = [8u8, 4, 16, 0];
        assert_eq!(best_by_samples(offered.into_iter(), 4, |s| *s), Some(4));
    }

    #[test]
    fn empty_config_list_picks_nothing() {
        assert!(pick_config(Box::new(std::iter::empty()), 4).is_none());
    }
}
