/// Initialization parameters for the OpenGL context.
///
/// Defaults are the fixed configuration every lesson runs with.
#[derive(Debug, Clone)]
pub struct GlInit {
    /// Multisample anti-aliasing sample count requested from the display.
    ///
    /// If no config offers exactly this count, the config with the most samples wins.
    pub samples: u8,

    /// Requested context version as `(major, minor)`.
    pub version: (u8, u8),

    /// Request a core profile context.
    ///
    /// Core contexts on macOS are always forward compatible; glutin applies
    /// that on the platforms that require it.
    pub core_profile: bool,

    /// Wait for vertical blank when presenting.
    pub vsync: bool,
}

impl Default for GlInit {
    fn default() -> Self {
        Self {
            samples: 4,
            version: (3, 3),
            core_profile: true,
            vsync: true,
        }
    }
}
