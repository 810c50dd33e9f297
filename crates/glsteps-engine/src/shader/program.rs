use crate::device::{GraphicsDevice, ShaderStage};

use super::{ShaderError, ShaderPaths, StageSource};

/// What the builder does once a compile or link failure has been reported.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ShaderPolicy {
    /// Print the diagnostics and hand back the program anyway.
    ///
    /// The program may render nothing; callers that care inspect
    /// [`ProgramBuild::is_clean`] or call [`ProgramBuild::into_checked`].
    #[default]
    Lenient,

    /// Print the diagnostics, delete the program and return the first failure.
    Strict,
}

/// Outcome of compiling one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: ShaderStage,
    pub origin: String,
    pub compiled: bool,
    /// Driver info log, `None` when the driver reported nothing.
    pub log: Option<String>,
}

/// Outcome of linking the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReport {
    pub linked: bool,
    pub log: Option<String>,
}

/// A program handle together with everything the driver reported while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramBuild<P> {
    pub program: P,
    pub vertex: StageReport,
    pub fragment: StageReport,
    pub link: LinkReport,
}

impl<P: Copy> ProgramBuild<P> {
    /// True when both stages compiled and the program linked.
    pub fn is_clean(&self) -> bool {
        self.failure().is_none()
    }

    /// Every non-empty driver log, in build order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &str> + '_ {
        [&self.vertex.log, &self.fragment.log, &self.link.log]
            .into_iter()
            .filter_map(|log| log.as_deref())
    }

    /// Applies the strict policy after the fact.
    ///
    /// On failure the program is deleted and the first failure is returned.
    pub fn into_checked<D>(self, device: &D) -> Result<P, ShaderError>
    where
        D: GraphicsDevice<Program = P>,
    {
        match self.failure() {
            None => Ok(self.program),
            Some(err) => {
                device.delete_program(self.program);
                Err(err)
            }
        }
    }

    fn failure(&self) -> Option<ShaderError> {
        for stage in [&self.vertex, &self.fragment] {
            if !stage.compiled {
                return Some(ShaderError::Compile {
                    stage: stage.stage,
                    origin: stage.origin.clone(),
                    log: stage.log.clone().unwrap_or_default(),
                });
            }
        }

        if !self.link.linked {
            return Some(ShaderError::Link {
                log: self.link.log.clone().unwrap_or_default(),
            });
        }

        None
    }
}

/// Reads both stage files and builds a program from them.
///
/// A vertex file that cannot be opened stops the build before anything is
/// created on the device. A fragment file that cannot be opened is rejected
/// under [`ShaderPolicy::Strict`]; under [`ShaderPolicy::Lenient`] the stage
/// is compiled from empty source, which the driver then reports.
pub fn load_program<D: GraphicsDevice>(
    device: &D,
    paths: &ShaderPaths,
    policy: ShaderPolicy,
) -> Result<ProgramBuild<D::Program>, ShaderError> {
    let vertex = StageSource::read(ShaderStage::Vertex, &paths.vertex).inspect_err(|e| {
        log::error!("{e}");
    })?;

    let fragment = match StageSource::read(ShaderStage::Fragment, &paths.fragment) {
        Ok(source) => source,
        Err(e) if policy == ShaderPolicy::Lenient => {
            log::warn!("{e} (compiling the fragment stage from empty source)");
            StageSource::new(
                ShaderStage::Fragment,
                paths.fragment.display().to_string(),
                String::new(),
            )
        }
        Err(e) => {
            log::error!("{e}");
            return Err(e);
        }
    };

    build_program(device, &vertex, &fragment, policy)
}

/// Compiles `vertex` and `fragment`, links them into a program and releases the stages.
///
/// Each compile and the link print their driver log when it is non-empty,
/// whatever the reported status. The status only matters to `policy`.
pub fn build_program<D: GraphicsDevice>(
    device: &D,
    vertex: &StageSource,
    fragment: &StageSource,
    policy: ShaderPolicy,
) -> Result<ProgramBuild<D::Program>, ShaderError> {
    debug_assert_eq!(vertex.stage, ShaderStage::Vertex);
    debug_assert_eq!(fragment.stage, ShaderStage::Fragment);

    let (vs, vertex_report) = compile_stage(device, vertex)?;
    let (fs, fragment_report) = match compile_stage(device, fragment) {
        Ok(compiled) => compiled,
        Err(e) => {
            device.delete_shader(vs);
            return Err(e);
        }
    };

    log::info!("linking program");
    let program = match device.create_program() {
        Ok(program) => program,
        Err(e) => {
            device.delete_shader(vs);
            device.delete_shader(fs);
            return Err(e.into());
        }
    };

    device.attach_shader(program, vs);
    device.attach_shader(program, fs);
    device.link_program(program);

    let linked = device.program_link_status(program);
    let link_log = non_empty(device.program_info_log(program));
    if let Some(text) = &link_log {
        print_log(linked, text);
    }

    // Linked code lives in the program; the stage objects are no longer needed.
    device.detach_shader(program, vs);
    device.detach_shader(program, fs);
    device.delete_shader(vs);
    device.delete_shader(fs);

    let build = ProgramBuild {
        program,
        vertex: vertex_report,
        fragment: fragment_report,
        link: LinkReport {
            linked,
            log: link_log,
        },
    };

    match policy {
        ShaderPolicy::Lenient => Ok(build),
        ShaderPolicy::Strict => match build.failure() {
            None => Ok(build),
            Some(err) => {
                device.delete_program(program);
                Err(err)
            }
        },
    }
}

fn compile_stage<D: GraphicsDevice>(
    device: &D,
    source: &StageSource,
) -> Result<(D::Shader, StageReport), ShaderError> {
    log::info!("compiling shader: {}", source.origin);

    let shader = device.create_shader(source.stage)?;
    device.shader_source(shader, &source.text);
    device.compile_shader(shader);

    let compiled = device.shader_compile_status(shader);
    let log = non_empty(device.shader_info_log(shader));
    if let Some(text) = &log {
        print_log(compiled, text);
    }

    Ok((
        shader,
        StageReport {
            stage: source.stage,
            origin: source.origin.clone(),
            compiled,
            log,
        },
    ))
}

/// Drivers may pad logs with whitespace or a trailing NUL.
fn non_empty(log: String) -> Option<String> {
    let trimmed = log.trim_end_matches(|c: char| c == '\0' || c.is_whitespace());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn print_log(ok: bool, text: &str) {
    if ok {
        log::info!("{text}");
    } else {
        log::warn!("{text}");
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::testing::{Call, RecordingDevice};

    const VERTEX: &str = "#version 330 core\n\
        layout(location = 0) in vec3 position;\n\
        void main() { gl_Position = vec4(position, 1.0); }\n";
    const FRAGMENT: &str = "#version 330 core\n\
        out vec3 color;\n\
        void main() { color = vec3(1, 0, 0); }\n";
    const BROKEN_VERTEX: &str = "#version 330 core\n\
        layout(location = 0) in vec3 position;\n\
        void mian() { gl_Position = vec4(position, 1.0) }\n";

    fn vertex(text: &str) -> StageSource {
        StageSource::new(ShaderStage::Vertex, "test.vertexshader", text)
    }

    fn fragment(text: &str) -> StageSource {
        StageSource::new(ShaderStage::Fragment, "test.fragmentshader", text)
    }

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    // ── build_program ─────────────────────────────────────────────────────

    #[test]
    fn valid_sources_link_without_diagnostics() {
        let dev = RecordingDevice::new();
        let build = build_program(
            &dev,
            &vertex(VERTEX),
            &fragment(FRAGMENT),
            ShaderPolicy::Lenient,
        )
        .unwrap();

        assert_ne!(build.program, 0);
        assert!(build.is_clean());
        assert_eq!(build.diagnostics().count(), 0);
        assert!(dev.is_linked(build.program));
    }

    #[test]
    fn stages_are_released_after_link() {
        let dev = RecordingDevice::new();
        let build = build_program(
            &dev,
            &vertex(VERTEX),
            &fragment(FRAGMENT),
            ShaderPolicy::Lenient,
        )
        .unwrap();

        assert_eq!(dev.live_shaders(), 0);
        assert_eq!(dev.live_programs(), 1);

        let calls = dev.calls();
        let link = calls
            .iter()
            .position(|c| matches!(c, Call::LinkProgram { .. }))
            .unwrap();
        let detaches: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                matches!(c, Call::DetachShader { program, .. } if *program == build.program)
            })
            .map(|(i, _)| i)
            .collect();
        assert_eq!(detaches.len(), 2);
        assert!(detaches.iter().all(|i| *i > link));
    }

    #[test]
    fn lenient_build_continues_past_compile_failure() {
        let dev = RecordingDevice::new();
        let build = build_program(
            &dev,
            &vertex(BROKEN_VERTEX),
            &fragment(FRAGMENT),
            ShaderPolicy::Lenient,
        )
        .unwrap();

        assert_ne!(build.program, 0);
        assert!(!build.vertex.compiled);
        assert!(build.vertex.log.as_deref().is_some_and(|l| !l.is_empty()));
        assert!(build.fragment.compiled);
        assert!(build.fragment.log.is_none());
        // Link is still attempted and its log surfaced.
        assert!(!build.link.linked);
        assert!(build.link.log.is_some());
        assert!(!build.is_clean());
        assert_eq!(build.diagnostics().count(), 2);
    }

    #[test]
    fn strict_build_rejects_compile_failure_and_deletes_program() {
        let dev = RecordingDevice::new();
        let err = build_program(
            &dev,
            &vertex(BROKEN_VERTEX),
            &fragment(FRAGMENT),
            ShaderPolicy::Strict,
        )
        .unwrap_err();

        match err {
            ShaderError::Compile { stage, origin, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert_eq!(origin, "test.vertexshader");
                assert!(!log.is_empty());
            }
            other => panic!("expected compile error, got {other:?}"),
        }
        assert_eq!(dev.live_programs(), 0);
        assert_eq!(dev.live_shaders(), 0);
    }

    #[test]
    fn strict_build_passes_clean_sources() {
        let dev = RecordingDevice::new();
        let build = build_program(
            &dev,
            &vertex(VERTEX),
            &fragment(FRAGMENT),
            ShaderPolicy::Strict,
        )
        .unwrap();
        assert!(build.is_clean());
    }

    #[test]
    fn into_checked_applies_strict_policy_later() {
        let dev = RecordingDevice::new();
        let build = build_program(
            &dev,
            &vertex(VERTEX),
            &fragment(BROKEN_VERTEX),
            ShaderPolicy::Lenient,
        )
        .unwrap();
        let program = build.program;

        let err = build.into_checked(&dev).unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: ShaderStage::Fragment, .. }));
        assert!(dev.calls().contains(&Call::DeleteProgram { program }));
    }

    #[test]
    fn rebuilding_same_sources_yields_independent_programs() {
        let dev = RecordingDevice::new();
        let (vs, fs) = (vertex(VERTEX), fragment(FRAGMENT));

        let a = build_program(&dev, &vs, &fs, ShaderPolicy::Strict).unwrap();
        let b = build_program(&dev, &vs, &fs, ShaderPolicy::Strict).unwrap();

        assert_ne!(a.program, b.program);
        assert!(dev.is_linked(a.program));
        assert!(dev.is_linked(b.program));
        assert_eq!(a.diagnostics().count(), 0);
        assert_eq!(b.diagnostics().count(), 0);
    }

    #[test]
    fn program_creation_failure_releases_stages() {
        let dev = RecordingDevice::new();
        dev.fail_program_creation();

        let err = build_program(
            &dev,
            &vertex(VERTEX),
            &fragment(FRAGMENT),
            ShaderPolicy::Lenient,
        )
        .unwrap_err();

        assert!(matches!(err, ShaderError::Device(_)));
        assert_eq!(dev.live_shaders(), 0);
    }

    // ── load_program ──────────────────────────────────────────────────────

    #[test]
    fn loads_fixture_files() {
        let dev = RecordingDevice::new();
        let paths = ShaderPaths::new(
            fixture("passthrough.vertexshader"),
            fixture("red.fragmentshader"),
        );

        let build = load_program(&dev, &paths, ShaderPolicy::Strict).unwrap();
        assert!(build.is_clean());
        assert!(build.vertex.origin.ends_with("passthrough.vertexshader"));
    }

    #[test]
    fn fixture_with_syntax_error_still_returns_program() {
        let dev = RecordingDevice::new();
        let paths = ShaderPaths::new(fixture("broken.vertexshader"), fixture("red.fragmentshader"));

        let build = load_program(&dev, &paths, ShaderPolicy::Lenient).unwrap();
        assert_ne!(build.program, 0);
        assert!(build.vertex.log.is_some());
    }

    #[test]
    fn missing_vertex_file_reports_and_touches_nothing() {
        let dev = RecordingDevice::new();
        let paths = ShaderPaths::new(
            fixture("does-not-exist.vertexshader"),
            fixture("red.fragmentshader"),
        );

        let err = load_program(&dev, &paths, ShaderPolicy::Lenient).unwrap_err();
        assert!(matches!(err, ShaderError::Open { stage: ShaderStage::Vertex, .. }));
        assert!(err.to_string().starts_with("impossible to open"));
        assert!(err.to_string().contains("does-not-exist.vertexshader"));
        assert!(dev.calls().is_empty());
    }

    #[test]
    fn missing_fragment_file_compiles_empty_stage_when_lenient() {
        let dev = RecordingDevice::new();
        let paths = ShaderPaths::new(
            fixture("passthrough.vertexshader"),
            fixture("missing.fragmentshader"),
        );

        let build = load_program(&dev, &paths, ShaderPolicy::Lenient).unwrap();
        assert!(build.vertex.compiled);
        assert!(!build.fragment.compiled);
        assert!(!build.link.linked);
        assert!(build.link.log.is_some());
        assert_eq!(dev.live_programs(), 1);
    }

    #[test]
    fn missing_fragment_file_is_an_error_when_strict() {
        let dev = RecordingDevice::new();
        let paths = ShaderPaths::new(
            fixture("passthrough.vertexshader"),
            fixture("missing.fragmentshader"),
        );

        let err = load_program(&dev, &paths, ShaderPolicy::Strict).unwrap_err();
        assert!(matches!(err, ShaderError::Open { stage: ShaderStage::Fragment, .. }));
        assert!(dev.calls().is_empty());
    }

    #[test]
    fn driver_log_padding_is_trimmed() {
        assert_eq!(non_empty("\0".to_string()), None);
        assert_eq!(non_empty("  \n".to_string()), None);
        assert_eq!(non_empty("bad\n\0".to_string()).as_deref(), Some("bad"));
    }
}
