//! The lessons: each binary picks one entry of the [`catalog`] and hands it
//! to [`run`].

pub mod catalog;
mod lesson;

use std::process::ExitCode;

use glsteps_engine::device::GlInit;
use glsteps_engine::logging::{init_logging, LoggingConfig};
use glsteps_engine::window::{RunError, Runtime, RuntimeConfig};

pub use lesson::{Lesson, LessonApp};

/// Exit status when the window, the context or the scene cannot be set up.
pub const BOOTSTRAP_FAILURE: u8 = 255;

/// Exit status for failures after setup.
pub const FRAME_FAILURE: u8 = 1;

/// Opens the lesson's window and renders until Escape or close.
pub fn run(lesson: Lesson) -> ExitCode {
    init_logging(LoggingConfig::default());
    log::info!("starting '{}'", lesson.title);

    let config = RuntimeConfig::default().with_title(lesson.title);
    match Runtime::run(config, GlInit::default(), LessonApp::new(lesson.scene)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

fn exit_status(err: &RunError) -> u8 {
    match err {
        RunError::Bootstrap(_) => BOOTSTRAP_FAILURE,
        RunError::Frame(_) => FRAME_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_setup_failures_exit_with_255() {
        let setup = RunError::Bootstrap(anyhow::anyhow!("no GL config"));
        let present = RunError::Frame(anyhow::anyhow!("failed to present frame"));
        assert_eq!(exit_status(&setup), 255);
        assert_eq!(exit_status(&present), 1);
    }
}
