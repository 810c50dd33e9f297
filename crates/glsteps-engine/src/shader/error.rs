use std::io;
use std::path::PathBuf;

use crate::device::{DeviceError, ShaderStage};

/// Why a shader program could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    /// A stage source file could not be read.
    #[error("impossible to open {}. Are you in the right directory?", .path.display())]
    Open {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stage source file was read but is not UTF-8 text.
    #[error("{stage} shader {} is not valid UTF-8 text", .path.display())]
    Encoding {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stage failed to compile; `log` is the driver's info log.
    #[error("{stage} shader {origin} failed to compile:\n{log}")]
    Compile {
        stage: ShaderStage,
        origin: String,
        log: String,
    },

    /// The program failed to link; `log` is the driver's info log.
    #[error("program failed to link:\n{log}")]
    Link { log: String },

    #[error(transparent)]
    Device(#[from] DeviceError),
}
