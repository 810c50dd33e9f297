//! Shader program builder.
//!
//! Reads stage sources, compiles them, links a program and surfaces every
//! non-empty driver log. What happens after a reported failure is chosen by
//! the caller through [`ShaderPolicy`].

mod error;
mod program;
mod source;

pub use error::ShaderError;
pub use program::{
    build_program, load_program, LinkReport, ProgramBuild, ShaderPolicy, StageReport,
};
pub use source::{ShaderPaths, StageSource};
pub use crate::device::ShaderStage;
