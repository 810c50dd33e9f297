use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::device::ShaderStage;

use super::ShaderError;

/// Vertex and fragment source file locations for one program.
///
/// Relative paths resolve against the process working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl ShaderPaths {
    pub fn new(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// Source text for one stage, plus where it came from (used in log lines).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSource {
    pub stage: ShaderStage,
    pub origin: String,
    pub text: String,
}

impl StageSource {
    pub fn new(stage: ShaderStage, origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            stage,
            origin: origin.into(),
            text: text.into(),
        }
    }

    /// Reads the whole file at `path` as UTF-8.
    pub fn read(stage: ShaderStage, path: &Path) -> Result<Self, ShaderError> {
        let text = fs::read_to_string(path).map_err(|source| {
            let path = path.to_path_buf();
            match source.kind() {
                io::ErrorKind::InvalidData => ShaderError::Encoding { stage, path, source },
                _ => ShaderError::Open { stage, path, source },
            }
        })?;
        Ok(Self::new(stage, path.display().to_string(), text))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    #[test]
    fn reads_whole_file_and_keeps_its_origin() {
        let source =
            StageSource::read(ShaderStage::Fragment, &fixture("red.fragmentshader")).unwrap();
        assert!(source.text.contains("void main("));
        assert!(source.origin.ends_with("red.fragmentshader"));
    }

    #[test]
    fn missing_file_cannot_be_opened() {
        let err =
            StageSource::read(ShaderStage::Vertex, &fixture("absent.vertexshader")).unwrap_err();
        assert!(matches!(err, ShaderError::Open { stage: ShaderStage::Vertex, .. }));
    }

    #[test]
    fn non_utf8_file_is_an_encoding_error() {
        let err = StageSource::read(ShaderStage::Fragment, &fixture("latin1.fragmentshader"))
            .unwrap_err();
        assert!(matches!(err, ShaderError::Encoding { stage: ShaderStage::Fragment, .. }));
        let message = err.to_string();
        assert!(message.contains("not valid UTF-8"), "{message}");
        assert!(!message.contains("right directory"), "{message}");
    }
}
