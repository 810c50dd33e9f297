/// Failure reported by the graphics device while creating an object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("failed to create {object}: {message}")]
    Create {
        object: &'static str,
        message: String,
    },
}

impl DeviceError {
    pub(crate) fn create(object: &'static str, message: impl Into<String>) -> Self {
        Self::Create { object, message: message.into() }
    }
}
