use thiserror::Error;

/// Error surface for every progression operation. `Validation` and
/// `Forbidden` leave all state unchanged and are user-correctable;
/// `Storage` is fatal to the triggering operation and never retried.
#[derive(Debug, Clone, Error)]
pub enum TrackerError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("storage: {0}")]
    Storage(String),
}

impl TrackerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
