/// Convenience result type used across slideflow.
pub type SlideResult<T> = Result<T, SlideError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum SlideError {
    /// Invalid user-provided or document data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Structural problems in the composed slide tree.
    #[error("layout error: {0}")]
    Layout(String),

    /// Playback requested in a state that cannot serve it.
    #[error("playback error: {0}")]
    Playback(String),

    /// Password or unsafe-content gate failures.
    #[error("gate error: {0}")]
    Gate(String),

    /// Element renderer failures (e.g. throwing widget code).
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlideError {
    /// Build a [`SlideError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SlideError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`SlideError::Playback`] value.
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Build a [`SlideError::Gate`] value.
    pub fn gate(msg: impl Into<String>) -> Self {
        Self::Gate(msg.into())
    }

    /// Build a [`SlideError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SlideError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
