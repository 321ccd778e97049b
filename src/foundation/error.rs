/// Convenience result type used across Timewave.
pub type TimewaveResult<T> = Result<T, TimewaveError>;

/// Top-level error taxonomy used by inspector APIs.
#[derive(thiserror::Error, Debug)]
pub enum TimewaveError {
    /// Invalid user-provided timing, keyframe or option data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An easing identifier that is neither a known preset nor a well-formed `cubic-bezier(...)`.
    #[error("invalid easing format: {0}")]
    InvalidEasingFormat(String),

    /// The timeline engine could not produce a computed value for a property.
    #[error("sampling error: {0}")]
    Sampling(String),

    /// Errors while drawing, encoding or compositing raster layers.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TimewaveError {
    /// Build a [`TimewaveError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TimewaveError::InvalidEasingFormat`] value.
    pub fn invalid_easing(msg: impl Into<String>) -> Self {
        Self::InvalidEasingFormat(msg.into())
    }

    /// Build a [`TimewaveError::Sampling`] value.
    pub fn sampling(msg: impl Into<String>) -> Self {
        Self::Sampling(msg.into())
    }

    /// Build a [`TimewaveError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TimewaveError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
