/// Convenience result type used across vernissage.
pub type VernissageResult<T> = Result<T, VernissageError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Most runtime failures in the reveal sequence are cosmetic and are absorbed
/// where they happen (logged, then held on a safe frame). These variants cover
/// the places where a caller can still act: configuration, asset preparation,
/// and explicit API misuse.
#[derive(thiserror::Error, Debug)]
pub enum VernissageError {
    /// Invalid user-provided configuration or layout data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Sprite sheet or artwork could not be decoded or measured.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors while scheduling or sampling animation state.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VernissageError {
    /// Build a [`VernissageError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VernissageError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`VernissageError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`VernissageError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for VernissageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
