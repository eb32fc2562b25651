/// Crate-wide result alias.
pub type CarouselResult<T> = Result<T, CarouselError>;

/// Errors produced by the slide store, renderer, exporter and generator.
#[derive(thiserror::Error, Debug)]
pub enum CarouselError {
    /// Input data failed validation (bad request, unknown font, malformed data URI, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// The renderer could not produce pixels for a plan.
    #[error("render error: {0}")]
    Render(String),

    /// The text-completion call failed in transport or upstream.
    #[error("generation error: {0}")]
    Generation(String),

    /// No text-completion backend is configured or loadable.
    #[error("generation backend unavailable: {0}")]
    BackendUnavailable(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, typically I/O with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CarouselError {
    /// Build a [`CarouselError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CarouselError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CarouselError::Generation`].
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Build a [`CarouselError::BackendUnavailable`].
    pub fn backend_unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Build a [`CarouselError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for CarouselError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}
