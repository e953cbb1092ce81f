use thiserror::Error;

#[derive(Error, Debug)]
pub enum PresubmitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PresubmitError>;

/// Failure of a single page submission.
///
/// Cloneable so that a page can keep its own failure reason while the batch
/// reports it to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("Image could not be encoded")]
    InvalidImage,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response from annotation service")]
    InvalidResponse,

    #[error("Authentication failed")]
    AuthenticationError,

    #[error("Server error: {0}")]
    ServerError(String),
}

impl AnnotationError {
    /// Whether the caller should send the user back through sign-in.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AnnotationError::AuthenticationError)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Image has zero intrinsic width")]
    ZeroWidthImage,

    #[error("Viewport width must be finite and non-negative, got {0}")]
    InvalidViewport(f64),
}

impl serde::Serialize for PresubmitError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl serde::Serialize for AnnotationError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
