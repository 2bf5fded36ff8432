//! @ai:module:intent Define error types for palette resolution, validation and session sync
//! @ai:module:layer domain
//! @ai:module:public_api Error, ConfigurationError, ValidationError, Result
//! @ai:module:stateless true

use thiserror::Error;

/// @ai:intent Invalid static configuration, raised before any render
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Colors and labels must be the same length ({colors} colors for {labels} labels)")]
    ColorCountMismatch { labels: usize, colors: usize },

    #[error("Label set is empty, no default selected label exists")]
    EmptyLabelSet,

    #[error("Duplicate label `{0}` in label set")]
    DuplicateLabel(String),

    #[error("Selected label `{0}` is not in the label set")]
    UnknownSelectedLabel(String),
}

/// @ai:intent A supplied or returned annotation breaks the data model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Annotation {index}: unknown tag `{tag}`")]
    UnknownTag { index: usize, tag: String },

    #[error("Annotation {index}: span [{start}, {end}) is invalid for text of length {len}")]
    InvalidSpan {
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Annotation {index}: text `{found}` does not match source `{expected}`")]
    TextMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("Annotation {index}: color `{found}` for tag `{tag}` does not match palette color `{expected}`")]
    ColorMismatch {
        index: usize,
        tag: String,
        expected: String,
        found: String,
    },
}

impl ValidationError {
    /// @ai:intent Position of the offending annotation in its collection
    /// @ai:effects pure
    pub fn index(&self) -> usize {
        match self {
            Self::UnknownTag { index, .. }
            | Self::InvalidSpan { index, .. }
            | Self::TextMismatch { index, .. }
            | Self::ColorMismatch { index, .. } => *index,
        }
    }

    /// @ai:intent Stable issue code used in audit reports
    /// @ai:effects pure
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownTag { .. } => "E001",
            Self::InvalidSpan { .. } => "E002",
            Self::TextMismatch { .. } => "E003",
            Self::ColorMismatch { .. } => "E004",
        }
    }
}

/// @ai:intent Unified error type for all highlighter operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Rendering surface error: {0}")]
    Surface(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
