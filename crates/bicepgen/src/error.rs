//! error taxonomy
//!
//! - [NameError]: a symbolic name is unusable (raised when the name is assigned)
//! - [ValidationError]: a resource's field combination breaks one of its rules (raised before construction)
//! - [ExpressionError]: a composite [crate::value::Value] cannot be built consistently
//! - [Error]: everything a render can fail with
//!
//! All of them abort the render they occur in. There is no partial output.
use crate::resource::{ResourceName, Stage};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("name must not be empty")]
    Empty,
    #[error("name `{name}` contains `{character}`, only A-Z, a-z, 0-9 and _ are allowed")]
    InvalidCharacter { name: String, character: char },
    #[error("name `{name}` must be between {min} and {max} characters long")]
    Length { name: String, min: usize, max: usize },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("`{first}` and `{second}` are mutually exclusive")]
    MutuallyExclusive {
        first: &'static str,
        second: &'static str,
    },
    #[error("`{field}` is required {reason}")]
    MissingField { field: &'static str, reason: String },
    #[error("`{field}` is {value} but must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("{message}")]
    Unsupported { message: String },
}

impl ValidationError {
    pub fn missing(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MissingField {
            field,
            reason: reason.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    #[error(
        "interpolated string has {literals} literal and {expressions} expression segments, \
         expected one more literal than expressions"
    )]
    SegmentMismatch { literals: usize, expressions: usize },
    #[error("property path must not be empty")]
    EmptyPath,
    #[error("property path `{path}` has an invalid segment `{segment}`")]
    InvalidPathSegment { path: String, segment: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error("resource `{resource}` is invalid ({stage}): {source}")]
    Validation {
        resource: String,
        stage: Stage,
        #[source]
        source: ValidationError,
    },
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    #[error("unsupported {kind}: {variant}")]
    UnsupportedVariant { kind: &'static str, variant: String },
    #[error("`{name}` is declared more than once")]
    DuplicateSymbol { name: String },
    #[error("seeds `{first}` and `{second}` both allocate identifier `{identifier}`")]
    IdentifierCollision {
        identifier: String,
        first: String,
        second: String,
    },
}

impl Error {
    /// `resource` failed its validation rules
    pub fn invalid(resource: &ResourceName, source: ValidationError) -> Self {
        Error::Validation {
            resource: resource.to_string(),
            stage: Stage::Validating,
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
