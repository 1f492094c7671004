use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SizeMismatch { expected: usize, actual: usize },
    OutOfBounds,
    /// No contour is eligible under the requested retrieval mode.
    EmptyInput,
    /// A raw property name that is not part of the property vocabulary.
    UnknownProperty(String),
    /// The contour encloses zero area, so an area ratio is undefined.
    DegenerateShape,
    InvalidSampleCount(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::EmptyInput => write!(f, "no eligible contour"),
            Self::UnknownProperty(name) => write!(f, "unknown property `{name}`"),
            Self::DegenerateShape => write!(f, "degenerate shape: contour has zero area"),
            Self::InvalidSampleCount(k) => {
                write!(f, "invalid sample count {k}: at least one sample is required")
            }
        }
    }
}

impl std::error::Error for Error {}
