//! Error types for kyroscan.
//!
//! Every failure is a typed value. A [`ConvertError`] describes why a single
//! driver value could not be stored into a single destination; a
//! [`ScanError`] adds row-level context on top of it. Messages follow the
//! wording existing SQL tooling already matches on.

use thiserror::Error;

/// Failure to store one driver value into one destination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The destination is absent.
    #[error("destination not a pointer")]
    InvalidTarget,

    /// The value does not fit the destination width.
    #[error(
        "converting driver.Value type {src_type} ({text:?}) to a {dest_kind}: value out of range"
    )]
    OutOfRange {
        /// Type name of the source value.
        src_type: &'static str,
        /// Textual form of the source value.
        text: String,
        /// Primitive kind of the destination.
        dest_kind: &'static str,
    },

    /// The text could not be parsed as the destination's numeric form.
    #[error("converting driver.Value type {src_type} ({text:?}) to a {dest_kind}: invalid syntax")]
    InvalidSyntax {
        /// Type name of the source value.
        src_type: &'static str,
        /// Textual form of the source value.
        text: String,
        /// Primitive kind of the destination.
        dest_kind: &'static str,
    },

    /// Boolean coercion failed. `value` is already rendered for display.
    #[error("sql/driver: couldn't convert {value} into type bool")]
    NotBool {
        /// Rendered source value.
        value: String,
    },

    /// No coercion path exists between the source kind and the destination.
    #[error("unsupported Scan, storing driver.Value type {src_type} into type {dest_type}")]
    Unsupported {
        /// Type name of the source value.
        src_type: &'static str,
        /// Type name of the destination.
        dest_type: &'static str,
    },

    /// A NULL was given to a destination that cannot represent it.
    #[error("converting NULL to {dest_kind} is unsupported")]
    NullUnsupported {
        /// Primitive kind of the destination.
        dest_kind: &'static str,
    },

    /// An unsigned parameter does not fit a signed 64-bit value.
    #[error("uint64 values with high bit set are not supported")]
    UintHighBit {
        /// The rejected value.
        value: u64,
    },

    /// An integer parameter does not fit 32 signed bits.
    #[error("sql/driver: value {value} overflows int32")]
    Int32Overflow {
        /// The rejected value.
        value: i64,
    },

    /// A text parameter is not an integer.
    #[error("sql/driver: value {text:?} can't be converted to int32")]
    Int32Syntax {
        /// The rejected text.
        text: String,
    },

    /// A parameter kind the int32 rule does not accept.
    #[error("sql/driver: unsupported value {value} (type {src_type}) converting to int32")]
    Int32Unsupported {
        /// Rendered source value.
        value: String,
        /// Type name of the source value.
        src_type: &'static str,
    },

    /// Failure reported by a user `Scanner` or `Valuer` implementation.
    #[error("{message}")]
    Custom {
        /// Free-form message.
        message: String,
    },
}

/// Coarse classification of [`ConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Destination is not a writable reference.
    InvalidTarget,
    /// Value does not fit the destination width.
    Range,
    /// Text could not be parsed.
    Syntax,
    /// Boolean coercion failed.
    Unconvertible,
    /// No coercion path exists.
    Unsupported,
}

impl ConvertError {
    /// Creates a custom error, for use by `Scanner` and `Valuer` implementations.
    #[must_use]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }

    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTarget => ErrorKind::InvalidTarget,
            Self::OutOfRange { .. } | Self::UintHighBit { .. } | Self::Int32Overflow { .. } => {
                ErrorKind::Range
            }
            Self::InvalidSyntax { .. } | Self::Int32Syntax { .. } => ErrorKind::Syntax,
            Self::NotBool { .. } => ErrorKind::Unconvertible,
            Self::Unsupported { .. }
            | Self::NullUnsupported { .. }
            | Self::Int32Unsupported { .. }
            | Self::Custom { .. } => ErrorKind::Unsupported,
        }
    }

    /// True for a missing destination.
    #[must_use]
    pub const fn is_invalid_target(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidTarget)
    }

    /// True for width overflows.
    #[must_use]
    pub const fn is_range(&self) -> bool {
        matches!(self.kind(), ErrorKind::Range)
    }

    /// True for unparsable text.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self.kind(), ErrorKind::Syntax)
    }

    /// True for failed boolean coercion.
    #[must_use]
    pub const fn is_unconvertible(&self) -> bool {
        matches!(self.kind(), ErrorKind::Unconvertible)
    }

    /// True when no coercion path exists.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.kind(), ErrorKind::Unsupported)
    }

    /// Conversion failures describe a schema mismatch or a driver contract
    /// violation; retrying never helps.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

/// Failure while scanning a whole row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The destination count differs from the column count.
    #[error("sql: expected {expected} destination arguments in Scan, not {got}")]
    ColumnCount {
        /// Number of columns in the row.
        expected: usize,
        /// Number of destinations supplied.
        got: usize,
    },

    /// A single column failed to convert.
    #[error("sql: Scan error on column index {index}, name {name:?}: {source}")]
    Column {
        /// Zero-based column index.
        index: usize,
        /// Column name.
        name: String,
        /// The underlying conversion failure.
        #[source]
        source: ConvertError,
    },
}

impl ScanError {
    /// Returns the conversion failure behind a column error, if any.
    #[must_use]
    pub const fn conversion(&self) -> Option<&ConvertError> {
        match self {
            Self::Column { source, .. } => Some(source),
            Self::ColumnCount { .. } => None,
        }
    }
}

/// Result type alias for single-value conversions.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Result type alias for row scans.
pub type ScanResult<T> = Result<T, ScanError>;
