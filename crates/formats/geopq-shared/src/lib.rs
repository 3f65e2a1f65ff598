//! Error and position types shared by the `geopq` format crates.

use std::error::Error as StdError;
use std::fmt;

/// A position within a source file, such as a line of a GeoJSON sequence.
///
/// All indices are 1-based where possible to align with human expectations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePosition {
    /// Line number in the source (1-based)
    pub line: Option<u64>,
    /// Column number in the source (1-based)
    pub column: Option<u64>,
    /// Byte offset from the start of the source
    pub byte_offset: Option<u64>,
    /// Logical feature number reported by the parser (1-based)
    pub feature: Option<u64>,
}

impl SourcePosition {
    /// Returns true when the position does not contain any location metadata.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line.is_none()
            && self.column.is_none()
            && self.byte_offset.is_none()
            && self.feature.is_none()
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if let Some(line) = self.line {
            parts.push(format!("line {line}"));
        }
        if let Some(column) = self.column {
            parts.push(format!("column {column}"));
        }
        if let Some(feature) = self.feature {
            parts.push(format!("feature {feature}"));
        }
        if let Some(byte) = self.byte_offset {
            parts.push(format!("byte {byte}"));
        }

        if parts.is_empty() {
            write!(f, "unknown position")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Errors raised while reading or writing spatial file formats.
#[derive(Debug)]
pub enum SpatialFormatError {
    /// An underlying I/O failure occurred.
    Io {
        /// The originating error.
        source: std::io::Error,
        /// Optional context describing what was being read or written.
        context: Option<String>,
    },
    /// Parsing failed for the input source.
    Parse {
        /// Human readable description of the failure.
        message: String,
        /// Optional position describing where the failure occurred.
        position: Option<SourcePosition>,
        /// Optional context describing what was being read.
        context: Option<String>,
    },
    /// Encoding or persisting output failed.
    Write {
        /// Human readable description of the failure.
        message: String,
        /// Optional context describing what was being written.
        context: Option<String>,
    },
    /// Other error type not classified above.
    Other {
        /// Human readable description of the failure.
        message: String,
    },
}

impl SpatialFormatError {
    fn fmt_context(context: Option<&str>, verb: &str) -> String {
        context
            .map(|c| format!(" while {verb} {c}"))
            .unwrap_or_default()
    }

    fn fmt_position(position: Option<&SourcePosition>) -> String {
        position
            .filter(|pos| !pos.is_empty())
            .map(|pos| format!(" at {pos}"))
            .unwrap_or_default()
    }

    /// Attach additional context to the error, returning the updated error.
    #[must_use]
    pub fn with_additional_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        match &mut self {
            SpatialFormatError::Io {
                context: existing, ..
            }
            | SpatialFormatError::Parse {
                context: existing, ..
            }
            | SpatialFormatError::Write {
                context: existing, ..
            } => match existing {
                Some(existing) if !existing.is_empty() => {
                    existing.push_str("; ");
                    existing.push_str(&context);
                },
                _ => *existing = Some(context),
            },
            SpatialFormatError::Other { message } => {
                message.push_str(" (");
                message.push_str(&context);
                message.push(')');
            },
        }
        self
    }

    /// Line number attached to a parse failure, if known.
    #[must_use]
    pub fn line(&self) -> Option<u64> {
        match self {
            SpatialFormatError::Parse {
                position: Some(position),
                ..
            } => position.line,
            _ => None,
        }
    }
}

impl fmt::Display for SpatialFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialFormatError::Io { source, context } => {
                write!(
                    f,
                    "I/O error{}: {source}",
                    Self::fmt_context(context.as_deref(), "accessing")
                )
            },
            SpatialFormatError::Parse {
                message,
                position,
                context,
            } => write!(
                f,
                "Parse error{}{}: {message}",
                Self::fmt_context(context.as_deref(), "reading"),
                Self::fmt_position(position.as_ref())
            ),
            SpatialFormatError::Write { message, context } => write!(
                f,
                "Write error{}: {message}",
                Self::fmt_context(context.as_deref(), "writing")
            ),
            SpatialFormatError::Other { message } => f.write_str(message),
        }
    }
}

impl StdError for SpatialFormatError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SpatialFormatError::Io { source, .. } => Some(source),
            SpatialFormatError::Parse { .. }
            | SpatialFormatError::Write { .. }
            | SpatialFormatError::Other { .. } => None,
        }
    }
}

impl From<std::io::Error> for SpatialFormatError {
    fn from(source: std::io::Error) -> Self {
        SpatialFormatError::Io {
            source,
            context: None,
        }
    }
}

/// Result type alias that uses [`SpatialFormatError`].
pub type SpatialFormatResult<T> = Result<T, SpatialFormatError>;
