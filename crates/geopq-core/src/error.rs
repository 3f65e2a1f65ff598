//! Custom error types for `geopq` operations.
//!
//! Every fatal condition of a conversion is reported through [`GeoPqError`],
//! which carries a short message plus the underlying cause. [`GeoPqError::kind`]
//! tells callers which stage failed without matching on lower-level error shapes.
//! Property coercion mismatches are not errors; they are recovered as nulls.

use std::path::PathBuf;

use geopq_shared::SpatialFormatError;
use thiserror::Error;

/// Main error type for `geopq` operations.
///
/// It uses `#[error(transparent)]` to delegate display formatting to the
/// underlying error variants.
#[derive(Debug, Error)]
pub enum GeoPqError {
    /// I/O errors (file read/write, path issues)
    #[error(transparent)]
    Io(#[from] IoError),

    /// Format parsing, geometry encoding and schema errors
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input could not be read, parsed, or held no features.
    Input,
    /// A feature geometry could not be encoded.
    GeometryEncoding,
    /// The output file could not be assembled or written.
    Output,
    /// Options or paths supplied by the caller are invalid.
    Config,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::GeometryEncoding => "geometry encoding",
            Self::Output => "output",
            Self::Config => "configuration",
        }
    }
}

/// I/O related errors.
#[derive(Debug, Error)]
pub enum IoError {
    /// Failed to read from a file
    #[error("Failed to read {format} file '{path}': {source}")]
    Read {
        /// The format being read (e.g., "`GeoJSON`")
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to write to a file
    #[error("Failed to write {format} file '{path}': {source}")]
    Write {
        /// The format being written
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Path is invalid
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path
        path: PathBuf,
        /// Why the path is invalid
        reason: String,
    },

    /// File was not found
    #[error("File not found: '{path}'")]
    FileNotFound {
        /// The missing file path
        path: PathBuf,
    },

    /// Permission denied
    #[error("Permission denied: '{path}'")]
    PermissionDenied {
        /// The path that couldn't be accessed
        path: PathBuf,
    },
}

/// Format parsing, encoding and schema errors.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Failed to parse a format
    #[error("Failed to parse {format} at line {line}: {message}", line = line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    Parse {
        /// The format being parsed
        format: String,
        /// The line number where parsing failed (if available)
        line: Option<u64>,
        /// Description of the parse error
        message: String,
    },

    /// The input parsed but held no features
    #[error("No features found in '{path}'")]
    NoFeatures {
        /// The input path, or a description of the in-memory source
        path: PathBuf,
    },

    /// A feature geometry could not be encoded
    #[error("Failed to encode geometry of feature {feature_index}: {message}")]
    GeometryEncoding {
        /// Zero-based index of the feature in the input
        feature_index: usize,
        /// Description of the encoding problem
        message: String,
    },

    /// The inferred schema could not be materialized
    #[error("Schema error: {message}")]
    Schema {
        /// Description of the schema problem
        message: String,
    },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid option value
    #[error("Invalid {option} option: {message}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why it's invalid
        message: String,
    },
}

/// Type alias for Results using `GeoPqError`.
pub type Result<T> = std::result::Result<T, GeoPqError>;

impl GeoPqError {
    /// The pipeline stage this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(
                IoError::Read { .. } | IoError::FileNotFound { .. } | IoError::PermissionDenied { .. },
            )
            | Self::Format(FormatError::Parse { .. } | FormatError::NoFeatures { .. }) => {
                ErrorKind::Input
            },
            Self::Format(FormatError::GeometryEncoding { .. }) => ErrorKind::GeometryEncoding,
            Self::Io(IoError::Write { .. }) | Self::Format(FormatError::Schema { .. }) => {
                ErrorKind::Output
            },
            Self::Io(IoError::InvalidPath { .. }) | Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Get a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Io(e) => e.user_message(),
            Self::Format(e) => e.user_message(),
            Self::Config(e) => format!("Configuration error: {e}"),
        }
    }

    /// Get recovery suggestions if available.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Io(e) => e.recovery_suggestion(),
            Self::Format(e) => e.recovery_suggestion(),
            Self::Config(_) => Some("Run 'geopq generate --help' to see valid options.".to_string()),
        }
    }

    /// Check if this error is potentially recoverable.
    ///
    /// Recoverable errors might be fixed by retrying with different parameters.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Config)
    }

    /// Wrap a reader error with the input path it concerns.
    #[must_use]
    pub fn from_read_error(format: &str, path: impl Into<PathBuf>, err: SpatialFormatError) -> Self {
        match err {
            SpatialFormatError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                IoError::FileNotFound { path: path.into() }.into()
            },
            SpatialFormatError::Io { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                IoError::PermissionDenied { path: path.into() }.into()
            },
            err @ SpatialFormatError::Io { .. } => IoError::Read {
                format: format.to_string(),
                path: path.into(),
                source: Box::new(err),
            }
            .into(),
            err => FormatError::Parse {
                format: format.to_string(),
                line: err.line(),
                message: err.to_string(),
            }
            .into(),
        }
    }
}

impl IoError {
    fn user_message(&self) -> String {
        match self {
            Self::Read { format, path, .. } => {
                format!("Failed to read {} file: {}", format, path.display())
            },
            Self::Write { format, path, .. } => {
                format!("Failed to write {} file: {}", format, path.display())
            },
            Self::FileNotFound { path } => {
                format!("File not found: {}", path.display())
            },
            Self::PermissionDenied { path } => {
                format!("Permission denied: {}", path.display())
            },
            Self::InvalidPath { .. } => self.to_string(),
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::FileNotFound { .. } => {
                Some("Check that the file path is correct and the file exists.".to_string())
            },
            Self::InvalidPath { .. } => {
                Some("Ensure the path is valid and its parent directory exists.".to_string())
            },
            Self::PermissionDenied { .. } => {
                Some("Check file permissions or run with appropriate privileges.".to_string())
            },
            Self::Write { .. } => {
                Some("Check free disk space and write permissions for the output.".to_string())
            },
            Self::Read { .. } => None,
        }
    }
}

impl FormatError {
    fn user_message(&self) -> String {
        match self {
            Self::Parse {
                format,
                line,
                message,
            } => {
                if let Some(line_num) = line {
                    format!("Parse error in {format} at line {line_num}: {message}")
                } else {
                    format!("Parse error in {format}: {message}")
                }
            },
            Self::NoFeatures { .. } | Self::GeometryEncoding { .. } | Self::Schema { .. } => {
                self.to_string()
            },
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Parse { .. } => Some("Check the file format and ensure it's valid.".to_string()),
            Self::NoFeatures { .. } => {
                Some("Provide a GeoJSON file with at least one feature.".to_string())
            },
            Self::GeometryEncoding { .. } => {
                Some("Validate geometries using a GIS tool before converting.".to_string())
            },
            Self::Schema { .. } => None,
        }
    }
}

/// Extension trait for adding I/O context to errors.
pub trait IoErrorExt<T> {
    /// Add read context to an error.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError::Read`] if the underlying operation fails.
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;

    /// Add write context to an error.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError::Write`] if the underlying operation fails.
    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T, E> IoErrorExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            GeoPqError::Io(IoError::Read {
                format: format.to_string(),
                path: path.into(),
                source: Box::new(e),
            })
        })
    }

    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            GeoPqError::Io(IoError::Write {
                format: format.to_string(),
                path: path.into(),
                source: Box::new(e),
            })
        })
    }
}
