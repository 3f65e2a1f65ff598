//! Options for generating GeoParquet files.

use std::fmt;
use std::str::FromStr;

pub use geopq_geoparquet::DEFAULT_MAX_ROW_GROUP_SIZE;
use parquet::basic::{BrotliLevel, Compression, GzipLevel, ZstdLevel};

use crate::error::{ConfigError, Result};

/// Column compression codec of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionCodec {
    Uncompressed,
    Snappy,
    Gzip,
    Brotli,
    Lz4,
    #[default]
    Zstd,
}

impl CompressionCodec {
    /// All codecs, in the order they are listed to users.
    pub const ALL: [Self; 6] = [
        Self::Uncompressed,
        Self::Snappy,
        Self::Gzip,
        Self::Brotli,
        Self::Lz4,
        Self::Zstd,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uncompressed => "uncompressed",
            Self::Snappy => "snappy",
            Self::Gzip => "gzip",
            Self::Brotli => "brotli",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }

    /// The `parquet` codec with its default level.
    #[must_use]
    pub fn to_parquet(self) -> Compression {
        match self {
            Self::Uncompressed => Compression::UNCOMPRESSED,
            Self::Snappy => Compression::SNAPPY,
            Self::Gzip => Compression::GZIP(GzipLevel::default()),
            Self::Brotli => Compression::BROTLI(BrotliLevel::default()),
            Self::Lz4 => Compression::LZ4_RAW,
            Self::Zstd => Compression::ZSTD(ZstdLevel::default()),
        }
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionCodec {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "uncompressed" | "none" => Ok(Self::Uncompressed),
            "snappy" => Ok(Self::Snappy),
            "gzip" => Ok(Self::Gzip),
            "brotli" => Ok(Self::Brotli),
            "lz4" => Ok(Self::Lz4),
            "zstd" => Ok(Self::Zstd),
            _ => Err(ConfigError::InvalidOption {
                option: "compression".to_string(),
                message: format!(
                    "unknown codec '{s}', expected one of: {}",
                    Self::ALL.map(|c| c.as_str()).join(", ")
                ),
            }),
        }
    }
}

/// Settings for [`crate::operations::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Column compression (default: zstd)
    pub compression: CompressionCodec,
    /// Maximum rows per row group
    pub max_row_group_size: usize,
    /// Also write property column metadata under `geopq:properties`
    pub property_metadata: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            compression: CompressionCodec::default(),
            max_row_group_size: DEFAULT_MAX_ROW_GROUP_SIZE,
            property_metadata: false,
        }
    }
}

impl GenerateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_compression(mut self, compression: CompressionCodec) -> Self {
        self.compression = compression;
        self
    }

    #[must_use]
    pub fn with_max_row_group_size(mut self, max_row_group_size: usize) -> Self {
        self.max_row_group_size = max_row_group_size;
        self
    }

    #[must_use]
    pub fn with_property_metadata(mut self, enabled: bool) -> Self {
        self.property_metadata = enabled;
        self
    }

    /// Check option values before any work is done.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for a zero row group size.
    pub fn validate(&self) -> Result<()> {
        if self.max_row_group_size == 0 {
            return Err(ConfigError::InvalidOption {
                option: "row-group-size".to_string(),
                message: "must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
