//! GeoParquet writer built on the `parquet` crate's [`ArrowWriter`].

use std::fs::File;
use std::io::Write as IoWrite;
use std::path::Path;

use arrow_array::RecordBatch;
use arrow_schema::SchemaRef;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};

use geopq_shared::{SpatialFormatError, SpatialFormatResult};

use crate::metadata::{GEO_METADATA_KEY, GeoParquetMetadata};

/// Default maximum number of rows per row group.
pub const DEFAULT_MAX_ROW_GROUP_SIZE: usize = 1024 * 1024;

/// Options for GeoParquet writing
#[derive(Debug, Clone)]
pub struct GeoParquetWriterOptions {
    /// Column compression codec (default: ZSTD)
    pub compression: Compression,
    /// Maximum rows per row group (default: [`DEFAULT_MAX_ROW_GROUP_SIZE`])
    pub max_row_group_size: usize,
    /// Extra key/value pairs stored next to the `geo` key
    pub key_value_metadata: Vec<(String, String)>,
}

impl Default for GeoParquetWriterOptions {
    fn default() -> Self {
        Self {
            compression: Compression::ZSTD(ZstdLevel::default()),
            max_row_group_size: DEFAULT_MAX_ROW_GROUP_SIZE,
            key_value_metadata: Vec::new(),
        }
    }
}

impl GeoParquetWriterOptions {
    /// Create new writer options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set column compression codec
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set maximum rows per row group
    #[must_use]
    pub fn with_max_row_group_size(mut self, max_row_group_size: usize) -> Self {
        self.max_row_group_size = max_row_group_size;
        self
    }

    /// Add an extra key/value metadata entry
    #[must_use]
    pub fn with_key_value_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.key_value_metadata.push((key.into(), value.into()));
        self
    }

    fn writer_properties(&self, geo: &GeoParquetMetadata) -> SpatialFormatResult<WriterProperties> {
        let mut key_values = vec![KeyValue::new(GEO_METADATA_KEY.to_string(), geo.to_json()?)];
        key_values.extend(
            self.key_value_metadata
                .iter()
                .map(|(key, value)| KeyValue::new(key.clone(), value.clone())),
        );

        Ok(WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.max_row_group_size.max(1))
            .set_key_value_metadata(Some(key_values))
            .build())
    }
}

fn write_error(err: impl std::fmt::Display) -> SpatialFormatError {
    SpatialFormatError::Write {
        message: err.to_string(),
        context: None,
    }
}

/// Write record batches as GeoParquet to any sink.
///
/// # Errors
///
/// Returns [`SpatialFormatError::Write`] if Parquet encoding or the sink fails.
pub fn write_geoparquet<W: IoWrite + Send>(
    sink: W,
    schema: SchemaRef,
    batches: &[RecordBatch],
    geo: &GeoParquetMetadata,
    options: &GeoParquetWriterOptions,
) -> SpatialFormatResult<()> {
    let props = options.writer_properties(geo)?;
    let mut writer = ArrowWriter::try_new(sink, schema, Some(props)).map_err(write_error)?;

    for batch in batches {
        writer.write(batch).map_err(write_error)?;
    }

    writer.close().map_err(write_error)?;
    Ok(())
}

/// Write record batches as GeoParquet to a file path.
///
/// A partially written file is removed when writing fails.
///
/// # Errors
///
/// Returns [`SpatialFormatError::Io`] if the file cannot be created and
/// [`SpatialFormatError::Write`] if writing fails.
pub fn write_geoparquet_file(
    path: &Path,
    schema: SchemaRef,
    batches: &[RecordBatch],
    geo: &GeoParquetMetadata,
    options: &GeoParquetWriterOptions,
) -> SpatialFormatResult<()> {
    let context = path.display().to_string();
    let file = File::create(path).map_err(|source| SpatialFormatError::Io {
        source,
        context: Some(context.clone()),
    })?;

    write_geoparquet(file, schema, batches, geo, options).map_err(|err| {
        let _ = std::fs::remove_file(path);
        err.with_additional_context(context)
    })
}

/// Read a key/value metadata entry from a Parquet file footer.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not valid Parquet.
pub fn read_key_value_metadata(path: &Path, key: &str) -> SpatialFormatResult<Option<String>> {
    let context = path.display().to_string();
    let file = File::open(path).map_err(|source| SpatialFormatError::Io {
        source,
        context: Some(context.clone()),
    })?;
    let reader = SerializedFileReader::new(file).map_err(|err| SpatialFormatError::Parse {
        message: err.to_string(),
        position: None,
        context: Some(context),
    })?;

    let value = reader
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .and_then(|kvs| kvs.iter().find(|kv| kv.key == key))
        .and_then(|kv| kv.value.clone());
    Ok(value)
}

/// Read the GeoParquet `geo` metadata of a Parquet file, if present.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the metadata is malformed.
pub fn read_geo_metadata(path: &Path) -> SpatialFormatResult<Option<GeoParquetMetadata>> {
    read_key_value_metadata(path, GEO_METADATA_KEY)?
        .map(|json| GeoParquetMetadata::from_json(&json))
        .transpose()
}
