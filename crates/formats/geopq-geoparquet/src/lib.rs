//! GeoParquet output for `geopq`.
//!
//! This crate holds the typed model of the GeoParquet `geo` metadata block and a
//! writer that persists Arrow record batches to Parquet with that block attached
//! as file-level key/value metadata.

pub mod metadata;
pub mod writer;

pub use metadata::{
    DEFAULT_GEOMETRY_COLUMN, GEO_METADATA_KEY, GEOPARQUET_VERSION, GeoParquetColumnEncoding,
    GeoParquetColumnMetadata, GeoParquetGeometryType, GeoParquetMetadata, PROPERTIES_METADATA_KEY,
    PropertyColumnMetadata, properties_to_json,
};
pub use writer::{
    DEFAULT_MAX_ROW_GROUP_SIZE, GeoParquetWriterOptions, read_geo_metadata,
    read_key_value_metadata, write_geoparquet, write_geoparquet_file,
};
