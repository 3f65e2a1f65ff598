//! `geopq-core` is the core library of `geopq`, converting `GeoJSON` features into
//! GeoParquet with a schema inferred from the data.
//!
//! This crate includes:
//! - **Type inference** (`infer`, `analyze`): one stable column type per property key.
//! - **Row building** (`schema`): the dynamic row schema and feature-to-row conversion.
//! - **Metadata** (`metadata`, `geometry`): geometry types, bounds and the `geo` descriptor.
//! - **Operations** (`operations`): the `generate` and `inspect` pipelines.
//!
//! Errors are reported through [`GeoPqError`].

pub mod analyze;
pub mod config;
pub mod error;
pub mod geometry;
pub mod infer;
pub mod metadata;
pub mod operations;
pub mod paths;
pub mod schema;
pub mod types;
pub mod utils;

pub use analyze::{ColumnDescriptor, PropertyAnalyzer, analyze_properties};
pub use config::{CompressionCodec, DEFAULT_MAX_ROW_GROUP_SIZE, GenerateOptions};
pub use error::{ConfigError, ErrorKind, FormatError, GeoPqError, IoError, IoErrorExt, Result};
pub use geometry::{Bound, EncodeError, GeometryEncoder, WkbEncoder, geometry_bound, geometry_type};
pub use infer::{SemanticType, infer};
pub use metadata::{GeometrySummary, OutputMetadata, build_metadata};
pub use operations::{generate, generate_from_features, generate_with_encoder, inspect};
pub use schema::{CellValue, Row, RowSchema};
pub use types::{DatasetInfo, FieldInfo, GenerateSummary, GeometryColumnInfo};

pub use geopq_geojson::FeatureRecord;
