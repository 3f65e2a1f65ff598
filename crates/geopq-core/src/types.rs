//! Result types of `geopq` operations.
//!
//! This module defines the data structures used to report dataset information
//! and conversion results.

use std::path::PathBuf;

use crate::analyze::ColumnDescriptor;
use crate::metadata::GeometrySummary;

/// Information about an input dataset.
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    /// Path to the dataset
    pub dataset: String,
    /// Input format name
    pub format: String,
    /// Number of features read
    pub feature_count: usize,
    /// Geometry column information
    pub geometry: GeometryColumnInfo,
    /// Inferred property columns
    pub fields: Vec<FieldInfo>,
}

/// Information about the geometry column.
#[derive(Debug, Clone)]
pub struct GeometryColumnInfo {
    /// Column name
    pub name: String,
    /// Encoding of the stored geometries (e.g., "WKB")
    pub encoding: String,
    /// Single type name, "Mixed" or "Unknown"
    pub label: String,
    /// Distinct geometry types, sorted by name
    pub geometry_types: Vec<String>,
    /// `[xmin, ymin, xmax, ymax]`, if any geometry had an extent
    pub bbox: Option<[f64; 4]>,
}

/// Information about a property column.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Canonical type name (e.g., "int64")
    pub data_type: String,
    /// Arrow type the column is written with
    pub arrow_type: String,
    /// Whether the field is nullable
    pub nullable: bool,
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone)]
pub struct GenerateSummary {
    /// Number of features written
    pub feature_count: usize,
    /// Property columns, in output order
    pub descriptors: Vec<ColumnDescriptor>,
    /// Geometry types and extent
    pub geometry: GeometrySummary,
    /// File that was written
    pub output_path: PathBuf,
    /// Property values stored as null because they did not fit their column
    pub coercion_failures: usize,
}
