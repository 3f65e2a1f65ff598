//! Row schema construction and feature-to-row conversion.
//!
//! The row schema is derived once from the column descriptors: a nullable
//! binary geometry slot first, then one slot per property in descriptor order.
//! Each feature is converted into a [`Row`] of typed [`CellValue`]s, and rows
//! are assembled into an Arrow [`RecordBatch`] through one typed builder per slot.

use std::collections::HashSet;
use std::sync::Arc;

use arrow_array::builder::{
    BinaryBuilder, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder,
};
use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use geopq_geojson::{FeatureRecord, JsonValue, describe_value};
use geopq_geoparquet::DEFAULT_GEOMETRY_COLUMN;

use crate::analyze::ColumnDescriptor;
use crate::error::{FormatError, Result};
use crate::geometry::GeometryEncoder;
use crate::infer::SemanticType;

/// One typed cell of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Binary(Vec<u8>),
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl CellValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A converted feature: geometry cell followed by one cell per property column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<CellValue>,
    /// Property values that did not fit their column type and were stored as null.
    pub coercion_failures: usize,
}

impl Row {
    #[must_use]
    pub fn width(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn geometry(&self) -> &CellValue {
        &self.cells[0]
    }
}

/// A property slot of the row schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyColumn {
    /// Output column name, unique within the schema.
    pub name: String,
    /// Property key values are read from.
    pub key: String,
    pub semantic_type: SemanticType,
}

/// Geometry slot plus typed property slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    geometry_column: String,
    columns: Vec<PropertyColumn>,
}

impl RowSchema {
    /// Build the schema for `descriptors`, keeping their order.
    ///
    /// A property named like an earlier column is written under `<name>_1`,
    /// `<name>_2`, ... while values are still read from the original key.
    #[must_use]
    pub fn from_descriptors(descriptors: &[ColumnDescriptor]) -> Self {
        let mut taken: HashSet<String> = HashSet::new();
        taken.insert(DEFAULT_GEOMETRY_COLUMN.to_string());

        let columns = descriptors
            .iter()
            .map(|descriptor| {
                let name = unique_name(&descriptor.name, &mut taken);
                if name != descriptor.name {
                    log::debug!(
                        "Property '{}' written as column '{name}'",
                        descriptor.name
                    );
                }
                PropertyColumn {
                    name,
                    key: descriptor.name.clone(),
                    semantic_type: descriptor.semantic_type.resolved(),
                }
            })
            .collect();

        Self {
            geometry_column: DEFAULT_GEOMETRY_COLUMN.to_string(),
            columns,
        }
    }

    #[must_use]
    pub fn geometry_column(&self) -> &str {
        &self.geometry_column
    }

    #[must_use]
    pub fn columns(&self) -> &[PropertyColumn] {
        &self.columns
    }

    /// Number of slots in a row, geometry included.
    #[must_use]
    pub fn width(&self) -> usize {
        1 + self.columns.len()
    }

    /// Arrow schema of the output: nullable binary geometry, nullable properties.
    #[must_use]
    pub fn to_arrow_schema(&self) -> SchemaRef {
        let mut fields = Vec::with_capacity(self.width());
        fields.push(Field::new(&self.geometry_column, DataType::Binary, true));
        fields.extend(
            self.columns
                .iter()
                .map(|column| Field::new(&column.name, column.semantic_type.data_type(), true)),
        );
        Arc::new(Schema::new(fields))
    }

    /// Convert one feature into a row.
    ///
    /// `feature_index` only identifies the feature in errors.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::GeometryEncoding`] if the geometry cannot be encoded.
    pub fn to_row(
        &self,
        feature_index: usize,
        feature: &FeatureRecord,
        encoder: &dyn GeometryEncoder,
    ) -> Result<Row> {
        let mut cells = Vec::with_capacity(self.width());

        let geometry = match &feature.geometry {
            Some(geometry) => {
                let bytes = encoder.encode(geometry).map_err(|err| {
                    FormatError::GeometryEncoding {
                        feature_index,
                        message: err.to_string(),
                    }
                })?;
                CellValue::Binary(bytes)
            },
            None => CellValue::Null,
        };
        cells.push(geometry);

        let mut coercion_failures = 0;
        for column in &self.columns {
            let cell = match feature.property(&column.key) {
                None | Some(JsonValue::Null) => CellValue::Null,
                Some(value) => coerce(value, column.semantic_type).unwrap_or_else(|| {
                    log::trace!(
                        "Feature {feature_index}: {} value in {} column '{}' stored as null",
                        describe_value(value),
                        column.semantic_type,
                        column.name
                    );
                    coercion_failures += 1;
                    CellValue::Null
                }),
            };
            cells.push(cell);
        }

        Ok(Row {
            cells,
            coercion_failures,
        })
    }

    /// Convert every feature, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first feature whose geometry cannot be encoded.
    pub fn to_rows(
        &self,
        features: &[FeatureRecord],
        encoder: &dyn GeometryEncoder,
    ) -> Result<Vec<Row>> {
        features
            .iter()
            .enumerate()
            .map(|(idx, feature)| self.to_row(idx, feature, encoder))
            .collect()
    }

    /// Assemble rows into a single record batch.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Schema`] if a row does not match this schema.
    pub fn to_record_batch(&self, rows: &[Row]) -> Result<RecordBatch> {
        let mut builders: Vec<ColumnBuilder> = Vec::with_capacity(self.width());
        builders.push(ColumnBuilder::Binary(BinaryBuilder::with_capacity(
            rows.len(),
            0,
        )));
        builders.extend(
            self.columns
                .iter()
                .map(|column| ColumnBuilder::new(column.semantic_type, rows.len())),
        );

        for (idx, row) in rows.iter().enumerate() {
            if row.width() != self.width() {
                return Err(FormatError::Schema {
                    message: format!(
                        "row {idx} has {} cells, schema has {} columns",
                        row.width(),
                        self.width()
                    ),
                }
                .into());
            }
            for (slot, (builder, cell)) in builders.iter_mut().zip(&row.cells).enumerate() {
                builder.append(cell).map_err(|found| FormatError::Schema {
                    message: format!("row {idx} slot {slot}: unexpected {found} value"),
                })?;
            }
        }

        let columns: Vec<ArrayRef> = builders.into_iter().map(ColumnBuilder::finish).collect();
        RecordBatch::try_new(self.to_arrow_schema(), columns).map_err(|err| {
            FormatError::Schema {
                message: err.to_string(),
            }
            .into()
        })
    }
}

fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = name.to_string();
    let mut suffix = 1;
    while taken.contains(&candidate) {
        candidate = format!("{name}_{suffix}");
        suffix += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Coerce a non-null value to a column type, `None` on mismatch.
fn coerce(value: &JsonValue, target: SemanticType) -> Option<CellValue> {
    match target {
        SemanticType::Integer => match value {
            JsonValue::Number(n) => n
                .as_i64()
                .or_else(|| {
                    if n.is_u64() {
                        return None;
                    }
                    n.as_f64().and_then(truncate_to_i64)
                })
                .map(CellValue::Integer),
            _ => None,
        },
        SemanticType::Float => match value {
            JsonValue::Number(n) => n.as_f64().map(CellValue::Float),
            _ => None,
        },
        SemanticType::Boolean => match value {
            JsonValue::Bool(b) => Some(CellValue::Boolean(*b)),
            _ => None,
        },
        SemanticType::String | SemanticType::Null => Some(CellValue::String(match value {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn truncate_to_i64(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Some(truncated as i64)
    } else {
        None
    }
}

enum ColumnBuilder {
    Binary(BinaryBuilder),
    String(StringBuilder),
    Int64(Int64Builder),
    Float64(Float64Builder),
    Boolean(BooleanBuilder),
}

impl ColumnBuilder {
    fn new(semantic_type: SemanticType, capacity: usize) -> Self {
        match semantic_type {
            SemanticType::Integer => Self::Int64(Int64Builder::with_capacity(capacity)),
            SemanticType::Float => Self::Float64(Float64Builder::with_capacity(capacity)),
            SemanticType::Boolean => Self::Boolean(BooleanBuilder::with_capacity(capacity)),
            SemanticType::String | SemanticType::Null => {
                Self::String(StringBuilder::with_capacity(capacity, 0))
            },
        }
    }

    /// Append a cell; on a kind mismatch returns the offending kind.
    fn append(&mut self, cell: &CellValue) -> std::result::Result<(), &'static str> {
        match (self, cell) {
            (Self::Binary(b), CellValue::Null) => b.append_null(),
            (Self::String(b), CellValue::Null) => b.append_null(),
            (Self::Int64(b), CellValue::Null) => b.append_null(),
            (Self::Float64(b), CellValue::Null) => b.append_null(),
            (Self::Boolean(b), CellValue::Null) => b.append_null(),
            (Self::Binary(b), CellValue::Binary(v)) => b.append_value(v),
            (Self::String(b), CellValue::String(v)) => b.append_value(v),
            (Self::Int64(b), CellValue::Integer(v)) => b.append_value(*v),
            (Self::Float64(b), CellValue::Float(v)) => b.append_value(*v),
            (Self::Boolean(b), CellValue::Boolean(v)) => b.append_value(*v),
            (_, other) => return Err(cell_kind(other)),
        }
        Ok(())
    }

    fn finish(self) -> ArrayRef {
        match self {
            Self::Binary(mut b) => Arc::new(b.finish()),
            Self::String(mut b) => Arc::new(b.finish()),
            Self::Int64(mut b) => Arc::new(b.finish()),
            Self::Float64(mut b) => Arc::new(b.finish()),
            Self::Boolean(mut b) => Arc::new(b.finish()),
        }
    }
}

fn cell_kind(cell: &CellValue) -> &'static str {
    match cell {
        CellValue::Null => "null",
        CellValue::Binary(_) => "binary",
        CellValue::String(_) => "string",
        CellValue::Integer(_) => "integer",
        CellValue::Float(_) => "float",
        CellValue::Boolean(_) => "boolean",
    }
}
