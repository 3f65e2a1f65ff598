//! Aggregate geometry metadata and the GeoParquet descriptor.

use std::collections::BTreeSet;

use geopq_geojson::FeatureRecord;
use geopq_geoparquet::{
    DEFAULT_GEOMETRY_COLUMN, GeoParquetColumnMetadata, GeoParquetGeometryType,
    GeoParquetMetadata, PropertyColumnMetadata,
};

use crate::analyze::ColumnDescriptor;
use crate::geometry::{Bound, geometry_bound, geometry_type};

/// Label used when features carry more than one geometry type.
pub const MIXED_GEOMETRY_LABEL: &str = "Mixed";

/// Label used when no feature carries a geometry.
pub const UNKNOWN_GEOMETRY_LABEL: &str = "Unknown";

/// Geometry types and extent observed across a collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometrySummary {
    pub geometry_types: BTreeSet<GeoParquetGeometryType>,
    pub bound: Option<Bound>,
}

impl GeometrySummary {
    /// Record one geometry.
    pub fn observe(&mut self, geometry: &geo_types::Geometry<f64>) {
        self.geometry_types.insert(geometry_type(geometry));
        if let Some(bound) = geometry_bound(geometry) {
            self.bound = Some(match self.bound {
                Some(current) => current.union(&bound),
                None => bound,
            });
        }
    }

    /// Combine two summaries.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.geometry_types.extend(other.geometry_types);
        self.bound = match (self.bound, other.bound) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, b) => a.or(b),
        };
        self
    }

    /// Single type name, `"Mixed"` or `"Unknown"`.
    #[must_use]
    pub fn label(&self) -> &'static str {
        let mut types = self.geometry_types.iter();
        match (types.next(), types.next()) {
            (None, _) => UNKNOWN_GEOMETRY_LABEL,
            (Some(only), None) => only.as_str(),
            (Some(_), Some(_)) => MIXED_GEOMETRY_LABEL,
        }
    }

    /// Geometry types in name order.
    #[must_use]
    pub fn sorted_types(&self) -> Vec<GeoParquetGeometryType> {
        self.geometry_types.iter().copied().collect()
    }
}

/// Everything written next to the data: the `geo` descriptor plus property columns.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputMetadata {
    pub geo: GeoParquetMetadata,
    pub geometry: GeometrySummary,
    pub properties: Vec<PropertyColumnMetadata>,
}

impl OutputMetadata {
    #[must_use]
    pub fn geometry_label(&self) -> &'static str {
        self.geometry.label()
    }
}

/// Summarize geometries of `features`.
#[must_use]
pub fn summarize_geometries(features: &[FeatureRecord]) -> GeometrySummary {
    let mut summary = GeometrySummary::default();
    for geometry in features.iter().filter_map(|f| f.geometry.as_ref()) {
        summary.observe(geometry);
    }
    summary
}

/// Property column metadata for `descriptors`, in order.
#[must_use]
pub fn property_metadata(descriptors: &[ColumnDescriptor]) -> Vec<PropertyColumnMetadata> {
    descriptors
        .iter()
        .map(|d| PropertyColumnMetadata {
            name: d.name.clone(),
            data_type: d.semantic_type.resolved().type_name().to_string(),
            nullable: d.nullable,
        })
        .collect()
}

/// Build the output metadata for a collection.
#[must_use]
pub fn build_metadata(features: &[FeatureRecord], descriptors: &[ColumnDescriptor]) -> OutputMetadata {
    let geometry = summarize_geometries(features);
    log::debug!(
        "Geometry summary: {} ({} types, bbox {:?})",
        geometry.label(),
        geometry.geometry_types.len(),
        geometry.bound.map(|b| b.to_bbox())
    );

    let column = GeoParquetColumnMetadata::wkb(geometry.sorted_types())
        .with_bbox(geometry.bound.map(|b| b.to_bbox()));

    OutputMetadata {
        geo: GeoParquetMetadata::new(DEFAULT_GEOMETRY_COLUMN, column),
        geometry,
        properties: property_metadata(descriptors),
    }
}
