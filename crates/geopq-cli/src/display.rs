//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions
//! for presenting inferred schemas and conversion results.

use tabled::{Table, Tabled};

use geopq_core::types::{DatasetInfo, GenerateSummary};
use geopq_core::utils::{ArrowDataTypeExt, format_bbox};

/// Table row representation for displaying geometry column information.
#[derive(Tabled)]
pub struct GeometryRow {
    /// Name of the geometry column.
    #[tabled(rename = "Column")]
    pub name: String,
    /// Encoding of stored geometries.
    #[tabled(rename = "Encoding")]
    pub encoding: String,
    /// Single geometry type, "Mixed" or "Unknown".
    #[tabled(rename = "Geometry Type")]
    pub label: String,
    /// Distinct geometry types.
    #[tabled(rename = "Types")]
    pub types: String,
    /// Bounding box of all geometries.
    #[tabled(rename = "BBox")]
    pub bbox: String,
}

/// Table row representation for displaying field/column information.
#[derive(Tabled)]
pub struct FieldRow {
    /// Name of the field.
    #[tabled(rename = "Field")]
    pub name: String,
    /// Inferred type of the field.
    #[tabled(rename = "Type")]
    pub data_type: String,
    /// Arrow type the field is written with.
    #[tabled(rename = "Arrow Type")]
    pub arrow_type: String,
    /// Whether the field can contain null values.
    #[tabled(rename = "Nullable")]
    pub nullable: String,
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

fn types_or_none(types: &[String]) -> String {
    if types.is_empty() {
        "(none)".to_string()
    } else {
        types.join(", ")
    }
}

/// Display dataset information in formatted tables.
pub fn display_dataset_info(info: &DatasetInfo) {
    println!("\nDataset: {}", info.dataset);
    println!("Format: {}", info.format);
    println!("Features: {}", info.feature_count);

    println!("\n=== Geometry Column ===");
    let geo_rows = vec![GeometryRow {
        name: info.geometry.name.clone(),
        encoding: info.geometry.encoding.clone(),
        label: info.geometry.label.clone(),
        types: types_or_none(&info.geometry.geometry_types),
        bbox: format_bbox(info.geometry.bbox),
    }];
    println!("{}", Table::new(geo_rows));

    if info.fields.is_empty() {
        println!("\nNo property columns.");
        return;
    }

    println!("\n=== Fields ===");
    let field_rows: Vec<FieldRow> = info
        .fields
        .iter()
        .map(|f| FieldRow {
            name: f.name.clone(),
            data_type: f.data_type.clone(),
            arrow_type: f.arrow_type.clone(),
            nullable: yes_no(f.nullable),
        })
        .collect();
    println!("{}", Table::new(field_rows));
}

/// Display the result of a conversion.
pub fn display_generate_summary(summary: &GenerateSummary) {
    println!(
        "Wrote {} feature(s) to {}",
        summary.feature_count,
        summary.output_path.display()
    );
    println!(
        "Geometry: {} (bbox: {})",
        summary.geometry.label(),
        format_bbox(summary.geometry.bound.map(|b| b.to_bbox()))
    );

    if !summary.descriptors.is_empty() {
        let field_rows: Vec<FieldRow> = summary
            .descriptors
            .iter()
            .map(|d| FieldRow {
                name: d.name.clone(),
                data_type: d.semantic_type.type_name().to_string(),
                arrow_type: d.semantic_type.data_type().format(),
                nullable: yes_no(d.nullable),
            })
            .collect();
        println!("{}", Table::new(field_rows));
    }

    if summary.coercion_failures > 0 {
        println!(
            "{} value(s) did not match their column type and were written as null",
            summary.coercion_failures
        );
    }
}
