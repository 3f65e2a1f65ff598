//! Display helpers for schema reporting.

use arrow_schema::DataType;

/// Extension trait for formatting Arrow [`DataType`] into human-readable strings.
///
/// # Examples
///
/// ```
/// use arrow_schema::DataType;
/// use geopq_core::utils::ArrowDataTypeExt;
///
/// assert_eq!(DataType::Int64.format(), "Int64");
/// assert_eq!(DataType::Utf8.format(), "String");
/// ```
pub trait ArrowDataTypeExt {
    /// Format the data type into a human-readable string.
    fn format(&self) -> String;
}

impl ArrowDataTypeExt for DataType {
    fn format(&self) -> String {
        match self {
            DataType::Boolean => "Boolean".to_string(),
            DataType::Int64 => "Int64".to_string(),
            DataType::Float64 => "Float64".to_string(),
            DataType::Utf8 => "String".to_string(),
            DataType::Binary => "Binary".to_string(),
            _ => format!("{self:?}"),
        }
    }
}

/// Format a bounding box as `xmin, ymin, xmax, ymax`.
#[must_use]
pub fn format_bbox(bbox: Option<[f64; 4]>) -> String {
    match bbox {
        Some([min_x, min_y, max_x, max_y]) => format!("{min_x}, {min_y}, {max_x}, {max_y}"),
        None => "(none)".to_string(),
    }
}
