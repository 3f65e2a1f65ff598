//! Strongly-typed structs for the GeoParquet `geo` file metadata.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use geopq_shared::{SpatialFormatError, SpatialFormatResult};
use serde::{Deserialize, Serialize};

/// GeoParquet specification version written by this crate.
pub const GEOPARQUET_VERSION: &str = "1.1.0";

/// Key/value metadata key holding the serialized [`GeoParquetMetadata`].
pub const GEO_METADATA_KEY: &str = "geo";

/// Key/value metadata key holding the optional property column list.
pub const PROPERTIES_METADATA_KEY: &str = "geopq:properties";

/// Name of the geometry column written by `geopq`.
pub const DEFAULT_GEOMETRY_COLUMN: &str = "geometry";

/// The encoding of the geometry column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum GeoParquetColumnEncoding {
    /// Serialized Well-known Binary encoding
    WKB,
}

impl Display for GeoParquetColumnEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WKB => write!(f, "WKB"),
        }
    }
}

/// Geometry types that are valid to write to GeoParquet 1.1 (2D only).
///
/// Variants are declared in lexicographic name order so the derived `Ord`
/// sorts the same way as the type names do.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeoParquetGeometryType {
    /// GeometryCollection geometry type
    GeometryCollection,
    /// LineString geometry type
    LineString,
    /// MultiLineString geometry type
    MultiLineString,
    /// MultiPoint geometry type
    MultiPoint,
    /// MultiPolygon geometry type
    MultiPolygon,
    /// Point geometry type
    Point,
    /// Polygon geometry type
    Polygon,
}

impl GeoParquetGeometryType {
    /// The `GeoJSON`/GeoParquet name of the geometry type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeometryCollection => "GeometryCollection",
            Self::LineString => "LineString",
            Self::MultiLineString => "MultiLineString",
            Self::MultiPoint => "MultiPoint",
            Self::MultiPolygon => "MultiPolygon",
            Self::Point => "Point",
            Self::Polygon => "Polygon",
        }
    }
}

impl FromStr for GeoParquetGeometryType {
    type Err = SpatialFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let out = match s {
            "GeometryCollection" => Self::GeometryCollection,
            "LineString" => Self::LineString,
            "MultiLineString" => Self::MultiLineString,
            "MultiPoint" => Self::MultiPoint,
            "MultiPolygon" => Self::MultiPolygon,
            "Point" => Self::Point,
            "Polygon" => Self::Polygon,
            other => {
                return Err(SpatialFormatError::Other {
                    message: format!("Unknown value for geometry_type: {other}"),
                });
            },
        };
        Ok(out)
    }
}

impl Display for GeoParquetGeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Top-level GeoParquet file metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoParquetMetadata {
    /// The version identifier for the GeoParquet specification.
    pub version: String,

    /// The name of the "primary" geometry column.
    pub primary_column: String,

    /// Metadata about geometry columns, keyed by column name.
    pub columns: BTreeMap<String, GeoParquetColumnMetadata>,
}

impl GeoParquetMetadata {
    /// Metadata with a single primary geometry column.
    #[must_use]
    pub fn new(primary_column: impl Into<String>, column: GeoParquetColumnMetadata) -> Self {
        let primary_column = primary_column.into();
        let mut columns = BTreeMap::new();
        columns.insert(primary_column.clone(), column);
        Self {
            version: GEOPARQUET_VERSION.to_string(),
            primary_column,
            columns,
        }
    }

    /// Metadata of the primary geometry column.
    #[must_use]
    pub fn primary(&self) -> Option<&GeoParquetColumnMetadata> {
        self.columns.get(&self.primary_column)
    }

    /// Serialize to the JSON text stored under [`GEO_METADATA_KEY`].
    ///
    /// # Errors
    ///
    /// Returns [`SpatialFormatError::Write`] if serialization fails.
    pub fn to_json(&self) -> SpatialFormatResult<String> {
        serde_json::to_string(self).map_err(|err| SpatialFormatError::Write {
            message: format!("Failed to serialize geo metadata: {err}"),
            context: None,
        })
    }

    /// Parse the JSON text stored under [`GEO_METADATA_KEY`].
    ///
    /// # Errors
    ///
    /// Returns [`SpatialFormatError::Parse`] if the text is not valid metadata.
    pub fn from_json(json: &str) -> SpatialFormatResult<Self> {
        serde_json::from_str(json).map_err(|err| SpatialFormatError::Parse {
            message: format!("Invalid geo metadata: {err}"),
            position: None,
            context: Some(GEO_METADATA_KEY.to_string()),
        })
    }
}

/// GeoParquet column metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoParquetColumnMetadata {
    /// Name of the geometry encoding format.
    pub encoding: GeoParquetColumnEncoding,

    /// The geometry types of all geometries, or an empty array if they are not known.
    pub geometry_types: Vec<GeoParquetGeometryType>,

    /// PROJJSON description of the CRS. Omitted for the default OGC:CRS84.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<serde_json::Value>,

    /// Bounding box of the column as `[xmin, ymin, xmax, ymax]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
}

impl GeoParquetColumnMetadata {
    /// WKB column metadata for the given geometry types.
    #[must_use]
    pub fn wkb(geometry_types: Vec<GeoParquetGeometryType>) -> Self {
        Self {
            encoding: GeoParquetColumnEncoding::WKB,
            geometry_types,
            crs: None,
            bbox: None,
        }
    }

    #[must_use]
    pub fn with_bbox(mut self, bbox: Option<[f64; 4]>) -> Self {
        self.bbox = bbox.map(|b| b.to_vec());
        self
    }
}

/// Name, type and nullability of one property (non-geometry) column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyColumnMetadata {
    /// Column name.
    pub name: String,
    /// Canonical type name (`string`, `int64`, `double`, `boolean`).
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether the column may contain nulls.
    pub nullable: bool,
}

/// Serialize property column metadata for [`PROPERTIES_METADATA_KEY`].
///
/// # Errors
///
/// Returns [`SpatialFormatError::Write`] if serialization fails.
pub fn properties_to_json(properties: &[PropertyColumnMetadata]) -> SpatialFormatResult<String> {
    serde_json::to_string(properties).map_err(|err| SpatialFormatError::Write {
        message: format!("Failed to serialize property metadata: {err}"),
        context: None,
    })
}
