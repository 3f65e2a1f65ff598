//! `GeoJSON` reader for `geopq`.
//!
//! Parses `GeoJSON` documents (feature collections, single features, bare
//! geometries and newline-delimited sequences) into [`FeatureRecord`]s holding a
//! `geo-types` geometry and the raw JSON property map.

pub mod parser;

pub use geojson::{JsonObject, JsonValue};
pub use parser::{FeatureRecord, describe_value, parse_geojson_bytes, read_geojson_file};
