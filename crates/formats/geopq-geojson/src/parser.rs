//! `GeoJSON` parsing into in-memory feature records.

use std::convert::TryInto;
use std::fmt;
use std::path::Path;

use geo_types::Geometry;
use geojson::{
    Feature, FeatureCollection, GeoJson, Geometry as GeoJsonGeometry, JsonObject, JsonValue,
};
use geopq_shared::{SourcePosition, SpatialFormatError, SpatialFormatResult};

/// Parsed `GeoJSON` feature with materialized properties and geometry.
///
/// Both parts are optional: `GeoJSON` allows `"geometry": null` and
/// `"properties": null`, and a bare geometry object carries no property map.
#[derive(Debug, Clone, Default)]
pub struct FeatureRecord {
    pub properties: Option<JsonObject>,
    pub geometry: Option<Geometry<f64>>,
}

impl FeatureRecord {
    #[must_use]
    pub fn new(geometry: Option<Geometry<f64>>, properties: Option<JsonObject>) -> Self {
        Self {
            properties,
            geometry,
        }
    }

    /// Looks up a property value by key.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&JsonValue> {
        self.properties.as_ref().and_then(|props| props.get(key))
    }
}

/// Read and parse a `GeoJSON` file from disk.
///
/// # Errors
///
/// Returns [`SpatialFormatError::Io`] when the file cannot be read and
/// [`SpatialFormatError::Parse`] when its content is not valid `GeoJSON`.
pub fn read_geojson_file(path: impl AsRef<Path>) -> SpatialFormatResult<Vec<FeatureRecord>> {
    let path = path.as_ref();
    let context = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| SpatialFormatError::Io {
        source,
        context: Some(context.clone()),
    })?;

    parse_geojson_bytes(&bytes, None, context)
}

/// Parse raw bytes into a vector of `FeatureRecord`s.
///
/// The input may be a `FeatureCollection`, a single `Feature`, a bare geometry,
/// or a newline-delimited sequence of any of those.
///
/// # Errors
///
/// Returns [`SpatialFormatError::Parse`] when neither interpretation succeeds.
pub fn parse_geojson_bytes(
    bytes: &[u8],
    limit: Option<usize>,
    context: impl Into<String>,
) -> SpatialFormatResult<Vec<FeatureRecord>> {
    let context = context.into();
    let reader = std::io::Cursor::new(bytes);

    match GeoJson::from_reader(reader) {
        Ok(geojson) => geojson_to_records(geojson, limit, &context),
        Err(primary_err) => {
            let primary_err_message = primary_err.to_string();
            match parse_geojson_sequence(bytes, limit, &context) {
                Ok(records) => Ok(records),
                Err(sequence_err) => {
                    Err(combine_errors(&primary_err_message, &sequence_err, context))
                },
            }
        },
    }
}

fn geojson_to_records(
    geojson: GeoJson,
    limit: Option<usize>,
    context: &str,
) -> SpatialFormatResult<Vec<FeatureRecord>> {
    let mut records = match geojson {
        GeoJson::FeatureCollection(collection) => {
            feature_collection_to_records(collection, context)?
        },
        GeoJson::Feature(feature) => vec![feature_to_record(feature, 1, context)?],
        GeoJson::Geometry(geometry) => {
            let geometry = convert_geometry(geometry, None, context)?;
            vec![FeatureRecord::new(Some(geometry), None)]
        },
    };

    if let Some(max) = limit
        && records.len() > max
    {
        records.truncate(max);
    }
    Ok(records)
}

fn feature_collection_to_records(
    collection: FeatureCollection,
    context: &str,
) -> SpatialFormatResult<Vec<FeatureRecord>> {
    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(idx, feature)| feature_to_record(feature, idx as u64 + 1, context))
        .collect()
}

fn feature_to_record(
    feature: Feature,
    feature_number: u64,
    context: &str,
) -> SpatialFormatResult<FeatureRecord> {
    let geometry = match feature.geometry {
        Some(geometry) => Some(convert_geometry(geometry, Some(feature_number), context)?),
        None => None,
    };

    Ok(FeatureRecord::new(geometry, feature.properties))
}

fn convert_geometry(
    geometry: GeoJsonGeometry,
    feature_number: Option<u64>,
    context: &str,
) -> SpatialFormatResult<Geometry<f64>> {
    geometry
        .try_into()
        .map_err(|err| SpatialFormatError::Parse {
            message: format!("Failed to convert GeoJSON geometry: {err}"),
            position: feature_number.map(|feature| SourcePosition {
                feature: Some(feature),
                ..SourcePosition::default()
            }),
            context: Some(context.to_string()),
        })
}

fn parse_geojson_sequence(
    bytes: &[u8],
    limit: Option<usize>,
    context: &str,
) -> SpatialFormatResult<Vec<FeatureRecord>> {
    let mut records = Vec::new();
    for (line_idx, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        let line_number = (line_idx + 1) as u64;
        let line = match std::str::from_utf8(raw_line) {
            Ok(line) => line.trim(),
            Err(err) => {
                return Err(SpatialFormatError::Parse {
                    message: format!("GeoJSON line is not valid UTF-8: {err}"),
                    position: Some(SourcePosition {
                        line: Some(line_number),
                        ..SourcePosition::default()
                    }),
                    context: Some(context.to_string()),
                });
            },
        };

        // RFC 8142 record separators may prefix each text.
        let line = line.trim_start_matches('\u{1e}');
        if line.is_empty() {
            continue;
        }

        let geojson = line
            .parse::<GeoJson>()
            .map_err(|err| SpatialFormatError::Parse {
                message: format!("Failed to parse GeoJSON feature: {err}"),
                position: Some(SourcePosition {
                    line: Some(line_number),
                    ..SourcePosition::default()
                }),
                context: Some(context.to_string()),
            })?;

        let mut parsed = geojson_to_records(geojson, None, context)?;
        records.append(&mut parsed);

        if let Some(max) = limit
            && records.len() >= max
        {
            records.truncate(max);
            break;
        }
    }

    if records.is_empty() {
        Err(SpatialFormatError::Parse {
            message: "No GeoJSON features found".to_string(),
            position: None,
            context: Some(context.to_string()),
        })
    } else {
        Ok(records)
    }
}

fn combine_errors(
    collection_err: &str,
    sequence_err: &SpatialFormatError,
    context: String,
) -> SpatialFormatError {
    let message = format!(
        "Failed to parse GeoJSON as FeatureCollection ({collection_err}); \
         also failed to parse as GeoJSON sequence: {sequence_err}"
    );
    SpatialFormatError::Parse {
        message,
        position: None,
        context: Some(context),
    }
}

/// Describe the kind of a JSON value for log and error messages.
#[must_use]
pub fn describe_value(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

impl fmt::Display for FeatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let geom = if self.geometry.is_some() {
            "Some(Geometry)"
        } else {
            "None"
        };
        match &self.properties {
            Some(props) => write!(
                f,
                "FeatureRecord(properties={} keys, geometry={geom})",
                props.len()
            ),
            None => write!(f, "FeatureRecord(properties=None, geometry={geom})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_feature_collection() {
        let data = br#"{
  "type": "FeatureCollection",
  "features": [
    {"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":{"name":"A"}},
    {"type":"Feature","geometry":null,"properties":{"value":42}}
  ]
}"#;

        let records = parse_geojson_bytes(data, None, "test").expect("parse");
        assert_eq!(records.len(), 2);
        assert!(records[0].geometry.is_some());
        assert_eq!(records[0].property("name").unwrap(), "A");
        assert!(records[1].geometry.is_none());
        assert_eq!(records[1].property("value").unwrap(), 42);
    }

    #[test]
    fn parse_empty_feature_collection() {
        let data = br#"{"type":"FeatureCollection","features":[]}"#;

        let records = parse_geojson_bytes(data, None, "test").expect("parse");
        assert!(records.is_empty());
    }

    #[test]
    fn parse_feature_collection_with_limit() {
        let data = br#"{
  "type": "FeatureCollection",
  "features": [
    {"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":{"id":1}},
    {"type":"Feature","geometry":{"type":"Point","coordinates":[3,4]},"properties":{"id":2}},
    {"type":"Feature","geometry":{"type":"Point","coordinates":[5,6]},"properties":{"id":3}}
  ]
}"#;

        let records = parse_geojson_bytes(data, Some(2), "test").expect("parse");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn parse_single_feature() {
        let data = br#"{"type":"Feature","geometry":{"type":"Point","coordinates":[5.0,10.0]},"properties":{"city":"NYC"}}"#;

        let records = parse_geojson_bytes(data, None, "test").expect("parse");
        assert_eq!(records.len(), 1);
        assert!(records[0].geometry.is_some());
        assert_eq!(records[0].property("city").unwrap(), "NYC");
    }

    #[test]
    fn parse_single_feature_without_properties() {
        let data = br#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":null}"#;

        let records = parse_geojson_bytes(data, None, "test").expect("parse");
        assert_eq!(records.len(), 1);
        assert!(records[0].geometry.is_some());
        assert!(records[0].properties.is_none());
        assert!(records[0].property("anything").is_none());
    }

    #[test]
    fn parse_single_geometry() {
        let data = br#"{"type":"Point","coordinates":[7.0,8.0]}"#;

        let records = parse_geojson_bytes(data, None, "test").expect("parse");
        assert_eq!(records.len(), 1);
        assert!(records[0].geometry.is_some());
        assert!(records[0].properties.is_none());
    }

    #[test]
    fn parse_sequence() {
        let data = br#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"id":1}}
{"type":"Feature","geometry":{"type":"Point","coordinates":[1,1]},"properties":{"id":2}}"#;

        let records = parse_geojson_bytes(data, Some(1), "seq").expect("sequence");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn parse_sequence_with_empty_lines() {
        let data = br#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"id":1}}

{"type":"Feature","geometry":{"type":"Point","coordinates":[1,1]},"properties":{"id":2}}
"#;

        let records = parse_geojson_bytes(data, None, "seq").expect("sequence");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn parse_sequence_with_record_separators() {
        let data = "\u{1e}{\"type\":\"Feature\",\"geometry\":null,\"properties\":{\"id\":1}}\n\
                    \u{1e}{\"type\":\"Feature\",\"geometry\":null,\"properties\":{\"id\":2}}\n";

        let records = parse_geojson_bytes(data.as_bytes(), None, "rs").expect("sequence");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn parse_empty_sequence_fails() {
        let data = b"\n\n\n";

        let err = parse_geojson_bytes(data, None, "empty").unwrap_err();
        match err {
            SpatialFormatError::Parse { message, .. } => {
                assert!(message.contains("No GeoJSON features found"));
            },
            _ => panic!("Expected Parse error"),
        }
    }

    #[test]
    fn parse_invalid_geojson_sequence_line() {
        let data = br#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"id":1}}
not valid json"#;

        let err = parse_geojson_bytes(data, None, "bad_json").unwrap_err();
        match err {
            SpatialFormatError::Parse { message, .. } => {
                assert!(message.contains("Failed to parse GeoJSON feature"));
                assert!(message.contains("line 2"));
            },
            _ => panic!("Expected Parse error"),
        }
    }

    #[test]
    fn parse_invalid_json_combines_errors() {
        let data = b"not valid json at all";

        let err = parse_geojson_bytes(data, None, "invalid").unwrap_err();
        match err {
            SpatialFormatError::Parse {
                message, context, ..
            } => {
                assert!(message.contains("Failed to parse GeoJSON as FeatureCollection"));
                assert!(message.contains("also failed to parse as GeoJSON sequence"));
                assert_eq!(context.as_deref(), Some("invalid"));
            },
            _ => panic!("Expected Parse error"),
        }
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let err = read_geojson_file("does/not/exist.geojson").unwrap_err();
        assert!(matches!(err, SpatialFormatError::Io { .. }));
    }

    #[test]
    fn describe_value_kinds() {
        assert_eq!(describe_value(&JsonValue::Null), "null");
        assert_eq!(describe_value(&JsonValue::Bool(true)), "bool");
        assert_eq!(describe_value(&serde_json::json!(42)), "number");
        assert_eq!(describe_value(&JsonValue::String("test".into())), "string");
        assert_eq!(describe_value(&serde_json::json!([])), "array");
        assert_eq!(describe_value(&serde_json::json!({})), "object");
    }

    #[test]
    fn feature_record_display_with_geometry() {
        let record = FeatureRecord::new(
            Some(Geometry::Point(geo_types::Point::new(1.0, 2.0))),
            Some(
                [("key".to_string(), JsonValue::String("value".into()))]
                    .into_iter()
                    .collect(),
            ),
        );

        let display = format!("{record}");
        assert!(display.contains("properties=1 keys"));
        assert!(display.contains("Some(Geometry)"));
    }

    #[test]
    fn feature_record_display_without_geometry() {
        let record = FeatureRecord::default();

        let display = format!("{record}");
        assert!(display.contains("properties=None"));
        assert!(display.contains("geometry=None"));
    }
}
