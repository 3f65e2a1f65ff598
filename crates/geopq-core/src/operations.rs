//! Conversion pipeline from `GeoJSON` to GeoParquet.
//!
//! [`generate`] reads the input, infers the property columns, builds the
//! geometry metadata, converts every feature into a row and writes a single
//! Parquet file with the `geo` metadata attached. [`inspect`] runs only the
//! analysis passes.

use std::path::{Path, PathBuf};

use geopq_geojson::{FeatureRecord, read_geojson_file};
use geopq_geoparquet::{
    GeoParquetWriterOptions, PROPERTIES_METADATA_KEY, properties_to_json, write_geoparquet_file,
};
use log::{debug, info, warn};

use crate::analyze::analyze_properties;
use crate::config::GenerateOptions;
use crate::error::{FormatError, GeoPqError, IoErrorExt, Result};
use crate::geometry::{GeometryEncoder, WkbEncoder};
use crate::metadata::build_metadata;
use crate::paths::validate_output_path;
use crate::schema::RowSchema;
use crate::types::{DatasetInfo, FieldInfo, GenerateSummary, GeometryColumnInfo};
use crate::utils::ArrowDataTypeExt;

const INPUT_FORMAT: &str = "GeoJSON";
const OUTPUT_FORMAT: &str = "GeoParquet";

/// Convert a `GeoJSON` file into a GeoParquet file.
///
/// # Errors
///
/// - [`crate::ErrorKind::Config`] for invalid options or output paths.
/// - [`crate::ErrorKind::Input`] if the input cannot be read or parsed, or holds
///   no features.
/// - [`crate::ErrorKind::GeometryEncoding`] if a geometry cannot be encoded;
///   nothing is written in that case.
/// - [`crate::ErrorKind::Output`] if writing fails; a partial file is removed.
pub fn generate(input: &Path, output: &Path, options: &GenerateOptions) -> Result<GenerateSummary> {
    options.validate()?;
    validate_output_path(output)?;

    info!("Starting conversion:");
    info!("Input: {} ({INPUT_FORMAT})", input.display());
    info!("Output: {} ({OUTPUT_FORMAT})", output.display());

    let features = read_features(input)?;
    if features.is_empty() {
        return Err(FormatError::NoFeatures {
            path: input.to_path_buf(),
        }
        .into());
    }

    write_features(&features, output, options, &WkbEncoder)
}

/// Convert features already held in memory into a GeoParquet file.
///
/// # Errors
///
/// Same as [`generate`], minus input reading errors.
pub fn generate_from_features(
    features: &[FeatureRecord],
    output: &Path,
    options: &GenerateOptions,
) -> Result<GenerateSummary> {
    generate_with_encoder(features, output, options, &WkbEncoder)
}

/// Like [`generate_from_features`], with a caller supplied geometry encoder.
///
/// # Errors
///
/// Same as [`generate_from_features`].
pub fn generate_with_encoder(
    features: &[FeatureRecord],
    output: &Path,
    options: &GenerateOptions,
    encoder: &dyn GeometryEncoder,
) -> Result<GenerateSummary> {
    options.validate()?;
    validate_output_path(output)?;

    if features.is_empty() {
        return Err(FormatError::NoFeatures {
            path: PathBuf::from("<in-memory features>"),
        }
        .into());
    }

    write_features(features, output, options, encoder)
}

/// Read a `GeoJSON` file and report its inferred schema and geometry summary.
///
/// # Errors
///
/// Returns an [`crate::ErrorKind::Input`] error if the file cannot be read,
/// parsed, or holds no features.
pub fn inspect(input: &Path) -> Result<DatasetInfo> {
    info!("Inspecting {}", input.display());

    let features = read_features(input)?;
    if features.is_empty() {
        return Err(FormatError::NoFeatures {
            path: input.to_path_buf(),
        }
        .into());
    }

    let descriptors = analyze_properties(&features);
    let metadata = build_metadata(&features, &descriptors);
    let schema = RowSchema::from_descriptors(&descriptors);

    let fields = schema
        .columns()
        .iter()
        .map(|column| FieldInfo {
            name: column.name.clone(),
            data_type: column.semantic_type.type_name().to_string(),
            arrow_type: column.semantic_type.data_type().format(),
            nullable: true,
        })
        .collect();

    let geometry = GeometryColumnInfo {
        name: schema.geometry_column().to_string(),
        encoding: WkbEncoder.encoding().to_string(),
        label: metadata.geometry_label().to_string(),
        geometry_types: metadata
            .geometry
            .sorted_types()
            .iter()
            .map(|t| t.as_str().to_string())
            .collect(),
        bbox: metadata.geometry.bound.map(|b| b.to_bbox()),
    };

    Ok(DatasetInfo {
        dataset: input.display().to_string(),
        format: INPUT_FORMAT.to_string(),
        feature_count: features.len(),
        geometry,
        fields,
    })
}

fn read_features(input: &Path) -> Result<Vec<FeatureRecord>> {
    info!("Reading {INPUT_FORMAT} file: {}", input.display());
    let features = read_geojson_file(input)
        .map_err(|err| GeoPqError::from_read_error(INPUT_FORMAT, input, err))?;
    info!("Read {} feature(s)", features.len());
    Ok(features)
}

fn write_features(
    features: &[FeatureRecord],
    output: &Path,
    options: &GenerateOptions,
    encoder: &dyn GeometryEncoder,
) -> Result<GenerateSummary> {
    info!("Analyzing properties");
    let descriptors = analyze_properties(features);
    debug!("Inferred {} property column(s)", descriptors.len());

    info!("Building metadata");
    let metadata = build_metadata(features, &descriptors);

    info!("Converting {} feature(s)", features.len());
    let schema = RowSchema::from_descriptors(&descriptors);
    let rows = schema.to_rows(features, encoder)?;
    let coercion_failures: usize = rows.iter().map(|row| row.coercion_failures).sum();
    if coercion_failures > 0 {
        warn!(
            "{coercion_failures} property value(s) did not match their column type and were stored as null"
        );
    }
    let batch = schema.to_record_batch(&rows)?;

    let mut writer_options = GeoParquetWriterOptions::new()
        .with_compression(options.compression.to_parquet())
        .with_max_row_group_size(options.max_row_group_size);
    if options.property_metadata {
        let properties = properties_to_json(&metadata.properties)
            .with_write_context(OUTPUT_FORMAT, output)?;
        writer_options = writer_options.with_key_value_metadata(PROPERTIES_METADATA_KEY, properties);
    }

    info!(
        "Writing {OUTPUT_FORMAT} file: {} ({} compression)",
        output.display(),
        options.compression
    );
    write_geoparquet_file(
        output,
        schema.to_arrow_schema(),
        &[batch],
        &metadata.geo,
        &writer_options,
    )
    .with_write_context(OUTPUT_FORMAT, output)?;

    info!("Conversion completed successfully");
    Ok(GenerateSummary {
        feature_count: features.len(),
        descriptors,
        geometry: metadata.geometry,
        output_path: output.to_path_buf(),
        coercion_failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::error::IoError;
    use crate::config::CompressionCodec;
    use crate::geometry::EncodeError;
    use arrow_array::{Array, Int64Array, StringArray};
    use geopq_geoparquet::{GeoParquetGeometryType, read_geo_metadata, read_key_value_metadata};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create test `GeoJSON` data
    fn create_test_geojson(path: &Path) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(
            file,
            r#"{{
  "type": "FeatureCollection",
  "features": [
    {{
      "type": "Feature",
      "geometry": {{
        "type": "Point",
        "coordinates": [-74.0060, 40.7128]
      }},
      "properties": {{
        "name": "New York",
        "population": 8336817
      }}
    }},
    {{
      "type": "Feature",
      "geometry": {{
        "type": "Point",
        "coordinates": [-118.2437, 34.0522]
      }},
      "properties": {{
        "name": "Los Angeles",
        "population": "unknown"
      }}
    }}
  ]
}}"#
        )?;
        Ok(())
    }

    fn read_batches(path: &Path) -> Vec<arrow_array::RecordBatch> {
        let file = File::open(path).unwrap();
        ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap()
            .map(|batch| batch.unwrap())
            .collect()
    }

    #[test]
    fn test_generate_geojson_to_geoparquet() {
        let temp_dir = TempDir::new().unwrap();
        let input_path = temp_dir.path().join("cities.geojson");
        let output_path = temp_dir.path().join("cities.parquet");
        create_test_geojson(&input_path).unwrap();

        let summary = generate(&input_path, &output_path, &GenerateOptions::default()).unwrap();

        assert_eq!(summary.feature_count, 2);
        assert_eq!(summary.output_path, output_path);
        assert_eq!(summary.coercion_failures, 0);
        assert_eq!(summary.geometry.label(), "Point");
        let names: Vec<&str> = summary.descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["name", "population"]);

        let batches = read_batches(&output_path);
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).name(), "geometry");

        // Integer vs string conflict widens to text
        let population = batch
            .column(2)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(population.value(0), "8336817");
        assert_eq!(population.value(1), "unknown");

        let geo = read_geo_metadata(&output_path).unwrap().unwrap();
        let column = geo.primary().unwrap();
        assert_eq!(column.geometry_types, vec![GeoParquetGeometryType::Point]);
        assert_eq!(
            column.bbox,
            Some(vec![-118.2437, 34.0522, -74.0060, 40.7128])
        );
        assert!(
            read_key_value_metadata(&output_path, PROPERTIES_METADATA_KEY)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_generate_with_property_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let input_path = temp_dir.path().join("cities.geojson");
        let output_path = temp_dir.path().join("cities.parquet");
        create_test_geojson(&input_path).unwrap();

        let options = GenerateOptions::new()
            .with_compression(CompressionCodec::Snappy)
            .with_property_metadata(true);
        generate(&input_path, &output_path, &options).unwrap();

        let json = read_key_value_metadata(&output_path, PROPERTIES_METADATA_KEY)
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"name": "name", "type": "string", "nullable": true},
                {"name": "population", "type": "string", "nullable": true}
            ])
        );
    }

    #[test]
    fn test_generate_counts_coercion_failures() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("out.parquet");
        let features: Vec<FeatureRecord> = [
            serde_json::json!({"id": 1}),
            serde_json::json!({"id": 2.75}),
            serde_json::json!({"id": null}),
        ]
        .into_iter()
        .map(|props| match props {
            serde_json::Value::Object(map) => FeatureRecord::new(None, Some(map)),
            _ => unreachable!(),
        })
        .collect();

        // Integer + Float widens to String, so nothing is lost
        let summary =
            generate_from_features(&features, &output_path, &GenerateOptions::default()).unwrap();
        assert_eq!(summary.coercion_failures, 0);
        assert_eq!(summary.geometry.label(), "Unknown");

        let batches = read_batches(&output_path);
        let ids = batches[0]
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(ids.value(0), "1");
        assert_eq!(ids.value(1), "2.75");
        assert!(ids.is_null(2));
    }

    #[test]
    fn test_generate_empty_collection_is_input_error() {
        let temp_dir = TempDir::new().unwrap();
        let input_path = temp_dir.path().join("empty.geojson");
        let output_path = temp_dir.path().join("empty.parquet");
        std::fs::write(&input_path, r#"{"type":"FeatureCollection","features":[]}"#).unwrap();

        let err = generate(&input_path, &output_path, &GenerateOptions::default()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(matches!(err, GeoPqError::Format(FormatError::NoFeatures { .. })));
        assert!(!output_path.exists());
    }

    #[test]
    fn test_generate_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let err = generate(
            &temp_dir.path().join("missing.geojson"),
            &temp_dir.path().join("out.parquet"),
            &GenerateOptions::default(),
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(matches!(err, GeoPqError::Io(IoError::FileNotFound { .. })));
    }

    #[test]
    fn test_generate_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let input_path = temp_dir.path().join("bad.geojson");
        std::fs::write(&input_path, "not valid json").unwrap();

        let err = generate(
            &input_path,
            &temp_dir.path().join("out.parquet"),
            &GenerateOptions::default(),
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(err.user_message().contains("Parse error in GeoJSON"));
    }

    #[test]
    fn test_generate_invalid_options() {
        let temp_dir = TempDir::new().unwrap();
        let input_path = temp_dir.path().join("cities.geojson");
        create_test_geojson(&input_path).unwrap();

        let err = generate(
            &input_path,
            &temp_dir.path().join("out.parquet"),
            &GenerateOptions::new().with_max_row_group_size(0),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = generate(&input_path, temp_dir.path(), &GenerateOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    struct RejectingEncoder;

    impl GeometryEncoder for RejectingEncoder {
        fn encoding(&self) -> geopq_geoparquet::GeoParquetColumnEncoding {
            geopq_geoparquet::GeoParquetColumnEncoding::WKB
        }

        fn encode(
            &self,
            _geometry: &geo_types::Geometry<f64>,
        ) -> std::result::Result<Vec<u8>, EncodeError> {
            Err(EncodeError::new("rejected"))
        }
    }

    #[test]
    fn test_geometry_encoding_failure_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("out.parquet");
        let features = vec![FeatureRecord::new(
            Some(geo_types::Geometry::Point(geo_types::Point::new(1.0, 2.0))),
            None,
        )];

        let err = generate_with_encoder(
            &features,
            &output_path,
            &GenerateOptions::default(),
            &RejectingEncoder,
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::GeometryEncoding);
        assert!(!output_path.exists());
    }

    #[test]
    fn test_generate_from_no_features() {
        let temp_dir = TempDir::new().unwrap();
        let err = generate_from_features(
            &[],
            &temp_dir.path().join("out.parquet"),
            &GenerateOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn test_row_group_size_option() {
        let temp_dir = TempDir::new().unwrap();
        let input_path = temp_dir.path().join("cities.geojson");
        let output_path = temp_dir.path().join("cities.parquet");
        create_test_geojson(&input_path).unwrap();

        generate(
            &input_path,
            &output_path,
            &GenerateOptions::new().with_max_row_group_size(1),
        )
        .unwrap();

        let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&output_path).unwrap())
            .unwrap();
        assert_eq!(builder.metadata().num_row_groups(), 2);
    }

    #[test]
    fn test_inspect() {
        let temp_dir = TempDir::new().unwrap();
        let input_path = temp_dir.path().join("cities.geojson");
        create_test_geojson(&input_path).unwrap();

        let info = inspect(&input_path).unwrap();

        assert_eq!(info.format, "GeoJSON");
        assert_eq!(info.feature_count, 2);
        assert_eq!(info.geometry.name, "geometry");
        assert_eq!(info.geometry.encoding, "WKB");
        assert_eq!(info.geometry.label, "Point");
        assert_eq!(info.geometry.geometry_types, vec!["Point".to_string()]);
        assert_eq!(info.fields.len(), 2);
        assert_eq!(info.fields[1].name, "population");
        assert_eq!(info.fields[1].data_type, "string");
        assert_eq!(info.fields[1].arrow_type, "String");
    }

    #[test]
    fn test_inspect_integer_column() {
        let temp_dir = TempDir::new().unwrap();
        let input_path = temp_dir.path().join("ids.ndjson");
        std::fs::write(
            &input_path,
            "{\"type\":\"Feature\",\"geometry\":null,\"properties\":{\"id\":1}}\n\
             {\"type\":\"Feature\",\"geometry\":null,\"properties\":{\"id\":2}}\n",
        )
        .unwrap();

        let info = inspect(&input_path).unwrap();
        assert_eq!(info.geometry.label, "Unknown");
        assert!(info.geometry.bbox.is_none());
        assert_eq!(info.fields[0].data_type, "int64");
        assert_eq!(info.fields[0].arrow_type, "Int64");

        let output_path = temp_dir.path().join("ids.parquet");
        generate(&input_path, &output_path, &GenerateOptions::default()).unwrap();
        let batches = read_batches(&output_path);
        let ids = batches[0]
            .column(1)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(ids.values().to_vec(), vec![1, 2]);
        assert_eq!(batches[0].column(0).null_count(), 2);
    }
}
