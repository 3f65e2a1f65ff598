//! Input and output path checks.

use std::path::{Path, PathBuf};

use crate::error::{IoError, Result};

/// File extensions accepted as `GeoJSON` input.
pub const GEOJSON_EXTENSIONS: &[&str] = &["geojson", "json", "geojsonl", "jsonl", "ndjson"];

/// Extension of generated files.
pub const PARQUET_EXTENSION: &str = "parquet";

/// Whether `path` has a `GeoJSON` extension (case-insensitive).
#[must_use]
pub fn is_geojson_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            GEOJSON_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

/// Check that `path` is an existing `GeoJSON` file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] when nothing exists at `path` and
/// [`IoError::InvalidPath`] for directories and unsupported extensions.
pub fn validate_input_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    if !path.is_file() {
        return Err(invalid(path, "not a regular file"));
    }
    if !is_geojson_file(path) {
        return Err(invalid(
            path,
            &format!(
                "unsupported extension, expected one of: {}",
                GEOJSON_EXTENSIONS.join(", ")
            ),
        ));
    }
    Ok(())
}

/// Check that `path` can be created as an output file.
///
/// # Errors
///
/// Returns [`IoError::InvalidPath`] for empty paths, directories and paths
/// whose parent directory does not exist.
pub fn validate_output_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(invalid(path, "output path is empty"));
    }
    if path.is_dir() {
        return Err(invalid(path, "output path is a directory"));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.is_dir()
    {
        return Err(invalid(path, "parent directory does not exist"));
    }
    Ok(())
}

/// `<input stem>.parquet` in the current directory.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .map_or_else(|| "output".into(), |stem| stem.to_os_string());
    name.push(".");
    name.push(PARQUET_EXTENSION);
    PathBuf::from(name)
}

fn invalid(path: &Path, reason: &str) -> crate::GeoPqError {
    IoError::InvalidPath {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
    .into()
}
