//! Dataset sources: CSV loading and one-time download with a local cache.

use crate::error::{DataError, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Load a CSV file with header and schema inference.
///
/// The schema (column set and dtypes) is fixed once the frame is built;
/// downstream steps never re-infer types.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    debug!("Loading CSV from {}", path.display());

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()?;

    info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Download a CSV once, caching it at `cache_path`, then load it.
///
/// If the cache file already exists the download is skipped entirely, so
/// repeated runs are offline after the first.
pub fn fetch_csv(url: &str, cache_path: impl AsRef<Path>) -> Result<DataFrame> {
    let cache_path = cache_path.as_ref();

    if !cache_path.exists() {
        info!("Cache miss; downloading {} to {}", url, cache_path.display());
        if let Some(parent) = cache_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = reqwest::blocking::get(url)
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(|e| DataError::Download {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        std::fs::write(cache_path, body)?;
    } else {
        debug!("Cache hit for {} at {}", url, cache_path.display());
    }

    load_csv(cache_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_csv_roundtrip() {
        let dir = std::env::temp_dir().join("tabml_source_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tiny.csv");
        std::fs::write(&path, "sepal_length,species\n5.1,setosa\n7.0,versicolor\n").unwrap();

        let df = load_csv(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
        assert!(df.column("sepal_length").is_ok());
        assert!(df.column("species").is_ok());
    }

    #[test]
    fn test_load_csv_missing_file() {
        let result = load_csv("/definitely/not/here.csv");
        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_csv_uses_cache_without_network() {
        // A pre-populated cache file must short-circuit the download, so an
        // unreachable URL is never contacted.
        let dir = std::env::temp_dir().join("tabml_source_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cached.csv");
        std::fs::write(&path, "x,y\n1,2\n3,4\n").unwrap();

        let df = fetch_csv("http://127.0.0.1:1/never", &path).unwrap();
        assert_eq!(df.height(), 2);
    }
}
