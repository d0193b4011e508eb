//! JSON helpers with consistent error mapping.
//!
//! Files are always written whole: the document is rendered in memory, written
//! to a sibling temporary file, then renamed over the destination, so a crash
//! mid-save never leaves a truncated log behind.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Serializes data to compact JSON.
pub fn to_json<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Serializes data to pretty-printed JSON.
pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Deserializes data from a JSON string.
///
/// # Returns
/// Deserialized data on success, `IoError::Validation` for blank input.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }

    serde_json::from_str(json)
        .map_err(|e| IoError::serialization(format!("JSON deserialization failed: {}", e)))
}

/// Writes `bytes` to `path` in one write via a temporary sibling file.
pub fn write_whole_file<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let tmp = temp_sibling(path);
    std::fs::write(&tmp, bytes)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("writing {:?}", tmp)))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(IoError::FileSystem(e).with_context(format!("renaming into {:?}", path)));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("log"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serializes `data` as pretty JSON and writes it whole to `path`.
pub fn write_json_file<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let json = to_json_pretty(data)?;
    write_whole_file(path, json.as_bytes())
}

/// Reads and deserializes JSON from a file.
pub fn read_json_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let json = std::fs::read_to_string(&path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("reading JSON from {:?}", path.as_ref()))
    })?;
    from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("swarmtrail-ser-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_empty_json_fails() {
        let result: Result<TestData> = from_json("  ");
        assert!(matches!(result, Err(IoError::Validation(_))));
    }

    #[test]
    fn test_invalid_json_fails() {
        let result: Result<TestData> = from_json("{ invalid json");
        assert!(matches!(result, Err(IoError::Serialization(_))));
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let dir = scratch_dir();
        let path = dir.join("out.json");
        let data = TestData {
            name: "a".to_string(),
            value: 1,
        };
        write_json_file(&data, &path).unwrap();
        let restored: TestData = read_json_file(&path).unwrap();
        assert_eq!(restored, data);
        assert!(!dir.join("out.json.tmp").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = scratch_dir().join("missing").join("deeper");
        let err = write_whole_file(dir.join("x.json"), b"{}").unwrap_err();
        assert!(matches!(err, IoError::Context { .. }));
    }

    #[test]
    fn test_read_missing_file_has_context() {
        let dir = scratch_dir();
        let err = read_json_file::<TestData, _>(dir.join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("reading JSON"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
