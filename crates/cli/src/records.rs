//! Loading and saving JSON record files.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read record file '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse record file '{}'", path.display()))
}

/// Writes `value` next to `path` and renames it into place, so a crash never
/// leaves a half-written record.
pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value).context("failed to serialise record")?;
    json.push('\n');

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("failed to write record file '{}'", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace record file '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use images::{AccountId, ComposeJobId, Image, ImageStatus, UpdateRecord, UpdateRecordId};
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load_image() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("image.json");
        std::fs::write(
            &path,
            r#"{"name":"edge-1","account":"0000001","distribution":"rhel-8"}"#,
        )
        .unwrap();

        let mut image: Image = load(&path).unwrap();
        image.mark_submitted(images::BuildFlavor::Commit, ComposeJobId::new("abc").unwrap());
        save(&path, &image).unwrap();

        let reloaded: Image = load(&path).unwrap();
        assert_eq!(reloaded, image);
        assert_eq!(reloaded.status, ImageStatus::Building);
        assert!(!temp.path().join("image.json.tmp").exists());
    }

    #[test]
    fn test_load_update_record() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("update.json");
        std::fs::write(&path, r#"{"id":42,"account":"0000001"}"#).unwrap();

        let record: UpdateRecord = load(&path).unwrap();
        assert_eq!(record.id, UpdateRecordId::new(42));
        assert_eq!(record.account, AccountId::new("0000001").unwrap());
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = load::<Image>(Path::new("/nonexistent/image.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/image.json"));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("image.json");
        std::fs::write(&path, "{").unwrap();

        let err = load::<Image>(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
