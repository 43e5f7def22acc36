//! Durable storage for the identity mapping.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CalSyncError, CalSyncResult};
use crate::identity::SyncKey;
use crate::mapping::{IdentityMapping, MappingRow};

const MAPPING_VERSION: u32 = 1;

/// Load/save the whole mapping at once.
pub trait MappingStore {
    fn load(&self) -> CalSyncResult<IdentityMapping>;
    fn save(&self, mapping: &IdentityMapping) -> CalSyncResult<()>;
}

impl<T: MappingStore + ?Sized> MappingStore for &T {
    fn load(&self) -> CalSyncResult<IdentityMapping> {
        (**self).load()
    }

    fn save(&self, mapping: &IdentityMapping) -> CalSyncResult<()> {
        (**self).save(mapping)
    }
}

#[derive(Serialize, Deserialize)]
struct MappingFile {
    version: u32,
    rows: Vec<StoredRow>,
}

#[derive(Serialize, Deserialize)]
struct StoredRow {
    sync_key: SyncKey,
    #[serde(flatten)]
    row: MappingRow,
}

/// JSON file on disk, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct FileMappingStore {
    path: PathBuf,
}

impl FileMappingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileMappingStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingStore for FileMappingStore {
    fn load(&self) -> CalSyncResult<IdentityMapping> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(IdentityMapping::new());
            }
            Err(e) => {
                return Err(CalSyncError::MappingCorruption(format!(
                    "could not read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let file: MappingFile = serde_json::from_str(&content).map_err(|e| {
            CalSyncError::MappingCorruption(format!("{}: {}", self.path.display(), e))
        })?;

        if file.version != MAPPING_VERSION {
            return Err(CalSyncError::MappingCorruption(format!(
                "{}: unsupported version {}",
                self.path.display(),
                file.version
            )));
        }

        IdentityMapping::from_rows(file.rows.into_iter().map(|r| (r.sync_key, r.row)))
    }

    fn save(&self, mapping: &IdentityMapping) -> CalSyncResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        // Rows come out of a BTreeMap, so output is deterministic
        let file = MappingFile {
            version: MAPPING_VERSION,
            rows: mapping
                .rows()
                .map(|(key, row)| StoredRow {
                    sync_key: key.clone(),
                    row: row.clone(),
                })
                .collect(),
        };
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| CalSyncError::Serialization(e.to_string()))?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ContentHash;
    use chrono::{TimeZone, Utc};

    fn sample_mapping() -> IdentityMapping {
        let start = Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap();
        let mut mapping = IdentityMapping::new();
        mapping.insert(
            SyncKey::from("k1".to_string()),
            MappingRow {
                provider_a_id: "google-1".into(),
                provider_b_id: "icloud-1".into(),
                content_hash: ContentHash::from("abc".to_string()),
                last_synced_at: start,
                start,
            },
        );
        mapping
    }

    #[test]
    fn test_missing_file_is_empty_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMappingStore::new(dir.path().join("mapping.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMappingStore::new(dir.path().join("state/mapping.json"));

        store.save(&sample_mapping()).unwrap();
        assert_eq!(store.load().unwrap(), sample_mapping());
        assert!(!dir.path().join("state/mapping.json.tmp").exists());
    }

    #[test]
    fn test_garbage_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FileMappingStore::new(&path).load().unwrap_err();
        assert!(matches!(err, CalSyncError::MappingCorruption(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unknown_version_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");
        std::fs::write(&path, r#"{"version": 7, "rows": []}"#).unwrap();

        assert!(matches!(
            FileMappingStore::new(&path).load(),
            Err(CalSyncError::MappingCorruption(_))
        ));
    }
}
