use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use foundation::math::GeoCoordinate;
use scene::{AggregateBucket, MediaRecord, RegionShape};

use crate::manifest::{
    AtlasManifest, KIND_AGGREGATES, KIND_MEDIA, KIND_POSTAL, KIND_REGIONS, MANIFEST_VERSION,
    content_hash_hex,
};
use crate::records::{
    AggregateJson, MediaRecordJson, PostalJson, RegionFeatureJson, aggregate_from_json,
    media_from_json, postal_from_json, region_from_json,
};

pub const MANIFEST_FILE_NAME: &str = "atlas.manifest.json";

#[derive(Debug)]
pub enum DatasetError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    UnsupportedVersion {
        found: String,
    },
    HashMismatch {
        path: PathBuf,
    },
    InvalidCoordinate {
        context: String,
    },
    UnknownClass {
        name: String,
        value: String,
    },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            DatasetError::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
            DatasetError::UnsupportedVersion { found } => {
                write!(f, "unsupported manifest version: {found}")
            }
            DatasetError::HashMismatch { path } => {
                write!(f, "content hash mismatch for {}", path.display())
            }
            DatasetError::InvalidCoordinate { context } => {
                write!(f, "coordinate out of range in {context}")
            }
            DatasetError::UnknownClass { name, value } => {
                write!(f, "unknown media class {value:?} on record {name}")
            }
        }
    }
}

impl std::error::Error for DatasetError {}

/// A dataset package rooted at a directory with an `atlas.manifest.json`.
#[derive(Debug, Clone)]
pub struct AtlasPackage {
    root: PathBuf,
    manifest: AtlasManifest,
}

impl AtlasPackage {
    pub fn load(root: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let root = root.as_ref().to_path_buf();
        let manifest_path = root.join(MANIFEST_FILE_NAME);
        let payload = fs::read_to_string(&manifest_path).map_err(|e| DatasetError::Io {
            path: manifest_path.clone(),
            source: e,
        })?;
        let manifest: AtlasManifest =
            serde_json::from_str(&payload).map_err(|e| DatasetError::Parse {
                path: manifest_path,
                source: e,
            })?;

        if manifest.version != MANIFEST_VERSION {
            return Err(DatasetError::UnsupportedVersion {
                found: manifest.version,
            });
        }

        Ok(Self { root, manifest })
    }

    pub fn manifest(&self) -> &AtlasManifest {
        &self.manifest
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read one entry's payload, verifying its content hash when present.
    pub fn entry_bytes(&self, kind: &str) -> Result<Option<Vec<u8>>, DatasetError> {
        let Some(entry) = self.manifest.entries.iter().find(|e| e.kind == kind) else {
            return Ok(None);
        };
        let path = self.root.join(&entry.path);
        let bytes = fs::read(&path).map_err(|e| DatasetError::Io {
            path: path.clone(),
            source: e,
        })?;
        if let Some(expected) = &entry.content_hash {
            if &content_hash_hex(&bytes) != expected {
                return Err(DatasetError::HashMismatch { path });
            }
        }
        Ok(Some(bytes))
    }

    fn parse_entry<T: serde::de::DeserializeOwned>(
        &self,
        kind: &str,
    ) -> Result<Option<T>, DatasetError> {
        let Some(bytes) = self.entry_bytes(kind)? else {
            return Ok(None);
        };
        let path = self
            .manifest
            .entries
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| self.root.join(&e.path))
            .unwrap_or_default();
        let value = serde_json::from_slice(&bytes).map_err(|e| DatasetError::Parse {
            path,
            source: e,
        })?;
        Ok(Some(value))
    }
}

/// Everything a map view consumes, built once at load time.
#[derive(Debug, Default)]
pub struct AtlasData {
    pub regions: Vec<RegionShape>,
    pub records: Vec<MediaRecord>,
    pub aggregates: Vec<AggregateBucket>,
    pub postal_entries: Vec<(String, GeoCoordinate)>,
}

/// Load a full dataset package from a directory.
///
/// Entries missing from the manifest load as empty collections; a record
/// with no region linkage is kept (it renders as a marker but feeds no
/// choropleth bucket).
pub fn load_atlas_from_package_dir(root: impl AsRef<Path>) -> Result<AtlasData, DatasetError> {
    let package = AtlasPackage::load(root)?;
    load_atlas_from_package(&package)
}

pub fn load_atlas_from_package(package: &AtlasPackage) -> Result<AtlasData, DatasetError> {
    let mut data = AtlasData::default();

    if let Some(regions) = package.parse_entry::<Vec<RegionFeatureJson>>(KIND_REGIONS)? {
        data.regions = regions
            .into_iter()
            .map(region_from_json)
            .collect::<Result<_, _>>()?;
    }
    if let Some(media) = package.parse_entry::<Vec<MediaRecordJson>>(KIND_MEDIA)? {
        data.records = media
            .into_iter()
            .map(media_from_json)
            .collect::<Result<_, _>>()?;
    }
    if let Some(aggregates) = package.parse_entry::<Vec<AggregateJson>>(KIND_AGGREGATES)? {
        data.aggregates = aggregates.into_iter().map(aggregate_from_json).collect();
    }
    if let Some(postal) = package.parse_entry::<PostalJson>(KIND_POSTAL)? {
        data.postal_entries = postal_from_json(postal)?;
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::{AtlasPackage, DatasetError, MANIFEST_FILE_NAME, load_atlas_from_package_dir};
    use crate::manifest::{AtlasManifest, DatasetEntry, content_hash_hex};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;

    fn temp_dir(label: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        let id = format!("atlas_dataset_{label}_{}", std::process::id());
        dir.push(id);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn write_demo_package(root: &PathBuf, hash_media: bool) {
        let media = r#"[
            {"name": "Harbor Ledger", "class": "newspaper", "latitude": 36.85, "longitude": -76.29, "region": "51710"},
            {"name": "Bay Radio", "class": "radio", "latitude": 36.9, "longitude": -76.2}
        ]"#;
        let regions = r#"[
            {"id": "51710", "name": "Norfolk", "rings": [[[-76.4, 36.7], [-76.1, 36.7], [-76.1, 37.0], [-76.4, 37.0]]]}
        ]"#;
        let aggregates = r#"[
            {"region": "51710", "total": 2, "newspaper": 1, "radio": 1}
        ]"#;
        let postal = r#"{
            "23505": {"latitude": 36.91, "longitude": -76.28}
        }"#;

        fs::write(root.join("media.json"), media).unwrap();
        fs::write(root.join("regions.json"), regions).unwrap();
        fs::write(root.join("aggregates.json"), aggregates).unwrap();
        fs::write(root.join("postal.json"), postal).unwrap();

        let mut manifest = AtlasManifest::new("demo-package");
        manifest.name = Some("Demo".to_string());
        for (kind, path) in [
            ("regions", "regions.json"),
            ("media", "media.json"),
            ("aggregates", "aggregates.json"),
            ("postal", "postal.json"),
        ] {
            let content_hash = if hash_media && kind == "media" {
                Some(content_hash_hex(media.as_bytes()))
            } else {
                None
            };
            manifest.entries.push(DatasetEntry {
                kind: kind.to_string(),
                path: path.to_string(),
                content_hash,
            });
        }
        let payload = serde_json::to_string_pretty(&manifest).unwrap();
        fs::write(root.join(MANIFEST_FILE_NAME), payload).unwrap();
    }

    #[test]
    fn loads_a_full_package() {
        let root = temp_dir("load");
        write_demo_package(&root, true);

        let data = load_atlas_from_package_dir(&root).expect("load package");
        assert_eq!(data.regions.len(), 1);
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.aggregates.len(), 1);
        assert_eq!(data.postal_entries.len(), 1);

        // The record without a region linkage is still present.
        assert!(data.records[1].region.is_none());
        assert_eq!(data.aggregates[0].total, 2);
    }

    #[test]
    fn rejects_unsupported_manifest_version() {
        let root = temp_dir("version");
        write_demo_package(&root, false);
        let mut manifest = AtlasManifest::new("demo-package");
        manifest.version = "2.0".to_string();
        fs::write(
            root.join(MANIFEST_FILE_NAME),
            serde_json::to_string(&manifest).unwrap(),
        )
        .unwrap();

        let err = AtlasPackage::load(&root).expect_err("expect version error");
        match err {
            DatasetError::UnsupportedVersion { found } => assert_eq!(found, "2.0"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn detects_content_hash_mismatch() {
        let root = temp_dir("hash");
        write_demo_package(&root, true);
        // Tamper with the hashed payload.
        fs::write(root.join("media.json"), "[]").unwrap();

        let err = load_atlas_from_package_dir(&root).expect_err("expect hash error");
        assert!(matches!(err, DatasetError::HashMismatch { .. }));
    }

    #[test]
    fn missing_manifest_is_an_io_error() {
        let root = temp_dir("missing");
        let err = AtlasPackage::load(&root).expect_err("expect io error");
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
