use serde::{Deserialize, Serialize};

pub const MANIFEST_VERSION: &str = "1.0";

/// Dataset entry kinds the loader understands.
pub const KIND_REGIONS: &str = "regions";
pub const KIND_MEDIA: &str = "media";
pub const KIND_AGGREGATES: &str = "aggregates";
pub const KIND_POSTAL: &str = "postal";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AtlasManifest {
    pub version: String,
    pub package_id: String,
    pub name: Option<String>,
    pub entries: Vec<DatasetEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetEntry {
    pub kind: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl AtlasManifest {
    pub fn new(package_id: impl Into<String>) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            package_id: package_id.into(),
            name: None,
            entries: Vec::new(),
        }
    }
}

/// Hex blake3 digest of a payload, as recorded in `content_hash`.
pub fn content_hash_hex(bytes: &[u8]) -> String {
    let hash = blake3::hash(bytes);
    let mut out = String::with_capacity(64);
    for b in hash.as_bytes() {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
