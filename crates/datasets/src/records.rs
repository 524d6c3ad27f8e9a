//! Serde models for the dataset files and their conversion into scene
//! values. The on-disk shapes follow the provisioning contract: region
//! polygons keyed by a stable id, media records with coordinates and
//! social links, per-region aggregates, and a postal-code table.

use std::collections::BTreeMap;

use foundation::math::GeoCoordinate;
use scene::{AggregateBucket, MediaClass, MediaRecord, RegionId, RegionShape, SocialLinks};
use serde::{Deserialize, Serialize};

use crate::package::DatasetError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionFeatureJson {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Rings of [longitude, latitude] pairs; first ring is the outer
    /// boundary.
    pub rings: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaRecordJson {
    pub name: String,
    pub class: String,
    #[serde(default)]
    pub subclass: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub admin_area: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateJson {
    pub region: String,
    pub total: u32,
    #[serde(default)]
    pub newspaper: u32,
    #[serde(default)]
    pub tv: u32,
    #[serde(default)]
    pub broadcast: u32,
    #[serde(default)]
    pub radio: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoordinateJson {
    pub latitude: f64,
    pub longitude: f64,
}

/// Postal table file: code -> coordinate. A `BTreeMap` keeps the load
/// order deterministic (lexicographic by code), which the nearest-code
/// tie-break depends on.
pub type PostalJson = BTreeMap<String, CoordinateJson>;

pub fn region_from_json(json: RegionFeatureJson) -> Result<RegionShape, DatasetError> {
    let mut rings = Vec::with_capacity(json.rings.len());
    for ring in &json.rings {
        let mut out = Vec::with_capacity(ring.len());
        for [lon, lat] in ring {
            let coord = GeoCoordinate::try_new(*lat, *lon).ok_or_else(|| {
                DatasetError::InvalidCoordinate {
                    context: format!("region {}", json.id),
                }
            })?;
            out.push(coord);
        }
        rings.push(out);
    }
    Ok(RegionShape {
        id: RegionId::new(&json.id),
        name: json.name.unwrap_or_else(|| json.id.clone()),
        rings,
    })
}

pub fn media_from_json(json: MediaRecordJson) -> Result<MediaRecord, DatasetError> {
    let location = GeoCoordinate::try_new(json.latitude, json.longitude).ok_or_else(|| {
        DatasetError::InvalidCoordinate {
            context: format!("media record {}", json.name),
        }
    })?;
    let class = MediaClass::parse(&json.class).ok_or_else(|| DatasetError::UnknownClass {
        name: json.name.clone(),
        value: json.class.clone(),
    })?;
    Ok(MediaRecord {
        name: json.name,
        class,
        subclass: json.subclass,
        location,
        socials: SocialLinks {
            website: json.website,
            twitter: json.twitter,
            facebook: json.facebook,
            video: json.video,
        },
        region: json.region.map(RegionId::new),
        locality: json.locality,
        admin_area: json.admin_area,
    })
}

pub fn aggregate_from_json(json: AggregateJson) -> AggregateBucket {
    AggregateBucket {
        region: RegionId::new(json.region),
        total: json.total,
        newspaper: json.newspaper,
        tv: json.tv,
        broadcast: json.broadcast,
        radio: json.radio,
    }
}

pub fn postal_from_json(json: PostalJson) -> Result<Vec<(String, GeoCoordinate)>, DatasetError> {
    let mut out = Vec::with_capacity(json.len());
    for (code, coord) in json {
        let coord = GeoCoordinate::try_new(coord.latitude, coord.longitude).ok_or_else(|| {
            DatasetError::InvalidCoordinate {
                context: format!("postal code {code}"),
            }
        })?;
        out.push((code, coord));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{MediaRecordJson, media_from_json};
    use crate::package::DatasetError;
    use scene::MediaClass;

    fn base_record() -> MediaRecordJson {
        MediaRecordJson {
            name: "The Daily".to_string(),
            class: "newspaper".to_string(),
            subclass: Some("local".to_string()),
            latitude: 36.85,
            longitude: -76.29,
            website: Some("https://example.com".to_string()),
            twitter: None,
            facebook: None,
            video: None,
            region: Some("51710".to_string()),
            locality: Some("Norfolk".to_string()),
            admin_area: Some("VA".to_string()),
        }
    }

    #[test]
    fn converts_valid_media_record() {
        let record = media_from_json(base_record()).unwrap();
        assert_eq!(record.class, MediaClass::Newspaper);
        assert_eq!(record.region.as_ref().unwrap().as_str(), "51710");
    }

    #[test]
    fn record_without_region_stays_loadable() {
        let mut json = base_record();
        json.region = None;
        let record = media_from_json(json).unwrap();
        assert!(record.region.is_none());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut json = base_record();
        json.latitude = 123.0;
        assert!(matches!(
            media_from_json(json),
            Err(DatasetError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn rejects_unknown_class() {
        let mut json = base_record();
        json.class = "podcast".to_string();
        assert!(matches!(
            media_from_json(json),
            Err(DatasetError::UnknownClass { .. })
        ));
    }
}
