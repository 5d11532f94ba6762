use serde::{Deserialize, Serialize};

use crate::catalog::MessageCatalog;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Static facility catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FacilityEntry {
    pub specialty_id: String,
    pub city: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct FacilityCatalog {
    pub default_city: String,
    pub facilities: Vec<FacilityEntry>,
}

/// One facility in a lookup result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

/// Facility hint attached to RESULT envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityHint {
    pub specialty_id: String,
    pub city: String,
    pub items: Vec<FacilityItem>,
    pub disclaimer: String,
}

fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let p1 = lat1.to_radians();
    let p2 = lat2.to_radians();
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (d_lon / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Pure in-memory facility index. No provider ranking: with coordinates the
/// list is sorted by distance, otherwise insertion order is preserved.
#[derive(Debug)]
pub struct FacilityDirectory<'a> {
    catalog: &'a FacilityCatalog,
    messages: &'a MessageCatalog,
}

impl<'a> FacilityDirectory<'a> {
    pub fn new(catalog: &'a FacilityCatalog, messages: &'a MessageCatalog) -> Self {
        Self { catalog, messages }
    }

    pub fn lookup(
        &self,
        specialty_id: &str,
        locale: &str,
        city: Option<&str>,
        lat: Option<f64>,
        lon: Option<f64>,
        limit: usize,
    ) -> FacilityHint {
        let city = city.unwrap_or(&self.catalog.default_city);

        let mut items: Vec<FacilityItem> = self
            .catalog
            .facilities
            .iter()
            .filter(|f| f.specialty_id == specialty_id && f.city == city)
            .map(|f| {
                let distance_km = match (lat, lon, f.lat, f.lon) {
                    (Some(lat1), Some(lon1), Some(lat2), Some(lon2)) => {
                        Some(round1(haversine_km(lat1, lon1, lat2, lon2)))
                    }
                    _ => None,
                };
                FacilityItem {
                    name: f.name.clone(),
                    kind: f.kind.clone(),
                    address: f.address.clone(),
                    distance_km,
                    lat: f.lat,
                    lon: f.lon,
                }
            })
            .collect();

        if items.iter().any(|i| i.distance_km.is_some()) {
            items.sort_by(|a, b| {
                let da = a.distance_km.unwrap_or(f64::MAX);
                let db = b.distance_km.unwrap_or(f64::MAX);
                da.partial_cmp(&db)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.name.cmp(&b.name))
            });
        }
        items.truncate(limit);

        FacilityHint {
            specialty_id: specialty_id.to_string(),
            city: city.to_string(),
            items,
            disclaimer: self.messages.text(locale, "facility_disclaimer"),
        }
    }
}
