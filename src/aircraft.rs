use crate::airport::AirportCode;
use crate::error::{read_json, DataError};
use crate::time::{Minutes, KTS_TO_KMH};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

pub type AircraftCode = Arc<str>;

/// Performance envelope of one aircraft type, as listed in `aircraft.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    pub icao: AircraftCode,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cruise_kts: Option<f64>,
    #[serde(default)]
    pub max_range_km: Option<f64>,
    #[serde(default)]
    pub min_range_km: Option<f64>,
    /// IATA codes of the only airports this type may serve.
    #[serde(default)]
    pub airports: Option<BTreeSet<AirportCode>>,
}

impl Aircraft {
    pub fn cruise_kmh(&self, reference_kts: f64) -> f64 {
        self.cruise_kts.unwrap_or(reference_kts) * KTS_TO_KMH
    }

    pub fn block_minutes(&self, distance_km: f64, reference_kts: f64) -> Minutes {
        Minutes::for_distance(distance_km, self.cruise_kmh(reference_kts))
    }

    pub fn supports_distance(&self, distance_km: f64) -> bool {
        self.max_range_km.map_or(true, |max| distance_km <= max)
    }

    pub fn supports_large(&self, origin: &str, destination: &str, distance_km: f64) -> bool {
        if self.min_range_km.is_some_and(|min| distance_km < min) {
            return false;
        }
        if let Some(allowed) = &self.airports {
            if !allowed.contains(origin) || !allowed.contains(destination) {
                return false;
            }
        }
        self.supports_distance(distance_km)
    }

    pub fn is_restricted(&self) -> bool {
        self.min_range_km.is_some() || self.airports.is_some()
    }

    /// Operability of this type between two IATA endpoints.
    pub fn supports_route(&self, origin: &str, destination: &str, distance_km: f64) -> bool {
        if self.is_restricted() {
            self.supports_large(origin, destination, distance_km)
        } else {
            self.supports_distance(distance_km)
        }
    }
}

#[derive(Default)]
pub struct AircraftTable {
    types: BTreeMap<AircraftCode, Aircraft>,
}

impl AircraftTable {
    pub fn new(aircraft: Vec<Aircraft>) -> AircraftTable {
        let types = aircraft
            .into_iter()
            .map(|mut a| {
                a.icao = Arc::from(a.icao.trim().to_uppercase());
                a.airports = a.airports.map(|set| {
                    set.iter()
                        .map(|code| Arc::from(code.trim().to_uppercase()))
                        .collect()
                });
                (a.icao.clone(), a)
            })
            .collect();
        AircraftTable { types }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, DataError> {
        let raw: Vec<Aircraft> = read_json(path)?;
        Ok(AircraftTable::new(raw))
    }

    pub fn get(&self, code: &str) -> Option<&Aircraft> {
        self.types.get(code.trim().to_uppercase().as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aircraft> {
        self.types.values()
    }

    pub fn codes(&self) -> Vec<AircraftCode> {
        self.types.keys().cloned().collect()
    }
}
