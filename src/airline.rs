use crate::aircraft::AircraftCode;
use crate::error::{read_json, DataError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

pub type AirlineName = Arc<str>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Airline {
    pub name: AirlineName,
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
    #[serde(default)]
    pub callsign: Option<String>,
    /// Types this airline is allowed to fly. `None` means any known type.
    #[serde(default)]
    pub aircraft: Option<Vec<AircraftCode>>,
}

impl Airline {
    pub fn iata_code(&self) -> Option<&str> {
        self.iata
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    pub fn permits(&self, aircraft: &str) -> bool {
        self.aircraft
            .as_ref()
            .map_or(true, |fleet| fleet.iter().any(|a| a.eq_ignore_ascii_case(aircraft)))
    }

    pub fn file_stem(&self) -> String {
        file_stem(&self.name)
    }
}

pub fn file_stem(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace(['\r', '\n'], "")
}

pub fn route_file_name(name: &str) -> String {
    format!("{}_routes.json", file_stem(name))
}

/// Airlines the builder knows about, indexed by their IATA carrier code.
#[derive(Default)]
pub struct AirlineDirectory {
    by_iata: BTreeMap<String, Airline>,
}

impl AirlineDirectory {
    /// Keeps only airlines with a confirmed IATA code. Later duplicates of a code are dropped.
    pub fn new(airlines: Vec<Airline>) -> AirlineDirectory {
        let mut by_iata = BTreeMap::new();
        for airline in airlines {
            let Some(code) = airline.iata_code().map(str::to_uppercase) else {
                log::debug!("Skipping airline without IATA code: {}", airline.name);
                continue;
            };
            by_iata.entry(code).or_insert(airline);
        }
        AirlineDirectory { by_iata }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, DataError> {
        let raw: Vec<Airline> = read_json(path)?;
        Ok(AirlineDirectory::new(raw))
    }

    pub fn by_iata(&self, code: &str) -> Option<&Airline> {
        self.by_iata.get(code.trim().to_uppercase().as_str())
    }

    pub fn by_name(&self, name: &str) -> Option<&Airline> {
        let stem = file_stem(name);
        self.by_iata.values().find(|a| a.file_stem() == stem)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Airline> {
        self.by_iata.values()
    }

    pub fn len(&self) -> usize {
        self.by_iata.len()
    }
}
