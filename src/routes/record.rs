use crate::aircraft::AircraftCode;
use crate::airline::route_file_name;
use crate::airport::AirportCode;
use crate::error::{read_json, DataError};
use crate::time::TimeSplit;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SUPPORTS_PREFIX: &str = "supports_";

/// Aircraft operability flags of one route, written as `supports_<code>` keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Support(BTreeMap<AircraftCode, bool>);

impl Support {
    pub fn new() -> Support {
        Support(BTreeMap::new())
    }

    pub fn insert(&mut self, aircraft: AircraftCode, supported: bool) {
        self.0.insert(Arc::from(aircraft.to_uppercase()), supported);
    }

    /// `None` when the route carries no flag for this type.
    pub fn get(&self, aircraft: &str) -> Option<bool> {
        self.0.get(aircraft.trim().to_uppercase().as_str()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AircraftCode, bool)> {
        self.0.iter().map(|(code, flag)| (code, *flag))
    }
}

impl Serialize for Support {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (code, flag) in &self.0 {
            map.serialize_entry(&format!("{}{}", SUPPORTS_PREFIX, code.to_lowercase()), flag)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Support {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SupportVisitor;

        impl<'de> Visitor<'de> for SupportVisitor {
            type Value = Support;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of supports_<aircraft> flags")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Support, A::Error> {
                let mut support = Support::new();
                while let Some(key) = access.next_key::<String>()? {
                    match key.strip_prefix(SUPPORTS_PREFIX) {
                        Some(code) if !code.is_empty() => {
                            let flag: bool = access.next_value()?;
                            support.insert(Arc::from(code), flag);
                        }
                        _ => {
                            access.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(support)
            }
        }

        deserializer.deserialize_map(SupportVisitor)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub from: AirportCode,
    pub from_name: String,
    #[serde(default)]
    pub from_icao: String,
    pub to: AirportCode,
    pub to_name: String,
    #[serde(default)]
    pub to_icao: String,
    pub distance_km: f64,
    pub estimated_time_min: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<TimeSplit>,
    #[serde(flatten)]
    pub supports: Support,
}

impl Route {
    /// Duration as shown to the user: `"Xh Ym"` from the stored split, otherwise `"N min"`.
    pub fn duration_label(&self) -> String {
        match &self.estimated_time {
            Some(split) => split.to_string(),
            None => format!("{} min", self.estimated_time_min),
        }
    }
}

/// One persisted airline file: `data/<stem>_routes.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AirlineRoutes {
    pub airline: Arc<str>,
    pub iata: String,
    pub icao: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft: Option<Vec<AircraftCode>>,
    pub routes: Vec<Route>,
}

impl AirlineRoutes {
    pub fn load_from_file(path: &Path) -> Result<Self, DataError> {
        read_json(path)
    }

    pub fn file_name(&self) -> String {
        route_file_name(&self.airline)
    }

    /// Overwrites the airline's file in `dir` wholesale.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, DataError> {
        let path = dir.join(self.file_name());
        fs::create_dir_all(dir).map_err(|e| DataError::io(dir, e))?;
        let mut json = serde_json::to_string_pretty(self).map_err(|e| DataError::json(&path, e))?;
        json.push('\n');
        fs::write(&path, json).map_err(|e| DataError::io(&path, e))?;
        Ok(path)
    }

    /// Airport code -> "Name (ICAO)" for every endpoint in the file.
    pub fn airport_index(&self) -> BTreeMap<AirportCode, String> {
        let mut airports = BTreeMap::new();
        for r in &self.routes {
            airports.insert(r.from.clone(), format!("{} ({})", r.from_name, r.from_icao));
            airports.insert(r.to.clone(), format!("{} ({})", r.to_name, r.to_icao));
        }
        airports
    }

    /// IATA code of an endpoint known by its ICAO code.
    pub fn iata_for_icao(&self, icao: &str) -> Option<&AirportCode> {
        let icao = icao.trim();
        if icao.is_empty() {
            return None;
        }
        self.routes.iter().find_map(|r| {
            if r.from_icao.eq_ignore_ascii_case(icao) {
                Some(&r.from)
            } else if r.to_icao.eq_ignore_ascii_case(icao) {
                Some(&r.to)
            } else {
                None
            }
        })
    }

    pub fn airport_choices(&self) -> Vec<String> {
        self.airport_index()
            .iter()
            .map(|(code, label)| format!("{} — {}", code, label))
            .collect()
    }

    /// Aircraft codes offered for this airline: its fleet list if any, otherwise every flagged type.
    pub fn aircraft_choices(&self) -> Vec<AircraftCode> {
        if let Some(fleet) = &self.aircraft {
            return fleet.clone();
        }
        let mut codes: Vec<AircraftCode> = self
            .routes
            .iter()
            .flat_map(|r| r.supports.iter().map(|(code, _)| code.clone()))
            .collect();
        codes.sort();
        codes.dedup();
        codes
    }
}

/// Pulls the airport code back out of an `airport_choices` entry. Bare codes pass through.
pub fn extract_code(choice: &str) -> String {
    choice
        .split(" — ")
        .next()
        .unwrap_or(choice)
        .trim()
        .to_uppercase()
}
