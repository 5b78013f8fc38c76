use crate::airline::{file_stem, AirlineName};
use crate::airport::AirportCode;
use crate::error::DataError;
use crate::routes::record::{AirlineRoutes, Route};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const ROUTE_FILE_SUFFIX: &str = "_routes.json";

/// The per-airline route files present in the data directory.
pub struct Catalog {
    dir: PathBuf,
    files: BTreeMap<AirlineName, PathBuf>,
    stems: BTreeSet<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct Coverage {
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

impl Coverage {
    pub fn total(&self) -> usize {
        self.present.len() + self.missing.len()
    }

    pub fn percent(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.present.len() as f64 / self.total() as f64 * 100.0
    }
}

impl Catalog {
    /// Scans `dir` for route files. A missing directory is an empty catalog.
    pub fn open(dir: &Path) -> Result<Self, DataError> {
        #[derive(Deserialize)]
        struct Header {
            airline: String,
        }

        let mut files = BTreeMap::new();
        let mut stems = BTreeSet::new();
        if !dir.exists() {
            log::warn!("Route directory {} does not exist", dir.display());
            return Ok(Catalog { dir: dir.to_path_buf(), files, stems });
        }

        let entries = fs::read_dir(dir).map_err(|e| DataError::io(dir, e))?;
        for entry in entries.flatten() {
            let path = entry.path();
            let stem = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(ROUTE_FILE_SUFFIX));
            let Some(stem) = stem else {
                continue;
            };
            stems.insert(stem.to_string());
            let header = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|data| serde_json::from_str::<Header>(&data).map_err(|e| e.to_string()));
            match header {
                Ok(header) => {
                    files.insert(Arc::from(header.airline.as_str()), path);
                }
                Err(e) => log::warn!("Skipping unreadable route file {}: {}", path.display(), e),
            }
        }
        log::debug!("Found {} route files in {}", files.len(), dir.display());
        Ok(Catalog { dir: dir.to_path_buf(), files, stems })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn names(&self) -> Vec<AirlineName> {
        self.files.keys().cloned().collect()
    }

    /// Case-insensitive lookup of the display name as stored in the file.
    pub fn resolve(&self, name: &str) -> Option<&AirlineName> {
        let wanted = file_stem(name);
        self.files.keys().find(|n| file_stem(n) == wanted)
    }

    /// Reads the whole file again; it is the source of truth between sessions.
    pub fn load(&self, name: &str) -> Result<AirlineRoutes, DataError> {
        let key = self
            .resolve(name)
            .ok_or_else(|| DataError::UnknownAirline(name.to_string()))?;
        AirlineRoutes::load_from_file(&self.files[key])
    }

    /// Every readable airline file, in name order. Files that fail to load are logged and skipped.
    fn loaded(&self) -> impl Iterator<Item = (&AirlineName, AirlineRoutes)> + '_ {
        self.files.keys().filter_map(|name| match self.load(name) {
            Ok(airline) => Some((name, airline)),
            Err(e) => {
                log::warn!("Skipping {}: {}", name, e);
                None
            }
        })
    }

    /// Airlines flying `departure_icao` -> `arrival_icao` with `aircraft` flagged as supported.
    pub fn find_airlines(&self, aircraft: &str, departure_icao: &str, arrival_icao: &str) -> Vec<(AirlineName, Route)> {
        let departure = departure_icao.trim().to_uppercase();
        let arrival = arrival_icao.trim().to_uppercase();
        self.loaded()
            .filter_map(|(name, airline)| {
                let route = airline.routes.into_iter().find(|r| {
                    r.from_icao == departure && r.to_icao == arrival && r.supports.get(aircraft).unwrap_or(false)
                })?;
                Some((name.clone(), route))
            })
            .collect()
    }

    /// First airline whose file carries this ICAO carrier code.
    pub fn by_icao(&self, icao: &str) -> Option<AirlineRoutes> {
        let icao = icao.trim();
        if icao.is_empty() {
            return None;
        }
        self.loaded()
            .map(|(_, airline)| airline)
            .find(|airline| airline.icao.eq_ignore_ascii_case(icao))
    }

    /// IATA code of an airport given its ICAO code, looked up in `preferred` first and then in every file.
    pub fn iata_for_icao(&self, icao: &str, preferred: Option<&AirlineRoutes>) -> Option<AirportCode> {
        if let Some(code) = preferred.and_then(|a| a.iata_for_icao(icao)) {
            return Some(code.clone());
        }
        self.loaded()
            .find_map(|(_, airline)| airline.iata_for_icao(icao).cloned())
    }

    /// Which of `valid_airlines` have a route file on disk, matched by file name.
    pub fn coverage(&self, valid_airlines: &[String]) -> Coverage {
        let mut coverage = Coverage::default();
        for airline in valid_airlines {
            if self.stems.contains(&file_stem(airline)) {
                coverage.present.push(airline.clone());
            } else {
                coverage.missing.push(airline.clone());
            }
        }
        coverage
    }
}
