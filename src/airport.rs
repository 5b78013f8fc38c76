use crate::error::DataError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub type AirportCode = Arc<str>;

#[derive(Clone, Debug, PartialEq)]
pub struct Airport {
    pub iata: AirportCode,
    pub icao: Arc<str>,
    pub name: Arc<str>,
}

/// IATA -> ICAO reference table read from `airports.csv`.
#[derive(Default)]
pub struct AirportTable {
    by_iata: HashMap<AirportCode, Airport>,
}

impl AirportTable {
    pub fn new(airports: Vec<Airport>) -> AirportTable {
        let mut table = AirportTable::default();
        for airport in airports {
            table.by_iata.insert(airport.iata.clone(), airport);
        }
        table
    }

    pub fn load_from_file(path: &Path) -> Result<Self, DataError> {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default)]
            iata_code: Option<String>,
            #[serde(default)]
            icao_code: Option<String>,
            #[serde(default)]
            name: Option<String>,
        }

        if !path.exists() {
            return Err(DataError::MissingFile(path.to_path_buf()));
        }
        let csv_err = |source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;

        let mut airports = Vec::new();
        for row in reader.deserialize::<Row>() {
            let row = row.map_err(csv_err)?;
            let (Some(iata), Some(icao)) = (row.iata_code, row.icao_code) else {
                continue;
            };
            let (iata, icao) = (iata.trim().to_uppercase(), icao.trim().to_uppercase());
            if iata.is_empty() || icao.is_empty() {
                continue;
            }
            let name = row
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| iata.clone());
            airports.push(Airport {
                iata: Arc::from(iata),
                icao: Arc::from(icao),
                name: Arc::from(name.trim()),
            });
        }
        Ok(AirportTable::new(airports))
    }

    pub fn get(&self, iata: &str) -> Option<&Airport> {
        self.by_iata.get(iata)
    }

    pub fn icao_for(&self, iata: &str) -> Option<&str> {
        self.by_iata.get(iata).map(|a| a.icao.as_ref())
    }

    pub fn len(&self) -> usize {
        self.by_iata.len()
    }
}
