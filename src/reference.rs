use crate::aircraft::AircraftTable;
use crate::airline::AirlineDirectory;
use crate::airport::AirportTable;
use crate::config::Paths;
use crate::error::DataError;

/// Static lookup tables shared by the builder and the query shell.
pub struct Reference {
    pub airports: AirportTable,
    pub aircraft: AircraftTable,
    pub airlines: AirlineDirectory,
    pub reference_kts: f64,
}

impl Reference {
    pub fn load(paths: &Paths, reference_kts: f64) -> Result<Self, DataError> {
        let airports = AirportTable::load_from_file(&paths.resolve(&paths.airports))?;
        let aircraft = AircraftTable::load_from_file(&paths.resolve(&paths.aircraft))?;
        let airlines = AirlineDirectory::load_from_file(&paths.resolve(&paths.airlines))?;
        log::info!(
            "Reference data loaded: {} airports, {} aircraft types, {} airlines",
            airports.len(),
            aircraft.codes().len(),
            airlines.len()
        );
        Ok(Reference {
            airports,
            aircraft,
            airlines,
            reference_kts,
        })
    }
}
