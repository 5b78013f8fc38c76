use crate::aircraft::{Aircraft, AircraftTable};
use crate::airline::{Airline, AirlineDirectory};
use crate::airport::{Airport, AirportTable};
use crate::routes::builder::{RawAirport, RawCarrier, RawRoute, RouteGraph};
use crate::routes::record::{AirlineRoutes, Route, Support};
use crate::reference::Reference;
use crate::time::{Minutes, KTS_TO_KMH};
use proptest::prelude::Strategy;
use proptest::prop_oneof;
use proptest::strategy::Just;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const REFERENCE_KTS: f64 = 470.0;

pub fn id(s: &str) -> Arc<str> {
    Arc::from(s)
}

pub fn airport(iata: &str, icao: &str, name: &str) -> Airport {
    Airport {
        iata: id(iata),
        icao: id(icao),
        name: id(name),
    }
}

pub fn aircraft(icao: &str, max_range_km: Option<f64>) -> Aircraft {
    Aircraft {
        icao: id(icao),
        name: None,
        cruise_kts: None,
        max_range_km,
        min_range_km: None,
        airports: None,
    }
}

pub fn large_aircraft(icao: &str, min_range_km: f64, airports: &[&str]) -> Aircraft {
    Aircraft {
        min_range_km: Some(min_range_km),
        airports: Some(airports.iter().map(|a| id(a)).collect::<BTreeSet<_>>()),
        ..aircraft(icao, Some(15000.0))
    }
}

pub fn airline(name: &str, iata: &str, icao: &str, fleet: Option<&[&str]>) -> Airline {
    Airline {
        name: id(name),
        iata: Some(iata.to_string()),
        icao: Some(icao.to_string()),
        callsign: None,
        aircraft: fleet.map(|f| f.iter().map(|a| id(a)).collect()),
    }
}

/// LHR, JFK, DXB and LGW; easyJet limited to narrow-bodies, BA flying everything.
pub fn reference() -> Reference {
    Reference {
        airports: AirportTable::new(vec![
            airport("LHR", "EGLL", "London Heathrow"),
            airport("JFK", "KJFK", "New York JFK"),
            airport("DXB", "OMDB", "Dubai International"),
            airport("LGW", "EGKK", "London Gatwick"),
        ]),
        aircraft: AircraftTable::new(vec![
            aircraft("A20N", Some(4800.0)),
            large_aircraft("A388", 5500.0, &["LHR", "JFK", "DXB"]),
        ]),
        airlines: AirlineDirectory::new(vec![
            airline("British Airways", "BA", "BAW", None),
            airline("easyJet", "U2", "EZY", Some(&["A20N"])),
        ]),
        reference_kts: REFERENCE_KTS,
    }
}

pub fn add_graph_route(graph: &mut RouteGraph, origin: &str, destination: &str, km: f64, carriers: &[&str]) {
    graph
        .entry(origin.to_string())
        .or_insert_with(RawAirport::default)
        .routes
        .push(RawRoute {
            iata: destination.to_string(),
            km,
            carriers: carriers
                .iter()
                .map(|c| RawCarrier { iata: c.to_string() })
                .collect(),
        });
}

pub fn route(from: &str, to: &str, km: f64, supports: &[(&str, bool)]) -> Route {
    let minutes = Minutes::for_distance(km, REFERENCE_KTS * KTS_TO_KMH);
    let mut support = Support::new();
    for (code, flag) in supports {
        support.insert(id(code), *flag);
    }
    Route {
        from: id(from),
        from_name: format!("{} Airport", from),
        from_icao: format!("X{}", from),
        to: id(to),
        to_name: format!("{} Airport", to),
        to_icao: format!("X{}", to),
        distance_km: km,
        estimated_time_min: minutes.0,
        estimated_time: minutes.split(),
        supports: support,
    }
}

pub fn airline_routes(name: &str, iata: &str, icao: &str, routes: Vec<Route>) -> AirlineRoutes {
    AirlineRoutes {
        airline: id(name),
        iata: iata.to_string(),
        icao: icao.to_string(),
        callsign: None,
        aircraft: None,
        routes,
    }
}

pub fn arb_airport() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("LHR"), Just("JFK"), Just("DXB"), Just("LGW"), Just("CDG")]
}

pub fn arb_flag() -> impl Strategy<Value = Option<bool>> {
    prop_oneof![Just(None), Just(Some(true)), Just(Some(false))]
}
