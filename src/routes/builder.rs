use crate::airline::Airline;
use crate::error::{read_json, DataError};
use crate::reference::Reference;
use crate::routes::record::{AirlineRoutes, Route, Support};
use crate::time::{Minutes, KTS_TO_KMH};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone, Debug, Deserialize)]
pub struct RawCarrier {
    pub iata: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawRoute {
    pub iata: String,
    pub km: f64,
    #[serde(default)]
    pub carriers: Vec<RawCarrier>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawAirport {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
    #[serde(default)]
    pub routes: Vec<RawRoute>,
}

/// Origin IATA code -> outbound routes. Sorted so repeated builds emit identical files.
pub type RouteGraph = BTreeMap<String, RawAirport>;

pub fn load_route_graph(path: &Path) -> Result<RouteGraph, DataError> {
    read_json(path)
}

pub struct RouteBuilder<'a> {
    reference: &'a Reference,
}

impl<'a> RouteBuilder<'a> {
    pub fn new(reference: &'a Reference) -> RouteBuilder<'a> {
        RouteBuilder { reference }
    }

    fn reference_kmh(&self) -> f64 {
        self.reference.reference_kts * KTS_TO_KMH
    }

    fn airport_name(&self, graph: &RouteGraph, code: &str) -> String {
        graph
            .get(code)
            .and_then(|a| a.name.clone())
            .or_else(|| self.reference.airports.get(code).map(|a| a.name.to_string()))
            .unwrap_or_else(|| code.to_string())
    }

    fn airport_icao(&self, graph: &RouteGraph, code: &str) -> String {
        self.reference
            .airports
            .icao_for(code)
            .map(str::to_string)
            .or_else(|| graph.get(code).and_then(|a| a.icao.clone()))
            .unwrap_or_default()
    }

    fn support_for(&self, airline: &Airline, origin: &str, destination: &str, distance_km: f64) -> Support {
        let mut support = Support::new();
        for aircraft in self.reference.aircraft.iter() {
            let flag = airline.permits(&aircraft.icao)
                && aircraft.supports_route(origin, destination, distance_km);
            support.insert(aircraft.icao.clone(), flag);
        }
        support
    }

    /// Enriches every route in the graph and groups the records by operating airline.
    /// Airlines without a single route are left out.
    pub fn build(&self, graph: &RouteGraph) -> Vec<AirlineRoutes> {
        let mut per_airline: BTreeMap<&str, Vec<Route>> = BTreeMap::new();
        let mut unknown_airports = BTreeSet::new();

        for (origin, origin_data) in graph {
            let from_name = self.airport_name(graph, origin);
            let from_icao = self.airport_icao(graph, origin);

            for raw in &origin_data.routes {
                let destination = raw.iata.trim().to_uppercase();
                if !graph.contains_key(&destination) && self.reference.airports.get(&destination).is_none() {
                    unknown_airports.insert(destination.clone());
                }
                let carriers: BTreeSet<String> = raw
                    .carriers
                    .iter()
                    .map(|c| c.iata.trim().to_uppercase())
                    .collect();

                let operators: Vec<&Airline> = carriers
                    .iter()
                    .filter_map(|code| self.reference.airlines.by_iata(code))
                    .collect();
                if operators.is_empty() {
                    continue;
                }

                let minutes = Minutes::for_distance(raw.km, self.reference_kmh());
                let base = Route {
                    from: Arc::from(origin.as_str()),
                    from_name: from_name.clone(),
                    from_icao: from_icao.clone(),
                    to: Arc::from(destination.as_str()),
                    to_name: self.airport_name(graph, &destination),
                    to_icao: self.airport_icao(graph, &destination),
                    distance_km: raw.km,
                    estimated_time_min: minutes.0,
                    estimated_time: minutes.split(),
                    supports: Support::new(),
                };

                for airline in operators {
                    let mut route = base.clone();
                    route.supports = self.support_for(airline, origin, &destination, raw.km);
                    per_airline.entry(airline.name.as_ref()).or_default().push(route);
                }
            }
        }

        if !unknown_airports.is_empty() {
            log::warn!(
                "{} destination airports missing from reference data, using their codes as names",
                unknown_airports.len()
            );
            log::debug!("Unknown airports: {:?}", unknown_airports);
        }

        self.reference
            .airlines
            .iter()
            .filter_map(|airline| {
                let routes = per_airline.remove(airline.name.as_ref())?;
                Some(AirlineRoutes {
                    airline: airline.name.clone(),
                    iata: airline.iata_code().unwrap_or_default().to_uppercase(),
                    icao: airline.icao.clone().unwrap_or_default().trim().to_uppercase(),
                    callsign: airline.callsign.clone(),
                    aircraft: airline.aircraft.clone(),
                    routes,
                })
            })
            .collect()
    }

    pub fn write_all(&self, dir: &Path, airlines: &[AirlineRoutes]) -> Result<Vec<PathBuf>, DataError> {
        let mut written = Vec::with_capacity(airlines.len());
        for airline in airlines {
            let path = airline.save(dir)?;
            log::info!("Wrote {} routes for {} to {}", airline.routes.len(), airline.airline, path.display());
            written.push(path);
        }
        Ok(written)
    }
}
