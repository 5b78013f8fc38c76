use crate::airport::AirportCode;
use crate::routes::record::Route;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use std::collections::BTreeSet;

pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Clone, Debug)]
pub struct RouteFilter<'a> {
    pub origin: &'a str,
    pub aircraft: &'a str,
    pub max_minutes: Option<u64>,
}

impl RouteFilter<'_> {
    pub fn matches(&self, route: &Route) -> bool {
        route.from.as_ref() == self.origin
            && route.supports.get(self.aircraft).unwrap_or(true)
            && self.max_minutes.map_or(true, |max| route.estimated_time_min <= max)
    }
}

pub fn filter_routes<'r>(routes: &'r [Route], filter: &RouteFilter) -> Vec<&'r Route> {
    routes.iter().filter(|r| filter.matches(r)).collect()
}

/// Uniform choice among eligible routes, `None` when the filter leaves nothing.
pub fn pick_random_route<'r, R: Rng + ?Sized>(
    routes: &'r [Route],
    filter: &RouteFilter,
    rng: &mut R,
) -> Option<&'r Route> {
    filter_routes(routes, filter).choose(rng).copied()
}

/// Random origin with at least one route flagged for `aircraft`.
pub fn random_departure<R: Rng + ?Sized>(routes: &[Route], aircraft: &str, rng: &mut R) -> Option<AirportCode> {
    let origins: BTreeSet<&AirportCode> = routes
        .iter()
        .filter(|r| r.supports.get(aircraft).unwrap_or(false))
        .map(|r| &r.from)
        .collect();
    origins.into_iter().choose(rng).cloned()
}

#[derive(Clone, Debug, PartialEq)]
pub enum Verification {
    Valid {
        route: Route,
        /// Advisory set when the stored flag says the type is unsuitable.
        note: Option<String>,
    },
    Invalid {
        reason: String,
        suggestions: Vec<String>,
    },
}

pub fn verify_route<R: Rng + ?Sized>(
    routes: &[Route],
    departure: &str,
    arrival: &str,
    aircraft: &str,
    rng: &mut R,
) -> Verification {
    let departure = departure.trim().to_uppercase();
    let arrival = arrival.trim().to_uppercase();

    if let Some(route) = routes
        .iter()
        .find(|r| r.from.as_ref() == departure && r.to.as_ref() == arrival)
    {
        let note = match route.supports.get(aircraft) {
            Some(false) => Some(format!(
                "{} is not rated for this route; check range and airport limits before dispatch",
                aircraft.trim().to_uppercase()
            )),
            _ => None,
        };
        return Verification::Valid {
            route: route.clone(),
            note,
        };
    }

    let departure_known = routes.iter().any(|r| r.from.as_ref() == departure);
    let arrival_known = routes.iter().any(|r| r.to.as_ref() == arrival);

    let reason = match (departure_known, arrival_known) {
        (false, false) => format!(
            "Neither {} (as a departure) nor {} (as an arrival) is served by this airline",
            departure, arrival
        ),
        (false, true) => format!("This airline has no departures from {}", departure),
        (true, false) => format!("This airline has no arrivals at {}", arrival),
        (true, true) => format!("No direct route from {} to {}", departure, arrival),
    };

    let suggestions = if departure_known {
        let outbound: Vec<&Route> = routes.iter().filter(|r| r.from.as_ref() == departure).collect();
        outbound
            .choose_multiple(rng, MAX_SUGGESTIONS)
            .map(|r| format!("{} → {} ({})", r.from, r.to, r.to_name))
            .collect()
    } else {
        vec![]
    };

    Verification::Invalid { reason, suggestions }
}
