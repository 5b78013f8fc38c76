use crate::error::FetchError;
use crate::flight_number::FlightNumber;
use crate::routes::record::{AirlineRoutes, Route};
use serde_json::Value;
use std::time::Duration;

pub const SIMBRIEF_DISPATCH_URL: &str = "https://dispatch.simbrief.com/options/custom";
pub const SIMBRIEF_FETCH_URL: &str = "https://www.simbrief.com/api/xml.fetcher.php";
const SIMBRIEF_TIMEOUT: Duration = Duration::from_secs(30);

/// Prefilled SimBrief dispatch form for a picked route.
pub fn dispatch_url(flight: &FlightNumber, aircraft: &str, route: &Route) -> String {
    format!(
        "{}?airline={}&fltnum={}&type={}&orig={}&dest={}&altn_count=0",
        SIMBRIEF_DISPATCH_URL,
        flight.prefix,
        flight.number,
        aircraft.trim().to_uppercase(),
        route.from_icao,
        route.to_icao
    )
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlightSummary {
    pub airline: String,
    pub callsign: String,
    pub aircraft: String,
    pub flight_number: String,
    pub departure_icao: String,
    pub departure_name: String,
    pub arrival_icao: String,
    pub arrival_name: String,
    pub distance: String,
    pub time: String,
}

impl FlightSummary {
    pub fn from_route(airline: &AirlineRoutes, aircraft: &str, flight: &FlightNumber, route: &Route) -> FlightSummary {
        FlightSummary {
            airline: airline.airline.to_string(),
            callsign: airline.callsign.clone().unwrap_or_default(),
            aircraft: aircraft.trim().to_uppercase(),
            flight_number: format!("{} {}", flight.prefix, flight.number),
            departure_icao: route.from_icao.clone(),
            departure_name: route.from_name.clone(),
            arrival_icao: route.to_icao.clone(),
            arrival_name: route.to_name.clone(),
            distance: format!("{} km", route.distance_km),
            time: route.duration_label(),
        }
    }

    /// Radio callsign, e.g. "SPEEDBIRD 117". `N/A` without a callsign or number.
    pub fn spoken_callsign(&self) -> String {
        let number = self.flight_number.split_whitespace().last().unwrap_or("");
        if self.callsign.is_empty() || number.is_empty() {
            "N/A".to_string()
        } else {
            format!("{} {}", self.callsign, number)
        }
    }

    /// Swaps the OFP's bare carrier code for the airline's display name and radio callsign.
    pub fn with_airline(mut self, airline: &AirlineRoutes) -> FlightSummary {
        self.airline = airline.airline.to_string();
        if let Some(callsign) = airline.callsign.as_deref().filter(|c| !c.trim().is_empty()) {
            self.callsign = callsign.trim().to_string();
        }
        self
    }

    /// Builds a summary from SimBrief's OFP JSON. SimBrief sends most numbers as strings.
    pub fn from_ofp(ofp: &Value) -> Result<FlightSummary, FetchError> {
        let text = |section: &str, field: &str| -> String {
            match &ofp[section][field] {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => String::new(),
            }
        };

        let departure_icao = text("origin", "icao_code");
        let arrival_icao = text("destination", "icao_code");
        if departure_icao.is_empty() || arrival_icao.is_empty() {
            let message = ofp["fetch"]["status"].as_str().unwrap_or("no origin/destination in flight plan");
            return Err(FetchError::Payload(message.to_string()));
        }

        let airline_icao = text("general", "icao_airline");
        let number = text("general", "flight_number");
        let flight_number = if !airline_icao.is_empty() && !number.is_empty() {
            format!("{} {}", airline_icao, number)
        } else {
            number
        };

        let distance = text("general", "gc_distance");
        let enroute = text("times", "est_time_enroute");
        let time = match enroute.parse::<u64>() {
            Ok(seconds) => format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60),
            Err(_) => enroute,
        };

        Ok(FlightSummary {
            airline: airline_icao,
            callsign: String::new(),
            aircraft: text("aircraft", "icao_code"),
            flight_number,
            departure_icao,
            departure_name: text("origin", "name"),
            arrival_icao,
            arrival_name: text("destination", "name"),
            distance: if distance.is_empty() { distance } else { format!("{} nm", distance) },
            time,
        })
    }
}

pub fn fetch_latest_plan(user_id: &str) -> Result<FlightSummary, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(SIMBRIEF_TIMEOUT)
        .build()?;
    log::info!("Fetching latest SimBrief plan for user {}", user_id);
    let ofp: Value = client
        .get(SIMBRIEF_FETCH_URL)
        .query(&[("userid", user_id), ("json", "1")])
        .send()?
        .error_for_status()?
        .json()?;
    FlightSummary::from_ofp(&ofp)
}

/// Hands a URL to the desktop's browser. Failure leaves the URL for the user to copy.
pub fn open_in_browser(url: &str) -> std::io::Result<()> {
    open::that(url)
}
