use crate::error::FetchError;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::time::Duration;
use tabled::Tabled;

pub const VATSIM_DATA_URL: &str = "https://data.vatsim.net/v3/vatsim-data.json";
const VATSIM_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Deserialize, Tabled)]
pub struct Controller {
    pub callsign: String,
    #[serde(default = "unknown_frequency")]
    pub frequency: String,
}

fn unknown_frequency() -> String {
    "N/A".to_string()
}

#[derive(Debug, Default, PartialEq)]
pub struct StationCoverage {
    pub departure: Vec<Controller>,
    pub arrival: Vec<Controller>,
}

/// `^(CODE|CODE)_.*?(DEL|GND|TWR|APP|DEP|CTR)`, `None` when no code is usable.
fn station_pattern(codes: &[&str]) -> Option<Regex> {
    let codes: Vec<String> = codes
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(regex::escape)
        .collect();
    if codes.is_empty() {
        return None;
    }
    RegexBuilder::new(&format!("^({})_.*?(DEL|GND|TWR|APP|DEP|CTR)", codes.join("|")))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Splits online controllers into those staffing the departure and the arrival field.
/// A callsign matching the departure is not offered again for the arrival.
pub fn match_controllers(
    controllers: &[Controller],
    departure: (&str, &str),
    arrival: (&str, &str),
) -> StationCoverage {
    let dep = station_pattern(&[departure.0, departure.1]);
    let arr = station_pattern(&[arrival.0, arrival.1]);
    let mut coverage = StationCoverage::default();
    for controller in controllers {
        if dep.as_ref().is_some_and(|re| re.is_match(&controller.callsign)) {
            coverage.departure.push(controller.clone());
        } else if arr.as_ref().is_some_and(|re| re.is_match(&controller.callsign)) {
            coverage.arrival.push(controller.clone());
        }
    }
    coverage
}

pub fn fetch_controllers() -> Result<Vec<Controller>, FetchError> {
    #[derive(Deserialize)]
    struct NetworkData {
        #[serde(default)]
        controllers: Vec<Controller>,
    }

    let client = reqwest::blocking::Client::builder()
        .timeout(VATSIM_TIMEOUT)
        .build()?;
    let data: NetworkData = client
        .get(VATSIM_DATA_URL)
        .send()?
        .error_for_status()?
        .json()?;
    log::debug!("VATSIM feed lists {} controllers", data.controllers.len());
    Ok(data.controllers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctl(callsign: &str, frequency: &str) -> Controller {
        Controller {
            callsign: callsign.to_string(),
            frequency: frequency.to_string(),
        }
    }

    #[test]
    fn test_matches_icao_and_iata_prefixes() {
        let online = vec![
            ctl("EGLL_N_TWR", "118.700"),
            ctl("lhr_del", "121.980"),
            ctl("KJFK_APP", "128.125"),
            ctl("EGLL_ATIS", "128.075"),
            ctl("LON_S_CTR", "129.425"),
        ];
        let coverage = match_controllers(&online, ("EGLL", "LHR"), ("KJFK", "JFK"));

        assert_eq!(vec![ctl("EGLL_N_TWR", "118.700"), ctl("lhr_del", "121.980")], coverage.departure);
        assert_eq!(vec![ctl("KJFK_APP", "128.125")], coverage.arrival);
    }

    #[test]
    fn test_callsign_is_never_counted_twice() {
        let online = vec![ctl("EGLL_TWR", "118.500")];
        let coverage = match_controllers(&online, ("EGLL", ""), ("EGLL", ""));
        assert_eq!(1, coverage.departure.len());
        assert!(coverage.arrival.is_empty());
    }

    #[test]
    fn test_blank_codes_match_nothing() {
        let online = vec![ctl("_TWR", "118.500")];
        let coverage = match_controllers(&online, ("", ""), ("  ", ""));
        assert_eq!(StationCoverage::default(), coverage);
    }

    #[test]
    fn test_feed_without_frequency() {
        let c: Controller = serde_json::from_str(r#"{"callsign": "EGKK_TWR"}"#).unwrap();
        assert_eq!("N/A", c.frequency);
    }
}
