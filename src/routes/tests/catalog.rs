use crate::error::DataError;
use crate::routes::catalog::Catalog;
use crate::routes::record::{extract_code, Route};
use crate::routes::tests::utils::{airline_routes, route};
use std::fs;
use std::path::Path;

fn write_fixture(dir: &Path) {
    let mut lhr_jfk = route("LHR", "JFK", 5540.0, &[("A388", true)]);
    lhr_jfk.from_icao = "EGLL".to_string();
    lhr_jfk.to_icao = "KJFK".to_string();
    let mut ba = airline_routes("British Airways", "BA", "BAW", vec![lhr_jfk.clone()]);
    ba.callsign = Some("SPEEDBIRD".to_string());
    ba.save(dir).unwrap();

    let mut ezy = lhr_jfk;
    ezy.supports = Default::default();
    ezy.supports.insert("A388".into(), false);
    airline_routes("easyJet", "U2", "EZY", vec![ezy]).save(dir).unwrap();

    fs::write(dir.join("broken_routes.json"), "{ not json").unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();
}

#[test]
fn test_open_lists_readable_files() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let catalog = Catalog::open(dir.path()).unwrap();
    let names: Vec<String> = catalog.names().iter().map(|n| n.to_string()).collect();

    assert_eq!(vec!["British Airways", "easyJet"], names);
}

#[test]
fn test_missing_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::open(&dir.path().join("data")).unwrap();
    assert!(catalog.names().is_empty());
}

#[test]
fn test_load_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let catalog = Catalog::open(dir.path()).unwrap();

    let ezy = catalog.load("EASYJET").unwrap();
    assert_eq!("easyJet", ezy.airline.as_ref());
    assert!(matches!(catalog.load("Ryanair"), Err(DataError::UnknownAirline(_))));
}

#[test]
fn test_find_airlines_by_icao_pair() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let catalog = Catalog::open(dir.path()).unwrap();

    let found = catalog.find_airlines("a388", "egll", "KJFK");

    assert_eq!(1, found.len());
    assert_eq!("British Airways", found[0].0.as_ref());
    assert!(catalog.find_airlines("A388", "KJFK", "EGLL").is_empty());
}

#[test]
fn test_flight_plan_lookups_by_icao() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let catalog = Catalog::open(dir.path()).unwrap();

    let ba = catalog.by_icao("baw").unwrap();
    assert_eq!("British Airways", ba.airline.as_ref());
    assert_eq!(Some("SPEEDBIRD"), ba.callsign.as_deref());
    assert!(catalog.by_icao("QTR").is_none());
    assert!(catalog.by_icao("").is_none());

    assert_eq!(Some("LHR"), catalog.iata_for_icao("egll", Some(&ba)).as_deref());
    assert_eq!(Some("JFK"), catalog.iata_for_icao("KJFK", None).as_deref());
    assert_eq!(None, catalog.iata_for_icao("OMDB", None));
    assert_eq!(None, catalog.iata_for_icao("", Some(&ba)));
}

#[test]
fn test_coverage_counts_unreadable_files_as_present() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let catalog = Catalog::open(dir.path()).unwrap();

    let valid = vec!["British Airways".to_string(), "Broken".to_string(), "Qatar Airways".to_string()];
    let coverage = catalog.coverage(&valid);

    assert_eq!(vec!["British Airways", "Broken"], coverage.present);
    assert_eq!(vec!["Qatar Airways"], coverage.missing);
    assert_eq!(3, coverage.total());
}

#[test]
fn test_support_keys_on_the_wire() {
    let json = r#"{
        "from": "LHR", "from_name": "London Heathrow",
        "to": "JFK", "to_name": "New York JFK",
        "distance_km": 5540.0, "estimated_time_min": 382,
        "supports_a388": true, "supports_b738": false,
        "notes": "kept out of the flags"
    }"#;

    let route: Route = serde_json::from_str(json).unwrap();

    assert_eq!("", route.from_icao);
    assert_eq!(Some(true), route.supports.get("A388"));
    assert_eq!(Some(false), route.supports.get("b738"));
    assert_eq!(None, route.supports.get("NOTES"));
    assert_eq!("382 min", route.duration_label());

    let written = serde_json::to_value(&route).unwrap();
    assert_eq!(serde_json::json!(true), written["supports_a388"]);
    assert!(written.get("estimated_time").is_none());
}

#[test]
fn test_airport_choices_round_trip_through_extract_code() {
    let routes = airline_routes(
        "British Airways",
        "BA",
        "BAW",
        vec![route("LHR", "JFK", 5540.0, &[])],
    );
    let choices = routes.airport_choices();

    assert_eq!(vec!["JFK — JFK Airport (XJFK)", "LHR — LHR Airport (XLHR)"], choices);
    assert_eq!("LHR", extract_code(&choices[1]));
    assert_eq!("LHR", extract_code(" lhr "));
}
