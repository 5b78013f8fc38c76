use crate::atc::{Controller, StationCoverage};
use crate::dispatch::FlightSummary;
use crate::routes::catalog::Coverage;
use crate::routes::query::Verification;
use crate::routes::record::Route;
use colored::Colorize;
use std::fmt::Write;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct Field {
    #[tabled(rename = "")]
    name: &'static str,
    #[tabled(rename = "")]
    value: String,
}

#[derive(Tabled)]
pub struct RouteRow {
    #[tabled(rename = "From")]
    pub from: String,
    #[tabled(rename = "To")]
    pub to: String,
    #[tabled(rename = "Distance")]
    pub distance: String,
    #[tabled(rename = "Time")]
    pub time: String,
}

impl From<&Route> for RouteRow {
    fn from(route: &Route) -> Self {
        RouteRow {
            from: format!("{} {}", route.from, route.from_icao),
            to: format!("{} {} ({})", route.to, route.to_icao, route.to_name),
            distance: format!("{} km", route.distance_km),
            time: route.duration_label(),
        }
    }
}

fn styled<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.with(Alignment::left());
    table.to_string()
}

pub fn route_details(airline: &str, aircraft: &str, route: &Route) -> String {
    let fields = vec![
        Field { name: "Airline", value: airline.to_string() },
        Field { name: "Aircraft", value: aircraft.to_string() },
        Field { name: "From", value: format!("{} — {} ({})", route.from, route.from_name, route.from_icao) },
        Field { name: "To", value: format!("{} — {} ({})", route.to, route.to_name, route.to_icao) },
        Field { name: "Distance", value: format!("{} km", route.distance_km) },
        Field { name: "Time", value: route.duration_label() },
    ];
    styled(fields)
}

pub fn route_table(routes: &[&Route]) -> String {
    styled(routes.iter().map(|r| RouteRow::from(*r)))
}

pub fn flight_summary(summary: &FlightSummary) -> String {
    let fields = vec![
        Field { name: "Airline", value: summary.airline.clone() },
        Field { name: "Callsign", value: summary.spoken_callsign() },
        Field { name: "Flight", value: summary.flight_number.clone() },
        Field { name: "Aircraft", value: summary.aircraft.clone() },
        Field { name: "Departure", value: format!("{} {}", summary.departure_icao, summary.departure_name) },
        Field { name: "Arrival", value: format!("{} {}", summary.arrival_icao, summary.arrival_name) },
        Field { name: "Distance", value: summary.distance.clone() },
        Field { name: "Time", value: summary.time.clone() },
    ];
    styled(fields)
}

fn controller_lines(out: &mut String, title: &str, controllers: &[Controller]) {
    let _ = writeln!(out, "{}", title.bold());
    if controllers.is_empty() {
        let _ = writeln!(out, "  {}", "no controllers online".dimmed());
    }
    for c in controllers {
        let _ = writeln!(out, "  {:<20} {}", c.callsign, c.frequency);
    }
}

pub fn station_coverage(coverage: &StationCoverage) -> String {
    let mut out = String::new();
    controller_lines(&mut out, "Departure ATC", &coverage.departure);
    controller_lines(&mut out, "Arrival ATC", &coverage.arrival);
    out
}

pub fn verification(airline: &str, aircraft: &str, result: &Verification) -> String {
    let mut out = String::new();
    match result {
        Verification::Valid { route, note } => {
            let _ = writeln!(out, "{}", "ROUTE IS VALID".green().bold());
            out.push_str(&route_details(airline, aircraft, route));
            out.push('\n');
            if let Some(note) = note {
                let _ = writeln!(out, "{} {}", "warning:".yellow().bold(), note);
            }
        }
        Verification::Invalid { reason, suggestions } => {
            let _ = writeln!(out, "{}", "ROUTE IS INVALID".red().bold());
            let _ = writeln!(out, "Reason: {}", reason);
            if !suggestions.is_empty() {
                let _ = writeln!(out, "Suggestions:");
                for s in suggestions {
                    let _ = writeln!(out, "  • {}", s);
                }
            }
        }
    }
    out
}

pub fn coverage(report: &Coverage) -> String {
    let mut out = String::new();
    let rule = "=".repeat(70);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Present: {}/{} airlines have route files", report.present.len(), report.total());
    let _ = writeln!(out, "Missing: {}/{} airlines are missing route files", report.missing.len(), report.total());
    let _ = writeln!(out, "{}", rule);
    if !report.missing.is_empty() {
        let _ = writeln!(out, "\n{}", format!("Missing route files ({}):", report.missing.len()).yellow());
        for (i, airline) in report.missing.iter().enumerate() {
            let _ = writeln!(out, "{:3}. {:50} -> {}", i + 1, airline, crate::airline::route_file_name(airline));
        }
    }
    let _ = writeln!(out, "\nCoverage: {:.1}% of valid airlines have route data", report.percent());
    out
}
