use crate::aircraft::AircraftTable;
use crate::atc;
use crate::config::UserData;
use crate::dispatch::{self, FlightSummary};
use crate::flight_number::FlightNumbers;
use crate::present;
use crate::routes::catalog::Catalog;
use crate::routes::query::{self, RouteFilter};
use crate::routes::record::{extract_code, AirlineRoutes, Route};
use colored::Colorize;
use rand::rngs::ThreadRng;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

const COMMANDS: [&str; 14] = [
    "airlines", "use", "aircraft", "airports", "pick", "routes", "dispatch", "verify", "find", "userid",
    "summary", "help", "exit", "quit",
];

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
    pub airlines: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let mut candidates = Vec::new();

        if let Some(partial) = line.strip_prefix("use ") {
            let partial = partial.to_lowercase();
            for name in &self.airlines {
                if name.to_lowercase().starts_with(&partial) {
                    candidates.push(Pair {
                        display: name.clone(),
                        replacement: name.clone(),
                    });
                }
            }
            return Ok((4, candidates));
        }

        for cmd in &self.commands {
            if cmd.starts_with(line) {
                candidates.push(Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                });
            }
        }

        Ok((0, candidates))
    }
}

fn paginate(content: String) {
    let pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn());

    let mut pager = match pager {
        Ok(pager) => pager,
        Err(_) => {
            println!("{}", content);
            return;
        }
    };

    if let Some(mut stdin) = pager.stdin.take() {
        if let Err(e) = stdin.write_all(content.as_bytes()) {
            // Broken pipe is common if the user quits the pager early
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                eprintln!("Error writing to pager: {}", e);
            }
        }
    }

    // Wait for the user to close the pager before returning to the ">> " prompt
    let _ = pager.wait();
}

fn show(content: String, rows: usize) {
    if rows > 20 {
        paginate(content);
    } else {
        println!("{}", content);
    }
}

/// Blank, `-` or `0` mean no limit.
fn parse_max_minutes(input: Option<&&str>) -> Result<Option<u64>, String> {
    match input.map(|s| s.trim()) {
        None | Some("") | Some("-") => Ok(None),
        Some(value) => match value.parse::<u64>() {
            Ok(0) => Ok(None),
            Ok(minutes) => Ok(Some(minutes)),
            Err(_) => Err(format!("'{}' is not a whole number of minutes", value)),
        },
    }
}

struct Pick {
    aircraft: String,
    route: Route,
}

pub struct Shell {
    catalog: Catalog,
    aircraft: AircraftTable,
    reference_kts: f64,
    flight_numbers: FlightNumbers,
    user_data_path: PathBuf,
    user_data: UserData,
    current: Option<AirlineRoutes>,
    last_pick: Option<Pick>,
    rng: ThreadRng,
}

impl Shell {
    pub fn new(
        catalog: Catalog,
        aircraft: AircraftTable,
        reference_kts: f64,
        flight_numbers: FlightNumbers,
        user_data_path: PathBuf,
    ) -> Shell {
        let user_data = UserData::load(&user_data_path);
        Shell {
            catalog,
            aircraft,
            reference_kts,
            flight_numbers,
            user_data_path,
            user_data,
            current: None,
            last_pick: None,
            rng: rand::thread_rng(),
        }
    }

    fn airline(&self) -> Option<&AirlineRoutes> {
        if self.current.is_none() {
            println!("Select an airline first: use <airline>");
        }
        self.current.as_ref()
    }

    fn use_airline(&mut self, name: &str) {
        match self.catalog.load(name) {
            Ok(airline) => {
                println!(
                    "Loaded {} ({} routes, {} airports)",
                    airline.airline.bold(),
                    airline.routes.len(),
                    airline.airport_index().len()
                );
                self.current = Some(airline);
                self.last_pick = None;
            }
            Err(e) => println!("{}", e),
        }
    }

    fn list_airports(&self, filter: Option<&str>) {
        let Some(airline) = self.airline() else { return };
        let needle = filter.unwrap_or("").to_lowercase();
        let choices: Vec<String> = airline
            .airport_choices()
            .into_iter()
            .filter(|c| c.to_lowercase().contains(&needle))
            .collect();
        if choices.is_empty() {
            println!("No matching airports found.");
        } else {
            let rows = choices.len();
            show(choices.join("\n"), rows);
        }
    }

    fn pick(&mut self, aircraft: &str, origin: Option<&str>, max_minutes: Option<u64>) {
        let Some(airline) = self.current.as_ref() else {
            println!("Select an airline first: use <airline>");
            return;
        };
        let aircraft = aircraft.trim().to_uppercase();

        let origin = match origin.map(extract_code).filter(|o| o != "*") {
            Some(origin) => origin,
            None => match query::random_departure(&airline.routes, &aircraft, &mut self.rng) {
                Some(origin) => origin.to_string(),
                None => {
                    println!("No routes available for this airline with {} support.", aircraft);
                    return;
                }
            },
        };

        let filter = RouteFilter {
            origin: &origin,
            aircraft: &aircraft,
            max_minutes,
        };
        match query::pick_random_route(&airline.routes, &filter, &mut self.rng) {
            Some(route) => {
                println!("\n{}\n", "Random Route Found".green().bold());
                println!("{}", present::route_details(&airline.airline, &aircraft, route));
                if let Some(ac) = self.aircraft.get(&aircraft) {
                    println!("Block time at {} cruise: {}", ac.icao, ac.block_minutes(route.distance_km, self.reference_kts));
                }
                println!("Type 'dispatch' to plan it in SimBrief, or 'pick' again.");
                self.last_pick = Some(Pick {
                    aircraft,
                    route: route.clone(),
                });
            }
            None => {
                println!("{}", "No valid routes found with current filters.".red());
                println!("Try adjusting your filters or selecting a different departure airport.");
            }
        }
    }

    fn list_routes(&self, origin: &str, aircraft: &str, max_minutes: Option<u64>) {
        let Some(airline) = self.airline() else { return };
        let origin = extract_code(origin);
        let aircraft = aircraft.trim().to_uppercase();
        let filter = RouteFilter {
            origin: &origin,
            aircraft: &aircraft,
            max_minutes,
        };
        let eligible = query::filter_routes(&airline.routes, &filter);
        if eligible.is_empty() {
            println!("No matching routes found.");
        } else {
            show(present::route_table(&eligible), eligible.len());
        }
    }

    fn print_atc(summary: &FlightSummary, departure_iata: &str, arrival_iata: &str) {
        match atc::fetch_controllers() {
            Ok(online) => {
                let coverage = atc::match_controllers(
                    &online,
                    (summary.departure_icao.as_str(), departure_iata),
                    (summary.arrival_icao.as_str(), arrival_iata),
                );
                print!("{}", present::station_coverage(&coverage));
            }
            Err(e) => {
                log::warn!("VATSIM data unavailable: {}", e);
                println!("{}", "VATSIM controller data unavailable.".dimmed());
            }
        }
    }

    fn dispatch(&mut self) {
        let (Some(airline), Some(pick)) = (self.current.as_ref(), self.last_pick.as_ref()) else {
            println!("Pick a route first.");
            return;
        };
        let Some(flight) = self
            .flight_numbers
            .generate(&airline.airline, &pick.route.from_icao, &mut self.rng)
        else {
            println!("Unknown Airline: no flight number rule for {}", airline.airline);
            return;
        };

        let summary = FlightSummary::from_route(airline, &pick.aircraft, &flight, &pick.route);
        println!("{}", present::flight_summary(&summary));
        Self::print_atc(&summary, &pick.route.from, &pick.route.to);

        let url = dispatch::dispatch_url(&flight, &pick.aircraft, &pick.route);
        println!("{}", url.underline());
        if let Err(e) = dispatch::open_in_browser(&url) {
            log::warn!("Could not open browser: {}", e);
        }
    }

    fn verify(&mut self, departure: &str, arrival: &str, aircraft: &str) {
        let Some(airline) = self.current.as_ref() else {
            println!("Select an airline first: use <airline>");
            return;
        };
        let (departure, arrival) = (extract_code(departure), extract_code(arrival));
        if departure == arrival {
            println!("Departure and arrival airports cannot be the same");
            return;
        }
        let aircraft = aircraft.trim().to_uppercase();
        let result = query::verify_route(&airline.routes, &departure, &arrival, &aircraft, &mut self.rng);
        print!("{}", present::verification(&airline.airline, &aircraft, &result));
    }

    fn find(&self, aircraft: &str, departure_icao: &str, arrival_icao: &str) {
        let matches = self.catalog.find_airlines(aircraft, departure_icao, arrival_icao);
        if matches.is_empty() {
            println!(
                "No airlines fly {} → {} with {}",
                departure_icao.to_uppercase(),
                arrival_icao.to_uppercase(),
                aircraft.to_uppercase()
            );
            return;
        }
        println!("{}", format!("Found {} airline(s)", matches.len()).green());
        for (airline, route) in &matches {
            println!("{}", present::route_details(airline, &aircraft.to_uppercase(), route));
        }
    }

    fn set_user_id(&mut self, id: Option<&&str>) {
        match id {
            Some(id) => {
                self.user_data.simbrief_user_id = Some(id.to_string());
                match self.user_data.save(&self.user_data_path) {
                    Ok(()) => println!("SimBrief user id saved."),
                    Err(e) => println!("Could not save user id: {}", e),
                }
            }
            None => match &self.user_data.simbrief_user_id {
                Some(id) => println!("SimBrief user id: {}", id),
                None => println!("No SimBrief user id set. Usage: userid <id>"),
            },
        }
    }

    fn summary(&self) {
        let Some(user_id) = self.user_data.simbrief_user_id.as_deref() else {
            println!("No SimBrief user id set. Usage: userid <id>");
            return;
        };
        let summary = match dispatch::fetch_latest_plan(user_id) {
            Ok(summary) => summary,
            Err(e) => {
                println!("Failed to fetch flight plan: {}", e);
                return;
            }
        };
        let airline = self.catalog.by_icao(&summary.airline);
        let departure_iata = self.catalog.iata_for_icao(&summary.departure_icao, airline.as_ref());
        let arrival_iata = self.catalog.iata_for_icao(&summary.arrival_icao, airline.as_ref());
        let summary = match &airline {
            Some(airline) => summary.with_airline(airline),
            None => summary,
        };
        println!("{}", present::flight_summary(&summary));
        Self::print_atc(
            &summary,
            departure_iata.as_deref().unwrap_or(""),
            arrival_iata.as_deref().unwrap_or(""),
        );
    }

    fn help() {
        println!("\nAvailable Commands:");
        println!("  airlines                     - List airlines with route data");
        println!("  use <airline>                - Load an airline's routes");
        println!("  aircraft                     - List aircraft types for the loaded airline");
        println!("  airports [text]              - List departure airports, optionally filtered");
        println!("  pick <type> [from|*] [max]   - Random route for <type> from an airport (or anywhere), max minutes");
        println!("  routes <from> <type> [max]   - Table of every eligible route");
        println!("  dispatch                     - Flight number, ATC and SimBrief link for the last pick");
        println!("  verify <from> <to> <type>    - Check a specific route");
        println!("  find <type> <from> <to>      - Airlines flying an ICAO pair with <type>");
        println!("  userid [id]                  - Show or set the SimBrief user id");
        println!("  summary                      - Fetch your latest SimBrief flight plan");
        println!("  help / ?                     - Show this help menu");
        println!("  exit / quit                  - Leave\n");
    }

    pub fn run(&mut self) -> rustyline::Result<()> {
        let config = rustyline::Config::builder()
            .history_ignore_space(true)
            .completion_type(rustyline::CompletionType::List)
            .build();

        let helper = CompleteHelper {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
            airlines: self.catalog.names().iter().map(|n| n.to_string()).collect(),
        };

        let mut rl = Editor::with_config(config)?;
        rl.set_helper(Some(helper));

        loop {
            let readline = rl.readline(">> ");
            match readline {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() { continue; }

                    rl.add_history_entry(trimmed)?;

                    let parts: Vec<&str> = trimmed.split_whitespace().collect();
                    match parts[0] {
                        "airlines" => {
                            let names = self.catalog.names();
                            if names.is_empty() {
                                println!("No route files in {}. Run 'routepicker build' first.", self.catalog.dir().display());
                            }
                            for name in names {
                                println!("  {}", name);
                            }
                        },
                        "use" => {
                            if parts.len() > 1 {
                                self.use_airline(&parts[1..].join(" "));
                            } else {
                                println!("Usage: use <airline>");
                            }
                        },
                        "aircraft" => {
                            if let Some(airline) = self.airline() {
                                let codes: Vec<String> = airline.aircraft_choices().iter().map(|c| c.to_string()).collect();
                                println!("{}", codes.join("  "));
                            }
                        },
                        "airports" => self.list_airports(parts.get(1).copied()),
                        "pick" => {
                            if let Some(aircraft) = parts.get(1) {
                                match parse_max_minutes(parts.get(3)) {
                                    Ok(max) => self.pick(aircraft, parts.get(2).copied(), max),
                                    Err(msg) => println!("{}", msg),
                                }
                            } else {
                                println!("Usage: pick <aircraft> [origin|*] [max_minutes]");
                            }
                        },
                        "routes" => {
                            if let (Some(origin), Some(aircraft)) = (parts.get(1), parts.get(2)) {
                                match parse_max_minutes(parts.get(3)) {
                                    Ok(max) => self.list_routes(origin, aircraft, max),
                                    Err(msg) => println!("{}", msg),
                                }
                            } else {
                                println!("Usage: routes <origin> <aircraft> [max_minutes]");
                            }
                        },
                        "dispatch" => self.dispatch(),
                        "verify" => {
                            if let (Some(dep), Some(arr), Some(aircraft)) = (parts.get(1), parts.get(2), parts.get(3)) {
                                self.verify(dep, arr, aircraft);
                            } else {
                                println!("Usage: verify <departure> <arrival> <aircraft>");
                            }
                        },
                        "find" => {
                            if let (Some(aircraft), Some(dep), Some(arr)) = (parts.get(1), parts.get(2), parts.get(3)) {
                                self.find(aircraft, dep, arr);
                            } else {
                                println!("Usage: find <aircraft> <departure_icao> <arrival_icao>");
                            }
                        },
                        "userid" => self.set_user_id(parts.get(1)),
                        "summary" => self.summary(),
                        "help" | "?" => Self::help(),
                        "exit" | "quit" => break,
                        _ => println!("Unknown command: {}", parts[0]),
                    }
                },
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                },
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                },
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }
        Ok(())
    }
}
