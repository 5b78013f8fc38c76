use crate::aircraft::AircraftTable;
use crate::airline::{Airline, AirlineDirectory};
use crate::config::{parse_speed, Paths, DEFAULT_LOGO_URL, DEFAULT_REFERENCE_KTS};
use crate::error::read_json;
use crate::flight_number::FlightNumbers;
use crate::media::LogoFetcher;
use crate::reference::Reference;
use crate::routes::builder::{load_route_graph, RouteBuilder};
use crate::routes::catalog::Catalog;
use crate::shell::Shell;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

mod aircraft;
mod airline;
mod airport;
mod atc;
mod config;
mod dispatch;
mod error;
mod flight_number;
mod media;
mod present;
mod reference;
mod routes;
mod shell;
mod time;

#[derive(Parser)]
#[command(version, about = "Random airline route picker for flight simulation")]
struct Args {
    #[command(flatten)]
    paths: Paths,

    /// Cruise speed in knots used for every route's estimated time
    #[arg(long, value_name = "KTS", default_value_t = DEFAULT_REFERENCE_KTS, value_parser = parse_speed)]
    reference_kts: f64,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Generate per-airline route files from the raw route graph
    Build(BuildArgs),
    /// Interactive route picker (default)
    Cli,
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Skip downloading airline logos
    #[arg(long = "no-media", alias = "nomedia")]
    no_media: bool,

    /// Report which valid airlines have a route file, then exit
    #[arg(long)]
    verify: bool,

    /// Download logos missing for existing route files, then exit
    #[arg(long = "fix-media", alias = "fixmedia")]
    fix_media: bool,

    /// Logo URL template, `{iata}` is replaced by the airline code
    #[arg(long, value_name = "URL", default_value = DEFAULT_LOGO_URL)]
    logo_url: String,
}

fn fetch_logos<'a>(paths: &Paths, logo_url: &str, airlines: impl IntoIterator<Item = &'a Airline>) -> anyhow::Result<()> {
    let fetcher = LogoFetcher::new(logo_url, &paths.logo_dir())?;
    let report = fetcher.fetch_all(airlines);
    println!(
        "Logos: {} downloaded, {} already present, {} failed",
        report.downloaded,
        report.present,
        report.failed.len()
    );
    Ok(())
}

fn build(paths: &Paths, reference_kts: f64, opts: &BuildArgs) -> anyhow::Result<()> {
    let data_dir = paths.data_dir();

    if opts.verify {
        let valid: Vec<String> = read_json(&paths.resolve(&paths.valid_airlines))?;
        let catalog = Catalog::open(&data_dir)?;
        print!("{}", present::coverage(&catalog.coverage(&valid)));
        return Ok(());
    }

    if opts.fix_media {
        let airlines = AirlineDirectory::load_from_file(&paths.resolve(&paths.airlines))?;
        let catalog = Catalog::open(&data_dir)?;
        let names = catalog.names();
        let names: Vec<&str> = names.iter().map(|n| &**n).collect();
        let targets = media::backfill_targets(&paths.logo_dir(), &names, &airlines);
        println!("{} airlines are missing a logo", targets.len());
        return fetch_logos(paths, &opts.logo_url, targets);
    }

    let reference = Reference::load(paths, reference_kts)?;
    let graph = load_route_graph(&paths.resolve(&paths.route_graph))?;
    log::info!("Route graph loaded: {} origin airports", graph.len());

    let builder = RouteBuilder::new(&reference);
    let airlines = builder.build(&graph);
    let written = builder.write_all(&data_dir, &airlines)?;
    println!("Built {} airline route files in {}", written.len(), data_dir.display());

    if !opts.no_media {
        let operators = airlines.iter().filter_map(|a| reference.airlines.by_iata(&a.iata));
        fetch_logos(paths, &opts.logo_url, operators)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    match args.command.unwrap_or(Cmd::Cli) {
        Cmd::Build(opts) => build(&args.paths, args.reference_kts, &opts),
        Cmd::Cli => {
            let catalog = Catalog::open(&args.paths.data_dir())?;
            let flight_numbers = match FlightNumbers::load_from_file(&args.paths.resolve(&args.paths.flight_numbers)) {
                Ok(rules) => rules,
                Err(e) => {
                    log::warn!("{}; flight numbers will be unavailable", e);
                    FlightNumbers::default()
                }
            };
            let aircraft = match AircraftTable::load_from_file(&args.paths.resolve(&args.paths.aircraft)) {
                Ok(table) => table,
                Err(e) => {
                    log::warn!("{}; block times will be unavailable", e);
                    AircraftTable::default()
                }
            };
            println!("Route picker ready. {} airlines available, type 'help' for commands.", catalog.names().len());
            let mut shell = Shell::new(
                catalog,
                aircraft,
                args.reference_kts,
                flight_numbers,
                args.paths.resolve(&args.paths.user_data),
            );
            shell.run()?;
            Ok(())
        }
    }
}
