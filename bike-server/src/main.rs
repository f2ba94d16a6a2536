use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bike_server::backend::{
    BackendClient, BackendConfig, BackendError, WeatherRecord, stations_from_records,
};
use bike_server::cache::{CacheConfig, CachedBackendClient};
use bike_server::config::{AppConfig, ConfigError, VARIABLES};
use bike_server::domain::{EstimateError, Station, StationId, StationStatus};
use bike_server::estimate::{
    RouteEstimator, cycling_minutes, estimate_arrival_from_now, format_clock, format_duration,
    great_circle_distance_km,
};
use bike_server::session::{RideMode, RideSession, SessionError};
use bike_server::stations::{StationBoard, StationError, StationSnapshot, StationSnapshotConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Bike-share route and arrival estimator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate a ride from the home station to a destination
    Route(RouteArgs),
    /// List stations with their live availability
    Stations(StationsArgs),
}

#[derive(Args, Debug)]
struct RouteArgs {
    /// Destination station id
    #[arg(value_parser = parse_station_id)]
    destination: StationId,

    /// Plan ahead with forecast weather: YYYY-MM-DD (noon) or YYYY-MM-DDTHH:MM
    #[arg(value_parser = parse_departure, value_name = "WHEN")]
    departure: Option<RideMode>,
}

#[derive(Args, Debug)]
struct StationsArgs {
    /// Only list stations whose name contains this text
    query: Option<String>,

    /// Maximum number of stations to list
    #[arg(short, long, default_value_t = 20)]
    limit: usize,

    /// Re-fetch and reprint the list every SECS seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    watch: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Stations(#[from] StationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Estimate(#[from] EstimateError),
}

fn parse_station_id(s: &str) -> Result<StationId, String> {
    s.trim()
        .parse()
        .map(StationId)
        .map_err(|e| format!("invalid station id {s:?}: {e}"))
}

fn parse_departure(s: &str) -> Result<RideMode, String> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Ok(RideMode::Forecast {
            date: dt.date(),
            time: Some(dt.time()),
        });
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|date| RideMode::Forecast { date, time: None })
        .map_err(|_| format!("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM, got {s:?}"))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bike_server=info")),
        )
        .init();

    if let Err(e) = run(cli.command).await {
        error!("{e}");
        if matches!(e, RunError::Config(_)) {
            error!("recognised variables: {}", VARIABLES.join(", "));
        }
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<(), RunError> {
    let config = AppConfig::from_env()?;
    config.log();

    let client = BackendClient::new(
        BackendConfig::new(&config.api_url).with_timeout(config.timeout_secs),
    )?;
    let backend = Arc::new(CachedBackendClient::new(client, &CacheConfig::default()));
    let snapshot = StationSnapshot::new(StationSnapshotConfig::new(&config.snapshot_path));

    match command {
        Command::Route(args) => route(&config, backend, &snapshot, args).await,
        Command::Stations(args) => stations(&config, backend, &snapshot, args).await,
    }
}

async fn route(
    config: &AppConfig,
    backend: Arc<CachedBackendClient>,
    snapshot: &StationSnapshot,
    args: RouteArgs,
) -> Result<(), RunError> {
    let mode = args.departure.unwrap_or_default();

    // Stations and weather are independent; fetch both at once.
    let (board, weather) = futures::join!(
        load_board(backend.clone(), snapshot),
        fetch_weather(&backend, mode)
    );
    let board = board?;

    let home = board.require(config.home_station).await?;
    let destination = board.require(args.destination).await?;

    let mut session = RideSession::new(home, RouteEstimator::new(config.estimator));
    session.set_mode(mode);

    let now = Local::now();
    let selection = session.select(destination, now)?;
    println!("From: {}", session.home().name);
    for line in selection.summary_lines() {
        println!("{line}");
    }

    let weather = match weather {
        Ok(weather) => weather,
        Err(e) => {
            warn!("weather unavailable, skipping prediction: {e}");
            return Ok(());
        }
    };
    print_weather(&weather, mode);

    let payload = match session.prediction_request(&weather, now) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("cannot request a prediction: {e}");
            return Ok(());
        }
    };
    match backend.ride_prediction(&payload).await {
        Ok(prediction) => {
            println!(
                "Prediction of Available Bikes at Origin: {}",
                prediction.bikes_at_origin
            );
            println!(
                "Prediction of Available Stands at Destination: {}",
                prediction.stands_at_destination
            );
        }
        Err(e) => warn!("ride prediction failed: {e}"),
    }

    Ok(())
}

async fn stations(
    config: &AppConfig,
    backend: Arc<CachedBackendClient>,
    snapshot: &StationSnapshot,
    args: StationsArgs,
) -> Result<(), RunError> {
    let board = load_board(backend.clone(), snapshot).await?;
    print_stations(&board, config, &args).await?;

    let Some(secs) = args.watch else {
        return Ok(());
    };

    let mut interval = tokio::time::interval(Duration::from_secs(secs));
    interval.tick().await; // First tick is immediate, skip it
    loop {
        interval.tick().await;
        match board.refresh().await {
            Ok(count) => {
                info!(
                    count,
                    cached = backend.cache_entry_count(),
                    "refreshed stations"
                );
                println!();
                print_stations(&board, config, &args).await?;
            }
            Err(e) => warn!("station refresh failed, keeping previous list: {e}"),
        }
    }
}

async fn print_stations(
    board: &StationBoard,
    config: &AppConfig,
    args: &StationsArgs,
) -> Result<(), RunError> {
    let listed = match &args.query {
        Some(query) => board.search(query, args.limit).await,
        None => {
            let mut all = board.sorted_by_name().await;
            all.truncate(args.limit);
            all
        }
    };
    let home = board.get(config.home_station).await;
    let speed = config.estimator.average_speed_kmh();

    for station in &listed {
        let mut line = format!(
            "{:>4}  {:<36} {}",
            station.id,
            station.name,
            availability(station)
        );

        if let Some(home) = home.as_ref().filter(|h| h.id != station.id) {
            let km = great_circle_distance_km(home.position, station.position);
            let minutes = cycling_minutes(km, speed)?;
            let arrival = estimate_arrival_from_now(minutes)?;
            line.push_str(&format!(
                "  {km:.2} km, {}, arrive {}",
                format_duration(minutes)?,
                format_clock(&arrival)
            ));
        }
        println!("{line}");
    }

    if listed.is_empty() {
        println!("No matching stations.");
    }
    Ok(())
}

/// Short availability summary for a station listing.
fn availability(station: &Station) -> String {
    if station.status == StationStatus::Closed {
        return "closed".to_string();
    }
    match (station.has_bikes(), station.has_stands()) {
        (false, _) => format!("no bikes, {} stands", station.available_stands),
        (true, false) => format!("{} bikes, full", station.available_bikes),
        (true, true) => format!(
            "{} bikes, {} stands",
            station.available_bikes, station.available_stands
        ),
    }
}

/// Load stations from the backend, falling back to the last snapshot.
async fn load_board(
    backend: Arc<CachedBackendClient>,
    snapshot: &StationSnapshot,
) -> Result<StationBoard, StationError> {
    match StationBoard::load(backend.clone()).await {
        Ok(board) => {
            // Served from cache: load() just fetched it.
            if let Ok(records) = backend.current_bikes().await
                && let Err(e) = snapshot.save(&records)
            {
                warn!("could not save station snapshot: {e}");
            }
            Ok(board)
        }
        Err(e) => {
            warn!("station list unavailable ({e}); trying {}", snapshot.path().display());
            let saved = snapshot.load().ok_or(e)?;
            let stations = stations_from_records(&saved.stations);
            warn!(
                count = stations.len(),
                age_mins = saved.age_at(Utc::now()).num_minutes(),
                "using station snapshot; availability may be out of date"
            );
            Ok(StationBoard::from_stations(backend, stations))
        }
    }
}

async fn fetch_weather(
    backend: &CachedBackendClient,
    mode: RideMode,
) -> Result<Arc<WeatherRecord>, BackendError> {
    match mode.forecast_departure() {
        Some(target) => backend.forecast_weather(target).await,
        None => backend.current_weather().await,
    }
}

fn print_weather(weather: &WeatherRecord, mode: RideMode) {
    let heading = match mode {
        RideMode::Now => "Current Weather:",
        RideMode::Forecast { .. } => "Forecast Weather for:",
    };
    let when = weather
        .observed_at()
        .map(|t| t.format("%A %H:%M").to_string())
        .unwrap_or_default();
    println!("{heading} {when}");

    if let Some(temp) = weather.temp {
        println!("  {temp} °C");
    }
    if let Some(humidity) = weather.humidity {
        println!("  Humidity: {humidity}%");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bike_server::domain::GeoPoint;
    use chrono::NaiveTime;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("bike-server").chain(args.iter().copied()))
    }

    fn route_args(args: &[&str]) -> RouteArgs {
        match parse(args).unwrap().command {
            Command::Route(route) => route,
            other => panic!("expected route, got {other:?}"),
        }
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn route_now() {
        let args = route_args(&["route", "42"]);
        assert_eq!(args.destination, StationId(42));
        assert_eq!(args.departure, None);
    }

    #[test]
    fn route_on_a_date_departs_at_noon() {
        let args = route_args(&["route", "42", "2025-04-02"]);
        let mode = args.departure.unwrap();
        assert_eq!(
            mode,
            RideMode::Forecast {
                date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
                time: None,
            }
        );
        assert_eq!(
            mode.forecast_departure().unwrap().time(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap()
        );
    }

    #[test]
    fn route_at_a_date_and_time() {
        let args = route_args(&["route", "42", "2025-04-02T18:30"]);
        assert_eq!(
            args.departure,
            Some(RideMode::Forecast {
                date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
                time: NaiveTime::from_hms_opt(18, 30, 0),
            })
        );
    }

    #[test]
    fn route_argument_errors() {
        let err = parse(&["route"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = parse(&["route", "dame"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = parse(&["route", "42", "tomorrow"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = parse(&["route", "42", "2025-02-30"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert_eq!(
            parse(&["--version"]).unwrap_err().kind(),
            ErrorKind::DisplayVersion
        );
    }

    #[test]
    fn stations_options() {
        let Command::Stations(args) = parse(&["stations"]).unwrap().command else {
            panic!("expected stations");
        };
        assert_eq!(args.query, None);
        assert_eq!(args.limit, 20);
        assert_eq!(args.watch, None);

        let Command::Stations(args) = parse(&["stations", "street", "-l", "5", "--watch", "60"])
            .unwrap()
            .command
        else {
            panic!("expected stations");
        };
        assert_eq!(args.query.as_deref(), Some("street"));
        assert_eq!(args.limit, 5);
        assert_eq!(args.watch, Some(60));

        let err = parse(&["stations", "--watch", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn availability_summary() {
        let station = |bikes: u32, stands: u32, status: StationStatus| Station {
            id: StationId(10),
            name: "DAME STREET".to_string(),
            address: "Dame Street".to_string(),
            position: GeoPoint::new(53.344, -6.2668).unwrap(),
            available_bikes: bikes,
            available_stands: stands,
            bike_stands: bikes + stands,
            status,
        };

        assert_eq!(
            availability(&station(5, 11, StationStatus::Open)),
            "5 bikes, 11 stands"
        );
        assert_eq!(
            availability(&station(0, 16, StationStatus::Open)),
            "no bikes, 16 stands"
        );
        assert_eq!(
            availability(&station(16, 0, StationStatus::Unknown)),
            "16 bikes, full"
        );
        assert_eq!(availability(&station(5, 11, StationStatus::Closed)), "closed");
    }
}
