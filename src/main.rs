//! Settlement query service entry point: CLI wiring, data loading and serving.

use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use settlement_query::config::ServiceConfig;
use settlement_query::dataset::Dataset;
use settlement_query::io::export::{
    export_hourly_csv, export_monthly_csv, write_hourly_csv, write_monthly_csv,
};
use settlement_query::io::load_dataset;
use settlement_query::query::{QueryEngine, TimeRange};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Which one-shot query to run instead of serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryKind {
    Hourly,
    Monthly,
}

/// A one-shot query and where to write its CSV.
struct QueryArgs {
    kind: QueryKind,
    start: i64,
    end: i64,
    location: String,
    out: Option<String>,
}

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    data_dir: Option<String>,
    port: Option<u16>,
    query: Option<QueryArgs>,
}

fn print_help() {
    eprintln!("settlement-query: hourly and monthly project settlement queries");
    eprintln!();
    eprintln!("Usage: settlement-query [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load service config from TOML file");
    eprintln!("  --data-dir <dir>         Look for data files only in this directory");
    eprintln!("  --port <u16>             API server port (default: 5001)");
    eprintln!("  --query <hourly|monthly> Run one query, print CSV and exit");
    eprintln!("  --start <ms>             Query range start, epoch ms (inclusive)");
    eprintln!("  --end <ms>               Query range end, epoch ms (exclusive)");
    eprintln!("  --location <name>        Settlement point name");
    eprintln!("  --out <path>             Write query CSV to a file instead of stdout");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("Without --query the REST API is served.");
}

fn next_value(args: &[String], i: &mut usize, flag: &str, what: &str) -> String {
    *i += 1;
    if *i >= args.len() {
        eprintln!("error: {flag} requires a {what} argument");
        process::exit(1);
    }
    args[*i].clone()
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str, what: &str) -> T {
    value.parse::<T>().unwrap_or_else(|_| {
        eprintln!("error: {flag} value \"{value}\" is not a valid {what}");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        data_dir: None,
        port: None,
        query: None,
    };
    let mut kind = None;
    let mut start = None;
    let mut end = None;
    let mut location = None;
    let mut out = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => cli.config_path = Some(next_value(&args, &mut i, "--config", "path")),
            "--data-dir" => cli.data_dir = Some(next_value(&args, &mut i, "--data-dir", "path")),
            "--port" => {
                let v = next_value(&args, &mut i, "--port", "u16");
                cli.port = Some(parse_number(&v, "--port", "u16"));
            }
            "--query" => {
                let v = next_value(&args, &mut i, "--query", "kind");
                kind = Some(match v.as_str() {
                    "hourly" => QueryKind::Hourly,
                    "monthly" => QueryKind::Monthly,
                    other => {
                        eprintln!("error: --query must be \"hourly\" or \"monthly\", got \"{other}\"");
                        process::exit(1);
                    }
                });
            }
            "--start" => {
                let v = next_value(&args, &mut i, "--start", "i64");
                start = Some(parse_number(&v, "--start", "i64"));
            }
            "--end" => {
                let v = next_value(&args, &mut i, "--end", "i64");
                end = Some(parse_number(&v, "--end", "i64"));
            }
            "--location" => location = Some(next_value(&args, &mut i, "--location", "name")),
            "--out" => out = Some(next_value(&args, &mut i, "--out", "path")),
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if let Some(kind) = kind {
        let (Some(start), Some(end), Some(location)) = (start, end, location) else {
            eprintln!("error: --query requires --start, --end and --location");
            process::exit(1);
        };
        cli.query = Some(QueryArgs {
            kind,
            start,
            end,
            location,
            out,
        });
    }

    cli
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Runs a single query and writes its CSV to `--out` or stdout.
fn run_query(engine: &QueryEngine, query: &QueryArgs) -> io::Result<()> {
    let range = TimeRange::from_epoch_millis(query.start, query.end)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let location = query.location.as_str();

    match query.kind {
        QueryKind::Hourly => {
            let rows = engine.hourly_project_settlement(&range, location);
            info!(location, rows = rows.len(), "hourly project settlement");
            match &query.out {
                Some(path) => export_hourly_csv(&rows, Path::new(path)),
                None => write_hourly_csv(&rows, io::stdout().lock()),
            }
        }
        QueryKind::Monthly => {
            let months = engine.average_monthly_values(&range, location);
            info!(location, months = months.len(), "average monthly values");
            match &query.out {
                Some(path) => export_monthly_csv(&months, Path::new(path)),
                None => write_monthly_csv(&months, io::stdout().lock()),
            }
        }
    }
}

fn main() {
    let cli = parse_args();

    // Load config: --config file, else defaults; CLI flags override
    let mut config = if let Some(ref path) = cli.config_path {
        match ServiceConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ServiceConfig::default()
    };
    if let Some(ref dir) = cli.data_dir {
        config.data.search_dirs = vec![PathBuf::from(dir)];
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Validate
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    init_tracing(&config.logging.level);

    // Load data; any failure is fatal
    let dataset: Dataset = match config
        .resolve_data_paths()
        .and_then(|(prices, generation)| load_dataset(&prices, &generation))
    {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("failed to load dataset: {e}");
            process::exit(1);
        }
    };
    let engine = QueryEngine::new(Arc::new(dataset));

    if let Some(query) = &cli.query {
        if let Err(e) = run_query(&engine, query) {
            eprintln!("error: {e}");
            process::exit(1);
        }
        return;
    }

    serve(engine, &config);
}

#[cfg(feature = "api")]
fn serve(engine: QueryEngine, config: &ServiceConfig) {
    let addr = match config.listen_addr() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let state = Arc::new(settlement_query::api::AppState { engine });
    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    if let Err(e) = rt.block_on(settlement_query::api::serve(state, addr)) {
        error!("server error: {e}");
        process::exit(1);
    }
}

#[cfg(not(feature = "api"))]
fn serve(_engine: QueryEngine, _config: &ServiceConfig) {
    eprintln!("error: built without the `api` feature; use --query");
    process::exit(1);
}
