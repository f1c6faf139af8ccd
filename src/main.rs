use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};

use transfer_scout::config::{self, Config};
use transfer_scout::error::{ErrorClass, QueryError};
use transfer_scout::export;
use transfer_scout::query::RecommendationQuery;
use transfer_scout::source::CsvDirSource;
use transfer_scout::store::DatasetStore;

const USAGE: &str = "usage:
  transfer_scout clubs [--data DIR]
  transfer_scout recommend --club NAME --role CODE [--top-k N] [--xlsx PATH] [--data DIR]

roles: CB FB CDM CM CAM WINGER ST GK";

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();
    config::init_logging(&config);

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match run(&config, &args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, args: &[String]) -> Result<ExitCode> {
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        return Ok(ExitCode::from(2));
    };
    let rest = &args[1..];
    let data_dir = arg_value(rest, "--data")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_dir.clone());
    let store = DatasetStore::new(CsvDirSource::new(data_dir));

    match command.as_str() {
        "clubs" => {
            let clubs = store.list_clubs().context("load dataset")?;
            println!("{}", serde_json::to_string_pretty(&clubs)?);
            Ok(ExitCode::SUCCESS)
        }
        "recommend" => {
            let query = RecommendationQuery::parse(
                arg_value(rest, "--club").as_deref(),
                arg_value(rest, "--role").as_deref(),
                arg_value(rest, "--top-k").as_deref(),
                config.default_top_k,
            );
            let report = match query.and_then(|q| store.recommend(&q)) {
                Ok(report) => report,
                Err(err) => return Ok(report_query_error(&err)),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            if let Some(path) = arg_value(rest, "--xlsx") {
                let path = PathBuf::from(path);
                let summary = export::export_reports(&path, std::slice::from_ref(&report))?;
                eprintln!(
                    "wrote {} rows to {} ({} sheets)",
                    summary.rows,
                    path.display(),
                    summary.sheets
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        "help" | "--help" | "-h" => {
            println!("{USAGE}");
            Ok(ExitCode::SUCCESS)
        }
        other => Err(anyhow!("unknown command `{other}`\n{USAGE}")),
    }
}

fn report_query_error(err: &QueryError) -> ExitCode {
    let payload = err.payload();
    match serde_json::to_string_pretty(&payload) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("error: {err}"),
    }
    match payload.class {
        ErrorClass::BadRequest => ExitCode::from(2),
        ErrorClass::NotFound => ExitCode::from(3),
        ErrorClass::Unavailable => ExitCode::FAILURE,
    }
}

/// `--name value` or `--name=value`; blank values count as absent.
fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            if !value.trim().is_empty() {
                return Some(value.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.clone());
            }
        }
    }
    None
}
