use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;

use transfer_scout::config::{self, Config};
use transfer_scout::error::QueryError;
use transfer_scout::export;
use transfer_scout::query::parse_top_k;
use transfer_scout::report::RecommendationReport;
use transfer_scout::roles::SubRole;
use transfer_scout::similarity;
use transfer_scout::store;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();
    config::init_logging(&config);

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let club = parse_str_arg(&args, "--club").ok_or_else(|| anyhow!("--club is required"))?;
    let top_k = match parse_str_arg(&args, "--top-k") {
        Some(raw) => parse_top_k(&raw)?,
        None => config.default_top_k,
    };
    let out_path = parse_str_arg(&args, "--out").map(PathBuf::from);

    let store = store::shared_store()?;
    let dataset = store.ensure_loaded().context("load dataset")?;

    let outcomes: Vec<(SubRole, Result<RecommendationReport, QueryError>)> = SubRole::ALL
        .par_iter()
        .map(|&role| {
            let report = similarity::recommend(&dataset, &club, role, top_k)
                .map(|ranking| RecommendationReport::from_ranking(&ranking));
            (role, report)
        })
        .collect();

    let mut reports = Vec::new();
    for (role, outcome) in outcomes {
        match outcome {
            Ok(report) => {
                print_summary(&report, top_k);
                reports.push(report);
            }
            Err(QueryError::NoReferencePlayers { .. }) => {
                tracing::info!(club = %club, role = %role, "no reference players, skipped");
            }
            Err(err) => {
                tracing::warn!(club = %club, role = %role, error = %err, "role skipped");
            }
        }
    }

    if reports.is_empty() {
        return Err(anyhow!("no players found for {club} in any role"));
    }

    if let Some(path) = out_path {
        let summary = export::export_reports(&path, &reports)?;
        println!(
            "Workbook: {} ({} sheets, {} rows)",
            path.display(),
            summary.sheets,
            summary.rows
        );
    }

    Ok(())
}

fn print_summary(report: &RecommendationReport, top_k: NonZeroUsize) {
    println!("{} {} (top {})", report.club, report.role, top_k);
    for rec in &report.results {
        println!(
            " {:>2}. {:<28} {:<22} fit {:>5.1}%  key {} {}",
            rec.rank,
            rec.player,
            rec.club.as_deref().unwrap_or("-"),
            rec.fit_cosine,
            rec.key_feature,
            rec.key_feature_value
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "-".to_string())
        );
    }
}

fn parse_str_arg(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
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
