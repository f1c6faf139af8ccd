use std::num::NonZeroUsize;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

use transfer_scout::dataset::Dataset;
use transfer_scout::report::RecommendationReport;
use transfer_scout::roles::{PositionTable, SubRole};
use transfer_scout::similarity::{self, Standardizer};
use transfer_scout::source::{MemorySource, RawTable};

const CLUBS: [&str; 20] = [
    "Arsenal", "Aston Villa", "Bournemouth", "Brentford", "Brighton", "Chelsea", "Crystal Palace",
    "Everton", "Fulham", "Ipswich", "Leicester", "Liverpool", "Manchester City",
    "Manchester United", "Newcastle", "Nottingham Forest", "Southampton", "Tottenham",
    "West Ham", "Wolves",
];

fn synthetic_table(
    rng: &mut StdRng,
    kind: PositionTable,
    labels: &[&str],
    rows: usize,
) -> RawTable {
    let mut headers: Vec<String> = ["Player", "Nation", "Squad", "Age"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    if kind.has_positional_label() {
        headers.push("SpecificPos".to_string());
    }
    headers.push("90s".to_string());
    let stats = transfer_scout::roles::referenced_columns(kind);
    headers.extend(stats.iter().map(|s| s.to_string()));

    let data = (0..rows)
        .map(|idx| {
            let mut row = vec![
                format!("{kind} {idx}"),
                "eng ENG".to_string(),
                CLUBS[idx % CLUBS.len()].to_string(),
                format!("{}-{:03}", rng.gen_range(17..37), rng.gen_range(0..365)),
            ];
            if kind.has_positional_label() {
                row.push(labels[(idx / CLUBS.len()) % labels.len()].to_string());
            }
            row.push(format!("{:.1}", rng.gen_range(1.0..38.0)));
            for _ in &stats {
                // Leave the odd cell blank so imputation is exercised.
                if rng.gen_range(0..50) == 0 {
                    row.push(String::new());
                } else {
                    row.push(format!("{:.2}", rng.gen_range(0.0..8.0)));
                }
            }
            row
        })
        .collect();
    RawTable::new(headers, data)
}

fn synthetic_source(rows_per_table: usize) -> MemorySource {
    let mut rng = StdRng::seed_from_u64(2026);
    MemorySource::new()
        .with_table(
            PositionTable::Defenders,
            synthetic_table(&mut rng, PositionTable::Defenders, &["CB", "LCB", "RB", "LB"], rows_per_table),
        )
        .with_table(
            PositionTable::Midfielders,
            synthetic_table(&mut rng, PositionTable::Midfielders, &["CDM", "CM", "CAM"], rows_per_table),
        )
        .with_table(
            PositionTable::Forwards,
            synthetic_table(&mut rng, PositionTable::Forwards, &["ST", "RW", "LW"], rows_per_table),
        )
        .with_table(
            PositionTable::Goalkeepers,
            synthetic_table(&mut rng, PositionTable::Goalkeepers, &[], rows_per_table / 4),
        )
}

fn bench_dataset_load(c: &mut Criterion) {
    let source = synthetic_source(600);
    c.bench_function("dataset_load", |b| {
        b.iter(|| {
            let dataset = Dataset::load(black_box(&source)).unwrap();
            black_box(dataset.role_features().len());
        })
    });
}

fn bench_rank_candidates(c: &mut Criterion) {
    let dataset = Dataset::load(&synthetic_source(600)).unwrap();
    c.bench_function("rank_candidates_winger", |b| {
        b.iter(|| {
            let ranking =
                similarity::rank_candidates(black_box(&dataset), "Arsenal", SubRole::Winger).unwrap();
            black_box(ranking.candidates.len());
        })
    });
}

fn bench_recommend_report(c: &mut Criterion) {
    let dataset = Dataset::load(&synthetic_source(600)).unwrap();
    let top_k = NonZeroUsize::new(10).unwrap();
    c.bench_function("recommend_report_all_roles", |b| {
        b.iter(|| {
            for role in SubRole::ALL {
                let ranking = similarity::recommend(&dataset, "Chelsea", role, top_k).unwrap();
                let report = RecommendationReport::from_ranking(&ranking);
                black_box(report.results.len());
            }
        })
    });
}

fn bench_standardizer_fit(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(90);
    let rows: Vec<Vec<f64>> = (0..2_000)
        .map(|_| (0..12).map(|_| rng.gen_range(0.0..8.0)).collect())
        .collect();
    c.bench_function("standardizer_fit", |b| {
        b.iter(|| {
            let scaler = Standardizer::fit(black_box(&rows), 12);
            black_box(scaler.scales()[0]);
        })
    });
}

criterion_group!(
    perf,
    bench_dataset_load,
    bench_rank_candidates,
    bench_recommend_report,
    bench_standardizer_fit
);
criterion_main!(perf);
