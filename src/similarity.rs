use std::cmp::Ordering;
use std::num::NonZeroUsize;

use tracing::debug;

use crate::dataset::{Dataset, NINETIES_COL, PlayerRecord, RoleView};
use crate::error::QueryError;
use crate::roles::SubRole;

/// Std at or below this is a constant feature: it keeps scale 1, so every
/// standardized value in that dimension is 0.
const STD_EPSILON: f64 = 1e-9;

/// Per-feature zero-mean / unit-variance transform (population std).
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl Standardizer {
    pub fn fit(rows: &[Vec<f64>], dims: usize) -> Self {
        let mut means = vec![0.0; dims];
        let mut scales = vec![1.0; dims];
        if rows.is_empty() {
            return Self { means, scales };
        }
        let n = rows.len() as f64;
        for (d, mean) in means.iter_mut().enumerate() {
            *mean = rows.iter().map(|r| r[d]).sum::<f64>() / n;
        }
        for (d, scale) in scales.iter_mut().enumerate() {
            let var = rows
                .iter()
                .map(|r| {
                    let diff = r[d] - means[d];
                    diff * diff
                })
                .sum::<f64>()
                / n;
            let std = var.sqrt();
            if std > STD_EPSILON {
                *scale = std;
            }
        }
        Self { means, scales }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(v, (mean, scale))| (v - mean) / scale)
            .collect()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }
}

/// Coordinate-wise mean that skips non-finite entries. A column with no
/// finite value is 0.
pub fn centroid(rows: &[Vec<f64>], dims: usize) -> Vec<f64> {
    (0..dims)
        .map(|d| {
            let (sum, n) = rows
                .iter()
                .map(|r| r[d])
                .filter(|v| v.is_finite())
                .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
            if n == 0 { 0.0 } else { sum / n as f64 }
        })
        .collect()
}

/// Cosine similarity; 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        // `+ 0.0` folds -0.0 into 0.0 so orthogonal vectors tie under total_cmp.
        dot / (na * nb) + 0.0
    }
}

pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Index of the largest value; earliest wins ties, NaN never wins.
fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((idx, v)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Feature vector with missing cells imputed as zero.
fn feature_vector(player: &PlayerRecord, features: &[String]) -> Vec<f64> {
    features
        .iter()
        .map(|f| player.stat(f).unwrap_or(0.0))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyFeature {
    pub name: String,
    /// The raw stat; `None` when the cell was missing and got imputed.
    pub value: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RankedCandidate<'a> {
    pub rank: usize,
    pub player: &'a PlayerRecord,
    pub fit_cosine: f64,
    pub fit_euclid: f64,
    pub minutes_evidence: f64,
    pub key_feature: KeyFeature,
}

/// Cosine descending, then distance ascending, then minutes descending.
pub fn ranking_order(a: &RankedCandidate<'_>, b: &RankedCandidate<'_>) -> Ordering {
    b.fit_cosine
        .total_cmp(&a.fit_cosine)
        .then_with(|| a.fit_euclid.total_cmp(&b.fit_euclid))
        .then_with(|| b.minutes_evidence.total_cmp(&a.minutes_evidence))
}

/// A ranked candidate pool for one club and sub-role.
#[derive(Debug, Clone)]
pub struct Ranking<'a> {
    pub club: String,
    pub view: RoleView<'a>,
    pub reference_size: usize,
    pub pool_size: usize,
    pub candidates: Vec<RankedCandidate<'a>>,
}

impl Ranking<'_> {
    pub fn truncate(&mut self, top_k: NonZeroUsize) {
        self.candidates.truncate(top_k.get());
    }
}

/// Score every player of `role` outside `club` against the club's centroid.
pub fn rank_candidates<'a>(
    dataset: &'a Dataset,
    club: &str,
    role: SubRole,
) -> Result<Ranking<'a>, QueryError> {
    let view = dataset.role_view(role);
    let features = view.features;
    if features.is_empty() {
        return Err(QueryError::NoFeatures(role));
    }

    let (reference, pool): (Vec<&PlayerRecord>, Vec<&PlayerRecord>) =
        view.table.players_in(role).partition(|p| p.plays_for(club));
    debug!(
        club,
        role = %role,
        reference = reference.len(),
        pool = pool.len(),
        "partitioned role players"
    );
    if reference.is_empty() {
        return Err(QueryError::NoReferencePlayers {
            club: club.to_string(),
            role,
        });
    }

    let dims = features.len();
    let reference_raw: Vec<Vec<f64>> = reference
        .iter()
        .map(|p| feature_vector(p, features))
        .collect();
    let pool_raw: Vec<Vec<f64>> = pool.iter().map(|p| feature_vector(p, features)).collect();

    let combined: Vec<Vec<f64>> = reference_raw.iter().chain(&pool_raw).cloned().collect();
    let scaler = Standardizer::fit(&combined, dims);

    let reference_scaled: Vec<Vec<f64>> =
        reference_raw.iter().map(|r| scaler.transform(r)).collect();
    let club_centroid = centroid(&reference_scaled, dims);

    let track_minutes = view.table.has_column(NINETIES_COL);
    let mut candidates: Vec<RankedCandidate<'a>> = pool
        .iter()
        .zip(&pool_raw)
        .map(|(&player, raw)| {
            let scaled = scaler.transform(raw);
            let key_idx = argmax(&scaled).unwrap_or(0);
            let key_name = &features[key_idx];
            RankedCandidate {
                rank: 0,
                player,
                fit_cosine: cosine_similarity(&scaled, &club_centroid),
                fit_euclid: euclidean_distance(&scaled, &club_centroid),
                minutes_evidence: if track_minutes {
                    player.stat(NINETIES_COL).unwrap_or(0.0)
                } else {
                    0.0
                },
                key_feature: KeyFeature {
                    name: key_name.clone(),
                    value: player.stat(key_name),
                },
            }
        })
        .collect();

    candidates.sort_by(ranking_order);
    for (idx, candidate) in candidates.iter_mut().enumerate() {
        candidate.rank = idx + 1;
    }

    Ok(Ranking {
        club: club.to_string(),
        view,
        reference_size: reference.len(),
        pool_size: pool.len(),
        candidates,
    })
}

/// Ranked candidates for a query, cut to `top_k`.
pub fn recommend<'a>(
    dataset: &'a Dataset,
    club: &str,
    role: SubRole,
    top_k: NonZeroUsize,
) -> Result<Ranking<'a>, QueryError> {
    let mut ranking = rank_candidates(dataset, club, role)?;
    ranking.truncate(top_k);
    Ok(ranking)
}
