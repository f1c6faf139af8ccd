use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::roles::{SubRole, strip_per90};
use crate::similarity::{RankedCandidate, Ranking};

const NOT_AVAILABLE: &str = "N/A";

/// One named headline stat for a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayStat {
    pub name: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerRecommendation {
    pub rank: usize,
    pub player: String,
    pub nation: String,
    pub club: Option<String>,
    pub subrole: Option<SubRole>,
    #[serde(serialize_with = "serialize_or_na")]
    pub age: Option<u32>,
    pub key_feature: String,
    pub key_feature_value: Option<f64>,
    pub fit_cosine: f64,
    #[serde(serialize_with = "serialize_stats")]
    pub display_stats: Vec<DisplayStat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationReport {
    pub results: Vec<PlayerRecommendation>,
    pub club: String,
    pub role: SubRole,
    pub display_columns: Vec<String>,
}

impl RecommendationReport {
    pub fn from_ranking(ranking: &Ranking<'_>) -> Self {
        let display = ranking.view.display_columns();
        let results = ranking
            .candidates
            .iter()
            .map(|c| format_candidate(c, &display))
            .collect();
        Self {
            results,
            club: ranking.club.clone(),
            role: ranking.view.role,
            display_columns: display.iter().map(|c| strip_per90(c)).collect(),
        }
    }
}

fn format_candidate(candidate: &RankedCandidate<'_>, display: &[String]) -> PlayerRecommendation {
    let player = candidate.player;
    PlayerRecommendation {
        rank: candidate.rank,
        player: player.name.clone(),
        nation: clean_nation(player.nation.as_deref()),
        club: player.squad.clone(),
        subrole: player.sub_role,
        age: player.age,
        key_feature: strip_per90(&candidate.key_feature.name),
        key_feature_value: candidate.key_feature.value.map(|v| round_to(v, 2)),
        fit_cosine: round_to(candidate.fit_cosine * 100.0, 1),
        display_stats: display
            .iter()
            .map(|column| DisplayStat {
                name: strip_per90(column),
                value: player.stat(column).map(|v| round_to(v, 2)),
            })
            .collect(),
    }
}

/// Last space-delimited token, which drops a leading confederation code
/// (`"eng ENG"` -> `"ENG"`).
pub fn clean_nation(raw: Option<&str>) -> String {
    raw.and_then(|s| s.split(' ').next_back())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Decimal rounding with halves going to the even digit (`0.125` -> `0.12`).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

fn serialize_or_na<S: Serializer>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_u32(*v),
        None => serializer.serialize_str(NOT_AVAILABLE),
    }
}

fn serialize_stats<S: Serializer>(
    stats: &[DisplayStat],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(stats.len()))?;
    for stat in stats {
        map.serialize_entry(&stat.name, &stat.value)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nation_keeps_last_token() {
        assert_eq!(clean_nation(Some("eng ENG")), "ENG");
        assert_eq!(clean_nation(Some("BRA")), "BRA");
        assert_eq!(clean_nation(Some("fr FRA ")), "N/A");
        assert_eq!(clean_nation(None), "N/A");
    }

    #[test]
    fn rounding_matches_display_precision() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(87.6543, 1), 87.7);
        assert_eq!(round_to(-0.004, 2), -0.0);
    }

    #[test]
    fn rounding_sends_halves_to_even() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(87.25, 1), 87.2);
        assert_eq!(round_to(2.5, 0), 2.0);
    }

    #[test]
    fn stats_serialize_as_ordered_map() {
        let rec = PlayerRecommendation {
            rank: 1,
            player: "A".into(),
            nation: "ENG".into(),
            club: Some("Chelsea".into()),
            subrole: Some(SubRole::Winger),
            age: None,
            key_feature: "Succ".into(),
            key_feature_value: Some(2.5),
            fit_cosine: 91.2,
            display_stats: vec![
                DisplayStat {
                    name: "Succ".into(),
                    value: Some(2.5),
                },
                DisplayStat {
                    name: "Crs".into(),
                    value: None,
                },
            ],
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains(r#""age":"N/A""#));
        assert!(json.contains(r#""subrole":"WINGER""#));
        assert!(json.contains(r#""display_stats":{"Succ":2.5,"Crs":null}"#));
    }
}
