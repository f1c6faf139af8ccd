use std::fmt;

use serde::{Deserialize, Serialize};

/// The four positional tables a dataset is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PositionTable {
    Defenders,
    Midfielders,
    Forwards,
    Goalkeepers,
}

impl PositionTable {
    pub const ALL: [PositionTable; 4] = [
        PositionTable::Defenders,
        PositionTable::Midfielders,
        PositionTable::Forwards,
        PositionTable::Goalkeepers,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PositionTable::Defenders => "Defenders",
            PositionTable::Midfielders => "Midfielders",
            PositionTable::Forwards => "Forwards",
            PositionTable::Goalkeepers => "Goalkeepers",
        }
    }

    /// Goalkeepers carry no positional label; every row is a `GK`.
    pub fn has_positional_label(self) -> bool {
        !matches!(self, PositionTable::Goalkeepers)
    }
}

impl fmt::Display for PositionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical tactical bucket a player is compared within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubRole {
    #[serde(rename = "CB")]
    CenterBack,
    #[serde(rename = "FB")]
    FullBack,
    #[serde(rename = "CDM")]
    DefensiveMid,
    #[serde(rename = "CM")]
    CentralMid,
    #[serde(rename = "CAM")]
    AttackingMid,
    #[serde(rename = "WINGER")]
    Winger,
    #[serde(rename = "ST")]
    Striker,
    #[serde(rename = "GK")]
    Goalkeeper,
}

impl SubRole {
    pub const ALL: [SubRole; 8] = [
        SubRole::CenterBack,
        SubRole::FullBack,
        SubRole::DefensiveMid,
        SubRole::CentralMid,
        SubRole::AttackingMid,
        SubRole::Winger,
        SubRole::Striker,
        SubRole::Goalkeeper,
    ];

    pub fn code(self) -> &'static str {
        match self {
            SubRole::CenterBack => "CB",
            SubRole::FullBack => "FB",
            SubRole::DefensiveMid => "CDM",
            SubRole::CentralMid => "CM",
            SubRole::AttackingMid => "CAM",
            SubRole::Winger => "WINGER",
            SubRole::Striker => "ST",
            SubRole::Goalkeeper => "GK",
        }
    }

    /// Case-sensitive lookup of a canonical code.
    pub fn from_code(code: &str) -> Option<SubRole> {
        SubRole::ALL.into_iter().find(|role| role.code() == code)
    }

    pub fn table(self) -> PositionTable {
        match self {
            SubRole::CenterBack | SubRole::FullBack => PositionTable::Defenders,
            SubRole::DefensiveMid | SubRole::CentralMid | SubRole::AttackingMid => {
                PositionTable::Midfielders
            }
            SubRole::Winger | SubRole::Striker => PositionTable::Forwards,
            SubRole::Goalkeeper => PositionTable::Goalkeepers,
        }
    }

    /// Declared feature vector for this sub-role, before the column filter.
    pub fn declared_features(self) -> Vec<&'static str> {
        let parts: Vec<&'static [&'static str]> = match self {
            SubRole::CenterBack => vec![FeatureGroup::DefCommon.columns()],
            SubRole::FullBack => vec![FeatureGroup::DefCommon.columns(), FULL_BACK_EXTRAS],
            SubRole::DefensiveMid => vec![
                FeatureGroup::DefCommon.columns(),
                FeatureGroup::MidPassing.columns(),
            ],
            SubRole::CentralMid => vec![
                FeatureGroup::MidCreating.columns(),
                FeatureGroup::MidPassing.columns(),
            ],
            SubRole::AttackingMid => vec![
                FeatureGroup::MidCreating.columns(),
                FeatureGroup::MidScoring.columns(),
            ],
            SubRole::Striker => vec![FeatureGroup::FwdCommon.columns()],
            SubRole::Winger => vec![
                FeatureGroup::FwdCreating.columns(),
                FeatureGroup::FwdPassing.columns(),
            ],
            SubRole::Goalkeeper => vec![FeatureGroup::GkCommon.columns()],
        };
        let mut out: Vec<&'static str> = Vec::new();
        for &column in parts.iter().flat_map(|p| p.iter()) {
            if !out.contains(&column) {
                out.push(column);
            }
        }
        out
    }

    /// Headline stats shown next to each candidate.
    pub fn declared_display(self) -> &'static [&'static str] {
        match self {
            SubRole::CenterBack => &["Tkl_p90", "Int_p90", "Clr_p90", "Blocks_stats_defense_p90"],
            SubRole::FullBack => &["Tkl_p90", "Crs_p90", "Succ_p90", "PrgP_p90"],
            SubRole::DefensiveMid => &["Tkl_p90", "Int_p90", "Cmp_p90", "PrgP_p90"],
            SubRole::CentralMid => &["Cmp_p90", "PrgP_p90", "SCA90", "KP_p90"],
            SubRole::AttackingMid => &["SCA90", "GCA90", "Ast_p90", "xAG_p90"],
            SubRole::Winger => &["Succ_p90", "Crs_p90", "SCA90", "PrgC_p90"],
            SubRole::Striker => &["Gls_p90", "xG_p90", "Sh_p90", "SoT_p90"],
            SubRole::Goalkeeper => &["Save%", "CS%", "GA90", "PSxG"],
        }
    }

    /// Effective feature list: declared features that exist as table columns.
    pub fn resolve_features(self, columns: &[String]) -> Vec<String> {
        self.declared_features()
            .into_iter()
            .filter(|feature| columns.iter().any(|c| c == feature))
            .map(str::to_string)
            .collect()
    }

    /// Display columns for a query: the declared set restricted to present columns.
    pub fn resolve_display(self, features: &[String], columns: &[String]) -> Vec<String> {
        resolve_display_columns(Some(self.declared_display()), features, columns)
    }
}

impl fmt::Display for SubRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

const DISPLAY_LIMIT: usize = 4;

/// Up to four display columns, taken from `declared` or else from the head of
/// `features`, keeping only those present in `columns`.
pub fn resolve_display_columns(
    declared: Option<&[&str]>,
    features: &[String],
    columns: &[String],
) -> Vec<String> {
    let wanted: Vec<&str> = match declared {
        Some(cols) => cols.iter().copied().take(DISPLAY_LIMIT).collect(),
        None => features
            .iter()
            .map(String::as_str)
            .take(DISPLAY_LIMIT)
            .collect(),
    };
    wanted
        .into_iter()
        .filter(|w| columns.iter().any(|c| c == w))
        .map(str::to_string)
        .collect()
}

/// Named base groups the per-role feature vectors are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureGroup {
    DefCommon,
    MidScoring,
    MidPassing,
    MidCreating,
    FwdCommon,
    FwdPassing,
    FwdCreating,
    GkCommon,
}

impl FeatureGroup {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            FeatureGroup::DefCommon => &[
                "Ast_p90",
                "KP_p90",
                "xAG_p90",
                "SCA90",
                "GCA90",
                "Gls_p90",
                "Tkl_p90",
                "TklW_p90",
                "Int_p90",
                "Blocks_stats_defense_p90",
                "Clr_p90",
            ],
            FeatureGroup::MidScoring => &["Gls_p90", "xG_p90", "Sh_p90", "SoT_p90"],
            FeatureGroup::MidPassing => &["PrgP_p90", "Touches_p90", "1/3_p90", "PPA_p90", "Cmp_p90"],
            FeatureGroup::MidCreating => &["Ast_p90", "KP_p90", "xAG_p90", "SCA90", "GCA90"],
            FeatureGroup::FwdCommon => &[
                "Ast_p90",
                "KP_p90",
                "xAG_p90",
                "SCA90",
                "GCA90",
                "Gls_p90",
                "Succ_p90",
                "Att_stats_possession_p90",
                "PrgP_p90",
                "PrgC_p90",
                "PPA_p90",
                "PrgR_p90",
            ],
            FeatureGroup::FwdPassing => &["Crs_p90", "Succ_p90", "Att_stats_possession_p90", "PrgC_p90"],
            FeatureGroup::FwdCreating => &[
                "Ast_p90", "xAG_p90", "KP_p90", "SCA90", "GCA90", "PPA_p90", "TB_p90",
            ],
            FeatureGroup::GkCommon => &["GA90", "Save%", "CS%", "Saves", "SoTA"],
        }
    }
}

const FULL_BACK_EXTRAS: &[&str] = &["Crs_p90", "PrgP_p90", "Succ_p90"];

/// Every numeric column the taxonomy may read for a table.
pub fn referenced_columns(table: PositionTable) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for role in SubRole::ALL.into_iter().filter(|r| r.table() == table) {
        let display = role.declared_display();
        for column in role.declared_features().into_iter().chain(display.iter().copied()) {
            if !out.contains(&column) {
                out.push(column);
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy)]
enum Marker {
    Contains(&'static str),
    Exact(&'static str),
}

impl Marker {
    fn matches(self, upper: &str) -> bool {
        match self {
            Marker::Contains(needle) => upper.contains(needle),
            Marker::Exact(code) => upper == code,
        }
    }
}

struct ClassifyRule {
    markers: &'static [Marker],
    role: SubRole,
}

/// Evaluated top to bottom, first match wins. `CM` must stay below `CDM` and
/// `CAM`, both of which contain it.
const CLASSIFY_RULES: &[ClassifyRule] = &[
    ClassifyRule {
        markers: &[Marker::Contains("CENTER"), Marker::Contains("CB")],
        role: SubRole::CenterBack,
    },
    ClassifyRule {
        markers: &[
            Marker::Contains("FULL"),
            Marker::Exact("LB"),
            Marker::Exact("RB"),
            Marker::Exact("LEFT BACK"),
            Marker::Exact("RIGHT BACK"),
            Marker::Exact("FULL BACK"),
        ],
        role: SubRole::FullBack,
    },
    ClassifyRule {
        markers: &[Marker::Contains("CDM")],
        role: SubRole::DefensiveMid,
    },
    ClassifyRule {
        markers: &[Marker::Contains("CAM")],
        role: SubRole::AttackingMid,
    },
    ClassifyRule {
        markers: &[Marker::Contains("CM")],
        role: SubRole::CentralMid,
    },
    ClassifyRule {
        markers: &[Marker::Contains("STRIKER"), Marker::Contains("ST")],
        role: SubRole::Striker,
    },
    ClassifyRule {
        markers: &[Marker::Contains("WINGER"), Marker::Exact("LW"), Marker::Exact("RW")],
        role: SubRole::Winger,
    },
];

/// Map a raw positional label to its outfield sub-role.
///
/// Matching is case-insensitive and keyword based; `None` means the player is
/// left out of every role-scoped query. Goalkeepers never go through here.
pub fn classify(raw: Option<&str>) -> Option<SubRole> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }
    let upper = raw.to_uppercase();
    CLASSIFY_RULES
        .iter()
        .find(|rule| rule.markers.iter().any(|m| m.matches(&upper)))
        .map(|rule| rule.role)
}

/// Sub-role for a row of `table`.
pub fn sub_role_for(table: PositionTable, label: Option<&str>) -> Option<SubRole> {
    if table.has_positional_label() {
        classify(label)
    } else {
        Some(SubRole::Goalkeeper)
    }
}

/// Drop the per-90 marker from a stat name for display.
pub fn strip_per90(name: &str) -> String {
    name.replace("_p90", "")
}
