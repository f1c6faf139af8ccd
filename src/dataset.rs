use std::collections::{BTreeMap, BTreeSet, HashMap};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::roles::{self, PositionTable, SubRole};
use crate::source::{RawTable, TableSource};

pub const PLAYER_COL: &str = "Player";
pub const NATION_COL: &str = "Nation";
pub const SQUAD_COL: &str = "Squad";
pub const AGE_COL: &str = "Age";
pub const POSITION_COL: &str = "SpecificPos";
/// Cumulative 90-minute units played; the ranking's minutes evidence.
pub const NINETIES_COL: &str = "90s";

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub name: String,
    pub nation: Option<String>,
    pub squad: Option<String>,
    pub age: Option<u32>,
    pub position: Option<String>,
    pub sub_role: Option<SubRole>,
    /// Numeric cells by column name; missing cells are absent.
    pub stats: HashMap<String, f64>,
}

impl PlayerRecord {
    pub fn stat(&self, column: &str) -> Option<f64> {
        self.stats.get(column).copied()
    }

    pub fn plays_for(&self, club: &str) -> bool {
        self.squad.as_deref() == Some(club)
    }
}

#[derive(Debug, Clone)]
pub struct PlayerTable {
    pub kind: PositionTable,
    pub columns: Vec<String>,
    pub players: Vec<PlayerRecord>,
}

impl PlayerTable {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn players_in(&self, role: SubRole) -> impl Iterator<Item = &PlayerRecord> + '_ {
        self.players.iter().filter(move |p| p.sub_role == Some(role))
    }

    fn from_raw(kind: PositionTable, raw: RawTable) -> Result<Self, LoadError> {
        let RawTable { headers, rows } = raw;

        let mut index: HashMap<&str, usize> = HashMap::with_capacity(headers.len());
        for (idx, name) in headers.iter().enumerate() {
            if index.contains_key(name.as_str()) {
                debug!(table = %kind, column = %name, "duplicate column ignored");
                continue;
            }
            index.insert(name.as_str(), idx);
        }

        let mut required = vec![PLAYER_COL, SQUAD_COL, AGE_COL];
        if kind.has_positional_label() {
            required.push(POSITION_COL);
        }
        for column in required {
            if !index.contains_key(column) {
                return Err(LoadError::MissingColumn {
                    table: kind,
                    column: column.to_string(),
                });
            }
        }

        let mut strict = roles::referenced_columns(kind);
        strict.push(NINETIES_COL);
        let identity = [PLAYER_COL, NATION_COL, SQUAD_COL, AGE_COL, POSITION_COL];

        let mut players = Vec::with_capacity(rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            let cell = |column: &str| -> Option<&str> {
                index
                    .get(column)
                    .and_then(|&i| row.get(i))
                    .map(String::as_str)
                    .filter(|v| !is_missing(v))
            };

            let mut stats = HashMap::new();
            for (col_idx, column) in headers.iter().enumerate() {
                let column = column.as_str();
                if index.get(column) != Some(&col_idx) || identity.iter().any(|&c| c == column) {
                    continue;
                }
                let Some(value) = row.get(col_idx).filter(|v| !is_missing(v)) else {
                    continue;
                };
                match parse_number(value) {
                    Some(v) => {
                        stats.insert(column.to_string(), v);
                    }
                    None if strict.iter().any(|&c| c == column) => {
                        return Err(LoadError::InvalidNumber {
                            table: kind,
                            row: row_idx + 1,
                            column: column.to_string(),
                            value: value.clone(),
                        });
                    }
                    None => {}
                }
            }

            let position = cell(POSITION_COL).map(str::to_string);
            players.push(PlayerRecord {
                name: cell(PLAYER_COL).unwrap_or_default().to_string(),
                nation: cell(NATION_COL).map(str::to_string),
                squad: cell(SQUAD_COL).map(str::to_string),
                age: cell(AGE_COL).and_then(parse_age),
                sub_role: roles::sub_role_for(kind, position.as_deref()),
                position,
                stats,
            });
        }

        Ok(Self {
            kind,
            columns: headers,
            players,
        })
    }
}

/// The table and effective feature list a sub-role is scored over.
#[derive(Debug, Clone, Copy)]
pub struct RoleView<'a> {
    pub role: SubRole,
    pub table: &'a PlayerTable,
    pub features: &'a [String],
}

impl RoleView<'_> {
    pub fn display_columns(&self) -> Vec<String> {
        self.role.resolve_display(self.features, &self.table.columns)
    }
}

/// The four positional tables plus the per-role feature map derived from them.
/// Built once per load and never mutated.
#[derive(Debug, Clone)]
pub struct Dataset {
    defenders: PlayerTable,
    midfielders: PlayerTable,
    forwards: PlayerTable,
    goalkeepers: PlayerTable,
    role_features: BTreeMap<SubRole, Vec<String>>,
}

impl Dataset {
    /// Read all four tables; any failure fails the whole load.
    pub fn load(source: &dyn TableSource) -> Result<Self, LoadError> {
        let raws = PositionTable::ALL
            .par_iter()
            .map(|&kind| source.read_table(kind).map(|raw| (kind, raw)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_raw_tables(raws)
    }

    pub fn from_raw_tables(
        raws: impl IntoIterator<Item = (PositionTable, RawTable)>,
    ) -> Result<Self, LoadError> {
        let mut by_kind: HashMap<PositionTable, PlayerTable> = HashMap::new();
        for (kind, raw) in raws {
            by_kind.insert(kind, PlayerTable::from_raw(kind, raw)?);
        }
        let mut take = |kind: PositionTable| by_kind.remove(&kind).ok_or(LoadError::MissingTable(kind));
        let defenders = take(PositionTable::Defenders)?;
        let midfielders = take(PositionTable::Midfielders)?;
        let forwards = take(PositionTable::Forwards)?;
        let goalkeepers = take(PositionTable::Goalkeepers)?;

        let mut dataset = Self {
            defenders,
            midfielders,
            forwards,
            goalkeepers,
            role_features: BTreeMap::new(),
        };
        let role_features = SubRole::ALL
            .into_iter()
            .map(|role| {
                let table = dataset.table(role.table());
                let features = role.resolve_features(&table.columns);
                let dropped = role.declared_features().len() - features.len();
                if dropped > 0 {
                    debug!(role = %role, dropped, "feature columns unavailable");
                }
                (role, features)
            })
            .collect();
        dataset.role_features = role_features;

        info!(
            defenders = dataset.defenders.players.len(),
            midfielders = dataset.midfielders.players.len(),
            forwards = dataset.forwards.players.len(),
            goalkeepers = dataset.goalkeepers.players.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn table(&self, kind: PositionTable) -> &PlayerTable {
        match kind {
            PositionTable::Defenders => &self.defenders,
            PositionTable::Midfielders => &self.midfielders,
            PositionTable::Forwards => &self.forwards,
            PositionTable::Goalkeepers => &self.goalkeepers,
        }
    }

    pub fn tables(&self) -> [&PlayerTable; 4] {
        [
            &self.defenders,
            &self.midfielders,
            &self.forwards,
            &self.goalkeepers,
        ]
    }

    pub fn role_features(&self) -> &BTreeMap<SubRole, Vec<String>> {
        &self.role_features
    }

    pub fn role_view(&self, role: SubRole) -> RoleView<'_> {
        RoleView {
            role,
            table: self.table(role.table()),
            features: self
                .role_features
                .get(&role)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        }
    }

    /// Lookup by canonical code; `None` for anything that is not one.
    pub fn records_for(&self, code: &str) -> Option<RoleView<'_>> {
        SubRole::from_code(code).map(|role| self.role_view(role))
    }

    /// Every squad name across the four tables, sorted and deduplicated.
    pub fn clubs(&self) -> Vec<String> {
        let clubs: BTreeSet<&str> = self
            .tables()
            .into_iter()
            .flat_map(|t| t.players.iter())
            .filter_map(|p| p.squad.as_deref())
            .collect();
        clubs.into_iter().map(str::to_string).collect()
    }
}

fn is_missing(raw: &str) -> bool {
    let s = raw.trim();
    s.is_empty() || s.eq_ignore_ascii_case("nan")
}

fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let cleaned = s.replace(',', "");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Accepts `27`, `27.0` and the years-days form `27-113`.
fn parse_age(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if let Some(v) = parse_number(s) {
        return (v >= 0.0).then(|| v.trunc() as u32);
    }
    let (years, _) = s.split_once('-')?;
    years.trim().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn minimal(kind: PositionTable) -> RawTable {
        if kind.has_positional_label() {
            raw(&["Player", "Squad", "Age", "SpecificPos"], &[])
        } else {
            raw(&["Player", "Squad", "Age"], &[])
        }
    }

    #[test]
    fn parse_number_handles_separators_and_junk() {
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number(" 0.25 "), Some(0.25));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn parse_age_accepts_years_days() {
        assert_eq!(parse_age("27"), Some(27));
        assert_eq!(parse_age("27.0"), Some(27));
        assert_eq!(parse_age("24-113"), Some(24));
        assert_eq!(parse_age("unknown"), None);
    }

    #[test]
    fn rows_get_sub_roles_and_numeric_stats() {
        let table = PlayerTable::from_raw(
            PositionTable::Defenders,
            raw(
                &["Player", "Nation", "Squad", "Age", "SpecificPos", "Tkl_p90", "Comp"],
                &[
                    &["Ben", "eng ENG", "Arsenal", "26-010", "CB", "2.1", "Premier League"],
                    &["Lu", "", "", "", "Sweeper", "", "Serie A"],
                ],
            ),
        )
        .unwrap();
        let ben = &table.players[0];
        assert_eq!(ben.sub_role, Some(SubRole::CenterBack));
        assert_eq!(ben.age, Some(26));
        assert_eq!(ben.stat("Tkl_p90"), Some(2.1));
        assert_eq!(ben.stat("Comp"), None);
        let lu = &table.players[1];
        assert_eq!(lu.sub_role, None);
        assert_eq!(lu.squad, None);
        assert_eq!(lu.nation, None);
        assert!(lu.stats.is_empty());
    }

    #[test]
    fn goalkeeper_table_needs_no_position() {
        let table = PlayerTable::from_raw(
            PositionTable::Goalkeepers,
            raw(&["Player", "Squad", "Age", "Save%"], &[&["Raya", "Arsenal", "29", "72.5"]]),
        )
        .unwrap();
        assert_eq!(table.players[0].sub_role, Some(SubRole::Goalkeeper));
    }

    #[test]
    fn missing_required_column_fails() {
        let err = PlayerTable::from_raw(
            PositionTable::Forwards,
            raw(&["Player", "Squad", "Age"], &[]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingColumn { ref column, .. } if column == POSITION_COL
        ));
    }

    #[test]
    fn text_in_feature_column_fails() {
        let err = PlayerTable::from_raw(
            PositionTable::Forwards,
            raw(
                &["Player", "Squad", "Age", "SpecificPos", "Gls_p90"],
                &[&["X", "Y", "20", "ST", "lots"]],
            ),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::InvalidNumber { row: 1, .. }));
    }

    #[test]
    fn first_bad_cell_in_column_order_is_reported() {
        for _ in 0..16 {
            let err = PlayerTable::from_raw(
                PositionTable::Forwards,
                raw(
                    &["Player", "Squad", "Age", "SpecificPos", "Gls_p90", "xG_p90", "Sh_p90", "SoT_p90"],
                    &[&["X", "Y", "20", "ST", "1.0", "lots", "many", "few"]],
                ),
            )
            .unwrap_err();
            assert!(matches!(
                err,
                LoadError::InvalidNumber { ref column, .. } if column == "xG_p90"
            ));
        }
    }

    #[test]
    fn duplicate_column_keeps_first_occurrence() {
        let table = PlayerTable::from_raw(
            PositionTable::Forwards,
            raw(
                &["Player", "Squad", "Age", "SpecificPos", "Gls_p90", "Gls_p90"],
                &[&["X", "Y", "20", "ST", "0.4", "junk"]],
            ),
        )
        .unwrap();
        assert_eq!(table.players[0].stat("Gls_p90"), Some(0.4));
    }

    #[test]
    fn feature_map_is_intersection_with_columns() {
        let defenders = raw(
            &["Player", "Squad", "Age", "SpecificPos", "Tkl_p90", "Crs_p90"],
            &[],
        );
        let dataset = Dataset::from_raw_tables([
            (PositionTable::Defenders, defenders),
            (PositionTable::Midfielders, minimal(PositionTable::Midfielders)),
            (PositionTable::Forwards, minimal(PositionTable::Forwards)),
            (PositionTable::Goalkeepers, minimal(PositionTable::Goalkeepers)),
        ])
        .unwrap();
        assert_eq!(dataset.role_features()[&SubRole::CenterBack], vec!["Tkl_p90"]);
        assert_eq!(
            dataset.role_features()[&SubRole::FullBack],
            vec!["Tkl_p90", "Crs_p90"]
        );
        assert!(dataset.role_features()[&SubRole::Striker].is_empty());
        assert!(dataset.records_for("XYZ").is_none());
        let view = dataset.records_for("FB").unwrap();
        assert_eq!(view.table.kind, PositionTable::Defenders);
    }

    #[test]
    fn missing_table_fails_whole_build() {
        let err = Dataset::from_raw_tables([
            (PositionTable::Defenders, minimal(PositionTable::Defenders)),
            (PositionTable::Midfielders, minimal(PositionTable::Midfielders)),
            (PositionTable::Forwards, minimal(PositionTable::Forwards)),
        ])
        .unwrap_err();
        assert!(matches!(err, LoadError::MissingTable(PositionTable::Goalkeepers)));
    }
}
