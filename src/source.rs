use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use crate::error::LoadError;
use crate::roles::PositionTable;

/// A table as read from its source: header names plus string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_csv_reader<R: Read>(table: PositionTable, reader: R) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|source| LoadError::Csv { table, source })?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| LoadError::Csv { table, source })?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }
}

/// Reader for the four positional tables, addressed by logical name.
pub trait TableSource: Send + Sync {
    fn read_table(&self, table: PositionTable) -> Result<RawTable, LoadError>;
}

/// Reads `Defenders.csv`, `Midfielders.csv`, `Forwards.csv` and
/// `Goalkeepers.csv` from one directory.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, table: PositionTable) -> PathBuf {
        self.dir.join(format!("{}.csv", table.name()))
    }
}

impl TableSource for CsvDirSource {
    fn read_table(&self, table: PositionTable) -> Result<RawTable, LoadError> {
        let path = self.path_for(table);
        let file = File::open(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        RawTable::from_csv_reader(table, file)
    }
}

/// Tables held in memory, for callers that already have the data.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<PositionTable, RawTable>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: PositionTable, raw: RawTable) -> Self {
        self.tables.insert(table, raw);
        self
    }
}

impl TableSource for MemorySource {
    fn read_table(&self, table: PositionTable) -> Result<RawTable, LoadError> {
        self.tables
            .get(&table)
            .cloned()
            .ok_or(LoadError::MissingTable(table))
    }
}
