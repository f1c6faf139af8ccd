use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::roles::{PositionTable, SubRole};

/// A failed dataset load. The store stays unloaded and the next trigger retries.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {table} table: {source}")]
    Csv {
        table: PositionTable,
        #[source]
        source: csv::Error,
    },

    #[error("no source for the {0} table")]
    MissingTable(PositionTable),

    #[error("{table} table is missing required column `{column}`")]
    MissingColumn {
        table: PositionTable,
        column: String,
    },

    #[error("{table} table row {row}: column `{column}` holds non-numeric value `{value}`")]
    InvalidNumber {
        table: PositionTable,
        row: usize,
        column: String,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("missing club_name")]
    MissingClub,

    #[error("missing subrole")]
    MissingSubRole,

    #[error("top_k must be a positive integer, got `{0}`")]
    InvalidTopK(String),

    #[error("invalid subrole `{0}`")]
    UnknownSubRole(String),

    #[error("no players found for {club} in role {role}")]
    NoReferencePlayers { club: String, role: SubRole },

    #[error("no feature columns available for role {0}")]
    NoFeatures(SubRole),

    #[error("dataset unavailable: {0}")]
    Load(#[from] LoadError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingClub,
    MissingSubRole,
    InvalidTopK,
    UnknownSubRole,
    NoReferencePlayers,
    NoFeatures,
    DatasetUnavailable,
}

/// Coarse outcome class an outer request layer maps onto its own statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    BadRequest,
    NotFound,
    Unavailable,
}

impl ErrorKind {
    pub fn class(self) -> ErrorClass {
        match self {
            ErrorKind::MissingClub | ErrorKind::MissingSubRole | ErrorKind::InvalidTopK => {
                ErrorClass::BadRequest
            }
            ErrorKind::UnknownSubRole | ErrorKind::NoReferencePlayers | ErrorKind::NoFeatures => {
                ErrorClass::NotFound
            }
            ErrorKind::DatasetUnavailable => ErrorClass::Unavailable,
        }
    }
}

impl ErrorClass {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorClass::BadRequest => 400,
            ErrorClass::NotFound => 404,
            ErrorClass::Unavailable => 503,
        }
    }
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::MissingClub => ErrorKind::MissingClub,
            QueryError::MissingSubRole => ErrorKind::MissingSubRole,
            QueryError::InvalidTopK(_) => ErrorKind::InvalidTopK,
            QueryError::UnknownSubRole(_) => ErrorKind::UnknownSubRole,
            QueryError::NoReferencePlayers { .. } => ErrorKind::NoReferencePlayers,
            QueryError::NoFeatures(_) => ErrorKind::NoFeatures,
            QueryError::Load(_) => ErrorKind::DatasetUnavailable,
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.to_string(),
            kind: self.kind(),
            class: self.kind().class(),
        }
    }
}

/// Caller-facing failure: a readable reason plus a kind to branch on.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    pub kind: ErrorKind,
    pub class: ErrorClass,
}
