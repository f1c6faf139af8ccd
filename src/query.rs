use std::num::NonZeroUsize;

use crate::error::QueryError;
use crate::roles::SubRole;

pub const DEFAULT_TOP_K: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(v) => v,
    None => unreachable!(),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationQuery {
    pub club: String,
    pub role: SubRole,
    pub top_k: NonZeroUsize,
}

impl RecommendationQuery {
    pub fn new(club: impl Into<String>, role: SubRole, top_k: NonZeroUsize) -> Self {
        Self {
            club: club.into(),
            role,
            top_k,
        }
    }

    /// Validate raw request parameters. Missing club / role and a malformed
    /// `top_k` are caller errors; an unrecognised role code is reported as
    /// not found. `top_k` defaults to `default_top_k` when absent.
    pub fn parse(
        club: Option<&str>,
        role: Option<&str>,
        top_k: Option<&str>,
        default_top_k: NonZeroUsize,
    ) -> Result<Self, QueryError> {
        let club = club.filter(|c| !c.is_empty()).ok_or(QueryError::MissingClub)?;
        let role = role.filter(|r| !r.is_empty()).ok_or(QueryError::MissingSubRole)?;
        let top_k = match top_k {
            Some(raw) => parse_top_k(raw)?,
            None => default_top_k,
        };
        let role = SubRole::from_code(role).ok_or_else(|| QueryError::UnknownSubRole(role.to_string()))?;
        Ok(Self::new(club, role, top_k))
    }
}

pub fn parse_top_k(raw: &str) -> Result<NonZeroUsize, QueryError> {
    raw.trim()
        .parse::<NonZeroUsize>()
        .map_err(|_| QueryError::InvalidTopK(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn kind(result: Result<RecommendationQuery, QueryError>) -> ErrorKind {
        result.unwrap_err().kind()
    }

    #[test]
    fn parses_full_query() {
        let q = RecommendationQuery::parse(Some("Arsenal"), Some("WINGER"), Some("4"), DEFAULT_TOP_K)
            .unwrap();
        assert_eq!(q.club, "Arsenal");
        assert_eq!(q.role, SubRole::Winger);
        assert_eq!(q.top_k.get(), 4);
    }

    #[test]
    fn top_k_defaults_to_ten() {
        let q = RecommendationQuery::parse(Some("Arsenal"), Some("CB"), None, DEFAULT_TOP_K).unwrap();
        assert_eq!(q.top_k.get(), 10);
    }

    #[test]
    fn missing_parameters_are_bad_requests() {
        assert_eq!(
            kind(RecommendationQuery::parse(None, Some("CB"), None, DEFAULT_TOP_K)),
            ErrorKind::MissingClub
        );
        assert_eq!(
            kind(RecommendationQuery::parse(Some(""), Some("CB"), None, DEFAULT_TOP_K)),
            ErrorKind::MissingClub
        );
        assert_eq!(
            kind(RecommendationQuery::parse(Some("Arsenal"), None, None, DEFAULT_TOP_K)),
            ErrorKind::MissingSubRole
        );
    }

    #[test]
    fn top_k_must_be_positive_integer() {
        for raw in ["0", "-3", "ten", "2.5", ""] {
            assert_eq!(
                kind(RecommendationQuery::parse(Some("A"), Some("CB"), Some(raw), DEFAULT_TOP_K)),
                ErrorKind::InvalidTopK,
                "{raw}"
            );
        }
    }

    #[test]
    fn role_codes_are_case_sensitive() {
        assert_eq!(
            kind(RecommendationQuery::parse(Some("Arsenal"), Some("XYZ"), None, DEFAULT_TOP_K)),
            ErrorKind::UnknownSubRole
        );
        assert_eq!(
            kind(RecommendationQuery::parse(Some("Arsenal"), Some("cb"), None, DEFAULT_TOP_K)),
            ErrorKind::UnknownSubRole
        );
    }
}
