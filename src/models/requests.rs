use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::entities::TIMESTAMP_FIELD;
use crate::error::{AppError, AppResult};

static FIELD_PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+(\.[A-Za-z0-9_]+)*$").unwrap());

/// Field paths are spliced into `json_extract` paths, so only plain segments pass.
pub fn is_valid_field_path(path: &str) -> bool {
    FIELD_PATH_REGEX.is_match(path)
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Pagination and ordering for a `find`. The default orders newest first by `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindOptions {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort: Vec<SortKey>,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            limit: None,
            offset: None,
            sort: vec![SortKey::new(TIMESTAMP_FIELD, SortDirection::Desc)],
        }
    }
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Replace the sort order with a single key.
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = vec![SortKey::new(field, direction)];
        self
    }

    /// Append a secondary sort key.
    pub fn then_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push(SortKey::new(field, direction));
        self
    }

    pub fn unsorted(mut self) -> Self {
        self.sort.clear();
        self
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.limit.is_some_and(|l| l < 0) {
            return Err(AppError::invalid_options("limit must not be negative"));
        }
        if self.offset.is_some_and(|o| o < 0) {
            return Err(AppError::invalid_options("offset must not be negative"));
        }
        if let Some(key) = self.sort.iter().find(|k| !is_valid_field_path(&k.field)) {
            return Err(AppError::invalid_options(format!(
                "invalid sort field '{}'",
                key.field
            )));
        }
        Ok(())
    }
}
