use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::InvalidArgument;

/// Field expenses are ordered by when the caller does not say otherwise.
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(InvalidArgument::new(format!(
                "unknown sort direction '{other}', expected 'asc' or 'desc'"
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved ordering. The field is passed through to the store as-is;
/// whether it names something sortable is the store's call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.field, self.direction)
    }
}

/// Turn an optional `"field"` / `"field,direction"` directive into a [`Sort`].
///
/// With no directive the defaults are returned untouched. A bare field always
/// sorts ascending, whatever the default direction is.
pub fn resolve_sort(
    spec: Option<&str>,
    default_field: &str,
    default_direction: SortDirection,
) -> Result<Sort, InvalidArgument> {
    let Some(spec) = spec else {
        return Ok(Sort::new(default_field, default_direction));
    };

    let parts: Vec<&str> = spec.split(',').collect();
    match parts.as_slice() {
        [field, direction] => Ok(Sort::new(field.trim(), direction.parse()?)),
        _ => Ok(Sort::new(spec.trim(), SortDirection::Asc)),
    }
}
