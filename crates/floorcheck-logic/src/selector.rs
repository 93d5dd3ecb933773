//! Day selection: a concrete event day or the "all days" view.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Selector string for the merged all-days view.
pub const ALL_DAYS: &str = "all";

/// Schedule key used when a room has no entry for a specific day.
pub const DEFAULT_ENTRY: &str = "default";

/// Which day the checklist is being viewed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DaySelector {
    /// Every event day merged into one view.
    All,
    /// A single event day, by id (e.g. `"2/10"`).
    Day(String),
}

impl DaySelector {
    pub fn parse(s: &str) -> Self {
        if s == ALL_DAYS {
            DaySelector::All
        } else {
            DaySelector::Day(s.to_string())
        }
    }

    pub fn day(id: impl Into<String>) -> Self {
        DaySelector::Day(id.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            DaySelector::All => ALL_DAYS,
            DaySelector::Day(id) => id,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, DaySelector::All)
    }

    /// The concrete day id, if this is not the all-days view.
    pub fn day_id(&self) -> Option<&str> {
        match self {
            DaySelector::All => None,
            DaySelector::Day(id) => Some(id),
        }
    }
}

impl From<String> for DaySelector {
    fn from(s: String) -> Self {
        if s == ALL_DAYS {
            DaySelector::All
        } else {
            DaySelector::Day(s)
        }
    }
}

impl From<&str> for DaySelector {
    fn from(s: &str) -> Self {
        DaySelector::parse(s)
    }
}

impl From<DaySelector> for String {
    fn from(sel: DaySelector) -> Self {
        match sel {
            DaySelector::All => ALL_DAYS.to_string(),
            DaySelector::Day(id) => id,
        }
    }
}

impl fmt::Display for DaySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
