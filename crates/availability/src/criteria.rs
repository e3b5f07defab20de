use std::collections::HashSet;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Every weekday, the default for [`Criteria::weekdays`].
pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Criteria a set of availability records is filtered against.
///
/// `nights` must be at least 1; rejecting smaller values is a configuration
/// error handled by the caller before filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criteria {
    /// Weekdays a stay may start on (unused when `calendar_dates` is non-empty)
    pub weekdays: HashSet<Weekday>,

    /// Number of consecutive nights required
    pub nights: u32,

    /// Whether all nights must be spent at the same physical site
    pub require_same_site: bool,

    /// Site labels excluded from the night-by-night availability check
    pub ignore: HashSet<String>,

    /// Explicit start dates; when non-empty the weekday filter is silenced
    pub calendar_dates: HashSet<NaiveDate>,

    /// Restrict the search to these sub-campgrounds when non-empty
    pub sub_campgrounds: HashSet<String>,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            weekdays: ALL_WEEKDAYS.into_iter().collect(),
            nights: 1,
            require_same_site: false,
            ignore: HashSet::new(),
            calendar_dates: HashSet::new(),
            sub_campgrounds: HashSet::new(),
        }
    }
}
