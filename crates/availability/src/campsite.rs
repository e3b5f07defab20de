use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A physical, reservable campsite within a campground.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Campsite {
    /// Campground (park or sub-area) the site belongs to
    pub campground: String,

    /// Site label or number as shown by the reservation system
    pub campsite: String,
}

impl Campsite {
    /// Create a campsite from a campground name and a site label.
    pub fn new(campground: impl Into<String>, campsite: impl Into<String>) -> Self {
        Self {
            campground: campground.into(),
            campsite: campsite.into(),
        }
    }
}

/// One bookable night at a campsite.
///
/// Identity covers the date and both campsite fields: two sites sharing a
/// label in different campgrounds are distinct availabilities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvailableCampsite {
    /// Calendar date of the bookable night
    pub date: NaiveDate,

    /// The campsite available on that date
    pub campsite: Campsite,
}

impl AvailableCampsite {
    /// Create an availability record for a campsite on a date.
    pub fn new(date: NaiveDate, campsite: Campsite) -> Self {
        Self { date, campsite }
    }
}
