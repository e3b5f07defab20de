use std::collections::HashSet;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::campsite::AvailableCampsite;

/// One display row of an availability table.
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct AvailabilityRow {
    /// Campground or sub-area name
    pub campground: String,

    /// Site label
    pub campsite: String,

    /// Date formatted as mm/dd/yy
    pub date: String,

    /// Full weekday name
    pub weekday: String,
}

/// Sort a match set into display rows, ordered by date then site label.
pub fn table_rows(available: &HashSet<AvailableCampsite>) -> Vec<AvailabilityRow> {
    let mut sorted: Vec<&AvailableCampsite> = available.iter().collect();
    sorted.sort_by(|a, b| {
        (a.date, &a.campsite.campsite).cmp(&(b.date, &b.campsite.campsite))
    });

    sorted
        .into_iter()
        .map(|record| AvailabilityRow {
            campground: record.campsite.campground.clone(),
            campsite: record.campsite.campsite.clone(),
            date: record.date.format("%m/%d/%y").to_string(),
            weekday: record.date.format("%A").to_string(),
        })
        .collect()
}

/// Render rows as a plain text grid, one line per row plus a header line.
pub fn render_table(rows: &[AvailabilityRow]) -> String {
    Table::new(rows).with(Style::blank()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campsite::Campsite;
    use chrono::NaiveDate;

    fn record(campground: &str, site: &str, day: u32) -> AvailableCampsite {
        AvailableCampsite::new(
            NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
            Campsite::new(campground, site),
        )
    }

    #[test]
    fn rows_are_sorted_by_date_then_site() {
        let available: HashSet<AvailableCampsite> = [
            record("Hawk Campground", "B3", 2),
            record("Hawk Campground", "A12", 2),
            record("Hawk Campground", "B3", 1),
        ]
        .into_iter()
        .collect();

        let rows = table_rows(&available);
        let order: Vec<(&str, &str)> = rows
            .iter()
            .map(|row| (row.campsite.as_str(), row.date.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![("B3", "07/01/24"), ("A12", "07/02/24"), ("B3", "07/02/24")]
        );
        assert_eq!(rows[0].weekday, "Monday");
    }

    #[test]
    fn rendered_row_count_matches_the_match_set() {
        let available: HashSet<AvailableCampsite> = [
            record("Hawk Campground", "A12", 1),
            record("Hawk Campground", "B3", 1),
            record("Hawk Campground", "B3", 2),
        ]
        .into_iter()
        .collect();

        let rows = table_rows(&available);
        let rendered = render_table(&rows);

        // One header line plus one line per record.
        assert_eq!(rendered.lines().count(), available.len() + 1);
    }
}
