use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

use crate::campsite::AvailableCampsite;
use crate::criteria::Criteria;

/// Filter raw availability records down to the stays matching `criteria`.
///
/// Records are searched per group: one group per site label when
/// `criteria.require_same_site` is set (a stay may not switch sites across
/// nights), otherwise the whole input is a single group (a stay may hop
/// between sites). A candidate start date passes only if every one of the
/// `criteria.nights` consecutive nights has at least one qualifying record
/// in the group; all qualifying records of every night are collected, not
/// just one per night, so every alternative site is surfaced. Partial
/// stays are never reported.
///
/// Ignored site labels are dropped at night-collection time: an ignored
/// site can still define a candidate date, but never satisfies a night.
/// Absence of matches is an empty set, never an error.
pub fn filter_to_criteria(
    all_available: &[AvailableCampsite],
    criteria: &Criteria,
) -> HashSet<AvailableCampsite> {
    let mut groups: BTreeMap<&str, Vec<&AvailableCampsite>> = BTreeMap::new();
    if criteria.require_same_site {
        for record in all_available {
            groups
                .entry(record.campsite.campsite.as_str())
                .or_default()
                .push(record);
        }
    } else {
        groups.insert("All", all_available.iter().collect());
    }

    let mut passes_criteria: HashSet<AvailableCampsite> = HashSet::new();

    for (label, mut group) in groups {
        group.sort_by_key(|record| record.date);
        if !criteria.sub_campgrounds.is_empty() {
            group.retain(|record| {
                criteria
                    .sub_campgrounds
                    .contains(&record.campsite.campground)
            });
        }

        let mut by_date: HashMap<NaiveDate, Vec<&AvailableCampsite>> = HashMap::new();
        for record in &group {
            by_date.entry(record.date).or_default().push(*record);
        }

        // Candidate start dates: distinct dates present in the group,
        // restricted to explicit calendar dates when given, else to the
        // allowed start weekdays.
        let mut candidates: Vec<NaiveDate> = group.iter().map(|record| record.date).collect();
        candidates.dedup();
        if criteria.calendar_dates.is_empty() {
            candidates.retain(|date| criteria.weekdays.contains(&date.weekday()));
        } else {
            candidates.retain(|date| criteria.calendar_dates.contains(date));
        }

        for start in candidates {
            let mut stay: Vec<&AvailableCampsite> = Vec::new();
            let mut all_nights_available = true;

            for night in 0..criteria.nights {
                let date = start + Days::new(u64::from(night));
                let night_availability: Vec<&AvailableCampsite> = by_date
                    .get(&date)
                    .map(|records| {
                        records
                            .iter()
                            .copied()
                            .filter(|record| !criteria.ignore.contains(&record.campsite.campsite))
                            .collect()
                    })
                    .unwrap_or_default();

                if night_availability.is_empty() {
                    all_nights_available = false;
                    break;
                }
                stay.extend(night_availability);
            }

            if all_nights_available {
                debug!(
                    group = label,
                    start = %start,
                    records = stay.len(),
                    "candidate start date passes"
                );
                passes_criteria.extend(stay.into_iter().cloned());
            }
        }
    }

    passes_criteria
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campsite::Campsite;
    use chrono::Weekday;

    // July 2024: the 1st is a Monday, the 4th a Thursday.
    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    fn record(campground: &str, site: &str, day: u32) -> AvailableCampsite {
        AvailableCampsite::new(date(day), Campsite::new(campground, site))
    }

    /// Site A12 available on days 1-2 only, site B3 on days 1-3.
    fn two_site_fixture() -> Vec<AvailableCampsite> {
        vec![
            record("Hawk Campground", "A12", 1),
            record("Hawk Campground", "A12", 2),
            record("Hawk Campground", "B3", 1),
            record("Hawk Campground", "B3", 2),
            record("Hawk Campground", "B3", 3),
        ]
    }

    fn criteria(nights: u32, require_same_site: bool) -> Criteria {
        Criteria {
            nights,
            require_same_site,
            ..Criteria::default()
        }
    }

    #[test]
    fn three_nights_same_site_keeps_only_the_full_run() {
        let result = filter_to_criteria(&two_site_fixture(), &criteria(3, true));

        let expected: HashSet<AvailableCampsite> = [
            record("Hawk Campground", "B3", 1),
            record("Hawk Campground", "B3", 2),
            record("Hawk Campground", "B3", 3),
        ]
        .into_iter()
        .collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn three_nights_site_hopping_collects_every_alternative() {
        // One group: day 1 starts a 3-night run (B3 covers night 3), and
        // every qualifying record of every night is collected, A12's
        // partial coverage included.
        let result = filter_to_criteria(&two_site_fixture(), &criteria(3, false));

        let expected: HashSet<AvailableCampsite> = two_site_fixture().into_iter().collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn ignored_site_fails_the_night_it_alone_covered() {
        let mut criteria = criteria(3, false);
        criteria.ignore.insert("B3".to_string());

        // B3 is dropped from night checks, so day 3 has no coverage and
        // every candidate fails.
        let result = filter_to_criteria(&two_site_fixture(), &criteria);
        assert!(result.is_empty());
    }

    #[test]
    fn ignored_site_never_appears_even_when_others_qualify() {
        let mut criteria = criteria(1, false);
        criteria.ignore.insert("B3".to_string());

        let result = filter_to_criteria(&two_site_fixture(), &criteria);
        let expected: HashSet<AvailableCampsite> = [
            record("Hawk Campground", "A12", 1),
            record("Hawk Campground", "A12", 2),
        ]
        .into_iter()
        .collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn one_night_equals_weekday_filter_minus_exclusions() {
        let mut criteria = criteria(1, false);
        criteria.weekdays = [Weekday::Mon, Weekday::Wed].into_iter().collect();

        // Day 1 is a Monday, day 3 a Wednesday; day 2 (Tuesday) is excluded.
        let result = filter_to_criteria(&two_site_fixture(), &criteria);
        let expected: HashSet<AvailableCampsite> = [
            record("Hawk Campground", "A12", 1),
            record("Hawk Campground", "B3", 1),
            record("Hawk Campground", "B3", 3),
        ]
        .into_iter()
        .collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn calendar_dates_silence_the_weekday_filter() {
        let mut criteria = criteria(1, false);
        // Thursday is not an allowed weekday, but the explicit date wins.
        criteria.weekdays = [Weekday::Mon].into_iter().collect();
        criteria.calendar_dates.insert(date(4));

        let input = vec![
            record("Hawk Campground", "A12", 1),
            record("Hawk Campground", "A12", 4),
        ];
        let result = filter_to_criteria(&input, &criteria);
        let expected: HashSet<AvailableCampsite> =
            [record("Hawk Campground", "A12", 4)].into_iter().collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn sub_campground_restricts_before_candidate_discovery() {
        let mut criteria = criteria(1, false);
        criteria.sub_campgrounds.insert("Upper Loop".to_string());

        let input = vec![
            record("Upper Loop", "001", 1),
            record("Lower Loop", "002", 1),
            record("Lower Loop", "002", 2),
        ];
        let result = filter_to_criteria(&input, &criteria);
        let expected: HashSet<AvailableCampsite> =
            [record("Upper Loop", "001", 1)].into_iter().collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn same_site_groups_pass_independently() {
        let input = vec![
            record("Hawk Campground", "A12", 1),
            record("Hawk Campground", "A12", 2),
            record("Hawk Campground", "B3", 1),
            record("Hawk Campground", "B3", 2),
        ];
        let result = filter_to_criteria(&input, &criteria(2, true));
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn same_site_never_mixes_labels_within_a_stay() {
        // A12 covers night 1, B3 covers night 2; neither site covers both,
        // so a same-site 2-night stay must not be assembled across them.
        let input = vec![
            record("Hawk Campground", "A12", 1),
            record("Hawk Campground", "B3", 2),
        ];
        let result = filter_to_criteria(&input, &criteria(2, true));
        assert!(result.is_empty());

        // Site-hopping mode accepts exactly that stay.
        let result = filter_to_criteria(&input, &criteria(2, false));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn duplicate_input_records_are_deduplicated() {
        let mut input = two_site_fixture();
        input.extend(two_site_fixture());

        let result = filter_to_criteria(&input, &criteria(1, false));
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn empty_input_is_an_empty_result() {
        let result = filter_to_criteria(&[], &criteria(3, true));
        assert!(result.is_empty());
    }

    #[test]
    fn filtering_is_deterministic_and_idempotent() {
        let criteria = criteria(2, false);
        let first = filter_to_criteria(&two_site_fixture(), &criteria);
        let second = filter_to_criteria(&two_site_fixture(), &criteria);
        assert_eq!(first, second);

        let refiltered: Vec<AvailableCampsite> = first.iter().cloned().collect();
        let refiltered = filter_to_criteria(&refiltered, &criteria);
        assert_eq!(first, refiltered);
    }
}
