//! Usage accumulation.
//!
//! This module sums the days a person has consumed in one category for one
//! year across all of their trips, for both simple and split trips.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{Person, Snapshot, Trip};

use super::pass::LedgerPass;
use super::trip_days::{TripDays, allocation_contribution};

/// Returns the days a single trip charges to a category in a year.
///
/// Split trips charge through the allocation matching the category (one pinned
/// to the year first, then a year-agnostic one). Simple trips charge all of
/// their in-year days when their category matches. Cancelled trips charge
/// nothing.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::{TripDays, trip_usage};
/// use entitlement_engine::models::Trip;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
///
/// let mut trip = Trip::new(
///     "trip_001",
///     NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 3, 6).unwrap(),
/// );
/// trip.category_id = Some("annual".to_string());
///
/// let days = TripDays { by_year: BTreeMap::from([(2026, Decimal::new(5, 0))]) };
/// assert_eq!(trip_usage(&trip, "annual", 2026, &days), Decimal::new(5, 0));
/// assert_eq!(trip_usage(&trip, "sick", 2026, &days), Decimal::ZERO);
/// ```
pub fn trip_usage(trip: &Trip, category_id: &str, year: i32, days: &TripDays) -> Decimal {
    if !trip.is_chargeable() {
        return Decimal::ZERO;
    }
    if trip.is_split() {
        return trip
            .allocation_for(category_id, year)
            .map_or(Decimal::ZERO, |allocation| {
                allocation_contribution(allocation, days, year)
            });
    }
    if trip.category_id.as_deref() == Some(category_id) {
        days.in_year(year)
    } else {
        Decimal::ZERO
    }
}

/// Returns true if a trip can charge a category in a year at all.
///
/// Lets the accumulator skip weighing trips that cannot contribute.
fn may_charge(trip: &Trip, category_id: &str, year: i32) -> bool {
    if !trip.is_chargeable() {
        return false;
    }
    if trip.is_split() {
        trip.allocation_for(category_id, year).is_some()
    } else {
        trip.category_id.as_deref() == Some(category_id)
    }
}

impl LedgerPass<'_> {
    /// Returns the days the pass's person used in a category in a year.
    ///
    /// Results are memoized per (category, year) for the lifetime of the pass.
    pub fn usage(&mut self, category_id: &str, year: i32) -> Decimal {
        let key = (category_id.to_string(), year);
        if let Some(used) = self.usage_memo.get(&key) {
            return *used;
        }

        let snapshot = self.snapshot;
        let person_id = self.person.id.as_str();
        let mut used = Decimal::ZERO;
        let mut trips_counted = 0;

        for (index, trip) in snapshot.trips.iter().enumerate() {
            if !trip.has_participant(person_id) || !may_charge(trip, category_id, year) {
                continue;
            }
            let days = self.trip_days(index);
            let charged = trip_usage(trip, category_id, year, &days);
            if !charged.is_zero() {
                trips_counted += 1;
            }
            used = used.saturating_add(charged);
        }

        debug!(
            person_id = %person_id,
            category_id = %category_id,
            year,
            trips_counted,
            used = %used,
            "Accumulated usage"
        );

        self.usage_memo.insert(key, used);
        used
    }
}

/// Returns the days a person used in a category in a year.
///
/// Runs a fresh pass; use [`LedgerPass::usage`] to share work between queries
/// against the same snapshot.
pub fn accumulate_usage(
    snapshot: &Snapshot,
    person: &Person,
    category_id: &str,
    year: i32,
) -> Decimal {
    LedgerPass::new(snapshot, person, year).usage(category_id, year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Allocation, DurationMode, HolidayCalendar, HolidayEntry, TripStatus, WorkingDaySet,
    };
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn simple_trip(id: &str, start: &str, end: &str, category_id: &str) -> Trip {
        let mut trip = Trip::new(id, make_date(start), make_date(end));
        trip.participants = vec!["p1".to_string()];
        trip.category_id = Some(category_id.to_string());
        trip
    }

    fn split_trip(id: &str, start: &str, end: &str, allocations: Vec<Allocation>) -> Trip {
        let mut trip = Trip::new(id, make_date(start), make_date(end));
        trip.participants = vec!["p1".to_string()];
        trip.allocations = allocations;
        trip
    }

    fn allocation(category_id: &str, days: &str, target_year: Option<i32>) -> Allocation {
        Allocation {
            category_id: category_id.to_string(),
            days: dec(days),
            target_year,
        }
    }

    fn snapshot_with(trips: Vec<Trip>) -> (Snapshot, Person) {
        let mut person = Person::new("p1");
        person.holiday_config_ids = vec!["au-vic".to_string()];
        let snapshot = Snapshot {
            persons: vec![person.clone()],
            trips,
            calendars: vec![HolidayCalendar {
                id: "au-vic".to_string(),
                region: "VIC".to_string(),
                year: 2026,
                holidays: vec![HolidayEntry::new(make_date("2026-03-09"), "Labour Day")],
            }],
            working_days: WorkingDaySet::default(),
            ..Default::default()
        };
        (snapshot, person)
    }

    #[test]
    fn test_simple_trips_are_summed() {
        let (snapshot, person) = snapshot_with(vec![
            simple_trip("a", "2026-03-02", "2026-03-06", "annual"), // 5 days
            simple_trip("b", "2026-03-09", "2026-03-10", "annual"), // Labour Day + 1
            simple_trip("c", "2026-03-11", "2026-03-11", "sick"),
        ]);

        assert_eq!(accumulate_usage(&snapshot, &person, "annual", 2026), dec("6"));
        assert_eq!(accumulate_usage(&snapshot, &person, "sick", 2026), dec("1"));
    }

    #[test]
    fn test_cancelled_trips_are_ignored() {
        let mut cancelled = simple_trip("a", "2026-03-02", "2026-03-06", "annual");
        cancelled.status = TripStatus::Cancelled;
        let (snapshot, person) = snapshot_with(vec![cancelled]);

        assert_eq!(accumulate_usage(&snapshot, &person, "annual", 2026), dec("0"));
    }

    #[test]
    fn test_other_participants_trips_are_ignored() {
        let mut trip = simple_trip("a", "2026-03-02", "2026-03-06", "annual");
        trip.participants = vec!["p2".to_string()];
        let (snapshot, person) = snapshot_with(vec![trip]);

        assert_eq!(accumulate_usage(&snapshot, &person, "annual", 2026), dec("0"));
    }

    #[test]
    fn test_simple_trip_only_counts_target_year() {
        // Mon 2025-12-29 to Fri 2026-01-02
        let (snapshot, person) =
            snapshot_with(vec![simple_trip("a", "2025-12-29", "2026-01-02", "annual")]);

        assert_eq!(accumulate_usage(&snapshot, &person, "annual", 2025), dec("3"));
        assert_eq!(accumulate_usage(&snapshot, &person, "annual", 2026), dec("2"));
    }

    #[test]
    fn test_split_trip_charges_each_category() {
        let (snapshot, person) = snapshot_with(vec![split_trip(
            "a",
            "2026-03-02",
            "2026-03-06",
            vec![allocation("annual", "3", None), allocation("toil", "2", None)],
        )]);

        assert_eq!(accumulate_usage(&snapshot, &person, "annual", 2026), dec("3"));
        assert_eq!(accumulate_usage(&snapshot, &person, "toil", 2026), dec("2"));
        assert_eq!(accumulate_usage(&snapshot, &person, "sick", 2026), dec("0"));
    }

    #[test]
    fn test_split_trip_ignores_category_id() {
        let mut trip = split_trip(
            "a",
            "2026-03-02",
            "2026-03-06",
            vec![allocation("annual", "3", None)],
        );
        trip.category_id = Some("sick".to_string());
        let (snapshot, person) = snapshot_with(vec![trip]);

        assert_eq!(accumulate_usage(&snapshot, &person, "sick", 2026), dec("0"));
    }

    #[test]
    fn test_split_trip_across_years_is_proportionalized() {
        // Three weighted days in 2025, two in 2026
        let (snapshot, person) = snapshot_with(vec![split_trip(
            "a",
            "2025-12-29",
            "2026-01-02",
            vec![allocation("annual", "4", None)],
        )]);

        let in_2025 = accumulate_usage(&snapshot, &person, "annual", 2025);
        let in_2026 = accumulate_usage(&snapshot, &person, "annual", 2026);
        assert_eq!(in_2025, dec("2.4"));
        assert_eq!(in_2026, dec("1.6"));
        assert_eq!(in_2025 + in_2026, dec("4"));
    }

    #[test]
    fn test_huge_split_allocation_is_proportionalized_without_overflow() {
        let mut huge = allocation("annual", "0", None);
        huge.days = Decimal::MAX;
        let (snapshot, person) =
            snapshot_with(vec![split_trip("a", "2025-12-29", "2026-01-02", vec![huge])]);

        let in_2025 = accumulate_usage(&snapshot, &person, "annual", 2025);
        let in_2026 = accumulate_usage(&snapshot, &person, "annual", 2026);
        assert_eq!(in_2025, dec("47536897508558602556126370201"));
        assert_eq!(in_2026, dec("31691265005705735037417580134"));
    }

    #[test]
    fn test_usage_saturates_instead_of_overflowing() {
        let mut huge = allocation("annual", "0", Some(2026));
        huge.days = Decimal::MAX;
        let (snapshot, person) = snapshot_with(vec![
            split_trip("a", "2026-03-02", "2026-03-02", vec![huge.clone()]),
            split_trip("b", "2026-03-03", "2026-03-03", vec![huge]),
        ]);

        assert_eq!(accumulate_usage(&snapshot, &person, "annual", 2026), Decimal::MAX);
    }

    #[test]
    fn test_pinned_allocation_wins_for_its_year() {
        let (snapshot, person) = snapshot_with(vec![split_trip(
            "a",
            "2025-12-29",
            "2026-01-02",
            vec![
                allocation("annual", "4", None),
                allocation("annual", "1.5", Some(2026)),
            ],
        )]);

        assert_eq!(accumulate_usage(&snapshot, &person, "annual", 2026), dec("1.5"));
        assert_eq!(accumulate_usage(&snapshot, &person, "annual", 2025), dec("2.4"));
    }

    #[test]
    fn test_fully_excluded_split_trip_contributes_zero() {
        let mut trip = split_trip(
            "a",
            "2026-03-02",
            "2026-03-03",
            vec![allocation("annual", "2", None)],
        );
        trip.excluded_dates = vec![make_date("2026-03-02"), make_date("2026-03-03")];
        let (snapshot, person) = snapshot_with(vec![trip]);

        assert_eq!(accumulate_usage(&snapshot, &person, "annual", 2026), dec("0"));
    }

    #[test]
    fn test_half_day_trip_with_holiday() {
        // Mon 2026-03-09 is Labour Day in the person's calendar
        let mut trip = simple_trip("a", "2026-03-09", "2026-03-13", "annual");
        trip.duration_mode = Some(DurationMode::Pm);
        let (snapshot, person) = snapshot_with(vec![trip]);

        assert_eq!(accumulate_usage(&snapshot, &person, "annual", 2026), dec("2.0"));
    }

    #[test]
    fn test_invalid_range_warns_and_contributes_zero() {
        let (snapshot, person) =
            snapshot_with(vec![simple_trip("a", "2026-03-06", "2026-03-02", "annual")]);

        let mut pass = LedgerPass::new(&snapshot, &person, 2026);
        assert_eq!(pass.usage("annual", 2026), dec("0"));
        assert!(pass.warnings().iter().any(|w| w.code == "INVALID_DATE_RANGE"));
    }

    #[test]
    fn test_usage_is_memoized_within_a_pass() {
        let (snapshot, person) =
            snapshot_with(vec![simple_trip("a", "2026-03-02", "2026-03-06", "annual")]);

        let mut pass = LedgerPass::new(&snapshot, &person, 2026);
        let first = pass.usage("annual", 2026);
        assert_eq!(pass.usage_memo.len(), 1);
        assert_eq!(pass.usage("annual", 2026), first);
        assert_eq!(pass.usage_memo.len(), 1);
    }
}
