//! Chargeable-day weighing for trips.
//!
//! This module scans a trip's date range day by day, keeps the dates that
//! count against an entitlement and weighs them according to the trip's
//! duration mode. The per-year weights feed the usage accumulator.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Allocation, DayPortion, DurationMode, Trip, WorkingDaySet};

/// Weight of a half day.
pub const HALF_DAY: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// A single date of a trip that counts against an entitlement.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::ChargeableDay;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let day = ChargeableDay {
///     date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     weight: Decimal::new(5, 1), // half day
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeableDay {
    /// The date charged.
    pub date: NaiveDate,
    /// 1.0 for a full day, 0.5 for a half day.
    pub weight: Decimal,
}

/// Lists the chargeable days of a trip in date order.
///
/// A date is chargeable when its weekday is a working day, it is not in the
/// non-working set and it is not excluded by the trip. Weights follow the
/// duration mode:
/// - `am` / `pm`: every chargeable date weighs 0.5
/// - `custom`: the start date weighs 0.5 when `start_portion` is `pm`, the end
///   date weighs 0.5 when `end_portion` is `am`; a single-day trip weighs 0.5
///   if either holds
/// - `full` or unset: every chargeable date weighs 1.0
///
/// A trip whose end date precedes its start date has no chargeable days.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::chargeable_days;
/// use entitlement_engine::models::{Trip, WorkingDaySet};
/// use chrono::NaiveDate;
/// use std::collections::HashSet;
///
/// // Friday to Monday
/// let trip = Trip::new(
///     "trip_001",
///     NaiveDate::from_ymd_opt(2026, 3, 6).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
/// );
///
/// let days = chargeable_days(&trip, &HashSet::new(), &WorkingDaySet::default());
/// assert_eq!(days.len(), 2); // the weekend is skipped
/// ```
pub fn chargeable_days(
    trip: &Trip,
    non_working: &HashSet<NaiveDate>,
    working_days: &WorkingDaySet,
) -> Vec<ChargeableDay> {
    if trip.has_invalid_range() {
        return Vec::new();
    }

    let excluded: HashSet<NaiveDate> = trip.excluded_dates.iter().copied().collect();

    trip.start_date
        .iter_days()
        .take_while(|date| *date <= trip.end_date)
        .filter(|date| {
            working_days.is_working(date.weekday())
                && !non_working.contains(date)
                && !excluded.contains(date)
        })
        .map(|date| ChargeableDay {
            date,
            weight: day_weight(trip, date),
        })
        .collect()
}

/// Returns the weight of a chargeable date of a trip.
fn day_weight(trip: &Trip, date: NaiveDate) -> Decimal {
    match trip.duration_mode.unwrap_or_default() {
        DurationMode::Full => Decimal::ONE,
        DurationMode::Am | DurationMode::Pm => HALF_DAY,
        DurationMode::Custom => {
            let starts_after_noon =
                date == trip.start_date && trip.start_portion == Some(DayPortion::Pm);
            let ends_at_noon = date == trip.end_date && trip.end_portion == Some(DayPortion::Am);
            if starts_after_noon || ends_at_noon {
                HALF_DAY
            } else {
                Decimal::ONE
            }
        }
    }
}

/// Weighted chargeable days of a trip, grouped by calendar year.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::TripDays;
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
///
/// let days = TripDays {
///     by_year: BTreeMap::from([(2025, Decimal::new(2, 0)), (2026, Decimal::new(3, 0))]),
/// };
/// assert_eq!(days.in_year(2026), Decimal::new(3, 0));
/// assert_eq!(days.in_year(2027), Decimal::ZERO);
/// assert_eq!(days.total(), Decimal::new(5, 0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDays {
    /// Sum of weights per year.
    pub by_year: BTreeMap<i32, Decimal>,
}

impl TripDays {
    /// Groups chargeable days by year.
    pub fn from_days(days: &[ChargeableDay]) -> Self {
        let mut by_year = BTreeMap::new();
        for day in days {
            *by_year.entry(day.date.year()).or_insert(Decimal::ZERO) += day.weight;
        }
        Self { by_year }
    }

    /// Weighted days falling in a year.
    pub fn in_year(&self, year: i32) -> Decimal {
        self.by_year.get(&year).copied().unwrap_or(Decimal::ZERO)
    }

    /// Weighted days across the whole trip.
    pub fn total(&self) -> Decimal {
        self.by_year.values().copied().sum()
    }
}

/// Weighs a trip and groups its chargeable days by year.
pub fn weigh_trip_days(
    trip: &Trip,
    non_working: &HashSet<NaiveDate>,
    working_days: &WorkingDaySet,
) -> TripDays {
    TripDays::from_days(&chargeable_days(trip, non_working, working_days))
}

/// Returns how many days of an allocation are charged to a year.
///
/// An allocation pinned to a year charges its `days` as given. A year-agnostic
/// allocation is spread in proportion to the trip's weighted days:
/// `days × in_year / total`, or zero when the trip has no weighted days.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::{allocation_contribution, TripDays};
/// use entitlement_engine::models::Allocation;
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
///
/// let days = TripDays {
///     by_year: BTreeMap::from([(2025, Decimal::new(2, 0)), (2026, Decimal::new(3, 0))]),
/// };
/// let allocation = Allocation {
///     category_id: "annual".to_string(),
///     days: Decimal::new(10, 0),
///     target_year: None,
/// };
/// assert_eq!(allocation_contribution(&allocation, &days, 2025), Decimal::new(4, 0));
/// assert_eq!(allocation_contribution(&allocation, &days, 2026), Decimal::new(6, 0));
/// ```
pub fn allocation_contribution(allocation: &Allocation, days: &TripDays, year: i32) -> Decimal {
    if let Some(target_year) = allocation.target_year {
        return if target_year == year {
            allocation.days
        } else {
            Decimal::ZERO
        };
    }

    let total = days.total();
    if total.is_zero() {
        return Decimal::ZERO;
    }
    let in_year = days.in_year(year);
    allocation
        .days
        .checked_mul(in_year)
        .map(|weighted| weighted / total)
        .unwrap_or_else(|| allocation.days * (in_year / total))
}
