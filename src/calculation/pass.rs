//! Pass-scoped state for one computation.
//!
//! A [`LedgerPass`] borrows an immutable [`Snapshot`] and holds every cache
//! used while answering one top-level question (a ledger, an allowance or a
//! usage query). It is created per call and dropped afterwards, so cached
//! values can never outlive the snapshot they were computed from.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{Allowance, AllowanceBreakdown, AuditWarning, Person, Snapshot};

use super::non_working_days::{person_holidays, resolve_non_working_days};
use super::trip_days::{TripDays, weigh_trip_days};

/// Warning code for a referenced category that does not exist.
pub const CATEGORY_NOT_FOUND: &str = "CATEGORY_NOT_FOUND";
/// Warning code for a referenced holiday calendar missing for a year.
pub const CALENDAR_NOT_FOUND: &str = "CALENDAR_NOT_FOUND";
/// Warning code for a carry-over chain truncated at the depth bound.
pub const CARRY_OVER_DEPTH_EXCEEDED: &str = "CARRY_OVER_DEPTH_EXCEEDED";
/// Warning code for a trip whose end date precedes its start date.
pub const INVALID_DATE_RANGE: &str = "INVALID_DATE_RANGE";

/// A resolved allowance with its components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The total allowance.
    pub allowance: Allowance,
    /// Components of a finite allowance; zeroed for unbounded ones.
    pub breakdown: AllowanceBreakdown,
}

impl Resolution {
    pub(super) fn unbounded() -> Self {
        Self {
            allowance: Allowance::Unbounded,
            breakdown: AllowanceBreakdown::default(),
        }
    }

    pub(super) fn zero() -> Self {
        Self {
            allowance: Allowance::ZERO,
            breakdown: AllowanceBreakdown::default(),
        }
    }
}

/// State of one computation pass for one person.
///
/// Allowances are memoized per (category, year, depth) and usage per
/// (category, year).
pub struct LedgerPass<'a> {
    pub(super) snapshot: &'a Snapshot,
    pub(super) person: &'a Person,
    pub(super) top_year: i32,
    non_working: HashMap<i32, HashSet<NaiveDate>>,
    missing_calendars: HashMap<i32, Vec<String>>,
    trip_days: HashMap<usize, TripDays>,
    pub(super) usage_memo: HashMap<(String, i32), Decimal>,
    pub(super) allowance_memo: HashMap<(String, i32, usize), Resolution>,
    pub(super) deepest: Option<usize>,
    warnings: Vec<AuditWarning>,
}

impl<'a> LedgerPass<'a> {
    /// Starts a pass answering questions about `person` in `top_year`.
    pub fn new(snapshot: &'a Snapshot, person: &'a Person, top_year: i32) -> Self {
        Self {
            snapshot,
            person,
            top_year,
            non_working: HashMap::new(),
            missing_calendars: HashMap::new(),
            trip_days: HashMap::new(),
            usage_memo: HashMap::new(),
            allowance_memo: HashMap::new(),
            deepest: None,
            warnings: Vec::new(),
        }
    }

    /// The year the pass was started for.
    pub fn top_year(&self) -> i32 {
        self.top_year
    }

    /// The deepest carry-over recursion depth evaluated so far.
    pub fn deepest_depth(&self) -> Option<usize> {
        self.deepest
    }

    /// Warnings recorded so far, without duplicates, in recording order.
    pub fn warnings(&self) -> &[AuditWarning] {
        &self.warnings
    }

    /// Consumes the pass and returns its warnings.
    pub fn into_warnings(self) -> Vec<AuditWarning> {
        self.warnings
    }

    /// Records a degradation warning once.
    pub(super) fn warn(&mut self, code: &str, message: String, severity: &str) {
        let warning = AuditWarning::new(code, message, severity);
        if !self.warnings.contains(&warning) {
            warn!(
                person_id = %self.person.id,
                code = %warning.code,
                "{}",
                warning.message
            );
            self.warnings.push(warning);
        }
    }

    /// Returns the resolved non-working dates of a year, resolving them once.
    ///
    /// Calendars missing for the year are recorded as warnings only when
    /// `report_missing` is set.
    fn non_working_for_year(&mut self, year: i32, report_missing: bool) -> &HashSet<NaiveDate> {
        if !self.non_working.contains_key(&year) {
            let holidays = person_holidays(self.snapshot, self.person, year);
            self.missing_calendars.insert(
                year,
                holidays
                    .missing_config_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect(),
            );
            let dates = resolve_non_working_days(holidays.entries, self.person.weekend_rule);
            self.non_working.insert(year, dates);
        }

        if report_missing {
            let missing = self.missing_calendars.get(&year).cloned().unwrap_or_default();
            for config_id in missing {
                self.warn(
                    CALENDAR_NOT_FOUND,
                    format!("Holiday calendar '{}' has no entries for {}", config_id, year),
                    "low",
                );
            }
        }
        &self.non_working[&year]
    }

    /// Returns the weighted days of the trip at `index` in the snapshot.
    ///
    /// Calendars of the year before the trip are included so a weekend
    /// holiday moved into January is honoured. Only the years the trip
    /// covers report missing calendars.
    pub(super) fn trip_days(&mut self, index: usize) -> TripDays {
        if let Some(days) = self.trip_days.get(&index) {
            return days.clone();
        }

        let snapshot = self.snapshot;
        let trip = &snapshot.trips[index];
        let days = if trip.has_invalid_range() {
            self.warn(
                INVALID_DATE_RANGE,
                format!(
                    "Trip '{}' ends on {} before it starts on {}",
                    trip.id, trip.end_date, trip.start_date
                ),
                "medium",
            );
            TripDays::default()
        } else {
            let mut non_working: HashSet<NaiveDate> = self
                .non_working_for_year(trip.start_date.year() - 1, false)
                .clone();
            for year in trip.years() {
                non_working.extend(self.non_working_for_year(year, true).iter().copied());
            }
            weigh_trip_days(trip, &non_working, &snapshot.working_days)
        };

        self.trip_days.insert(index, days.clone());
        days
    }
}
