//! Trip model and split allocations.
//!
//! A trip either charges a single category (`category_id`) or splits its
//! days across categories and years through [`Allocation`]s.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripStatus {
    /// Being planned.
    Planning,
    /// Booked and in the future.
    Upcoming,
    /// Currently underway.
    Ongoing,
    /// Finished.
    Completed,
    /// Cancelled; contributes no usage.
    Cancelled,
    /// Any status this engine does not know about.
    #[serde(other)]
    Other,
}

/// How much of each day a trip occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationMode {
    /// Whole days.
    #[default]
    Full,
    /// Mornings only.
    Am,
    /// Afternoons only.
    Pm,
    /// Whole days with partial first and/or last day.
    Custom,
}

/// Portion of the first or last day of a custom-duration trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPortion {
    /// The whole day.
    #[default]
    Full,
    /// The morning only.
    Am,
    /// The afternoon only.
    Pm,
}

/// A trip's explicit charge against one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// The category charged.
    pub category_id: String,
    /// Days charged.
    pub days: Decimal,
    /// Year charged; when unset the days are spread over the trip's years.
    #[serde(default)]
    pub target_year: Option<i32>,
}

/// A trip (leave request) taken by one or more people.
///
/// # Example
///
/// ```
/// use entitlement_engine::models::{Trip, TripStatus};
/// use chrono::NaiveDate;
///
/// let trip = Trip::new(
///     "trip_001",
///     NaiveDate::from_ymd_opt(2025, 12, 29).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
/// );
/// assert_eq!(trip.status, TripStatus::Planning);
/// assert_eq!(trip.years().collect::<Vec<_>>(), vec![2025, 2026]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Unique identifier for the trip.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// First day of the trip (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the trip (inclusive).
    pub end_date: NaiveDate,
    /// Day-portion mode; full days when unset.
    #[serde(default)]
    pub duration_mode: Option<DurationMode>,
    /// Portion of the first day for custom-duration trips.
    #[serde(default)]
    pub start_portion: Option<DayPortion>,
    /// Portion of the last day for custom-duration trips.
    #[serde(default)]
    pub end_portion: Option<DayPortion>,
    /// Dates inside the range that are not charged.
    #[serde(default)]
    pub excluded_dates: Vec<NaiveDate>,
    /// Lifecycle status.
    pub status: TripStatus,
    /// Ids of the people taking the trip.
    #[serde(default)]
    pub participants: Vec<String>,
    /// Category charged by a simple trip.
    #[serde(default)]
    pub category_id: Option<String>,
    /// Split allocations; when non-empty `category_id` is ignored.
    #[serde(default)]
    pub allocations: Vec<Allocation>,
}

impl Trip {
    /// Creates a full-day trip in planning status with no participants.
    pub fn new(id: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            start_date,
            end_date,
            duration_mode: None,
            start_portion: None,
            end_portion: None,
            excluded_dates: Vec::new(),
            status: TripStatus::Planning,
            participants: Vec::new(),
            category_id: None,
            allocations: Vec::new(),
        }
    }

    /// Returns true if the trip counts toward usage.
    pub fn is_chargeable(&self) -> bool {
        self.status != TripStatus::Cancelled
    }

    /// Returns true if the end date precedes the start date.
    pub fn has_invalid_range(&self) -> bool {
        self.end_date < self.start_date
    }

    /// Returns true if the person takes part in the trip.
    pub fn has_participant(&self, person_id: &str) -> bool {
        self.participants.iter().any(|p| p == person_id)
    }

    /// Returns true if the trip splits its days through allocations.
    pub fn is_split(&self) -> bool {
        !self.allocations.is_empty()
    }

    /// Finds the allocation charging a category in a year.
    ///
    /// An allocation pinned to the year wins over a year-agnostic one.
    pub fn allocation_for(&self, category_id: &str, year: i32) -> Option<&Allocation> {
        let mut candidates = self
            .allocations
            .iter()
            .filter(|a| a.category_id == category_id);
        let pinned = candidates
            .clone()
            .find(|a| a.target_year == Some(year));
        pinned.or_else(|| candidates.find(|a| a.target_year.is_none()))
    }

    /// Iterates over the calendar years the trip touches.
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start_date.year()..=self.end_date.year()
    }

    /// Removes every allocation of a category and unsets a matching `category_id`.
    ///
    /// Returns true if anything changed.
    pub fn strip_category(&mut self, category_id: &str) -> bool {
        let before = self.allocations.len();
        self.allocations.retain(|a| a.category_id != category_id);
        let mut changed = self.allocations.len() != before;
        if self.category_id.as_deref() == Some(category_id) {
            self.category_id = None;
            changed = true;
        }
        changed
    }
}
