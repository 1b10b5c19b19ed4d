//! The immutable input of one computation pass.

use serde::{Deserialize, Serialize};

use super::calendar::{HolidayCalendar, WorkingDaySet};
use super::category::Category;
use super::person::Person;
use super::trip::Trip;

/// Everything the engine reads during a computation pass.
///
/// Calculations borrow the snapshot immutably; callers apply mutations
/// between passes and then invoke the engine again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// People in the workspace.
    #[serde(default)]
    pub persons: Vec<Person>,
    /// Leave categories in display order.
    #[serde(default)]
    pub categories: Vec<Category>,
    /// All trips of the workspace.
    #[serde(default)]
    pub trips: Vec<Trip>,
    /// Holiday calendars indexed by (id, year).
    #[serde(default)]
    pub calendars: Vec<HolidayCalendar>,
    /// Weekdays considered working days.
    #[serde(default)]
    pub working_days: WorkingDaySet,
}

/// Counts of what a category deletion removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryRemoval {
    /// Whether the category itself existed.
    pub category_removed: bool,
    /// Policies removed across all people and years.
    pub policies_removed: usize,
    /// Trips whose allocations or category were stripped.
    pub trips_updated: usize,
}

impl Snapshot {
    /// Looks up a person by id.
    pub fn person(&self, id: &str) -> Option<&Person> {
        self.persons.iter().find(|p| p.id == id)
    }

    /// Looks up a category by id.
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Looks up a holiday calendar by configuration id and year.
    pub fn calendar(&self, id: &str, year: i32) -> Option<&HolidayCalendar> {
        self.calendars.iter().find(|c| c.id == id && c.year == year)
    }

    /// Iterates over the trips a person takes part in.
    pub fn trips_for<'a>(&'a self, person_id: &'a str) -> impl Iterator<Item = &'a Trip> {
        self.trips.iter().filter(move |t| t.has_participant(person_id))
    }

    /// Deletes a category and cascades the deletion.
    ///
    /// Matching policies are removed from every person, and matching
    /// allocations (or simple-trip categories) are stripped from trips.
    pub fn remove_category(&mut self, category_id: &str) -> CategoryRemoval {
        let before = self.categories.len();
        self.categories.retain(|c| c.id != category_id);

        let policies_removed = self
            .persons
            .iter_mut()
            .map(|p| p.remove_category_policies(category_id))
            .sum();

        let trips_updated = self
            .trips
            .iter_mut()
            .map(|t| t.strip_category(category_id))
            .filter(|changed| *changed)
            .count();

        CategoryRemoval {
            category_removed: self.categories.len() != before,
            policies_removed,
            trips_updated,
        }
    }
}
