//! Configuration types for a leave workspace.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use serde::Deserialize;

use crate::models::{Category, HolidayCalendar, Person, Snapshot, Trip, WorkingDaySet};

/// Metadata about the workspace.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceMetadata {
    /// The human-readable name of the workspace.
    pub name: String,
    /// An optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Workspace configuration file structure (`workspace.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceFile {
    /// Workspace metadata.
    pub workspace: WorkspaceMetadata,
    /// Weekday indices worked across the workspace, 0 = Sunday.
    #[serde(default)]
    pub working_days: WorkingDaySet,
    /// Leave categories in display order.
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// The complete workspace configuration.
///
/// Combines the workspace file with every holiday calendar found in the
/// calendars directory.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    metadata: WorkspaceMetadata,
    working_days: WorkingDaySet,
    categories: Vec<Category>,
    calendars: Vec<HolidayCalendar>,
}

impl WorkspaceConfig {
    /// Creates a new WorkspaceConfig from its component parts.
    ///
    /// Calendars are ordered by id and year and their holidays by date.
    pub fn new(
        metadata: WorkspaceMetadata,
        working_days: WorkingDaySet,
        categories: Vec<Category>,
        calendars: Vec<HolidayCalendar>,
    ) -> Self {
        let mut sorted_calendars = calendars;
        sorted_calendars.sort_by(|a, b| a.id.cmp(&b.id).then(a.year.cmp(&b.year)));
        for calendar in &mut sorted_calendars {
            calendar.sort_holidays();
        }
        Self {
            metadata,
            working_days,
            categories,
            calendars: sorted_calendars,
        }
    }

    /// Returns the workspace metadata.
    pub fn workspace(&self) -> &WorkspaceMetadata {
        &self.metadata
    }

    /// Returns the working weekdays.
    pub fn working_days(&self) -> &WorkingDaySet {
        &self.working_days
    }

    /// Returns all categories in display order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Returns all holiday calendars.
    pub fn calendars(&self) -> &[HolidayCalendar] {
        &self.calendars
    }

    /// Builds a snapshot of this workspace for the given people and trips.
    pub fn snapshot(&self, persons: Vec<Person>, trips: Vec<Trip>) -> Snapshot {
        Snapshot {
            persons,
            categories: self.categories.clone(),
            trips,
            calendars: self.calendars.clone(),
            working_days: self.working_days.clone(),
        }
    }
}
