//! Holiday calendars and working-day configuration.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A single holiday in a regional calendar.
///
/// # Example
///
/// ```
/// use entitlement_engine::models::HolidayEntry;
/// use chrono::NaiveDate;
///
/// let anzac_day = HolidayEntry::new(NaiveDate::from_ymd_opt(2026, 4, 25).unwrap(), "Anzac Day");
/// assert!(anzac_day.is_included);
/// assert!(anzac_day.falls_on_weekend()); // Saturday
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEntry {
    /// The date of the holiday.
    pub date: NaiveDate,
    /// The name of the holiday (e.g., "Australia Day").
    pub name: String,
    /// Whether the holiday is observed by people using this calendar.
    #[serde(default = "default_included")]
    pub is_included: bool,
    /// Weekend marker as recorded by the calendar source.
    #[serde(default)]
    pub is_weekend: bool,
    /// Whether the entry was added by hand rather than by the calendar source.
    #[serde(default)]
    pub is_custom_addition: bool,
}

fn default_included() -> bool {
    true
}

impl HolidayEntry {
    /// Creates an included, non-custom holiday entry.
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            is_included: true,
            is_weekend: is_weekend(date),
            is_custom_addition: false,
        }
    }

    /// Returns true if the date is a Saturday or Sunday.
    ///
    /// Computed from the date; the stored `is_weekend` marker is not trusted.
    pub fn falls_on_weekend(&self) -> bool {
        is_weekend(self.date)
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Holidays of one region for one year.
///
/// Calendars are indexed by (`id`, `year`); a person references calendars by
/// `id` and picks up every year that exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    /// Holiday configuration id referenced by people (e.g., "au-vic").
    pub id: String,
    /// The region the calendar covers.
    #[serde(default)]
    pub region: String,
    /// The calendar year.
    pub year: i32,
    /// Holidays in date order.
    #[serde(default)]
    pub holidays: Vec<HolidayEntry>,
}

impl HolidayCalendar {
    /// Sorts holidays by date so entries keep their documented order.
    pub fn sort_holidays(&mut self) {
        self.holidays.sort_by_key(|holiday| holiday.date);
    }
}

/// Weekday indices considered working days, 0 = Sunday through 6 = Saturday.
///
/// # Example
///
/// ```
/// use entitlement_engine::models::WorkingDaySet;
/// use chrono::Weekday;
///
/// let days = WorkingDaySet::default();
/// assert!(days.is_working(Weekday::Mon));
/// assert!(!days.is_working(Weekday::Sat));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkingDaySet(BTreeSet<u8>);

impl WorkingDaySet {
    /// Creates a set from weekday indices (0 = Sunday).
    ///
    /// Indices outside 0..=6 are kept but never match a weekday.
    pub fn new(indices: impl IntoIterator<Item = u8>) -> Self {
        Self(indices.into_iter().collect())
    }

    /// Returns true if the weekday is a working day.
    pub fn is_working(&self, weekday: Weekday) -> bool {
        self.0.contains(&(weekday.num_days_from_sunday() as u8))
    }

    /// Returns the indices that are not valid weekdays.
    pub fn invalid_indices(&self) -> Vec<u8> {
        self.0.iter().copied().filter(|index| *index > 6).collect()
    }

    /// Returns the configured indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

impl Default for WorkingDaySet {
    fn default() -> Self {
        Self::new(1..=5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_deserialize_calendar() {
        let json = r#"{
            "id": "au-vic",
            "region": "VIC",
            "year": 2026,
            "holidays": [
                { "date": "2026-01-01", "name": "New Year's Day" },
                { "date": "2026-01-26", "name": "Australia Day", "is_included": false }
            ]
        }"#;

        let calendar: HolidayCalendar = serde_json::from_str(json).unwrap();
        assert_eq!(calendar.year, 2026);
        assert_eq!(calendar.holidays.len(), 2);
        assert!(calendar.holidays[0].is_included);
        assert!(!calendar.holidays[1].is_included);
        assert!(!calendar.holidays[1].is_custom_addition);
    }

    #[test]
    fn test_sort_holidays() {
        let mut calendar = HolidayCalendar {
            id: "au-vic".to_string(),
            region: "VIC".to_string(),
            year: 2026,
            holidays: vec![
                HolidayEntry::new(make_date("2026-12-25"), "Christmas Day"),
                HolidayEntry::new(make_date("2026-01-01"), "New Year's Day"),
            ],
        };
        calendar.sort_holidays();
        assert_eq!(calendar.holidays[0].name, "New Year's Day");
    }

    #[test]
    fn test_entry_weekend_detection_ignores_marker() {
        // 2026-01-03 is a Saturday
        let mut entry = HolidayEntry::new(make_date("2026-01-03"), "Bridge Day");
        entry.is_weekend = false;
        assert!(entry.falls_on_weekend());

        // 2026-01-05 is a Monday
        let entry = HolidayEntry::new(make_date("2026-01-05"), "Observed Day");
        assert!(!entry.falls_on_weekend());
        assert!(!entry.is_weekend);
    }

    #[test]
    fn test_default_working_days_are_monday_to_friday() {
        let days = WorkingDaySet::default();
        assert_eq!(days.indices().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert!(days.is_working(Weekday::Fri));
        assert!(!days.is_working(Weekday::Sun));
    }

    #[test]
    fn test_custom_working_days() {
        // Sunday to Thursday week
        let days = WorkingDaySet::new([0, 1, 2, 3, 4]);
        assert!(days.is_working(Weekday::Sun));
        assert!(!days.is_working(Weekday::Fri));
    }

    #[test]
    fn test_invalid_indices() {
        let days = WorkingDaySet::new([1, 2, 9]);
        assert_eq!(days.invalid_indices(), vec![9]);
    }

    #[test]
    fn test_working_day_set_serializes_as_list() {
        let json = serde_json::to_string(&WorkingDaySet::default()).unwrap();
        assert_eq!(json, "[1,2,3,4,5]");

        let parsed: WorkingDaySet = serde_json::from_str("[0,6]").unwrap();
        assert!(parsed.is_working(Weekday::Sat));
    }
}
