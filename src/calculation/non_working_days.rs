//! Calendar resolution.
//!
//! This module turns a person's holiday calendars into the set of dates that
//! are never charged against an entitlement, and counts the weekend holidays
//! that feed lieu categories.

use std::collections::{BTreeSet, HashSet};

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::models::{HolidayEntry, Person, Snapshot, WeekendRule};

/// The holiday entries that apply to a person in one year.
#[derive(Debug, Clone, Default)]
pub struct PersonHolidays<'a> {
    /// Entries from every matching calendar, in calendar order.
    pub entries: Vec<&'a HolidayEntry>,
    /// Referenced calendar ids with no calendar for the year.
    pub missing_config_ids: Vec<&'a str>,
}

/// Collects the holiday entries of every calendar a person references for a year.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::person_holidays;
/// use entitlement_engine::models::{HolidayCalendar, HolidayEntry, Person, Snapshot};
/// use chrono::NaiveDate;
///
/// let mut person = Person::new("p1");
/// person.holiday_config_ids = vec!["au-vic".to_string(), "au-nsw".to_string()];
///
/// let snapshot = Snapshot {
///     calendars: vec![HolidayCalendar {
///         id: "au-vic".to_string(),
///         region: "VIC".to_string(),
///         year: 2026,
///         holidays: vec![HolidayEntry::new(
///             NaiveDate::from_ymd_opt(2026, 11, 3).unwrap(),
///             "Melbourne Cup",
///         )],
///     }],
///     ..Default::default()
/// };
///
/// let holidays = person_holidays(&snapshot, &person, 2026);
/// assert_eq!(holidays.entries.len(), 1);
/// assert_eq!(holidays.missing_config_ids, vec!["au-nsw"]);
/// ```
pub fn person_holidays<'a>(
    snapshot: &'a Snapshot,
    person: &'a Person,
    year: i32,
) -> PersonHolidays<'a> {
    let mut holidays = PersonHolidays::default();
    for config_id in &person.holiday_config_ids {
        match snapshot.calendar(config_id, year) {
            Some(calendar) => holidays.entries.extend(calendar.holidays.iter()),
            None => holidays.missing_config_ids.push(config_id.as_str()),
        }
    }
    holidays
}

/// Resolves the effective non-working dates for a year.
///
/// Every included holiday is non-working. Under [`WeekendRule::MoveToMonday`]
/// an included holiday on a Saturday or Sunday also makes the following Monday
/// non-working. The other rules add nothing; `AccrueToLieu` is handled by the
/// allowance resolver instead.
///
/// # Arguments
///
/// * `holidays` - Holiday entries of the year's applicable calendars
/// * `rule` - The person's weekend-observance rule
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::resolve_non_working_days;
/// use entitlement_engine::models::{HolidayEntry, WeekendRule};
/// use chrono::NaiveDate;
///
/// // 2026-01-04 is a Sunday
/// let sunday = HolidayEntry::new(NaiveDate::from_ymd_opt(2026, 1, 4).unwrap(), "Founders Day");
///
/// let dates = resolve_non_working_days([&sunday], WeekendRule::MoveToMonday);
/// assert!(dates.contains(&NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()));
/// assert!(dates.contains(&NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()));
/// ```
pub fn resolve_non_working_days<'a>(
    holidays: impl IntoIterator<Item = &'a HolidayEntry>,
    rule: WeekendRule,
) -> HashSet<NaiveDate> {
    let mut dates = HashSet::new();
    for holiday in holidays.into_iter().filter(|h| h.is_included) {
        dates.insert(holiday.date);
        if rule == WeekendRule::MoveToMonday {
            if let Some(monday) = following_monday(holiday.date) {
                dates.insert(monday);
            }
        }
    }
    dates
}

/// Returns the Monday after a weekend date, or `None` for a weekday.
fn following_monday(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => date.checked_add_signed(Duration::days(2)),
        Weekday::Sun => date.checked_add_signed(Duration::days(1)),
        _ => None,
    }
}

/// Counts the distinct included holidays of a year that fall on a weekend.
///
/// Works on the raw calendar entries, not on the resolved non-working set,
/// so shifted Mondays are never counted. The weekday is taken from each
/// entry's date: an `is_weekend` marker that disagrees with the date is
/// overridden.
pub fn count_weekend_holidays<'a>(
    holidays: impl IntoIterator<Item = &'a HolidayEntry>,
    year: i32,
) -> u32 {
    let dates: BTreeSet<NaiveDate> = holidays
        .into_iter()
        .filter(|h| h.is_included && h.date.year() == year && h.falls_on_weekend())
        .map(|h| h.date)
        .collect();
    dates.len() as u32
}
