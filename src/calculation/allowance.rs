//! Allowance resolution.
//!
//! This module computes a person's total entitlement for a category in a year:
//! the policy's accrual, weekend holidays accrued to lieu, and days carried
//! over from previous-year policies. Carry-over sources are resolved
//! recursively, one year back per step, up to [`MAX_CARRY_OVER_DEPTH`].

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{
    Allowance, AllowanceBreakdown, Category, Person, Policy, Snapshot, WeekendRule,
};

use super::non_working_days::{count_weekend_holidays, person_holidays};
use super::pass::{CARRY_OVER_DEPTH_EXCEEDED, LedgerPass, Resolution};

/// Deepest carry-over recursion evaluated; deeper sources count as zero.
///
/// Depths 0 through 5 are evaluated, so a single chain never spans more
/// than six years.
pub const MAX_CARRY_OVER_DEPTH: usize = 5;

impl LedgerPass<'_> {
    /// Resolves the allowance of the pass's person for a category in a year.
    ///
    /// The query is top-level: the carry-over chain below it may reach back
    /// [`MAX_CARRY_OVER_DEPTH`] years. Results are memoized for the pass.
    pub fn allowance(&mut self, category_id: &str, year: i32) -> Resolution {
        self.allowance_at(category_id, year, 0)
    }

    /// Resolves an allowance `depth` carry-over steps below a top-level query.
    ///
    /// Memoized per (category, year, depth), so a result truncated deep in one
    /// chain is never served to a shallower query.
    pub(super) fn allowance_at(
        &mut self,
        category_id: &str,
        year: i32,
        depth: usize,
    ) -> Resolution {
        if depth > MAX_CARRY_OVER_DEPTH {
            self.warn(
                CARRY_OVER_DEPTH_EXCEEDED,
                format!(
                    "Carry-over chain into {} stopped at '{}' {} after {} years",
                    self.top_year, category_id, year, MAX_CARRY_OVER_DEPTH
                ),
                "medium",
            );
            return Resolution::zero();
        }

        let key = (category_id.to_string(), year, depth);
        if let Some(resolution) = self.allowance_memo.get(&key) {
            return resolution.clone();
        }

        self.deepest = Some(self.deepest.map_or(depth, |deepest| deepest.max(depth)));
        let resolution = self.resolve(category_id, year, depth);
        self.allowance_memo.insert(key, resolution.clone());
        resolution
    }

    fn resolve(&mut self, category_id: &str, year: i32, depth: usize) -> Resolution {
        let snapshot = self.snapshot;
        let person = self.person;
        let category = snapshot.category(category_id);
        let category_unlimited = category.is_some_and(|c| c.is_unlimited);
        let policy = person.policy(category_id, year);

        let is_unlimited = match policy {
            Some(policy) => policy.is_unlimited_with(category_unlimited),
            None => category_unlimited,
        };
        if is_unlimited {
            debug!(category_id = %category_id, year, depth, "Allowance is unbounded");
            return Resolution::unbounded();
        }

        let base = policy.map_or(Decimal::ZERO, |p| p.accrual.amount);
        let lieu = lieu_days(snapshot, person, category, year);

        let mut carry_over = Decimal::ZERO;
        let mut expiry_label = None;
        if policy.is_some_and(|p| p.carry_over.enabled) {
            let previous_year = year - 1;
            for (source_id, source) in carry_over_sources(person, category_id, previous_year) {
                let previous = self.allowance_at(source_id, previous_year, depth + 1);
                let Some(previous_total) = previous.allowance.finite() else {
                    debug!(
                        source_id = %source_id,
                        year = previous_year,
                        "Skipping carry-over from unbounded source"
                    );
                    continue;
                };

                let used = self.usage(source_id, previous_year);
                let remaining = previous_total.saturating_sub(used).max(Decimal::ZERO);
                let carried = remaining.min(source.carry_over.max_days);
                carry_over = carry_over.saturating_add(carried);

                if expiry_label.is_none() {
                    expiry_label = source.carry_over.expiry_label(year);
                }

                debug!(
                    category_id = %category_id,
                    source_id = %source_id,
                    year,
                    depth,
                    previous_total = %previous_total,
                    used = %used,
                    carried = %carried,
                    "Carried over unused days"
                );
            }
        }

        let total = base.saturating_add(lieu).saturating_add(carry_over);
        debug!(
            category_id = %category_id,
            year,
            depth,
            base = %base,
            lieu = %lieu,
            carry_over = %carry_over,
            total = %total,
            "Resolved allowance"
        );

        Resolution {
            allowance: Allowance::Finite(total),
            breakdown: AllowanceBreakdown {
                base,
                carry_over,
                lieu,
                expiry_label,
            },
        }
    }
}

/// Previous-year policies whose carry-over lands in `category_id`.
///
/// A source targets its explicit `target_category_id`, or its own category
/// when none is set.
fn carry_over_sources<'a>(
    person: &'a Person,
    category_id: &'a str,
    previous_year: i32,
) -> impl Iterator<Item = (&'a str, &'a Policy)> {
    person
        .policies_for_year(previous_year)
        .filter(move |(source_id, source)| {
            source.carry_over.enabled && source.carry_over.target_or(source_id) == category_id
        })
}

/// Weekend holidays accrued to a lieu category.
fn lieu_days(
    snapshot: &Snapshot,
    person: &Person,
    category: Option<&Category>,
    year: i32,
) -> Decimal {
    let collects_lieu = category.is_some_and(Category::is_lieu)
        && person.weekend_rule == WeekendRule::AccrueToLieu;
    if !collects_lieu {
        return Decimal::ZERO;
    }
    let holidays = person_holidays(snapshot, person, year);
    Decimal::from(count_weekend_holidays(holidays.entries, year))
}

/// Resolves a person's total allowance for a category in a year.
///
/// Runs a fresh pass; use [`LedgerPass::allowance`] to share work between
/// queries against the same snapshot.
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::resolve_allowance;
/// use entitlement_engine::models::{Allowance, Person, Policy, Snapshot};
/// use rust_decimal::Decimal;
///
/// let mut person = Person::new("p1");
/// person.set_policy("annual", 2024, Policy::with_amount(Decimal::new(20, 0)));
/// let snapshot = Snapshot::default();
///
/// assert_eq!(
///     resolve_allowance(&snapshot, &person, "annual", 2024),
///     Allowance::Finite(Decimal::new(20, 0))
/// );
/// ```
pub fn resolve_allowance(
    snapshot: &Snapshot,
    person: &Person,
    category_id: &str,
    year: i32,
) -> Allowance {
    LedgerPass::new(snapshot, person, year)
        .allowance(category_id, year)
        .allowance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CarryOverRule, CategoryClass, ExpiryType, ExpiryValue, HolidayCalendar, HolidayEntry,
        Trip,
    };
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn category(id: &str, class: CategoryClass, is_unlimited: bool) -> Category {
        Category {
            id: id.to_string(),
            name: id.to_string(),
            class,
            is_unlimited,
            default_accrual: Default::default(),
            default_carry_over: Default::default(),
        }
    }

    fn carrying_policy(amount: &str, max_days: &str) -> Policy {
        let mut policy = Policy::with_amount(dec(amount));
        policy.carry_over = CarryOverRule {
            enabled: true,
            max_days: dec(max_days),
            ..Default::default()
        };
        policy
    }

    fn annual_trip(id: &str, start: &str, end: &str) -> Trip {
        let mut trip = Trip::new(id, make_date(start), make_date(end));
        trip.participants = vec!["p1".to_string()];
        trip.category_id = Some("annual".to_string());
        trip
    }

    fn workspace(person: &Person, trips: Vec<Trip>) -> Snapshot {
        Snapshot {
            persons: vec![person.clone()],
            categories: vec![
                category("annual", CategoryClass::Annual, false),
                category("toil", CategoryClass::Lieu, false),
                category("sick", CategoryClass::Sick, true),
            ],
            trips,
            ..Default::default()
        }
    }

    /// 18 weekdays of annual leave in 2023.
    fn eighteen_days_2023() -> Vec<Trip> {
        vec![
            annual_trip("a", "2023-03-06", "2023-03-24"), // 15 weekdays
            annual_trip("b", "2023-07-03", "2023-07-05"), // 3 weekdays
        ]
    }

    #[test]
    fn test_carry_over_scenario() {
        let mut person = Person::new("p1");
        person.set_policy("annual", 2023, carrying_policy("20", "5"));
        person.set_policy("annual", 2024, carrying_policy("20", "5"));
        let snapshot = workspace(&person, eighteen_days_2023());

        let mut pass = LedgerPass::new(&snapshot, &person, 2024);
        assert_eq!(pass.usage("annual", 2023), dec("18"));

        let resolution = pass.allowance("annual", 2024);
        assert_eq!(resolution.allowance, Allowance::Finite(dec("22")));
        assert_eq!(resolution.breakdown.base, dec("20"));
        assert_eq!(resolution.breakdown.carry_over, dec("2"));
    }

    #[test]
    fn test_carry_over_is_capped_at_max_days() {
        let mut person = Person::new("p1");
        person.set_policy("annual", 2023, carrying_policy("20", "5"));
        person.set_policy("annual", 2024, carrying_policy("20", "5"));
        let snapshot = workspace(&person, vec![]);

        assert_eq!(
            resolve_allowance(&snapshot, &person, "annual", 2024),
            Allowance::Finite(dec("25"))
        );
    }

    #[test]
    fn test_huge_accrual_saturates_with_carry_over() {
        let mut person = Person::new("p1");
        person.set_policy("annual", 2023, carrying_policy("20", "5"));
        let mut huge = carrying_policy("0", "5");
        huge.accrual.amount = Decimal::MAX;
        person.set_policy("annual", 2024, huge);
        let snapshot = workspace(&person, vec![]);

        assert_eq!(
            resolve_allowance(&snapshot, &person, "annual", 2024),
            Allowance::Finite(Decimal::MAX)
        );
    }

    #[test]
    fn test_overdrawn_source_carries_nothing() {
        let mut person = Person::new("p1");
        person.set_policy("annual", 2023, carrying_policy("10", "5"));
        person.set_policy("annual", 2024, carrying_policy("20", "5"));
        let snapshot = workspace(&person, eighteen_days_2023());

        assert_eq!(
            resolve_allowance(&snapshot, &person, "annual", 2024),
            Allowance::Finite(dec("20"))
        );
    }

    #[test]
    fn test_disabled_carry_over_is_base_only() {
        let mut person = Person::new("p1");
        person.set_policy("annual", 2023, carrying_policy("20", "5"));
        person.set_policy("annual", 2024, Policy::with_amount(dec("20")));
        let snapshot = workspace(&person, vec![]);

        assert_eq!(
            resolve_allowance(&snapshot, &person, "annual", 2024),
            Allowance::Finite(dec("20"))
        );
    }

    #[test]
    fn test_source_without_carry_over_contributes_nothing() {
        let mut person = Person::new("p1");
        person.set_policy("annual", 2023, Policy::with_amount(dec("20")));
        person.set_policy("annual", 2024, carrying_policy("20", "5"));
        let snapshot = workspace(&person, vec![]);

        assert_eq!(
            resolve_allowance(&snapshot, &person, "annual", 2024),
            Allowance::Finite(dec("20"))
        );
    }

    #[test]
    fn test_cross_category_carry_over_target() {
        let mut person = Person::new("p1");
        let mut toil_2023 = carrying_policy("3", "10");
        toil_2023.carry_over.target_category_id = Some("annual".to_string());
        person.set_policy("toil", 2023, toil_2023);
        person.set_policy("annual", 2023, carrying_policy("20", "5"));
        person.set_policy("annual", 2024, carrying_policy("20", "5"));
        person.set_policy("toil", 2024, carrying_policy("3", "10"));
        let snapshot = workspace(&person, vec![]);

        let mut pass = LedgerPass::new(&snapshot, &person, 2024);
        // 5 from annual (capped) + 3 from toil
        assert_eq!(pass.allowance("annual", 2024).breakdown.carry_over, dec("8"));
        // toil 2023 targets annual, so toil 2024 receives nothing
        assert_eq!(pass.allowance("toil", 2024).allowance, Allowance::Finite(dec("3")));
    }

    #[test]
    fn test_unlimited_category_without_policy() {
        let person = Person::new("p1");
        let snapshot = workspace(&person, vec![]);

        assert_eq!(
            resolve_allowance(&snapshot, &person, "sick", 2024),
            Allowance::Unbounded
        );
    }

    #[test]
    fn test_policy_override_limits_unlimited_category() {
        let mut person = Person::new("p1");
        let mut policy = Policy::with_amount(dec("10"));
        policy.is_unlimited = Some(false);
        person.set_policy("sick", 2024, policy);
        let snapshot = workspace(&person, vec![]);

        assert_eq!(
            resolve_allowance(&snapshot, &person, "sick", 2024),
            Allowance::Finite(dec("10"))
        );
    }

    #[test]
    fn test_unlimited_policy_skips_carry_over() {
        let mut person = Person::new("p1");
        person.set_policy("annual", 2023, carrying_policy("20", "5"));
        let mut policy = carrying_policy("20", "5");
        policy.is_unlimited = Some(true);
        person.set_policy("annual", 2024, policy);
        let snapshot = workspace(&person, vec![]);

        let mut pass = LedgerPass::new(&snapshot, &person, 2024);
        let resolution = pass.allowance("annual", 2024);
        assert_eq!(resolution.allowance, Allowance::Unbounded);
        assert_eq!(resolution.breakdown, AllowanceBreakdown::default());
        assert!(pass.usage_memo.is_empty());
    }

    #[test]
    fn test_unbounded_source_is_skipped() {
        let mut person = Person::new("p1");
        let mut sick_2023 = carrying_policy("0", "5");
        sick_2023.carry_over.target_category_id = Some("annual".to_string());
        person.set_policy("sick", 2023, sick_2023);
        person.set_policy("annual", 2024, carrying_policy("20", "5"));
        let snapshot = workspace(&person, vec![]);

        assert_eq!(
            resolve_allowance(&snapshot, &person, "annual", 2024),
            Allowance::Finite(dec("20"))
        );
    }

    #[test]
    fn test_missing_policy_without_unlimited_is_zero() {
        let person = Person::new("p1");
        let snapshot = workspace(&person, vec![]);

        assert_eq!(resolve_allowance(&snapshot, &person, "annual", 2024), Allowance::ZERO);
        assert_eq!(resolve_allowance(&snapshot, &person, "unknown", 2024), Allowance::ZERO);
    }

    #[test]
    fn test_lieu_accrues_weekend_holidays() {
        let mut person = Person::new("p1");
        person.weekend_rule = WeekendRule::AccrueToLieu;
        person.holiday_config_ids = vec!["au-vic".to_string()];
        person.set_policy("toil", 2026, Policy::with_amount(dec("1")));
        person.set_policy("annual", 2026, Policy::with_amount(dec("20")));

        let mut snapshot = workspace(&person, vec![]);
        snapshot.calendars = vec![HolidayCalendar {
            id: "au-vic".to_string(),
            region: "VIC".to_string(),
            year: 2026,
            holidays: vec![
                HolidayEntry::new(make_date("2026-01-01"), "New Year's Day"), // Thursday
                HolidayEntry::new(make_date("2026-04-25"), "Anzac Day"),      // Saturday
                HolidayEntry::new(make_date("2026-12-26"), "Boxing Day"),     // Saturday
            ],
        }];

        let mut pass = LedgerPass::new(&snapshot, &person, 2026);
        let toil = pass.allowance("toil", 2026);
        assert_eq!(toil.allowance, Allowance::Finite(dec("3")));
        assert_eq!(toil.breakdown.lieu, dec("2"));
        assert_eq!(toil.breakdown.base, dec("1"));

        // Only lieu categories collect weekend holidays
        assert_eq!(
            pass.allowance("annual", 2026).allowance,
            Allowance::Finite(dec("20"))
        );

        // Other weekend rules collect nothing
        let mut forfeiting = person.clone();
        forfeiting.weekend_rule = WeekendRule::MoveToMonday;
        assert_eq!(
            resolve_allowance(&snapshot, &forfeiting, "toil", 2026),
            Allowance::Finite(dec("1"))
        );
    }

    #[test]
    fn test_expiry_label_comes_from_source_policy() {
        let mut person = Person::new("p1");
        let mut source = carrying_policy("20", "5");
        source.carry_over.expiry_type = ExpiryType::Months;
        source.carry_over.expiry_value = Some(ExpiryValue::Months(3));
        person.set_policy("annual", 2023, source);
        let mut current = carrying_policy("20", "5");
        current.carry_over.expiry_type = ExpiryType::FixedDate;
        current.carry_over.expiry_value = Some(ExpiryValue::Text("06-30".to_string()));
        person.set_policy("annual", 2024, current);
        let snapshot = workspace(&person, vec![]);

        let mut pass = LedgerPass::new(&snapshot, &person, 2024);
        let resolution = pass.allowance("annual", 2024);
        assert_eq!(
            resolution.breakdown.expiry_label.as_deref(),
            Some("Expires 31 Mar 2024")
        );
    }

    #[test]
    fn test_long_chain_is_truncated_at_depth_bound() {
        let mut person = Person::new("p1");
        for year in 2010..=2024 {
            person.set_policy("annual", year, carrying_policy("20", "5"));
        }
        let snapshot = workspace(&person, vec![]);

        let mut pass = LedgerPass::new(&snapshot, &person, 2024);
        let resolution = pass.allowance("annual", 2024);

        assert_eq!(resolution.allowance, Allowance::Finite(dec("25")));
        assert_eq!(pass.deepest_depth(), Some(MAX_CARRY_OVER_DEPTH));
        // 2019 is evaluated at depth 5 and receives nothing from 2018
        assert_eq!(
            pass.allowance_memo[&("annual".to_string(), 2019, 5)].allowance,
            Allowance::Finite(dec("20"))
        );
        assert!(!pass.allowance_memo.contains_key(&("annual".to_string(), 2018, 6)));
        assert!(
            pass.warnings()
                .iter()
                .any(|w| w.code == CARRY_OVER_DEPTH_EXCEEDED)
        );
    }

    #[test]
    fn test_truncated_result_is_not_served_to_shallower_query() {
        let mut person = Person::new("p1");
        for year in 2015..=2024 {
            person.set_policy("annual", year, carrying_policy("20", "5"));
        }
        let snapshot = workspace(&person, vec![]);

        let mut pass = LedgerPass::new(&snapshot, &person, 2024);
        // At depth 5 the previous year is beyond the bound
        assert_eq!(
            pass.allowance_at("annual", 2020, 5).allowance,
            Allowance::Finite(dec("20"))
        );
        assert_eq!(
            pass.allowance("annual", 2020).allowance,
            Allowance::Finite(dec("25"))
        );
    }

    #[test]
    fn test_two_category_cycle_terminates() {
        let mut person = Person::new("p1");
        for year in 2000..=2024 {
            let mut annual = carrying_policy("20", "5");
            annual.carry_over.target_category_id = Some("toil".to_string());
            let mut toil = carrying_policy("2", "5");
            toil.carry_over.target_category_id = Some("annual".to_string());
            person.set_policy("annual", year, annual);
            person.set_policy("toil", year, toil);
        }
        let snapshot = workspace(&person, vec![]);

        let mut pass = LedgerPass::new(&snapshot, &person, 2024);
        let resolution = pass.allowance("annual", 2024);

        assert!(resolution.allowance.finite().is_some());
        assert!(pass.deepest_depth().unwrap() <= MAX_CARRY_OVER_DEPTH);
    }

    #[test]
    fn test_shared_sources_are_memoized() {
        let mut person = Person::new("p1");
        person.set_policy("annual", 2023, carrying_policy("20", "5"));
        person.set_policy("annual", 2024, carrying_policy("20", "5"));
        let snapshot = workspace(&person, vec![]);

        let mut pass = LedgerPass::new(&snapshot, &person, 2024);
        let first = pass.allowance("annual", 2024);
        let memo_size = pass.allowance_memo.len();
        let second = pass.allowance("annual", 2024);

        assert_eq!(first, second);
        assert_eq!(pass.allowance_memo.len(), memo_size);
        assert!(pass.allowance_memo.contains_key(&("annual".to_string(), 2023, 1)));
    }
}
