//! Person model and weekend-observance rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::policy::Policy;

/// What happens to a public holiday that falls on a weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekendRule {
    /// The holiday is lost.
    #[default]
    Forfeit,
    /// The following Monday becomes a non-working day.
    MoveToMonday,
    /// The holiday adds a day to the person's lieu categories.
    AccrueToLieu,
}

/// Policies of one person, indexed by year and then by category id.
///
/// The nesting makes a second policy for the same (category, year) pair
/// unrepresentable.
pub type PolicyBook = BTreeMap<i32, BTreeMap<String, Policy>>;

/// A person whose leave is tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier for the person.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Weekend-observance rule for public holidays.
    #[serde(default)]
    pub weekend_rule: WeekendRule,
    /// Ids of the holiday calendars that apply to this person.
    #[serde(default)]
    pub holiday_config_ids: Vec<String>,
    /// Yearly policies.
    #[serde(default)]
    pub policies: PolicyBook,
}

impl Person {
    /// Creates a person with no calendars and no policies.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            weekend_rule: WeekendRule::Forfeit,
            holiday_config_ids: Vec::new(),
            policies: PolicyBook::new(),
        }
    }

    /// Returns the policy for a category in a year.
    pub fn policy(&self, category_id: &str, year: i32) -> Option<&Policy> {
        self.policies.get(&year)?.get(category_id)
    }

    /// Iterates over the (category id, policy) pairs of a year in id order.
    pub fn policies_for_year(&self, year: i32) -> impl Iterator<Item = (&str, &Policy)> {
        self.policies
            .get(&year)
            .into_iter()
            .flat_map(|by_category| by_category.iter().map(|(id, p)| (id.as_str(), p)))
    }

    /// Inserts or replaces the policy for a category in a year.
    ///
    /// Returns the policy that was replaced, if any.
    pub fn set_policy(
        &mut self,
        category_id: impl Into<String>,
        year: i32,
        policy: Policy,
    ) -> Option<Policy> {
        self.policies
            .entry(year)
            .or_default()
            .insert(category_id.into(), policy)
    }

    /// Removes every policy of a category across all years.
    ///
    /// Returns the number of policies removed.
    pub fn remove_category_policies(&mut self, category_id: &str) -> usize {
        let mut removed = 0;
        for by_category in self.policies.values_mut() {
            if by_category.remove(category_id).is_some() {
                removed += 1;
            }
        }
        self.policies.retain(|_, by_category| !by_category.is_empty());
        removed
    }

    /// Seeds a year with policies built from category defaults.
    ///
    /// Categories that already have a policy for the year are left untouched.
    /// Returns the number of policies created.
    pub fn seed_policies(&mut self, categories: &[Category], year: i32) -> usize {
        let by_category = self.policies.entry(year).or_default();
        let mut seeded = 0;
        for category in categories {
            if !by_category.contains_key(&category.id) {
                by_category.insert(category.id.clone(), category.seed_policy());
                seeded += 1;
            }
        }
        seeded
    }
}
