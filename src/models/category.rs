//! Leave category model.
//!
//! A [`Category`] is a workspace-wide leave type definition such as Annual,
//! Sick or Lieu. Its default accrual and carry-over rules are only used to
//! seed a person's [`Policy`] when none exists yet.

use serde::{Deserialize, Serialize};

use super::policy::{AccrualRule, CarryOverRule, Policy};

/// The semantic class of a leave category.
///
/// Only [`CategoryClass::Lieu`] changes calculation behaviour: lieu
/// categories collect weekend holidays for people whose weekend rule is
/// `accrue_to_lieu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryClass {
    /// Annual (vacation) leave.
    #[default]
    Annual,
    /// Time off in lieu.
    Lieu,
    /// Seniority or long-service leave.
    Seniority,
    /// Sick leave.
    Sick,
    /// Any workspace-defined category.
    Custom,
}

/// A leave type definition shared across a workspace.
///
/// # Example
///
/// ```
/// use entitlement_engine::models::{Category, CategoryClass};
///
/// let sick = Category {
///     id: "sick".to_string(),
///     name: "Sick Leave".to_string(),
///     class: CategoryClass::Sick,
///     is_unlimited: true,
///     default_accrual: Default::default(),
///     default_carry_over: Default::default(),
/// };
/// assert!(!sick.is_lieu());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier for the category.
    pub id: String,
    /// Display name (e.g., "Annual Leave").
    pub name: String,
    /// Semantic class of the category.
    #[serde(default)]
    pub class: CategoryClass,
    /// Whether the category grants an unbounded allowance.
    #[serde(default)]
    pub is_unlimited: bool,
    /// Accrual used when seeding a new policy.
    #[serde(default)]
    pub default_accrual: AccrualRule,
    /// Carry-over used when seeding a new policy.
    #[serde(default)]
    pub default_carry_over: CarryOverRule,
}

impl Category {
    /// Returns true if the category collects lieu days.
    pub fn is_lieu(&self) -> bool {
        self.class == CategoryClass::Lieu
    }

    /// Builds a policy from this category's defaults.
    ///
    /// The seeded policy leaves `is_unlimited` unset so it keeps following the
    /// category flag.
    pub fn seed_policy(&self) -> Policy {
        Policy {
            accrual: self.default_accrual.clone(),
            is_unlimited: None,
            is_active: true,
            carry_over: self.default_carry_over.clone(),
        }
    }
}
