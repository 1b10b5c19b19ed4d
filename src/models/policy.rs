//! Per-person, per-year leave policy.
//!
//! A [`Policy`] configures how many days a person accrues in one category for
//! one year and whether unused days carry into the following year.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How an accrual amount is granted over the year.
///
/// The period is descriptive; the accrual amount is always the yearly
/// entitlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualPeriod {
    /// The whole amount is granted at the start of the year.
    #[default]
    LumpSum,
    /// The amount is granted once per year.
    Yearly,
    /// The amount accrues in monthly instalments.
    Monthly,
}

/// Accrual rule of a policy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccrualRule {
    /// How the amount is granted.
    #[serde(default)]
    pub period: AccrualPeriod,
    /// Days granted for the year.
    #[serde(default)]
    pub amount: Decimal,
}

/// When carried-over days expire in the receiving year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryType {
    /// Carried-over days never expire.
    #[default]
    None,
    /// Carried-over days expire a number of months into the year.
    Months,
    /// Carried-over days expire on a fixed month and day.
    FixedDate,
}

/// The raw expiry value: a month count or a `MM-DD` date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpiryValue {
    /// A number of months.
    Months(u32),
    /// A textual value, normally `MM-DD`.
    Text(String),
}

/// Carry-over rule of a policy.
///
/// # Example
///
/// ```
/// use entitlement_engine::models::{CarryOverRule, ExpiryType, ExpiryValue};
/// use rust_decimal::Decimal;
///
/// let rule = CarryOverRule {
///     enabled: true,
///     max_days: Decimal::new(5, 0),
///     expiry_type: ExpiryType::Months,
///     expiry_value: Some(ExpiryValue::Months(3)),
///     target_category_id: None,
/// };
/// assert_eq!(rule.expiry_label(2024).as_deref(), Some("Expires 31 Mar 2024"));
/// assert_eq!(rule.target_or("annual"), "annual");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CarryOverRule {
    /// Whether unused days carry into the following year.
    #[serde(default)]
    pub enabled: bool,
    /// Maximum days carried over.
    #[serde(default)]
    pub max_days: Decimal,
    /// Expiry kind in the receiving year.
    #[serde(default)]
    pub expiry_type: ExpiryType,
    /// Expiry parameter for the expiry kind.
    #[serde(default)]
    pub expiry_value: Option<ExpiryValue>,
    /// Category receiving the days; the policy's own category when unset.
    #[serde(default)]
    pub target_category_id: Option<String>,
}

impl CarryOverRule {
    /// Returns the category that receives carried-over days.
    pub fn target_or<'a>(&'a self, own_category_id: &'a str) -> &'a str {
        self.target_category_id.as_deref().unwrap_or(own_category_id)
    }

    /// Returns the expiry date of days carried into `year`, if any.
    ///
    /// `months` expiries end on the last day of the n-th month of the year;
    /// `fixed_date` expiries accept `MM-DD` (a leading year is ignored).
    /// Unparseable values yield `None`.
    pub fn expiry_date(&self, year: i32) -> Option<NaiveDate> {
        match self.expiry_type {
            ExpiryType::None => None,
            ExpiryType::Months => {
                let months = match self.expiry_value.as_ref()? {
                    ExpiryValue::Months(months) => *months,
                    ExpiryValue::Text(text) => text.trim().parse().ok()?,
                };
                if months == 0 {
                    return None;
                }
                NaiveDate::from_ymd_opt(year, 1, 1)?
                    .checked_add_months(Months::new(months))?
                    .pred_opt()
            }
            ExpiryType::FixedDate => {
                let text = match self.expiry_value.as_ref()? {
                    ExpiryValue::Text(text) => text.trim(),
                    ExpiryValue::Months(_) => return None,
                };
                let parts: Vec<&str> = text.split('-').collect();
                let (month, day) = match parts.as_slice() {
                    [month, day] | [_, month, day] => (month.parse().ok()?, day.parse().ok()?),
                    _ => return None,
                };
                NaiveDate::from_ymd_opt(year, month, day)
            }
        }
    }

    /// Returns a human-readable expiry label for days carried into `year`.
    pub fn expiry_label(&self, year: i32) -> Option<String> {
        self.expiry_date(year)
            .filter(|date| date.year() == year)
            .map(|date| format!("Expires {}", date.format("%-d %b %Y")))
    }
}

/// A person's configuration of one category for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// The accrual rule.
    #[serde(default)]
    pub accrual: AccrualRule,
    /// Overrides the category's unlimited flag when set.
    #[serde(default)]
    pub is_unlimited: Option<bool>,
    /// Inactive policies are hidden from the ledger.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// The carry-over rule.
    #[serde(default)]
    pub carry_over: CarryOverRule,
}

fn default_active() -> bool {
    true
}

impl Policy {
    /// Creates an active policy granting `amount` days with no carry-over.
    pub fn with_amount(amount: Decimal) -> Self {
        Self {
            accrual: AccrualRule {
                period: AccrualPeriod::LumpSum,
                amount,
            },
            is_unlimited: None,
            is_active: true,
            carry_over: CarryOverRule::default(),
        }
    }

    /// Resolves the unlimited flag against the category's flag.
    pub fn is_unlimited_with(&self, category_unlimited: bool) -> bool {
        self.is_unlimited.unwrap_or(category_unlimited)
    }
}
