//! # Catalogs
//!
//! Fixed reference lists: the departments a request can come from, the
//! income and expense categories a ledger entry can be filed under, and the
//! default set of operators allowed to sign in.
//!
//! Lookups are exact (case-sensitive) for departments and categories, since
//! these values are stored verbatim and grouped on in reports. Operator name
//! matching is case-insensitive and returns the canonical spelling.

use crate::error::ValidationError;
use crate::ledger::TransactionType;

/// Departments that may submit fund requests.
pub const DEPARTMENTS: [&str; 17] = [
    "Operations",
    "Admin",
    "Technical",
    "Sanctuary",
    "Music",
    "Media",
    "Protocol",
    "Medical",
    "Hospitality",
    "Drama",
    "Innovation & Technology",
    "Finance",
    "Information Desk",
    "Office of the Senior Pastor",
    "Church Secretary",
    "Children's Department",
    "Others",
];

/// Categories for outgoing ledger entries.
pub const EXPENSE_CATEGORIES: [&str; 10] = [
    "Honorarium",
    "Welfare",
    "Fuel & Diesel",
    "Equipment Maintenance",
    "Evangelism & Missions",
    "Office Supplies",
    "Salaries & Stipends",
    "Capital Projects",
    "Utility Bills",
    "Miscellaneous",
];

/// Categories for incoming ledger entries.
pub const INCOME_CATEGORIES: [&str; 8] = [
    "Tithes",
    "Offering",
    "Thanksgiving",
    "Seed Faith",
    "First Fruit",
    "Project Offering",
    "Donations",
    "Other",
];

/// Operators permitted to sign in when no list is configured.
pub const DEFAULT_ALLOWED_USERS: [&str; 4] = ["Admin", "Finance", "Simon Priestley", "Medus"];

/// Actor name recorded for unattended actions such as public submissions.
pub const SYSTEM_ACTOR: &str = "System";

/// Validate a department name against [`DEPARTMENTS`].
pub fn validate_department(name: &str) -> Result<&'static str, ValidationError> {
    DEPARTMENTS
        .iter()
        .copied()
        .find(|d| *d == name)
        .ok_or_else(|| ValidationError::UnknownDepartment(name.to_string()))
}

/// The category list for a transaction type.
pub fn categories_for(kind: TransactionType) -> &'static [&'static str] {
    match kind {
        TransactionType::Income => &INCOME_CATEGORIES,
        TransactionType::Expense => &EXPENSE_CATEGORIES,
    }
}

/// Validate that `category` belongs to the catalog for `kind`.
pub fn validate_category(
    kind: TransactionType,
    category: &str,
) -> Result<&'static str, ValidationError> {
    categories_for(kind)
        .iter()
        .copied()
        .find(|c| *c == category)
        .ok_or_else(|| ValidationError::UnknownCategory {
            kind: kind.to_string(),
            category: category.to_string(),
        })
}

/// Resolve an operator name case-insensitively against `allowed`, returning
/// the canonical spelling from the list.
pub fn canonical_user<'a, S: AsRef<str>>(allowed: &'a [S], name: &str) -> Option<&'a str> {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    allowed
        .iter()
        .map(AsRef::as_ref)
        .find(|u| u.to_lowercase() == wanted)
}
