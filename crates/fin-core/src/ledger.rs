//! # Ledger
//!
//! Independent income and expense entries used for overall financial
//! reporting. Ledger entries are not tied to fund requests; payouts are
//! tracked separately as disbursements.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::identity::TransactionId;
use crate::money::{Amount, SignedAmount};
use crate::temporal::MonthKey;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl TransactionType {
    /// Wire name (`INCOME`, `EXPENSE`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }

    /// Parse the wire name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "INCOME" => Some(Self::Income),
            "EXPENSE" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LedgerTransaction {
    /// Entry identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: TransactionId,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Catalog category for the entry's type.
    pub category: String,
    /// Entry amount.
    #[schema(value_type = String, example = "25000.00")]
    pub amount: Amount,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Value date of the entry.
    pub date: NaiveDate,
    /// Operator who recorded it.
    pub recorded_by: String,
    /// When it was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Sort entries newest value date first; entries on the same date keep the
/// most recently recorded first.
pub fn ledger_order(entries: &mut [LedgerTransaction]) {
    entries.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.recorded_at.cmp(&a.recorded_at))
    });
}

/// Totals over a set of ledger entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LedgerSummary {
    /// Month the summary covers, if filtered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "2024-03")]
    pub month: Option<MonthKey>,
    /// Sum of income entries.
    #[schema(value_type = String)]
    pub total_income: Amount,
    /// Sum of expense entries.
    #[schema(value_type = String)]
    pub total_expense: Amount,
    /// `total_income - total_expense`.
    #[schema(value_type = String)]
    pub balance: SignedAmount,
    /// Number of entries summarised.
    pub entry_count: usize,
}

impl LedgerSummary {
    /// Sum the given entries. Totals saturate rather than wrap on overflow.
    pub fn from_transactions<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a LedgerTransaction>,
    {
        let mut income: i64 = 0;
        let mut expense: i64 = 0;
        let mut count = 0;
        for entry in entries {
            match entry.kind {
                TransactionType::Income => income = income.saturating_add(entry.amount.minor()),
                TransactionType::Expense => expense = expense.saturating_add(entry.amount.minor()),
            }
            count += 1;
        }
        // Both sums are of non-negative values, so they stay non-negative.
        let total_income = Amount::from_minor(income).unwrap_or_default();
        let total_expense = Amount::from_minor(expense).unwrap_or_default();
        Self {
            month: None,
            total_income,
            total_expense,
            balance: SignedAmount::difference(total_income, total_expense),
            entry_count: count,
        }
    }

    /// Sum the entries whose value date falls in `month`.
    pub fn for_month<'a, I>(entries: I, month: MonthKey) -> Self
    where
        I: IntoIterator<Item = &'a LedgerTransaction>,
    {
        let mut summary =
            Self::from_transactions(entries.into_iter().filter(|e| month.contains_date(&e.date)));
        summary.month = Some(month);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(kind: TransactionType, naira: u32, date: &str) -> LedgerTransaction {
        LedgerTransaction {
            id: TransactionId::new(),
            kind,
            category: match kind {
                TransactionType::Income => "Tithes".into(),
                TransactionType::Expense => "Welfare".into(),
            },
            amount: Amount::from_major(naira),
            description: String::new(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            recorded_by: "Admin".into(),
            recorded_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn summary_balance_is_income_minus_expense() {
        let entries = vec![
            entry(TransactionType::Income, 1_000, "2024-03-01"),
            entry(TransactionType::Income, 500, "2024-03-02"),
            entry(TransactionType::Expense, 1_800, "2024-03-03"),
        ];
        let s = LedgerSummary::from_transactions(&entries);
        assert_eq!(s.total_income, Amount::from_major(1_500));
        assert_eq!(s.total_expense, Amount::from_major(1_800));
        assert_eq!(s.balance.minor(), -30_000);
        assert_eq!(s.entry_count, 3);
    }

    #[test]
    fn empty_summary_is_zero() {
        let s = LedgerSummary::from_transactions(std::iter::empty());
        assert_eq!(s.balance, SignedAmount::ZERO);
        assert_eq!(s.entry_count, 0);
    }

    #[test]
    fn month_filter_uses_value_date() {
        let entries = vec![
            entry(TransactionType::Income, 100, "2024-02-29"),
            entry(TransactionType::Income, 200, "2024-03-01"),
        ];
        let march = MonthKey::parse("2024-03").unwrap();
        let s = LedgerSummary::for_month(&entries, march);
        assert_eq!(s.total_income, Amount::from_major(200));
        assert_eq!(s.month, Some(march));
    }

    #[test]
    fn ledger_order_newest_date_first() {
        let mut entries = vec![
            entry(TransactionType::Income, 1, "2024-01-02"),
            entry(TransactionType::Income, 2, "2024-01-09"),
            entry(TransactionType::Income, 3, "2024-01-05"),
        ];
        ledger_order(&mut entries);
        let dates: Vec<String> = entries.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-09", "2024-01-05", "2024-01-02"]);
    }

    #[test]
    fn kind_serializes_as_type() {
        let json = serde_json::to_value(entry(TransactionType::Expense, 1, "2024-01-01")).unwrap();
        assert_eq!(json["type"], "EXPENSE");
        assert_eq!(json["amount"], "1.00");
    }
}
