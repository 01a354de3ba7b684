//! Dashboard aggregates.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ledger::{LedgerSummary, LedgerTransaction};
use crate::money::{Amount, SignedAmount};
use crate::request::{PaymentMethod, PaymentRequest, RequestStatus};

/// Paid request counts split by channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChannelBreakdown {
    /// Requests paid in cash.
    pub cash: usize,
    /// Requests paid by bank transfer or POS.
    pub digital: usize,
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    /// Sum of all income entries.
    #[schema(value_type = String)]
    pub total_income: Amount,
    /// Sum of all expense entries.
    #[schema(value_type = String)]
    pub total_expenses: Amount,
    /// `total_income - total_expenses`.
    #[schema(value_type = String)]
    pub balance: SignedAmount,
    /// Requests awaiting a decision.
    pub pending_requests: usize,
    /// Paid requests by channel.
    pub paid_by_channel: ChannelBreakdown,
    /// Sum of the amounts of all paid requests.
    #[schema(value_type = String)]
    pub total_disbursed: Amount,
}

impl DashboardStats {
    /// Aggregate over every ledger entry and request.
    pub fn compute<'a, T, R>(transactions: T, requests: R) -> Self
    where
        T: IntoIterator<Item = &'a LedgerTransaction>,
        R: IntoIterator<Item = &'a PaymentRequest>,
    {
        let ledger = LedgerSummary::from_transactions(transactions);

        let mut pending_requests = 0;
        let mut paid_by_channel = ChannelBreakdown::default();
        let mut disbursed: i64 = 0;
        for request in requests {
            match request.status {
                RequestStatus::Pending => pending_requests += 1,
                RequestStatus::Paid => {
                    match request.method {
                        PaymentMethod::Cash => paid_by_channel.cash += 1,
                        PaymentMethod::BankTransfer | PaymentMethod::Pos => {
                            paid_by_channel.digital += 1
                        }
                    }
                    disbursed = disbursed.saturating_add(request.amount.minor());
                }
                RequestStatus::Approved | RequestStatus::Rejected => {}
            }
        }

        Self {
            total_income: ledger.total_income,
            total_expenses: ledger.total_expense,
            balance: ledger.balance,
            pending_requests,
            paid_by_channel,
            total_disbursed: Amount::from_minor(disbursed).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{RequestId, TransactionId};
    use crate::ledger::TransactionType;
    use crate::request::BankDetails;
    use chrono::{NaiveDate, Utc};

    fn req(status: RequestStatus, method: PaymentMethod, naira: u32) -> PaymentRequest {
        let now = Utc::now();
        PaymentRequest {
            id: RequestId::new(),
            requester_name: "Tolu".into(),
            department: "Music".into(),
            amount: Amount::from_major(naira),
            purpose: "Strings".into(),
            method,
            date_needed: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            attachment_url: None,
            status,
            rejection_reason: None,
            bank_details: BankDetails::default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn tx(kind: TransactionType, naira: u32) -> LedgerTransaction {
        LedgerTransaction {
            id: TransactionId::new(),
            kind,
            category: "Other".into(),
            amount: Amount::from_major(naira),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            recorded_by: "Admin".into(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn computes_all_figures() {
        let requests = vec![
            req(RequestStatus::Pending, PaymentMethod::Cash, 10),
            req(RequestStatus::Pending, PaymentMethod::Pos, 10),
            req(RequestStatus::Paid, PaymentMethod::Cash, 100),
            req(RequestStatus::Paid, PaymentMethod::BankTransfer, 200),
            req(RequestStatus::Paid, PaymentMethod::Pos, 300),
            req(RequestStatus::Rejected, PaymentMethod::Cash, 999),
            req(RequestStatus::Approved, PaymentMethod::Cash, 999),
        ];
        let txs = vec![
            tx(TransactionType::Income, 5_000),
            tx(TransactionType::Expense, 1_250),
        ];
        let stats = DashboardStats::compute(&txs, &requests);
        assert_eq!(stats.pending_requests, 2);
        assert_eq!(stats.paid_by_channel, ChannelBreakdown { cash: 1, digital: 2 });
        assert_eq!(stats.total_disbursed, Amount::from_major(600));
        assert_eq!(stats.total_income, Amount::from_major(5_000));
        assert_eq!(stats.total_expenses, Amount::from_major(1_250));
        assert_eq!(stats.balance.minor(), 375_000);
    }

    #[test]
    fn empty_inputs_give_zeroes() {
        let stats = DashboardStats::compute(std::iter::empty(), std::iter::empty());
        assert_eq!(stats, DashboardStats::default());
    }
}
