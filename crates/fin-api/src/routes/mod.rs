//! # API Route Modules
//!
//! - `catalog`: reference lists (public).
//! - `requests`: submission and status lookup (public); review, approval
//!   and rejection (admin).
//! - `session`: passcode sign-in (public).
//! - `disbursements`: payout queue, payouts and history (admin).
//! - `ledger`: income/expense entries and summaries (admin).
//! - `audit`: hash-chained action log and verification (admin).
//! - `dashboard`: headline figures (admin).

pub mod audit;
pub mod catalog;
pub mod dashboard;
pub mod disbursements;
pub mod ledger;
pub mod requests;
pub mod session;
