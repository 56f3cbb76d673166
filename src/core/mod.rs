//! Core business logic - framework-agnostic ledger, balance and budget operations.
//!
//! Every operation takes the database connection explicitly; nothing here holds global
//! state, so a transport layer can share one connection across requests.

/// Wallet and savings bucket balances derived from postings
pub mod balance;
/// Monthly budgets keyed by category or savings bucket
pub mod budget;
/// Bulk delete, archive and restore of budgets
pub mod bulk;
/// Income and expense categories
pub mod category;
/// Copying a month's budgets into another month
pub mod copy;
/// Transactions and their double-entry postings
pub mod ledger;
/// Month keys and aggregation windows
pub mod month;
/// Savings goals
pub mod savings_bucket;
/// First-run reference data
pub mod seed;
/// Per-month budget vs. actual summaries
pub mod summary;
/// Money-holding accounts
pub mod wallet;
