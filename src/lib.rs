//! Provident fund ledger calculator.
//!
//! [`core::compute_ledger`] turns an opening balance and twelve April-March
//! monthly entries into a ledger of lowest balances, interest and closing
//! balances. [`export`] renders that ledger as a CSV table or a paged
//! statement, and [`api`] serves the data-entry page and JSON endpoints.

pub mod api;
pub mod core;
pub mod error;
pub mod export;
pub mod telemetry;

pub use crate::core::{Ledger, Month, MonthlyInput, MonthlyResult, compute_ledger};
pub use crate::error::LedgerError;
