mod engine;
mod types;

pub use engine::{
    DEFAULT_ANNUAL_RATE, INTEREST_DIVISOR, closing_balance, compute_ledger, default_inputs,
    lowest_balance, monthly_interest,
};
pub use types::{Ledger, Month, MonthlyInput, MonthlyResult};
