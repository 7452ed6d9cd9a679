use super::types::{Ledger, Month, MonthlyInput, MonthlyResult};

/// Rate pre-filled into every month of a fresh grid, in percent per annum.
pub const DEFAULT_ANNUAL_RATE: f64 = 7.1;

/// Converts `balance * annual percent` into a monthly amount (12 months * 100).
pub const INTEREST_DIVISOR: f64 = 1200.0;

pub fn default_inputs(rate: f64) -> [MonthlyInput; 12] {
    Month::ALL.map(|month| MonthlyInput::new(month, rate))
}

/// Balance that earns interest for the month. After-cutoff deposits are
/// excluded and the figure never drops below zero.
pub fn lowest_balance(opening_balance: f64, input: &MonthlyInput) -> f64 {
    (opening_balance + input.deposit_before_cutoff - input.withdrawal).max(0.0)
}

/// Whole-unit monthly interest; `f64::round` rounds half away from zero.
pub fn monthly_interest(lowest_balance: f64, rate: f64) -> f64 {
    (lowest_balance * rate / INTEREST_DIVISOR).round()
}

/// Principal carried into the next month. May go negative; interest is not added.
pub fn closing_balance(opening_balance: f64, input: &MonthlyInput) -> f64 {
    opening_balance + input.deposit_before_cutoff + input.deposit_after_cutoff - input.withdrawal
}

pub fn compute_ledger(opening_balance: f64, inputs: &[MonthlyInput; 12]) -> Ledger {
    let mut running_balance = opening_balance;
    let mut total_interest = 0.0;

    let rows = std::array::from_fn(|idx| {
        let input = &inputs[idx];
        let lowest = lowest_balance(running_balance, input);
        let interest = monthly_interest(lowest, input.rate);
        let closing = closing_balance(running_balance, input);

        let row = MonthlyResult {
            month: input.month,
            opening_balance: running_balance,
            deposit_before_cutoff: input.deposit_before_cutoff,
            deposit_after_cutoff: input.deposit_after_cutoff,
            withdrawal: input.withdrawal,
            lowest_balance: lowest,
            rate: input.rate,
            interest,
            closing_balance: closing,
        };

        running_balance = closing;
        total_interest += interest;
        row
    });

    Ledger {
        rows,
        total_interest,
        final_principal: running_balance,
    }
}
