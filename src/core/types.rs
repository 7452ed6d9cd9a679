use std::fmt;

use serde::{Deserialize, Serialize};

/// Months of the April-March provident fund year, in ledger order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Month {
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
    Jan,
    Feb,
    Mar,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
        Month::Jan,
        Month::Feb,
        Month::Mar,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Month::Apr => "APR",
            Month::May => "MAY",
            Month::Jun => "JUN",
            Month::Jul => "JUL",
            Month::Aug => "AUG",
            Month::Sep => "SEP",
            Month::Oct => "OCT",
            Month::Nov => "NOV",
            Month::Dec => "DEC",
            Month::Jan => "JAN",
            Month::Feb => "FEB",
            Month::Mar => "MAR",
        }
    }

    pub fn from_label(label: &str) -> Option<Month> {
        let label = label.trim();
        Month::ALL
            .into_iter()
            .find(|month| month.label().eq_ignore_ascii_case(label))
    }

    /// Zero-based slot within the ledger year (APR = 0, MAR = 11).
    pub fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyInput {
    pub month: Month,
    /// Deposits credited on or before the 15th; they count toward the lowest balance.
    pub deposit_before_cutoff: f64,
    pub deposit_after_cutoff: f64,
    pub withdrawal: f64,
    /// Annual rate in percent, e.g. 7.1.
    pub rate: f64,
}

impl MonthlyInput {
    pub fn new(month: Month, rate: f64) -> Self {
        Self {
            month,
            deposit_before_cutoff: 0.0,
            deposit_after_cutoff: 0.0,
            withdrawal: 0.0,
            rate,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyResult {
    pub month: Month,
    pub opening_balance: f64,
    pub deposit_before_cutoff: f64,
    pub deposit_after_cutoff: f64,
    pub withdrawal: f64,
    pub lowest_balance: f64,
    pub rate: f64,
    pub interest: f64,
    pub closing_balance: f64,
}

/// A full year of results. Interest is kept out of the principal and only
/// combined with it by [`Ledger::final_balance`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    pub rows: [MonthlyResult; 12],
    pub total_interest: f64,
    pub final_principal: f64,
}

impl Ledger {
    pub fn final_balance(&self) -> f64 {
        self.final_principal + self.total_interest
    }
}
