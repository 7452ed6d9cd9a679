use std::io::{Read, Write};

use serde::Deserialize;

use crate::core::{Ledger, Month, MonthlyInput};
use crate::error::LedgerError;

pub const TABLE_FILE_NAME: &str = "PF_Ledger_Calculated.csv";

pub const TABLE_HEADERS: [&str; 9] = [
    "Month",
    "Opening Balance",
    "Dep (<15th)",
    "Dep (>15th)",
    "Withdrawal",
    "Lowest Balance",
    "Rate (%)",
    "Interest",
    "Closing Balance",
];

pub fn write_table<W: Write>(ledger: &Ledger, writer: W) -> Result<(), LedgerError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(TABLE_HEADERS)?;

    for row in &ledger.rows {
        wtr.write_record([
            row.month.label().to_string(),
            format!("{:.2}", row.opening_balance),
            format!("{:.2}", row.deposit_before_cutoff),
            format!("{:.2}", row.deposit_after_cutoff),
            format!("{:.2}", row.withdrawal),
            format!("{:.2}", row.lowest_balance),
            row.rate.to_string(),
            format!("{:.2}", row.interest),
            format!("{:.2}", row.closing_balance),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn table_bytes(ledger: &Ledger) -> Result<Vec<u8>, LedgerError> {
    let mut buf = Vec::new();
    write_table(ledger, &mut buf)?;
    Ok(buf)
}

#[derive(Debug, Deserialize)]
struct InputRecord {
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Dep_Before_15", default)]
    deposit_before_cutoff: f64,
    #[serde(rename = "Dep_After_15", default)]
    deposit_after_cutoff: f64,
    #[serde(rename = "Withdrawal", default)]
    withdrawal: f64,
    #[serde(rename = "Rate")]
    rate: f64,
}

/// Loads the 12-row input grid (`Month,Dep_Before_15,Dep_After_15,Withdrawal,Rate`).
/// Rows must appear exactly once each, in APR..MAR order.
pub fn read_inputs<R: Read>(reader: R) -> Result<[MonthlyInput; 12], LedgerError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut rows = Vec::with_capacity(12);
    for record in rdr.deserialize::<InputRecord>() {
        let record = record?;
        let month = Month::from_label(&record.month)
            .ok_or_else(|| LedgerError::UnknownMonth(record.month.clone()))?;
        rows.push(MonthlyInput {
            month,
            deposit_before_cutoff: record.deposit_before_cutoff,
            deposit_after_cutoff: record.deposit_after_cutoff,
            withdrawal: record.withdrawal,
            rate: record.rate,
        });
    }

    let found = rows.len();
    let inputs: [MonthlyInput; 12] = rows
        .try_into()
        .map_err(|_| LedgerError::RowCount { expected: 12, found })?;

    for (position, (input, expected)) in inputs.iter().zip(Month::ALL).enumerate() {
        if input.month != expected {
            return Err(LedgerError::MonthOrder {
                position: position + 1,
                expected,
                found: input.month,
            });
        }
    }

    Ok(inputs)
}
