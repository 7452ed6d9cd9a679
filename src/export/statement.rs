use crate::core::{Ledger, MonthlyResult};

pub const STATEMENT_FILE_NAME: &str = "PF_Statement.txt";
pub const STATEMENT_TITLE: &str = "Provident Fund Ledger Statement";

/// Table rows that fit on one page under the title and column header.
pub const ROWS_PER_PAGE: usize = 15;

const PAGE_BREAK: &str = "\u{000C}";

const COLUMNS: [(&str, usize); 9] = [
    ("Month", 7),
    ("Opening", 15),
    ("Dep<15", 13),
    ("Dep>15", 13),
    ("Withdrawal", 13),
    ("LowestBalance", 15),
    ("Rate", 10),
    ("Interest", 10),
    ("Closing", 15),
];

fn page_width() -> usize {
    COLUMNS.iter().map(|(_, width)| width + 1).sum::<usize>() + 1
}

pub fn render_statement(ledger: &Ledger) -> String {
    render_statement_paged(ledger, ROWS_PER_PAGE)
}

/// Lays the ledger out in pages of at most `rows_per_page` months. The column
/// header repeats on every page and the year totals close the last one.
pub fn render_statement_paged(ledger: &Ledger, rows_per_page: usize) -> String {
    let chunks: Vec<&[MonthlyResult]> = ledger.rows.chunks(rows_per_page.max(1)).collect();
    let page_count = chunks.len();

    let pages: Vec<String> = chunks
        .iter()
        .enumerate()
        .map(|(idx, rows)| {
            let mut page = String::new();
            push_line(&mut page, &center(STATEMENT_TITLE));
            page.push('\n');
            push_table(&mut page, rows);

            if idx + 1 == page_count {
                page.push('\n');
                push_line(
                    &mut page,
                    &format!(
                        "Total Interest for the Year: {}",
                        format_grouped(ledger.total_interest)
                    ),
                );
                push_line(
                    &mut page,
                    &format!(
                        "Final Balance (Principal + Interest): {}",
                        format_grouped(ledger.final_balance())
                    ),
                );
            }

            page.push('\n');
            push_line(&mut page, &center(&format!("Page {}", idx + 1)));
            page
        })
        .collect();

    pages.join(PAGE_BREAK)
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn center(text: &str) -> String {
    format!("{text:^width$}", width = page_width())
}

fn border() -> String {
    let mut line = String::from("+");
    for (_, width) in COLUMNS {
        line.push_str(&"-".repeat(width));
        line.push('+');
    }
    line
}

fn push_table(out: &mut String, rows: &[MonthlyResult]) {
    let border = border();
    push_line(out, &border);

    let mut header = String::from("|");
    for (label, width) in COLUMNS {
        header.push_str(&format!("{label:^width$}|"));
    }
    push_line(out, &header);
    push_line(out, &border);

    for row in rows {
        let cells = [
            row.month.label().to_string(),
            format!("{:.2}", row.opening_balance),
            format!("{:.2}", row.deposit_before_cutoff),
            format!("{:.2}", row.deposit_after_cutoff),
            format!("{:.2}", row.withdrawal),
            format!("{:.2}", row.lowest_balance),
            row.rate.to_string(),
            format!("{:.2}", row.interest),
            format!("{:.2}", row.closing_balance),
        ];
        let mut line = String::from("|");
        for (idx, (cell, (_, width))) in cells.iter().zip(COLUMNS).enumerate() {
            let inner = width - 1;
            if idx == 0 {
                line.push_str(&format!(" {cell:<inner$}|"));
            } else {
                line.push_str(&format!("{cell:>inner$} |"));
            }
        }
        push_line(out, &line);
    }

    push_line(out, &border);
}

/// Two decimals with comma thousands separators: `1234567.5` -> `1,234,567.50`.
pub fn format_grouped(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}
