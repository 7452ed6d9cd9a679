//! Writers that turn a computed [`Ledger`](crate::core::Ledger) into downloadable documents.

pub mod statement;
pub mod table;

pub use statement::{STATEMENT_FILE_NAME, render_statement, render_statement_paged};
pub use table::{TABLE_FILE_NAME, read_inputs, table_bytes, write_table};
