//! Rendering and persistence of analysis results.

mod ledger;
mod table;
mod writer;

pub use ledger::{LedgerEntry, RunLedger};
pub use table::{comparison_table, render_console, render_latex};
pub use writer::{write_comparison, write_comparison_file, write_fits, write_fits_file};
