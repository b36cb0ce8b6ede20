use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt;
use crate::importer::load_ledger;
use crate::models::{Ledger, LedgerKind};
use crate::settings::{load_settings, shellexpand_path};

/// Print the first `n` records of a ledger under its schema headers.
pub fn print_head(ledger: &Ledger, n: usize) {
    let mut table = Table::new();
    table.set_header(ledger.columns().to_vec());
    for row in ledger.rows.iter().take(n) {
        table.add_row(row.iter().map(|c| Cell::new(fmt::cell(c))));
    }
    println!(
        "{} ({} rows)",
        format!("First rows of {}", ledger.kind.key()).bold(),
        ledger.len()
    );
    println!("{table}");
}

pub fn run(file: &str, kind: LedgerKind, header: Option<usize>, rows: usize, sheet: Option<String>) -> Result<()> {
    let settings = load_settings();
    let header = header.unwrap_or(match kind {
        LedgerKind::Expenses => settings.expenses_header_row,
        LedgerKind::Vat => settings.vat_header_row,
    });
    let sheet = sheet.or(settings.sheet);
    let ledger = load_ledger(&shellexpand_path(file), kind, header, sheet.as_deref())?;
    print_head(&ledger, rows);
    Ok(())
}
