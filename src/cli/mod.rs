pub mod config;
pub mod preview;
pub mod run;

use clap::{Parser, Subcommand};

use crate::models::LedgerKind;

#[derive(Parser)]
#[command(
    name = "vatmatch",
    version,
    about = "Cross-check an expenses ledger against a VAT purchases ledger by voucher."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile both ledgers and write the annotated workbook.
    Run {
        /// Expenses ledger (xlsx/xls/ods/csv)
        #[arg(long)]
        expenses: Option<String>,
        /// VAT purchases ledger (xlsx/xls/ods/csv)
        #[arg(long)]
        vat: Option<String>,
        /// Output path (.xlsx, or .csv for a pair of CSV files)
        #[arg(long, short)]
        output: Option<String>,
        /// Zero-based row holding the expenses column titles
        #[arg(long = "expenses-header")]
        expenses_header: Option<usize>,
        /// Zero-based row holding the VAT column titles
        #[arg(long = "vat-header")]
        vat_header: Option<usize>,
        /// Input sheet name (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,
        /// Skip the input previews
        #[arg(long, short)]
        quiet: bool,
    },
    /// Show the first rows of one ledger as it will be read.
    Preview {
        /// Ledger file
        file: String,
        /// Ledger layout: expenses or vat
        #[arg(long)]
        kind: LedgerKind,
        /// Zero-based header row (default: the configured offset for the kind)
        #[arg(long)]
        header: Option<usize>,
        /// Number of rows to show
        #[arg(long, default_value_t = 5)]
        rows: usize,
        /// Input sheet name (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,
    },
    /// View or change saved defaults.
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print the current settings.
    Show,
    /// Set one setting.
    Set {
        /// Setting name (e.g. vat_header_row)
        key: String,
        /// New value
        value: String,
    },
    /// Restore all defaults.
    Reset,
}
