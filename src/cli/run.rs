use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::preview::print_head;
use crate::error::Result;
use crate::exporter::{export, ExportOptions};
use crate::fmt::amount;
use crate::importer::load_ledger;
use crate::models::{AnnotatedLedger, LedgerKind, MatchFlag, Reconciliation};
use crate::reconciler::reconcile;
use crate::settings::{load_settings, shellexpand_path};

/// Command-line overrides; anything unset falls back to saved settings.
#[derive(Debug, Default)]
pub struct RunArgs {
    pub expenses: Option<String>,
    pub vat: Option<String>,
    pub output: Option<String>,
    pub expenses_header: Option<usize>,
    pub vat_header: Option<usize>,
    pub sheet: Option<String>,
    pub quiet: bool,
}

const PREVIEW_ROWS: usize = 5;

fn flag_name(flag: MatchFlag) -> colored::ColoredString {
    match flag {
        MatchFlag::Present => "matched".green(),
        MatchFlag::Absent => "missing".red(),
        MatchFlag::NotApplicable => "no date".dimmed(),
    }
}

fn add_summary_rows(table: &mut Table, ledger: &AnnotatedLedger, flags: &[MatchFlag]) {
    for flag in flags {
        table.add_row(vec![
            Cell::new(ledger.kind.key()),
            Cell::new(flag_name(*flag)),
            Cell::new(ledger.count(*flag)),
            Cell::new(amount(ledger.total(*flag))),
        ]);
    }
}

pub fn print_summary(recon: &Reconciliation) {
    let mut table = Table::new();
    table.set_header(vec!["Ledger", "Status", "Rows", "Total"]);
    add_summary_rows(
        &mut table,
        &recon.expenses,
        &[MatchFlag::Present, MatchFlag::Absent, MatchFlag::NotApplicable],
    );
    add_summary_rows(&mut table, &recon.vat, &[MatchFlag::Present, MatchFlag::Absent]);
    println!("{table}");
    if recon.subtotals_removed > 0 {
        println!("{} subtotal rows dropped from expenses", recon.subtotals_removed);
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    let settings = load_settings();
    let expenses_path = shellexpand_path(args.expenses.as_deref().unwrap_or(&settings.expenses_path));
    let vat_path = shellexpand_path(args.vat.as_deref().unwrap_or(&settings.vat_path));
    let output_path = shellexpand_path(args.output.as_deref().unwrap_or(&settings.output_path));
    let sheet = args.sheet.or(settings.sheet);

    let expenses = load_ledger(
        &expenses_path,
        LedgerKind::Expenses,
        args.expenses_header.unwrap_or(settings.expenses_header_row),
        sheet.as_deref(),
    )?;
    let vat = load_ledger(
        &vat_path,
        LedgerKind::Vat,
        args.vat_header.unwrap_or(settings.vat_header_row),
        sheet.as_deref(),
    )?;

    for ledger in [&expenses, &vat] {
        if ledger.is_empty() {
            tracing::warn!(kind = ledger.kind.key(), "ledger has no records below its header row");
        }
    }

    if !args.quiet {
        print_head(&expenses, PREVIEW_ROWS);
        print_head(&vat, PREVIEW_ROWS);
    }

    let recon = reconcile(&expenses, &vat);
    let opts = ExportOptions {
        expenses_sheet: settings.expenses_sheet_name,
        vat_sheet: settings.vat_sheet_name,
    };
    let written = export(&recon, &output_path, &opts)?;

    print_summary(&recon);
    for path in written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
