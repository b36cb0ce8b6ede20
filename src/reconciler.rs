use std::collections::HashSet;

use crate::dates::check_date;
use crate::models::{
    AnnotatedLedger, AnnotatedRow, Cell, Ledger, LedgerKind, MatchFlag, Reconciliation, DATE_COL,
    VOUCHER_COL,
};

/// Date-column text that marks a per-concept subtotal line in the expenses
/// ledger.
pub const SUBTOTAL_MARKER: &str = "Total del concepto:";

/// Strip spaces and hyphens so "A-0001 234" and "A0001234" compare equal.
pub fn normalize_voucher(raw: &str) -> String {
    raw.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

pub fn is_subtotal_row(row: &[Cell]) -> bool {
    row.get(DATE_COL)
        .and_then(Cell::as_text)
        .is_some_and(|s| s.contains(SUBTOTAL_MARKER))
}

/// Copy a row with its voucher cell replaced by the normalized text.
fn normalized_row(row: &[Cell]) -> (Vec<Cell>, String) {
    let mut cells = row.to_vec();
    let voucher = cells
        .get(VOUCHER_COL)
        .map(|c| normalize_voucher(&c.voucher_text()))
        .unwrap_or_default();
    if let Some(slot) = cells.get_mut(VOUCHER_COL) {
        *slot = Cell::Text(voucher.clone());
    }
    (cells, voucher)
}

fn presence(found: bool) -> MatchFlag {
    if found {
        MatchFlag::Present
    } else {
        MatchFlag::Absent
    }
}

/// Cross-check the two ledgers. Inputs are left untouched; the result holds
/// new tables with normalized vouchers and one flag per row.
pub fn reconcile(expenses: &Ledger, vat: &Ledger) -> Reconciliation {
    let vat_rows: Vec<(Vec<Cell>, String)> = vat.rows.iter().map(|r| normalized_row(r)).collect();

    let mut subtotals_removed = 0usize;
    let expense_rows: Vec<(Vec<Cell>, String)> = expenses
        .rows
        .iter()
        .filter(|r| {
            let subtotal = is_subtotal_row(r);
            if subtotal {
                subtotals_removed += 1;
            }
            !subtotal
        })
        .map(|r| normalized_row(r))
        .collect();

    let in_vat: HashSet<&str> = vat_rows.iter().map(|(_, v)| v.as_str()).collect();
    let in_expenses: HashSet<&str> = expense_rows.iter().map(|(_, v)| v.as_str()).collect();
    tracing::debug!(
        expenses = expense_rows.len(),
        vat = vat_rows.len(),
        subtotals_removed,
        "built voucher lookups"
    );

    let annotated_expenses: Vec<AnnotatedRow> = expense_rows
        .iter()
        .map(|(cells, voucher)| {
            let date = cells.get(DATE_COL).unwrap_or(&Cell::Empty);
            let flag = if check_date(date).is_valid() {
                presence(in_vat.contains(voucher.as_str()))
            } else {
                MatchFlag::NotApplicable
            };
            AnnotatedRow {
                cells: cells.clone(),
                flag,
            }
        })
        .collect();

    let annotated_vat: Vec<AnnotatedRow> = vat_rows
        .iter()
        .map(|(cells, voucher)| AnnotatedRow {
            cells: cells.clone(),
            flag: presence(in_expenses.contains(voucher.as_str())),
        })
        .collect();

    Reconciliation {
        expenses: AnnotatedLedger {
            kind: LedgerKind::Expenses,
            rows: annotated_expenses,
        },
        vat: AnnotatedLedger {
            kind: LedgerKind::Vat,
            rows: annotated_vat,
        },
        subtotals_removed,
    }
}
