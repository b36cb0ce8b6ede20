use std::path::{Path, PathBuf};

use crate::error::{Result, VatMatchError};
use crate::models::{AnnotatedLedger, Reconciliation};

/// Section names for the two annotated tables.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub expenses_sheet: String,
    pub vat_sheet: String,
}

impl ExportOptions {
    /// Both sections need distinct names; sheet names and most filesystems
    /// ignore case.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.expenses_sheet.trim().is_empty() || self.vat_sheet.trim().is_empty() {
            return Err("section names must not be empty".to_string());
        }
        if self.expenses_sheet.to_lowercase() == self.vat_sheet.to_lowercase() {
            return Err(format!(
                "expenses and vat sections share the name '{}'",
                self.expenses_sheet
            ));
        }
        Ok(())
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            expenses_sheet: "expenses".to_string(),
            vat_sheet: "vat".to_string(),
        }
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// `out/gastos_iva.csv` + `vat` -> `out/gastos_iva-vat.csv`
pub fn csv_section_path(path: &Path, section: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "reconciliation".to_string());
    path.with_file_name(format!("{stem}-{section}.csv"))
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write every buffer to a temp sibling first, then move them all into place.
/// Nothing lands at a destination unless every temp write succeeded.
fn write_all_or_nothing(outputs: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    let mut staged = Vec::new();
    for (path, bytes) in outputs {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| VatMatchError::export(path, e.to_string()))?;
        }
        let tmp = temp_path(path);
        if let Err(e) = std::fs::write(&tmp, bytes) {
            let _ = std::fs::remove_file(&tmp);
            for (t, _) in &staged {
                let _ = std::fs::remove_file(t);
            }
            return Err(VatMatchError::export(path, e.to_string()));
        }
        staged.push((tmp, path.clone()));
    }
    let mut placed: Vec<&PathBuf> = Vec::new();
    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(tmp, path) {
            for done in &placed {
                let _ = std::fs::remove_file(done);
            }
            for (t, _) in &staged[i..] {
                let _ = std::fs::remove_file(t);
            }
            tracing::warn!(path = %path.display(), rolled_back = placed.len(), "export aborted");
            return Err(VatMatchError::export(path, e.to_string()));
        }
        placed.push(path);
    }
    Ok(())
}

/// Write both annotated tables. Returns the files written.
pub fn export(recon: &Reconciliation, path: &Path, opts: &ExportOptions) -> Result<Vec<PathBuf>> {
    opts.validate().map_err(|reason| VatMatchError::export(path, reason))?;
    let outputs = if is_csv(path) {
        vec![
            (csv_section_path(path, &opts.expenses_sheet), render_csv(&recon.expenses, path)?),
            (csv_section_path(path, &opts.vat_sheet), render_csv(&recon.vat, path)?),
        ]
    } else {
        vec![(path.to_path_buf(), render_xlsx(recon, path, opts)?)]
    };
    write_all_or_nothing(&outputs)?;
    let written: Vec<PathBuf> = outputs.into_iter().map(|(p, _)| p).collect();
    for p in &written {
        tracing::info!(path = %p.display(), "wrote reconciliation output");
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn render_csv(table: &AnnotatedLedger, path: &Path) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(table.headers())?;
    for row in &table.rows {
        let mut record: Vec<String> = row.cells.iter().map(crate::fmt::cell).collect();
        record.push(row.flag.label().to_string());
        wtr.write_record(&record)?;
    }
    wtr.into_inner()
        .map_err(|e| VatMatchError::export(path, e.to_string()))
}

// ---------------------------------------------------------------------------
// XLSX (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
pub fn datetime_to_excel_serial(dt: &chrono::NaiveDateTime) -> f64 {
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let secs = (*dt - base).num_seconds() as f64;
    secs / 86_400.0
}

#[cfg(feature = "xlsx")]
fn write_section(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    table: &AnnotatedLedger,
) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
    use crate::models::Cell;
    use rust_xlsxwriter::Format;

    let bold = Format::new().set_bold();
    let date_fmt = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_fmt = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (col, name) in table.headers().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let r = idx as u32 + 1;
        for (col, cell) in row.cells.iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(r, c, *n)?;
                }
                Cell::Date(dt) => {
                    let fmt = if dt.time() == chrono::NaiveTime::MIN { &date_fmt } else { &datetime_fmt };
                    worksheet.write_number_with_format(r, c, datetime_to_excel_serial(dt), fmt)?;
                }
            }
        }
        let label = row.flag.label();
        if !label.is_empty() {
            worksheet.write_string(r, row.cells.len() as u16, label)?;
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();
    Ok(())
}

#[cfg(feature = "xlsx")]
fn render_xlsx(recon: &Reconciliation, path: &Path, opts: &ExportOptions) -> Result<Vec<u8>> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    for (name, table) in [(&opts.expenses_sheet, &recon.expenses), (&opts.vat_sheet, &recon.vat)] {
        let worksheet = workbook
            .add_worksheet()
            .set_name(name)
            .map_err(|e| VatMatchError::export(path, format!("invalid sheet name '{name}': {e}")))?;
        write_section(worksheet, table)
            .map_err(|e| VatMatchError::export(path, format!("failed to write sheet '{name}': {e}")))?;
    }
    workbook
        .save_to_buffer()
        .map_err(|e| VatMatchError::export(path, format!("failed to build workbook: {e}")))
}

#[cfg(not(feature = "xlsx"))]
fn render_xlsx(_recon: &Reconciliation, path: &Path, _opts: &ExportOptions) -> Result<Vec<u8>> {
    Err(VatMatchError::export(
        path,
        "spreadsheet output requires the `xlsx` feature; use a .csv output path instead",
    ))
}
