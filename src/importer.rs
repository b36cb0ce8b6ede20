use std::path::Path;

use crate::error::{Result, VatMatchError};
use crate::models::{Cell, Ledger, LedgerKind};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[cfg(any(feature = "xlsx", test))]
pub fn excel_serial_to_datetime(serial: f64) -> Option<chrono::NaiveDateTime> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let secs = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    base.checked_add_signed(chrono::Duration::days(days))?
        .checked_add_signed(chrono::Duration::seconds(secs))
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv") || e.eq_ignore_ascii_case("txt"))
}

/// Index one past the last non-empty cell.
fn populated_width(row: &[Cell]) -> usize {
    row.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1)
}

// ---------------------------------------------------------------------------
// load_ledger
// ---------------------------------------------------------------------------

/// Load one ledger. `header_row` is the zero-based row holding the column
/// titles; every non-blank row below it is a record.
pub fn load_ledger(
    path: &Path,
    kind: LedgerKind,
    header_row: usize,
    sheet: Option<&str>,
) -> Result<Ledger> {
    if !path.exists() {
        return Err(VatMatchError::load(path, "file not found"));
    }
    let csv_source = is_csv(path);
    let grid = if csv_source {
        read_csv_grid(path)?
    } else {
        read_spreadsheet_grid(path, sheet)?
    };
    tracing::debug!(path = %path.display(), rows = grid.len(), "read source grid");
    let mut ledger = extract_ledger(path, kind, header_row, grid)?;
    if csv_source {
        parse_amount_columns(&mut ledger);
    }
    tracing::debug!(kind = kind.key(), records = ledger.len(), "loaded ledger");
    Ok(ledger)
}

/// Validate the header row width and cut the record rows out of a raw grid.
fn extract_ledger(
    path: &Path,
    kind: LedgerKind,
    header_row: usize,
    grid: Vec<Vec<Cell>>,
) -> Result<Ledger> {
    let expected = kind.columns().len();
    let schema_err = |found: usize, detail: String| VatMatchError::Schema {
        path: path.display().to_string(),
        expected,
        found,
        detail,
    };

    let Some(header) = grid.get(header_row) else {
        return Err(schema_err(
            0,
            format!("header row {} is past the end of the sheet ({} rows)", header_row + 1, grid.len()),
        ));
    };
    let header_width = populated_width(header);
    if header_width != expected {
        return Err(schema_err(header_width, format!("header row {}", header_row + 1)));
    }

    let mut rows = Vec::new();
    let mut blank_rows = 0usize;
    for (idx, raw) in grid.into_iter().enumerate().skip(header_row + 1) {
        let width = populated_width(&raw);
        if width == 0 {
            blank_rows += 1;
            continue;
        }
        if width > expected {
            return Err(schema_err(width, format!("row {}", idx + 1)));
        }
        let mut row = raw;
        row.truncate(expected);
        row.resize(expected, Cell::Empty);
        rows.push(row);
    }
    if blank_rows > 0 {
        tracing::debug!(kind = kind.key(), blank_rows, "skipped blank rows below header");
    }
    Ok(Ledger::new(kind, rows))
}

// ---------------------------------------------------------------------------
// CSV source
// ---------------------------------------------------------------------------

fn read_csv_grid(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let file = std::fs::File::open(path).map_err(|e| VatMatchError::load(path, e.to_string()))?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut grid = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        grid.push(
            record
                .iter()
                .map(|field| Cell::raw(&String::from_utf8_lossy(field)))
                .collect(),
        );
    }
    Ok(grid)
}

/// CSV fields arrive as text; only amount columns become numbers, so ids
/// such as `00001234` or document numbers keep their exact spelling.
fn parse_amount_columns(ledger: &mut Ledger) {
    let kind = ledger.kind;
    for row in &mut ledger.rows {
        for (col, cell) in row.iter_mut().enumerate() {
            if !kind.is_amount_col(col) {
                continue;
            }
            if let Cell::Text(s) = cell {
                *cell = Cell::from_text(s);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet source (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn convert_cell(data: &calamine::Data) -> Cell {
    use calamine::Data;
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => {
            if s.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Cell::Text(format!("#{e:?}")),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(Cell::Date)
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => crate::dates::parse_date_text(s)
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

#[cfg(feature = "xlsx")]
fn read_spreadsheet_grid(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<Cell>>> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| VatMatchError::load(path, format!("failed to open workbook: {e}")))?;
    let names = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| VatMatchError::load(path, format!("no sheet named '{wanted}'")))?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| VatMatchError::load(path, "workbook contains no sheets"))?,
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| VatMatchError::load(path, format!("failed to read sheet '{name}': {e}")))?;

    // Range may not begin at A1; rebuild absolute positions.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col as usize];
        cells.extend(row.iter().map(convert_cell));
        grid.push(cells);
    }
    Ok(grid)
}

#[cfg(not(feature = "xlsx"))]
fn read_spreadsheet_grid(path: &Path, _sheet: Option<&str>) -> Result<Vec<Vec<Cell>>> {
    Err(VatMatchError::load(
        path,
        "spreadsheet input requires the `xlsx` feature; use a .csv file instead",
    ))
}
