use chrono::{NaiveDateTime, NaiveTime};

use crate::models::Cell;

/// Amount in the ledgers' own notation: `.` groups thousands, `,` marks
/// decimals (1.234,56).
pub fn amount(val: f64) -> String {
    let fixed = format!("{:.2}", val.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let digits = int_part.as_bytes();
    let groups: Vec<&str> = digits
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect();
    let sign = if val < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{},{dec_part}", groups.join("."))
}

/// Date-only when the time part is midnight.
pub fn datetime(dt: &NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Plain text rendering of a cell, as written to CSV and shown in previews.
pub fn cell(c: &Cell) -> String {
    match c {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.clone(),
        Cell::Number(n) => format!("{n}"),
        Cell::Date(dt) => datetime(dt),
    }
}
