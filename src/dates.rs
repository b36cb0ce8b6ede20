use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::Cell;

/// Outcome of classifying a ledger date cell. A failed parse is data, not an
/// error: callers branch on it, nothing is propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCheck {
    Parsed(NaiveDateTime),
    Invalid,
}

impl DateCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, DateCheck::Parsed(_))
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

// Day-first before month-first: the ledgers are exported with dd/mm/yyyy.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
];

pub fn parse_date_text(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Classify a date cell. Spreadsheet date cells are always valid; text is
/// tried against the known calendar layouts; blanks and bare numbers are not
/// dates.
pub fn check_date(cell: &Cell) -> DateCheck {
    match cell {
        Cell::Date(dt) => DateCheck::Parsed(*dt),
        Cell::Text(s) => parse_date_text(s).map_or(DateCheck::Invalid, DateCheck::Parsed),
        Cell::Empty | Cell::Number(_) => DateCheck::Invalid,
    }
}
