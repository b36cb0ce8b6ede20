use chrono::NaiveDateTime;

/// A single spreadsheet value as read from either ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl Cell {
    /// Build a cell from raw CSV text: blank becomes `Empty`, plain decimals
    /// become `Number`, anything else stays text.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(raw.to_string()),
        }
    }

    /// Keep raw text as-is; blank becomes `Empty`.
    pub fn raw(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text rendering used for voucher ids: integral numbers lose their
    /// fractional part so `1234.0` compares equal to `"1234"`.
    pub fn voucher_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Cell::Date(dt) => crate::fmt::datetime(dt),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger schemas
// ---------------------------------------------------------------------------

pub const EXPENSES_COLUMNS: &[&str] = &[
    "Fecha",
    "Comprobante",
    "Proveedor - Concepto",
    "Neto s/imp.",
    "Neto c/imp.",
    "Total c/IVA",
];

pub const VAT_COLUMNS: &[&str] = &[
    "Fecha",
    "Comprobante",
    "Proveedor",
    "Tipo/Nro.Doc.",
    "Neto",
    "IVA",
    "Sin créd.fis.",
    "No Gravado",
    "Ret./Per.",
    "Exentas",
    "Total",
];

pub const DATE_COL: usize = 0;
pub const VOUCHER_COL: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKind {
    Expenses,
    Vat,
}

impl LedgerKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Expenses => "expenses",
            Self::Vat => "vat",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::Expenses => EXPENSES_COLUMNS,
            Self::Vat => VAT_COLUMNS,
        }
    }

    /// Header appended by the reconciler: which ledger the voucher was
    /// looked up in.
    pub fn flag_column(&self) -> &'static str {
        match self {
            Self::Expenses => "en iva",
            Self::Vat => "en gastos",
        }
    }

    /// Money columns: everything after the descriptive leading columns.
    pub fn is_amount_col(&self, col: usize) -> bool {
        let first = match self {
            Self::Expenses => 3,
            Self::Vat => 4,
        };
        col >= first && col < self.columns().len()
    }

    /// Column summed in the run summary.
    pub fn total_col(&self) -> usize {
        self.columns().len() - 1
    }
}

impl std::str::FromStr for LedgerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "expenses" | "gastos" => Ok(Self::Expenses),
            "vat" | "iva" => Ok(Self::Vat),
            other => Err(format!("unknown ledger kind: {other} (expected expenses or vat)")),
        }
    }
}

/// A loaded ledger: fixed schema, positional rows, each padded to the schema
/// width.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub kind: LedgerKind,
    pub rows: Vec<Vec<Cell>>,
}

impl Ledger {
    pub fn new(kind: LedgerKind, rows: Vec<Vec<Cell>>) -> Self {
        Self { kind, rows }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.kind.columns()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reconciliation output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchFlag {
    Present,
    Absent,
    NotApplicable,
}

impl MatchFlag {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Present => "Sí",
            Self::Absent => "No",
            Self::NotApplicable => "",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnnotatedRow {
    pub cells: Vec<Cell>,
    pub flag: MatchFlag,
}

#[derive(Debug, Clone)]
pub struct AnnotatedLedger {
    pub kind: LedgerKind,
    pub rows: Vec<AnnotatedRow>,
}

impl AnnotatedLedger {
    /// Input columns followed by the flag column.
    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers = self.kind.columns().to_vec();
        headers.push(self.kind.flag_column());
        headers
    }

    pub fn flags(&self) -> Vec<MatchFlag> {
        self.rows.iter().map(|r| r.flag).collect()
    }

    pub fn count(&self, flag: MatchFlag) -> usize {
        self.rows.iter().filter(|r| r.flag == flag).count()
    }

    /// Sum of the ledger's total column over rows carrying `flag`.
    pub fn total(&self, flag: MatchFlag) -> f64 {
        let col = self.kind.total_col();
        self.rows
            .iter()
            .filter(|r| r.flag == flag)
            .filter_map(|r| r.cells.get(col).and_then(Cell::as_number))
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub expenses: AnnotatedLedger,
    pub vat: AnnotatedLedger,
    /// Expense rows dropped as concept subtotals.
    pub subtotals_removed: usize,
}
