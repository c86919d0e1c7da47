//! In-memory grid model: sheets, rows and cells.
//!
//! Rows and cells are dense: the row at position `i` is spreadsheet row `i + 1`
//! and the cell at position `j` is column `j + 1`. Gaps are filled with empty cells.

use std::collections::BTreeMap;

use super::format::CellFormat;
use super::writer::conditional::ConditionalFormatRule;

/// Types of data that can be stored in a cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell
    #[default]
    Empty,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// String value, written through the shared strings table
    String(String),
    /// Date/time value (stored as serial number)
    DateTime(f64),
    /// Error value such as `#DIV/0!`
    Error(String),
    /// Formula with an optional cached result
    Formula {
        formula: String,
        cached: Option<Box<CellValue>>,
    },
}

impl CellValue {
    /// Render the value the way it appears in a grid export.
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::Int(i) => itoa::Buffer::new().format(*i).to_string(),
            CellValue::Float(f) | CellValue::DateTime(f) => f.to_string(),
            CellValue::String(s) | CellValue::Error(s) => s.clone(),
            CellValue::Formula { cached, .. } => cached
                .as_deref()
                .map(CellValue::to_display_string)
                .unwrap_or_default(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(i64::from(value))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// A single cell: a value plus optional formatting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub format: Option<CellFormat>,
}

impl Cell {
    /// Create an unformatted cell.
    pub fn new<V: Into<CellValue>>(value: V) -> Self {
        Self {
            value: value.into(),
            format: None,
        }
    }

    /// Check if the cell has neither a value nor a format.
    pub fn is_blank(&self) -> bool {
        matches!(self.value, CellValue::Empty) && self.format.is_none()
    }
}

/// A row of cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
    /// Custom height in points
    pub height: Option<f64>,
    pub hidden: bool,
}

impl Row {
    /// Append a cell and return it.
    pub fn add_cell<V: Into<CellValue>>(&mut self, value: V) -> &mut Cell {
        self.cells.push(Cell::new(value));
        let last = self.cells.len() - 1;
        &mut self.cells[last]
    }

    /// Get the cell at a zero-based column, creating blank cells up to it.
    pub fn cell_mut(&mut self, col: usize) -> &mut Cell {
        if self.cells.len() <= col {
            self.cells.resize_with(col + 1, Cell::default);
        }
        &mut self.cells[col]
    }
}

/// A worksheet in a [`Document`](super::Document).
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    selected: bool,
    rows: Vec<Row>,
    conditional_formats: Vec<ConditionalFormatRule>,
    column_widths: BTreeMap<u32, f64>,
}

impl Sheet {
    pub(crate) fn new(name: String, selected: bool) -> Self {
        Self {
            name,
            selected,
            rows: Vec::new(),
            conditional_formats: Vec::new(),
            column_widths: BTreeMap::new(),
        }
    }

    /// Sheet name as shown on its tab.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the tab selected when the file opens.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Rows in display order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Append an empty row and return it.
    pub fn add_row(&mut self) -> &mut Row {
        self.rows.push(Row::default());
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    /// Get the row at a zero-based index, creating empty rows up to it.
    pub fn row_mut(&mut self, row: usize) -> &mut Row {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Row::default);
        }
        &mut self.rows[row]
    }

    /// Set a cell value by zero-based coordinates.
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, row: usize, col: usize, value: V) {
        self.row_mut(row).cell_mut(col).value = value.into();
    }

    /// Set a cell format by zero-based coordinates.
    pub fn set_cell_format(&mut self, row: usize, col: usize, format: CellFormat) {
        self.row_mut(row).cell_mut(col).format = Some(format);
    }

    /// Get a cell by zero-based coordinates.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Set a column width (zero-based column, width in characters).
    pub fn set_column_width(&mut self, col: u32, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub(crate) fn column_widths(&self) -> &BTreeMap<u32, f64> {
        &self.column_widths
    }

    /// Conditional-format rules in insertion order.
    pub fn conditional_formats(&self) -> &[ConditionalFormatRule] {
        &self.conditional_formats
    }

    pub(crate) fn conditional_formats_mut(&mut self) -> &mut Vec<ConditionalFormatRule> {
        &mut self.conditional_formats
    }

    /// Used range as zero-based `(max_row, max_col)` over non-blank cells.
    pub fn used_extent(&self) -> Option<(usize, usize)> {
        let mut extent: Option<(usize, usize)> = None;
        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.cells.iter().enumerate() {
                if cell.is_blank() {
                    continue;
                }
                extent = Some(match extent {
                    Some((max_r, max_c)) => (max_r.max(r), max_c.max(c)),
                    None => (r, c),
                });
            }
        }
        extent
    }

    /// Cell values rendered as strings, row by row.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|cell| cell.value.to_display_string())
                    .collect()
            })
            .collect()
    }
}

/// Convert a 1-based column number to letters (1 -> "A", 27 -> "AA").
pub(crate) fn column_to_letters(col: u32) -> String {
    let mut letters = String::new();
    let mut col = col;

    while col > 0 {
        col -= 1;
        let letter = ((col % 26) as u8 + b'A') as char;
        letters.insert(0, letter);
        col /= 26;
    }

    letters
}

/// Decode an A1-style reference into zero-based `(row, col)`.
pub(crate) fn reference_to_coords(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.trim_start_matches('$');
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let letters = letters.trim_end_matches('$');
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }

    let mut col: usize = 0;
    for b in letters.bytes() {
        col = col.checked_mul(26)?.checked_add(usize::from(b.to_ascii_uppercase() - b'A' + 1))?;
    }
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}
