//! A1-style cell addressing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column letters for a 0-based column index (`0` is `A`, `26` is `AA`).
pub fn column_letter(index: u32) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// 0-based column index for column letters, case-insensitive.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut n: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

/// A single cell: 0-based column, 1-based row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CellRef {
    pub col: u32,
    pub row: u32,
}

impl CellRef {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Parse an `A1` or `$A$1` reference.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.replace('$', "");
        let split = s.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = s.split_at(split);
        let col = column_index(letters)?;
        let row: u32 = digits.parse().ok()?;
        if row == 0 {
            return None;
        }
        Some(Self { col, row })
    }

    /// Column letters of this cell.
    pub fn column(&self) -> String {
        column_letter(self.col)
    }

    /// Absolute form, e.g. `$B$6`.
    pub fn absolute(&self) -> String {
        format!("${}${}", self.column(), self.row)
    }

    /// Same column, `n` rows down.
    pub fn down(&self, n: u32) -> Self {
        Self::new(self.col, self.row + n)
    }

    /// Same row, `n` columns right.
    pub fn right(&self, n: u32) -> Self {
        Self::new(self.col + n, self.row)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column(), self.row)
    }
}

impl From<CellRef> for String {
    fn from(cell: CellRef) -> Self {
        cell.to_string()
    }
}

impl TryFrom<String> for CellRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CellRef::parse(&value).ok_or_else(|| format!("invalid cell reference '{}'", value))
    }
}

/// Relative range text, e.g. `B5:S9`.
pub fn range(start: CellRef, end: CellRef) -> String {
    format!("{}:{}", start, end)
}

/// Absolute range on another sheet, e.g. `'info'!$A$1:$D$1`.
pub fn sheet_range(sheet: &str, start: CellRef, end: CellRef) -> String {
    format!("'{}'!{}:{}", sheet, start.absolute(), end.absolute())
}

/// Absolute single cell on a sheet, e.g. `'Sheet'!$V$2`.
pub fn sheet_cell(sheet: &str, cell: CellRef) -> String {
    format!("'{}'!{}", sheet, cell.absolute())
}
