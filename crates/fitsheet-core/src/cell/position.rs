//! Cell position type

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A cell position (e.g., "A1", "AB12", "D0")
///
/// Columns are letters (A, B, ..., Z, AA, ...) mapped to a 1-based number,
/// rows are non-negative integers written without leading zeros. The
/// canonical id is the upper-cased column followed by the row and is what
/// identifies a cell inside a sheet.
#[derive(Debug, Clone)]
pub struct CellPosition {
    id: String,
    column: String,
    column_number: u32,
    row: u32,
}

impl CellPosition {
    /// Parse a position from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use fitsheet_core::CellPosition;
    ///
    /// let pos = CellPosition::parse("ab12").unwrap();
    /// assert_eq!(pos.id(), "AB12");
    /// assert_eq!(pos.column(), "AB");
    /// assert_eq!(pos.column_number(), 28);
    /// assert_eq!(pos.row(), 12);
    ///
    /// assert!(CellPosition::parse("A01").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidPosition("empty position".into()));
        }

        let digits_at = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| Error::InvalidPosition(format!("no row number in '{}'", s)))?;

        let (letters, digits) = s.split_at(digits_at);
        if letters.is_empty() {
            return Err(Error::InvalidPosition(format!(
                "no column letters in '{}'",
                s
            )));
        }
        if !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidPosition(format!(
                "invalid column letters in '{}'",
                s
            )));
        }

        if !Self::is_valid_row(digits) {
            return Err(Error::InvalidPosition(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidPosition(format!("row number too large in '{}'", s)))?;

        let column = letters.to_ascii_uppercase();
        let column_number = Self::column_to_number(&column)?;

        Ok(Self {
            id: format!("{}{}", column, row),
            column,
            column_number,
            row,
        })
    }

    /// Build a position from a 1-based column number and a row
    pub fn from_parts(column_number: u32, row: u32) -> Result<Self> {
        if column_number == 0 {
            return Err(Error::ColumnOutOfRange(0));
        }
        let column = Self::number_to_column(column_number);
        Ok(Self {
            id: format!("{}{}", column, row),
            column,
            column_number,
            row,
        })
    }

    fn is_valid_row(digits: &str) -> bool {
        !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && !(digits.len() > 1 && digits.starts_with('0'))
    }

    /// Convert column letters to a 1-based number (A = 1, Z = 26, AA = 27, etc.)
    pub fn column_to_number(column: &str) -> Result<u32> {
        if column.is_empty() {
            return Err(Error::InvalidPosition("empty column letters".into()));
        }

        let mut number: u32 = 0;
        for c in column.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidPosition(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
            number = number
                .checked_mul(26)
                .and_then(|n| n.checked_add(digit))
                .ok_or_else(|| Error::InvalidPosition(format!("column '{}' too large", column)))?;
        }

        Ok(number)
    }

    /// Convert a 1-based column number to letters (1 = A, 26 = Z, 27 = AA, etc.)
    ///
    /// There is no zero digit in the alphabet, so every step works on `n - 1`.
    /// Zero maps to the empty string.
    pub fn number_to_column(number: u32) -> String {
        let mut letters = Vec::new();
        let mut n = number;

        while n > 0 {
            let remainder = (n - 1) % 26;
            letters.push((b'A' + remainder as u8) as char);
            n = (n - 1) / 26;
        }

        letters.iter().rev().collect()
    }

    /// Canonical id, used as the table key
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Upper-case column letters
    pub fn column(&self) -> &str {
        &self.column
    }

    /// 1-based column number
    pub fn column_number(&self) -> u32 {
        self.column_number
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    /// Shift this position by the given deltas
    ///
    /// Returns `None` when the result leaves the grid (column below 1,
    /// negative row, or beyond `u32`).
    pub fn offset(&self, column_delta: i64, row_delta: i64) -> Option<CellPosition> {
        let column = i64::from(self.column_number) + column_delta;
        let row = i64::from(self.row) + row_delta;

        let column = u32::try_from(column).ok().filter(|c| *c >= 1)?;
        let row = u32::try_from(row).ok()?;

        Self::from_parts(column, row).ok()
    }
}

impl PartialEq for CellPosition {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CellPosition {}

impl Hash for CellPosition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for CellPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for CellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl FromStr for CellPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
