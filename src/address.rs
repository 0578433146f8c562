//! Spreadsheet-style column letters ("A", "Z", "AA", ...) to positional indices and back.

use crate::error::{Result, SheetError};
use crate::table::{Column, Table};

/// Interprets `letter` as a bijective base-26 numeral and returns the 0-based column index.
///
/// # Examples
/// - "A" -> 0, "Z" -> 25, "AA" -> 26, "AM" -> 38
pub fn letter_to_index(letter: &str) -> Result<usize> {
    let normalized = letter.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(SheetError::InvalidAddress(letter.to_string()));
    }

    let mut value: usize = 0;
    for ch in normalized.chars() {
        if !ch.is_ascii_uppercase() {
            return Err(SheetError::InvalidAddress(letter.to_string()));
        }
        let digit = (ch as u8 - b'A' + 1) as usize;
        value = value
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| SheetError::InvalidAddress(letter.to_string()))?;
    }

    Ok(value - 1)
}

/// 0 -> "A", 25 -> "Z", 26 -> "AA"
pub fn index_to_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::<u8>::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Positional lookup; declared column names are ignored.
pub fn column_by_letter<'a>(table: &'a Table, letter: &str) -> Result<&'a Column> {
    let index = letter_to_index(letter)?;
    table
        .column_at(index)
        .ok_or_else(|| SheetError::OutOfRange {
            letter: letter.trim().to_uppercase(),
            index,
            column_count: table.column_count(),
        })
}
