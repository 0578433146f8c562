//! Best-effort, column-wide conversion of raw cells into numbers or dates.
//!
//! Coercion is total: a cell that cannot be converted becomes `Missing` in the output and
//! only lowers the success ratio. Structural problems (ragged columns) are rejected earlier,
//! when the [`Table`](crate::table::Table) is built.

use crate::schema::NormalizerConfig;
use crate::table::CellValue;
use crate::utils::parse_calendar_date;

#[derive(Debug, Clone, PartialEq)]
pub struct CoercedColumn {
    pub values: Vec<CellValue>,
    /// Non-missing input cells that converted successfully.
    pub parsed: usize,
    /// Non-missing input cells.
    pub attempted: usize,
}

impl CoercedColumn {
    /// Fraction of non-missing input cells that converted. Zero when nothing was attempted.
    pub fn success_ratio(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.parsed as f64 / self.attempted as f64
        }
    }

    /// Fraction of all rows (missing included) that hold a converted value.
    pub fn row_ratio(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.parsed as f64 / self.values.len() as f64
        }
    }
}

pub fn coerce_numeric(values: &[CellValue], config: &NormalizerConfig) -> CoercedColumn {
    coerce_with(values, |cell| match cell {
        CellValue::Number(n) => Some(CellValue::Number(*n)),
        CellValue::Text(text) => parse_number(text, config).map(CellValue::Number),
        _ => None,
    })
}

pub fn coerce_dates(values: &[CellValue], config: &NormalizerConfig) -> CoercedColumn {
    coerce_with(values, |cell| match cell {
        CellValue::Date(d) => Some(CellValue::Date(*d)),
        CellValue::Text(text) => {
            parse_calendar_date(text, &config.yearless_dates).map(CellValue::Date)
        }
        _ => None,
    })
}

/// Strips thousands separators, currency symbols and whitespace, then parses a float.
pub fn parse_number(text: &str, config: &NormalizerConfig) -> Option<f64> {
    let mut cleaned = text.to_string();
    for separator in &config.thousands_separators {
        cleaned = cleaned.replace(separator.as_str(), "");
    }
    for symbol in &config.currency_symbols {
        cleaned = cleaned.replace(symbol.as_str(), "");
    }

    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn coerce_with<F>(values: &[CellValue], convert: F) -> CoercedColumn
where
    F: Fn(&CellValue) -> Option<CellValue>,
{
    let mut parsed = 0;
    let mut attempted = 0;

    let converted = values
        .iter()
        .map(|cell| {
            if cell.is_missing() {
                return CellValue::Missing;
            }
            attempted += 1;
            match convert(cell) {
                Some(value) => {
                    parsed += 1;
                    value
                }
                None => CellValue::Missing,
            }
        })
        .collect();

    CoercedColumn {
        values: converted,
        parsed,
        attempted,
    }
}
