use crate::error::{Result, SheetError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A single untyped-or-typed spreadsheet cell.
///
/// `Missing` is a blank cell and is distinct from `Text("")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Missing,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The string form used when matching cell contents against text patterns.
    pub fn text_form(&self) -> Option<String> {
        match self {
            CellValue::Missing => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Date(d) => Some(d.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Missing => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Date(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Missing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ColumnType {
    Text,
    Numeric,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
    /// Assigned by an inference pass (or by the date resolver). `None` until then.
    #[serde(default)]
    pub column_type: Option<ColumnType>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
            column_type: None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn non_missing(&self) -> impl Iterator<Item = &CellValue> {
        self.values.iter().filter(|v| !v.is_missing())
    }

    pub fn non_missing_count(&self) -> usize {
        self.non_missing().count()
    }

    /// The type implied by the cells themselves, ignoring any inferred tag.
    ///
    /// A column whose non-missing cells are all dates (or all numbers) has that
    /// type; anything mixed, textual, or entirely blank observes as `Text`.
    pub fn observed_type(&self) -> ColumnType {
        let mut cells = self.non_missing().peekable();
        if cells.peek().is_none() {
            return ColumnType::Text;
        }

        let mut all_dates = true;
        let mut all_numbers = true;
        for cell in cells {
            match cell {
                CellValue::Date(_) => all_numbers = false,
                CellValue::Number(_) => all_dates = false,
                _ => {
                    all_dates = false;
                    all_numbers = false;
                }
            }
        }

        if all_dates {
            ColumnType::Date
        } else if all_numbers {
            ColumnType::Numeric
        } else {
            ColumnType::Text
        }
    }

    pub fn effective_type(&self) -> ColumnType {
        self.column_type.unwrap_or_else(|| self.observed_type())
    }

    pub fn dates(&self) -> Vec<Option<NaiveDateTime>> {
        self.values.iter().map(CellValue::as_date).collect()
    }

    pub fn numbers(&self) -> Vec<Option<f64>> {
        self.values.iter().map(CellValue::as_number).collect()
    }
}

/// An ordered set of equally long, uniquely named columns.
///
/// Deserialization goes through the same checks as [`Table::new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    columns: Vec<Column>,
}

#[derive(Deserialize)]
struct RawTable {
    columns: Vec<Column>,
}

impl TryFrom<RawTable> for Table {
    type Error = SheetError;

    fn try_from(raw: RawTable) -> Result<Self> {
        Table::new(raw.columns)
    }
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        validate_columns(&columns)?;
        Ok(Self { columns })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.row_count() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| SheetError::UnknownColumn(name.to_string()))
    }

    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.column(&column.name).is_some() {
            return Err(SheetError::InvalidInput(format!(
                "duplicate column name '{}'",
                column.name
            )));
        }
        if !self.columns.is_empty() && column.len() != self.row_count() {
            return Err(SheetError::InvalidInput(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                self.row_count()
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Replaces a column's cells with a coerced form and tags its type.
    /// The column keeps its name and position.
    pub fn replace_values(
        &mut self,
        name: &str,
        values: Vec<CellValue>,
        column_type: ColumnType,
    ) -> Result<()> {
        let expected = self.row_count();
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| SheetError::UnknownColumn(name.to_string()))?;

        if values.len() != expected {
            return Err(SheetError::InvalidInput(format!(
                "replacement for column '{}' has {} rows, expected {}",
                name,
                values.len(),
                expected
            )));
        }

        column.values = values;
        column.column_type = Some(column_type);
        Ok(())
    }

    pub fn set_column_type(&mut self, name: &str, column_type: ColumnType) -> Result<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| SheetError::UnknownColumn(name.to_string()))?;
        column.column_type = Some(column_type);
        Ok(())
    }

    /// Returns an owned copy holding only the rows whose index satisfies `keep`.
    pub fn select_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(usize) -> bool,
    {
        let selected: Vec<usize> = (0..self.row_count()).filter(|&i| keep(i)).collect();

        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: selected.iter().map(|&i| c.values[i].clone()).collect(),
                column_type: c.column_type,
            })
            .collect();

        Table { columns }
    }

    pub fn row(&self, index: usize) -> Option<Vec<&CellValue>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }
}

fn validate_columns(columns: &[Column]) -> Result<()> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.name.as_str()) {
            return Err(SheetError::InvalidInput(format!(
                "duplicate column name '{}'",
                column.name
            )));
        }
    }

    if let Some(first) = columns.first() {
        let rows = first.len();
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(SheetError::InvalidInput(format!(
                "column '{}' has {} rows but column '{}' has {}",
                bad.name,
                bad.len(),
                first.name,
                rows
            )));
        }
    }

    Ok(())
}
