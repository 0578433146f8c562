use crate::error::{Result, SheetError};
use crate::table::{CellValue, Column, Table};
use std::collections::HashSet;

/// Raw strings a spreadsheet export uses for an empty cell.
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Splits one exported string into a primitive scalar the way a CSV loader does:
/// blanks and missing markers become `Missing`, plain numeric literals become `Number`,
/// everything else (including "1,234" or "$5") stays `Text` for later coercion.
pub fn scalar_from_raw(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
        return CellValue::Missing;
    }

    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(raw.to_string()),
    }
}

/// Builds a table from a header row and string records.
///
/// Blank headers become `Unnamed: <position>` and repeated headers get a `.1`, `.2`, ...
/// suffix so every column name is unique. Short records are padded with `Missing`; a record
/// longer than the header is rejected.
pub fn table_from_records<S: AsRef<str>>(headers: &[S], records: &[Vec<S>]) -> Result<Table> {
    let rows = records
        .iter()
        .map(|record| record.iter().map(|cell| scalar_from_raw(cell.as_ref())).collect())
        .collect::<Vec<Vec<CellValue>>>();
    table_from_rows(headers, rows)
}

/// Builds a table from a header row and already-split scalar rows.
pub fn table_from_rows<S: AsRef<str>>(headers: &[S], rows: Vec<Vec<CellValue>>) -> Result<Table> {
    let names = unique_headers(headers);
    let width = names.len();
    let mut columns: Vec<Vec<CellValue>> = vec![Vec::with_capacity(rows.len()); width];

    for (row_index, row) in rows.into_iter().enumerate() {
        if row.len() > width {
            return Err(SheetError::InvalidInput(format!(
                "row {} has {} cells but the header has {} columns",
                row_index,
                row.len(),
                width
            )));
        }

        let filled = row.len();
        for (column, cell) in columns.iter_mut().zip(row) {
            column.push(cell);
        }
        for column in columns.iter_mut().skip(filled) {
            column.push(CellValue::Missing);
        }
    }

    Table::new(
        names
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    )
}

fn unique_headers<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(headers.len());

    for (position, header) in headers.iter().enumerate() {
        let base = header.as_ref().trim();
        let base = if base.is_empty() {
            format!("Unnamed: {}", position)
        } else {
            base.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }

        seen.insert(name.clone());
        names.push(name);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_split() {
        assert_eq!(scalar_from_raw(""), CellValue::Missing);
        assert_eq!(scalar_from_raw("  "), CellValue::Missing);
        assert_eq!(scalar_from_raw("#N/A"), CellValue::Missing);
        assert_eq!(scalar_from_raw("42"), CellValue::Number(42.0));
        assert_eq!(scalar_from_raw(" -1.5 "), CellValue::Number(-1.5));
        assert_eq!(scalar_from_raw("1,234"), CellValue::from("1,234"));
        assert_eq!(scalar_from_raw("2024-01-31"), CellValue::from("2024-01-31"));
        assert_eq!(scalar_from_raw("inf"), CellValue::from("inf"));
    }

    #[test]
    fn test_headers_are_made_unique() {
        let table = table_from_records(
            &["날짜", "", "금액", "금액", ""],
            &[vec!["2024-01-31", "x", "1", "2", "y"]],
        )
        .unwrap();
        assert_eq!(
            table.column_names(),
            vec!["날짜", "Unnamed: 1", "금액", "금액.1", "Unnamed: 4"]
        );
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = table_from_records(&["a", "b", "c"], &[vec!["1"], vec!["2", "x", "y"]]).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("c").unwrap().values[0], CellValue::Missing);
        assert_eq!(table.column("b").unwrap().values[1], CellValue::from("x"));
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let result = table_from_records(&["a"], &[vec!["1", "2"]]);
        assert!(matches!(result, Err(SheetError::InvalidInput(_))));
    }

    #[test]
    fn test_header_only_table() {
        let table = table_from_records::<&str>(&["a", "b"], &[]).unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);
        assert!(table.is_empty());
    }
}
