use crate::error::{Result, SheetError};
use crate::table::{CellValue, Table};
use crate::utils::days_before;
use chrono::NaiveDateTime;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed lookback vocabulary offered to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RelativeWindow {
    Last3Months,
    Last6Months,
    Last9Months,
    Last12Months,
    Last18Months,
    Last24Months,
    All,
}

impl RelativeWindow {
    /// Windows in the order the dashboard presents them.
    pub fn all() -> [RelativeWindow; 7] {
        [
            RelativeWindow::All,
            RelativeWindow::Last3Months,
            RelativeWindow::Last6Months,
            RelativeWindow::Last9Months,
            RelativeWindow::Last12Months,
            RelativeWindow::Last18Months,
            RelativeWindow::Last24Months,
        ]
    }

    /// Lookback length in calendar days; `None` for the unbounded window.
    pub fn days(&self) -> Option<u32> {
        match self {
            RelativeWindow::Last3Months => Some(90),
            RelativeWindow::Last6Months => Some(180),
            RelativeWindow::Last9Months => Some(270),
            RelativeWindow::Last12Months => Some(365),
            RelativeWindow::Last18Months => Some(540),
            RelativeWindow::Last24Months => Some(730),
            RelativeWindow::All => None,
        }
    }

    pub fn months(&self) -> Option<u32> {
        match self {
            RelativeWindow::Last3Months => Some(3),
            RelativeWindow::Last6Months => Some(6),
            RelativeWindow::Last9Months => Some(9),
            RelativeWindow::Last12Months => Some(12),
            RelativeWindow::Last18Months => Some(18),
            RelativeWindow::Last24Months => Some(24),
            RelativeWindow::All => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.days().is_none()
    }

    /// The label shown in the dashboard's filter selector.
    pub fn label(&self) -> String {
        match self.months() {
            Some(months) => format!("최근 {}개월", months),
            None => "모든 데이터".to_string(),
        }
    }

    fn from_months(months: u32) -> Option<Self> {
        Self::all().into_iter().find(|w| w.months() == Some(months))
    }
}

impl Default for RelativeWindow {
    fn default() -> Self {
        Self::All
    }
}

impl fmt::Display for RelativeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for RelativeWindow {
    type Err = SheetError;

    /// Accepts "최근 6개월", "모든 데이터", "last 6 months", "6m" and "all".
    /// Month counts outside the fixed vocabulary are rejected.
    fn from_str(label: &str) -> Result<Self> {
        let normalized = label.trim().to_lowercase();
        let unknown = || SheetError::UnknownWindow(label.to_string());

        if matches!(normalized.as_str(), "all" | "모든 데이터" | "all data") {
            return Ok(RelativeWindow::All);
        }

        let count = if let Some(rest) = normalized.strip_prefix("최근") {
            rest.trim().strip_suffix("개월")
        } else if let Some(rest) = normalized.strip_prefix("last") {
            let rest = rest.trim();
            rest.strip_suffix("months")
                .or_else(|| rest.strip_suffix("month"))
        } else {
            normalized.strip_suffix('m')
        };
        let count = count.ok_or_else(unknown)?;

        let months: u32 = count.trim().parse().map_err(|_| unknown())?;
        Self::from_months(months).ok_or_else(unknown)
    }
}

/// Most recent date in `column` of `table`, ignoring anything that is not a date.
pub fn latest_date(table: &Table, column: &str) -> Result<Option<NaiveDateTime>> {
    Ok(table
        .require_column(column)?
        .values
        .iter()
        .filter_map(CellValue::as_date)
        .max())
}

/// Earliest date still inside `window`, anchored to the latest date in the column.
pub fn cutoff_date(table: &Table, column: &str, window: RelativeWindow) -> Result<Option<NaiveDateTime>> {
    let Some(days) = window.days() else {
        return Ok(None);
    };
    Ok(latest_date(table, column)?.map(|latest| days_before(latest, days)))
}

/// Keeps the rows whose date in `date_column` is on or after `latest - window.days()`.
///
/// The result is always an owned copy. An unbounded window, or an axis with no dates at all,
/// returns every row. Otherwise rows without a date are dropped. Row order is preserved.
pub fn filter_by_window(table: &Table, date_column: &str, window: RelativeWindow) -> Result<Table> {
    let axis = table.require_column(date_column)?;

    let Some(cutoff) = cutoff_date(table, date_column, window)? else {
        debug!("Window {} keeps all {} rows", window, table.row_count());
        return Ok(table.clone());
    };

    let dates = axis.dates();
    let filtered = table.select_rows(|i| dates[i].map_or(false, |d| d >= cutoff));
    debug!(
        "Window {} (cutoff {}) keeps {} of {} rows",
        window,
        cutoff.format("%Y-%m-%d"),
        filtered.row_count(),
        table.row_count()
    );
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use crate::utils::midnight;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> CellValue {
        CellValue::Date(midnight(NaiveDate::from_ymd_opt(y, m, d).unwrap()))
    }

    fn sample_table() -> Table {
        Table::new(vec![
            Column::new(
                "date",
                vec![
                    date(2022, 12, 31),
                    date(2023, 1, 15),
                    date(2023, 2, 1),
                    CellValue::Missing,
                    date(2023, 8, 31),
                    date(2024, 1, 31),
                ],
            ),
            Column::new("value", (1..=6).map(|v| CellValue::Number(v as f64)).collect()),
        ])
        .unwrap()
    }

    #[test]
    fn test_day_table() {
        let days: Vec<Option<u32>> = RelativeWindow::all().iter().map(|w| w.days()).collect();
        assert_eq!(
            days,
            vec![None, Some(90), Some(180), Some(270), Some(365), Some(540), Some(730)]
        );
    }

    #[test]
    fn test_twelve_month_window() {
        let table = sample_table();
        let filtered = filter_by_window(&table, "date", RelativeWindow::Last12Months).unwrap();

        assert_eq!(
            cutoff_date(&table, "date", RelativeWindow::Last12Months).unwrap(),
            Some(midnight(NaiveDate::from_ymd_opt(2023, 1, 31).unwrap()))
        );
        assert_eq!(
            filtered.column("date").unwrap().values,
            vec![date(2023, 2, 1), date(2023, 8, 31), date(2024, 1, 31)]
        );
        assert_eq!(
            filtered.column("value").unwrap().values,
            vec![CellValue::Number(3.0), CellValue::Number(5.0), CellValue::Number(6.0)]
        );
    }

    #[test]
    fn test_unbounded_returns_everything() {
        let table = sample_table();
        let filtered = filter_by_window(&table, "date", RelativeWindow::All).unwrap();
        assert_eq!(filtered, table);
    }

    #[test]
    fn test_all_missing_axis_is_noop() {
        let table = Table::new(vec![
            Column::new("date", vec![CellValue::Missing, CellValue::Missing]),
            Column::new("value", vec![CellValue::Number(1.0), CellValue::Number(2.0)]),
        ])
        .unwrap();

        for window in RelativeWindow::all() {
            let filtered = filter_by_window(&table, "date", window).unwrap();
            assert_eq!(filtered.row_count(), 2);
            assert_eq!(filtered, table);
        }
    }

    #[test]
    fn test_filter_copies_rather_than_aliases() {
        let table = sample_table();
        let mut filtered = filter_by_window(&table, "date", RelativeWindow::Last3Months).unwrap();
        assert_eq!(filtered.row_count(), 1);

        filtered
            .replace_values("date", vec![CellValue::Missing], crate::table::ColumnType::Date)
            .unwrap();
        assert_eq!(
            latest_date(&table, "date").unwrap(),
            Some(midnight(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()))
        );
        assert_eq!(
            filter_by_window(&table, "date", RelativeWindow::Last3Months).unwrap().row_count(),
            1
        );
    }

    #[test]
    fn test_unknown_column() {
        let table = sample_table();
        assert!(matches!(
            filter_by_window(&table, "nope", RelativeWindow::All),
            Err(SheetError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_labels_round_trip() {
        for window in RelativeWindow::all() {
            assert_eq!(window.label().parse::<RelativeWindow>().unwrap(), window);
        }
        assert_eq!("최근 6개월".parse::<RelativeWindow>().unwrap(), RelativeWindow::Last6Months);
        assert_eq!("Last 18 Months".parse::<RelativeWindow>().unwrap(), RelativeWindow::Last18Months);
        assert_eq!("24m".parse::<RelativeWindow>().unwrap(), RelativeWindow::Last24Months);
        assert_eq!("ALL".parse::<RelativeWindow>().unwrap(), RelativeWindow::All);
    }

    #[test]
    fn test_unknown_labels_are_rejected() {
        for label in ["최근 5개월", "last week", "", "36m", "forever"] {
            assert!(
                matches!(label.parse::<RelativeWindow>(), Err(SheetError::UnknownWindow(_))),
                "expected '{}' to be rejected",
                label
            );
        }
    }
}
