//! # Financial Sheet Normalizer
//!
//! A library for turning untyped spreadsheet exports (rows of mixed string/number cells with
//! no declared schema) into typed, time-filterable tables with period-over-period summaries.
//!
//! ## Core Concepts
//!
//! - **Column letters**: spreadsheet addresses ("A", "AG", "AM") select columns by position
//! - **Coercion**: best-effort conversion of a column to numbers or dates; bad cells become `Missing`
//! - **Inference**: per-column Date/Numeric/Text decisions from header hints and sampled content
//! - **Date axis**: the single column used for chronology, found by type, then name, then content
//! - **Relative windows**: "last N months" filters anchored to the most recent date in the data
//! - **Period deltas**: change between the last two observations, formatted by magnitude tier
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_sheet_normalizer::*;
//!
//! let raw = table_from_records(
//!     &["날짜", "자산합계"],
//!     &[
//!         vec!["2024-01-31", "1,000,000"],
//!         vec!["2024-02-29", "1,300,000"],
//!     ],
//! )?;
//!
//! let dashboard = DashboardConfig::new(vec![MetricSpec::new("자산합계", "B")]);
//! let processed = SheetProcessor::new(NormalizerConfig::default())
//!     .process(&raw, "최근 6개월".parse()?, &dashboard)?;
//!
//! let assets = processed.metrics.get("자산합계").unwrap();
//! assert_eq!(assets.delta.magnitude, "+300.0K");
//! ```

pub mod address;
pub mod cache;
pub mod coercion;
pub mod delta;
pub mod error;
pub mod inference;
pub mod ingestion;
pub mod metrics;
pub mod resolver;
pub mod schema;
pub mod table;
pub mod utils;
pub mod window;

pub use address::{column_by_letter, index_to_letter, letter_to_index};
pub use cache::{CacheStats, SheetCache, SheetRequest};
pub use coercion::{coerce_dates, coerce_numeric, parse_number, CoercedColumn};
pub use delta::{compute_delta, format_grouped, format_magnitude, PeriodDelta, Sign};
pub use error::{Result, SheetError};
pub use inference::{infer_schema, ColumnInference, InferenceReason, InferenceReport, SchemaInferencer};
pub use ingestion::*;
pub use metrics::{summarize, summarize_metric, MetricFailure, MetricReport, MetricSummary, SeriesPoint};
pub use resolver::{resolve_date_column, DateColumnResolver, ResolutionStrategy, ResolvedDateColumn};
pub use schema::*;
pub use table::{CellValue, Column, ColumnType, Table};
pub use utils::{looks_like_date, parse_calendar_date};
pub use window::{cutoff_date, filter_by_window, latest_date, RelativeWindow};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// The column a request uses as its horizontal axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DateAxis {
    /// A real chronological axis; time filtering and sorting are available.
    Chronological {
        column: String,
        strategy: ResolutionStrategy,
    },
    /// No date column was found. The first column (if any) labels rows and
    /// time filtering is disabled.
    Nominal { column: Option<String> },
}

impl DateAxis {
    /// Resolves the axis, degrading to the first column when no date column exists.
    /// Only structural table errors are returned.
    pub fn resolve(table: &mut Table, config: &NormalizerConfig) -> Result<Self> {
        match resolve_date_column(table, config) {
            Ok(resolved) => Ok(DateAxis::Chronological {
                column: resolved.column,
                strategy: resolved.strategy,
            }),
            Err(SheetError::NoDateColumn) => {
                let column = table.column_at(0).map(|c| c.name.clone());
                warn!(
                    "Falling back to nominal axis {:?}; time filtering disabled",
                    column
                );
                Ok(DateAxis::Nominal { column })
            }
            Err(e) => Err(e),
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            DateAxis::Chronological { column, .. } => Some(column.as_str()),
            DateAxis::Nominal { column } => column.as_deref(),
        }
    }

    pub fn supports_time_filtering(&self) -> bool {
        matches!(self, DateAxis::Chronological { .. })
    }
}

/// Everything derived from one raw table for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedSheet {
    /// Full typed table, including any coercion done while resolving the axis.
    pub normalized: Table,
    pub inference: InferenceReport,
    pub axis: DateAxis,
    pub window: RelativeWindow,
    /// Rows inside `window`, or every row when the axis is nominal.
    pub filtered: Table,
    pub metrics: MetricReport,
}

impl ProcessedSheet {
    /// `행 12 · 열 40 · 필터: 최근 6개월`
    pub fn caption(&self) -> String {
        format!(
            "행 {} · 열 {} · 필터: {}",
            self.filtered.row_count(),
            self.filtered.column_count(),
            self.window.label()
        )
    }
}

pub struct SheetProcessor {
    config: NormalizerConfig,
}

impl SheetProcessor {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Infers types, resolves the date axis, applies `window` and summarizes the dashboard
    /// metrics over the filtered rows. `raw` is not modified.
    pub fn process(
        &self,
        raw: &Table,
        window: RelativeWindow,
        dashboard: &DashboardConfig,
    ) -> Result<ProcessedSheet> {
        info!(
            "Processing sheet with {} rows and {} columns (window: {})",
            raw.row_count(),
            raw.column_count(),
            window
        );

        let (mut normalized, inference) = SchemaInferencer::new(&self.config).infer(raw)?;
        debug!(
            "Inferred {} date, {} numeric and {} text columns",
            inference.columns_of_type(ColumnType::Date).len(),
            inference.columns_of_type(ColumnType::Numeric).len(),
            inference.columns_of_type(ColumnType::Text).len()
        );

        let axis = DateAxis::resolve(&mut normalized, &self.config)?;

        let filtered = match &axis {
            DateAxis::Chronological { column, .. } => filter_by_window(&normalized, column, window)?,
            DateAxis::Nominal { .. } => normalized.clone(),
        };

        let metrics = summarize(&filtered, dashboard, axis.column(), &self.config);
        info!(
            "Kept {} of {} rows; {} metrics summarized, {} unavailable",
            filtered.row_count(),
            normalized.row_count(),
            metrics.summaries.len(),
            metrics.failures.len()
        );

        Ok(ProcessedSheet {
            normalized,
            inference,
            axis,
            window,
            filtered,
            metrics,
        })
    }
}

impl Default for SheetProcessor {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

pub fn process_sheet(
    raw: &Table,
    window: RelativeWindow,
    dashboard: &DashboardConfig,
) -> Result<ProcessedSheet> {
    SheetProcessor::default().process(raw, window, dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_sheet() -> Table {
        table_from_records(
            &["기준월", "메모", "자산합계", "부채합계"],
            &[
                vec!["2023-01-31", "start", "1,000,000", "$500"],
                vec!["2023-06-30", "", "1,100,000", "$450"],
                vec!["2023-12-31", "mid", "1,300,000", "$400"],
                vec!["2024-01-31", "end", "1,100,000", ""],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end_processing() {
        let dashboard = DashboardConfig::new(vec![
            MetricSpec::new("자산합계", "C"),
            MetricSpec::new("부채합계", "D"),
        ]);

        let processed = process_sheet(&raw_sheet(), RelativeWindow::Last3Months, &dashboard).unwrap();

        assert_eq!(
            processed.axis,
            DateAxis::Chronological {
                column: "기준월".to_string(),
                strategy: ResolutionStrategy::TypedScan,
            }
        );
        assert_eq!(processed.normalized.row_count(), 4);
        assert_eq!(processed.filtered.row_count(), 2);
        assert_eq!(processed.caption(), "행 2 · 열 4 · 필터: 최근 3개월");

        let assets = processed.metrics.get("자산합계").unwrap();
        assert_eq!(assets.latest(), Some(1_100_000.0));
        assert_eq!(assets.delta.magnitude, "-200.0K");
        assert_eq!(assets.delta.sign, Sign::Negative);

        let debt = processed.metrics.get("부채합계").unwrap();
        assert_eq!(debt.latest(), Some(400.0));
        assert_eq!(debt.delta.sign, Sign::Neutral);
    }

    #[test]
    fn test_nominal_axis_disables_filtering() {
        let raw = table_from_records(
            &["항목", "값"],
            &[vec!["a", "1"], vec!["b", "2"], vec!["c", "3"]],
        )
        .unwrap();

        let processed = process_sheet(
            &raw,
            RelativeWindow::Last3Months,
            &DashboardConfig::new(vec![MetricSpec::new("값", "B")]),
        )
        .unwrap();

        assert_eq!(
            processed.axis,
            DateAxis::Nominal {
                column: Some("항목".to_string())
            }
        );
        assert!(!processed.axis.supports_time_filtering());
        assert_eq!(processed.filtered.row_count(), 3);
        assert_eq!(processed.metrics.get("값").unwrap().delta.magnitude, "+1");
    }

    #[test]
    fn test_raw_table_is_not_modified() {
        let raw = raw_sheet();
        let before = raw.clone();
        process_sheet(&raw, RelativeWindow::All, &DashboardConfig::default()).unwrap();
        assert_eq!(raw, before);
    }
}
