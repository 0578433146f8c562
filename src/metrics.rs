//! Per-metric summaries driven by a declarative `name -> column letter` mapping.

use crate::address::column_by_letter;
use crate::coercion::coerce_numeric;
use crate::delta::{format_grouped, PeriodDelta};
use crate::error::Result;
use crate::schema::{DashboardConfig, MetricSpec, NormalizerConfig};
use crate::table::{CellValue, Table};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// One chart point: the axis cell of the row and the metric value in that row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub axis: CellValue,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub name: String,
    pub column_letter: String,
    /// Header of the column the letter resolved to.
    pub column_name: String,
    pub delta: PeriodDelta,
    pub series: Vec<SeriesPoint>,
}

impl MetricSummary {
    pub fn latest(&self) -> Option<f64> {
        self.delta.latest
    }

    /// `자산합계 (1,234,567) [+1.2K +0.1%]`
    pub fn headline(&self) -> String {
        format!(
            "{} ({}) {}",
            self.name,
            format_grouped(self.latest().unwrap_or(0.0)),
            self.delta
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFailure {
    pub name: String,
    pub column_letter: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub summaries: Vec<MetricSummary>,
    pub failures: Vec<MetricFailure>,
}

impl MetricReport {
    pub fn get(&self, name: &str) -> Option<&MetricSummary> {
        self.summaries.iter().find(|s| s.name == name)
    }
}

/// Summarizes one metric. `axis_column` names the column whose cells label each point;
/// without one, points are labelled by row number.
pub fn summarize_metric(
    table: &Table,
    spec: &MetricSpec,
    axis_column: Option<&str>,
    config: &NormalizerConfig,
) -> Result<MetricSummary> {
    let column = column_by_letter(table, &spec.column)?;
    let values = coerce_numeric(&column.values, config).values;

    let axis: Vec<CellValue> = match axis_column {
        Some(name) => table.require_column(name)?.values.clone(),
        None => (0..table.row_count())
            .map(|i| CellValue::Number(i as f64))
            .collect(),
    };

    let numbers: Vec<Option<f64>> = values.iter().map(CellValue::as_number).collect();
    let delta = PeriodDelta::compute(&numbers);

    let series = axis
        .into_iter()
        .zip(numbers)
        .map(|(axis, value)| SeriesPoint { axis, value })
        .collect();

    debug!(
        "Metric '{}' from column {} ('{}'): {}",
        spec.name, spec.column, column.name, delta
    );

    Ok(MetricSummary {
        name: spec.name.clone(),
        column_letter: spec.column.trim().to_uppercase(),
        column_name: column.name.clone(),
        delta,
        series,
    })
}

/// Summarizes every metric of `dashboard` in order. A metric that cannot be resolved is
/// recorded as a failure and does not stop the others.
pub fn summarize(
    table: &Table,
    dashboard: &DashboardConfig,
    axis_column: Option<&str>,
    config: &NormalizerConfig,
) -> MetricReport {
    let mut report = MetricReport::default();

    for spec in &dashboard.metrics {
        match summarize_metric(table, spec, axis_column, config) {
            Ok(summary) => report.summaries.push(summary),
            Err(e) => {
                warn!("Metric '{}' unavailable: {}", spec.name, e);
                report.failures.push(MetricFailure {
                    name: spec.name.clone(),
                    column_letter: spec.column.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}
