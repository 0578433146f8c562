use crate::coercion::{coerce_dates, coerce_numeric};
use crate::error::Result;
use crate::schema::NormalizerConfig;
use crate::table::{CellValue, Column, ColumnType, Table};
use crate::utils::looks_like_date;
use log::debug;
use serde::{Deserialize, Serialize};

/// Why a column received its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InferenceReason {
    /// The column name carries a date keyword and at least one cell parsed as a date.
    NameHint { parsed: usize },
    /// Every non-missing cell was already a date.
    PreTyped,
    /// Text cells converted to numbers often enough.
    NumericCoercion { ratio: f64, parsed: usize },
    /// Most sampled cells are shaped like dates.
    DatePattern { sample_ratio: f64 },
    /// Every non-missing cell was already a number.
    AlreadyNumeric,
    /// No heuristic applied; raw values kept.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInference {
    pub column: String,
    pub column_type: ColumnType,
    pub reason: InferenceReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceReport {
    pub columns: Vec<ColumnInference>,
}

impl InferenceReport {
    pub fn type_of(&self, column: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.column_type)
    }

    pub fn columns_of_type(&self, column_type: ColumnType) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.column_type == column_type)
            .map(|c| c.column.as_str())
            .collect()
    }
}

/// Decides Text/Numeric/Date per column from header hints and sampled content.
pub struct SchemaInferencer<'a> {
    config: &'a NormalizerConfig,
}

impl<'a> SchemaInferencer<'a> {
    pub fn new(config: &'a NormalizerConfig) -> Self {
        Self { config }
    }

    /// Runs one inference pass and returns the typed table. The input is left untouched.
    pub fn infer(&self, table: &Table) -> Result<(Table, InferenceReport)> {
        let mut typed = table.clone();
        let report = self.infer_in_place(&mut typed)?;
        Ok((typed, report))
    }

    pub fn infer_in_place(&self, table: &mut Table) -> Result<InferenceReport> {
        let decisions: Vec<(ColumnInference, Option<Vec<CellValue>>)> = table
            .columns()
            .iter()
            .map(|column| self.infer_column(column))
            .collect();

        let mut report = InferenceReport::default();
        for (decision, replacement) in decisions {
            match replacement {
                Some(values) => table.replace_values(&decision.column, values, decision.column_type)?,
                None => table.set_column_type(&decision.column, decision.column_type)?,
            }
            report.columns.push(decision);
        }

        Ok(report)
    }

    /// Decides the type of a single column. Returns the replacement cells when the column
    /// was coerced, `None` when the raw cells are kept.
    pub fn infer_column(&self, column: &Column) -> (ColumnInference, Option<Vec<CellValue>>) {
        let decide = |column_type, reason| ColumnInference {
            column: column.name.clone(),
            column_type,
            reason,
        };

        if self.config.date_hints.matches(&column.name) {
            let coerced = coerce_dates(&column.values, self.config);
            if coerced.parsed > 0 {
                debug!(
                    "Column '{}' typed Date by name hint ({} cells parsed)",
                    column.name, coerced.parsed
                );
                return (
                    decide(
                        ColumnType::Date,
                        InferenceReason::NameHint {
                            parsed: coerced.parsed,
                        },
                    ),
                    Some(coerced.values),
                );
            }
        }

        let observed = column.observed_type();
        if observed == ColumnType::Date {
            return (decide(ColumnType::Date, InferenceReason::PreTyped), None);
        }

        if observed == ColumnType::Text {
            let coerced = coerce_numeric(&column.values, self.config);
            let ratio = coerced.success_ratio();
            if ratio >= self.config.numeric_min_ratio && coerced.parsed >= self.config.numeric_min_count {
                debug!(
                    "Column '{}' typed Numeric ({:.0}% of {} cells converted)",
                    column.name,
                    ratio * 100.0,
                    coerced.attempted
                );
                return (
                    decide(
                        ColumnType::Numeric,
                        InferenceReason::NumericCoercion {
                            ratio,
                            parsed: coerced.parsed,
                        },
                    ),
                    Some(coerced.values),
                );
            }
        }

        if let Some(sample_ratio) = self.date_shape_ratio(column) {
            if sample_ratio >= self.config.date_pattern_min_ratio {
                let coerced = coerce_dates(&column.values, self.config);
                if coerced.parsed > 0 {
                    debug!(
                        "Column '{}' typed Date by content shape ({:.0}% of sample)",
                        column.name,
                        sample_ratio * 100.0
                    );
                    return (
                        decide(ColumnType::Date, InferenceReason::DatePattern { sample_ratio }),
                        Some(coerced.values),
                    );
                }
                debug!(
                    "Column '{}' looks date-shaped but no cell parsed; leaving it as is",
                    column.name
                );
            }
        }

        if observed == ColumnType::Numeric {
            return (decide(ColumnType::Numeric, InferenceReason::AlreadyNumeric), None);
        }

        debug!("Column '{}' left as Text", column.name);
        (decide(ColumnType::Text, InferenceReason::Fallback), None)
    }

    /// Share of the leading non-missing cells whose text form is shaped like a date.
    /// `None` when the column has no non-missing cells.
    fn date_shape_ratio(&self, column: &Column) -> Option<f64> {
        let sample: Vec<String> = column
            .non_missing()
            .take(self.config.date_sample_size)
            .filter_map(CellValue::text_form)
            .collect();

        if sample.is_empty() {
            return None;
        }

        let hits = sample.iter().filter(|s| looks_like_date(s)).count();
        Some(hits as f64 / sample.len() as f64)
    }
}

/// Convenience wrapper over [`SchemaInferencer::infer`].
pub fn infer_schema(table: &Table, config: &NormalizerConfig) -> Result<(Table, InferenceReport)> {
    SchemaInferencer::new(config).infer(table)
}
