use crate::coercion::coerce_dates;
use crate::error::{Result, SheetError};
use crate::schema::NormalizerConfig;
use crate::table::{CellValue, ColumnType, Table};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// The column was already typed as dates.
    TypedScan,
    /// The column name carries a date keyword and most rows parse.
    NameHint,
    /// The first non-missing cells parse as dates often enough.
    ContentProbe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDateColumn {
    pub column: String,
    pub strategy: ResolutionStrategy,
}

/// Picks the single column used as the chronological axis.
///
/// Strategies run in order and the first success wins:
/// 1. the first column already typed `Date`
/// 2. a date-keyword column where strictly more than half of all rows parse
/// 3. the first column whose leading non-missing cells mostly parse
///
/// Columns accepted by strategy 2 or 3 are replaced in the table by their coerced form.
pub struct DateColumnResolver<'a> {
    config: &'a NormalizerConfig,
}

impl<'a> DateColumnResolver<'a> {
    pub fn new(config: &'a NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, table: &mut Table) -> Result<ResolvedDateColumn> {
        if let Some(column) = table
            .columns()
            .iter()
            .find(|c| c.effective_type() == ColumnType::Date)
        {
            debug!("Date axis '{}' found by typed scan", column.name);
            return Ok(ResolvedDateColumn {
                column: column.name.clone(),
                strategy: ResolutionStrategy::TypedScan,
            });
        }

        if let Some((name, values)) = self.scan_name_hints(table) {
            table.replace_values(&name, values, ColumnType::Date)?;
            debug!("Date axis '{}' found by name hint", name);
            return Ok(ResolvedDateColumn {
                column: name,
                strategy: ResolutionStrategy::NameHint,
            });
        }

        if let Some((name, values)) = self.probe_content(table) {
            table.replace_values(&name, values, ColumnType::Date)?;
            debug!("Date axis '{}' found by content probe", name);
            return Ok(ResolvedDateColumn {
                column: name,
                strategy: ResolutionStrategy::ContentProbe,
            });
        }

        warn!(
            "No date column among {} columns; time filtering is unavailable",
            table.column_count()
        );
        Err(SheetError::NoDateColumn)
    }

    fn scan_name_hints(&self, table: &Table) -> Option<(String, Vec<CellValue>)> {
        table
            .columns()
            .iter()
            .filter(|c| self.config.date_hints.matches(&c.name))
            .find_map(|column| {
                let coerced = coerce_dates(&column.values, self.config);
                let ratio = coerced.row_ratio();
                debug!(
                    "Name-hinted column '{}' parses {:.0}% of rows as dates",
                    column.name,
                    ratio * 100.0
                );
                (ratio > self.config.resolver_name_hint_ratio)
                    .then(|| (column.name.clone(), coerced.values))
            })
    }

    fn probe_content(&self, table: &Table) -> Option<(String, Vec<CellValue>)> {
        table.columns().iter().find_map(|column| {
            let probe: Vec<CellValue> = column
                .non_missing()
                .take(self.config.resolver_probe_size)
                .cloned()
                .collect();
            let hits = coerce_dates(&probe, self.config).parsed;
            (hits >= self.config.resolver_probe_min_hits)
                .then(|| (column.name.clone(), coerce_dates(&column.values, self.config).values))
        })
    }
}

pub fn resolve_date_column(table: &mut Table, config: &NormalizerConfig) -> Result<ResolvedDateColumn> {
    DateColumnResolver::new(config).resolve(table)
}
