use crate::error::Result;
use crate::window::RelativeWindow;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "PascalCase", tag = "policy", content = "year")]
pub enum YearlessDatePolicy {
    #[schemars(
        description = "Cells like '3월 5일' carry no year and are treated as unparseable (Missing)."
    )]
    Reject,

    #[schemars(description = "Cells without a year are placed in the given calendar year.")]
    AssumeYear(i32),
}

impl Default for YearlessDatePolicy {
    fn default() -> Self {
        Self::Reject
    }
}

/// Which column names hint at a date axis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct DateHintKeywords {
    #[schemars(
        description = "Case-insensitive substrings that mark a column name as date-like (e.g. 'date', '날짜')."
    )]
    pub contains: Vec<String>,

    #[schemars(description = "Name suffixes that mark a column as date-like (e.g. '월', '일').")]
    pub suffixes: Vec<String>,
}

impl Default for DateHintKeywords {
    fn default() -> Self {
        Self {
            contains: ["date", "time", "날짜", "시간", "월", "일"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            suffixes: ["월", "날짜", "일", "시간"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DateHintKeywords {
    pub fn matches(&self, column_name: &str) -> bool {
        let lower = column_name.to_lowercase();
        self.contains
            .iter()
            .any(|keyword| lower.contains(&keyword.to_lowercase()))
            || self
                .suffixes
                .iter()
                .any(|suffix| column_name.trim_end().ends_with(suffix.as_str()))
    }
}

/// Thresholds and vocabularies used by coercion, inference and date-axis resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct NormalizerConfig {
    #[schemars(description = "Symbols stripped from text cells before numeric parsing.")]
    pub currency_symbols: Vec<String>,

    #[schemars(description = "Thousands separators stripped before numeric parsing.")]
    pub thousands_separators: Vec<String>,

    pub date_hints: DateHintKeywords,

    pub yearless_dates: YearlessDatePolicy,

    #[schemars(
        description = "Minimum fraction of non-missing cells that must parse for a text column to become Numeric."
    )]
    pub numeric_min_ratio: f64,

    #[schemars(description = "Minimum number of converted cells for a text column to become Numeric.")]
    pub numeric_min_count: usize,

    #[schemars(description = "How many leading non-missing cells the date-shape pass inspects.")]
    pub date_sample_size: usize,

    #[schemars(description = "Fraction of sampled cells that must look like dates.")]
    pub date_pattern_min_ratio: f64,

    #[schemars(
        description = "Fraction of all rows a name-hinted column must parse (strictly above) to become the date axis."
    )]
    pub resolver_name_hint_ratio: f64,

    #[schemars(description = "How many leading non-missing cells the content probe parses.")]
    pub resolver_probe_size: usize,

    #[schemars(description = "Parsed cells required within the probe to accept a column.")]
    pub resolver_probe_min_hits: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            currency_symbols: vec!["₩".to_string(), "$".to_string()],
            thousands_separators: vec![",".to_string()],
            date_hints: DateHintKeywords::default(),
            yearless_dates: YearlessDatePolicy::default(),
            numeric_min_ratio: 0.5,
            numeric_min_count: 3,
            date_sample_size: 20,
            date_pattern_min_ratio: 0.7,
            resolver_name_hint_ratio: 0.5,
            resolver_probe_size: 10,
            resolver_probe_min_hits: 5,
        }
    }
}

impl NormalizerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn schema_as_json() -> Result<String> {
        let schema = schemars::schema_for!(NormalizerConfig);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

/// One dashboard figure, addressed by spreadsheet column letter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct MetricSpec {
    #[schemars(description = "Display name of the metric (e.g. '자산합계').")]
    pub name: String,

    #[schemars(description = "Spreadsheet column letter holding the metric (e.g. 'AG').")]
    pub column: String,
}

impl MetricSpec {
    pub fn new(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct DashboardConfig {
    #[schemars(description = "Metrics to summarize, in display order.")]
    #[serde(default)]
    pub metrics: Vec<MetricSpec>,

    #[schemars(description = "Window selected before the user picks one. Defaults to all data.")]
    #[serde(default)]
    pub default_window: RelativeWindow,
}

impl DashboardConfig {
    pub fn new(metrics: Vec<MetricSpec>) -> Self {
        Self {
            metrics,
            default_window: RelativeWindow::All,
        }
    }

    pub fn with_default_window(mut self, window: RelativeWindow) -> Self {
        self.default_window = window;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn schema_as_json() -> Result<String> {
        let schema = schemars::schema_for!(DashboardConfig);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}
