//! Typed, column-oriented dataset model.
//!
//! A [`Dataset`] is an ordered collection of named columns, each carrying a
//! semantic type inferred from the raw cell text. Column names are unique
//! within a dataset and all columns share the same row count. Datasets are
//! built from parsed input tables, merged by row-wise concatenation with
//! column union, and extended in place by derived-column insertion.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{SentinelError, SentinelResult};

/// Semantic column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Text,
    DateTime,
    Categorical,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Numeric => write!(f, "numeric"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::DateTime => write!(f, "datetime"),
            ColumnType::Categorical => write!(f, "categorical"),
        }
    }
}

/// Typed cell storage for one column. `None` marks a missing cell.
#[derive(Debug, Clone)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    DateTime(Vec<Option<NaiveDateTime>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::DateTime(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self.data {
            ColumnData::Numeric(_) => ColumnType::Numeric,
            ColumnData::Text(_) => ColumnType::Text,
            ColumnData::DateTime(_) => ColumnType::DateTime,
            ColumnData::Categorical(_) => ColumnType::Categorical,
        }
    }

    /// Cells as numeric values, when this is a numeric column.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// Cells as timestamps, when this is a datetime column.
    pub fn as_datetime(&self) -> Option<&[Option<NaiveDateTime>]> {
        match &self.data {
            ColumnData::DateTime(v) => Some(v),
            _ => None,
        }
    }

    /// Cells as strings, for text and categorical columns alike.
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match &self.data {
            ColumnData::Text(v) | ColumnData::Categorical(v) => Some(v),
            _ => None,
        }
    }

    /// Non-missing numeric values paired with their row indices.
    pub fn numeric_values(&self) -> Option<Vec<(usize, f64)>> {
        self.as_numeric().map(|cells| {
            cells
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| (i, v)))
                .collect()
        })
    }

    pub fn missing_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Text(v) | ColumnData::Categorical(v) => {
                v.iter().filter(|c| c.is_none()).count()
            }
            ColumnData::DateTime(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    pub fn unique_count(&self) -> usize {
        let mut seen = BTreeSet::new();
        for row in 0..self.len() {
            if let Some(text) = self.display_value(row) {
                seen.insert(text);
            }
        }
        seen.len()
    }

    /// Display text for a cell, `None` when the cell is missing.
    pub fn display_value(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(v) => v.get(row).copied().flatten().map(|f| format_number(f)),
            ColumnData::Text(v) | ColumnData::Categorical(v) => {
                v.get(row).and_then(|c| c.clone())
            }
            ColumnData::DateTime(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// Compact display form for numeric cells.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// An ordered collection of uniquely-named, equally-sized columns.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a dataset, enforcing the unique-name and equal-length invariants.
    pub fn from_columns(columns: Vec<Column>) -> SentinelResult<Self> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.name().to_string()) {
                return Err(SentinelError::DuplicateColumn {
                    name: column.name().to_string(),
                });
            }
            if column.len() != rows {
                return Err(SentinelError::LengthMismatch {
                    name: column.name().to_string(),
                    expected: rows,
                    actual: column.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Build a dataset from raw string cells, inferring column types.
    ///
    /// Empty cells are missing. Duplicate headers are deduplicated with a
    /// numeric suffix. Short rows are padded with missing cells; surplus
    /// cells beyond the header width are dropped.
    pub fn from_raw(headers: Vec<String>, rows: Vec<Vec<String>>) -> SentinelResult<Self> {
        let headers = dedupe_headers(headers);
        let inferencer = TypeInferencer::new();
        let mut columns = Vec::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            let cells: Vec<Option<String>> = rows
                .iter()
                .map(|row| {
                    row.get(idx)
                        .map(|s| s.trim())
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
                .collect();
            columns.push(Column::new(header.clone(), inferencer.infer(&cells)));
        }
        Self::from_columns(columns)
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Schema-aware column lookup. Callers branch on the returned handle
    /// instead of testing name membership ad hoc.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// First column whose name matches one of `candidates`, case-insensitively.
    pub fn find_by_names(&self, candidates: &[&str]) -> Option<&Column> {
        candidates.iter().find_map(|wanted| {
            self.columns
                .iter()
                .find(|c| c.name().eq_ignore_ascii_case(wanted))
        })
    }

    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.column_type() == ColumnType::Numeric)
            .collect()
    }

    pub fn datetime_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.column_type() == ColumnType::DateTime)
            .collect()
    }

    pub fn categorical_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.column_type() == ColumnType::Categorical)
            .collect()
    }

    pub fn missing_total(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }

    /// Insert a derived numeric column, replacing any existing column with
    /// the same name so the unique-name invariant holds.
    pub fn insert_numeric(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> SentinelResult<()> {
        let name = name.into();
        if values.len() != self.rows {
            return Err(SentinelError::LengthMismatch {
                name,
                expected: self.rows,
                actual: values.len(),
            });
        }
        let column = Column::new(name.clone(), ColumnData::Numeric(values));
        if let Some(existing) = self.columns.iter_mut().find(|c| c.name() == name) {
            *existing = column;
        } else {
            self.columns.push(column);
        }
        Ok(())
    }

    /// Row-wise concatenation with column union.
    ///
    /// Columns are matched by name in first-seen order. A source lacking a
    /// union column contributes missing cells for it. Cell text is pooled
    /// and types re-inferred over the merged data, so a column numeric in
    /// one source and text in another degrades to text overall.
    pub fn concat(datasets: &[Dataset]) -> SentinelResult<Dataset> {
        let sources: Vec<&Dataset> = datasets.iter().filter(|d| !d.is_empty()).collect();
        if sources.is_empty() {
            return Ok(Dataset::empty());
        }

        let mut union: Vec<String> = Vec::new();
        for ds in &sources {
            for column in ds.columns() {
                if !union.iter().any(|n| n == column.name()) {
                    union.push(column.name().to_string());
                }
            }
        }

        let total_rows: usize = sources.iter().map(|d| d.row_count()).sum();
        let inferencer = TypeInferencer::new();
        let mut columns = Vec::with_capacity(union.len());
        for name in &union {
            let mut cells: Vec<Option<String>> = Vec::with_capacity(total_rows);
            for ds in &sources {
                match ds.column(name) {
                    Some(column) => {
                        for row in 0..ds.row_count() {
                            cells.push(column.display_value(row));
                        }
                    }
                    None => cells.extend(std::iter::repeat(None).take(ds.row_count())),
                }
            }
            columns.push(Column::new(name.clone(), inferencer.infer(&cells)));
        }
        Self::from_columns(columns)
    }

    /// Display strings for one row, missing cells rendered empty.
    pub fn row_display(&self, row: usize) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| c.display_value(row).unwrap_or_default())
            .collect()
    }

    /// The first `n` rows as display strings.
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        (0..self.rows.min(n)).map(|r| self.row_display(r)).collect()
    }
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(headers.len());
    for header in headers {
        let base = if header.trim().is_empty() {
            "column".to_string()
        } else {
            header.trim().to_string()
        };
        let mut candidate = base.clone();
        let mut suffix = 2;
        while out.iter().any(|n| *n == candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        out.push(candidate);
    }
    out
}

/// Infers column types from raw cell text.
///
/// A column is numeric when every non-missing cell parses as a float,
/// datetime when every non-missing cell parses under a supported timestamp
/// format, categorical when the distinct-value count is small relative to
/// the column, and text otherwise.
pub struct TypeInferencer {
    date_shape: Regex,
}

/// Distinct-value ceiling below which a string column is categorical.
const CATEGORICAL_MAX_DISTINCT: usize = 32;

impl TypeInferencer {
    pub fn new() -> Self {
        Self {
            // Quick shape check before attempting the full format table.
            date_shape: Regex::new(r"^(\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{4})")
                .expect("static regex"),
        }
    }

    pub fn infer(&self, cells: &[Option<String>]) -> ColumnData {
        let present: Vec<&str> = cells.iter().flatten().map(String::as_str).collect();

        if !present.is_empty() && present.iter().all(|s| parse_numeric(s).is_some()) {
            return ColumnData::Numeric(
                cells
                    .iter()
                    .map(|c| c.as_deref().and_then(parse_numeric))
                    .collect(),
            );
        }

        if !present.is_empty()
            && present
                .iter()
                .all(|s| self.date_shape.is_match(s) && parse_datetime(s).is_some())
        {
            return ColumnData::DateTime(
                cells
                    .iter()
                    .map(|c| c.as_deref().and_then(parse_datetime))
                    .collect(),
            );
        }

        let owned: Vec<Option<String>> = cells.to_vec();
        let distinct: BTreeSet<&str> = present.iter().copied().collect();
        let categorical = !present.is_empty()
            && (distinct.len() <= CATEGORICAL_MAX_DISTINCT
                || distinct.len() * 2 <= present.len());
        if categorical {
            ColumnData::Categorical(owned)
        } else {
            ColumnData::Text(owned)
        }
    }
}

impl Default for TypeInferencer {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Reject inf/nan spellings so log-like text columns stay textual.
    if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}
