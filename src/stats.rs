//! Descriptive statistics over dataset columns.
//!
//! Aggregation is delegated to `statrs`; this module shapes the results
//! into the summary tables the terminal view and the report compiler
//! consume.

use chrono::NaiveDate;
use serde::Serialize;
use statrs::statistics::{Data, Distribution, Max, Min, OrderStatistics};

use crate::dataset::{Column, Dataset};

/// Describe-style summary of one numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Summarize the non-missing values of a numeric column.
///
/// Returns `None` when the column holds no values at all.
pub fn describe(column: &Column) -> Option<NumericSummary> {
    let cells = column.as_numeric()?;
    let values: Vec<f64> = cells.iter().flatten().copied().collect();
    if values.is_empty() {
        return None;
    }
    let missing = cells.len() - values.len();
    let mut data = Data::new(values.clone());
    Some(NumericSummary {
        column: column.name().to_string(),
        count: values.len(),
        missing,
        mean: data.mean().unwrap_or(f64::NAN),
        std_dev: data.std_dev().unwrap_or(0.0),
        min: data.min(),
        q25: data.percentile(25),
        median: data.median(),
        q75: data.percentile(75),
        max: data.max(),
    })
}

/// Summaries for every numeric column in the dataset, in column order.
pub fn describe_all(dataset: &Dataset) -> Vec<NumericSummary> {
    dataset
        .numeric_columns()
        .into_iter()
        .filter_map(describe)
        .collect()
}

/// One entry of a value-frequency table.
#[derive(Debug, Clone, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Frequency table of a text or categorical column, most frequent first.
/// Ties break alphabetically so the ordering is deterministic.
pub fn value_counts(column: &Column) -> Vec<ValueCount> {
    let Some(cells) = column.as_text() else {
        return Vec::new();
    };
    let mut counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
    for cell in cells.iter().flatten() {
        *counts.entry(cell.as_str()).or_insert(0) += 1;
    }
    let mut out: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount {
            value: value.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    out
}

/// Pearson correlation matrix over the dataset's numeric columns.
///
/// Each pair is computed over the rows where both cells are present.
/// Degenerate pairs (fewer than two shared rows, or zero variance) yield
/// `NaN`, matching the dataframe-engine convention.
pub fn correlation_matrix(dataset: &Dataset) -> (Vec<String>, Vec<Vec<f64>>) {
    let columns = dataset.numeric_columns();
    let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let matrix = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect();
    (names, matrix)
}

fn pearson(a: &Column, b: &Column) -> f64 {
    let (Some(xa), Some(xb)) = (a.as_numeric(), b.as_numeric()) else {
        return f64::NAN;
    };
    let pairs: Vec<(f64, f64)> = xa
        .iter()
        .zip(xb.iter())
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Daily mean of a numeric column over a datetime column, sorted by day.
///
/// Rows missing either cell are skipped. This is the resample step behind
/// the time-series view and report section.
pub fn daily_mean(time: &Column, values: &Column) -> Vec<(NaiveDate, f64)> {
    let (Some(times), Some(nums)) = (time.as_datetime(), values.as_numeric()) else {
        return Vec::new();
    };
    let mut buckets: std::collections::BTreeMap<NaiveDate, (f64, usize)> =
        std::collections::BTreeMap::new();
    for (ts, value) in times.iter().zip(nums.iter()) {
        if let (Some(ts), Some(value)) = (ts, value) {
            let entry = buckets.entry(ts.date()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }
    buckets
        .into_iter()
        .map(|(day, (sum, count))| (day, sum / count as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::from_raw(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_describe_known_values() {
        let ds = dataset(
            &["v"],
            &[&["2"], &["4"], &["4"], &["4"], &["5"], &["5"], &["7"], &["9"]],
        );
        let summary = describe(ds.column("v").unwrap()).unwrap();
        assert_eq!(summary.count, 8);
        assert_eq!(summary.missing, 0);
        assert!((summary.mean - 5.0).abs() < 1e-12);
        // Sample standard deviation (n-1 denominator).
        assert!((summary.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
        assert!((summary.median - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_describe_skips_missing() {
        let ds = dataset(&["v"], &[&["1"], &[""], &["3"]]);
        let summary = describe(ds.column("v").unwrap()).unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.missing, 1);
        assert!((summary.mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_value_counts_ordering() {
        let ds = dataset(
            &["event_type"],
            &[&["login"], &["logout"], &["login"], &["alert"], &["login"]],
        );
        let counts = value_counts(ds.column("event_type").unwrap());
        assert_eq!(counts[0].value, "login");
        assert_eq!(counts[0].count, 3);
        assert_eq!(counts.len(), 3);
        // Ties break alphabetically.
        assert_eq!(counts[1].value, "alert");
    }

    #[test]
    fn test_correlation_perfectly_correlated() {
        let ds = dataset(
            &["a", "b"],
            &[&["1", "2"], &["2", "4"], &["3", "6"], &["4", "8"]],
        );
        let (names, matrix) = correlation_matrix(&ds);
        assert_eq!(names, vec!["a", "b"]);
        assert!((matrix[0][1] - 1.0).abs() < 1e-12);
        assert!((matrix[1][0] - 1.0).abs() < 1e-12);
        assert!((matrix[0][0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_zero_variance_is_nan() {
        let ds = dataset(&["a", "b"], &[&["1", "5"], &["2", "5"], &["3", "5"]]);
        let (_, matrix) = correlation_matrix(&ds);
        assert!(matrix[0][1].is_nan());
    }

    #[test]
    fn test_daily_mean_buckets() {
        let ds = dataset(
            &["ts", "v"],
            &[
                &["2024-05-01 10:00:00", "10"],
                &["2024-05-01 18:00:00", "20"],
                &["2024-05-02 09:00:00", "30"],
            ],
        );
        let series = daily_mean(ds.column("ts").unwrap(), ds.column("v").unwrap());
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].0, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!((series[0].1 - 15.0).abs() < 1e-12);
        assert!((series[1].1 - 30.0).abs() < 1e-12);
    }
}
