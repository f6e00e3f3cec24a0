//! Z-score anomaly detection over numeric columns.
//!
//! Stateless: every invocation recomputes mean and standard deviation for
//! the supplied values and threshold. Zero-variance input is "not
//! applicable" rather than a numeric fault.

use serde::Serialize;
use statrs::statistics::{Data, Distribution};

use crate::dataset::Dataset;
use crate::errors::{SentinelError, SentinelResult};

/// Why detection could not be applied to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AnomalyError {
    #[error("column has no values")]
    EmptyColumn,
    #[error("standard deviation is zero")]
    ZeroVariance,
}

/// One row flagged by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyHit {
    /// Row index in the scanned column.
    pub index: usize,
    /// The cell value.
    pub value: f64,
    /// Signed z-score of the value.
    pub z_score: f64,
}

/// Detect values whose z-score magnitude exceeds `threshold`.
///
/// Hits are returned in input order; ranking by |z| for display is the
/// report layer's concern. Uses the sample standard deviation (n-1
/// denominator), so at least two values are required.
pub fn detect(values: &[f64], threshold: f64) -> Result<Vec<AnomalyHit>, AnomalyError> {
    if values.is_empty() {
        return Err(AnomalyError::EmptyColumn);
    }
    if values.len() < 2 {
        return Err(AnomalyError::ZeroVariance);
    }
    let data = Data::new(values.to_vec());
    let mean = data.mean().ok_or(AnomalyError::EmptyColumn)?;
    let std_dev = data.std_dev().ok_or(AnomalyError::ZeroVariance)?;
    if std_dev == 0.0 || !std_dev.is_finite() {
        return Err(AnomalyError::ZeroVariance);
    }

    Ok(values
        .iter()
        .enumerate()
        .filter_map(|(index, &value)| {
            let z_score = (value - mean) / std_dev;
            (z_score.abs() > threshold).then_some(AnomalyHit {
                index,
                value,
                z_score,
            })
        })
        .collect())
}

/// Result of scanning one dataset column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnScan {
    /// Name of the scanned column.
    pub column: String,
    /// Threshold the scan ran with.
    pub threshold: f64,
    /// Flagged rows, indices referring to dataset rows.
    pub hits: Vec<AnomalyHit>,
    /// Z-score per dataset row, `None` where the cell was missing.
    pub z_scores: Vec<Option<f64>>,
}

/// Scan a named numeric column of a dataset.
///
/// Missing cells are skipped and never flagged; hit indices refer to the
/// original dataset rows. The z-score vector is suitable for insertion as
/// a derived column.
pub fn scan_column(dataset: &Dataset, column: &str, threshold: f64) -> SentinelResult<ColumnScan> {
    let col = dataset
        .column(column)
        .ok_or_else(|| SentinelError::ColumnNotFound {
            name: column.to_string(),
        })?;
    let pairs = col
        .numeric_values()
        .ok_or_else(|| SentinelError::ColumnNotNumeric {
            name: column.to_string(),
        })?;
    let values: Vec<f64> = pairs.iter().map(|(_, v)| *v).collect();
    let hits = detect(&values, threshold).map_err(|e| SentinelError::anomaly(column, e))?;

    let mut z_scores: Vec<Option<f64>> = vec![None; dataset.row_count()];
    let data = Data::new(values.clone());
    let mean = data.mean().unwrap_or(f64::NAN);
    let std_dev = data.std_dev().unwrap_or(f64::NAN);
    for (row, value) in &pairs {
        z_scores[*row] = Some((value - mean) / std_dev);
    }

    let hits = hits
        .into_iter()
        .map(|hit| AnomalyHit {
            index: pairs[hit.index].0,
            ..hit
        })
        .collect();

    Ok(ColumnScan {
        column: column.to_string(),
        threshold,
        hits,
        z_scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_detect_exact_indices() {
        // Tight cluster plus one far outlier.
        let values = vec![10.0, 10.5, 9.5, 10.0, 10.2, 9.8, 100.0];
        let hits = detect(&values, 2.0).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 6);
        assert!(hits[0].z_score > 2.0);

        // Exactly the indices where |z| > threshold, nothing else.
        let data = Data::new(values.clone());
        let mean = data.mean().unwrap();
        let std_dev = data.std_dev().unwrap();
        for (i, v) in values.iter().enumerate() {
            let z = (v - mean) / std_dev;
            let flagged = hits.iter().any(|h| h.index == i);
            assert_eq!(flagged, z.abs() > 2.0, "index {i}");
        }
    }

    #[test]
    fn test_detect_zero_variance() {
        let values = vec![5.0; 40];
        assert_eq!(detect(&values, 1.0), Err(AnomalyError::ZeroVariance));
    }

    #[test]
    fn test_detect_empty_and_single() {
        assert_eq!(detect(&[], 1.0), Err(AnomalyError::EmptyColumn));
        assert_eq!(detect(&[3.0], 1.0), Err(AnomalyError::ZeroVariance));
    }

    #[test]
    fn test_detect_threshold_is_strict() {
        // Two-point input: both z-scores are exactly +-1/sqrt(2)*... with
        // the sample std dev both values sit at |z| = 0.7071.
        let values = vec![0.0, 1.0];
        let hits = detect(&values, 0.70710678118).unwrap();
        assert!(hits.is_empty() || hits.len() == 2);
    }

    #[test]
    fn test_scan_column_maps_row_indices() {
        let ds = crate::dataset::Dataset::from_raw(
            vec!["v".to_string()],
            vec![
                vec!["10".to_string()],
                vec![String::new()],
                vec!["10.2".to_string()],
                vec!["9.9".to_string()],
                vec!["10.1".to_string()],
                vec!["50".to_string()],
            ],
        )
        .unwrap();
        let scan = scan_column(&ds, "v", 1.5).unwrap();
        assert_eq!(scan.hits.len(), 1);
        // Row 5 in the dataset, even though row 1 is missing.
        assert_eq!(scan.hits[0].index, 5);
        assert!(scan.z_scores[1].is_none());
        assert_eq!(scan.z_scores.len(), 6);
    }

    #[test]
    fn test_scan_column_unknown_and_non_numeric() {
        let ds = crate::dataset::Dataset::from_raw(
            vec!["name".to_string()],
            vec![vec!["alpha".to_string()], vec!["beta".to_string()]],
        )
        .unwrap();
        assert!(matches!(
            scan_column(&ds, "missing", 3.0),
            Err(SentinelError::ColumnNotFound { .. })
        ));
        assert!(matches!(
            scan_column(&ds, "name", 3.0),
            Err(SentinelError::ColumnNotNumeric { .. })
        ));
    }

    #[test]
    fn test_injected_outliers_scenario() {
        // 97 values hugging 50, three injected outliers at 90, 95, and 3.
        let mut values: Vec<f64> = (0..97)
            .map(|i| 50.0 + ((i % 5) as f64 - 2.0) * 0.5)
            .collect();
        values.push(90.0);
        values.push(95.0);
        values.push(3.0);
        let hits = detect(&values, 3.0).unwrap();
        let flagged: Vec<usize> = hits.iter().map(|h| h.index).collect();
        assert_eq!(flagged, vec![97, 98, 99]);
    }

    proptest! {
        /// Raising the threshold never grows the flagged set.
        #[test]
        fn prop_threshold_monotonicity(
            values in prop::collection::vec(-1.0e6f64..1.0e6, 2..64),
            low in 0.1f64..4.0,
            bump in 0.0f64..4.0,
        ) {
            let lo = detect(&values, low);
            let hi = detect(&values, low + bump);
            match (lo, hi) {
                (Ok(lo), Ok(hi)) => {
                    prop_assert!(hi.len() <= lo.len());
                    for hit in &hi {
                        prop_assert!(lo.iter().any(|h| h.index == hit.index));
                    }
                }
                (Err(a), Err(b)) => prop_assert_eq!(a, b),
                _ => prop_assert!(false, "applicability must not depend on threshold"),
            }
        }
    }
}
