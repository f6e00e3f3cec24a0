//! Chart rendering for report embedding.
//!
//! Renders histograms, box plots, anomaly scatter plots, and daily time
//! series through the `plotters` bitmap backend and encodes the result as
//! PNG bytes with the `image` crate. The report compiler embeds these
//! buffers; nothing here touches the page layout.

use chrono::NaiveDate;
use plotters::prelude::*;
use statrs::statistics::{Data, Max, Min, OrderStatistics};

use crate::anomaly::AnomalyHit;
use crate::errors::{SentinelError, SentinelResult};

const CHART_WIDTH: u32 = 640;
const CHART_HEIGHT: u32 = 420;
const HISTOGRAM_BINS: usize = 20;

/// Histogram of a numeric column.
pub fn histogram(values: &[f64], title: &str) -> SentinelResult<Vec<u8>> {
    if values.is_empty() {
        return Err(SentinelError::chart("no values to plot"));
    }
    let bins = bin_values(values, HISTOGRAM_BINS);
    let (x_min, x_max) = expand_range(
        bins.first().map(|b| b.0).unwrap_or(0.0),
        bins.last().map(|b| b.1).unwrap_or(1.0),
    );
    let y_max = bins.iter().map(|b| b.2).max().unwrap_or(1).max(1);

    let mut buf = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| SentinelError::chart(e))?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(32)
            .y_label_area_size(48)
            .build_cartesian_2d(x_min..x_max, 0u32..(y_max + y_max / 10 + 1))
            .map_err(|e| SentinelError::chart(e))?;
        chart
            .configure_mesh()
            .draw()
            .map_err(|e| SentinelError::chart(e))?;
        chart
            .draw_series(bins.iter().map(|(lo, hi, count)| {
                Rectangle::new([(*lo, 0u32), (*hi, *count)], BLUE.mix(0.6).filled())
            }))
            .map_err(|e| SentinelError::chart(e))?;
        root.present().map_err(|e| SentinelError::chart(e))?;
    }
    encode_png(buf)
}

/// Box plot of a numeric column (quartile box, median line, whiskers).
pub fn box_plot(values: &[f64], title: &str) -> SentinelResult<Vec<u8>> {
    if values.is_empty() {
        return Err(SentinelError::chart("no values to plot"));
    }
    let mut data = Data::new(values.to_vec());
    let q1 = data.percentile(25);
    let q3 = data.percentile(75);
    let median = data.median();
    let (y_min, y_max) = expand_range(data.min(), data.max());

    let mut buf = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| SentinelError::chart(e))?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(16)
            .y_label_area_size(48)
            .build_cartesian_2d(0.0f64..2.0, y_min..y_max)
            .map_err(|e| SentinelError::chart(e))?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .draw()
            .map_err(|e| SentinelError::chart(e))?;

        // Whiskers and caps.
        let whiskers = vec![
            vec![(1.0, data.min()), (1.0, q1)],
            vec![(1.0, q3), (1.0, data.max())],
            vec![(0.85, data.min()), (1.15, data.min())],
            vec![(0.85, data.max()), (1.15, data.max())],
        ];
        chart
            .draw_series(
                whiskers
                    .into_iter()
                    .map(|points| PathElement::new(points, BLACK.stroke_width(1))),
            )
            .map_err(|e| SentinelError::chart(e))?;
        // Interquartile box and median.
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(0.6, q1), (1.4, q3)],
                BLUE.mix(0.25).filled(),
            )))
            .map_err(|e| SentinelError::chart(e))?;
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(0.6, q1), (1.4, q3)],
                BLUE.stroke_width(2),
            )))
            .map_err(|e| SentinelError::chart(e))?;
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(0.6, median), (1.4, median)],
                RED.stroke_width(2),
            )))
            .map_err(|e| SentinelError::chart(e))?;
        root.present().map_err(|e| SentinelError::chart(e))?;
    }
    encode_png(buf)
}

/// Scatter plot of values by row index, with anomaly hits highlighted.
pub fn anomaly_scatter(
    points: &[(usize, f64)],
    hits: &[AnomalyHit],
    title: &str,
) -> SentinelResult<Vec<u8>> {
    if points.is_empty() {
        return Err(SentinelError::chart("no values to plot"));
    }
    let flagged: std::collections::HashSet<usize> = hits.iter().map(|h| h.index).collect();
    let x_max = points.iter().map(|(i, _)| *i).max().unwrap_or(0) as f64;
    let (y_min, y_max) = expand_range(
        points.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min),
        points
            .iter()
            .map(|(_, v)| *v)
            .fold(f64::NEG_INFINITY, f64::max),
    );

    let mut buf = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| SentinelError::chart(e))?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(32)
            .y_label_area_size(48)
            .build_cartesian_2d(0.0f64..(x_max + 1.0), y_min..y_max)
            .map_err(|e| SentinelError::chart(e))?;
        chart
            .configure_mesh()
            .draw()
            .map_err(|e| SentinelError::chart(e))?;
        chart
            .draw_series(
                points
                    .iter()
                    .filter(|(i, _)| !flagged.contains(i))
                    .map(|(i, v)| Circle::new((*i as f64, *v), 3, BLUE.filled())),
            )
            .map_err(|e| SentinelError::chart(e))?;
        chart
            .draw_series(
                points
                    .iter()
                    .filter(|(i, _)| flagged.contains(i))
                    .map(|(i, v)| Circle::new((*i as f64, *v), 5, RED.filled())),
            )
            .map_err(|e| SentinelError::chart(e))?;
        root.present().map_err(|e| SentinelError::chart(e))?;
    }
    encode_png(buf)
}

/// Daily mean line chart.
pub fn time_series(points: &[(NaiveDate, f64)], title: &str) -> SentinelResult<Vec<u8>> {
    if points.len() < 2 {
        return Err(SentinelError::chart("need at least two days to plot"));
    }
    let start = points[0].0;
    let end = points[points.len() - 1].0;
    let (y_min, y_max) = expand_range(
        points.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min),
        points
            .iter()
            .map(|(_, v)| *v)
            .fold(f64::NEG_INFINITY, f64::max),
    );

    let mut buf = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| SentinelError::chart(e))?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(32)
            .y_label_area_size(48)
            .build_cartesian_2d(start..end, y_min..y_max)
            .map_err(|e| SentinelError::chart(e))?;
        chart
            .configure_mesh()
            .x_labels(6)
            .draw()
            .map_err(|e| SentinelError::chart(e))?;
        chart
            .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
            .map_err(|e| SentinelError::chart(e))?;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|(d, v)| Circle::new((*d, *v), 3, BLUE.filled())),
            )
            .map_err(|e| SentinelError::chart(e))?;
        root.present().map_err(|e| SentinelError::chart(e))?;
    }
    encode_png(buf)
}

/// Equal-width bins as (low, high, count), covering [min, max].
pub(crate) fn bin_values(values: &[f64], bins: usize) -> Vec<(f64, f64, u32)> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if max <= min {
        return vec![(min - 0.5, min + 0.5, values.len() as u32)];
    }
    let width = (max - min) / bins as f64;
    let mut counts = vec![0u32; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            (
                min + width * i as f64,
                min + width * (i + 1) as f64,
                count,
            )
        })
        .collect()
}

/// Widen a degenerate or tight range so axes always have visible span.
fn expand_range(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max - min < f64::EPSILON {
        return (min - 0.5, max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn encode_png(buf: Vec<u8>) -> SentinelResult<Vec<u8>> {
    let img = image::RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, buf)
        .ok_or_else(|| SentinelError::chart("pixel buffer size mismatch"))?;
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| SentinelError::chart(e))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_values_counts_everything() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let bins = bin_values(&values, 10);
        assert_eq!(bins.len(), 10);
        let total: u32 = bins.iter().map(|b| b.2).sum();
        assert_eq!(total, 100);
        assert_eq!(bins[0].0, 0.0);
        assert!((bins[9].1 - 99.0).abs() < 1e-9);
    }

    #[test]
    fn test_bin_values_degenerate() {
        let bins = bin_values(&[7.0, 7.0, 7.0], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].2, 3);
    }

    #[test]
    fn test_expand_range() {
        let (lo, hi) = expand_range(5.0, 5.0);
        assert!(lo < 5.0 && hi > 5.0);
        let (lo, hi) = expand_range(0.0, 10.0);
        assert!(lo < 0.0 && hi > 10.0);
    }
}
