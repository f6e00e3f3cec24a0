//! Report compilation.
//!
//! `compose` turns a dataset and a report specification into an ordered
//! sequence of content blocks; `render` (in [`pdf`]) turns those blocks
//! into a PDF byte stream. Sections are emitted in a fixed canonical
//! order regardless of how the caller listed them, and sections whose
//! required columns are absent are skipped without error.

mod pdf;

pub use pdf::render;

use std::collections::BTreeSet;

use chrono::Local;
use clap::ValueEnum;
use serde::Serialize;

use crate::anomaly::{self, AnomalyError, AnomalyHit};
use crate::charts;
use crate::dataset::{Column, ColumnType, Dataset};
use crate::errors::{SentinelError, SentinelResult};
use crate::stats;
use crate::threat_intel::IntelDatabase;

/// Report sections. Declaration order is the canonical emission order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Overview,
    Statistics,
    Visualizations,
    Correlation,
    TimeSeries,
    Anomalies,
    EventTypes,
    SourceDestination,
    ThreatIntel,
    DataSample,
}

impl Section {
    /// Every section, in canonical order.
    pub const CANONICAL: [Section; 10] = [
        Section::Overview,
        Section::Statistics,
        Section::Visualizations,
        Section::Correlation,
        Section::TimeSeries,
        Section::Anomalies,
        Section::EventTypes,
        Section::SourceDestination,
        Section::ThreatIntel,
        Section::DataSample,
    ];

    /// Default selection, matching the dashboard's preselected sections.
    pub const DEFAULT: [Section; 3] =
        [Section::Overview, Section::Statistics, Section::Visualizations];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Overview => "Dataset Overview",
            Section::Statistics => "Statistical Analysis",
            Section::Visualizations => "Key Visualizations",
            Section::Correlation => "Correlation Analysis",
            Section::TimeSeries => "Time Series Analysis",
            Section::Anomalies => "Anomaly Detection",
            Section::EventTypes => "Event Type Analysis",
            Section::SourceDestination => "Source/Destination Analysis",
            Section::ThreatIntel => "Threat Intelligence",
            Section::DataSample => "Data Sample",
        }
    }
}

/// What to compile: selected sections plus report metadata.
#[derive(Debug, Clone)]
pub struct ReportSpec {
    pub title: String,
    pub author: Option<String>,
    pub classification: Option<String>,
    /// Selected sections; emission follows canonical order, not this set's
    /// insertion order.
    pub sections: BTreeSet<Section>,
    /// Names of the source files behind the dataset.
    pub sources: Vec<String>,
    /// Column to run anomaly detection on; first numeric column when unset.
    pub anomaly_column: Option<String>,
    /// Z-score magnitude threshold.
    pub threshold: f64,
}

impl ReportSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
            classification: None,
            sections: Section::DEFAULT.into_iter().collect(),
            sources: Vec::new(),
            anomaly_column: None,
            threshold: 3.0,
        }
    }

    pub fn with_sections(mut self, sections: impl IntoIterator<Item = Section>) -> Self {
        self.sections = sections.into_iter().collect();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_anomaly_column(mut self, column: Option<String>) -> Self {
        self.anomaly_column = column;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Output file name built from the title and the current date.
    pub fn output_file_name(&self) -> String {
        let safe: String = self
            .title
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}_{}.pdf", safe, Local::now().format("%Y-%m-%d"))
    }
}

/// Paragraph rendering styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Normal,
    /// Small grey metadata line.
    Meta,
    /// Italic note.
    Note,
}

/// One content block of the composed document.
#[derive(Debug, Clone)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String, style: TextStyle },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Image { png: Vec<u8>, caption: String },
}

/// An ordered block sequence, rendered once to bytes and discarded.
#[derive(Debug, Clone, Default)]
pub struct ReportDocument {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    /// Section headings (level 2), in emission order. Test hook and
    /// table-of-contents source.
    pub fn section_headings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { level: 2, text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Rows flagged by the detector, sorted by descending |z| for display.
pub fn ranked(hits: &[AnomalyHit]) -> Vec<AnomalyHit> {
    let mut out = hits.to_vec();
    out.sort_by(|a, b| {
        b.z_score
            .abs()
            .partial_cmp(&a.z_score.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}

/// Compile a dataset and spec straight to PDF bytes.
///
/// All-or-nothing: any failure surfaces as one error and no partial
/// output escapes.
pub fn compile(dataset: &Dataset, spec: &ReportSpec) -> SentinelResult<Vec<u8>> {
    let document = compose(dataset, spec)?;
    render(&document)
}

/// Compose the ordered block document for a dataset and spec.
pub fn compose(dataset: &Dataset, spec: &ReportSpec) -> SentinelResult<ReportDocument> {
    let mut blocks = Vec::new();
    compose_cover(dataset, spec, &mut blocks);

    for section in Section::CANONICAL {
        if !spec.sections.contains(&section) {
            continue;
        }
        match section {
            Section::Overview => compose_overview(dataset, &mut blocks),
            Section::Statistics => compose_statistics(dataset, &mut blocks),
            Section::Visualizations => compose_visualizations(dataset, spec, &mut blocks)?,
            Section::Correlation => compose_correlation(dataset, &mut blocks),
            Section::TimeSeries => compose_time_series(dataset, spec, &mut blocks)?,
            Section::Anomalies => compose_anomalies(dataset, spec, &mut blocks)?,
            Section::EventTypes => compose_event_types(dataset, &mut blocks),
            Section::SourceDestination => compose_source_destination(dataset, &mut blocks),
            Section::ThreatIntel => compose_threat_intel(dataset, &mut blocks),
            Section::DataSample => compose_data_sample(dataset, &mut blocks),
        }
    }

    Ok(ReportDocument {
        title: spec.title.clone(),
        blocks,
    })
}

fn heading(blocks: &mut Vec<Block>, level: u8, text: impl Into<String>) {
    blocks.push(Block::Heading {
        level,
        text: text.into(),
    });
}

fn paragraph(blocks: &mut Vec<Block>, style: TextStyle, text: impl Into<String>) {
    blocks.push(Block::Paragraph {
        text: text.into(),
        style,
    });
}

fn compose_cover(dataset: &Dataset, spec: &ReportSpec, blocks: &mut Vec<Block>) {
    heading(blocks, 1, spec.title.clone());
    paragraph(
        blocks,
        TextStyle::Meta,
        format!(
            "Report generated: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
    );
    paragraph(
        blocks,
        TextStyle::Meta,
        format!("Total records: {}", dataset.row_count()),
    );
    paragraph(
        blocks,
        TextStyle::Meta,
        format!("Total columns: {}", dataset.column_count()),
    );
    if !spec.sources.is_empty() {
        paragraph(
            blocks,
            TextStyle::Meta,
            format!("Source files: {}", spec.sources.join(", ")),
        );
    }
    if let Some(author) = &spec.author {
        paragraph(blocks, TextStyle::Meta, format!("Author: {author}"));
    }
    if let Some(classification) = &spec.classification {
        paragraph(
            blocks,
            TextStyle::Meta,
            format!("Classification: {classification}"),
        );
    }
}

fn compose_overview(dataset: &Dataset, blocks: &mut Vec<Block>) {
    heading(blocks, 2, Section::Overview.title());
    paragraph(
        blocks,
        TextStyle::Normal,
        format!(
            "{} records across {} columns, {} missing cells.",
            dataset.row_count(),
            dataset.column_count(),
            dataset.missing_total()
        ),
    );
    let rows = dataset
        .columns()
        .iter()
        .map(|c| {
            vec![
                c.name().to_string(),
                c.column_type().to_string(),
                c.unique_count().to_string(),
                c.missing_count().to_string(),
            ]
        })
        .collect();
    blocks.push(Block::Table {
        headers: ["Column", "Type", "Unique Values", "Missing Values"]
            .map(String::from)
            .to_vec(),
        rows,
    });
}

fn compose_statistics(dataset: &Dataset, blocks: &mut Vec<Block>) {
    let summaries = stats::describe_all(dataset);
    if summaries.is_empty() {
        log::debug!("No numeric columns; skipping statistics section");
        return;
    }
    heading(blocks, 2, Section::Statistics.title());
    let rows = summaries
        .iter()
        .map(|s| {
            vec![
                s.column.clone(),
                s.count.to_string(),
                fmt_float(s.mean),
                fmt_float(s.std_dev),
                fmt_float(s.min),
                fmt_float(s.q25),
                fmt_float(s.median),
                fmt_float(s.q75),
                fmt_float(s.max),
            ]
        })
        .collect();
    blocks.push(Block::Table {
        headers: [
            "Column", "Count", "Mean", "Std Dev", "Min", "25%", "Median", "75%", "Max",
        ]
        .map(String::from)
        .to_vec(),
        rows,
    });
}

fn compose_visualizations(
    dataset: &Dataset,
    spec: &ReportSpec,
    blocks: &mut Vec<Block>,
) -> SentinelResult<()> {
    let Some(column) = target_numeric_column(dataset, spec) else {
        log::debug!("No numeric columns; skipping visualizations section");
        return Ok(());
    };
    let values: Vec<f64> = column
        .numeric_values()
        .unwrap_or_default()
        .into_iter()
        .map(|(_, v)| v)
        .collect();
    if values.is_empty() {
        return Ok(());
    }
    heading(blocks, 2, Section::Visualizations.title());
    blocks.push(Block::Image {
        png: charts::histogram(&values, &format!("Distribution of {}", column.name()))?,
        caption: format!("Distribution of {}", column.name()),
    });
    blocks.push(Block::Image {
        png: charts::box_plot(&values, &format!("Box plot of {}", column.name()))?,
        caption: format!("Box plot of {}", column.name()),
    });
    Ok(())
}

fn compose_correlation(dataset: &Dataset, blocks: &mut Vec<Block>) {
    let (names, matrix) = stats::correlation_matrix(dataset);
    if names.len() < 2 {
        log::debug!("Fewer than two numeric columns; skipping correlation section");
        return;
    }
    heading(blocks, 2, Section::Correlation.title());
    let mut headers = vec![String::new()];
    headers.extend(names.iter().cloned());
    let rows = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut row = vec![name.clone()];
            row.extend(matrix[i].iter().map(|v| fmt_float(*v)));
            row
        })
        .collect();
    blocks.push(Block::Table { headers, rows });
}

fn compose_time_series(
    dataset: &Dataset,
    spec: &ReportSpec,
    blocks: &mut Vec<Block>,
) -> SentinelResult<()> {
    let time_columns = dataset.datetime_columns();
    let (Some(time), Some(values)) = (
        time_columns.first().copied(),
        target_numeric_column(dataset, spec),
    ) else {
        log::debug!("Missing datetime or numeric column; skipping time series section");
        return Ok(());
    };
    let series = stats::daily_mean(time, values);
    if series.len() < 2 {
        return Ok(());
    }
    heading(blocks, 2, Section::TimeSeries.title());
    let caption = format!("Daily mean of {} over {}", values.name(), time.name());
    blocks.push(Block::Image {
        png: charts::time_series(&series, &caption)?,
        caption,
    });
    Ok(())
}

const ANOMALY_TABLE_LIMIT: usize = 10;

fn compose_anomalies(
    dataset: &Dataset,
    spec: &ReportSpec,
    blocks: &mut Vec<Block>,
) -> SentinelResult<()> {
    let Some(column) = target_numeric_column(dataset, spec) else {
        log::debug!("No numeric columns; skipping anomaly section");
        return Ok(());
    };
    let name = column.name().to_string();

    let scan = match anomaly::scan_column(dataset, &name, spec.threshold) {
        Ok(scan) => scan,
        Err(SentinelError::Anomaly {
            column,
            source: source @ (AnomalyError::ZeroVariance | AnomalyError::EmptyColumn),
        }) => {
            heading(blocks, 2, Section::Anomalies.title());
            paragraph(
                blocks,
                TextStyle::Note,
                format!("Anomaly detection not applicable for '{column}': {source}."),
            );
            return Ok(());
        }
        Err(other) => return Err(other),
    };

    heading(blocks, 2, Section::Anomalies.title());
    paragraph(
        blocks,
        TextStyle::Normal,
        format!(
            "Anomalies in {} (|z| > {}): {} detected.",
            name,
            spec.threshold,
            scan.hits.len()
        ),
    );

    if !scan.hits.is_empty() {
        let display = ranked(&scan.hits);
        if display.len() > ANOMALY_TABLE_LIMIT {
            paragraph(
                blocks,
                TextStyle::Meta,
                format!(
                    "Showing top {} of {} flagged rows.",
                    ANOMALY_TABLE_LIMIT,
                    display.len()
                ),
            );
        }
        let rows = display
            .iter()
            .take(ANOMALY_TABLE_LIMIT)
            .map(|hit| {
                vec![
                    hit.index.to_string(),
                    fmt_float(hit.value),
                    fmt_float(hit.z_score),
                ]
            })
            .collect();
        blocks.push(Block::Table {
            headers: vec!["Row".to_string(), name.clone(), "Z-Score".to_string()],
            rows,
        });

        let points = column.numeric_values().unwrap_or_default();
        let caption = format!("Anomaly detection for {name}");
        blocks.push(Block::Image {
            png: charts::anomaly_scatter(&points, &scan.hits, &caption)?,
            caption,
        });
    }
    Ok(())
}

const VALUE_COUNT_LIMIT: usize = 15;

fn compose_event_types(dataset: &Dataset, blocks: &mut Vec<Block>) {
    let Some(column) = dataset.find_by_names(&["event_type", "event", "alert_type"]) else {
        log::debug!("No event type column; skipping event type section");
        return;
    };
    let counts = stats::value_counts(column);
    if counts.is_empty() {
        return;
    }
    heading(blocks, 2, Section::EventTypes.title());
    value_count_table(blocks, column.name(), &counts);
}

fn compose_source_destination(dataset: &Dataset, blocks: &mut Vec<Block>) {
    let source = dataset.find_by_names(&["source_ip", "src_ip", "source", "src_addr"]);
    let destination =
        dataset.find_by_names(&["destination_ip", "dst_ip", "destination", "dst_addr"]);
    if source.is_none() && destination.is_none() {
        log::debug!("No address columns; skipping source/destination section");
        return;
    }
    heading(blocks, 2, Section::SourceDestination.title());
    for column in [source, destination].into_iter().flatten() {
        let counts = stats::value_counts(column);
        if counts.is_empty() {
            continue;
        }
        paragraph(
            blocks,
            TextStyle::Normal,
            format!("Top talkers by {}:", column.name()),
        );
        value_count_table(blocks, column.name(), &counts);
    }
}

fn compose_threat_intel(dataset: &Dataset, blocks: &mut Vec<Block>) {
    let matches = IntelDatabase::new().match_dataset(dataset);
    if matches.is_empty() {
        log::debug!("No IoC matches; skipping threat intelligence section");
        return;
    }
    heading(blocks, 2, Section::ThreatIntel.title());
    paragraph(
        blocks,
        TextStyle::Note,
        "Matched against the bundled sample IoC database; not a live threat feed.",
    );
    let rows = matches
        .iter()
        .map(|m| {
            vec![
                m.indicator_type.clone(),
                m.value.clone(),
                m.column.clone(),
                m.row_count.to_string(),
                m.description.clone(),
            ]
        })
        .collect();
    blocks.push(Block::Table {
        headers: ["Indicator", "Value", "Column", "Rows", "Description"]
            .map(String::from)
            .to_vec(),
        rows,
    });
}

const SAMPLE_ROW_LIMIT: usize = 20;
const SAMPLE_COLUMN_LIMIT: usize = 8;

fn compose_data_sample(dataset: &Dataset, blocks: &mut Vec<Block>) {
    if dataset.is_empty() {
        return;
    }
    heading(blocks, 2, Section::DataSample.title());
    let names = dataset.column_names();
    let shown = names.len().min(SAMPLE_COLUMN_LIMIT);
    if shown < names.len() {
        paragraph(
            blocks,
            TextStyle::Meta,
            format!("Showing first {} of {} columns.", shown, names.len()),
        );
    }
    let headers: Vec<String> = names.iter().take(shown).map(|n| n.to_string()).collect();
    let rows = dataset
        .head(SAMPLE_ROW_LIMIT)
        .into_iter()
        .map(|row| row.into_iter().take(shown).collect())
        .collect();
    blocks.push(Block::Table { headers, rows });
}

fn value_count_table(blocks: &mut Vec<Block>, name: &str, counts: &[stats::ValueCount]) {
    if counts.len() > VALUE_COUNT_LIMIT {
        paragraph(
            blocks,
            TextStyle::Meta,
            format!(
                "Showing top {} of {} distinct values.",
                VALUE_COUNT_LIMIT,
                counts.len()
            ),
        );
    }
    let rows = counts
        .iter()
        .take(VALUE_COUNT_LIMIT)
        .map(|c| vec![c.value.clone(), c.count.to_string()])
        .collect();
    blocks.push(Block::Table {
        headers: [name.to_string(), "Count".to_string()].to_vec(),
        rows,
    });
}

/// The column anomaly detection and single-column charts run on: the
/// configured column when it resolves to a numeric one, otherwise the
/// first numeric column.
fn target_numeric_column<'a>(dataset: &'a Dataset, spec: &ReportSpec) -> Option<&'a Column> {
    if let Some(name) = &spec.anomaly_column {
        if let Some(column) = dataset.column(name) {
            if column.column_type() == ColumnType::Numeric {
                return Some(column);
            }
            log::warn!("Configured anomaly column '{name}' is not numeric");
        } else {
            log::warn!("Configured anomaly column '{name}' not found");
        }
    }
    dataset.numeric_columns().into_iter().next()
}

fn fmt_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value != 0.0 && value.abs() < 0.01 {
        format!("{value:.4}")
    } else {
        format!("{value:.2}")
    }
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

    fn security_dataset() -> Dataset {
        dataset(
            &["timestamp", "event_type", "source_ip", "bytes"],
            &[
                &["2024-05-01 10:00:00", "login", "10.0.0.1", "120"],
                &["2024-05-01 11:00:00", "login", "10.0.0.2", "98"],
                &["2024-05-02 09:00:00", "logout", "10.0.0.1", "101"],
                &["2024-05-02 10:00:00", "alert", "185.220.101.1", "110"],
            ],
        )
    }

    #[test]
    fn test_empty_selection_yields_cover_only() {
        let ds = security_dataset();
        let spec = ReportSpec::new("SOC Data Analysis Report").with_sections([]);
        let doc = compose(&ds, &spec).unwrap();
        assert!(doc.section_headings().is_empty());
        assert!(matches!(
            doc.blocks.first(),
            Some(Block::Heading { level: 1, .. })
        ));
        // Cover metadata still present.
        assert!(doc.blocks.iter().any(|b| matches!(
            b,
            Block::Paragraph { text, .. } if text.starts_with("Total records: 4")
        )));
    }

    #[test]
    fn test_missing_columns_skip_section() {
        let ds = dataset(&["bytes"], &[&["1"], &["2"], &["3"]]);
        let spec = ReportSpec::new("r")
            .with_sections([Section::SourceDestination, Section::EventTypes]);
        let doc = compose(&ds, &spec).unwrap();
        assert!(doc.section_headings().is_empty());
    }

    #[test]
    fn test_canonical_order_ignores_selection_order() {
        let ds = security_dataset();
        // Anomaly section on a zero-variance column reports "not applicable".
        let mut ds = ds;
        ds.insert_numeric("flat", vec![Some(1.0); 4]).unwrap();
        let spec = ReportSpec::new("r")
            .with_sections([Section::DataSample, Section::Anomalies, Section::Overview])
            .with_anomaly_column(Some("flat".to_string()));
        let doc = compose(&ds, &spec).unwrap();
        assert_eq!(
            doc.section_headings(),
            vec!["Dataset Overview", "Anomaly Detection", "Data Sample"]
        );
    }

    #[test]
    fn test_zero_variance_reports_not_applicable() {
        let ds = dataset(&["v"], &[&["5"], &["5"], &["5"]]);
        let spec = ReportSpec::new("r").with_sections([Section::Anomalies]);
        let doc = compose(&ds, &spec).unwrap();
        assert!(doc.blocks.iter().any(|b| matches!(
            b,
            Block::Paragraph { text, style: TextStyle::Note } if text.contains("not applicable")
        )));
    }

    #[test]
    fn test_threat_intel_emits_on_sample_match() {
        let ds = security_dataset();
        let spec = ReportSpec::new("r").with_sections([Section::ThreatIntel]);
        let doc = compose(&ds, &spec).unwrap();
        assert_eq!(doc.section_headings(), vec!["Threat Intelligence"]);
        assert!(doc.blocks.iter().any(|b| matches!(
            b,
            Block::Table { rows, .. } if rows.iter().any(|r| r.contains(&"185.220.101.1".to_string()))
        )));
    }

    #[test]
    fn test_threat_intel_silent_without_matches() {
        let ds = dataset(&["source_ip"], &[&["10.0.0.1"], &["10.0.0.2"]]);
        let spec = ReportSpec::new("r").with_sections([Section::ThreatIntel]);
        let doc = compose(&ds, &spec).unwrap();
        assert!(doc.section_headings().is_empty());
    }

    #[test]
    fn test_overview_and_statistics_tables() {
        let ds = security_dataset();
        let spec =
            ReportSpec::new("r").with_sections([Section::Overview, Section::Statistics]);
        let doc = compose(&ds, &spec).unwrap();
        assert_eq!(
            doc.section_headings(),
            vec!["Dataset Overview", "Statistical Analysis"]
        );
        let tables: Vec<_> = doc
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::Table { .. }))
            .collect();
        assert_eq!(tables.len(), 2);
    }

    #[test]
    fn test_correlation_needs_two_numeric_columns() {
        let ds = dataset(&["a"], &[&["1"], &["2"]]);
        let spec = ReportSpec::new("r").with_sections([Section::Correlation]);
        let doc = compose(&ds, &spec).unwrap();
        assert!(doc.section_headings().is_empty());

        let ds = dataset(&["a", "b"], &[&["1", "2"], &["2", "4"], &["3", "7"]]);
        let doc = compose(&ds, &spec).unwrap();
        assert_eq!(doc.section_headings(), vec!["Correlation Analysis"]);
    }

    #[test]
    fn test_ranked_sorts_by_magnitude() {
        let hits = vec![
            AnomalyHit { index: 0, value: 1.0, z_score: 3.2 },
            AnomalyHit { index: 1, value: -5.0, z_score: -6.1 },
            AnomalyHit { index: 2, value: 2.0, z_score: 4.0 },
        ];
        let sorted = ranked(&hits);
        assert_eq!(
            sorted.iter().map(|h| h.index).collect::<Vec<_>>(),
            vec![1, 2, 0]
        );
    }

    #[test]
    fn test_data_sample_caps_columns() {
        let headers: Vec<String> = (0..12).map(|i| format!("c{i}")).collect();
        let row: Vec<String> = (0..12).map(|i| i.to_string()).collect();
        let ds = Dataset::from_raw(headers, vec![row]).unwrap();
        let spec = ReportSpec::new("r").with_sections([Section::DataSample]);
        let doc = compose(&ds, &spec).unwrap();
        let table = doc
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Table { headers, rows } => Some((headers, rows)),
                _ => None,
            })
            .unwrap();
        assert_eq!(table.0.len(), SAMPLE_COLUMN_LIMIT);
        assert_eq!(table.1[0].len(), SAMPLE_COLUMN_LIMIT);
    }

    #[test]
    fn test_output_file_name() {
        let spec = ReportSpec::new("SOC Data Analysis Report");
        let name = spec.output_file_name();
        assert!(name.starts_with("SOC_Data_Analysis_Report_"));
        assert!(name.ends_with(".pdf"));
    }
}
