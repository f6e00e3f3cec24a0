//! Input parsing for uploaded event files.
//!
//! Each supported format (CSV, spreadsheet, JSON) is parsed into raw
//! string cells and handed to the dataset layer for type inference. Text
//! inputs decode as UTF-8 first and fall back to Latin-1 on invalid
//! bytes, so legacy exports still load.

use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Reader};

use crate::dataset::Dataset;
use crate::errors::{SentinelError, SentinelResult};

/// Supported input file formats, recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
    Json,
}

/// Recognize the format of a path by its extension.
pub fn detect_format(path: &Path) -> Option<FileFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(FileFormat::Csv),
        "xlsx" | "xlsm" | "xls" | "ods" => Some(FileFormat::Spreadsheet),
        "json" => Some(FileFormat::Json),
        _ => None,
    }
}

/// Short display name for a path (file name component).
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse one input file into a typed dataset.
pub fn load_path(path: &Path) -> SentinelResult<Dataset> {
    let name = display_name(path);
    let format = detect_format(path).ok_or_else(|| SentinelError::UnsupportedFormat {
        name: name.clone(),
    })?;
    log::debug!("Loading '{}' as {:?}", name, format);

    let dataset = match format {
        FileFormat::Csv => {
            let bytes =
                fs::read(path).map_err(|e| SentinelError::io(e, Some(path.to_path_buf())))?;
            parse_csv(&name, &decode_text(bytes))?
        }
        FileFormat::Json => {
            let bytes =
                fs::read(path).map_err(|e| SentinelError::io(e, Some(path.to_path_buf())))?;
            parse_json(&name, &decode_text(bytes))?
        }
        FileFormat::Spreadsheet => parse_spreadsheet(&name, path)?,
    };

    if dataset.is_empty() {
        return Err(SentinelError::EmptyInput { name });
    }
    log::info!(
        "Loaded '{}': {} rows, {} columns",
        name,
        dataset.row_count(),
        dataset.column_count()
    );
    Ok(dataset)
}

/// Decode bytes as UTF-8, falling back to Latin-1 when the input is not
/// valid UTF-8. Latin-1 maps every byte to the same code point, so the
/// fallback cannot fail.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("Input is not valid UTF-8, falling back to Latin-1");
            err.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}

fn parse_csv(name: &str, text: &str) -> SentinelResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SentinelError::csv(name, e))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SentinelError::csv(name, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Dataset::from_raw(headers, rows)
}

fn parse_json(name: &str, text: &str) -> SentinelResult<Dataset> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| SentinelError::json(name, e))?;
    let records = value.as_array().ok_or_else(|| {
        SentinelError::external(
            format!("JSON ingest '{name}'"),
            "expected a top-level array of objects",
        )
    })?;

    // Column union across objects, in first-seen order.
    let mut headers: Vec<String> = Vec::new();
    for record in records {
        if let Some(object) = record.as_object() {
            for key in object.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .filter_map(|record| record.as_object())
        .map(|object| {
            headers
                .iter()
                .map(|key| match object.get(key) {
                    None | Some(serde_json::Value::Null) => String::new(),
                    Some(serde_json::Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                })
                .collect()
        })
        .collect();

    Dataset::from_raw(headers, rows)
}

fn parse_spreadsheet(name: &str, path: &Path) -> SentinelResult<Dataset> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| SentinelError::spreadsheet(name, e))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SentinelError::spreadsheet(name, "workbook has no sheets"))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| SentinelError::spreadsheet(name, e))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(row) => row.iter().map(cell_text).collect(),
        None => Vec::new(),
    };
    let rows: Vec<Vec<String>> = rows_iter
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    Dataset::from_raw(headers, rows)
}

fn cell_text(cell: &calamine::Data) -> String {
    match cell {
        calamine::Data::Empty => String::new(),
        calamine::Data::DateTime(dt) => dt
            .as_datetime()
            .map(|naive| naive.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| dt.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_with(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(bytes).expect("write temp");
        file
    }

    #[test]
    fn test_load_csv() {
        let file = temp_with(
            ".csv",
            b"timestamp,event_type,bytes\n2024-05-01 10:00:00,login,120\n2024-05-01 10:05:00,logout,98\n",
        );
        let ds = load_path(file.path()).unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column_names(), vec!["timestamp", "event_type", "bytes"]);
    }

    #[test]
    fn test_load_csv_latin1_fallback() {
        // "café,1" in Latin-1: 0xE9 is not valid UTF-8.
        let mut bytes = b"name,n\n".to_vec();
        bytes.extend_from_slice(&[b'c', b'a', b'f', 0xE9]);
        bytes.extend_from_slice(b",1\n");
        let file = temp_with(".csv", &bytes);
        let ds = load_path(file.path()).unwrap();
        let cell = ds.column("name").unwrap().display_value(0).unwrap();
        assert_eq!(cell, "caf\u{e9}");
    }

    #[test]
    fn test_load_csv_ragged_rows_error() {
        let file = temp_with(".csv", b"a,b\n1,2\n3\n");
        assert!(matches!(
            load_path(file.path()),
            Err(SentinelError::Csv { .. })
        ));
    }

    #[test]
    fn test_load_json_array_of_objects() {
        let file = temp_with(
            ".json",
            br#"[{"event_type":"login","bytes":120},{"event_type":"alert","severity":"high"}]"#,
        );
        let ds = load_path(file.path()).unwrap();
        assert_eq!(ds.row_count(), 2);
        let mut names = ds.column_names();
        names.sort_unstable();
        assert_eq!(names, vec!["bytes", "event_type", "severity"]);
        assert_eq!(ds.column("bytes").unwrap().missing_count(), 1);
    }

    #[test]
    fn test_load_json_wrong_shape() {
        let file = temp_with(".json", br#"{"not":"an array"}"#);
        assert!(load_path(file.path()).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = temp_with(".txt", b"whatever");
        assert!(matches!(
            load_path(file.path()),
            Err(SentinelError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_empty_csv_rejected() {
        let file = temp_with(".csv", b"a,b\n");
        assert!(matches!(
            load_path(file.path()),
            Err(SentinelError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_decode_text_utf8_passthrough() {
        assert_eq!(decode_text("héllo".as_bytes().to_vec()), "héllo");
    }
}
