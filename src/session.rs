//! Explicit application session state.
//!
//! Everything the interactive surface would keep between interactions —
//! the loaded-file list, per-file parse failures, selection flags, and
//! analysis settings — lives in one [`AnalysisSession`] value passed to
//! handlers. There is no process-wide singleton.

use std::path::Path;

use crate::dataset::Dataset;
use crate::errors::{SentinelError, SentinelResult};
use crate::ingest;

/// One successfully parsed input file.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub name: String,
    pub dataset: Dataset,
    pub selected: bool,
}

/// One input file that failed to parse, kept for per-file reporting.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub name: String,
    pub message: String,
}

/// Analysis settings mirrored from the interactive controls.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Z-score magnitude threshold.
    pub threshold: f64,
    /// Column to scan; first numeric column when unset.
    pub anomaly_column: Option<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            anomaly_column: None,
        }
    }
}

/// Session state for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSession {
    files: Vec<LoadedFile>,
    failures: Vec<ParseFailure>,
    pub settings: AnalysisSettings,
}

impl AnalysisSession {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self {
            files: Vec::new(),
            failures: Vec::new(),
            settings,
        }
    }

    /// Load a batch of paths. A file that fails to parse is recorded and
    /// excluded; the rest of the batch still loads.
    pub fn load_paths(&mut self, paths: &[impl AsRef<Path>]) {
        for path in paths {
            self.load_path(path.as_ref());
        }
    }

    /// Load one path into the session. Duplicate names are ignored, like
    /// re-uploading the same file.
    pub fn load_path(&mut self, path: &Path) {
        let name = ingest::display_name(path);
        if self.files.iter().any(|f| f.name == name) {
            log::debug!("Skipping already-loaded file '{}'", name);
            return;
        }
        match ingest::load_path(path) {
            Ok(dataset) => self.files.push(LoadedFile {
                name,
                dataset,
                selected: true,
            }),
            Err(error) => {
                log::warn!("Excluding '{}': {}", name, error);
                self.failures.push(ParseFailure {
                    name,
                    message: error.to_string(),
                });
            }
        }
    }

    pub fn files(&self) -> &[LoadedFile] {
        &self.files
    }

    pub fn failures(&self) -> &[ParseFailure] {
        &self.failures
    }

    /// Toggle a file's selection flag by name.
    pub fn set_selected(&mut self, name: &str, selected: bool) -> bool {
        match self.files.iter_mut().find(|f| f.name == name) {
            Some(file) => {
                file.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Drop every loaded file and recorded failure.
    pub fn clear(&mut self) {
        self.files.clear();
        self.failures.clear();
    }

    /// Names of the currently selected files.
    pub fn selected_names(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| f.selected)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Merge the selected files into the active dataset.
    ///
    /// Blocked state when nothing is selected (or everything failed to
    /// parse): `EmptySelection`, no computation attempted.
    pub fn active_dataset(&self) -> SentinelResult<Dataset> {
        let selected: Vec<Dataset> = self
            .files
            .iter()
            .filter(|f| f.selected)
            .map(|f| f.dataset.clone())
            .collect();
        if selected.is_empty() {
            return Err(SentinelError::EmptySelection);
        }
        let merged = Dataset::concat(&selected)?;
        if merged.is_empty() {
            return Err(SentinelError::EmptySelection);
        }
        log::info!(
            "Merged {} file(s) into {} records",
            selected.len(),
            merged.row_count()
        );
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_csv(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp file");
        file.write_all(content).expect("write temp");
        file
    }

    #[test]
    fn test_failing_file_excluded_analysis_proceeds() {
        let good = temp_csv(b"a,b\n1,2\n3,4\n");
        let bad = temp_csv(b"a,b\n1,2\n3\n");
        let mut session = AnalysisSession::default();
        session.load_paths(&[good.path(), bad.path()]);

        assert_eq!(session.files().len(), 1);
        assert_eq!(session.failures().len(), 1);
        let merged = session.active_dataset().unwrap();
        assert_eq!(merged.row_count(), 2);
    }

    #[test]
    fn test_empty_selection_is_blocked() {
        let session = AnalysisSession::default();
        assert!(matches!(
            session.active_dataset(),
            Err(SentinelError::EmptySelection)
        ));
    }

    #[test]
    fn test_deselect_all_is_blocked() {
        let good = temp_csv(b"a\n1\n");
        let mut session = AnalysisSession::default();
        session.load_path(good.path());
        let name = session.files()[0].name.clone();
        assert!(session.set_selected(&name, false));
        assert!(matches!(
            session.active_dataset(),
            Err(SentinelError::EmptySelection)
        ));
    }

    #[test]
    fn test_merge_two_files() {
        let a = temp_csv(b"x,y\n1,login\n2,logout\n");
        let b = temp_csv(b"x,y\n3,login\n");
        let mut session = AnalysisSession::default();
        session.load_paths(&[a.path(), b.path()]);
        let merged = session.active_dataset().unwrap();
        assert_eq!(merged.row_count(), 3);
        assert_eq!(merged.column_count(), 2);
    }

    #[test]
    fn test_duplicate_name_not_reloaded() {
        let a = temp_csv(b"x\n1\n");
        let mut session = AnalysisSession::default();
        session.load_path(a.path());
        session.load_path(a.path());
        assert_eq!(session.files().len(), 1);
    }
}
