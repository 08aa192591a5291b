pub mod file;
pub mod synthetic;

use crate::scoring;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub use file::CsvFileSource;
pub use synthetic::{SyntheticOptions, SyntheticSource};

/// Shown to the user whenever the demo dataset replaces the real one.
pub const FALLBACK_NOTICE: &str =
    "💡 The real dataset could not be found, so a synthetic demo dataset is used instead.";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Record {
    pub glucose: f64,
    /// 1 = diabetic, 0 = not diabetic; absent when the source has no outcome column.
    pub outcome: Option<u8>,
}

impl Record {
    pub fn risk_score(&self) -> f64 {
        scoring::score(self.glucose)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn glucose(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.glucose).collect()
    }

    pub fn risk_scores(&self) -> Vec<f64> {
        self.records.iter().map(Record::risk_score).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetOrigin {
    File { path: PathBuf },
    Synthetic { seed: u64 },
}

/// Something that can produce the glucose dataset.
pub trait GlucoseSource {
    fn describe(&self) -> DatasetOrigin;

    fn load(&self) -> anyhow::Result<Dataset>;
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub origin: DatasetOrigin,
    /// User-visible notice, set when the synthetic fallback was used.
    pub notice: Option<&'static str>,
}

/// Loads the CSV at `path`, falling back to the synthetic dataset on any failure.
pub fn load_or_synthesize(path: &Path, options: SyntheticOptions) -> LoadedDataset {
    let primary = CsvFileSource::new(path);
    match primary.load() {
        Ok(dataset) => {
            tracing::info!(path = %path.display(), rows = dataset.len(), "loaded glucose dataset");
            LoadedDataset {
                dataset,
                origin: primary.describe(),
                notice: None,
            }
        }
        Err(err) => {
            let detail = format!("{err:#}");
            tracing::warn!(
                path = %path.display(),
                error = %detail,
                "glucose dataset unavailable; using synthetic data"
            );
            let fallback = SyntheticSource::new(options);
            LoadedDataset {
                dataset: fallback.generate(),
                origin: fallback.describe(),
                notice: Some(FALLBACK_NOTICE),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_synthetic() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_or_synthesize(&dir.path().join("nope.csv"), SyntheticOptions::default());
        assert_eq!(loaded.dataset.len(), 500);
        assert_eq!(loaded.origin, DatasetOrigin::Synthetic { seed: 42 });
        assert_eq!(loaded.notice, Some(FALLBACK_NOTICE));
    }

    #[test]
    fn existing_file_is_used_without_notice() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Glucose,Outcome\n90,0\n150,1").unwrap();
        let loaded = load_or_synthesize(file.path(), SyntheticOptions::default());
        assert_eq!(loaded.dataset.len(), 2);
        assert!(loaded.notice.is_none());
        assert!(matches!(loaded.origin, DatasetOrigin::File { .. }));
    }

    #[test]
    fn unreadable_content_falls_back_too() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Age,BMI\n40,22.1").unwrap();
        let loaded = load_or_synthesize(file.path(), SyntheticOptions::default());
        assert_eq!(loaded.dataset.len(), 500);
        assert!(loaded.notice.is_some());
    }

    #[test]
    fn risk_scores_follow_the_model() {
        let ds = Dataset {
            records: vec![Record {
                glucose: 100.0,
                outcome: None,
            }],
        };
        assert!((ds.risk_scores()[0] - 0.1678).abs() < 1e-9);
    }
}
