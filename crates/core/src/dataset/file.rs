use super::{Dataset, DatasetOrigin, GlucoseSource, Record};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const GLUCOSE_COLUMN: &str = "Glucose";
pub const OUTCOME_COLUMN: &str = "Outcome";

/// CSV file with a header row and at least a `Glucose` column.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GlucoseSource for CsvFileSource {
    fn describe(&self) -> DatasetOrigin {
        DatasetOrigin::File {
            path: self.path.clone(),
        }
    }

    fn load(&self) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("failed to read CSV header of {}", self.path.display()))?
            .clone();
        let glucose_idx = headers
            .iter()
            .position(|h| h == GLUCOSE_COLUMN)
            .with_context(|| format!("{} has no {GLUCOSE_COLUMN:?} column", self.path.display()))?;
        let outcome_idx = headers.iter().position(|h| h == OUTCOME_COLUMN);

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (line, row) in reader.records().enumerate() {
            let row = row.with_context(|| {
                format!("malformed CSV row {} in {}", line + 2, self.path.display())
            })?;

            let Some(glucose) = row.get(glucose_idx).and_then(parse_number) else {
                skipped += 1;
                continue;
            };
            let outcome = outcome_idx
                .and_then(|i| row.get(i))
                .and_then(parse_number)
                .and_then(parse_outcome);

            records.push(Record { glucose, outcome });
        }

        if skipped > 0 {
            tracing::debug!(path = %self.path.display(), skipped, "skipped rows without a numeric glucose value");
        }
        anyhow::ensure!(
            !records.is_empty(),
            "{} contains no numeric {GLUCOSE_COLUMN:?} values",
            self.path.display()
        );

        Ok(Dataset { records })
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_outcome(v: f64) -> Option<u8> {
    if v == 0.0 {
        Some(0)
    } else if v == 1.0 {
        Some(1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_glucose_and_outcome_columns() {
        let file = csv_file(
            "Pregnancies,Glucose,BloodPressure,Outcome\n\
             6,148,72,1\n\
             1,85,66,0\n\
             8,183.5,64,1.0\n",
        );
        let ds = CsvFileSource::new(file.path()).load().unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records[0], Record { glucose: 148.0, outcome: Some(1) });
        assert_eq!(ds.records[1], Record { glucose: 85.0, outcome: Some(0) });
        assert_eq!(ds.records[2].glucose, 183.5);
        assert_eq!(ds.records[2].outcome, Some(1));
    }

    #[test]
    fn outcome_column_is_optional() {
        let file = csv_file("Glucose\n101\n 99 \n");
        let ds = CsvFileSource::new(file.path()).load().unwrap();
        assert_eq!(ds.glucose(), vec![101.0, 99.0]);
        assert!(ds.records.iter().all(|r| r.outcome.is_none()));
    }

    #[test]
    fn skips_non_numeric_glucose_cells() {
        let file = csv_file("Glucose,Outcome\n,1\nn/a,0\n120,1\n");
        let ds = CsvFileSource::new(file.path()).load().unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].glucose, 120.0);
    }

    #[test]
    fn rejects_missing_glucose_column() {
        let file = csv_file("Insulin,Outcome\n0,1\n");
        let err = CsvFileSource::new(file.path()).load().unwrap_err();
        assert!(format!("{err:#}").contains("Glucose"));
    }

    #[test]
    fn rejects_file_without_usable_rows() {
        let file = csv_file("Glucose,Outcome\n");
        assert!(CsvFileSource::new(file.path()).load().is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvFileSource::new(dir.path().join("processed.csv"));
        assert!(source.load().is_err());
    }

    #[test]
    fn describe_reports_the_configured_path() {
        let source = CsvFileSource::new("data/processed.csv");
        assert_eq!(
            source.describe(),
            DatasetOrigin::File {
                path: PathBuf::from("data/processed.csv")
            }
        );
    }
}
