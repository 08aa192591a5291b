use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use glycorisk_core::analysis::{range_analysis, sensitivity_table, RangeAnalysis, SensitivityRow, Summary};
use glycorisk_core::chart;
use glycorisk_core::dataset::{DatasetOrigin, LoadedDataset};
use glycorisk_core::scoring::{Assessment, Breakdown, GuideEntry};

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub generated_at: DateTime<Utc>,
    pub assessment: Assessment,
    pub formatted_score: String,
    pub breakdown: Breakdown,
    pub zero_crossing: f64,
    pub guide: Vec<GuideEntry>,
    pub dataset: DatasetSection,
    pub ranges: Vec<RangeAnalysis>,
    pub sensitivity: Vec<SensitivityRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSection {
    pub origin: DatasetOrigin,
    pub notice: Option<&'static str>,
    pub rows: usize,
    pub glucose: Option<Summary>,
    pub risk_score: Option<Summary>,
}

impl DatasetSection {
    pub fn from_loaded(loaded: &LoadedDataset) -> Self {
        Self {
            origin: loaded.origin.clone(),
            notice: loaded.notice,
            rows: loaded.dataset.len(),
            glucose: Summary::of(&loaded.dataset.glucose()),
            risk_score: Summary::of(&loaded.dataset.risk_scores()),
        }
    }
}

/// Everything the report job emits, as (file name, contents) pairs.
pub struct Artifacts {
    pub files: Vec<(&'static str, String)>,
}

pub fn build(
    assessment: &Assessment,
    breakdown: &Breakdown,
    zero_crossing: f64,
    guide: Vec<GuideEntry>,
    loaded: &LoadedDataset,
    generated_at: DateTime<Utc>,
) -> anyhow::Result<(ReportSummary, Artifacts)> {
    let sensitivity = sensitivity_table();
    let summary = ReportSummary {
        generated_at,
        assessment: *assessment,
        formatted_score: assessment.formatted_score(),
        breakdown: *breakdown,
        zero_crossing,
        guide,
        dataset: DatasetSection::from_loaded(loaded),
        ranges: range_analysis(),
        sensitivity: sensitivity.clone(),
    };

    let mut files = vec![
        ("risk_curve.svg", chart::risk_curve_chart(assessment)),
        ("sensitivity.svg", chart::sensitivity_chart(&sensitivity)),
    ];
    if let Some(svg) = chart::glucose_histogram_chart(&loaded.dataset) {
        files.push(("glucose_histogram.svg", svg));
    }
    if let Some(svg) = chart::risk_histogram_chart(&loaded.dataset) {
        files.push(("risk_histogram.svg", svg));
    }
    if let Some(svg) = chart::scatter_chart(&loaded.dataset) {
        files.push(("glucose_vs_risk.svg", svg));
    }

    let json = serde_json::to_string_pretty(&summary).context("serialize report summary failed")?;
    files.push(("summary.json", json));

    Ok((summary, Artifacts { files }))
}

impl Artifacts {
    pub fn write_to(&self, out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

        let mut written = Vec::with_capacity(self.files.len());
        for (name, contents) in &self.files {
            let path = out_dir.join(name);
            std::fs::write(&path, contents)
                .with_context(|| format!("failed to write {}", path.display()))?;
            written.push(path);
        }
        Ok(written)
    }
}
