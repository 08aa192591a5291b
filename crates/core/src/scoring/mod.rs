//! Linear glucose → risk score model and its threshold classifier.

use crate::domain::glucose::GlucoseReading;
use crate::domain::risk::{RiskCategory, HIGH_UPPER, LOW_UPPER, MODERATE_UPPER};
use serde::Serialize;

pub const INTERCEPT: f64 = -0.6422;
pub const SLOPE: f64 = 0.0081;

/// Fixed affine model `risk = INTERCEPT + SLOPE * glucose`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer;

impl RiskScorer {
    /// Total over the reals; no range check is applied here.
    pub fn score(&self, glucose: f64) -> f64 {
        score(glucose)
    }

    pub fn assess(&self, reading: GlucoseReading) -> Assessment {
        let score = self.score(reading.mg_dl());
        Assessment {
            glucose: reading.mg_dl(),
            score,
            category: classify(score),
        }
    }

    pub fn breakdown(&self, reading: GlucoseReading) -> Breakdown {
        let glucose_effect = SLOPE * reading.mg_dl();
        Breakdown {
            intercept: INTERCEPT,
            slope: SLOPE,
            glucose: reading.mg_dl(),
            glucose_effect,
            score: self.score(reading.mg_dl()),
        }
    }

    /// Glucose at which the score crosses zero (≈ 79.3 mg/dL).
    pub fn zero_crossing(&self) -> f64 {
        self.glucose_for_score(0.0)
    }

    /// Inverse of [`RiskScorer::score`].
    pub fn glucose_for_score(&self, score: f64) -> f64 {
        (score - INTERCEPT) / SLOPE
    }
}

pub fn score(glucose: f64) -> f64 {
    INTERCEPT + SLOPE * glucose
}

/// Maps a score onto its category; each threshold belongs to the higher tier.
pub fn classify(score: f64) -> RiskCategory {
    if score < LOW_UPPER {
        RiskCategory::Low
    } else if score < MODERATE_UPPER {
        RiskCategory::Moderate
    } else if score < HIGH_UPPER {
        RiskCategory::High
    } else {
        RiskCategory::VeryHigh
    }
}

/// Display formatting for scores (4 decimal places).
pub fn format_score(score: f64) -> String {
    format!("{score:.4}")
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    pub glucose: f64,
    pub score: f64,
    pub category: RiskCategory,
}

impl Assessment {
    pub fn formatted_score(&self) -> String {
        format_score(self.score)
    }
}

/// Term-by-term evaluation of the model for one reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakdown {
    pub intercept: f64,
    pub slope: f64,
    pub glucose: f64,
    pub glucose_effect: f64,
    pub score: f64,
}

/// One row of the interpretation guide: score and glucose interval per category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GuideEntry {
    pub category: RiskCategory,
    pub score_from: Option<f64>,
    pub score_to: Option<f64>,
    pub glucose_from: Option<f64>,
    pub glucose_to: Option<f64>,
}

pub fn interpretation_guide(scorer: &RiskScorer) -> Vec<GuideEntry> {
    RiskCategory::ALL
        .iter()
        .map(|&category| {
            let (score_from, score_to) = category.score_bounds();
            GuideEntry {
                category,
                score_from,
                score_to,
                glucose_from: score_from.map(|s| scorer.glucose_for_score(s)),
                glucose_to: score_to.map(|s| scorer.glucose_for_score(s)),
            }
        })
        .collect()
}
