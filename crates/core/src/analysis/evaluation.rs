use crate::domain::risk::RiskCategory;
use crate::scoring::{classify, score};
use serde::Serialize;

/// Named glucose ranges inspected on the model evaluation page (mg/dL, inclusive).
pub const GLUCOSE_RANGES: [(&str, u16, u16); 5] = [
    ("Very low (50-70 mg/dL)", 50, 70),
    ("Normal (70-99 mg/dL)", 70, 99),
    ("Borderline (100-125 mg/dL)", 100, 125),
    ("High (126-140 mg/dL)", 126, 140),
    ("Very high (141-200 mg/dL)", 141, 200),
];

pub const SENSITIVITY_GLUCOSE: [u16; 8] = [60, 80, 100, 120, 140, 160, 180, 200];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeAnalysis {
    pub name: &'static str,
    pub min_glucose: f64,
    pub mid_glucose: f64,
    pub max_glucose: f64,
    pub min_risk: f64,
    pub mid_risk: f64,
    pub max_risk: f64,
}

pub fn range_analysis() -> Vec<RangeAnalysis> {
    GLUCOSE_RANGES
        .iter()
        .map(|&(name, lo, hi)| {
            let min_glucose = f64::from(lo);
            let max_glucose = f64::from(hi);
            let mid_glucose = (min_glucose + max_glucose) / 2.0;
            RangeAnalysis {
                name,
                min_glucose,
                mid_glucose,
                max_glucose,
                min_risk: score(min_glucose),
                mid_risk: score(mid_glucose),
                max_risk: score(max_glucose),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensitivityRow {
    pub glucose: f64,
    pub score: f64,
    pub category: RiskCategory,
}

pub fn sensitivity_table() -> Vec<SensitivityRow> {
    SENSITIVITY_GLUCOSE
        .iter()
        .map(|&g| {
            let glucose = f64::from(g);
            let score = score(glucose);
            SensitivityRow {
                glucose,
                score,
                category: classify(score),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_analysis_is_monotonic_within_each_range() {
        let rows = range_analysis();
        assert_eq!(rows.len(), 5);
        for row in &rows {
            assert!(row.min_risk < row.mid_risk && row.mid_risk < row.max_risk, "{}", row.name);
        }
        let borderline = &rows[2];
        assert_eq!(borderline.mid_glucose, 112.5);
        assert!((borderline.min_risk - 0.1678).abs() < 1e-9);
    }

    #[test]
    fn sensitivity_categories_follow_thresholds() {
        let rows = sensitivity_table();
        let categories: Vec<_> = rows.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                RiskCategory::Moderate,
                RiskCategory::Moderate,
                RiskCategory::Moderate,
                RiskCategory::High,
                RiskCategory::High,
                RiskCategory::VeryHigh,
                RiskCategory::VeryHigh,
                RiskCategory::VeryHigh,
            ]
        );
        assert!((rows[4].score - 0.4918).abs() < 1e-9);
    }
}
