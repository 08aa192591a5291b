use serde::{Deserialize, Serialize};

/// Score thresholds separating the four categories, in ascending order.
pub const LOW_UPPER: f64 = -0.2;
pub const MODERATE_UPPER: f64 = 0.2;
pub const HIGH_UPPER: f64 = 0.6;

/// Ordered risk tiers derived from the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
    VeryHigh,
}

/// How prominently a category should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 4] = [
        RiskCategory::Low,
        RiskCategory::Moderate,
        RiskCategory::High,
        RiskCategory::VeryHigh,
    ];

    /// Half-open score interval `[lower, upper)` of this category; `None` means unbounded.
    pub fn score_bounds(self) -> (Option<f64>, Option<f64>) {
        match self {
            Self::Low => (None, Some(LOW_UPPER)),
            Self::Moderate => (Some(LOW_UPPER), Some(MODERATE_UPPER)),
            Self::High => (Some(MODERATE_UPPER), Some(HIGH_UPPER)),
            Self::VeryHigh => (Some(HIGH_UPPER), None),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very high",
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Self::Low => "🟢",
            Self::Moderate => "🟡",
            Self::High => "🟠",
            Self::VeryHigh => "🔴",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            Self::Low => "The risk score is low. The current glucose level looks healthy.",
            Self::Moderate => "The risk score is moderate. Keep monitoring and managing glucose.",
            Self::High => "The risk score is high. A consultation with a specialist is recommended.",
            Self::VeryHigh => {
                "The risk score is very high. Please see a specialist as soon as possible."
            }
        }
    }

    /// Short status used in the interpretation guide.
    pub fn status(self) -> &'static str {
        match self {
            Self::Low => "Good",
            Self::Moderate => "Watch",
            Self::High => "Needs management",
            Self::VeryHigh => "Consult immediately",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::Low => Severity::Success,
            Self::Moderate | Self::High => Severity::Warning,
            Self::VeryHigh => Severity::Error,
        }
    }

    /// Fill colour used when shading the category's score band.
    pub fn color(self) -> &'static str {
        match self {
            Self::Low => "green",
            Self::Moderate => "yellow",
            Self::High => "orange",
            Self::VeryHigh => "red",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_ordered_by_severity() {
        assert!(RiskCategory::Low < RiskCategory::Moderate);
        assert!(RiskCategory::Moderate < RiskCategory::High);
        assert!(RiskCategory::High < RiskCategory::VeryHigh);
    }

    #[test]
    fn score_bounds_are_contiguous() {
        for pair in RiskCategory::ALL.windows(2) {
            assert_eq!(pair[0].score_bounds().1, pair[1].score_bounds().0);
        }
        assert_eq!(RiskCategory::Low.score_bounds().0, None);
        assert_eq!(RiskCategory::VeryHigh.score_bounds().1, None);
    }

    #[test]
    fn serializes_as_snake_case() {
        let s = serde_json::to_string(&RiskCategory::VeryHigh).unwrap();
        assert_eq!(s, "\"very_high\"");
    }
}
