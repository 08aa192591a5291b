pub mod evaluation;
pub mod stats;

pub use evaluation::{range_analysis, sensitivity_table, RangeAnalysis, SensitivityRow};
pub use stats::{histogram, linspace, risk_curve, Histogram, Summary};
