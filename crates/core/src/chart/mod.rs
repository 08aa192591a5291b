//! SVG charts rendered on the dashboard pages and by the report job.

pub mod svg;

use crate::analysis::{histogram, risk_curve, Histogram, SensitivityRow};
use crate::dataset::Dataset;
use crate::domain::glucose::{CHART_BANDS, DIABETES_MARKER, DISPLAY_MAX, DISPLAY_MIN, NORMAL_UPPER_MARKER};
use crate::domain::risk::{RiskCategory, HIGH_UPPER, LOW_UPPER, MODERATE_UPPER};
use crate::scoring::{format_score, Assessment};
use svg::{Plot, Range, Stroke};

pub const HISTOGRAM_BINS: usize = 30;

const WIDE: (u32, u32) = (960, 480);
const HALF: (u32, u32) = (640, 420);

/// Visible score range of the risk curve chart.
const CURVE_Y: Range = Range {
    min: -1.0,
    max: 1.2,
};

/// Scorer line over the display range with the current reading marked.
pub fn risk_curve_chart(assessment: &Assessment) -> String {
    let mut plot = Plot::new(
        WIDE.0,
        WIDE.1,
        Range::new(DISPLAY_MIN, DISPLAY_MAX),
        CURVE_Y,
    );

    for band in CHART_BANDS {
        plot.x_span(band.from, band.to, band.color, 0.1);
    }
    for category in RiskCategory::ALL {
        let (lo, hi) = category.score_bounds();
        plot.y_span(
            lo.unwrap_or(CURVE_Y.min),
            hi.unwrap_or(1.5),
            category.color(),
            0.1,
        );
    }

    plot.polyline(&risk_curve(DISPLAY_MIN, DISPLAY_MAX, 150), "blue", 3.0);
    plot.hline(0.0, "black", Stroke::Solid, 0.3, 1.0);
    plot.vline(assessment.glucose, "red", Stroke::Dashed, 0.8, 2.0);
    plot.hline(assessment.score, "red", Stroke::Dashed, 0.8, 2.0);

    plot.legend("Diabetes risk", "blue");
    plot.legend("Risk baseline (0)", "black");
    plot.legend(format!("Current input: {} mg/dL", assessment.glucose), "red");
    plot.legend(format!("Current risk: {}", format_score(assessment.score)), "red");
    for band in CHART_BANDS {
        plot.legend(band.label, band.color);
    }

    plot.finish(
        "Predicted diabetes risk by glucose level",
        "Glucose (mg/dL)",
        "Diabetes risk score",
    )
}

/// Glucose distribution with the normal and diabetes cut-offs.
pub fn glucose_histogram_chart(dataset: &Dataset) -> Option<String> {
    let hist = histogram(&dataset.glucose(), HISTOGRAM_BINS)?;
    let mut plot = histogram_plot(&hist);
    plot.vline(NORMAL_UPPER_MARKER, "green", Stroke::Dashed, 1.0, 2.0);
    plot.vline(DIABETES_MARKER, "red", Stroke::Dashed, 1.0, 2.0);
    plot.legend("Normal upper limit (100)", "green");
    plot.legend("Diabetes threshold (126)", "red");
    Some(plot.finish("Glucose distribution", "Glucose (mg/dL)", "Frequency"))
}

/// Risk score distribution with the category thresholds.
pub fn risk_histogram_chart(dataset: &Dataset) -> Option<String> {
    let hist = histogram(&dataset.risk_scores(), HISTOGRAM_BINS)?;
    let mut plot = histogram_plot(&hist);
    plot.vline(0.0, "black", Stroke::Solid, 0.5, 1.0);
    plot.vline(LOW_UPPER, "green", Stroke::Dashed, 0.7, 1.5);
    plot.vline(MODERATE_UPPER, "orange", Stroke::Dashed, 0.7, 1.5);
    plot.vline(HIGH_UPPER, "red", Stroke::Dashed, 0.7, 1.5);
    plot.legend("Risk baseline (0)", "black");
    plot.legend("Low threshold", "green");
    plot.legend("High threshold", "orange");
    plot.legend("Very high threshold", "red");
    Some(plot.finish("Risk score distribution", "Risk score", "Frequency"))
}

fn histogram_plot(hist: &Histogram) -> Plot {
    let lo = hist.edges.first().copied().unwrap_or(0.0);
    let hi = hist.edges.last().copied().unwrap_or(1.0);
    let pad = (hi - lo) * 0.05;
    let top = (hist.max_count() as f64 * 1.1).max(1.0);

    let mut plot = Plot::new(HALF.0, HALF.1, Range::new(lo - pad, hi + pad), Range::new(0.0, top));
    for (i, &count) in hist.counts.iter().enumerate() {
        let (a, b) = (hist.edges[i], hist.edges[i + 1]);
        plot.bar((a + b) / 2.0, (b - a) * 0.95, count as f64, "steelblue", 0.7);
    }
    plot
}

/// Glucose vs risk score, coloured by outcome, with the regression line.
pub fn scatter_chart(dataset: &Dataset) -> Option<String> {
    if dataset.is_empty() {
        return None;
    }

    let glucose = dataset.glucose();
    let lo = glucose.iter().copied().fold(DISPLAY_MIN, f64::min);
    let hi = glucose.iter().copied().fold(DISPLAY_MAX, f64::max);
    let line = risk_curve(lo, hi, 100);
    let y_lo = line.first().map(|p| p.1).unwrap_or(-1.0) - 0.1;
    let y_hi = line.last().map(|p| p.1).unwrap_or(1.0) + 0.1;

    let mut plot = Plot::new(HALF.0, HALF.1, Range::new(lo, hi), Range::new(y_lo, y_hi));
    for record in &dataset.records {
        let color = match record.outcome {
            Some(1) => "red",
            Some(_) => "blue",
            None => "gray",
        };
        plot.circle(record.glucose, record.risk_score(), 3.0, color, 0.6);
    }
    plot.polyline(&line, "black", 2.0);
    plot.hline(0.0, "black", Stroke::Solid, 0.3, 1.0);
    plot.vline(NORMAL_UPPER_MARKER, "green", Stroke::Dashed, 0.5, 1.5);
    plot.vline(DIABETES_MARKER, "red", Stroke::Dashed, 0.5, 1.5);

    plot.legend("Regression line", "black");
    plot.legend("Non-diabetic", "blue");
    plot.legend("Diabetic", "red");
    if dataset.records.iter().any(|r| r.outcome.is_none()) {
        plot.legend("Outcome unknown", "gray");
    }

    Some(plot.finish("Glucose vs risk score", "Glucose (mg/dL)", "Risk score"))
}

/// Bars of the sensitivity table with value labels and threshold lines.
pub fn sensitivity_chart(rows: &[SensitivityRow]) -> String {
    let x_lo = rows.iter().map(|r| r.glucose).fold(f64::INFINITY, f64::min);
    let x_hi = rows.iter().map(|r| r.glucose).fold(f64::NEG_INFINITY, f64::max);
    let (x_lo, x_hi) = if x_lo.is_finite() {
        (x_lo - 10.0, x_hi + 10.0)
    } else {
        (DISPLAY_MIN, DISPLAY_MAX)
    };
    let y_lo = rows.iter().map(|r| r.score).fold(LOW_UPPER, f64::min) - 0.15;
    let y_hi = rows.iter().map(|r| r.score).fold(HIGH_UPPER, f64::max) + 0.15;

    let mut plot = Plot::new(WIDE.0, WIDE.1, Range::new(x_lo, x_hi), Range::new(y_lo, y_hi));
    for row in rows {
        plot.bar(row.glucose, 8.0, row.score, "steelblue", 0.7);
        let dy = if row.score > 0.0 { -6.0 } else { 14.0 };
        plot.label(row.glucose, row.score, dy, &format!("{:.3}", row.score));
    }
    plot.hline(0.0, "black", Stroke::Solid, 0.5, 1.0);
    plot.hline(LOW_UPPER, "green", Stroke::Dashed, 0.7, 1.5);
    plot.hline(MODERATE_UPPER, "orange", Stroke::Dashed, 0.7, 1.5);
    plot.hline(HIGH_UPPER, "red", Stroke::Dashed, 0.7, 1.5);

    plot.legend("Risk baseline", "black");
    plot.legend("Low threshold", "green");
    plot.legend("High threshold", "orange");
    plot.legend("Very high threshold", "red");

    plot.finish("Risk score by glucose level", "Glucose (mg/dL)", "Risk score")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::sensitivity_table;
    use crate::dataset::{Record, SyntheticOptions, SyntheticSource};
    use crate::domain::glucose::GlucoseReading;
    use crate::scoring::RiskScorer;

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn risk_curve_marks_current_reading() {
        let assessment = RiskScorer.assess(GlucoseReading(100.0));
        let svg = risk_curve_chart(&assessment);
        assert!(svg.starts_with("<svg"));
        assert_eq!(count(&svg, "<polyline"), 1);
        assert!(svg.contains("Current input: 100 mg/dL"));
        assert!(svg.contains("Current risk: 0.1678"));
    }

    #[test]
    fn histograms_draw_one_bar_per_bin() {
        let ds = SyntheticSource::new(SyntheticOptions::default()).generate();
        let glucose = glucose_histogram_chart(&ds).unwrap();
        let risk = risk_histogram_chart(&ds).unwrap();
        assert_eq!(count(&glucose, "fill=\"steelblue\""), HISTOGRAM_BINS);
        assert_eq!(count(&risk, "fill=\"steelblue\""), HISTOGRAM_BINS);
        assert!(glucose.contains("Diabetes threshold (126)"));
    }

    #[test]
    fn scatter_plots_every_record() {
        let ds = Dataset {
            records: vec![
                Record {
                    glucose: 90.0,
                    outcome: Some(0),
                },
                Record {
                    glucose: 160.0,
                    outcome: Some(1),
                },
                Record {
                    glucose: 120.0,
                    outcome: None,
                },
            ],
        };
        let svg = scatter_chart(&ds).unwrap();
        assert_eq!(count(&svg, "<circle"), 3);
        assert!(svg.contains("fill=\"gray\""));
        assert!(svg.contains("Outcome unknown"));
    }

    #[test]
    fn scatter_legend_omits_unknown_when_every_outcome_is_known() {
        let ds = SyntheticSource::new(SyntheticOptions::default()).generate();
        let svg = scatter_chart(&ds).unwrap();
        assert!(svg.contains("Non-diabetic"));
        assert!(!svg.contains("Outcome unknown"));
    }

    #[test]
    fn empty_dataset_has_no_charts() {
        let ds = Dataset::default();
        assert!(glucose_histogram_chart(&ds).is_none());
        assert!(risk_histogram_chart(&ds).is_none());
        assert!(scatter_chart(&ds).is_none());
    }

    #[test]
    fn sensitivity_chart_labels_each_bar() {
        let rows = sensitivity_table();
        let svg = sensitivity_chart(&rows);
        assert_eq!(count(&svg, "fill=\"steelblue\""), rows.len());
        assert!(svg.contains(">0.492<"));
        assert!(svg.contains(">-0.156<"));
    }
}
