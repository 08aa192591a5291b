use std::fmt::Write as _;

use glycorisk_core::analysis::{RangeAnalysis, SensitivityRow, Summary};
use glycorisk_core::chart::{self, svg::escape};
use glycorisk_core::dataset::{DatasetOrigin, LoadedDataset};
use glycorisk_core::domain::glucose::{GlucoseBand, GlucoseReading, SLIDER_DEFAULT, SLIDER_MAX, SLIDER_MIN};
use glycorisk_core::domain::risk::Severity;
use glycorisk_core::scoring::{self, format_score, Assessment, Breakdown, GuideEntry, INTERCEPT, SLOPE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Predict,
    Analysis,
    Evaluation,
    Help,
}

impl Page {
    const ALL: [Page; 4] = [Page::Predict, Page::Analysis, Page::Evaluation, Page::Help];

    fn href(self) -> &'static str {
        match self {
            Self::Predict => "/predict",
            Self::Analysis => "/analysis",
            Self::Evaluation => "/evaluation",
            Self::Help => "/help",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Predict => "Prediction",
            Self::Analysis => "Data analysis",
            Self::Evaluation => "Model evaluation",
            Self::Help => "Help",
        }
    }
}

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
nav{width:200px;min-height:100vh;background:#f0f2f6;padding:16px}\
nav a{display:block;padding:6px 0;color:#333;text-decoration:none}\
nav a.active{font-weight:bold}\
main{flex:1;padding:24px;max-width:1100px}\
.alert{padding:10px 14px;border-radius:6px;margin:8px 0}\
.success{background:#e6f4ea}.warning{background:#fff4e5}.error{background:#fdecea}.info{background:#e8f0fe}\
.metric{margin:8px 0}.metric .value{font-size:2em}\
.columns{display:flex;gap:16px}.columns>div{flex:1}\
table{border-collapse:collapse}td,th{border:1px solid #ddd;padding:4px 10px;text-align:right}\
svg{max-width:100%;height:auto}";

fn layout(active: Page, body: &str) -> String {
    let mut nav = String::from("<h3>📋 Menu</h3>");
    for page in Page::ALL {
        let class = if page == active { " class=\"active\"" } else { "" };
        let _ = write!(nav, "<a href=\"{}\"{class}>{}</a>", page.href(), page.title());
    }

    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>Glucose prediction dashboard · {}</title><style>{STYLE}</style></head>\
         <body><nav>{nav}</nav><main><h1>🩸 Glucose prediction dashboard</h1>{body}</main></body></html>",
        active.title()
    )
}

fn alert(class: &str, text: &str) -> String {
    format!("<div class=\"alert {class}\">{}</div>", escape(text))
}

fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "success",
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

fn metric(label: &str, value: &str) -> String {
    format!(
        "<div class=\"metric\"><div>{}</div><div class=\"value\">{}</div></div>",
        escape(label),
        escape(value)
    )
}

fn score_range(entry: &GuideEntry) -> String {
    match (entry.score_from, entry.score_to) {
        (None, Some(to)) => format!("&lt; {to}"),
        (Some(from), Some(to)) => format!("{from} ~ {to}"),
        (Some(from), None) => format!("≥ {from}"),
        (None, None) => String::new(),
    }
}

fn rounded(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.0}")).unwrap_or_default()
}

pub fn predict(current: Option<(&Assessment, &Breakdown)>, guide: &[GuideEntry]) -> String {
    let value = current.map_or(f64::from(SLIDER_DEFAULT), |(a, _)| a.glucose);
    let mut body = String::from("<h2>🔍 Real-time glucose prediction</h2>");
    let _ = write!(
        body,
        "<form method=\"get\" action=\"/predict\">\
         <label for=\"glucose\">Glucose (mg/dL): <output id=\"glucose-value\">{value:.0}</output></label><br>\
         <input type=\"range\" id=\"glucose\" name=\"glucose\" min=\"{SLIDER_MIN}\" max=\"{SLIDER_MAX}\" step=\"1\" value=\"{value:.0}\" \
         oninput=\"document.getElementById('glucose-value').value=this.value\">\
         <button type=\"submit\">Run prediction</button></form>"
    );

    let Some((assessment, breakdown)) = current else {
        return layout(Page::Predict, &body);
    };
    let category = assessment.category;

    body.push_str("<h3>📊 Linear regression prediction result</h3>");
    body.push_str(&metric("Diabetes risk score", &assessment.formatted_score()));
    body.push_str(&alert(
        severity_class(category.severity()),
        &format!("{} Diabetes risk: {}", category.marker(), category.label()),
    ));
    body.push_str(&alert("info", category.advice()));

    let band = GlucoseReading(breakdown.glucose).band();
    let _ = write!(
        body,
        "<h3>📈 Regression equation details</h3><div class=\"alert info\">\
         <p><b>Linear regression equation:</b> diabetes risk = {INTERCEPT} + {SLOPE} × {glucose:.0}</p>\
         <p><b>Calculation:</b></p><ul>\
         <li>Intercept: {INTERCEPT}</li>\
         <li>Glucose effect: {SLOPE} × {glucose:.0} = {effect:.4}</li>\
         <li><b>Final risk: {score}</b></li></ul>\
         <p><b>Interpretation:</b></p><ul>\
         <li>Each 1 mg/dL increase in glucose raises the risk by {SLOPE}.</li>\
         <li>A negative score means lower risk and a positive score higher risk, with 0 as the reference.</li>\
         <li>Reference band: {band} ({reference}).</li></ul></div>",
        glucose = breakdown.glucose,
        effect = breakdown.glucose_effect,
        score = format_score(breakdown.score),
        band = band.label(),
        reference = band.reference(),
    );

    body.push_str("<h3>📊 Risk by glucose level</h3>");
    body.push_str(&chart::risk_curve_chart(assessment));

    body.push_str("<h3>📋 Risk score interpretation guide</h3><div class=\"columns\">");
    for entry in guide {
        let scores = score_range(entry);
        let glucose_range = match (entry.glucose_from, entry.glucose_to) {
            (None, Some(_)) => format!("below ~{} mg/dL", rounded(entry.glucose_to)),
            (Some(_), Some(_)) => format!(
                "~{}-{} mg/dL",
                rounded(entry.glucose_from),
                rounded(entry.glucose_to)
            ),
            (Some(_), None) => format!("~{} mg/dL and above", rounded(entry.glucose_from)),
            (None, None) => String::new(),
        };
        let _ = write!(
            body,
            "<div><b>{} {}</b><ul><li>Score: {scores}</li><li>Glucose: {glucose_range}</li><li>Status: {}</li></ul></div>",
            entry.category.marker(),
            entry.category.label(),
            entry.category.status()
        );
    }
    body.push_str("</div>");

    layout(Page::Predict, &body)
}

pub fn analysis(loaded: &LoadedDataset) -> String {
    let mut body = String::from("<h2>📊 Data visualisation</h2>");
    if let Some(notice) = loaded.notice {
        body.push_str(&alert("info", notice));
    }
    let source = match &loaded.origin {
        DatasetOrigin::File { path } => format!("Source: {}", path.display()),
        DatasetOrigin::Synthetic { seed } => format!("Source: synthetic demo data (seed {seed})"),
    };
    let _ = write!(
        body,
        "<p>{} · {} rows</p>",
        escape(&source),
        loaded.dataset.len()
    );

    body.push_str("<h3>🔹 Glucose distribution (histogram)</h3>");
    body.push_str(&chart::glucose_histogram_chart(&loaded.dataset).unwrap_or_default());

    body.push_str("<h3>🔹 Linear-regression risk score distribution</h3><div class=\"columns\"><div>");
    body.push_str(&chart::risk_histogram_chart(&loaded.dataset).unwrap_or_default());
    body.push_str("</div><div>");
    body.push_str(&chart::scatter_chart(&loaded.dataset).unwrap_or_default());
    body.push_str("</div></div>");

    body.push_str("<h3>🔹 Summary statistics</h3><div class=\"columns\">");
    body.push_str(&summary_block(
        "Glucose statistics",
        Summary::of(&loaded.dataset.glucose()),
        |v| format!("{v:.1} mg/dL"),
    ));
    body.push_str(&summary_block(
        "Risk score statistics",
        Summary::of(&loaded.dataset.risk_scores()),
        |v| format!("{v:.4}"),
    ));
    body.push_str("</div>");

    layout(Page::Analysis, &body)
}

fn summary_block(title: &str, summary: Option<Summary>, fmt: impl Fn(f64) -> String) -> String {
    let Some(s) = summary else {
        return format!("<div><b>{}</b><p>No data.</p></div>", escape(title));
    };
    format!(
        "<div><b>{}</b><ul><li>Mean: {}</li><li>Std. deviation: {}</li><li>Minimum: {}</li><li>Maximum: {}</li></ul></div>",
        escape(title),
        fmt(s.mean),
        fmt(s.std_dev),
        fmt(s.min),
        fmt(s.max)
    )
}

pub fn evaluation(ranges: &[RangeAnalysis], sensitivity: &[SensitivityRow], zero_crossing: f64) -> String {
    let mut body = String::from("<h2>📈 Linear regression model evaluation</h2>");
    let _ = write!(
        body,
        "<h3>🔹 Regression equation</h3><div class=\"alert info\">\
         <p><b>Equation:</b> diabetes risk = {INTERCEPT} + {SLOPE} × glucose</p><ul>\
         <li><b>Intercept ({INTERCEPT})</b>: baseline risk at a glucose of 0 (theoretical).</li>\
         <li><b>Slope ({SLOPE})</b>: risk increase per 1 mg/dL of glucose.</li>\
         <li><b>Zero-risk glucose</b>: {} ÷ {SLOPE} ≈ {zero_crossing:.1} mg/dL</li></ul></div>",
        -INTERCEPT
    );

    body.push_str("<h3>🔹 Risk by glucose range</h3>");
    for row in ranges {
        let _ = write!(body, "<p><b>{}</b></p><div class=\"columns\">", escape(row.name));
        body.push_str(&metric(
            &format!("Minimum ({:.0} mg/dL)", row.min_glucose),
            &format_score(row.min_risk),
        ));
        body.push_str(&metric(
            &format!("Midpoint ({:.0} mg/dL)", row.mid_glucose),
            &format_score(row.mid_risk),
        ));
        body.push_str(&metric(
            &format!("Maximum ({:.0} mg/dL)", row.max_glucose),
            &format_score(row.max_risk),
        ));
        body.push_str("</div>");
    }
    body.push_str("<table><tr><th>Range</th><th>Minimum risk</th><th>Midpoint risk</th><th>Maximum risk</th></tr>");
    for row in ranges {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(row.name),
            format_score(row.min_risk),
            format_score(row.mid_risk),
            format_score(row.max_risk)
        );
    }
    body.push_str("</table>");

    body.push_str("<h3>🔹 Sensitivity analysis</h3>");
    body.push_str(&chart::sensitivity_chart(sensitivity));
    body.push_str("<table><tr><th>Glucose (mg/dL)</th><th>Risk score</th><th>Risk level</th></tr>");
    for row in sensitivity {
        let _ = write!(
            body,
            "<tr><td>{:.0}</td><td>{}</td><td>{}</td></tr>",
            row.glucose,
            format_score(row.score),
            row.category.label()
        );
    }
    body.push_str("</table>");

    layout(Page::Evaluation, &body)
}

pub fn help() -> String {
    let mut body = String::from("<h2>ℹ️ User guide</h2>");
    body.push_str(
        "<h3>🛠 How to use</h3><ul>\
         <li>Pick a page from the menu on the left: <b>Prediction / Data analysis / Model evaluation / Help</b>.</li>\
         <li><b>Prediction</b>: enter a glucose value to estimate the diabetes risk.</li>\
         <li><b>Data analysis</b>: distribution of glucose values and their risk scores.</li>\
         <li><b>Model evaluation</b>: behaviour and sensitivity of the linear model.</li>\
         <li><b>Help</b>: this page.</li></ul>",
    );
    let _ = write!(
        body,
        "<h3>📊 Linear regression equation</h3><pre>diabetes risk = {INTERCEPT} + {SLOPE} × glucose</pre><ul>\
         <li><b>Linear relationship</b> between glucose and risk.</li>\
         <li><b>Easy to read</b>: +1 mg/dL glucose adds {SLOPE} to the risk.</li>\
         <li><b>Range</b>: input is limited to {SLIDER_MIN}-{SLIDER_MAX} mg/dL.</li>\
         <li><b>Reference point</b>: negative scores mean lower risk, positive scores higher risk.</li></ul>"
    );

    body.push_str("<h3>🎯 Risk score interpretation</h3><ul>");
    for entry in scoring::interpretation_guide(&scoring::RiskScorer) {
        let range = score_range(&entry);
        let _ = write!(
            body,
            "<li><b>{} {} ({range})</b>: {}</li>",
            entry.category.marker(),
            entry.category.label(),
            escape(entry.category.advice())
        );
    }
    body.push_str("</ul>");

    body.push_str("<h3>📈 Glucose reference values</h3><ul>");
    for band in GlucoseBand::ALL {
        let _ = write!(body, "<li><b>{}</b>: {}</li>", band.label(), band.reference());
    }
    body.push_str("</ul>");

    body.push_str(
        "<h3>💡 Notes</h3><ul>\
         <li>This is a simple model that predicts risk from glucose alone.</li>\
         <li>It is meant for <b>education and research</b>, not medical diagnosis.</li>\
         <li>A real diabetes diagnosis always requires a specialist's judgement.</li>\
         <li>Being linear, the model is less accurate at extreme values.</li></ul>\
         <h3>🔧 Technical details</h3><ul>\
         <li><b>Model type</b>: linear regression</li>\
         <li><b>Input</b>: glucose (mg/dL)</li>\
         <li><b>Output</b>: diabetes risk score</li></ul>",
    );

    layout(Page::Help, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glycorisk_core::analysis::{range_analysis, sensitivity_table};
    use glycorisk_core::dataset::{load_or_synthesize, SyntheticOptions};
    use glycorisk_core::scoring::{interpretation_guide, RiskScorer};

    #[test]
    fn predict_page_without_submission_shows_only_the_form() {
        let html = predict(None, &interpretation_guide(&RiskScorer));
        assert!(html.contains("type=\"range\""));
        assert!(html.contains("value=\"100\""));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn predict_page_renders_result_and_chart() {
        let reading = GlucoseReading(140.0);
        let assessment = RiskScorer.assess(reading);
        let breakdown = RiskScorer.breakdown(reading);
        let html = predict(Some((&assessment, &breakdown)), &interpretation_guide(&RiskScorer));
        assert!(html.contains("0.4918"));
        assert!(html.contains("Diabetes risk: High"));
        assert!(html.contains("alert warning"));
        assert!(html.contains("0.0081 × 140 = 1.1340"));
        assert!(html.contains("<svg"));
        assert!(html.contains("~55-104 mg/dL"));
        assert!(html.contains("Reference band: Diabetes (126 mg/dL and above)."));
    }

    #[test]
    fn predict_page_names_band_of_the_reading() {
        let reading = GlucoseReading(110.0);
        let html = predict(
            Some((&RiskScorer.assess(reading), &RiskScorer.breakdown(reading))),
            &interpretation_guide(&RiskScorer),
        );
        assert!(html.contains("Reference band: Prediabetes (borderline) (100-125 mg/dL)."));
    }

    #[test]
    fn analysis_page_shows_fallback_notice() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_or_synthesize(&dir.path().join("missing.csv"), SyntheticOptions::default());
        let html = analysis(&loaded);
        assert!(html.contains("synthetic demo dataset"));
        assert!(html.contains("500 rows"));
        assert!(html.contains("Glucose statistics"));
    }

    #[test]
    fn evaluation_page_lists_ranges_and_sensitivity() {
        let html = evaluation(&range_analysis(), &sensitivity_table(), RiskScorer.zero_crossing());
        assert!(html.contains("≈ 79.3 mg/dL"));
        assert!(html.contains("Borderline (100-125 mg/dL)"));
        assert!(html.contains("<td>200</td><td>0.9778</td><td>Very high</td>"));
    }

    #[test]
    fn help_page_marks_active_menu_entry() {
        let html = help();
        assert!(html.contains("<a href=\"/help\" class=\"active\">Help</a>"));
        assert!(html.contains("126 mg/dL and above"));
    }
}
