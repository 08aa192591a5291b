//! Minimal SVG plotting surface: a data frame mapped onto a pixel canvas.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn span(&self) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            span
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stroke {
    Solid,
    Dashed,
}

impl Stroke {
    fn dasharray(self) -> &'static str {
        match self {
            Self::Solid => "",
            Self::Dashed => " stroke-dasharray=\"6 4\"",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: String,
    pub color: &'static str,
}

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 55.0;

/// An SVG document under construction. Data-space drawing is clipped to the plot area.
#[derive(Debug, Clone)]
pub struct Plot {
    width: f64,
    height: f64,
    x: Range,
    y: Range,
    data: String,
    overlay: String,
    legend: Vec<LegendEntry>,
}

impl Plot {
    pub fn new(width: u32, height: u32, x: Range, y: Range) -> Self {
        Self {
            width: f64::from(width),
            height: f64::from(height),
            x,
            y,
            data: String::new(),
            overlay: String::new(),
            legend: Vec::new(),
        }
    }

    fn plot_width(&self) -> f64 {
        (self.width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0)
    }

    fn plot_height(&self) -> f64 {
        (self.height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0)
    }

    pub fn px(&self, x: f64) -> f64 {
        MARGIN_LEFT + (x - self.x.min) / self.x.span() * self.plot_width()
    }

    pub fn py(&self, y: f64) -> f64 {
        MARGIN_TOP + (self.y.max - y) / self.y.span() * self.plot_height()
    }

    /// Shaded vertical span between two x values.
    pub fn x_span(&mut self, from: f64, to: f64, color: &str, opacity: f64) {
        let (x0, x1) = (self.px(from), self.px(to));
        let _ = write!(
            self.data,
            "<rect x=\"{:.2}\" y=\"{MARGIN_TOP:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{color}\" fill-opacity=\"{opacity}\"/>",
            x0.min(x1),
            (x1 - x0).abs(),
            self.plot_height()
        );
    }

    /// Shaded horizontal span between two y values.
    pub fn y_span(&mut self, from: f64, to: f64, color: &str, opacity: f64) {
        let (y0, y1) = (self.py(from), self.py(to));
        let _ = write!(
            self.data,
            "<rect x=\"{MARGIN_LEFT:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{color}\" fill-opacity=\"{opacity}\"/>",
            y0.min(y1),
            self.plot_width(),
            (y1 - y0).abs()
        );
    }

    pub fn hline(&mut self, y: f64, color: &str, stroke: Stroke, opacity: f64, width: f64) {
        let py = self.py(y);
        let _ = write!(
            self.data,
            "<line x1=\"{MARGIN_LEFT:.2}\" y1=\"{py:.2}\" x2=\"{:.2}\" y2=\"{py:.2}\" stroke=\"{color}\" stroke-opacity=\"{opacity}\" stroke-width=\"{width}\"{}/>",
            MARGIN_LEFT + self.plot_width(),
            stroke.dasharray()
        );
    }

    pub fn vline(&mut self, x: f64, color: &str, stroke: Stroke, opacity: f64, width: f64) {
        let px = self.px(x);
        let _ = write!(
            self.data,
            "<line x1=\"{px:.2}\" y1=\"{MARGIN_TOP:.2}\" x2=\"{px:.2}\" y2=\"{:.2}\" stroke=\"{color}\" stroke-opacity=\"{opacity}\" stroke-width=\"{width}\"{}/>",
            MARGIN_TOP + self.plot_height(),
            stroke.dasharray()
        );
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], color: &str, width: f64) {
        if points.is_empty() {
            return;
        }
        let mut coords = String::new();
        for (i, &(x, y)) in points.iter().enumerate() {
            if i > 0 {
                coords.push(' ');
            }
            let _ = write!(coords, "{:.2},{:.2}", self.px(x), self.py(y));
        }
        let _ = write!(
            self.data,
            "<polyline fill=\"none\" stroke=\"{color}\" stroke-width=\"{width}\" points=\"{coords}\"/>"
        );
    }

    pub fn circle(&mut self, x: f64, y: f64, radius: f64, color: &str, opacity: f64) {
        let _ = write!(
            self.data,
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{radius}\" fill=\"{color}\" fill-opacity=\"{opacity}\"/>",
            self.px(x),
            self.py(y)
        );
    }

    /// Bar from y=0 to `value`, centred on `x`, `width` in data units.
    pub fn bar(&mut self, x: f64, width: f64, value: f64, color: &str, opacity: f64) {
        let x0 = self.px(x - width / 2.0);
        let x1 = self.px(x + width / 2.0);
        let (y0, y1) = (self.py(0.0), self.py(value));
        let _ = write!(
            self.data,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{color}\" fill-opacity=\"{opacity}\"/>",
            x0.min(x1),
            y0.min(y1),
            (x1 - x0).abs(),
            (y1 - y0).abs()
        );
    }

    /// Text anchored at a data coordinate, offset by `dy` pixels.
    pub fn label(&mut self, x: f64, y: f64, dy: f64, text: &str) {
        let _ = write!(
            self.overlay,
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"11\" font-weight=\"bold\">{}</text>",
            self.px(x),
            self.py(y) + dy,
            escape(text)
        );
    }

    pub fn legend(&mut self, label: impl Into<String>, color: &'static str) {
        self.legend.push(LegendEntry {
            label: label.into(),
            color,
        });
    }

    /// Closes the document with axes, ticks, labels, grid and legend.
    pub fn finish(self, title: &str, x_label: &str, y_label: &str) -> String {
        let (w, h) = (self.width, self.height);
        let (pw, ph) = (self.plot_width(), self.plot_height());
        let bottom = MARGIN_TOP + ph;
        // Several charts can share one HTML page, so clip ids must not collide.
        let clip_id = format!("clip-{}", slug(title));

        let mut out = String::new();
        let _ = write!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">"
        );
        let _ = write!(
            out,
            "<defs><clipPath id=\"{clip_id}\"><rect x=\"{MARGIN_LEFT}\" y=\"{MARGIN_TOP}\" width=\"{pw:.2}\" height=\"{ph:.2}\"/></clipPath></defs>"
        );
        let _ = write!(out, "<rect width=\"{w}\" height=\"{h}\" fill=\"white\"/>");

        let mut axes = String::new();
        for t in ticks(self.x, 8) {
            let px = self.px(t);
            let _ = write!(
                axes,
                "<line x1=\"{px:.2}\" y1=\"{MARGIN_TOP}\" x2=\"{px:.2}\" y2=\"{bottom:.2}\" stroke=\"#000\" stroke-opacity=\"0.1\"/><text x=\"{px:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"11\">{}</text>",
                bottom + 16.0,
                tick_label(t)
            );
        }
        for t in ticks(self.y, 6) {
            let py = self.py(t);
            let _ = write!(
                axes,
                "<line x1=\"{MARGIN_LEFT}\" y1=\"{py:.2}\" x2=\"{:.2}\" y2=\"{py:.2}\" stroke=\"#000\" stroke-opacity=\"0.1\"/><text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" font-size=\"11\">{}</text>",
                MARGIN_LEFT + pw,
                MARGIN_LEFT - 6.0,
                py + 4.0,
                tick_label(t)
            );
        }
        out.push_str(&axes);

        let _ = write!(out, "<g clip-path=\"url(#{clip_id})\">{}</g>", self.data);
        let _ = write!(
            out,
            "<rect x=\"{MARGIN_LEFT}\" y=\"{MARGIN_TOP}\" width=\"{pw:.2}\" height=\"{ph:.2}\" fill=\"none\" stroke=\"#333\"/>"
        );
        out.push_str(&self.overlay);

        let _ = write!(
            out,
            "<text x=\"{:.2}\" y=\"24\" text-anchor=\"middle\" font-size=\"15\" font-weight=\"bold\">{}</text>",
            w / 2.0,
            escape(title)
        );
        let _ = write!(
            out,
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"12\">{}</text>",
            MARGIN_LEFT + pw / 2.0,
            h - 12.0,
            escape(x_label)
        );
        let _ = write!(
            out,
            "<text x=\"16\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"12\" transform=\"rotate(-90 16 {:.2})\">{}</text>",
            MARGIN_TOP + ph / 2.0,
            MARGIN_TOP + ph / 2.0,
            escape(y_label)
        );

        for (i, entry) in self.legend.iter().enumerate() {
            let y = MARGIN_TOP + 14.0 + 16.0 * i as f64;
            let x = MARGIN_LEFT + 10.0;
            let _ = write!(
                out,
                "<rect x=\"{x:.2}\" y=\"{:.2}\" width=\"12\" height=\"4\" fill=\"{}\"/><text x=\"{:.2}\" y=\"{y:.2}\" font-size=\"11\">{}</text>",
                y - 5.0,
                entry.color,
                x + 18.0,
                escape(&entry.label)
            );
        }

        out.push_str("</svg>");
        out
    }
}

/// "Nice" tick positions (1, 2, 5 × 10^k steps) inside `range`.
pub fn ticks(range: Range, target: usize) -> Vec<f64> {
    let span = range.max - range.min;
    if span.is_nan() || span <= 0.0 || target == 0 {
        return vec![range.min];
    }

    let raw = span / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (range.min / step).ceil() as i64;
    let last = (range.max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

fn tick_label(v: f64) -> String {
    if v.abs() < 1e-9 {
        "0".to_string()
    } else if v.fract().abs() < 1e-9 {
        format!("{v:.0}")
    } else {
        let s = format!("{v:.2}");
        s.trim_end_matches('0').to_string()
    }
}

fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_data_corners_onto_plot_area() {
        let plot = Plot::new(400, 300, Range::new(0.0, 10.0), Range::new(-1.0, 1.0));
        assert_eq!(plot.px(0.0), MARGIN_LEFT);
        assert_eq!(plot.px(10.0), 400.0 - MARGIN_RIGHT);
        assert_eq!(plot.py(1.0), MARGIN_TOP);
        assert_eq!(plot.py(-1.0), 300.0 - MARGIN_BOTTOM);
    }

    #[test]
    fn ticks_use_round_steps() {
        assert_eq!(
            ticks(Range::new(50.0, 200.0), 8),
            vec![60.0, 80.0, 100.0, 120.0, 140.0, 160.0, 180.0, 200.0]
        );
        let y = ticks(Range::new(-1.0, 1.2), 6);
        assert_eq!(y.first().copied(), Some(-1.0));
        assert!(y.iter().all(|t| (-1.0..=1.2).contains(t)));
    }

    #[test]
    fn escapes_markup_in_text() {
        assert_eq!(escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn finished_document_is_clipped_svg() {
        let mut plot = Plot::new(200, 100, Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        plot.polyline(&[(0.0, 0.0), (1.0, 1.0)], "blue", 2.0);
        plot.legend("line <1>", "blue");
        let svg = plot.finish("Risk curve", "x", "y");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("<clipPath id=\"clip-risk-curve\">"));
        assert!(svg.contains("clip-path=\"url(#clip-risk-curve)\""));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("line &lt;1&gt;"));
    }
}
