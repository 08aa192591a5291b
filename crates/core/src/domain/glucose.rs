use serde::{Deserialize, Serialize};

/// Slider bounds for the interactive input (mg/dL).
pub const SLIDER_MIN: u16 = 50;
pub const SLIDER_MAX: u16 = 200;
pub const SLIDER_DEFAULT: u16 = 100;

/// Display range used by charts and by the synthetic dataset clip.
pub const DISPLAY_MIN: f64 = SLIDER_MIN as f64;
pub const DISPLAY_MAX: f64 = SLIDER_MAX as f64;

/// A single blood-glucose value in mg/dL.
///
/// The [50, 200] range is a UI convention only; the scorer accepts any real value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlucoseReading(pub f64);

impl GlucoseReading {
    pub fn mg_dl(self) -> f64 {
        self.0
    }

    /// Parses a slider submission: an integer within [SLIDER_MIN, SLIDER_MAX].
    pub fn from_slider(raw: &str) -> anyhow::Result<Self> {
        let value: u16 = raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("glucose must be an integer (got {raw:?})"))?;
        anyhow::ensure!(
            (SLIDER_MIN..=SLIDER_MAX).contains(&value),
            "glucose must be {SLIDER_MIN}..={SLIDER_MAX} mg/dL (got {value})"
        );
        Ok(Self(f64::from(value)))
    }

    pub fn clamp_to_display(self) -> Self {
        Self(self.0.clamp(DISPLAY_MIN, DISPLAY_MAX))
    }

    pub fn band(self) -> GlucoseBand {
        GlucoseBand::of(self.0)
    }
}

impl From<u16> for GlucoseReading {
    fn from(value: u16) -> Self {
        Self(f64::from(value))
    }
}

impl std::fmt::Display for GlucoseReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.0} mg/dL", self.0)
        } else {
            write!(f, "{:.1} mg/dL", self.0)
        }
    }
}

/// Clinical reference bands for fasting glucose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlucoseBand {
    Hypoglycemia,
    Normal,
    Prediabetes,
    Diabetes,
}

impl GlucoseBand {
    pub const ALL: [GlucoseBand; 4] = [
        GlucoseBand::Hypoglycemia,
        GlucoseBand::Normal,
        GlucoseBand::Prediabetes,
        GlucoseBand::Diabetes,
    ];

    pub fn of(mg_dl: f64) -> Self {
        if mg_dl < 70.0 {
            Self::Hypoglycemia
        } else if mg_dl < 100.0 {
            Self::Normal
        } else if mg_dl < 126.0 {
            Self::Prediabetes
        } else {
            Self::Diabetes
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hypoglycemia => "Hypoglycemia",
            Self::Normal => "Normal",
            Self::Prediabetes => "Prediabetes (borderline)",
            Self::Diabetes => "Diabetes",
        }
    }

    pub fn reference(self) -> &'static str {
        match self {
            Self::Hypoglycemia => "below 70 mg/dL",
            Self::Normal => "70-99 mg/dL",
            Self::Prediabetes => "100-125 mg/dL",
            Self::Diabetes => "126 mg/dL and above",
        }
    }
}

/// Shaded x-axis spans on the risk curve chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartBand {
    pub label: &'static str,
    pub from: f64,
    pub to: f64,
    pub color: &'static str,
}

pub const CHART_BANDS: [ChartBand; 3] = [
    ChartBand {
        label: "Normal range",
        from: 50.0,
        to: 100.0,
        color: "green",
    },
    ChartBand {
        label: "Prediabetes range",
        from: 100.0,
        to: 126.0,
        color: "orange",
    },
    ChartBand {
        label: "Diabetes range",
        from: 126.0,
        to: 200.0,
        color: "red",
    },
];

/// Upper limit of the normal fasting range and the diabetes cut-off.
pub const NORMAL_UPPER_MARKER: f64 = 100.0;
pub const DIABETES_MARKER: f64 = 126.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_accepts_integers_in_range() {
        assert_eq!(GlucoseReading::from_slider("50").unwrap().mg_dl(), 50.0);
        assert_eq!(GlucoseReading::from_slider(" 200 ").unwrap().mg_dl(), 200.0);
    }

    #[test]
    fn slider_rejects_out_of_range_and_fractions() {
        assert!(GlucoseReading::from_slider("49").is_err());
        assert!(GlucoseReading::from_slider("201").is_err());
        assert!(GlucoseReading::from_slider("100.5").is_err());
        assert!(GlucoseReading::from_slider("abc").is_err());
    }

    #[test]
    fn bands_follow_clinical_cutoffs() {
        assert_eq!(GlucoseBand::of(65.0), GlucoseBand::Hypoglycemia);
        assert_eq!(GlucoseBand::of(70.0), GlucoseBand::Normal);
        assert_eq!(GlucoseBand::of(99.9), GlucoseBand::Normal);
        assert_eq!(GlucoseBand::of(100.0), GlucoseBand::Prediabetes);
        assert_eq!(GlucoseBand::of(126.0), GlucoseBand::Diabetes);
    }

    #[test]
    fn clamp_keeps_values_in_display_range() {
        assert_eq!(GlucoseReading(20.0).clamp_to_display().mg_dl(), 50.0);
        assert_eq!(GlucoseReading(250.0).clamp_to_display().mg_dl(), 200.0);
        assert_eq!(GlucoseReading(120.0).clamp_to_display().mg_dl(), 120.0);
    }

    #[test]
    fn display_drops_decimals_for_whole_values() {
        assert_eq!(GlucoseReading(100.0).to_string(), "100 mg/dL");
        assert_eq!(GlucoseReading(85.4).to_string(), "85.4 mg/dL");
    }
}
