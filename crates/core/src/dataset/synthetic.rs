use super::{Dataset, DatasetOrigin, GlucoseSource, Record};
use crate::config::DEFAULT_SYNTHETIC_SEED;
use crate::domain::glucose::GlucoseReading;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A glucose sub-population: N(mean, std_dev) with a per-row diabetes probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cohort {
    pub name: &'static str,
    pub mean: f64,
    pub std_dev: f64,
    pub outcome_probability: f64,
}

pub const COHORTS: [Cohort; 3] = [
    Cohort {
        name: "normal",
        mean: 85.0,
        std_dev: 10.0,
        outcome_probability: 0.0,
    },
    Cohort {
        name: "prediabetes",
        mean: 110.0,
        std_dev: 8.0,
        outcome_probability: 0.3,
    },
    Cohort {
        name: "diabetes",
        mean: 150.0,
        std_dev: 15.0,
        outcome_probability: 1.0,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticOptions {
    pub seed: u64,
    pub n_samples: usize,
}

impl Default for SyntheticOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SYNTHETIC_SEED,
            n_samples: 500,
        }
    }
}

impl SyntheticOptions {
    /// Splits `n_samples` across the cohorts; the first cohorts absorb the remainder.
    pub fn cohort_sizes(&self) -> [usize; 3] {
        let base = self.n_samples / COHORTS.len();
        let extra = self.n_samples % COHORTS.len();
        let mut sizes = [base; 3];
        for size in sizes.iter_mut().take(extra) {
            *size += 1;
        }
        sizes
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    options: SyntheticOptions,
}

impl SyntheticSource {
    pub fn new(options: SyntheticOptions) -> Self {
        Self { options }
    }

    /// Deterministic for a given seed; glucose is clipped to the display range.
    pub fn generate(&self) -> Dataset {
        let mut rng = StdRng::seed_from_u64(self.options.seed);
        let mut records = Vec::with_capacity(self.options.n_samples);

        for (cohort, size) in COHORTS.iter().zip(self.options.cohort_sizes()) {
            tracing::debug!(cohort = cohort.name, rows = size, mean = cohort.mean, "synthesizing cohort");
            for _ in 0..size {
                let raw = cohort.mean + cohort.std_dev * standard_normal(&mut rng);
                let glucose = GlucoseReading(raw).clamp_to_display().mg_dl();
                let outcome = u8::from(rng.gen_bool(cohort.outcome_probability));
                records.push(Record {
                    glucose,
                    outcome: Some(outcome),
                });
            }
        }

        Dataset { records }
    }
}

impl GlucoseSource for SyntheticSource {
    fn describe(&self) -> DatasetOrigin {
        DatasetOrigin::Synthetic {
            seed: self.options.seed,
        }
    }

    fn load(&self) -> anyhow::Result<Dataset> {
        Ok(self.generate())
    }
}

// Box-Muller transform; `1 - u` keeps the logarithm argument in (0, 1].
fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(xs: &[f64]) -> f64 {
        xs.iter().sum::<f64>() / xs.len() as f64
    }

    #[test]
    fn default_dataset_has_500_rows_in_three_groups() {
        let options = SyntheticOptions::default();
        assert_eq!(options.cohort_sizes(), [167, 167, 166]);
        let ds = SyntheticSource::new(options).generate();
        assert_eq!(ds.len(), 500);
    }

    #[test]
    fn glucose_is_clipped_to_display_range() {
        let ds = SyntheticSource::new(SyntheticOptions {
            seed: 7,
            n_samples: 3_000,
        })
        .generate();
        assert!(ds.glucose().iter().all(|g| (50.0..=200.0).contains(g)));
    }

    #[test]
    fn diabetes_cohort_is_clipped_at_display_max() {
        let ds = SyntheticSource::new(SyntheticOptions {
            seed: 11,
            n_samples: 90_000,
        })
        .generate();
        // 30k draws from N(150, 15) put a dozen or so above 200.
        assert!(ds.glucose().iter().any(|g| *g == 200.0));
        assert!(ds.glucose().iter().all(|g| *g >= 50.0));
    }

    #[test]
    fn cohort_names_are_distinct() {
        let names: Vec<_> = COHORTS.iter().map(|c| c.name).collect();
        assert_eq!(names, ["normal", "prediabetes", "diabetes"]);
    }

    #[test]
    fn same_seed_gives_same_rows() {
        let a = SyntheticSource::new(SyntheticOptions::default()).generate();
        let b = SyntheticSource::new(SyntheticOptions::default()).generate();
        assert_eq!(a, b);

        let c = SyntheticSource::new(SyntheticOptions {
            seed: 43,
            ..Default::default()
        })
        .generate();
        assert_ne!(a, c);
    }

    #[test]
    fn cohorts_have_expected_outcomes_and_centres() {
        let ds = SyntheticSource::new(SyntheticOptions::default()).generate();
        let [n0, n1, _] = SyntheticOptions::default().cohort_sizes();
        let normal = &ds.records[..n0];
        let prediabetes = &ds.records[n0..n0 + n1];
        let diabetes = &ds.records[n0 + n1..];

        assert!(normal.iter().all(|r| r.outcome == Some(0)));
        assert!(diabetes.iter().all(|r| r.outcome == Some(1)));
        let positives = prediabetes.iter().filter(|r| r.outcome == Some(1)).count();
        assert!((20..=80).contains(&positives), "positives={positives}");

        let centre = |rows: &[Record]| mean(&rows.iter().map(|r| r.glucose).collect::<Vec<_>>());
        assert!((centre(normal) - 85.0).abs() < 4.0);
        assert!((centre(prediabetes) - 110.0).abs() < 4.0);
        assert!((centre(diabetes) - 150.0).abs() < 5.0);
    }

    #[test]
    fn describe_reports_seed() {
        let source = SyntheticSource::new(SyntheticOptions {
            seed: 9,
            n_samples: 3,
        });
        assert_eq!(source.describe(), DatasetOrigin::Synthetic { seed: 9 });
        assert_eq!(source.load().unwrap().len(), 3);
    }
}
