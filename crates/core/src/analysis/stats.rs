use crate::scoring;
use serde::Serialize;

/// Descriptive statistics of a sample. `std_dev` uses the n-1 denominator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    pub fn of(xs: &[f64]) -> Option<Self> {
        if xs.is_empty() {
            return None;
        }

        let count = xs.len();
        let mean = xs.iter().sum::<f64>() / count as f64;
        let std_dev = if count > 1 {
            let ss: f64 = xs.iter().map(|x| (x - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };
        let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            count,
            mean,
            std_dev,
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `counts.len() + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Equal-width bins over `[min, max]`; the last bin includes its right edge.
pub fn histogram(xs: &[f64], bins: usize) -> Option<Histogram> {
    let summary = Summary::of(xs)?;
    if bins == 0 {
        return None;
    }

    // A degenerate sample still gets a unit-wide range so every value lands in a bin.
    let (lo, hi) = if summary.max > summary.min {
        (summary.min, summary.max)
    } else {
        (summary.min - 0.5, summary.max + 0.5)
    };
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    let mut counts = vec![0usize; bins];
    for &x in xs {
        let idx = (((x - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Some(Histogram { edges, counts })
}

/// `n` evenly spaced values from `start` to `end`, both inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Scorer evaluated along `linspace(start, end, n)` as `(glucose, score)` pairs.
pub fn risk_curve(start: f64, end: f64, n: usize) -> Vec<(f64, f64)> {
    linspace(start, end, n)
        .into_iter()
        .map(|g| (g, scoring::score(g)))
        .collect()
}
