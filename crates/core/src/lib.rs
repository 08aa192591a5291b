pub mod analysis;
pub mod chart;
pub mod dataset;
pub mod domain;
pub mod scoring;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    pub const DEFAULT_DATA_PATH: &str = "data/processed.csv";
    pub const DEFAULT_SYNTHETIC_SEED: u64 = 42;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub data_path: PathBuf,
        pub synthetic_seed: u64,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let data_path = std::env::var("GLYCORISK_DATA_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

            let synthetic_seed = match std::env::var("SYNTHETIC_SEED") {
                Ok(s) => s
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("SYNTHETIC_SEED must be an unsigned integer (got {s:?})"))?,
                Err(_) => DEFAULT_SYNTHETIC_SEED,
            };

            Ok(Self {
                data_path,
                synthetic_seed,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn synthetic_options(&self) -> crate::dataset::synthetic::SyntheticOptions {
            crate::dataset::synthetic::SyntheticOptions {
                seed: self.synthetic_seed,
                ..Default::default()
            }
        }
    }
}
