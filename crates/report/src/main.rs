use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glycorisk_core::dataset::{load_or_synthesize, SyntheticOptions};
use glycorisk_core::domain::glucose::{GlucoseReading, SLIDER_DEFAULT, SLIDER_MAX, SLIDER_MIN};
use glycorisk_core::scoring::{interpretation_guide, RiskScorer};

mod artifacts;

#[derive(Debug, Parser)]
#[command(name = "glycorisk_report")]
struct Args {
    /// Glucose reading in mg/dL (50..=200).
    #[arg(long, default_value_t = SLIDER_DEFAULT, value_parser = clap::value_parser!(u16).range(i64::from(SLIDER_MIN)..=i64::from(SLIDER_MAX)))]
    glucose: u16,

    /// CSV with a "Glucose" column. Defaults to GLYCORISK_DATA_PATH.
    #[arg(long)]
    data_path: Option<PathBuf>,

    /// Seed for the synthetic fallback dataset. Defaults to SYNTHETIC_SEED.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory the charts and summary.json are written to.
    #[arg(long, default_value = "report")]
    out_dir: PathBuf,

    /// Do everything except writing files.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = glycorisk_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let data_path = args.data_path.unwrap_or_else(|| settings.data_path.clone());
    let synthetic = SyntheticOptions {
        seed: args.seed.unwrap_or(settings.synthetic_seed),
        ..Default::default()
    };

    let scorer = RiskScorer;
    let reading = GlucoseReading::from(args.glucose);
    let assessment = scorer.assess(reading);
    let loaded = load_or_synthesize(&data_path, synthetic);

    tracing::info!(
        glucose = assessment.glucose,
        score = %assessment.formatted_score(),
        category = %assessment.category,
        dataset_rows = loaded.dataset.len(),
        synthetic = loaded.notice.is_some(),
        "risk assessment computed"
    );

    let result = artifacts::build(
        &assessment,
        &scorer.breakdown(reading),
        scorer.zero_crossing(),
        interpretation_guide(&scorer),
        &loaded,
        chrono::Utc::now(),
    );
    let (_, artifacts) = match result {
        Ok(out) => out,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            return Err(err);
        }
    };

    if args.dry_run {
        tracing::info!(
            dry_run = true,
            files = artifacts.files.len(),
            out_dir = %args.out_dir.display(),
            "report rendered (dry-run)"
        );
        return Ok(());
    }

    match artifacts.write_to(&args.out_dir) {
        Ok(written) => {
            tracing::info!(out_dir = %args.out_dir.display(), files = written.len(), "report written");
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "report write failed");
            Err(err)
        }
    }
}

fn init_sentry(settings: &glycorisk_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
