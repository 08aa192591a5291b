use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glycorisk_core::analysis::{range_analysis, sensitivity_table, RangeAnalysis, SensitivityRow, Summary};
use glycorisk_core::dataset::{load_or_synthesize, DatasetOrigin, LoadedDataset, SyntheticOptions};
use glycorisk_core::domain::glucose::GlucoseReading;
use glycorisk_core::domain::risk::RiskCategory;
use glycorisk_core::scoring::{interpretation_guide, RiskScorer};

mod pages;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = glycorisk_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let state = AppState {
        data_path: settings.data_path.clone(),
        synthetic: settings.synthetic_options(),
    };
    tracing::info!(data_path = %state.data_path.display(), seed = state.synthetic.seed, "dashboard configured");

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "dashboard listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/predict") }))
        .route("/healthz", get(healthz))
        .route("/predict", get(predict_page))
        .route("/analysis", get(analysis_page))
        .route("/evaluation", get(evaluation_page))
        .route("/help", get(help_page))
        .route("/api/score", get(api_score))
        .route("/api/sensitivity", get(api_sensitivity))
        .route("/api/ranges", get(api_ranges))
        .route("/api/dataset/summary", get(api_dataset_summary))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    data_path: PathBuf,
    synthetic: SyntheticOptions,
}

#[derive(Debug, Deserialize)]
struct PredictQuery {
    glucose: Option<String>,
}

async fn predict_page(
    Query(query): Query<PredictQuery>,
) -> Result<Html<String>, (StatusCode, String)> {
    let guide = interpretation_guide(&RiskScorer);
    let Some(raw) = query.glucose else {
        return Ok(Html(pages::predict(None, &guide)));
    };

    let reading =
        GlucoseReading::from_slider(&raw).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let assessment = RiskScorer.assess(reading);
    let breakdown = RiskScorer.breakdown(reading);
    tracing::debug!(
        glucose = assessment.glucose,
        score = assessment.score,
        category = %assessment.category,
        "prediction"
    );

    Ok(Html(pages::predict(Some((&assessment, &breakdown)), &guide)))
}

async fn analysis_page(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let loaded = load_dataset(&state).await?;
    Ok(Html(pages::analysis(&loaded)))
}

async fn evaluation_page() -> Html<String> {
    Html(pages::evaluation(
        &range_analysis(),
        &sensitivity_table(),
        RiskScorer.zero_crossing(),
    ))
}

async fn help_page() -> Html<String> {
    Html(pages::help())
}

#[derive(Debug, Deserialize)]
struct ScoreQuery {
    glucose: f64,
}

#[derive(Debug, Serialize)]
struct ApiScore {
    glucose: f64,
    score: f64,
    formatted_score: String,
    category: RiskCategory,
    label: &'static str,
    advice: &'static str,
}

async fn api_score(Query(query): Query<ScoreQuery>) -> Result<Json<ApiScore>, StatusCode> {
    if !query.glucose.is_finite() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let assessment = RiskScorer.assess(GlucoseReading(query.glucose));
    Ok(Json(ApiScore {
        glucose: assessment.glucose,
        score: assessment.score,
        formatted_score: assessment.formatted_score(),
        category: assessment.category,
        label: assessment.category.label(),
        advice: assessment.category.advice(),
    }))
}

async fn api_sensitivity() -> Json<Vec<SensitivityRow>> {
    Json(sensitivity_table())
}

async fn api_ranges() -> Json<Vec<RangeAnalysis>> {
    Json(range_analysis())
}

#[derive(Debug, Serialize)]
struct ApiDatasetSummary {
    origin: DatasetOrigin,
    notice: Option<&'static str>,
    rows: usize,
    glucose: Option<Summary>,
    risk_score: Option<Summary>,
}

async fn api_dataset_summary(
    State(state): State<AppState>,
) -> Result<Json<ApiDatasetSummary>, StatusCode> {
    let loaded = load_dataset(&state).await?;
    Ok(Json(ApiDatasetSummary {
        rows: loaded.dataset.len(),
        glucose: Summary::of(&loaded.dataset.glucose()),
        risk_score: Summary::of(&loaded.dataset.risk_scores()),
        origin: loaded.origin,
        notice: loaded.notice,
    }))
}

/// Re-reads the dataset on every call; file IO runs on the blocking pool.
async fn load_dataset(state: &AppState) -> Result<LoadedDataset, StatusCode> {
    let path = state.data_path.clone();
    let synthetic = state.synthetic;
    tokio::task::spawn_blocking(move || load_or_synthesize(&path, synthetic))
        .await
        .map_err(|e| {
            let err = anyhow::Error::new(e).context("dataset loader task failed");
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "dataset load failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
