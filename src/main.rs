//! Places finder — server entrypoint.
//! Boots the Axum HTTP server: search API, static UI and /metrics.
//!
//! See `README.md` for configuration and the API key file.

use places_finder::metrics::Metrics;
use places_finder::{api, init_tracing, AppState, SearchConfig};
use shuttle_axum::ShuttleAxum;
use tracing::info;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = SearchConfig::load()?;
    info!(
        api_base = %config.upstream.api_base,
        min_rating = config.filter.min_rating,
        min_reviews = config.filter.min_reviews,
        "places config loaded"
    );

    let metrics = Metrics::init()?;
    let state = AppState::new(config)?;
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
