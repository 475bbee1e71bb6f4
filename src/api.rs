use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::{ApiKey, SearchConfig};
use crate::error::ApiError;
use crate::places::{Coordinates, GooglePlacesClient, Place};
use crate::ranking::rank_by_bayesian;
use crate::search::{Orchestrator, SearchRequest};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SearchConfig>,
    http: reqwest::Client,
}

impl AppState {
    pub fn new(config: SearchConfig) -> anyhow::Result<Self> {
        let http = GooglePlacesClient::http_client(&config)?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let index = ServeFile::new(&state.config.web.index_path);
    let assets = ServeDir::new(&state.config.web.static_dir);

    Router::new()
        .route_service("/", index)
        .nest_service("/static", assets)
        .route("/health", get(|| async { "ok" }))
        .route("/search", post(search).fallback(method_not_allowed))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    lat: f64,
    lng: f64,
    limit: i64,
    category: String,
    #[serde(default)]
    ranked: bool,
}

#[derive(Debug)]
struct ParsedSearch {
    request: SearchRequest,
    ranked: bool,
}

fn parse_search_body(body: &[u8]) -> Result<ParsedSearch, ApiError> {
    let b: SearchBody =
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let location = Coordinates::new(b.lat, b.lng);
    if !location.is_valid() {
        return Err(ApiError::BadRequest("coordinates out of range".into()));
    }
    let limit = usize::try_from(b.limit)
        .map_err(|_| ApiError::BadRequest("limit must be non-negative".into()))?;
    let category = b.category.trim();
    if category.is_empty() {
        return Err(ApiError::BadRequest("category must not be empty".into()));
    }

    Ok(ParsedSearch {
        request: SearchRequest {
            location,
            category: category.to_string(),
            limit,
        },
        ranked: b.ranked,
    })
}

async fn search(State(state): State<AppState>, body: Bytes) -> Result<Json<Vec<Place>>, ApiError> {
    let parsed = parse_search_body(&body)?;

    // Read per search so a rotated key file is picked up without a restart.
    let key = ApiKey::from_file(&state.config.upstream.api_key_path).map_err(ApiError::Credential)?;
    let client = GooglePlacesClient::with_http(state.http.clone(), &state.config, key);
    let orchestrator = Orchestrator::new(Arc::new(client), &state.config);

    let mut places = orchestrator.search(&parsed.request).await?;
    if parsed.ranked {
        rank_by_bayesian(&mut places);
    }
    Ok(Json(places))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_body() {
        let p = parse_search_body(
            br#"{"lat":50.06,"lng":19.93,"limit":2,"category":" restaurant "}"#,
        )
        .unwrap();
        assert_eq!(p.request.limit, 2);
        assert_eq!(p.request.category, "restaurant");
        assert!(!p.ranked);
    }

    #[test]
    fn rejects_bad_bodies() {
        let cases: [&[u8]; 6] = [
            b"not json",
            br#"{"lat":50.06,"lng":19.93,"category":"bar"}"#,
            br#"{"lat":50.06,"lng":19.93,"limit":-1,"category":"bar"}"#,
            br#"{"lat":50.06,"lng":19.93,"limit":2.5,"category":"bar"}"#,
            br#"{"lat":123.0,"lng":19.93,"limit":2,"category":"bar"}"#,
            br#"{"lat":50.06,"lng":19.93,"limit":2,"category":"   "}"#,
        ];
        for body in cases {
            assert!(
                matches!(parse_search_body(body), Err(ApiError::BadRequest(_))),
                "expected 400 for {}",
                String::from_utf8_lossy(body)
            );
        }
    }
}
